//! Reference coupled solver.
//!
//! [`PenaltyCouplingSolver`] couples the particle bed to the FSI bodies
//! through their BCE markers with a kernel-weighted pressure/penalty
//! contact and a linear damper per marker pair. The bed itself is
//! quasi-static: markers only move when pushed by a body, lose their
//! velocity quickly and are clamped inside the container.
//!
//! Force evaluation runs in parallel over BCE markers. Per-marker results
//! are collected in index order and reduced sequentially, so two runs
//! from the same state produce bit-identical results.

use std::ops::Range;

use indexmap::IndexMap;
use log::debug;
use nalgebra::{UnitQuaternion, Vector3};
use rayon::prelude::*;

use plunge_core::{
    BodyId, CoupledSolver, CoupledState, FluidMarker, IntegratorConfig, RigidBody, SimParams,
    SolverError,
};
use plunge_core::integrator::hht_coefficients;
use plunge_space::{Aabb, CellGrid, DomainLayout, SpaceError};

use crate::fluid::hydrostatic_state;

/// Courant number applied to `HSML / (Cs + v_max)`.
pub const CFL: f64 = 0.25;

/// Speeds below this are snapped to zero so settled bed markers drop
/// out of the update loop.
const REST_SPEED: f64 = 1.0e-9;

// ── Per-step loads ─────────────────────────────────────────────────

/// Fluid load on a body, split so the damper can be treated implicitly:
/// the total force at body velocity `v` is `force - damping · v`.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
struct BodyLoad {
    force: Vector3<f64>,
    damping: f64,
    torque: Vector3<f64>,
}

impl BodyLoad {
    fn add(&mut self, other: &BodyLoad) {
        self.force += other.force;
        self.damping += other.damping;
        self.torque += other.torque;
    }
}

#[derive(Debug, Default)]
struct BceContact {
    load: BodyLoad,
    reactions: Vec<(usize, Vector3<f64>)>,
}

/// Integrator memory of one body.
#[derive(Clone, Copy, Debug, PartialEq)]
struct BodyHistory {
    force: Vector3<f64>,
    lin_acc: Vector3<f64>,
    ang_acc: Vector3<f64>,
}

struct Committed {
    grid: CellGrid,
    fluid: Range<usize>,
    fsi: Vec<(BodyId, Vec<usize>)>,
}

// ── PenaltyCouplingSolver ──────────────────────────────────────────

/// Bundled [`CoupledSolver`] implementation.
pub struct PenaltyCouplingSolver {
    params: SimParams,
    kernel_length: f64,
    spacing: f64,
    sound_speed: f64,
    nominal_dt: f64,
    gravity: Vector3<f64>,
    integrator: IntegratorConfig,
    marker_mass: f64,
    /// Contact stiffness `rho0·Cs²` (Pa).
    stiffness: f64,
    /// Damper per marker pair `rho0·Cs·s²` (N·s/m).
    damping: f64,
    area: f64,
    surface: f64,
    interior: Aabb,
    bounds: Aabb,
    committed: Option<Committed>,
    history: IndexMap<BodyId, BodyHistory>,
    reactions: Vec<Vector3<f64>>,
}

impl PenaltyCouplingSolver {
    /// Solver for the run described by `params`.
    pub fn new(params: &SimParams) -> Result<Self, SpaceError> {
        let layout = DomainLayout::from_params(params)?;
        let s = layout.spacing();
        let rho0 = params.fluid.density;
        let cs = params.fluid.sound_speed;
        let b = layout.box_dims();
        let bounds = layout.compute_bounds();
        Ok(Self {
            params: params.clone(),
            kernel_length: params.sph.kernel_length,
            spacing: s,
            sound_speed: cs,
            nominal_dt: params.time.dt,
            gravity: params.gravity(),
            integrator: params.run.integrator,
            marker_mass: params.marker_mass(),
            stiffness: rho0 * cs * cs,
            damping: rho0 * cs * s * s,
            area: s * s,
            surface: layout.fluid_height(),
            interior: Aabb::new(
                Vector3::new(-b.x / 2.0, -b.y / 2.0, 0.0),
                Vector3::new(b.x / 2.0, b.y / 2.0, bounds.max.z),
            ),
            bounds,
            committed: None,
            history: IndexMap::new(),
            reactions: Vec::new(),
        })
    }

    /// Largest stable step for a maximum marker speed of `v_max`.
    pub fn stable_dt(&self, v_max: f64) -> f64 {
        CFL * self.kernel_length / (self.sound_speed + v_max)
    }

    fn support(&self) -> f64 {
        2.0 * self.kernel_length
    }

    fn bce_contact(
        &self,
        grid: &CellGrid,
        markers: &[FluidMarker],
        bce: usize,
        com: &Vector3<f64>,
        omega: &Vector3<f64>,
    ) -> BceContact {
        let support = self.support();
        let xb = markers[bce].position();
        let vb = markers[bce].velocity;
        let arm = xb - com;
        let spin = omega.cross(&arm);

        let mut neighbours = Vec::new();
        grid.query(&xb, support, |i| markers[i].position(), &mut neighbours);

        let mut out = BceContact::default();
        for f in neighbours {
            let mf = &markers[f];
            let delta = xb - mf.position();
            let d = delta.norm();
            let w = (1.0 - d / support).max(0.0).powi(2);
            if w == 0.0 {
                continue;
            }
            let n = if d > 1.0e-12 { delta / d } else { Vector3::z() };
            let overlap = (1.0 - d / self.spacing).max(0.0);
            let f_mag = (mf.state.pressure.max(0.0) + self.stiffness * overlap) * self.area * w;
            let cw = self.damping * w;
            let elastic = n * f_mag;
            let pair = elastic - (vb - mf.velocity) * cw;

            out.load.force += elastic + (mf.velocity - spin) * cw;
            out.load.damping += cw;
            out.load.torque += arm.cross(&pair);
            out.reactions.push((f, -pair));
        }
        out
    }

    fn integrate(&mut self, body: &mut RigidBody, load: &BodyLoad, dt: f64) {
        let m = body.mass;
        let inv_inertia = body.inertia.map(|i| if i > 0.0 { 1.0 / i } else { 0.0 });
        let ang_acc = load.torque.component_mul(&inv_inertia);
        let gravity = self.gravity;
        let history = *self.history.entry(body.id).or_insert(BodyHistory {
            force: Vector3::zeros(),
            lin_acc: gravity,
            ang_acc: Vector3::zeros(),
        });

        let (velocity, omega, displacement) = match self.integrator {
            IntegratorConfig::SemiImplicitEuler => {
                let v = (body.linear_velocity + (gravity + load.force / m) * dt)
                    / (1.0 + dt * load.damping / m);
                let w = body.angular_velocity + ang_acc * dt;
                self.history.insert(
                    body.id,
                    BodyHistory {
                        force: load.force - v * load.damping,
                        lin_acc: (v - body.linear_velocity) / dt,
                        ang_acc,
                    },
                );
                (v, w, v * dt)
            }
            IntegratorConfig::Hht {
                alpha,
                max_iters,
                abs_tolerance,
                scaling,
            } => {
                let (gamma, beta) = hht_coefficients(alpha);
                let v0 = body.linear_velocity;
                let predicted =
                    |a: &Vector3<f64>| v0 + (history.lin_acc * (1.0 - gamma) + a * gamma) * dt;
                // Residual of m·a = m·g + (1+α)·F(v(a)) − α·F_prev, solved by
                // Newton iterations on a.
                let jacobian = m + (1.0 + alpha) * load.damping * gamma * dt;
                let mut a = history.lin_acc;
                let mut iters = 0;
                for k in 0..max_iters {
                    iters = k + 1;
                    let f_new = load.force - predicted(&a) * load.damping;
                    let residual =
                        a * m - gravity * m - f_new * (1.0 + alpha) + history.force * alpha;
                    let step = residual / jacobian;
                    a -= step;
                    let scale = if scaling { a.norm().max(1.0) } else { 1.0 };
                    if step.norm() <= abs_tolerance * scale {
                        break;
                    }
                }
                debug!("hht: body {} converged in {iters} iteration(s)", body.id);
                let v = predicted(&a);
                let dx = (v0 + (history.lin_acc * (0.5 - beta) + a * beta) * dt) * dt;
                let w = body.angular_velocity
                    + (history.ang_acc * (1.0 - gamma) + ang_acc * gamma) * dt;
                self.history.insert(
                    body.id,
                    BodyHistory {
                        force: load.force - v * load.damping,
                        lin_acc: a,
                        ang_acc,
                    },
                );
                (v, w, dx)
            }
        };

        body.linear_velocity = velocity;
        body.angular_velocity = omega;
        body.position += displacement;
        body.orientation = UnitQuaternion::from_scaled_axis(omega * dt) * body.orientation;
    }

    fn relax_bed(&mut self, state: &mut CoupledState, fluid: Range<usize>, dt: f64) {
        let decay = (-dt * self.sound_speed / self.kernel_length).exp();
        let inv_mass = 1.0 / self.marker_mass;
        let start = fluid.start;
        for i in fluid {
            let push = self.reactions[i - start];
            let marker = &mut state.markers_mut()[i];
            if push == Vector3::zeros() && marker.velocity == Vector3::zeros() {
                continue;
            }
            let mut v = (marker.velocity + push * (inv_mass * dt)) * decay;
            let mut x = marker.position() + v * dt;
            for axis in 0..3 {
                if x[axis] < self.interior.min[axis] {
                    x[axis] = self.interior.min[axis];
                    v[axis] = 0.0;
                } else if x[axis] > self.interior.max[axis] {
                    x[axis] = self.interior.max[axis];
                    v[axis] = 0.0;
                }
            }
            if v.norm() < REST_SPEED {
                v = Vector3::zeros();
            }
            marker.velocity = v;
            marker.set_position(x);
            marker.state = hydrostatic_state(&self.params, self.surface, x.z.min(self.surface));
        }
    }
}

impl CoupledSolver for PenaltyCouplingSolver {
    fn name(&self) -> &str {
        "penalty-coupling"
    }

    fn finalize(&mut self, state: &CoupledState) -> Result<(), SolverError> {
        if self.committed.is_some() {
            return Err(SolverError::AlreadyFinalized);
        }
        let fluid = state
            .reference()
            .get(0)
            .map(|s| s.range())
            .ok_or_else(|| SolverError::ExecutionFailed {
                reason: "no fluid segment".to_string(),
            })?;
        let grid = CellGrid::new(&self.bounds, self.support()).map_err(|e| {
            SolverError::ExecutionFailed {
                reason: e.to_string(),
            }
        })?;
        let fsi: Vec<(BodyId, Vec<usize>)> = state
            .fsi_bodies()
            .iter()
            .map(|&id| {
                let indices = state
                    .shells()
                    .iter()
                    .filter(|s| s.body == id)
                    .flat_map(|s| s.range.clone())
                    .collect();
                (id, indices)
            })
            .collect();
        for body in state.bodies().filter(|b| b.is_dynamic()) {
            self.history.insert(
                body.id,
                BodyHistory {
                    force: Vector3::zeros(),
                    lin_acc: self.gravity,
                    ang_acc: Vector3::zeros(),
                },
            );
        }
        self.reactions = vec![Vector3::zeros(); fluid.len()];
        self.committed = Some(Committed { grid, fluid, fsi });
        Ok(())
    }

    fn advance(&mut self, state: &mut CoupledState, step_ceiling: f64) -> Result<f64, SolverError> {
        if !(step_ceiling.is_finite() && step_ceiling > 0.0) {
            return Err(SolverError::InvalidStepCeiling {
                value: step_ceiling,
            });
        }
        let mut committed = self.committed.take().ok_or(SolverError::NotFinalized)?;

        // 1. Slave BCE markers and pick the step.
        state.sync_shells();
        let v_max = state
            .markers()
            .iter()
            .map(|m| m.velocity.norm())
            .fold(0.0, f64::max);
        let dt = self.nominal_dt.min(step_ceiling).min(self.stable_dt(v_max));

        // 2. Bin the bed and evaluate contacts per BCE marker.
        let markers = state.markers();
        committed.grid.rebuild(
            committed
                .fluid
                .clone()
                .map(|i| (i, markers[i].position())),
        );
        let mut loads: IndexMap<BodyId, BodyLoad> = IndexMap::new();
        self.reactions.iter_mut().for_each(|r| *r = Vector3::zeros());
        for (id, indices) in &committed.fsi {
            let Some(body) = state.body(*id) else {
                continue;
            };
            let (com, omega) = (body.position, body.angular_velocity);
            let grid = &committed.grid;
            let contacts: Vec<BceContact> = indices
                .par_iter()
                .map(|&b| self.bce_contact(grid, markers, b, &com, &omega))
                .collect();
            let load = loads.entry(*id).or_default();
            for c in &contacts {
                load.add(&c.load);
                for &(f, push) in &c.reactions {
                    self.reactions[f - committed.fluid.start] += push;
                }
            }
        }

        // 3. Integrate the dynamic bodies.
        let fluid = committed.fluid.clone();
        self.committed = Some(committed);
        for body in state.bodies_mut().filter(|b| b.is_dynamic()) {
            let load = loads.get(&body.id).copied().unwrap_or_default();
            self.integrate(body, &load, dt);
            if !body.is_finite() {
                return Err(SolverError::NonFinite { body: body.id });
            }
        }

        // 4. Let the bed respond and re-slave the shells.
        self.relax_bed(state, fluid, dt);
        state.sync_shells();
        Ok(dt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::SystemBuilder;
    use plunge_test_utils::coarse_params;

    fn built_state(p: &SimParams) -> CoupledState {
        let mut b = SystemBuilder::new(p.clone()).unwrap();
        b.build_fluid().unwrap();
        b.build_coupling().unwrap();
        b.into_state()
    }

    #[test]
    fn advance_before_finalize_rejected() {
        let p = coarse_params();
        let mut s = PenaltyCouplingSolver::new(&p).unwrap();
        let mut state = built_state(&p);
        assert_eq!(s.advance(&mut state, 1e-3), Err(SolverError::NotFinalized));
    }

    #[test]
    fn second_finalize_rejected() {
        let p = coarse_params();
        let mut s = PenaltyCouplingSolver::new(&p).unwrap();
        let state = built_state(&p);
        s.finalize(&state).unwrap();
        assert_eq!(s.finalize(&state), Err(SolverError::AlreadyFinalized));
    }

    #[test]
    fn step_respects_ceiling_and_cfl() {
        let p = coarse_params();
        let mut s = PenaltyCouplingSolver::new(&p).unwrap();
        let mut state = built_state(&p);
        s.finalize(&state).unwrap();
        let dt = s.advance(&mut state, 1.0e-5).unwrap();
        assert_eq!(dt, 1.0e-5);
        let dt = s.advance(&mut state, 1.0).unwrap();
        assert!(dt <= p.time.dt);
        assert!(dt <= s.stable_dt(0.0));
    }

    #[test]
    fn bad_ceiling_rejected() {
        let p = coarse_params();
        let mut s = PenaltyCouplingSolver::new(&p).unwrap();
        let mut state = built_state(&p);
        s.finalize(&state).unwrap();
        match s.advance(&mut state, f64::NAN) {
            Err(SolverError::InvalidStepCeiling { .. }) => {}
            other => panic!("expected InvalidStepCeiling, got {other:?}"),
        }
    }

    #[test]
    fn sphere_falls_before_contact() {
        let mut p = coarse_params();
        p.body.initial_position[2] = 0.0;
        let mut s = PenaltyCouplingSolver::new(&p).unwrap();
        let mut state = built_state(&p);
        let sphere = state.fsi_bodies()[0];
        // Lift the sphere well clear of the bed.
        state.body_mut(sphere).unwrap().position.z += 0.2;
        state.sync_shells();
        s.finalize(&state).unwrap();
        let z0 = state.body(sphere).unwrap().position.z;
        s.advance(&mut state, 1.0e-4).unwrap();
        let body = state.body(sphere).unwrap();
        assert!(body.linear_velocity.z < 0.0);
        assert!(body.position.z < z0);
    }

    #[test]
    fn shells_follow_after_advance() {
        let p = coarse_params();
        let mut s = PenaltyCouplingSolver::new(&p).unwrap();
        let mut state = built_state(&p);
        s.finalize(&state).unwrap();
        for _ in 0..5 {
            s.advance(&mut state, 1.0e-3).unwrap();
        }
        let sphere_id = state.fsi_bodies()[0];
        let body = state.body(sphere_id).unwrap().clone();
        let shell = state.shells().iter().find(|sh| sh.body == sphere_id).unwrap();
        for (idx, local) in shell.range.clone().zip(&shell.body_points) {
            let expected = body.pose().transform_point(&(*local).into()).coords;
            assert!((state.markers()[idx].position() - expected).norm() < 1e-12);
        }
    }

    #[test]
    fn integrators_agree_in_free_fall() {
        let mut euler = coarse_params();
        euler.run.integrator = IntegratorConfig::SemiImplicitEuler;
        let hht = coarse_params();
        let mut a = PenaltyCouplingSolver::new(&euler).unwrap();
        let mut b = PenaltyCouplingSolver::new(&hht).unwrap();
        let mut body_a = RigidBody::solid_sphere(0.03, 2500.0, Vector3::new(0.0, 0.0, 1.0));
        let mut body_b = body_a.clone();
        for _ in 0..10 {
            a.integrate(&mut body_a, &BodyLoad::default(), 1.0e-3);
            b.integrate(&mut body_b, &BodyLoad::default(), 1.0e-3);
        }
        // Both reach v = g·t exactly in free fall.
        assert!((body_a.linear_velocity.z + 9.81e-2).abs() < 1e-9);
        assert!((body_b.linear_velocity.z + 9.81e-2).abs() < 1e-9);
        assert!((body_a.position.z - body_b.position.z).abs() < 1e-3);
    }

    #[test]
    fn implicit_damping_is_stable_for_stiff_dampers() {
        let p = coarse_params();
        let mut s = PenaltyCouplingSolver::new(&p).unwrap();
        let mut body = RigidBody::solid_sphere(0.03, 2500.0, Vector3::zeros());
        body.linear_velocity = Vector3::new(0.0, 0.0, -2.0);
        let load = BodyLoad {
            force: Vector3::zeros(),
            damping: 1.0e6,
            torque: Vector3::zeros(),
        };
        for _ in 0..20 {
            s.integrate(&mut body, &load, 1.0e-3);
        }
        assert!(body.is_finite());
        assert!(body.linear_velocity.norm() < 2.0);
    }
}
