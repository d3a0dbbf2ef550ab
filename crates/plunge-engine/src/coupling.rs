//! Container walls, the dropped sphere and their BCE shells.

use log::info;
use nalgebra::{Isometry3, Vector3};
use plunge_core::{
    BodyId, BuildError, CollisionBox, CollisionShape, CoupledState, Facing, MarkerState, Phase,
    RigidBody, ShellGeometry, ShellSpec, SimParams, SurfaceKind,
};
use plunge_space::{box_shell, sphere_shell, DomainLayout};

// ── Walls ──────────────────────────────────────────────────────────

/// One wall of the container.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WallSpec {
    /// Which face of the container this wall is.
    pub kind: SurfaceKind,
    /// Centre of the wall box.
    pub center: Vector3<f64>,
    /// Half-lengths of the wall box.
    pub half_extents: Vector3<f64>,
    /// Extra shift applied to the collision box only.
    pub collision_offset: Vector3<f64>,
}

impl WallSpec {
    /// Face of the wall box that looks into the container.
    pub fn facing(&self) -> Facing {
        let axis = self.kind.normal_axis().unwrap_or(2);
        Facing::toward_origin(&self.center, axis)
    }
}

/// The five walls of the open-top container: floor, two walls normal
/// to x, two walls normal to y. Every wall overshoots the container by
/// `3·s` so the corners are closed.
pub fn container_walls(layout: &DomainLayout) -> [WallSpec; 5] {
    let b = layout.box_dims();
    let s = layout.spacing();
    let (hx, hy, hz) = (b.x / 2.0, b.y / 2.0, b.z / 2.0);
    let side_half = Vector3::new(2.0 * s, hy + 3.0 * s, hz);
    let end_half = Vector3::new(hx, 2.0 * s, hz);
    [
        WallSpec {
            kind: SurfaceKind::Bottom,
            center: Vector3::new(0.0, 0.0, -3.0 * s),
            half_extents: Vector3::new(hx + 3.0 * s, hy + 3.0 * s, 2.0 * s),
            collision_offset: Vector3::zeros(),
        },
        WallSpec {
            kind: SurfaceKind::SideX,
            center: Vector3::new(hx + s, 0.0, hz),
            half_extents: side_half,
            collision_offset: Vector3::zeros(),
        },
        WallSpec {
            kind: SurfaceKind::SideX,
            center: Vector3::new(-hx - 3.0 * s, 0.0, hz),
            half_extents: side_half,
            collision_offset: Vector3::zeros(),
        },
        WallSpec {
            kind: SurfaceKind::EndY,
            center: Vector3::new(0.0, hy + s, hz),
            half_extents: end_half,
            collision_offset: Vector3::new(1.5 * s, 1.5 * s, 0.0),
        },
        WallSpec {
            kind: SurfaceKind::EndY,
            center: Vector3::new(0.0, -hy - 3.0 * s, hz),
            half_extents: end_half,
            collision_offset: Vector3::new(-0.5 * s, -0.5 * s, 0.0),
        },
    ]
}

// ── Sphere placement ───────────────────────────────────────────────

/// Centre height of a sphere resting on the undisturbed bed; the
/// penetration depth is measured from here.
pub fn reference_height(layout: &DomainLayout, params: &SimParams) -> f64 {
    layout.fluid_height() + params.body.radius + 0.5 * layout.spacing()
}

/// Initial position and velocity of the sphere.
///
/// The sphere starts just above the bed with the speed it would have
/// gained falling freely from `body.initial_position.z`.
pub fn sphere_start(layout: &DomainLayout, params: &SimParams) -> (Vector3<f64>, Vector3<f64>) {
    let [x0, y0, drop_height] = params.body.initial_position;
    let position = Vector3::new(x0, y0, reference_height(layout, params));
    let speed = (2.0 * params.fluid.gravity[2].abs() * drop_height).sqrt();
    (position, Vector3::new(0.0, 0.0, -speed))
}

// ── Builder ────────────────────────────────────────────────────────

/// What the coupling stage created.
#[derive(Clone, Debug, PartialEq)]
pub struct CouplingSummary {
    /// The fixed container body.
    pub container: BodyId,
    /// The dropped sphere.
    pub sphere: BodyId,
    /// BCE markers on the container walls.
    pub wall_markers: usize,
    /// BCE markers on the sphere.
    pub sphere_markers: usize,
    /// Physical mass of the sphere.
    pub sphere_mass: f64,
    /// Sphere BCE count times marker mass. Diagnostic only.
    pub fsi_mass: f64,
}

fn bce_state(params: &SimParams) -> MarkerState {
    MarkerState {
        density: params.fluid.density,
        pressure: 0.0,
        viscosity: params.fluid.viscosity,
        phase: Phase::Boundary,
    }
}

/// Build the container and its wall shells. Returns the body id and the
/// number of BCE markers attached.
pub fn build_container(
    state: &mut CoupledState,
    layout: &DomainLayout,
    params: &SimParams,
) -> Result<(BodyId, usize), BuildError> {
    let s = layout.spacing();
    let walls = container_walls(layout);
    let boxes = walls
        .iter()
        .map(|w| CollisionBox {
            half_extents: w.half_extents,
            offset: w.center + w.collision_offset,
        })
        .collect();
    let mut body = RigidBody::fixed(CollisionShape::Compound(boxes));
    body.collide = false;
    body.safe_margin = 0.5 * s;
    let id = state.add_rigid_body(body);

    let bounds = layout.compute_bounds();
    let layers = params.sph.boundary_layers;
    let mut total = 0;
    for wall in &walls {
        let axis = wall.kind.normal_axis().unwrap_or(2);
        let facing = wall.facing();
        let points = box_shell(&wall.half_extents, axis, facing, layers, s)?
            .into_iter()
            .filter(|p| bounds.contains(&(wall.center + p)))
            .collect();
        let spec = ShellSpec {
            kind: wall.kind,
            geometry: ShellGeometry::Box {
                half_extents: wall.half_extents,
                facing,
            },
            local_pose: Isometry3::translation(wall.center.x, wall.center.y, wall.center.z),
            points,
        };
        total += state
            .add_boundary_shell(id, spec, bce_state(params), params.sph.kernel_length)?
            .len();
    }
    Ok((id, total))
}

/// Build the sphere, attach its shell and register it for force
/// back-coupling. Returns the body id and the number of BCE markers.
pub fn build_sphere(
    state: &mut CoupledState,
    layout: &DomainLayout,
    params: &SimParams,
) -> Result<(BodyId, usize), BuildError> {
    let s = layout.spacing();
    let r = params.body.radius;
    let (position, velocity) = sphere_start(layout, params);
    let mut body = RigidBody::solid_sphere(r, params.body.density, position);
    body.linear_velocity = velocity;
    body.safe_margin = s;
    let id = state.add_rigid_body(body);

    let spec = ShellSpec {
        kind: SurfaceKind::Sphere,
        geometry: ShellGeometry::Sphere { radius: r },
        local_pose: Isometry3::identity(),
        points: sphere_shell(r, params.sph.boundary_layers, s)?,
    };
    let range = state.add_boundary_shell(id, spec, bce_state(params), params.sph.kernel_length)?;
    state.add_fsi_body(id)?;
    Ok((id, range.len()))
}

/// Attach the container and the sphere to a state that holds exactly
/// the fluid and boundary segments.
pub fn attach_coupling(
    state: &mut CoupledState,
    layout: &DomainLayout,
    params: &SimParams,
) -> Result<CouplingSummary, BuildError> {
    if state.reference().len() != 2 {
        return Err(BuildError::UnexpectedSegmentCount {
            expected: 2,
            found: state.reference().len(),
        });
    }
    let (container, wall_markers) = build_container(state, layout, params)?;
    let (sphere, sphere_markers) = build_sphere(state, layout, params)?;
    let sphere_mass = state
        .body(sphere)
        .map(|b| b.mass)
        .ok_or(BuildError::UnknownBody { id: sphere })?;
    let fsi_mass = state.fsi_mass(sphere, params.marker_mass());

    info!(
        "coupling attached: {wall_markers} wall BCE, {sphere_markers} sphere BCE, \
         sphere mass {sphere_mass:.4} kg (FSI mass {fsi_mass:.4} kg, diagnostic)"
    );
    Ok(CouplingSummary {
        container,
        sphere,
        wall_markers,
        sphere_markers,
        sphere_mass,
        fsi_mass,
    })
}
