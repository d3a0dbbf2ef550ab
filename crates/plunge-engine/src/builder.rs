//! Staged construction of a [`CoupledSystem`].
//!
//! The stages must run in order: fluid, then coupling, then
//! [`finalize`](SystemBuilder::finalize). Each stage runs at most once.

use log::info;
use plunge_core::{BuildError, BuildStage, CoupledSolver, CoupledState, SimParams};
use plunge_space::DomainLayout;

use crate::coupling::{attach_coupling, CouplingSummary};
use crate::error::DriverError;
use crate::fluid::initialize_fluid;
use crate::system::CoupledSystem;

/// Builds the marker field, the bodies and their shells, then commits
/// them to a solver.
pub struct SystemBuilder {
    params: SimParams,
    layout: DomainLayout,
    state: CoupledState,
    fluid_count: Option<usize>,
    coupling: Option<CouplingSummary>,
}

impl SystemBuilder {
    /// Validate `params` and derive the domain layout.
    pub fn new(params: SimParams) -> Result<Self, DriverError> {
        params.validate()?;
        let layout = DomainLayout::from_params(&params)?;
        Ok(Self {
            params,
            layout,
            state: CoupledState::new(),
            fluid_count: None,
            coupling: None,
        })
    }

    /// The validated parameters.
    pub fn params(&self) -> &SimParams {
        &self.params
    }

    /// The derived layout.
    pub fn layout(&self) -> &DomainLayout {
        &self.layout
    }

    /// The state built so far.
    pub fn state(&self) -> &CoupledState {
        &self.state
    }

    /// Whether `stage` has completed.
    pub fn completed(&self, stage: BuildStage) -> bool {
        match stage {
            BuildStage::Fluid => self.fluid_count.is_some(),
            BuildStage::Coupling => self.coupling.is_some(),
        }
    }

    /// Sample the particle bed. Returns the fluid marker count.
    pub fn build_fluid(&mut self) -> Result<usize, BuildError> {
        if self.fluid_count.is_some() {
            return Err(BuildError::StageOutOfOrder {
                stage: BuildStage::Fluid,
            });
        }
        let n = initialize_fluid(&mut self.state, &self.layout, &self.params)?;
        self.fluid_count = Some(n);
        Ok(n)
    }

    /// Attach the container and the sphere.
    pub fn build_coupling(&mut self) -> Result<&CouplingSummary, BuildError> {
        if self.fluid_count.is_none() || self.coupling.is_some() {
            return Err(BuildError::StageOutOfOrder {
                stage: BuildStage::Coupling,
            });
        }
        let summary = attach_coupling(&mut self.state, &self.layout, &self.params)?;
        Ok(self.coupling.insert(summary))
    }

    /// Give up on finalizing and take the state as built so far.
    pub fn into_state(self) -> CoupledState {
        self.state
    }

    /// Commit the system to `solver`.
    ///
    /// Fails with [`BuildError::NotReady`] naming the first stage that has
    /// not run, then re-checks segment coverage before the solver sees
    /// the state.
    pub fn finalize(self, mut solver: Box<dyn CoupledSolver>) -> Result<CoupledSystem, BuildError> {
        let Some(fluid_count) = self.fluid_count else {
            return Err(BuildError::NotReady {
                missing: BuildStage::Fluid,
            });
        };
        let Some(coupling) = self.coupling else {
            return Err(BuildError::NotReady {
                missing: BuildStage::Coupling,
            });
        };
        self.state.reference().validate(self.state.marker_count())?;
        solver.finalize(&self.state)?;
        info!(
            "system finalized with solver '{}': {} markers ({} fluid), {} bodies",
            solver.name(),
            self.state.marker_count(),
            fluid_count,
            self.state.body_count()
        );
        Ok(CoupledSystem::new(
            self.params,
            self.layout,
            self.state,
            solver,
            coupling,
            fluid_count,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Vector3;
    use plunge_core::{ConfigError, Phase};
    use plunge_test_utils::{coarse_params, ScriptedSolver};

    fn scripted() -> Box<dyn CoupledSolver> {
        Box::new(ScriptedSolver::new(1e-4, Vector3::new(0.0, 0.0, -9.81)))
    }

    #[test]
    fn invalid_params_rejected_before_building() {
        let mut p = coarse_params();
        p.sph.kernel_length = -1.0;
        match SystemBuilder::new(p) {
            Err(DriverError::Config(ConfigError::NonPositive { .. })) => {}
            Err(other) => panic!("expected Config(NonPositive), got {other:?}"),
            Ok(_) => panic!("expected Config(NonPositive), got a builder"),
        }
    }

    #[test]
    fn sphere_below_floor_never_reaches_the_solver() {
        let mut p = coarse_params();
        p.body.initial_position[2] = -0.1;
        match SystemBuilder::new(p) {
            Err(DriverError::Config(ConfigError::NegativeDropHeight { .. })) => {}
            Err(other) => panic!("expected Config(NegativeDropHeight), got {other:?}"),
            Ok(_) => panic!("expected Config(NegativeDropHeight), got a builder"),
        }
    }

    #[test]
    fn finalize_without_fluid_not_ready() {
        let b = SystemBuilder::new(coarse_params()).unwrap();
        match b.finalize(scripted()) {
            Err(BuildError::NotReady {
                missing: BuildStage::Fluid,
            }) => {}
            other => panic!("expected NotReady(Fluid), got {:?}", other.err()),
        }
    }

    #[test]
    fn finalize_without_coupling_not_ready() {
        let mut b = SystemBuilder::new(coarse_params()).unwrap();
        b.build_fluid().unwrap();
        match b.finalize(scripted()) {
            Err(BuildError::NotReady {
                missing: BuildStage::Coupling,
            }) => {}
            other => panic!("expected NotReady(Coupling), got {:?}", other.err()),
        }
    }

    #[test]
    fn coupling_before_fluid_out_of_order() {
        let mut b = SystemBuilder::new(coarse_params()).unwrap();
        assert_eq!(
            b.build_coupling().err(),
            Some(BuildError::StageOutOfOrder {
                stage: BuildStage::Coupling
            })
        );
    }

    #[test]
    fn repeated_fluid_out_of_order() {
        let mut b = SystemBuilder::new(coarse_params()).unwrap();
        b.build_fluid().unwrap();
        assert_eq!(
            b.build_fluid(),
            Err(BuildError::StageOutOfOrder {
                stage: BuildStage::Fluid
            })
        );
    }

    #[test]
    fn full_build_leaves_two_segments_covering_everything() {
        let mut b = SystemBuilder::new(coarse_params()).unwrap();
        let n = b.build_fluid().unwrap();
        b.build_coupling().unwrap();
        assert!(b.completed(BuildStage::Coupling));
        let system = b.finalize(scripted()).unwrap();
        let segs = system.state().reference().segments();
        assert_eq!(segs.len(), 2);
        assert_eq!((segs[0].start, segs[0].end), (0, n));
        assert_eq!(segs[1].phase, Phase::Boundary);
        assert_eq!(segs[1].start, n);
        assert_eq!(segs[1].end, system.state().marker_count());
    }
}
