//! A committed coupled system: state plus the solver that advances it.

use plunge_core::{CoupledSolver, CoupledState, RigidBody, SimParams, SolverError};
use plunge_space::DomainLayout;

use crate::coupling::{reference_height, CouplingSummary};

/// The finalized state and its solver.
///
/// Created by [`SystemBuilder::finalize`](crate::SystemBuilder::finalize).
/// The solver holds the state only for the duration of one
/// [`advance`](Self::advance).
pub struct CoupledSystem {
    params: SimParams,
    layout: DomainLayout,
    state: CoupledState,
    solver: Box<dyn CoupledSolver>,
    coupling: CouplingSummary,
    fluid_count: usize,
    reference_height: f64,
}

impl CoupledSystem {
    pub(crate) fn new(
        params: SimParams,
        layout: DomainLayout,
        state: CoupledState,
        solver: Box<dyn CoupledSolver>,
        coupling: CouplingSummary,
        fluid_count: usize,
    ) -> Self {
        let reference_height = reference_height(&layout, &params);
        Self {
            params,
            layout,
            state,
            solver,
            coupling,
            fluid_count,
            reference_height,
        }
    }

    /// Run one coupled advance bounded by `step_ceiling` and return the
    /// step taken.
    ///
    /// A step that is not finite, not positive or larger than the ceiling
    /// is reported as a solver failure.
    pub fn advance(&mut self, step_ceiling: f64) -> Result<f64, SolverError> {
        let dt = self.solver.advance(&mut self.state, step_ceiling)?;
        if !dt.is_finite() || dt <= 0.0 {
            return Err(SolverError::ExecutionFailed {
                reason: format!("solver '{}' took an invalid step {dt}", self.solver.name()),
            });
        }
        if dt > step_ceiling * (1.0 + 1.0e-12) {
            return Err(SolverError::ExecutionFailed {
                reason: format!(
                    "solver '{}' overshot the step ceiling: {dt} > {step_ceiling}",
                    self.solver.name()
                ),
            });
        }
        Ok(dt)
    }

    /// Current parameters. `time.dt_max` holds the latest step ceiling.
    pub fn params(&self) -> &SimParams {
        &self.params
    }

    /// Record the adaptive step ceiling in the parameters.
    pub fn set_step_ceiling(&mut self, dt_max: f64) {
        self.params.time.dt_max = dt_max;
    }

    /// Domain layout the system was built on.
    pub fn layout(&self) -> &DomainLayout {
        &self.layout
    }

    /// The coupled state.
    pub fn state(&self) -> &CoupledState {
        &self.state
    }

    /// Ids and marker counts from the coupling stage.
    pub fn coupling(&self) -> &CouplingSummary {
        &self.coupling
    }

    /// Number of fluid markers.
    pub fn fluid_count(&self) -> usize {
        self.fluid_count
    }

    /// Centre height of a sphere resting on the undisturbed bed.
    pub fn reference_height(&self) -> f64 {
        self.reference_height
    }

    /// The dropped sphere.
    pub fn sphere(&self) -> Option<&RigidBody> {
        self.state.body(self.coupling.sphere)
    }

    /// Name of the solver driving this system.
    pub fn solver_name(&self) -> &str {
        self.solver.name()
    }
}
