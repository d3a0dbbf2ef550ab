//! The coupled solver collaborator.

use crate::error::SolverError;
use crate::state::CoupledState;

/// One coupled advance of the particle field and the rigid bodies.
///
/// The system hands the solver exclusive access to the state for the
/// duration of each call and reads it back only after the call returns.
///
/// # Contract
///
/// - [`finalize`](CoupledSolver::finalize) is called exactly once, after
///   construction completes and before the first advance. A second call
///   returns [`SolverError::AlreadyFinalized`].
/// - [`advance`](CoupledSolver::advance) takes a step no larger than
///   `step_ceiling` and returns the step actually taken, which must be
///   finite and strictly positive.
pub trait CoupledSolver: Send {
    /// Human-readable name, used in log lines.
    fn name(&self) -> &str;

    /// Commit the constructed system. Caches whatever the solver needs
    /// from the final marker layout.
    fn finalize(&mut self, state: &CoupledState) -> Result<(), SolverError>;

    /// Advance both the particle field and the rigid bodies by one step
    /// bounded by `step_ceiling`. Returns the step taken.
    fn advance(&mut self, state: &mut CoupledState, step_ceiling: f64) -> Result<f64, SolverError>;
}

impl<S: CoupledSolver + ?Sized> CoupledSolver for Box<S> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn finalize(&mut self, state: &CoupledState) -> Result<(), SolverError> {
        (**self).finalize(state)
    }

    fn advance(&mut self, state: &mut CoupledState, step_ceiling: f64) -> Result<f64, SolverError> {
        (**self).advance(state, step_ceiling)
    }
}
