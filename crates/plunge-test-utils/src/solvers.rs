//! Mock coupled solvers.
//!
//! - [`ScriptedSolver`]: fixed-step ballistic advance, no fluid forces.
//! - [`FailingSolver`]: succeeds N times, then returns a chosen error.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use nalgebra::Vector3;
use plunge_core::{CoupledSolver, CoupledState, SolverError};

/// Shared record of the step ceilings handed to a [`ScriptedSolver`].
///
/// Clone it before boxing the solver; the clone keeps observing.
#[derive(Clone, Debug, Default)]
pub struct StepRecorder {
    ceilings: Arc<Mutex<Vec<f64>>>,
}

impl StepRecorder {
    pub fn ceilings(&self) -> Vec<f64> {
        self.ceilings.lock().map(|c| c.clone()).unwrap_or_default()
    }

    pub fn calls(&self) -> usize {
        self.ceilings.lock().map(|c| c.len()).unwrap_or(0)
    }

    fn push(&self, ceiling: f64) {
        if let Ok(mut c) = self.ceilings.lock() {
            c.push(ceiling);
        }
    }
}

/// Moves every dynamic body under gravity alone, taking
/// `min(dt, ceiling)` per advance.
pub struct ScriptedSolver {
    dt: f64,
    gravity: Vector3<f64>,
    finalized: bool,
    recorder: StepRecorder,
}

impl ScriptedSolver {
    pub fn new(dt: f64, gravity: Vector3<f64>) -> Self {
        Self {
            dt,
            gravity,
            finalized: false,
            recorder: StepRecorder::default(),
        }
    }

    /// Handle that observes the ceilings of every advance.
    pub fn recorder(&self) -> StepRecorder {
        self.recorder.clone()
    }
}

impl CoupledSolver for ScriptedSolver {
    fn name(&self) -> &str {
        "scripted"
    }

    fn finalize(&mut self, _state: &CoupledState) -> Result<(), SolverError> {
        if self.finalized {
            return Err(SolverError::AlreadyFinalized);
        }
        self.finalized = true;
        Ok(())
    }

    fn advance(&mut self, state: &mut CoupledState, step_ceiling: f64) -> Result<f64, SolverError> {
        if !self.finalized {
            return Err(SolverError::NotFinalized);
        }
        self.recorder.push(step_ceiling);
        let dt = self.dt.min(step_ceiling);
        for body in state.bodies_mut().filter(|b| b.is_dynamic()) {
            body.linear_velocity += self.gravity * dt;
            body.position += body.linear_velocity * dt;
        }
        state.sync_shells();
        Ok(dt)
    }
}

/// Advances by a fixed step `succeed_count` times, then fails.
pub struct FailingSolver {
    dt: f64,
    succeed_count: usize,
    call_count: AtomicUsize,
    error: SolverError,
}

impl FailingSolver {
    pub fn new(dt: f64, succeed_count: usize) -> Self {
        Self::with_error(
            dt,
            succeed_count,
            SolverError::ExecutionFailed {
                reason: "deliberate failure".into(),
            },
        )
    }

    pub fn with_error(dt: f64, succeed_count: usize, error: SolverError) -> Self {
        Self {
            dt,
            succeed_count,
            call_count: AtomicUsize::new(0),
            error,
        }
    }

    /// Advances attempted so far, including the failing one.
    pub fn calls(&self) -> usize {
        self.call_count.load(Ordering::Relaxed)
    }
}

impl CoupledSolver for FailingSolver {
    fn name(&self) -> &str {
        "failing"
    }

    fn finalize(&mut self, _state: &CoupledState) -> Result<(), SolverError> {
        Ok(())
    }

    fn advance(
        &mut self,
        _state: &mut CoupledState,
        step_ceiling: f64,
    ) -> Result<f64, SolverError> {
        let n = self.call_count.fetch_add(1, Ordering::Relaxed);
        if n >= self.succeed_count {
            return Err(self.error.clone());
        }
        Ok(self.dt.min(step_ceiling))
    }
}
