//! Per-step timing and the end-of-run summary.

use std::fmt;

/// Timing and stepping data collected during one driver iteration.
///
/// All durations are in microseconds.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct StepMetrics {
    /// 1-based iteration number.
    pub iteration: u64,
    /// Simulation time after the step.
    pub time: f64,
    /// Step actually taken by the solver.
    pub dt: f64,
    /// Ceiling handed to the solver.
    pub step_ceiling: f64,
    /// Whether this iteration wrote a snapshot.
    pub frame_exported: bool,
    /// Wall-clock time inside the coupled advance.
    pub advance_us: u64,
    /// Wall-clock time spent exporting and logging.
    pub export_us: u64,
    /// Wall-clock time for the whole iteration.
    pub total_us: u64,
    /// Penetration depth recorded for this iteration.
    pub penetration_depth: f64,
}

/// Why a run stopped.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TerminationReason {
    /// Simulation time passed the configured end time.
    EndTime,
    /// The iteration ceiling was reached first.
    IterationLimit,
}

impl fmt::Display for TerminationReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EndTime => write!(f, "end time reached"),
            Self::IterationLimit => write!(f, "iteration limit reached"),
        }
    }
}

/// Outcome of a driver run.
#[derive(Clone, Debug, PartialEq)]
pub struct RunSummary {
    /// Iterations completed.
    pub iterations: u64,
    /// Simulation time at the end.
    pub final_time: f64,
    /// Snapshots written.
    pub frames_exported: u64,
    /// `None` while the run is still stepping.
    pub termination: Option<TerminationReason>,
    /// Last recorded penetration depth.
    pub final_penetration_depth: f64,
    /// Rows in the penetration log, the initial row included.
    pub log_rows: u64,
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reason = self
            .termination
            .map_or_else(|| "still running".to_string(), |r| r.to_string());
        write!(
            f,
            "{} iteration(s), t = {:.6} s, {} frame(s), depth {:.6} m ({reason})",
            self.iterations, self.final_time, self.frames_exported, self.final_penetration_depth
        )
    }
}
