//! Error types for the Plunge driver.
//!
//! Organized by failure class: configuration (bad parameters, caught
//! before any state exists), construction (structural invariants of the
//! marker/segment bookkeeping), and solver (failures reported by the
//! coupled advance).

use std::error::Error;
use std::fmt;

use crate::id::BodyId;

// ── ConfigError ────────────────────────────────────────────────────

/// Errors detected while loading or validating [`SimParams`](crate::SimParams).
///
/// All of these are fatal at startup: the run never builds any state.
#[derive(Clone, Debug, PartialEq)]
pub enum ConfigError {
    /// The parameter file could not be read.
    Io {
        /// Path that was being read.
        path: String,
        /// Description of the I/O failure.
        reason: String,
    },
    /// The parameter document is not valid JSON or misses a field.
    Parse {
        /// Parser diagnostic.
        reason: String,
    },
    /// A quantity that must be strictly positive is zero or negative.
    NonPositive {
        /// Dotted name of the offending parameter.
        field: &'static str,
        /// The rejected value.
        value: f64,
    },
    /// A quantity is NaN or infinite.
    NonFinite {
        /// Dotted name of the offending parameter.
        field: &'static str,
    },
    /// The fluid box does not fit inside the container.
    FluidExceedsBox {
        /// Axis name (`"x"`, `"y"` or `"z"`).
        axis: &'static str,
        /// Fluid extent along that axis.
        fluid: f64,
        /// Container extent along that axis.
        container: f64,
    },
    /// The nominal time step exceeds the step ceiling.
    TimeStepOrder {
        /// Configured nominal step.
        dt: f64,
        /// Configured ceiling.
        dt_max: f64,
    },
    /// The sphere starts below the container floor.
    NegativeDropHeight {
        /// Configured `body.initial_position` z.
        value: f64,
    },
    /// `sph.boundary_layers` is zero.
    NoBoundaryLayers,
    /// `run.max_iterations` is zero.
    ZeroIterations,
    /// The rigid integrator settings are out of range.
    InvalidIntegrator {
        /// Description of which setting was rejected.
        reason: String,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { path, reason } => write!(f, "cannot read '{path}': {reason}"),
            Self::Parse { reason } => write!(f, "malformed parameter file: {reason}"),
            Self::NonPositive { field, value } => {
                write!(f, "{field} must be positive, got {value}")
            }
            Self::NonFinite { field } => write!(f, "{field} must be finite"),
            Self::FluidExceedsBox {
                axis,
                fluid,
                container,
            } => write!(
                f,
                "fluid extent {fluid} along {axis} exceeds container extent {container}"
            ),
            Self::TimeStepOrder { dt, dt_max } => {
                write!(f, "time.dt ({dt}) exceeds time.dt_max ({dt_max})")
            }
            Self::NegativeDropHeight { value } => {
                write!(f, "body.initial_position z must be non-negative, got {value}")
            }
            Self::NoBoundaryLayers => write!(f, "sph.boundary_layers must be at least 1"),
            Self::ZeroIterations => write!(f, "run.max_iterations must be at least 1"),
            Self::InvalidIntegrator { reason } => write!(f, "invalid integrator: {reason}"),
        }
    }
}

impl Error for ConfigError {}

// ── BuildStage ─────────────────────────────────────────────────────

/// Construction stages of a coupled system, in the order they must run.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BuildStage {
    /// Fluid lattice sampled and the two reference segments inserted.
    Fluid,
    /// Container, sphere and their BCE shells attached.
    Coupling,
}

impl fmt::Display for BuildStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fluid => write!(f, "fluid"),
            Self::Coupling => write!(f, "coupling"),
        }
    }
}

// ── BuildError ─────────────────────────────────────────────────────

/// Structural invariant violations during system construction.
///
/// These indicate an ordering bug in the caller, not a runtime condition;
/// the run is aborted when one surfaces.
#[derive(Clone, Debug, PartialEq)]
pub enum BuildError {
    /// The reference array already held segments when the fluid stage ran.
    SegmentsAlreadyPresent {
        /// Number of segments found.
        count: usize,
    },
    /// The reference array did not hold the expected number of segments.
    UnexpectedSegmentCount {
        /// Segments the stage expected.
        expected: usize,
        /// Segments actually present.
        found: usize,
    },
    /// A new segment does not start where the previous one ended.
    NonContiguousSegment {
        /// Index where the segment had to start.
        expected_start: usize,
        /// Index where it actually starts.
        found_start: usize,
    },
    /// A segment ends before it starts.
    InvertedSegment {
        /// Segment start.
        start: usize,
        /// Segment end.
        end: usize,
    },
    /// The segments do not cover the marker array exactly.
    SegmentCoverage {
        /// End of the last segment.
        covered: usize,
        /// Number of markers in the array.
        markers: usize,
    },
    /// `finalize()` was called before a stage completed.
    NotReady {
        /// The first stage that has not completed.
        missing: BuildStage,
    },
    /// A stage was run a second time, or out of order.
    StageOutOfOrder {
        /// The stage that was requested.
        stage: BuildStage,
    },
    /// A body id does not refer to a registered rigid body.
    UnknownBody {
        /// The unrecognised id.
        id: BodyId,
    },
    /// Shell or lattice geometry was rejected by the sampler.
    InvalidGeometry {
        /// Sampler diagnostic.
        reason: String,
    },
    /// The coupled solver refused to commit the system.
    Solver(SolverError),
}

impl fmt::Display for BuildError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SegmentsAlreadyPresent { count } => write!(
                f,
                "reference array already holds {count} segment(s) before fluid initialization"
            ),
            Self::UnexpectedSegmentCount { expected, found } => write!(
                f,
                "reference array holds {found} segment(s), expected {expected}"
            ),
            Self::NonContiguousSegment {
                expected_start,
                found_start,
            } => write!(
                f,
                "segment starts at {found_start}, previous segment ends at {expected_start}"
            ),
            Self::InvertedSegment { start, end } => {
                write!(f, "segment end {end} precedes start {start}")
            }
            Self::SegmentCoverage { covered, markers } => write!(
                f,
                "segments cover {covered} marker(s) but the array holds {markers}"
            ),
            Self::NotReady { missing } => {
                write!(f, "system not ready: {missing} stage has not completed")
            }
            Self::StageOutOfOrder { stage } => {
                write!(f, "{stage} stage requested out of order")
            }
            Self::UnknownBody { id } => write!(f, "unknown rigid body {id}"),
            Self::InvalidGeometry { reason } => write!(f, "invalid geometry: {reason}"),
            Self::Solver(e) => write!(f, "solver: {e}"),
        }
    }
}

impl Error for BuildError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Solver(e) => Some(e),
            _ => None,
        }
    }
}

impl From<SolverError> for BuildError {
    fn from(e: SolverError) -> Self {
        Self::Solver(e)
    }
}

// ── SolverError ────────────────────────────────────────────────────

/// Errors reported by a [`CoupledSolver`](crate::CoupledSolver).
#[derive(Clone, Debug, PartialEq)]
pub enum SolverError {
    /// `finalize()` was called on an already committed solver.
    AlreadyFinalized,
    /// `advance()` was called before `finalize()`.
    NotFinalized,
    /// The step ceiling handed to `advance()` is not finite and positive.
    InvalidStepCeiling {
        /// The rejected ceiling.
        value: f64,
    },
    /// A rigid body left the advance with a non-finite pose or velocity.
    NonFinite {
        /// The body whose state blew up.
        body: BodyId,
    },
    /// Any other solver-internal failure.
    ExecutionFailed {
        /// Human-readable description of the failure.
        reason: String,
    },
}

impl fmt::Display for SolverError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AlreadyFinalized => write!(f, "solver already finalized"),
            Self::NotFinalized => write!(f, "solver advanced before finalize"),
            Self::InvalidStepCeiling { value } => {
                write!(f, "step ceiling must be finite and positive, got {value}")
            }
            Self::NonFinite { body } => write!(f, "non-finite state on rigid body {body}"),
            Self::ExecutionFailed { reason } => write!(f, "execution failed: {reason}"),
        }
    }
}

impl Error for SolverError {}
