//! Top-level error type for building and driving a run.

use std::error::Error;
use std::fmt;

use plunge_core::{BuildError, ConfigError, SolverError};
use plunge_output::OutputError;
use plunge_space::SpaceError;

use crate::driver::DriverPhase;

/// Any failure that ends a run.
#[derive(Debug)]
pub enum DriverError {
    /// The parameters were rejected before any state was built.
    Config(ConfigError),
    /// A structural invariant was violated during construction.
    Build(BuildError),
    /// The coupled solver failed.
    Solver(SolverError),
    /// Writing a snapshot, the parameter copy or the log failed.
    Output(OutputError),
    /// A driver operation was called in the wrong phase.
    InvalidPhase {
        /// The operation that was attempted.
        operation: &'static str,
        /// The phase the driver was in.
        phase: DriverPhase,
    },
}

impl fmt::Display for DriverError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(e) => write!(f, "config: {e}"),
            Self::Build(e) => write!(f, "build: {e}"),
            Self::Solver(e) => write!(f, "solver: {e}"),
            Self::Output(e) => write!(f, "output: {e}"),
            Self::InvalidPhase { operation, phase } => {
                write!(f, "cannot {operation} while {phase}")
            }
        }
    }
}

impl Error for DriverError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Config(e) => Some(e),
            Self::Build(e) => Some(e),
            Self::Solver(e) => Some(e),
            Self::Output(e) => Some(e),
            Self::InvalidPhase { .. } => None,
        }
    }
}

impl From<ConfigError> for DriverError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

impl From<BuildError> for DriverError {
    fn from(e: BuildError) -> Self {
        Self::Build(e)
    }
}

impl From<SolverError> for DriverError {
    fn from(e: SolverError) -> Self {
        Self::Solver(e)
    }
}

impl From<OutputError> for DriverError {
    fn from(e: OutputError) -> Self {
        Self::Output(e)
    }
}

impl From<SpaceError> for DriverError {
    fn from(e: SpaceError) -> Self {
        Self::Build(e.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn space_error_becomes_invalid_geometry() {
        let err = DriverError::from(SpaceError::NoLayers);
        match err {
            DriverError::Build(BuildError::InvalidGeometry { reason }) => {
                assert!(reason.contains("layer"), "{reason}")
            }
            other => panic!("expected Build(InvalidGeometry), got {other:?}"),
        }
    }

    #[test]
    fn solver_error_is_source() {
        let err = DriverError::from(SolverError::NotFinalized);
        assert!(err.source().is_some());
        assert!(err.to_string().starts_with("solver:"));
    }
}
