//! Error types for geometry construction.

use std::fmt;

use plunge_core::BuildError;

/// Errors arising from layout, sampling or grid construction.
#[derive(Debug, Clone, PartialEq)]
pub enum SpaceError {
    /// The particle spacing is zero, negative or not finite.
    InvalidSpacing {
        /// The rejected spacing.
        value: f64,
    },
    /// A length that must be finite and positive is not.
    InvalidExtent {
        /// Which quantity was rejected.
        what: &'static str,
        /// The rejected value.
        value: f64,
    },
    /// A shell was requested with zero marker layers.
    NoLayers,
    /// The grid would need more cells than can be addressed.
    GridTooLarge {
        /// Cells requested along each axis.
        dims: [usize; 3],
    },
}

impl fmt::Display for SpaceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidSpacing { value } => {
                write!(f, "spacing must be finite and positive, got {value}")
            }
            Self::InvalidExtent { what, value } => {
                write!(f, "{what} must be finite and positive, got {value}")
            }
            Self::NoLayers => write!(f, "a shell needs at least one marker layer"),
            Self::GridTooLarge { dims } => {
                write!(f, "cell grid {}x{}x{} is too large", dims[0], dims[1], dims[2])
            }
        }
    }
}

impl std::error::Error for SpaceError {}

impl From<SpaceError> for BuildError {
    fn from(e: SpaceError) -> Self {
        BuildError::InvalidGeometry {
            reason: e.to_string(),
        }
    }
}

pub(crate) fn check_spacing(value: f64) -> Result<f64, SpaceError> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(SpaceError::InvalidSpacing { value })
    }
}

pub(crate) fn check_extent(what: &'static str, value: f64) -> Result<f64, SpaceError> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(SpaceError::InvalidExtent { what, value })
    }
}
