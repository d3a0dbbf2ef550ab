//! Strongly-typed identifiers.

use std::fmt;

/// Identifies a rigid body registered with a [`CoupledState`](crate::CoupledState).
///
/// Bodies are assigned sequential ids in registration order, so the
/// container built first is `BodyId(0)` and the sphere `BodyId(1)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BodyId(pub u32);

impl fmt::Display for BodyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for BodyId {
    fn from(v: u32) -> Self {
        Self(v)
    }
}

/// Index of an output frame. Frame `k` is due at `k / out_fps` seconds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FrameIndex(pub u64);

impl fmt::Display for FrameIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for FrameIndex {
    fn from(v: u64) -> Self {
        Self(v)
    }
}
