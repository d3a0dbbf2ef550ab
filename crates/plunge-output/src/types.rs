//! Plain records stored in a snapshot.
//!
//! The records mirror the in-memory types of `plunge-core` with fixed,
//! explicit field layouts so the binary format does not depend on
//! `nalgebra` internals.

use plunge_core::{BoundaryShell, CoupledState, FluidMarker, RigidBody, Segment};

/// One reference-array segment.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SegmentRecord {
    /// First marker index.
    pub start: u64,
    /// One past the last marker index.
    pub end: u64,
    /// Phase code (`-1` fluid, `0` boundary, `1` rigid).
    pub phase: i32,
    /// Sub-type id.
    pub subtype: i32,
}

impl From<&Segment> for SegmentRecord {
    fn from(s: &Segment) -> Self {
        Self {
            start: s.start as u64,
            end: s.end as u64,
            phase: s.phase.code(),
            subtype: s.subtype,
        }
    }
}

/// One marker of the particle field.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MarkerRecord {
    /// Position `xyz` and smoothing length `w`.
    pub pos_rad: [f64; 4],
    /// Velocity.
    pub velocity: [f64; 3],
    /// Density.
    pub density: f64,
    /// Pressure.
    pub pressure: f64,
    /// Dynamic viscosity.
    pub viscosity: f64,
    /// Phase code.
    pub phase: i32,
    /// `(τxx, τyy, τzz)`.
    pub tau_diag: [f64; 3],
    /// `(τxy, τxz, τyz)`.
    pub tau_offdiag: [f64; 3],
}

impl From<&FluidMarker> for MarkerRecord {
    fn from(m: &FluidMarker) -> Self {
        Self {
            pos_rad: m.pos_rad.into(),
            velocity: m.velocity.into(),
            density: m.state.density,
            pressure: m.state.pressure,
            viscosity: m.state.viscosity,
            phase: m.state.phase.code(),
            tau_diag: m.tau_diag.into(),
            tau_offdiag: m.tau_offdiag.into(),
        }
    }
}

/// Pose and velocity of a rigid body.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BodyRecord {
    /// Body id.
    pub id: u32,
    /// Centre of mass.
    pub position: [f64; 3],
    /// Orientation quaternion `(w, x, y, z)`.
    pub orientation: [f64; 4],
    /// Linear velocity.
    pub linear_velocity: [f64; 3],
    /// Angular velocity.
    pub angular_velocity: [f64; 3],
}

impl From<&RigidBody> for BodyRecord {
    fn from(b: &RigidBody) -> Self {
        let q = b.orientation.quaternion();
        Self {
            id: b.id.0,
            position: b.position.into(),
            orientation: [q.w, q.i, q.j, q.k],
            linear_velocity: b.linear_velocity.into(),
            angular_velocity: b.angular_velocity.into(),
        }
    }
}

/// The marker range owned by one BCE shell.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ShellRecord {
    /// Parent body id.
    pub body: u32,
    /// Surface sub-type code.
    pub subtype: i32,
    /// First marker index.
    pub start: u64,
    /// One past the last marker index.
    pub end: u64,
}

impl From<&BoundaryShell> for ShellRecord {
    fn from(s: &BoundaryShell) -> Self {
        Self {
            body: s.body.0,
            subtype: s.kind.code(),
            start: s.range.start as u64,
            end: s.range.end as u64,
        }
    }
}

/// Complete state of one exported frame.
#[derive(Clone, Debug, PartialEq)]
pub struct Snapshot {
    /// Frame index.
    pub frame: u64,
    /// Simulation time.
    pub time: f64,
    /// Reference-array segments.
    pub segments: Vec<SegmentRecord>,
    /// Every marker, fluid first.
    pub markers: Vec<MarkerRecord>,
    /// Every rigid body in registration order.
    pub bodies: Vec<BodyRecord>,
    /// Every BCE shell in insertion order.
    pub shells: Vec<ShellRecord>,
}

impl Snapshot {
    /// Copy the exportable parts of `state`.
    pub fn capture(frame: u64, time: f64, state: &CoupledState) -> Self {
        Self {
            frame,
            time,
            segments: state.reference().segments().iter().map(Into::into).collect(),
            markers: state.markers().iter().map(Into::into).collect(),
            bodies: state.bodies().map(Into::into).collect(),
            shells: state.shells().iter().map(Into::into).collect(),
        }
    }

    /// Markers whose phase code is `phase`.
    pub fn markers_with_phase(&self, phase: i32) -> impl Iterator<Item = &MarkerRecord> {
        self.markers.iter().filter(move |m| m.phase == phase)
    }
}
