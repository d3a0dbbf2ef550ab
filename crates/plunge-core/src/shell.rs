//! BCE marker shells attached to solid surfaces.
//!
//! A shell is a block of BCE markers inside the shared marker array whose
//! positions are slaved to a parent rigid body. The shell keeps the marker
//! offsets in body coordinates so the slaving step is a single transform
//! per marker.

use std::ops::Range;

use nalgebra::{Isometry3, Vector3};

use crate::id::BodyId;

/// Which physical surface a shell discretises.
///
/// Wall orientations get distinct kinds because their marker layers are
/// stacked along different normal axes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SurfaceKind {
    /// Container floor; layers stacked along z.
    Bottom,
    /// Container wall normal to x; layers stacked along x.
    SideX,
    /// Container wall normal to y; layers stacked along y.
    EndY,
    /// Spherical body surface; layers stacked radially.
    Sphere,
}

impl SurfaceKind {
    /// Sub-type id recorded in snapshots. Box faces use the pair of axes
    /// spanning the face plane (`12` = xy, `23` = yz, `13` = xz).
    pub fn code(self) -> i32 {
        match self {
            Self::Bottom => 12,
            Self::SideX => 23,
            Self::EndY => 13,
            Self::Sphere => 3,
        }
    }

    /// Axis along which the marker layers are stacked, for planar walls.
    pub fn normal_axis(self) -> Option<usize> {
        match self {
            Self::Bottom => Some(2),
            Self::SideX => Some(0),
            Self::EndY => Some(1),
            Self::Sphere => None,
        }
    }
}

/// Side of a wall box that faces the particle domain.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Facing {
    /// The `+normal` face looks at the domain.
    Positive,
    /// The `-normal` face looks at the domain.
    Negative,
}

impl Facing {
    /// `+1.0` or `-1.0`.
    pub fn sign(self) -> f64 {
        match self {
            Self::Positive => 1.0,
            Self::Negative => -1.0,
        }
    }

    /// The facing that points from `center` toward the origin along `axis`.
    pub fn toward_origin(center: &Vector3<f64>, axis: usize) -> Self {
        if center[axis] > 0.0 {
            Self::Negative
        } else {
            Self::Positive
        }
    }
}

/// Closed-form description of a discretised surface, in shell coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ShellGeometry {
    /// Layers on one face of a box.
    Box {
        /// Box half-lengths.
        half_extents: Vector3<f64>,
        /// Face of the box that receives the layers.
        facing: Facing,
    },
    /// Concentric layers inside a sphere surface.
    Sphere {
        /// Outer radius.
        radius: f64,
    },
}

/// A BCE shell registered in a [`CoupledState`](crate::CoupledState).
#[derive(Clone, Debug, PartialEq)]
pub struct BoundaryShell {
    /// Parent body whose pose drives the markers.
    pub body: BodyId,
    /// Physical surface this shell represents.
    pub kind: SurfaceKind,
    /// Surface description used to generate the markers.
    pub geometry: ShellGeometry,
    /// Shell frame relative to the body frame.
    pub local_pose: Isometry3<f64>,
    /// Marker indices owned by the shell.
    pub range: Range<usize>,
    /// Marker offsets in body coordinates, one per index in `range`.
    pub body_points: Vec<Vector3<f64>>,
}

impl BoundaryShell {
    /// Number of markers.
    pub fn len(&self) -> usize {
        self.range.len()
    }

    /// Whether the shell owns no marker.
    pub fn is_empty(&self) -> bool {
        self.range.is_empty()
    }
}

/// A shell waiting to be attached to a body.
///
/// `points` are marker positions in shell coordinates; the state maps
/// them through `local_pose` into body coordinates on insertion.
#[derive(Clone, Debug, PartialEq)]
pub struct ShellSpec {
    /// Physical surface.
    pub kind: SurfaceKind,
    /// Surface description.
    pub geometry: ShellGeometry,
    /// Shell frame relative to the body frame.
    pub local_pose: Isometry3<f64>,
    /// Sampled marker positions in shell coordinates.
    pub points: Vec<Vector3<f64>>,
}
