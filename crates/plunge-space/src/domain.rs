//! Domain extents and computational bounds.

use nalgebra::Vector3;
use plunge_core::SimParams;

use crate::error::{check_extent, check_spacing, SpaceError};

/// Padding added to every configured dimension so that lattice points
/// sitting exactly on a face survive floating-point round-off.
pub const DIMENSION_PADDING: f64 = 1.0e-9;

/// Axis-aligned bounding box.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Aabb {
    /// Lower corner.
    pub min: Vector3<f64>,
    /// Upper corner.
    pub max: Vector3<f64>,
}

impl Aabb {
    /// Box from its two corners.
    pub fn new(min: Vector3<f64>, max: Vector3<f64>) -> Self {
        Self { min, max }
    }

    /// Box from a centre and half-lengths.
    pub fn from_center_half(center: Vector3<f64>, half: Vector3<f64>) -> Self {
        Self {
            min: center - half,
            max: center + half,
        }
    }

    /// Edge lengths.
    pub fn extents(&self) -> Vector3<f64> {
        self.max - self.min
    }

    /// Whether `p` lies inside or on the box.
    pub fn contains(&self, p: &Vector3<f64>) -> bool {
        (0..3).all(|i| p[i] >= self.min[i] && p[i] <= self.max[i])
    }
}

/// Derived geometry of a sphere-drop run.
///
/// All dimensions are full lengths padded by [`DIMENSION_PADDING`].
#[derive(Clone, Debug, PartialEq)]
pub struct DomainLayout {
    box_dims: Vector3<f64>,
    fluid_dims: Vector3<f64>,
    spacing: f64,
    bounds: Aabb,
}

impl DomainLayout {
    /// Layout for the given container and fluid extents at lattice pitch
    /// `spacing`.
    pub fn new(box_dims: [f64; 3], fluid_dims: [f64; 3], spacing: f64) -> Result<Self, SpaceError> {
        let s = check_spacing(spacing)?;
        for v in box_dims {
            check_extent("container extent", v)?;
        }
        for v in fluid_dims {
            check_extent("fluid extent", v)?;
        }
        let b = Vector3::from(box_dims).add_scalar(DIMENSION_PADDING);
        let f = Vector3::from(fluid_dims).add_scalar(DIMENSION_PADDING);

        let c_min = Vector3::new(-b.x / 2.0, -b.y / 2.0, -b.z / 2.0 - 5.0 * s) * 2.0;
        let c_max = Vector3::new(b.x / 2.0, b.y / 2.0, b.z + 5.0 * s) * 2.0;
        let bounds = Aabb::new(c_min.add_scalar(-4.0 * s), c_max.add_scalar(4.0 * s));

        Ok(Self {
            box_dims: b,
            fluid_dims: f,
            spacing: s,
            bounds,
        })
    }

    /// Layout described by a parameter set.
    pub fn from_params(params: &SimParams) -> Result<Self, SpaceError> {
        Self::new(
            params.geometry.container,
            params.geometry.fluid,
            params.initial_spacing(),
        )
    }

    /// Padded container extents `(bx, by, bz)`.
    pub fn box_dims(&self) -> Vector3<f64> {
        self.box_dims
    }

    /// Padded fluid extents `(fx, fy, fz)`.
    pub fn fluid_dims(&self) -> Vector3<f64> {
        self.fluid_dims
    }

    /// Lattice pitch `s`.
    pub fn spacing(&self) -> f64 {
        self.spacing
    }

    /// Centre of the fluid sampling box, `(0, 0, fz/2)`.
    pub fn fluid_center(&self) -> Vector3<f64> {
        Vector3::new(0.0, 0.0, self.fluid_dims.z / 2.0)
    }

    /// Half-lengths of the fluid sampling box.
    pub fn fluid_half_extents(&self) -> Vector3<f64> {
        self.fluid_dims / 2.0
    }

    /// Height of the free surface of the bed.
    pub fn fluid_height(&self) -> f64 {
        self.fluid_dims.z
    }

    /// Halo-padded region handed to neighbour search.
    pub fn compute_bounds(&self) -> Aabb {
        self.bounds
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: Vector3<f64>, b: Vector3<f64>) -> bool {
        (a - b).norm() < 1e-8
    }

    #[test]
    fn compute_bounds_follow_halo_formula() {
        let layout = DomainLayout::new([1.0, 2.0, 1.0], [1.0, 1.0, 0.5], 0.1).unwrap();
        let b = layout.compute_bounds();
        assert!(approx(b.min, Vector3::new(-1.4, -2.4, -2.4)), "{:?}", b.min);
        assert!(approx(b.max, Vector3::new(1.4, 2.4, 3.4)), "{:?}", b.max);
    }

    #[test]
    fn fluid_box_sits_on_floor() {
        let layout = DomainLayout::new([1.0, 1.0, 1.0], [0.8, 0.6, 0.5], 0.02).unwrap();
        assert!(approx(layout.fluid_center(), Vector3::new(0.0, 0.0, 0.25)));
        assert!(approx(layout.fluid_half_extents(), Vector3::new(0.4, 0.3, 0.25)));
        assert!(layout.fluid_height() > 0.5);
    }

    #[test]
    fn zero_spacing_rejected() {
        match DomainLayout::new([1.0; 3], [1.0; 3], 0.0) {
            Err(SpaceError::InvalidSpacing { .. }) => {}
            other => panic!("expected InvalidSpacing, got {other:?}"),
        }
    }

    #[test]
    fn nan_extent_rejected() {
        match DomainLayout::new([1.0, f64::NAN, 1.0], [1.0; 3], 0.1) {
            Err(SpaceError::InvalidExtent { .. }) => {}
            other => panic!("expected InvalidExtent, got {other:?}"),
        }
    }

    #[test]
    fn aabb_contains_faces() {
        let b = Aabb::from_center_half(Vector3::zeros(), Vector3::repeat(1.0));
        assert!(b.contains(&Vector3::new(1.0, -1.0, 0.0)));
        assert!(!b.contains(&Vector3::new(1.0 + 1e-12, 0.0, 0.0)));
    }
}
