//! Regular lattice sampling of a closed box.

use nalgebra::Vector3;

use crate::error::{check_extent, check_spacing, SpaceError};

/// Number of lattice points along an edge of length `extent` at pitch
/// `spacing`: both end points included when they fall on the lattice.
pub fn lattice_count(extent: f64, spacing: f64) -> usize {
    (extent / spacing).floor() as usize + 1
}

/// Samples points on a cubic lattice.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GridSampler {
    spacing: f64,
}

impl GridSampler {
    /// Sampler with lattice pitch `spacing`.
    pub fn new(spacing: f64) -> Result<Self, SpaceError> {
        Ok(Self {
            spacing: check_spacing(spacing)?,
        })
    }

    /// Lattice pitch.
    pub fn spacing(&self) -> f64 {
        self.spacing
    }

    /// Number of points [`sample_box`](Self::sample_box) returns.
    pub fn box_count(&self, half_extents: &Vector3<f64>) -> usize {
        (0..3)
            .map(|i| lattice_count(2.0 * half_extents[i], self.spacing))
            .product()
    }

    /// Lattice points filling the closed box `center ± half_extents`.
    ///
    /// The lattice starts at the lower corner. Points are ordered with x
    /// outermost, then y, then z, so identical inputs always give the
    /// same sequence.
    pub fn sample_box(
        &self,
        center: &Vector3<f64>,
        half_extents: &Vector3<f64>,
    ) -> Result<Vec<Vector3<f64>>, SpaceError> {
        for i in 0..3 {
            check_extent("sampling half-extent", half_extents[i])?;
        }
        let lo = center - half_extents;
        let n = [
            lattice_count(2.0 * half_extents.x, self.spacing),
            lattice_count(2.0 * half_extents.y, self.spacing),
            lattice_count(2.0 * half_extents.z, self.spacing),
        ];
        let s = self.spacing;
        let mut points = Vec::with_capacity(n[0] * n[1] * n[2]);
        for i in 0..n[0] {
            for j in 0..n[1] {
                for k in 0..n[2] {
                    points.push(Vector3::new(
                        lo.x + i as f64 * s,
                        lo.y + j as f64 * s,
                        lo.z + k as f64 * s,
                    ));
                }
            }
        }
        Ok(points)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unit_cube_at_half_pitch() {
        let sampler = GridSampler::new(0.5).unwrap();
        let pts = sampler
            .sample_box(&Vector3::new(0.0, 0.0, 0.5), &Vector3::repeat(0.5))
            .unwrap();
        assert_eq!(pts.len(), 27);
        assert_eq!(pts[0], Vector3::new(-0.5, -0.5, 0.0));
        assert_eq!(pts[1], Vector3::new(-0.5, -0.5, 0.5));
        assert_eq!(pts[3], Vector3::new(-0.5, 0.0, 0.0));
        assert_eq!(pts[26], Vector3::new(0.5, 0.5, 1.0));
    }

    #[test]
    fn thin_box_still_gets_one_layer() {
        let sampler = GridSampler::new(1.0).unwrap();
        let half = Vector3::new(0.1, 0.1, 0.1);
        let pts = sampler.sample_box(&Vector3::zeros(), &half).unwrap();
        assert_eq!(pts.len(), 1);
        assert_eq!(sampler.box_count(&half), 1);
    }

    #[test]
    fn negative_half_extent_rejected() {
        let sampler = GridSampler::new(0.1).unwrap();
        match sampler.sample_box(&Vector3::zeros(), &Vector3::new(1.0, -1.0, 1.0)) {
            Err(SpaceError::InvalidExtent { .. }) => {}
            other => panic!("expected InvalidExtent, got {other:?}"),
        }
    }

    #[test]
    fn nan_spacing_rejected() {
        assert!(GridSampler::new(f64::NAN).is_err());
    }
}
