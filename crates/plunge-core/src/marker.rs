//! Fluid and BCE markers.

use nalgebra::{Vector3, Vector4};

use crate::reference::Phase;

/// Thermodynamic state carried by every marker.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MarkerState {
    /// Density (kg/m³).
    pub density: f64,
    /// Pressure (Pa).
    pub pressure: f64,
    /// Dynamic viscosity (Pa·s).
    pub viscosity: f64,
    /// Which physical group the marker belongs to.
    pub phase: Phase,
}

/// A particle of the meshless field.
///
/// Fluid markers and BCE markers share this layout; they differ only in
/// [`MarkerState::phase`] and in who moves them (the solver for fluid
/// markers, the parent body pose for BCE markers).
#[derive(Clone, Debug, PartialEq)]
pub struct FluidMarker {
    /// Position in `xyz` and smoothing length in `w`.
    pub pos_rad: Vector4<f64>,
    /// Velocity (m/s).
    pub velocity: Vector3<f64>,
    /// Density, pressure, viscosity and phase.
    pub state: MarkerState,
    /// Diagonal stress components `(τxx, τyy, τzz)`.
    pub tau_diag: Vector3<f64>,
    /// Off-diagonal stress components `(τxy, τxz, τyz)`.
    pub tau_offdiag: Vector3<f64>,
}

impl FluidMarker {
    /// A marker at rest with zero stress.
    pub fn at_rest(position: Vector3<f64>, smoothing_length: f64, state: MarkerState) -> Self {
        Self {
            pos_rad: position.push(smoothing_length),
            velocity: Vector3::zeros(),
            state,
            tau_diag: Vector3::zeros(),
            tau_offdiag: Vector3::zeros(),
        }
    }

    /// Position without the packed smoothing length.
    #[inline]
    pub fn position(&self) -> Vector3<f64> {
        self.pos_rad.xyz()
    }

    /// Overwrite the position, keeping the smoothing length.
    #[inline]
    pub fn set_position(&mut self, p: Vector3<f64>) {
        self.pos_rad.x = p.x;
        self.pos_rad.y = p.y;
        self.pos_rad.z = p.z;
    }

    /// Smoothing length packed in the fourth component.
    #[inline]
    pub fn smoothing_length(&self) -> f64 {
        self.pos_rad.w
    }
}
