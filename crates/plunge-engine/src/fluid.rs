//! Particle field initialization.
//!
//! Fills the fluid box with a lattice of markers at rest under a
//! hydrostatic pressure profile and opens the two reference segments.

use log::info;
use plunge_core::{BuildError, CoupledState, FluidMarker, MarkerState, Phase, Segment, SimParams};
use plunge_space::{DomainLayout, GridSampler};

/// Sub-type id of the fluid segment.
pub const FLUID_SUBTYPE: i32 = -1;
/// Sub-type id of the shared boundary segment.
pub const BOUNDARY_SUBTYPE: i32 = 0;

/// Hydrostatic state of a fluid marker at height `z` below a free
/// surface at `surface`.
///
/// `p = rho0·|g_z|·(surface − z)` and `rho = rho0 + p / Cs²`.
pub fn hydrostatic_state(params: &SimParams, surface: f64, z: f64) -> MarkerState {
    let rho0 = params.fluid.density;
    let cs = params.fluid.sound_speed;
    let pressure = rho0 * params.fluid.gravity[2].abs() * (surface - z);
    MarkerState {
        density: rho0 + pressure / (cs * cs),
        pressure,
        viscosity: params.fluid.viscosity,
        phase: Phase::Fluid,
    }
}

/// Sample the fluid box into `state` and insert the fluid segment
/// `[0, n)` and an empty boundary segment `[n, n)`.
///
/// Returns the number of fluid markers. The state must be empty: any
/// existing segment or marker is a structural error.
pub fn initialize_fluid(
    state: &mut CoupledState,
    layout: &DomainLayout,
    params: &SimParams,
) -> Result<usize, BuildError> {
    if !state.reference().is_empty() {
        return Err(BuildError::SegmentsAlreadyPresent {
            count: state.reference().len(),
        });
    }
    if state.marker_count() != 0 {
        return Err(BuildError::SegmentCoverage {
            covered: 0,
            markers: state.marker_count(),
        });
    }

    let sampler = GridSampler::new(layout.spacing())?;
    let points = sampler.sample_box(&layout.fluid_center(), &layout.fluid_half_extents())?;
    let surface = layout.fluid_height();
    let h = params.sph.kernel_length;
    for p in &points {
        state.add_marker(FluidMarker::at_rest(*p, h, hydrostatic_state(params, surface, p.z)));
    }

    let num_part = points.len();
    let reference = state.reference_mut();
    reference.push(Segment {
        start: 0,
        end: num_part,
        phase: Phase::Fluid,
        subtype: FLUID_SUBTYPE,
    })?;
    reference.push(Segment {
        start: num_part,
        end: num_part,
        phase: Phase::Boundary,
        subtype: BOUNDARY_SUBTYPE,
    })?;

    info!("fluid initialized: {num_part} markers at spacing {:.4}", layout.spacing());
    Ok(num_part)
}
