//! Benchmark profiles for the Plunge coupling driver.
//!
//! - [`reference_profile`]: the 1 m sphere-drop scenario (~37K bed markers)
//! - [`small_profile`]: a 0.3 m box for quick per-step timings
//! - [`build_system`]: a finalized system on the reference solver

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use plunge_core::SimParams;
use plunge_engine::{CoupledSystem, DriverError, PenaltyCouplingSolver, SystemBuilder};

/// The sphere-drop scenario with output switched off.
pub fn reference_profile() -> SimParams {
    let mut p = SimParams::default();
    p.output.enabled = false;
    p
}

/// A 0.3 m box with a 0.15 m bed and a 3 cm sphere.
pub fn small_profile() -> SimParams {
    let mut p = reference_profile();
    p.geometry.container = [0.3, 0.3, 0.3];
    p.geometry.fluid = [0.3, 0.3, 0.15];
    p.body.radius = 0.03;
    p.body.initial_position = [0.0, 0.0, 0.1];
    p
}

/// Build and finalize `params` on a [`PenaltyCouplingSolver`].
pub fn build_system(params: SimParams) -> Result<CoupledSystem, DriverError> {
    let mut builder = SystemBuilder::new(params)?;
    let solver = PenaltyCouplingSolver::new(builder.params())?;
    builder.build_fluid()?;
    builder.build_coupling()?;
    Ok(builder.finalize(Box::new(solver))?)
}
