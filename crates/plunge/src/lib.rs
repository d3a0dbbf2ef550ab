//! Plunge: a sphere-drop fluid-structure coupling driver.
//!
//! A rigid sphere is dropped onto a granular bed modelled as SPH markers
//! inside an open-top container. This facade crate re-exports the public
//! API of the Plunge sub-crates and provides [`run_sphere_drop`], the
//! entry point used by the `plunge` binary.
//!
//! # Quick start
//!
//! ```rust,no_run
//! use plunge::prelude::*;
//!
//! let params = SimParams::load(std::path::Path::new("sphere_drop.json")).unwrap();
//! let summary = plunge::run_sphere_drop(params).unwrap();
//! println!("{summary}");
//! ```
//!
//! # Modules
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`types`] | `plunge-core` | Parameters, markers, bodies, shells, solver trait |
//! | [`space`] | `plunge-space` | Domain layout, lattice and shell samplers, cell grid |
//! | [`output`] | `plunge-output` | Snapshot codec and stores, penetration log |
//! | [`engine`] | `plunge-engine` | Builder, reference solver, driver |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod cli;

/// Core types, traits and ids (`plunge-core`).
pub use plunge_core as types;

/// Spatial layout and sampling (`plunge-space`).
pub use plunge_space as space;

/// Snapshots, stores and the penetration log (`plunge-output`).
pub use plunge_output as output;

/// System construction and the time-stepping driver (`plunge-engine`).
pub use plunge_engine as engine;

use log::info;
use plunge_core::SimParams;
use plunge_engine::{
    directory_output, DriverError, PenaltyCouplingSolver, RunSummary, SphereDropDriver,
    SystemBuilder,
};

/// Common imports for typical Plunge usage.
pub mod prelude {
    // Core
    pub use plunge_core::{
        BodyId, CoupledSolver, CoupledState, FluidMarker, IntegratorConfig, Phase, RigidBody,
        SimParams,
    };

    // Errors
    pub use plunge_core::{BuildError, ConfigError, SolverError};
    pub use plunge_engine::DriverError;
    pub use plunge_output::OutputError;

    // Engine
    pub use plunge_engine::{
        CoupledSystem, PenaltyCouplingSolver, RunSummary, SphereDropDriver, StepMetrics,
        SystemBuilder, TerminationReason,
    };

    // Output
    pub use plunge_output::{DirectoryStore, MemoryStore, PenetrationLog, Snapshot, SnapshotStore};
}

/// Build the sphere-drop system for `params`, run it with the reference
/// solver and write every artifact into the configured output directory.
pub fn run_sphere_drop(params: SimParams) -> Result<RunSummary, DriverError> {
    let mut builder = SystemBuilder::new(params)?;
    let (store, log) = directory_output(builder.params())?;
    let solver = PenaltyCouplingSolver::new(builder.params())?;

    builder.build_fluid()?;
    let coupling = builder.build_coupling()?.clone();
    let system = builder.finalize(Box::new(solver))?;
    info!(
        "sphere mass {:.6} kg, FSI mass {:.6} kg (diagnostic only)",
        coupling.sphere_mass, coupling.fsi_mass
    );

    let mut driver = SphereDropDriver::new(system, store, log);
    driver.run()
}
