//! Construction and time stepping of a coupled sphere-drop system.
//!
//! # Pipeline
//!
//! 1. [`SystemBuilder`] validates the parameters, samples the particle
//!    bed ([`fluid`]), attaches the container and sphere with their BCE
//!    shells ([`coupling`]) and commits everything to a
//!    [`CoupledSolver`](plunge_core::CoupledSolver).
//! 2. [`SphereDropDriver`] advances the resulting [`CoupledSystem`] with a
//!    step ceiling that lands every output frame exactly, exporting
//!    snapshots and one penetration row per iteration.
//!
//! [`PenaltyCouplingSolver`] is the bundled reference solver.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod builder;
pub mod config;
pub mod coupling;
pub mod driver;
pub mod error;
pub mod fluid;
pub mod metrics;
pub mod output;
pub mod solver;
pub mod system;

pub use builder::SystemBuilder;
pub use config::DriverConfig;
pub use coupling::CouplingSummary;
pub use driver::{DriverPhase, SphereDropDriver};
pub use error::DriverError;
pub use metrics::{RunSummary, StepMetrics, TerminationReason};
pub use output::directory_output;
pub use solver::PenaltyCouplingSolver;
pub use system::CoupledSystem;
