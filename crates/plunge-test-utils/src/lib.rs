//! Test utilities and mock solvers for Plunge development.
//!
//! - [`ScriptedSolver`]: ballistic fixed-step solver that records the
//!   step ceilings it was handed
//! - [`FailingSolver`]: fails deterministically after N advances
//! - [`fixtures`]: parameter sets and a small pre-built coupled state

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod fixtures;
pub mod solvers;

pub use fixtures::{coarse_params, sphere_drop_params, two_segment_state};
pub use solvers::{FailingSolver, ScriptedSolver, StepRecorder};
