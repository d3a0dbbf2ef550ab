//! Core types and traits for the Plunge coupled FSI driver.
//!
//! This is the leaf crate with zero internal dependencies. It defines
//! the data model shared by every other crate in the workspace: the
//! simulation parameters, fluid/BCE markers, the reference-array
//! segmentation, rigid bodies and their marker shells, the output frame
//! clock, error types, and the [`CoupledSolver`] collaborator trait.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod body;
pub mod clock;
pub mod error;
pub mod id;
pub mod integrator;
pub mod marker;
pub mod params;
pub mod reference;
pub mod shell;
pub mod solver;
pub mod state;

pub use body::{BodyKind, CollisionBox, CollisionShape, RigidBody, SurfaceMaterial};
pub use clock::FrameClock;
pub use error::{BuildError, BuildStage, ConfigError, SolverError};
pub use id::{BodyId, FrameIndex};
pub use integrator::IntegratorConfig;
pub use marker::{FluidMarker, MarkerState};
pub use params::SimParams;
pub use reference::{Phase, ReferenceArray, Segment};
pub use shell::{BoundaryShell, Facing, ShellGeometry, ShellSpec, SurfaceKind};
pub use solver::CoupledSolver;
pub use state::CoupledState;
