//! Spatial layout for Plunge simulations.
//!
//! Everything here is pure geometry: it turns physical extents and a
//! particle spacing into point sets and index structures, and never
//! touches the coupled state.
//!
//! # Contents
//!
//! - [`DomainLayout`]: padded box/fluid extents, the fluid sampling box
//!   and the halo-padded computational bounds
//! - [`GridSampler`]: closed-box lattice sampling
//! - [`box_shell`] and [`sphere_shell`]: BCE marker layers on solid
//!   surfaces
//! - [`CellGrid`]: uniform cell binning for neighbour queries

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod bce;
pub mod domain;
pub mod error;
pub mod grid;
pub mod sampler;

pub use bce::{box_shell, sphere_shell};
pub use domain::{Aabb, DomainLayout, DIMENSION_PADDING};
pub use error::SpaceError;
pub use grid::CellGrid;
pub use sampler::{lattice_count, GridSampler};
