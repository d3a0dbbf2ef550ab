//! Frame snapshots and diagnostics output for Plunge runs.
//!
//! # Architecture
//!
//! - [`Snapshot`] captures the marker array, segmentation, bodies and
//!   shells of a [`CoupledState`](plunge_core::CoupledState) at one frame
//! - [`SnapshotStore`] persists encoded snapshots ([`DirectoryStore`] for
//!   disk, [`MemoryStore`] for tests)
//! - [`ExportSink`] decides when a frame is due and never exports the same
//!   frame twice
//! - [`PenetrationLog`] appends one tab-separated row per iteration
//!
//! # Format
//!
//! ```text
//! [MAGIC "PLNG"] [VERSION u8] [frame u64] [time f64] [marker_count u64]
//! [segments] [markers] [bodies] [shells] [marker checksum u64]
//! ```
//!
//! All integers and floats are little-endian. The trailing checksum is an
//! FNV-1a hash of the marker records.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod codec;
pub mod error;
pub mod hash;
pub mod penetration;
pub mod sink;
pub mod store;
pub mod types;

pub use error::OutputError;
pub use hash::{markers_hash, state_hash};
pub use penetration::{PenetrationLog, PenetrationRecord};
pub use sink::ExportSink;
pub use store::{read_snapshot_file, snapshot_file_name, DirectoryStore, MemoryStore, SnapshotStore};
pub use types::{BodyRecord, MarkerRecord, SegmentRecord, ShellRecord, Snapshot};

/// Magic bytes at the start of every snapshot file.
pub const MAGIC: [u8; 4] = *b"PLNG";

/// Current binary format version.
///
/// History:
/// - v1: markers, segments and bodies
/// - v2: shell records with per-surface sub-types
pub const FORMAT_VERSION: u8 = 2;
