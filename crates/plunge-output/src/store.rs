//! Snapshot persistence.

use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::codec::{decode_snapshot, encode_snapshot};
use crate::error::OutputError;
use crate::types::Snapshot;

/// Destination for encoded snapshots.
pub trait SnapshotStore {
    /// Persist one snapshot.
    fn store(&mut self, snapshot: &Snapshot) -> Result<(), OutputError>;

    /// Number of snapshots persisted so far.
    fn stored(&self) -> u64;
}

/// File name of the snapshot for `frame`.
pub fn snapshot_file_name(frame: u64) -> String {
    format!("frame_{frame:05}.pls")
}

/// Read and verify a snapshot file.
pub fn read_snapshot_file(path: &Path) -> Result<Snapshot, OutputError> {
    let mut reader = BufReader::new(File::open(path)?);
    decode_snapshot(&mut reader)
}

// ── DirectoryStore ──────────────────────────────────────────────

/// Writes one file per frame into a directory.
#[derive(Debug)]
pub struct DirectoryStore {
    dir: PathBuf,
    stored: u64,
}

impl DirectoryStore {
    /// Store rooted at `dir`, creating the directory if needed.
    pub fn create(dir: impl Into<PathBuf>) -> Result<Self, OutputError> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir, stored: 0 })
    }

    /// Root directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path the snapshot for `frame` is written to.
    pub fn path_for(&self, frame: u64) -> PathBuf {
        self.dir.join(snapshot_file_name(frame))
    }
}

impl SnapshotStore for DirectoryStore {
    fn store(&mut self, snapshot: &Snapshot) -> Result<(), OutputError> {
        let mut w = BufWriter::new(File::create(self.path_for(snapshot.frame))?);
        encode_snapshot(&mut w, snapshot)?;
        w.flush()?;
        self.stored += 1;
        Ok(())
    }

    fn stored(&self) -> u64 {
        self.stored
    }
}

// ── MemoryStore ─────────────────────────────────────────────────

/// Keeps encoded snapshots in memory.
#[derive(Debug, Default)]
pub struct MemoryStore {
    frames: Vec<(u64, Vec<u8>)>,
}

impl MemoryStore {
    /// An empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Frame indices in the order they were stored.
    pub fn frames(&self) -> Vec<u64> {
        self.frames.iter().map(|(f, _)| *f).collect()
    }

    /// Encoded bytes of the `i`-th stored snapshot.
    pub fn bytes(&self, i: usize) -> Option<&[u8]> {
        self.frames.get(i).map(|(_, b)| b.as_slice())
    }

    /// Decode the `i`-th stored snapshot.
    pub fn decode(&self, i: usize) -> Option<Result<Snapshot, OutputError>> {
        self.bytes(i).map(|mut b| decode_snapshot(&mut b))
    }
}

impl SnapshotStore for MemoryStore {
    fn store(&mut self, snapshot: &Snapshot) -> Result<(), OutputError> {
        let mut buf = Vec::new();
        encode_snapshot(&mut buf, snapshot)?;
        self.frames.push((snapshot.frame, buf));
        Ok(())
    }

    fn stored(&self) -> u64 {
        self.frames.len() as u64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn empty(frame: u64) -> Snapshot {
        Snapshot {
            frame,
            time: frame as f64 * 0.01,
            segments: vec![],
            markers: vec![],
            bodies: vec![],
            shells: vec![],
        }
    }

    #[test]
    fn file_names_are_zero_padded() {
        assert_eq!(snapshot_file_name(0), "frame_00000.pls");
        assert_eq!(snapshot_file_name(123), "frame_00123.pls");
        assert_eq!(snapshot_file_name(123_456), "frame_123456.pls");
    }

    #[test]
    fn memory_store_keeps_order() {
        let mut store = MemoryStore::new();
        store.store(&empty(0)).unwrap();
        store.store(&empty(3)).unwrap();
        assert_eq!(store.frames(), vec![0, 3]);
        assert_eq!(store.stored(), 2);
        let back = store.decode(1).unwrap().unwrap();
        assert_eq!(back.frame, 3);
        assert!(store.decode(2).is_none());
    }

    #[test]
    fn directory_store_round_trips_through_disk() {
        let dir = std::env::temp_dir().join(format!("plunge-store-{}", std::process::id()));
        let mut store = DirectoryStore::create(&dir).unwrap();
        store.store(&empty(4)).unwrap();
        let back = read_snapshot_file(&store.path_for(4)).unwrap();
        assert_eq!(back, empty(4));
        assert_eq!(store.stored(), 1);
        fs::remove_dir_all(&dir).unwrap();
    }
}
