//! Frame-boundary export of snapshots.

use log::{debug, info};
use plunge_core::{CoupledState, FrameClock};

use crate::error::OutputError;
use crate::store::SnapshotStore;
use crate::types::Snapshot;

/// Exports a snapshot whenever the simulation time lands on a frame.
///
/// Each sink keeps its own frame counter; two sinks never share one.
/// Exporting is idempotent per frame index: a second call for a frame
/// that was already written is a no-op.
pub struct ExportSink<S: SnapshotStore> {
    store: S,
    clock: FrameClock,
    enabled: bool,
    last_exported: Option<u64>,
    exported: u64,
}

impl<S: SnapshotStore> ExportSink<S> {
    /// Sink writing into `store` on the frames of `clock`.
    pub fn new(store: S, clock: FrameClock, enabled: bool) -> Self {
        Self {
            store,
            clock,
            enabled,
            last_exported: None,
            exported: 0,
        }
    }

    /// Export `frame` if output is enabled, `time` is on that frame's
    /// boundary and the frame has not been exported yet.
    ///
    /// Returns whether a snapshot was written.
    pub fn try_export(
        &mut self,
        frame: u64,
        time: f64,
        state: &CoupledState,
    ) -> Result<bool, OutputError> {
        if !self.enabled || !self.clock.is_frame_boundary(time, frame) {
            return Ok(false);
        }
        if self.last_exported.is_some_and(|last| last >= frame) {
            debug!("frame {frame} already exported, skipping");
            return Ok(false);
        }
        let snapshot = Snapshot::capture(frame, time, state);
        self.store.store(&snapshot)?;
        self.last_exported = Some(frame);
        self.exported += 1;
        info!(
            "exported frame {frame} at t = {time:.6} ({} markers)",
            snapshot.markers.len()
        );
        Ok(true)
    }

    /// Number of frames this sink has written.
    pub fn frames_exported(&self) -> u64 {
        self.exported
    }

    /// Most recently exported frame index.
    pub fn last_exported(&self) -> Option<u64> {
        self.last_exported
    }

    /// Whether exporting is switched on.
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// The frame schedule.
    pub fn clock(&self) -> &FrameClock {
        &self.clock
    }

    /// The underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Consume the sink and return its store.
    pub fn into_store(self) -> S {
        self.store
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn sink(enabled: bool) -> ExportSink<MemoryStore> {
        ExportSink::new(MemoryStore::new(), FrameClock::from_fps(100.0), enabled)
    }

    #[test]
    fn off_boundary_is_noop() {
        let mut s = sink(true);
        let state = CoupledState::new();
        assert!(!s.try_export(1, 0.0095, &state).unwrap());
        assert_eq!(s.frames_exported(), 0);
        assert_eq!(s.store().stored(), 0);
    }

    #[test]
    fn boundary_exports_exactly_once() {
        let mut s = sink(true);
        let state = CoupledState::new();
        assert!(s.try_export(1, 0.01, &state).unwrap());
        assert!(!s.try_export(1, 0.01, &state).unwrap());
        assert_eq!(s.store().frames(), vec![1]);
        assert_eq!(s.last_exported(), Some(1));
    }

    #[test]
    fn disabled_sink_never_exports() {
        let mut s = sink(false);
        assert!(!s.try_export(0, 0.0, &CoupledState::new()).unwrap());
        assert_eq!(s.frames_exported(), 0);
    }

    #[test]
    fn sinks_count_independently() {
        let mut a = sink(true);
        let mut b = sink(true);
        let state = CoupledState::new();
        a.try_export(0, 0.0, &state).unwrap();
        a.try_export(1, 0.01, &state).unwrap();
        b.try_export(0, 0.0, &state).unwrap();
        assert_eq!((a.frames_exported(), b.frames_exported()), (2, 1));
    }
}
