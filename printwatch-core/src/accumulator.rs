//! The accumulator facade: one object per monitoring session.

use parking_lot::Mutex;
use serde_json::Value;
use time::OffsetDateTime;
use tracing::debug;

use crate::error::MergeError;
use crate::project;
use crate::raw::RawState;
use crate::snapshot::FlatSnapshot;
use crate::state::PrinterState;

/// Accumulates partial telemetry fragments into a complete printer state.
///
/// The vendor stream is incremental, so no single message is enough to
/// answer "what is the printer doing right now". One accumulator tracks
/// one monitoring session for one device; independent devices get
/// independent accumulators.
///
/// All mutation is serialized behind a single lock. Merges hold it only
/// for the apply itself and projections only to copy the raw state out,
/// so the transport's delivery path is never blocked behind a reader.
#[derive(Debug, Default)]
pub struct StateAccumulator {
    inner: Mutex<Inner>,
}

#[derive(Debug, Default)]
struct Inner {
    raw: RawState,
    update_count: u64,
    last_update: Option<OffsetDateTime>,
}

impl StateAccumulator {
    /// Creates an empty accumulator: every reading starts unknown.
    pub fn new() -> Self {
        Self::default()
    }

    /// Merges one telemetry fragment.
    ///
    /// The fragment either applies as a whole or, when structurally
    /// invalid, not at all; rejected fragments leave the accumulated state
    /// and the session counters untouched.
    pub fn merge(&self, fragment: &Value) -> Result<(), MergeError> {
        let now = OffsetDateTime::now_utc();
        let mut inner = self.inner.lock();
        inner.raw.merge(fragment)?;
        inner.update_count += 1;
        inner.last_update = Some(now);
        debug!(updates = inner.update_count, "merged telemetry fragment");
        Ok(())
    }

    /// Parses a raw transport payload and merges it.
    pub fn merge_payload(&self, payload: &[u8]) -> Result<(), MergeError> {
        let fragment: Value = serde_json::from_slice(payload)?;
        self.merge(&fragment)
    }

    /// Projects the current snapshot.
    ///
    /// Pure read: holds the lock only to copy the raw state, then builds
    /// the value object without synchronization. Before any fragment has
    /// been merged this returns a state with every reading unknown.
    pub fn project(&self) -> PrinterState {
        let raw = self.inner.lock().raw.clone();
        project::project(&raw)
    }

    /// Flattened snapshot stamped with the current UTC time.
    pub fn flatten(&self) -> FlatSnapshot {
        self.flatten_at(OffsetDateTime::now_utc())
    }

    /// Flattened snapshot with a caller-supplied timestamp.
    pub fn flatten_at(&self, timestamp: OffsetDateTime) -> FlatSnapshot {
        FlatSnapshot::from_state(&self.project(), timestamp)
    }

    /// Drops everything accumulated and starts a fresh session.
    pub fn reset(&self) {
        *self.inner.lock() = Inner::default();
    }

    /// Number of fragments accepted this session.
    pub fn update_count(&self) -> u64 {
        self.inner.lock().update_count
    }

    /// Time the last fragment was accepted, if any.
    pub fn last_update(&self) -> Option<OffsetDateTime> {
        self.inner.lock().last_update
    }
}
