//! Receiving side of the worker protocol.

use log::trace;

use super::protocol::VoltageSnapshot;
use crate::error::Result;

/// Keeps only the newest snapshot for the selected circuit.
///
/// Snapshots arrive asynchronously and may lag behind a circuit switch.
/// Any snapshot whose circuit key differs from the current selection is
/// dropped, and a newer snapshot always replaces an older one.
#[derive(Debug, Clone, Default)]
pub struct SnapshotInbox {
    selected: Option<String>,
    latest: Option<VoltageSnapshot>,
    discarded: u64,
}

impl SnapshotInbox {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inbox that already expects snapshots for `key`.
    pub fn for_circuit(key: impl Into<String>) -> Self {
        let mut inbox = Self::new();
        inbox.select(key);
        inbox
    }

    /// Change the expected circuit. A held snapshot for another circuit is
    /// dropped.
    pub fn select(&mut self, key: impl Into<String>) {
        let key = key.into();
        if self.latest.as_ref().is_some_and(|s| s.circuit != key) {
            self.latest = None;
        }
        self.selected = Some(key);
    }

    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    /// Decode one outbound message. Returns `true` when it was kept.
    pub fn accept(&mut self, text: &str) -> Result<bool> {
        let snapshot = VoltageSnapshot::decode(text)?;
        Ok(self.offer(snapshot))
    }

    /// Offer an already decoded snapshot. Returns `true` when it was kept.
    pub fn offer(&mut self, snapshot: VoltageSnapshot) -> bool {
        if self.selected.as_deref() != Some(snapshot.circuit.as_str()) {
            trace!("discarding stale snapshot for '{}'", snapshot.circuit);
            self.discarded += 1;
            return false;
        }
        self.latest = Some(snapshot);
        true
    }

    /// Newest snapshot for the selected circuit.
    pub fn latest(&self) -> Option<&VoltageSnapshot> {
        self.latest.as_ref()
    }

    pub fn take(&mut self) -> Option<VoltageSnapshot> {
        self.latest.take()
    }

    /// Number of snapshots dropped for carrying another circuit's key.
    pub fn discarded(&self) -> u64 {
        self.discarded
    }
}
