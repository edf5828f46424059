//! Initiative order tracking.
//!
//! Entries reference shapes by UUID only — a lookup key, not ownership —
//! so the tracker tolerates dangling references and never participates in
//! shape lifetime.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One slot in the initiative order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InitiativeEntry {
    pub uuid: Uuid,
    pub initiative: i32,
}

/// Ordered initiative sequence with a dirty flag for its UI.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InitiativeTracker {
    entries: Vec<InitiativeEntry>,
    visible: bool,
    dirty: bool,
}

impl InitiativeTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> &[InitiativeEntry] {
        &self.entries
    }

    pub fn contains(&self, uuid: Uuid) -> bool {
        self.entries.iter().any(|e| e.uuid == uuid)
    }

    /// Whether the initiative UI should be shown.
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Replace the whole sequence (server pushes are never merged) and
    /// show the tracker iff the new sequence is non-empty.
    pub fn set_initiative(&mut self, entries: Vec<InitiativeEntry>) {
        self.visible = !entries.is_empty();
        self.entries = entries;
        self.dirty = true;
    }

    /// Remove the entry for a UUID, if any. Returns whether one was removed.
    pub fn remove(&mut self, uuid: Uuid) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| e.uuid != uuid);
        let removed = self.entries.len() != before;
        if removed {
            self.dirty = true;
        }
        removed
    }

    /// Consume the dirty flag; the initiative UI polls this once per frame.
    pub fn take_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }
}
