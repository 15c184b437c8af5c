//! Process-lifetime run history: append-only, deduplicated by the ordered
//! tuple of snapshot origin names.

use crate::model::{AggregatedRow, HistoryEntry};

/// Single-writer, in-memory ledger. Entries own deep copies of their rows;
/// nothing recorded here is ever mutated afterwards.
#[derive(Debug, Default)]
pub struct HistoryLedger {
    entries: Vec<HistoryEntry>,
}

impl HistoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a run unless an entry with the exact same ordered identity key
    /// already exists. Returns whether an entry was appended.
    pub fn record(
        &mut self,
        identity_key: Vec<String>,
        snapshot_count: usize,
        rows: &[AggregatedRow],
    ) -> bool {
        if self.entries.iter().any(|e| e.identity_key == identity_key) {
            return false;
        }
        self.entries.push(HistoryEntry {
            identity_key,
            timestamp: chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
            snapshot_count,
            product_count: rows.len(),
            rows: rows.to_vec(),
        });
        true
    }

    /// Entries most-recent-first.
    pub fn list(&self) -> impl Iterator<Item = &HistoryEntry> {
        self.entries.iter().rev()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
