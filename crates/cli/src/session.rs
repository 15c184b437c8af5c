//! In-process session state: upload slots plus the run-history ledger.
//!
//! Explicit struct, created at session start and torn down with the
//! process; every mutation goes through a named operation. In this binary a
//! session spans one invocation: `compare` builds one state, records its
//! run, and drops it on exit. Slot add/remove and the ledger read side are
//! the contract for front ends that keep one state across many comparisons;
//! the two-slot floor and stable slot ids hold for them too.

use stockdiff_recon::history::HistoryLedger;

/// A session never drops below two upload slots; one snapshot compares
/// against nothing.
pub const MIN_SLOTS: usize = 2;

#[derive(Debug)]
pub struct AppState {
    slot_ids: Vec<u32>,
    next_slot_id: u32,
    pub ledger: HistoryLedger,
}

impl AppState {
    pub fn new(slots: usize) -> Self {
        let count = slots.max(MIN_SLOTS);
        Self {
            slot_ids: (0..count as u32).collect(),
            next_slot_id: count as u32,
            ledger: HistoryLedger::new(),
        }
    }

    pub fn slot_ids(&self) -> &[u32] {
        &self.slot_ids
    }

    /// Add an upload slot; ids are counter-based, never reused, so a slot
    /// keeps its identity when earlier slots are removed.
    pub fn add_slot(&mut self) -> u32 {
        let id = self.next_slot_id;
        self.next_slot_id += 1;
        self.slot_ids.push(id);
        id
    }

    /// Remove a slot by id. Refuses to go below `MIN_SLOTS`; returns
    /// whether a slot was removed.
    pub fn remove_slot(&mut self, id: u32) -> bool {
        if self.slot_ids.len() <= MIN_SLOTS {
            return false;
        }
        let before = self.slot_ids.len();
        self.slot_ids.retain(|s| *s != id);
        self.slot_ids.len() < before
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_with_at_least_two_slots() {
        assert_eq!(AppState::new(0).slot_ids(), &[0, 1]);
        assert_eq!(AppState::new(4).slot_ids(), &[0, 1, 2, 3]);
    }

    #[test]
    fn slot_ids_are_never_reused() {
        let mut state = AppState::new(3);
        assert!(state.remove_slot(1));
        let new_id = state.add_slot();
        assert_eq!(new_id, 3);
        assert_eq!(state.slot_ids(), &[0, 2, 3]);
    }

    #[test]
    fn cannot_drop_below_minimum() {
        let mut state = AppState::new(2);
        assert!(!state.remove_slot(0));
        assert_eq!(state.slot_ids().len(), 2);
    }

    #[test]
    fn removing_unknown_id_is_a_no_op() {
        let mut state = AppState::new(3);
        assert!(!state.remove_slot(99));
        assert_eq!(state.slot_ids().len(), 3);
    }
}
