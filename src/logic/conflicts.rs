//! Conflict tracker: which players and courts are already committed at each slot.

use std::collections::BTreeSet;

/// What stops a match at a slot where at least one candidate court is in service.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Conflict {
    /// First player (in name order) already playing at the slot.
    PlayerBusy(String),
    /// Every candidate court is already committed at the slot.
    CourtsOccupied,
}

#[derive(Clone, Debug, Default)]
struct SlotCommitments {
    players: BTreeSet<String>,
    courts: BTreeSet<String>,
}

/// Per-slot commitments for one run. Commits are never undone.
#[derive(Clone, Debug, Default)]
pub struct ConflictTracker {
    slots: Vec<SlotCommitments>,
}

impl ConflictTracker {
    pub fn new(slot_count: usize) -> Self {
        Self {
            slots: vec![SlotCommitments::default(); slot_count],
        }
    }

    pub fn is_court_taken(&self, slot: usize, court: &str) -> bool {
        self.slots
            .get(slot)
            .map(|c| c.courts.contains(court))
            .unwrap_or(false)
    }

    fn busy_player<'p>(&self, players: &'p BTreeSet<String>, slot: usize) -> Option<&'p str> {
        let committed = &self.slots.get(slot)?.players;
        players
            .iter()
            .find(|p| committed.contains(*p))
            .map(String::as_str)
    }

    /// First court of `courts` (already in scan order) that `players` can take at `slot`.
    /// Players are checked before courts, so a busy player is reported even when every court is
    /// also taken. Slots outside the grid hold nothing to commit to and report `CourtsOccupied`.
    pub fn first_free_court<'c>(
        &self,
        players: &BTreeSet<String>,
        slot: usize,
        courts: &[&'c str],
    ) -> Result<&'c str, Conflict> {
        if slot >= self.slots.len() {
            return Err(Conflict::CourtsOccupied);
        }
        if let Some(player) = self.busy_player(players, slot) {
            return Err(Conflict::PlayerBusy(player.to_string()));
        }
        courts
            .iter()
            .copied()
            .find(|c| !self.is_court_taken(slot, c))
            .ok_or(Conflict::CourtsOccupied)
    }

    /// Record a placement. Out-of-grid slots are ignored.
    pub fn commit(&mut self, players: &BTreeSet<String>, slot: usize, court: &str) {
        if let Some(c) = self.slots.get_mut(slot) {
            c.courts.insert(court.to_string());
            c.players.extend(players.iter().cloned());
        }
    }
}
