//! Time grid: the ordered, fixed sequence of match slots between tournament start and end.

use crate::models::{GlobalSettings, TimeSlot};

/// Discrete slots `start + k * duration`, each ending no later than the tournament end.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct TimeGrid {
    slots: Vec<TimeSlot>,
}

impl TimeGrid {
    /// Build the grid for `[start, end)` (minutes of day) stepping by `duration`.
    /// Empty when `start >= end`, when `duration` is zero, or when not even one
    /// whole match fits in the window.
    pub fn build(start: u32, end: u32, duration: u32) -> Self {
        let mut slots = Vec::new();
        if duration == 0 {
            return Self { slots };
        }
        let mut slot_start = start;
        while let Some(slot_end) = slot_start.checked_add(duration).filter(|e| *e <= end) {
            slots.push(TimeSlot {
                index: slots.len(),
                start: slot_start,
                end: slot_end,
            });
            slot_start = slot_end;
        }
        Self { slots }
    }

    pub fn from_settings(settings: &GlobalSettings) -> Self {
        Self::build(
            settings.start_minute(),
            settings.end_minute(),
            settings.estimated_match_duration,
        )
    }

    pub fn slots(&self) -> &[TimeSlot] {
        &self.slots
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<TimeSlot> {
        self.slots.get(index).copied()
    }

    /// Index of the first slot starting at or after `minute` ("round up to the grid").
    pub fn first_slot_at_or_after(&self, minute: u32) -> Option<usize> {
        let idx = self.slots.partition_point(|s| s.start < minute);
        (idx < self.slots.len()).then_some(idx)
    }
}
