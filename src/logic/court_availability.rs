//! Court availability index: per court, per grid slot, whether the court is in service.

use crate::logic::time_grid::TimeGrid;
use crate::models::{Court, GlobalSettings};
use std::collections::HashMap;

/// Read-only lookup built once per run.
#[derive(Clone, Debug, Default)]
pub struct CourtAvailability {
    in_service: HashMap<String, Vec<bool>>,
}

impl CourtAvailability {
    pub fn build(settings: &GlobalSettings, grid: &TimeGrid) -> Self {
        let in_service = settings
            .courts
            .iter()
            .map(|court| (court.name.clone(), open_slots(court, grid)))
            .collect();
        Self { in_service }
    }

    /// Unknown courts and courts without windows are never in service.
    pub fn is_in_service(&self, court: &str, slot_index: usize) -> bool {
        self.in_service
            .get(court)
            .and_then(|slots| slots.get(slot_index))
            .copied()
            .unwrap_or(false)
    }
}

fn open_slots(court: &Court, grid: &TimeGrid) -> Vec<bool> {
    grid.slots()
        .iter()
        .map(|slot| court.is_open(slot.start, slot.end))
        .collect()
}
