//! Scheduling engine: time grid, court availability, conflicts, dependencies, and the scheduler.

mod conflicts;
mod court_availability;
mod dependencies;
mod generation;
mod scheduler;
mod time_grid;
mod validation;

pub use conflicts::{Conflict, ConflictTracker};
pub use court_availability::CourtAvailability;
pub use dependencies::{earliest_start, find_cycle, EarliestStart};
pub use generation::{knockout_round, round_robin_matches, winner_of};
pub use scheduler::{reschedule_all, schedule_matches, schedule_tournament, scheduling_order};
pub use time_grid::TimeGrid;
pub use validation::validate;
