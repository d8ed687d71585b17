//! Tournament match scheduler: library with models and the scheduling engine.

pub mod logic;
pub mod models;

pub use logic::{
    earliest_start, knockout_round, reschedule_all, round_robin_matches, schedule_matches,
    schedule_tournament, validate, Conflict, ConflictTracker, CourtAvailability, EarliestStart, TimeGrid,
};
pub use models::{
    Assignment, Court, GlobalSettings, MatchId, MatchStatus, SchedulableMatch, ScheduleError,
    ScheduleOutcome, ScheduledMatch, SchedulingLogEntry, ServiceWindow, Team, TimeSlot,
    Tournament, TournamentError, TournamentId,
};
