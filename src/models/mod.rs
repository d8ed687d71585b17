//! Data structures for the scheduler: settings, matches, schedule results, tournament container.

mod game;
mod schedule;
mod settings;
mod tournament;

pub use game::{MatchId, SchedulableMatch, Team, MAX_PLAYERS_PER_MATCH};
pub use schedule::{
    Assignment, MatchStatus, Rejection, ScheduleError, ScheduleOutcome, ScheduledMatch,
    SchedulingLogEntry, TimeSlot,
};
pub use settings::{
    format_minutes, minutes_of_day, Court, GlobalSettings, ServiceWindow, DEFAULT_MATCH_DURATION,
    END_OF_DAY,
};
pub use tournament::{Tournament, TournamentError, TournamentId};
