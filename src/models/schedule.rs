//! Scheduling results: time slots, assignments, the scheduling log and configuration errors.

use crate::models::game::{MatchId, SchedulableMatch};
use crate::models::settings::format_minutes;
use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;

/// One step of the time grid: `[start, end)` in minutes since midnight.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct TimeSlot {
    /// Position in the grid (0 = tournament start).
    pub index: usize,
    pub start: u32,
    pub end: u32,
}

impl TimeSlot {
    pub fn label(&self) -> String {
        format_minutes(self.start)
    }
}

impl Serialize for TimeSlot {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut s = serializer.serialize_struct("TimeSlot", 3)?;
        s.serialize_field("index", &self.index)?;
        s.serialize_field("start", &format_minutes(self.start))?;
        s.serialize_field("end", &format_minutes(self.end))?;
        s.end()
    }
}

/// Where and when a match is played. Final once written.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Assignment {
    pub time_slot: TimeSlot,
    pub court_name: String,
}

/// Why a match could not be placed. Rendered as the operator-facing reason text.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Rejection {
    /// The match's earliest start is past the last slot (or the grid is empty).
    OutsideTournamentWindow,
    /// No court (or not the pinned court) is open at the slot.
    NoCourtInService,
    /// A player is already committed at the slot.
    PlayerBusy { player: String, time: String },
    /// Every open court is taken at the slot.
    CourtsOccupied,
    /// A prerequisite has no assignment yet in this pass.
    DependencyPending,
    /// Prerequisites still unassigned after the last pass.
    PrerequisiteNotCompleted(Vec<MatchId>),
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rejection::OutsideTournamentWindow => write!(f, "fora da janela do torneio"),
            Rejection::NoCourtInService => write!(f, "nenhuma quadra em serviço neste horário"),
            Rejection::PlayerBusy { player, time } => {
                write!(f, "jogador {} já possui partida às {}", player, time)
            }
            Rejection::CourtsOccupied => {
                write!(f, "todas as quadras em serviço já estão ocupadas neste horário")
            }
            Rejection::DependencyPending => write!(f, "dependência ainda não agendada"),
            Rejection::PrerequisiteNotCompleted(ids) => {
                write!(f, "pré-requisito não concluído ({})", ids.join(", "))
            }
        }
    }
}

/// One unscheduled match and the reasons, in the order they were first hit.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SchedulingLogEntry {
    pub match_id: MatchId,
    pub team1: String,
    pub team2: String,
    pub category: String,
    pub stage: String,
    pub reasons: Vec<String>,
    /// Last slot examined ("HH:MM"); None when no slot was examined.
    pub checked_at_time: Option<String>,
}

impl SchedulingLogEntry {
    pub fn for_match(m: &SchedulableMatch, reasons: Vec<String>, checked_at: Option<TimeSlot>) -> Self {
        Self {
            match_id: m.id.clone(),
            team1: m.team1.name.clone(),
            team2: m.team2.name.clone(),
            category: m.category.clone(),
            stage: m.stage.clone(),
            reasons,
            checked_at_time: checked_at.map(|s| s.label()),
        }
    }

    pub fn has_reason(&self, fragment: &str) -> bool {
        self.reasons.iter().any(|r| r.contains(fragment))
    }
}

impl fmt::Display for SchedulingLogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {}: {} x {}",
            self.category, self.stage, self.team1, self.team2
        )?;
        if let Some(time) = &self.checked_at_time {
            write!(f, " @ {}", time)?;
        }
        write!(f, ": {}", self.reasons.join("; "))
    }
}

/// Final state of a match after a run.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchStatus {
    /// Not yet attempted.
    Pending,
    /// Waiting on a prerequisite that has no assignment.
    Unresolvable,
    Scheduled,
    /// Every slot/court pair was rejected.
    Unschedulable,
}

/// Result of a scheduling run: the (possibly partial) schedule plus the log.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleOutcome {
    pub assignments: BTreeMap<MatchId, Assignment>,
    pub statuses: BTreeMap<MatchId, MatchStatus>,
    pub log: Vec<SchedulingLogEntry>,
    /// Passes over the pending set.
    pub passes: usize,
}

impl ScheduleOutcome {
    /// True when every match got an assignment.
    pub fn is_complete(&self) -> bool {
        self.statuses.values().all(|s| *s == MatchStatus::Scheduled)
    }

    pub fn assignment(&self, match_id: &str) -> Option<&Assignment> {
        self.assignments.get(match_id)
    }

    pub fn status(&self, match_id: &str) -> Option<MatchStatus> {
        self.statuses.get(match_id).copied()
    }

    /// Ids left without an assignment, in id order.
    pub fn unscheduled_ids(&self) -> Vec<&str> {
        self.statuses
            .iter()
            .filter(|(_, s)| **s != MatchStatus::Scheduled)
            .map(|(id, _)| id.as_str())
            .collect()
    }

    pub fn log_for(&self, match_id: &str) -> Vec<&SchedulingLogEntry> {
        self.log.iter().filter(|e| e.match_id == match_id).collect()
    }

    /// Merge assignments back into the matches as `time`/`court` (input order kept).
    pub fn apply_to(&self, matches: &[SchedulableMatch]) -> Vec<ScheduledMatch> {
        matches
            .iter()
            .map(|m| {
                let assignment = self.assignments.get(&m.id);
                ScheduledMatch {
                    details: m.clone(),
                    time: assignment.map(|a| a.time_slot.label()),
                    court: assignment.map(|a| a.court_name.clone()),
                }
            })
            .collect()
    }
}

/// A match with whatever assignment it received (partial schedule row).
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct ScheduledMatch {
    #[serde(flatten)]
    pub details: SchedulableMatch,
    pub time: Option<String>,
    pub court: Option<String>,
}

/// Configuration errors: abort the run before any assignment is attempted.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ScheduleError {
    DuplicateMatchId(MatchId),
    DuplicateCourt(String),
    UnknownDependency { match_id: MatchId, dependency: MatchId },
    SelfDependency(MatchId),
    GroupMatchWithDependencies(MatchId),
    /// Ids involved in (or blocked behind) a dependency cycle.
    DependencyCycle(Vec<MatchId>),
    MalformedWindow { court: String, start: String, end: String },
    /// Zero, or longer than a day.
    InvalidMatchDuration(u32),
    InvalidDependencyBuffer(u32),
    UnknownCourt { match_id: MatchId, court: String },
    CourtWithoutWindows { match_id: MatchId, court: String },
    TooManyPlayers { match_id: MatchId, count: usize },
    /// Pass limit reached with matches still pending.
    NoProgress { pending: usize },
}

impl fmt::Display for ScheduleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScheduleError::DuplicateMatchId(id) => write!(f, "Duplicate match id {}", id),
            ScheduleError::DuplicateCourt(name) => write!(f, "Duplicate court name {}", name),
            ScheduleError::UnknownDependency { match_id, dependency } => {
                write!(f, "Match {} depends on unknown match {}", match_id, dependency)
            }
            ScheduleError::SelfDependency(id) => write!(f, "Match {} depends on itself", id),
            ScheduleError::GroupMatchWithDependencies(id) => {
                write!(f, "Group match {} cannot have dependencies", id)
            }
            ScheduleError::DependencyCycle(ids) => {
                write!(f, "Dependency cycle between matches {}", ids.join(", "))
            }
            ScheduleError::MalformedWindow { court, start, end } => {
                write!(f, "Court {} has a service window ending ({}) at or before its start ({})", court, end, start)
            }
            ScheduleError::InvalidMatchDuration(minutes) => {
                write!(f, "Match duration must be between 1 and 1440 minutes (got {})", minutes)
            }
            ScheduleError::InvalidDependencyBuffer(minutes) => {
                write!(f, "Dependency buffer must be at most 1440 minutes (got {})", minutes)
            }
            ScheduleError::UnknownCourt { match_id, court } => {
                write!(f, "Match {} requires unknown court {}", match_id, court)
            }
            ScheduleError::CourtWithoutWindows { match_id, court } => {
                write!(f, "Match {} requires court {}, which has no service windows", match_id, court)
            }
            ScheduleError::TooManyPlayers { match_id, count } => {
                write!(f, "Match {} has {} players (at most 4)", match_id, count)
            }
            ScheduleError::NoProgress { pending } => {
                write!(f, "Scheduling stopped making progress with {} matches pending", pending)
            }
        }
    }
}

impl std::error::Error for ScheduleError {}
