//! SchedulableMatch and Team: group-stage and bracket matches in one shape.

use crate::models::settings::clock;
use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Unique identifier for a match (e.g. "M12").
pub type MatchId = String;

/// Most players a single match can involve (2v2).
pub const MAX_PLAYERS_PER_MATCH: usize = 4;

/// One side of a match. A team with no players is a placeholder ("Vencedor de M12")
/// that becomes concrete once its producing match has been decided.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Team {
    pub name: String,
    #[serde(default)]
    pub players: Vec<String>,
}

impl Team {
    pub fn new<I, S>(name: impl Into<String>, players: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            players: players.into_iter().map(Into::into).collect(),
        }
    }

    pub fn placeholder(label: impl Into<String>) -> Self {
        Self {
            name: label.into(),
            players: Vec::new(),
        }
    }

    pub fn is_placeholder(&self) -> bool {
        self.players.is_empty()
    }
}

/// A match the scheduler has to place on a (time slot, court) pair.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchedulableMatch {
    pub id: MatchId,
    pub category: String,
    /// e.g. "Grupo A", "Quartas de Final".
    pub stage: String,
    pub team1: Team,
    pub team2: Team,
    /// Matches that must be finished before this one can start.
    #[serde(default)]
    pub dependencies: Vec<MatchId>,
    #[serde(default)]
    pub is_group_match: bool,
    /// Do not start before this clock time.
    #[serde(with = "clock::option", default)]
    pub preferred_time: Option<NaiveTime>,
    /// Only place on this court.
    #[serde(default)]
    pub court: Option<String>,
}

impl SchedulableMatch {
    /// A round-robin match: both teams known, no dependencies.
    pub fn group(
        id: impl Into<MatchId>,
        category: impl Into<String>,
        stage: impl Into<String>,
        team1: Team,
        team2: Team,
    ) -> Self {
        Self {
            id: id.into(),
            category: category.into(),
            stage: stage.into(),
            team1,
            team2,
            dependencies: Vec::new(),
            is_group_match: true,
            preferred_time: None,
            court: None,
        }
    }

    /// An elimination match that waits on `dependencies`.
    pub fn bracket<I, S>(
        id: impl Into<MatchId>,
        category: impl Into<String>,
        stage: impl Into<String>,
        team1: Team,
        team2: Team,
        dependencies: I,
    ) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<MatchId>,
    {
        Self {
            id: id.into(),
            category: category.into(),
            stage: stage.into(),
            team1,
            team2,
            dependencies: dependencies.into_iter().map(Into::into).collect(),
            is_group_match: false,
            preferred_time: None,
            court: None,
        }
    }

    pub fn with_preferred_time(mut self, time: NaiveTime) -> Self {
        self.preferred_time = Some(time);
        self
    }

    pub fn on_court(mut self, court: impl Into<String>) -> Self {
        self.court = Some(court.into());
        self
    }

    /// Both sides resolved to real players.
    pub fn has_concrete_teams(&self) -> bool {
        !self.team1.is_placeholder() && !self.team2.is_placeholder()
    }

    /// Every player in the match; empty until both teams are concrete.
    pub fn players(&self) -> BTreeSet<String> {
        if !self.has_concrete_teams() {
            return BTreeSet::new();
        }
        self.team1
            .players
            .iter()
            .chain(self.team2.players.iter())
            .map(|p| p.trim().to_string())
            .filter(|p| !p.is_empty())
            .collect()
    }
}
