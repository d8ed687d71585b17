//! Tournament: settings plus per-category match lists, and the last scheduling outcome.

use crate::models::game::SchedulableMatch;
use crate::models::schedule::ScheduleOutcome;
use crate::models::settings::GlobalSettings;
use serde::Serialize;
use std::collections::BTreeMap;
use uuid::Uuid;

/// Errors from editing a tournament (not from scheduling it).
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum TournamentError {
    /// Category names cannot be blank.
    EmptyCategoryName,
    /// A submitted match belongs to a different category than the list it was sent in.
    CategoryMismatch { expected: String, found: String },
}

impl std::fmt::Display for TournamentError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TournamentError::EmptyCategoryName => write!(f, "Category name cannot be empty"),
            TournamentError::CategoryMismatch { expected, found } => {
                write!(f, "Match belongs to category {} but was submitted for {}", found, expected)
            }
        }
    }
}

impl std::error::Error for TournamentError {}

/// Unique identifier for a tournament.
pub type TournamentId = Uuid;

/// Everything the scheduler needs for one tournament.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Tournament {
    pub id: TournamentId,
    pub settings: GlobalSettings,
    /// Match lists keyed by category name.
    pub categories: BTreeMap<String, Vec<SchedulableMatch>>,
    /// Result of the most recent scheduling run, if any.
    pub last_outcome: Option<ScheduleOutcome>,
}

impl Default for Tournament {
    fn default() -> Self {
        Self::new(GlobalSettings::default())
    }
}

impl Tournament {
    pub fn new(settings: GlobalSettings) -> Self {
        Self {
            id: Uuid::new_v4(),
            settings,
            categories: BTreeMap::new(),
            last_outcome: None,
        }
    }

    /// Replace the settings. Any previous schedule is stale afterwards.
    pub fn set_settings(&mut self, settings: GlobalSettings) {
        self.settings = settings;
        self.last_outcome = None;
    }

    /// Replace one category's matches (as produced by the group/bracket generators).
    pub fn set_category_matches(
        &mut self,
        category: &str,
        matches: Vec<SchedulableMatch>,
    ) -> Result<(), TournamentError> {
        let category = category.trim();
        if category.is_empty() {
            return Err(TournamentError::EmptyCategoryName);
        }
        if let Some(m) = matches.iter().find(|m| m.category != category) {
            return Err(TournamentError::CategoryMismatch {
                expected: category.to_string(),
                found: m.category.clone(),
            });
        }
        if matches.is_empty() {
            self.categories.remove(category);
        } else {
            self.categories.insert(category.to_string(), matches);
        }
        self.last_outcome = None;
        Ok(())
    }

    /// All matches, category by category, each list in its submitted order.
    pub fn all_matches(&self) -> Vec<SchedulableMatch> {
        self.categories.values().flatten().cloned().collect()
    }

    pub fn match_count(&self) -> usize {
        self.categories.values().map(Vec::len).sum()
    }
}
