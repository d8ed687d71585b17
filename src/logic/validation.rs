//! Structural checks on settings and matches, run before any assignment is attempted.

use crate::logic::dependencies::find_cycle;
use crate::models::{
    format_minutes, GlobalSettings, SchedulableMatch, ScheduleError, END_OF_DAY,
    MAX_PLAYERS_PER_MATCH,
};
use std::collections::HashSet;

/// Reject configuration errors: these are data problems, not capacity problems.
pub fn validate(settings: &GlobalSettings, matches: &[SchedulableMatch]) -> Result<(), ScheduleError> {
    validate_settings(settings)?;
    validate_matches(settings, matches)?;
    if let Some(ids) = find_cycle(matches) {
        return Err(ScheduleError::DependencyCycle(ids));
    }
    Ok(())
}

fn validate_settings(settings: &GlobalSettings) -> Result<(), ScheduleError> {
    let duration = settings.estimated_match_duration;
    if duration == 0 || duration > END_OF_DAY {
        return Err(ScheduleError::InvalidMatchDuration(duration));
    }
    if settings.dependency_buffer > END_OF_DAY {
        return Err(ScheduleError::InvalidDependencyBuffer(settings.dependency_buffer));
    }
    let mut names = HashSet::new();
    for court in &settings.courts {
        if !names.insert(court.name.as_str()) {
            return Err(ScheduleError::DuplicateCourt(court.name.clone()));
        }
        if let Some(w) = court.service_windows.iter().find(|w| w.is_malformed()) {
            return Err(ScheduleError::MalformedWindow {
                court: court.name.clone(),
                start: format_minutes(w.start_minute()),
                end: format_minutes(w.end_minute()),
            });
        }
    }
    Ok(())
}

fn validate_matches(settings: &GlobalSettings, matches: &[SchedulableMatch]) -> Result<(), ScheduleError> {
    let mut ids = HashSet::new();
    for m in matches {
        if !ids.insert(m.id.as_str()) {
            return Err(ScheduleError::DuplicateMatchId(m.id.clone()));
        }
    }

    for m in matches {
        if m.is_group_match && !m.dependencies.is_empty() {
            return Err(ScheduleError::GroupMatchWithDependencies(m.id.clone()));
        }
        for dep in &m.dependencies {
            if *dep == m.id {
                return Err(ScheduleError::SelfDependency(m.id.clone()));
            }
            if !ids.contains(dep.as_str()) {
                return Err(ScheduleError::UnknownDependency {
                    match_id: m.id.clone(),
                    dependency: dep.clone(),
                });
            }
        }
        let count = m.players().len();
        if count > MAX_PLAYERS_PER_MATCH {
            return Err(ScheduleError::TooManyPlayers {
                match_id: m.id.clone(),
                count,
            });
        }
        if let Some(name) = &m.court {
            match settings.court(name) {
                None => {
                    return Err(ScheduleError::UnknownCourt {
                        match_id: m.id.clone(),
                        court: name.clone(),
                    })
                }
                Some(court) if court.service_windows.is_empty() => {
                    return Err(ScheduleError::CourtWithoutWindows {
                        match_id: m.id.clone(),
                        court: name.clone(),
                    })
                }
                Some(_) => {}
            }
        }
    }
    Ok(())
}
