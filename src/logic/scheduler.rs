//! Scheduler: greedy, pass-based placement of matches onto (time slot, court) pairs.
//!
//! 1. Validate settings and matches (configuration errors abort the run).
//! 2. Order matches: group matches first, then bracket matches; within a tier by category,
//!    then input order.
//! 3. Repeat passes over the pending matches until a pass places nothing. A match waiting on
//!    an unplaced prerequisite stays pending; everything else is either placed on the first
//!    admissible (slot, court) pair or logged as unschedulable.
//! 4. Whatever is still pending after the last pass is logged as blocked by its prerequisites.
//!
//! Commitments only ever grow, so a match rejected everywhere in one pass would be rejected
//! again later and is not retried.

use crate::logic::conflicts::{Conflict, ConflictTracker};
use crate::logic::court_availability::CourtAvailability;
use crate::logic::dependencies::{earliest_start, EarliestStart};
use crate::logic::time_grid::TimeGrid;
use crate::logic::validation::validate;
use crate::models::{
    minutes_of_day, Assignment, GlobalSettings, MatchId, MatchStatus, Rejection,
    SchedulableMatch, ScheduleError, ScheduleOutcome, SchedulingLogEntry, TimeSlot, Tournament,
};
use std::collections::{BTreeMap, BTreeSet};

/// Schedule one match list. Pure: same inputs give the same outcome, log order included.
pub fn schedule_matches(
    settings: &GlobalSettings,
    matches: &[SchedulableMatch],
) -> Result<ScheduleOutcome, ScheduleError> {
    validate(settings, matches)?;
    let outcome = Run::new(settings).execute(matches)?;
    log::info!(
        "Scheduled {}/{} matches in {} pass(es), {} log entr(ies)",
        outcome.assignments.len(),
        matches.len(),
        outcome.passes,
        outcome.log.len()
    );
    Ok(outcome)
}

/// Reschedule every category in one run, so players entered in several categories
/// are checked against all of their matches.
pub fn reschedule_all(
    settings: &GlobalSettings,
    categories: &BTreeMap<String, Vec<SchedulableMatch>>,
) -> Result<ScheduleOutcome, ScheduleError> {
    let all: Vec<SchedulableMatch> = categories.values().flatten().cloned().collect();
    schedule_matches(settings, &all)
}

/// Reschedule the whole tournament and store the outcome on it.
pub fn schedule_tournament(tournament: &mut Tournament) -> Result<(), ScheduleError> {
    let outcome = reschedule_all(&tournament.settings, &tournament.categories)?;
    tournament.last_outcome = Some(outcome);
    Ok(())
}

/// Deterministic processing order: group tier first, then category, then input position.
pub fn scheduling_order(matches: &[SchedulableMatch]) -> Vec<&SchedulableMatch> {
    let mut ordered: Vec<&SchedulableMatch> = matches.iter().collect();
    // stable: equal keys keep input order
    ordered.sort_by(|a, b| {
        (!a.is_group_match, &a.category).cmp(&(!b.is_group_match, &b.category))
    });
    ordered
}

/// A match still waiting for placement, with the reasons collected for it so far.
struct Pending<'a> {
    m: &'a SchedulableMatch,
    players: BTreeSet<String>,
    reasons: Vec<Rejection>,
    missing: Vec<MatchId>,
}

impl<'a> Pending<'a> {
    fn new(m: &'a SchedulableMatch) -> Self {
        Self {
            m,
            players: m.players(),
            reasons: Vec::new(),
            missing: Vec::new(),
        }
    }
}

fn note(reasons: &mut Vec<Rejection>, reason: Rejection) {
    if !reasons.contains(&reason) {
        reasons.push(reason);
    }
}

/// State local to one scheduling run.
struct Run<'a> {
    settings: &'a GlobalSettings,
    grid: TimeGrid,
    availability: CourtAvailability,
    courts: Vec<&'a str>,
    tracker: ConflictTracker,
    outcome: ScheduleOutcome,
}

impl<'a> Run<'a> {
    fn new(settings: &'a GlobalSettings) -> Self {
        let grid = TimeGrid::from_settings(settings);
        let availability = CourtAvailability::build(settings, &grid);
        let courts = settings
            .courts_in_priority_order()
            .into_iter()
            .map(|c| c.name.as_str())
            .collect();
        let tracker = ConflictTracker::new(grid.len());
        Self {
            settings,
            grid,
            availability,
            courts,
            tracker,
            outcome: ScheduleOutcome::default(),
        }
    }

    fn execute(mut self, matches: &'a [SchedulableMatch]) -> Result<ScheduleOutcome, ScheduleError> {
        for m in matches {
            self.outcome.statuses.insert(m.id.clone(), MatchStatus::Pending);
        }
        let mut pending: Vec<Pending<'a>> = scheduling_order(matches)
            .into_iter()
            .map(Pending::new)
            .collect();

        // every productive pass places at least one match
        let pass_limit = matches.len() + 1;
        while !pending.is_empty() {
            self.outcome.passes += 1;
            if self.outcome.passes > pass_limit {
                return Err(ScheduleError::NoProgress {
                    pending: pending.len(),
                });
            }
            let before = pending.len();
            pending = self.run_pass(pending);
            log::debug!(
                "Pass {}: {} placed or rejected, {} waiting on prerequisites",
                self.outcome.passes,
                before - pending.len(),
                pending.len()
            );
            if pending.len() == before {
                break;
            }
        }

        for mut p in pending {
            note(&mut p.reasons, Rejection::PrerequisiteNotCompleted(p.missing.clone()));
            self.reject(&p, None);
        }
        Ok(self.outcome)
    }

    /// One pass over `pending`; returns the matches still blocked on prerequisites.
    fn run_pass(&mut self, pending: Vec<Pending<'a>>) -> Vec<Pending<'a>> {
        let mut blocked = Vec::new();
        for mut p in pending {
            if self.grid.is_empty() {
                note(&mut p.reasons, Rejection::OutsideTournamentWindow);
                self.reject(&p, None);
                continue;
            }
            let start = earliest_start(
                p.m,
                &self.outcome.assignments,
                &self.grid,
                self.settings.dependency_buffer,
            );
            let from = match start {
                EarliestStart::Unresolvable(missing) => {
                    note(&mut p.reasons, Rejection::DependencyPending);
                    p.missing = missing;
                    self.outcome
                        .statuses
                        .insert(p.m.id.clone(), MatchStatus::Unresolvable);
                    blocked.push(p);
                    continue;
                }
                EarliestStart::AfterGrid => None,
                EarliestStart::Slot(index) => self.apply_preferred_time(p.m, index),
            };
            let Some(from) = from else {
                note(&mut p.reasons, Rejection::OutsideTournamentWindow);
                self.reject(&p, None);
                continue;
            };
            match self.place(&mut p, from) {
                Ok(assignment) => {
                    log::debug!(
                        "Match {} -> {} on {}",
                        p.m.id,
                        assignment.time_slot.label(),
                        assignment.court_name
                    );
                    self.outcome
                        .statuses
                        .insert(p.m.id.clone(), MatchStatus::Scheduled);
                    self.outcome.assignments.insert(p.m.id.clone(), assignment);
                }
                Err(last_checked) => self.reject(&p, last_checked),
            }
        }
        blocked
    }

    /// Push the scan start to the first slot at or after the match's preferred time.
    fn apply_preferred_time(&self, m: &SchedulableMatch, from: usize) -> Option<usize> {
        match m.preferred_time {
            None => Some(from),
            Some(t) => self
                .grid
                .first_slot_at_or_after(minutes_of_day(t))
                .map(|preferred| preferred.max(from)),
        }
    }

    /// Scan slots from `from` and courts in priority order; commit the first admissible pair.
    /// On failure returns the last slot examined; reasons are collected on `p`.
    fn place(&mut self, p: &mut Pending<'a>, from: usize) -> Result<Assignment, Option<TimeSlot>> {
        let m = p.m;
        let pinned;
        let courts: &[&str] = match &m.court {
            Some(name) => {
                pinned = [name.as_str()];
                &pinned[..]
            }
            None => self.courts.as_slice(),
        };

        let mut last_checked = None;
        for slot in &self.grid.slots()[from..] {
            last_checked = Some(*slot);
            let open: Vec<&str> = courts
                .iter()
                .copied()
                .filter(|c| self.availability.is_in_service(c, slot.index))
                .collect();
            if open.is_empty() {
                note(&mut p.reasons, Rejection::NoCourtInService);
                continue;
            }
            match self.tracker.first_free_court(&p.players, slot.index, &open) {
                Ok(court) => {
                    self.tracker.commit(&p.players, slot.index, court);
                    return Ok(Assignment {
                        time_slot: *slot,
                        court_name: court.to_string(),
                    });
                }
                Err(Conflict::PlayerBusy(player)) => note(
                    &mut p.reasons,
                    Rejection::PlayerBusy {
                        player,
                        time: slot.label(),
                    },
                ),
                Err(Conflict::CourtsOccupied) => note(&mut p.reasons, Rejection::CourtsOccupied),
            }
        }
        Err(last_checked)
    }

    fn reject(&mut self, p: &Pending<'a>, checked_at: Option<TimeSlot>) {
        let status = if p.missing.is_empty() {
            MatchStatus::Unschedulable
        } else {
            MatchStatus::Unresolvable
        };
        self.outcome.statuses.insert(p.m.id.clone(), status);
        let reasons: Vec<String> = p.reasons.iter().map(ToString::to_string).collect();
        log::warn!(
            "Match {} ({} / {}) not scheduled: {}",
            p.m.id,
            p.m.category,
            p.m.stage,
            reasons.join("; ")
        );
        self.outcome
            .log
            .push(SchedulingLogEntry::for_match(p.m, reasons, checked_at));
    }
}
