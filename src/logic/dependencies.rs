//! Dependency resolver: earliest start for a match given its prerequisites' assignments,
//! and cycle detection over the dependency graph.

use crate::logic::time_grid::TimeGrid;
use crate::models::{Assignment, MatchId, SchedulableMatch};
use std::collections::{BTreeMap, HashMap, VecDeque};

/// Where the slot scan for a match may begin.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum EarliestStart {
    /// Grid index of the first admissible slot.
    Slot(usize),
    /// Admissible start lies past the last slot (or the grid is empty).
    AfterGrid,
    /// These prerequisites have no assignment yet; retry after more matches are placed.
    Unresolvable(Vec<MatchId>),
}

/// Earliest admissible slot for `m`.
///
/// Group matches (and any match without dependencies) may start at the first slot. A dependent
/// match must wait until every prerequisite's slot has ended plus `buffer` minutes, rounded up
/// to the next grid slot.
pub fn earliest_start(
    m: &SchedulableMatch,
    assignments: &BTreeMap<MatchId, Assignment>,
    grid: &TimeGrid,
    buffer: u32,
) -> EarliestStart {
    let mut missing = Vec::new();
    let mut ready_at: Option<u32> = None;
    for dep in &m.dependencies {
        match assignments.get(dep) {
            Some(a) => {
                let done = a.time_slot.end.saturating_add(buffer);
                ready_at = Some(ready_at.map_or(done, |r| r.max(done)));
            }
            None => missing.push(dep.clone()),
        }
    }
    if !missing.is_empty() {
        return EarliestStart::Unresolvable(missing);
    }
    let slot = match ready_at {
        None => (!grid.is_empty()).then_some(0),
        Some(minute) => grid.first_slot_at_or_after(minute),
    };
    slot.map_or(EarliestStart::AfterGrid, EarliestStart::Slot)
}

/// Ids that cannot be topologically ordered (on a cycle or downstream of one), sorted.
/// Dependencies on unknown ids are ignored here; validation reports them separately.
pub fn find_cycle(matches: &[SchedulableMatch]) -> Option<Vec<MatchId>> {
    let index: HashMap<&str, usize> = matches
        .iter()
        .enumerate()
        .map(|(i, m)| (m.id.as_str(), i))
        .collect();

    let mut in_degree = vec![0usize; matches.len()];
    let mut dependents: Vec<Vec<usize>> = vec![Vec::new(); matches.len()];
    for (i, m) in matches.iter().enumerate() {
        for dep in &m.dependencies {
            if let Some(&d) = index.get(dep.as_str()) {
                in_degree[i] += 1;
                dependents[d].push(i);
            }
        }
    }

    // Kahn's algorithm
    let mut queue: VecDeque<usize> = (0..matches.len()).filter(|&i| in_degree[i] == 0).collect();
    let mut visited = 0;
    while let Some(i) = queue.pop_front() {
        visited += 1;
        for &next in &dependents[i] {
            in_degree[next] -= 1;
            if in_degree[next] == 0 {
                queue.push_back(next);
            }
        }
    }
    if visited == matches.len() {
        return None;
    }

    let mut stuck: Vec<MatchId> = matches
        .iter()
        .enumerate()
        .filter(|(i, _)| in_degree[*i] > 0)
        .map(|(_, m)| m.id.clone())
        .collect();
    stuck.sort();
    Some(stuck)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Team, TimeSlot};

    fn grid() -> TimeGrid {
        TimeGrid::build(480, 720, 20)
    }

    fn assigned(grid: &TimeGrid, index: usize) -> Assignment {
        Assignment {
            time_slot: grid.get(index).unwrap(),
            court_name: "Q1".into(),
        }
    }

    fn semifinal() -> SchedulableMatch {
        SchedulableMatch::bracket(
            "SF1",
            "Open",
            "Semifinal",
            Team::placeholder("Vencedor de QF1"),
            Team::placeholder("Vencedor de QF2"),
            ["QF1", "QF2"],
        )
    }

    fn group(id: &str) -> SchedulableMatch {
        SchedulableMatch::group(id, "Open", "Grupo A", Team::new("A", ["a"]), Team::new("B", ["b"]))
    }

    #[test]
    fn group_match_starts_at_first_slot() {
        let g = grid();
        assert_eq!(earliest_start(&group("G1"), &BTreeMap::new(), &g, 0), EarliestStart::Slot(0));
        assert_eq!(
            earliest_start(&group("G1"), &BTreeMap::new(), &TimeGrid::default(), 0),
            EarliestStart::AfterGrid
        );
    }

    #[test]
    fn unresolvable_until_every_prerequisite_is_assigned() {
        let g = grid();
        let mut assignments = BTreeMap::new();
        assert_eq!(
            earliest_start(&semifinal(), &assignments, &g, 0),
            EarliestStart::Unresolvable(vec!["QF1".into(), "QF2".into()])
        );
        assignments.insert("QF1".to_string(), assigned(&g, 0));
        assert_eq!(
            earliest_start(&semifinal(), &assignments, &g, 0),
            EarliestStart::Unresolvable(vec!["QF2".into()])
        );
        assignments.insert("QF2".to_string(), assigned(&g, 3));
        // QF2 ends at slot 4's start
        assert_eq!(earliest_start(&semifinal(), &assignments, &g, 0), EarliestStart::Slot(4));
    }

    #[test]
    fn buffer_rounds_up_to_next_slot() {
        let g = grid();
        let mut assignments = BTreeMap::new();
        assignments.insert("QF1".to_string(), assigned(&g, 0));
        assignments.insert("QF2".to_string(), assigned(&g, 1));
        // QF2 ends 09:00, +5 minutes -> 09:05, next slot 09:20
        assert_eq!(earliest_start(&semifinal(), &assignments, &g, 5), EarliestStart::Slot(3));
        assert_eq!(earliest_start(&semifinal(), &assignments, &g, 20), EarliestStart::Slot(3));
    }

    #[test]
    fn prerequisite_ending_at_grid_end_pushes_past_grid() {
        let g = grid();
        let last = g.len() - 1;
        let mut assignments = BTreeMap::new();
        assignments.insert("QF1".to_string(), assigned(&g, 0));
        assignments.insert(
            "QF2".to_string(),
            Assignment {
                time_slot: TimeSlot { index: last, start: 700, end: 720 },
                court_name: "Q2".into(),
            },
        );
        assert_eq!(earliest_start(&semifinal(), &assignments, &g, 0), EarliestStart::AfterGrid);
    }

    #[test]
    fn huge_buffer_saturates_past_grid() {
        let g = grid();
        let mut assignments = BTreeMap::new();
        assignments.insert("QF1".to_string(), assigned(&g, 0));
        assignments.insert("QF2".to_string(), assigned(&g, 1));
        assert_eq!(
            earliest_start(&semifinal(), &assignments, &g, u32::MAX),
            EarliestStart::AfterGrid
        );
    }

    #[test]
    fn detects_cycle() {
        let a = SchedulableMatch::bracket("A", "Open", "R1", Team::placeholder("x"), Team::placeholder("y"), ["C"]);
        let b = SchedulableMatch::bracket("B", "Open", "R2", Team::placeholder("x"), Team::placeholder("y"), ["A"]);
        let c = SchedulableMatch::bracket("C", "Open", "R3", Team::placeholder("x"), Team::placeholder("y"), ["B"]);
        let d = SchedulableMatch::bracket("D", "Open", "R4", Team::placeholder("x"), Team::placeholder("y"), ["C"]);
        let matches = vec![group("G1"), a, b, c, d];
        assert_eq!(
            find_cycle(&matches),
            Some(vec!["A".into(), "B".into(), "C".into(), "D".into()])
        );
    }

    #[test]
    fn chain_is_acyclic() {
        let quarter = SchedulableMatch::bracket("QF1", "Open", "Quartas", Team::placeholder("x"), Team::placeholder("y"), ["G1"]);
        assert_eq!(find_cycle(&[semifinal(), quarter, group("G1"), group("QF2")]), None);
    }
}
