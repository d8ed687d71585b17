//! Match list producers: round-robin group matches and knockout rounds with placeholders.
//!
//! Deterministic: the same teams in the same order always give the same ids and pairings.

use crate::models::{MatchId, SchedulableMatch, Team};

/// Every pair of `teams` plays once: n·(n−1)/2 group matches, ids `{id_prefix}1`, `{id_prefix}2`, …
///
/// Pairings are listed team by team (1×2, 1×3, …, 2×3, …).
pub fn round_robin_matches(
    category: &str,
    stage: &str,
    teams: &[Team],
    id_prefix: &str,
) -> Vec<SchedulableMatch> {
    let mut matches = Vec::new();
    for (i, home) in teams.iter().enumerate() {
        for away in &teams[i + 1..] {
            let id = format!("{}{}", id_prefix, matches.len() + 1);
            matches.push(SchedulableMatch::group(
                id,
                category,
                stage,
                home.clone(),
                away.clone(),
            ));
        }
    }
    matches
}

/// Placeholder label for the winner of a match.
pub fn winner_of(match_id: &str) -> String {
    format!("Vencedor de {}", match_id)
}

/// Next knockout round: the winners of consecutive `previous` matches meet.
///
/// Each new match depends on the two matches feeding it and has placeholder teams until
/// those are decided. With an odd count the last previous match gets no pairing.
pub fn knockout_round(
    category: &str,
    stage: &str,
    previous: &[MatchId],
    id_prefix: &str,
) -> Vec<SchedulableMatch> {
    previous
        .chunks_exact(2)
        .enumerate()
        .map(|(i, pair)| {
            SchedulableMatch::bracket(
                format!("{}{}", id_prefix, i + 1),
                category,
                stage,
                Team::placeholder(winner_of(&pair[0])),
                Team::placeholder(winner_of(&pair[1])),
                [pair[0].clone(), pair[1].clone()],
            )
        })
        .collect()
}
