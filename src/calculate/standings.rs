//! All-time player table: profiles joined with current ratings.

use chrono::{DateTime, Utc};

use super::RatingEngine;
use crate::models::{PlayerProfile, PlayerStanding, TournamentRecord};

/// Convert a ratio to a rounded whole percentage.
pub fn percent(ratio: f64) -> u32 {
    (ratio * 100.0).round() as u32
}

/// Rate every profile that has finished at least one tournament, best first.
pub fn standings(
    engine: &RatingEngine,
    profiles: &[PlayerProfile],
    history: &[TournamentRecord],
    now: DateTime<Utc>,
) -> Vec<PlayerStanding> {
    let mut rows: Vec<PlayerStanding> = profiles
        .iter()
        .filter(|p| p.tournaments_played > 0)
        .map(|p| {
            let rating = engine.rating(&p.id, history, now);
            PlayerStanding {
                player_id: p.id.clone(),
                name: p.name.clone(),
                rating,
                rating_breakdown: rating.breakdown(),
                tournaments_played: p.tournaments_played,
                match_wins: p.match_wins,
                matches_played: p.matches_played,
                games_won: p.games_won,
                total_games_played: p.total_games_played,
                match_winrate: percent(p.match_winrate()),
                game_winrate: percent(p.game_winrate()),
                placements: p.placements.iter().rev().cloned().collect(),
            }
        })
        .collect();

    rows.sort_by(|a, b| {
        b.rating
            .final_rating
            .total_cmp(&a.rating.final_rating)
            .then_with(|| a.name.cmp(&b.name))
    });
    rows
}
