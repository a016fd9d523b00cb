//! Cross-tournament player profiles.

use serde::{Deserialize, Serialize};

use super::{PlayerId, TournamentId};

/// A finishing position in one past tournament.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfilePlacement {
    pub rank: u32,
    /// Tournament name
    pub name: String,
    /// Record this placement came from; absent on older profiles.
    #[serde(
        rename = "tournamentId",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub tournament_id: Option<TournamentId>,
}

/// Lifetime counters for a player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerProfile {
    pub id: PlayerId,
    pub name: String,

    #[serde(default)]
    pub tournaments_played: u32,
    #[serde(default)]
    pub match_wins: u32,
    #[serde(default)]
    pub matches_played: u32,
    #[serde(default)]
    pub games_won: u32,
    #[serde(default)]
    pub total_games_played: u32,

    /// Append-only, oldest first.
    #[serde(default)]
    pub placements: Vec<ProfilePlacement>,
}

impl PlayerProfile {
    /// A fresh profile with no tournaments.
    pub fn new(id: PlayerId, name: String) -> Self {
        Self {
            id,
            name,
            tournaments_played: 0,
            match_wins: 0,
            matches_played: 0,
            games_won: 0,
            total_games_played: 0,
            placements: Vec::new(),
        }
    }

    /// Fold one finished tournament into the lifetime counters.
    pub fn apply(&mut self, delta: &ProfileDelta) {
        self.tournaments_played += 1;
        self.match_wins += delta.match_wins;
        self.matches_played += delta.matches_played;
        self.games_won += delta.games_won;
        self.total_games_played += delta.total_games_played;
        self.placements.push(delta.placement.clone());
    }

    /// Whether the tournament `id` has already been folded in.
    pub fn has_recorded(&self, id: &TournamentId) -> bool {
        self.placements
            .iter()
            .any(|p| p.tournament_id.as_ref() == Some(id))
    }

    /// Lifetime match win ratio, 0 with no matches.
    pub fn match_winrate(&self) -> f64 {
        if self.matches_played == 0 {
            0.0
        } else {
            self.match_wins as f64 / self.matches_played as f64
        }
    }

    /// Lifetime game win ratio, 0 with no games.
    pub fn game_winrate(&self) -> f64 {
        if self.total_games_played == 0 {
            0.0
        } else {
            self.games_won as f64 / self.total_games_played as f64
        }
    }
}

/// What one finished tournament adds to a profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileDelta {
    pub match_wins: u32,
    pub matches_played: u32,
    pub games_won: u32,
    pub total_games_played: u32,
    pub placement: ProfilePlacement,
}
