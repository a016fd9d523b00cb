//! Derived rating and standings models.

use serde::{Deserialize, Serialize};

use super::{PlayerId, ProfilePlacement};

/// A player's windowed rating and the factors it was built from.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerRating {
    pub final_rating: f64,
    pub base_rating: f64,
    pub win_loss_multiplier: f64,
    pub participation_multiplier: f64,
}

impl PlayerRating {
    /// Rating of a player with no tournaments in the window.
    pub fn unrated() -> Self {
        Self {
            final_rating: 0.0,
            base_rating: 0.0,
            win_loss_multiplier: 1.0,
            participation_multiplier: 1.0,
        }
    }

    /// Human-readable breakdown, two decimals per factor.
    pub fn breakdown(&self) -> String {
        format!(
            "(Base Rating) {:.2} * (Win/Loss Multiplier) {:.2} * (Participation Multiplier) {:.2}",
            self.base_rating, self.win_loss_multiplier, self.participation_multiplier
        )
    }
}

impl Default for PlayerRating {
    fn default() -> Self {
        Self::unrated()
    }
}

/// One row of the all-time player table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerStanding {
    pub player_id: PlayerId,
    pub name: String,
    pub rating: PlayerRating,
    pub rating_breakdown: String,
    pub tournaments_played: u32,
    pub match_wins: u32,
    pub matches_played: u32,
    pub games_won: u32,
    pub total_games_played: u32,

    /// Rounded percentages for display.
    pub match_winrate: u32,
    pub game_winrate: u32,

    /// Newest first.
    pub placements: Vec<ProfilePlacement>,
}
