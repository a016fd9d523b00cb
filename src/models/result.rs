//! Per-player tournament totals and the finished leaderboard.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Accumulated totals for one player over one tournament.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerTournamentResult {
    pub match_wins: u32,
    pub matches_played: u32,
    pub games_won: u32,
    pub games_lost: u32,
    pub total_games_played: u32,

    /// Opponent name -> signed game differential summed over every meeting.
    #[serde(default)]
    pub opponents: BTreeMap<String, i32>,
}

impl PlayerTournamentResult {
    /// Games won minus games lost.
    pub fn win_loss_diff(&self) -> i32 {
        self.games_won as i32 - self.games_lost as i32
    }

    /// Match win ratio (0.0 to 1.0), 0 when nothing was played.
    pub fn match_winrate(&self) -> f64 {
        if self.matches_played == 0 {
            0.0
        } else {
            self.match_wins as f64 / self.matches_played as f64
        }
    }

    /// Match win rate as a rounded whole percentage, for display.
    pub fn match_winrate_percent(&self) -> u32 {
        (self.match_winrate() * 100.0).round() as u32
    }

    /// Cumulative differential against `opponent` (0 if they never met).
    pub fn differential_against(&self, opponent: &str) -> i32 {
        self.opponents.get(opponent).copied().unwrap_or(0)
    }
}

/// One ranked row of a leaderboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Standing {
    pub name: String,
    pub result: PlayerTournamentResult,
}

/// All roster players in final rank order (index 0 = winner).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Leaderboard {
    pub standings: Vec<Standing>,
}

impl Leaderboard {
    /// Player names in rank order.
    pub fn names(&self) -> Vec<&str> {
        self.standings.iter().map(|s| s.name.as_str()).collect()
    }

    /// 1-based rank of `name`.
    pub fn rank_of(&self, name: &str) -> Option<usize> {
        self.standings
            .iter()
            .position(|s| s.name == name)
            .map(|i| i + 1)
    }

    pub fn get(&self, name: &str) -> Option<&PlayerTournamentResult> {
        self.standings
            .iter()
            .find(|s| s.name == name)
            .map(|s| &s.result)
    }

    /// The top three, for the podium.
    pub fn podium(&self) -> &[Standing] {
        &self.standings[..self.standings.len().min(3)]
    }

    pub fn len(&self) -> usize {
        self.standings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.standings.is_empty()
    }
}
