//! Persisted tournament records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{EntityId, PlayerId, PlayerTournamentResult, TournamentId};

/// Type tag written on every record this crate produces.
pub const TOURNAMENT_KIND: &str = "Swingers";

/// Name used when the organiser leaves the tournament name blank.
pub const DEFAULT_TOURNAMENT_NAME: &str = "Swingers Tournament";

fn default_kind() -> String {
    TOURNAMENT_KIND.to_string()
}

/// One leaderboard row as stored, tagged with the durable player ID.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordedResult {
    pub player_id: PlayerId,
    pub name: String,

    #[serde(flatten)]
    pub result: PlayerTournamentResult,

    /// Stored games won minus games lost; older records may lack it.
    #[serde(default)]
    pub win_loss_diff: i32,

    /// Rounded match win percentage shown on the results screen.
    #[serde(default)]
    pub match_winrate: u32,
}

impl RecordedResult {
    pub fn new(player_id: PlayerId, name: String, result: PlayerTournamentResult) -> Self {
        let win_loss_diff = result.win_loss_diff();
        let match_winrate = result.match_winrate_percent();
        Self {
            player_id,
            name,
            result,
            win_loss_diff,
            match_winrate,
        }
    }
}

/// A finished tournament. Immutable once written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TournamentRecord {
    pub id: TournamentId,

    pub name: String,

    #[serde(rename = "type", default = "default_kind")]
    pub kind: String,

    pub created_at: DateTime<Utc>,

    /// Results in leaderboard order (index 0 = winner).
    #[serde(default)]
    pub results: Vec<RecordedResult>,
}

impl TournamentRecord {
    /// Create a record with a content-derived ID.
    pub fn new(name: &str, created_at: DateTime<Utc>, results: Vec<RecordedResult>) -> Self {
        let name = match name.trim() {
            "" => DEFAULT_TOURNAMENT_NAME.to_string(),
            trimmed => trimmed.to_string(),
        };
        let id = EntityId::generate(&[TOURNAMENT_KIND, &name, &created_at.to_rfc3339()]);

        Self {
            id,
            name,
            kind: default_kind(),
            created_at,
            results,
        }
    }

    /// Number of players who took part.
    pub fn participants(&self) -> usize {
        self.results.len()
    }

    /// 1-based placement of a player in stored order.
    pub fn placement_of(&self, player_id: &PlayerId) -> Option<usize> {
        self.results
            .iter()
            .position(|r| &r.player_id == player_id)
            .map(|i| i + 1)
    }

    pub fn result_for(&self, player_id: &PlayerId) -> Option<&RecordedResult> {
        self.results.iter().find(|r| &r.player_id == player_id)
    }
}
