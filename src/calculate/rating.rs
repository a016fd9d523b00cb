//! Windowed player ratings from tournament history.
//!
//! Each tournament a player appears in within the window is worth
//! `sqrt(participants) / placement` points. The base rating is the mean of
//! those points, then scaled by a win/loss multiplier
//! (`1 + total game differential / 100`) and a participation multiplier
//! (`1 + share of windowed tournaments attended / 10`). Both multipliers are
//! floored at zero before they are applied.

use chrono::{DateTime, Duration, Utc};
use tracing::debug;

use crate::models::{PlayerId, PlayerRating, TournamentRecord};

/// Default trailing window, in days.
pub const DEFAULT_WINDOW_DAYS: i64 = 365;

/// Computes ratings over a trailing window. Stateless; safe to share.
#[derive(Debug, Clone, Copy)]
pub struct RatingEngine {
    window: Duration,
}

impl Default for RatingEngine {
    fn default() -> Self {
        Self::new(DEFAULT_WINDOW_DAYS)
    }
}

impl RatingEngine {
    pub fn new(window_days: i64) -> Self {
        Self {
            window: Duration::days(window_days),
        }
    }

    /// Earliest creation time counted when rating at `now`.
    pub fn window_start(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        now - self.window
    }

    fn in_window(&self, record: &TournamentRecord, now: DateTime<Utc>) -> bool {
        record.created_at >= self.window_start(now) && record.created_at <= now
    }

    /// Rate `player_id` against the full `history` as of `now`.
    pub fn rating(
        &self,
        player_id: &PlayerId,
        history: &[TournamentRecord],
        now: DateTime<Utc>,
    ) -> PlayerRating {
        let mut window_tournaments = 0usize;
        let mut points: Vec<f64> = Vec::new();
        let mut total_win_loss_diff: i64 = 0;

        for record in history.iter().filter(|r| self.in_window(r, now)) {
            window_tournaments += 1;

            let Some(placement) = record.placement_of(player_id) else {
                continue;
            };
            let participants = record.participants() as f64;
            points.push(participants.sqrt() / placement as f64);

            if let Some(result) = record.result_for(player_id) {
                total_win_loss_diff += i64::from(result.win_loss_diff);
            }
        }

        if points.is_empty() {
            return PlayerRating::unrated();
        }

        let appearances = points.len() as f64;
        let base_rating = points.iter().sum::<f64>() / appearances;
        let win_loss_multiplier = 1.0 + total_win_loss_diff as f64 / 100.0;
        let participation_multiplier = 1.0 + (appearances / window_tournaments as f64) / 10.0;
        let final_rating =
            base_rating * win_loss_multiplier.max(0.0) * participation_multiplier.max(0.0);

        debug!(
            "Rated {}: {} of {} windowed tournaments, final {:.3}",
            player_id,
            points.len(),
            window_tournaments,
            final_rating
        );

        PlayerRating {
            final_rating,
            base_rating,
            win_loss_multiplier,
            participation_multiplier,
        }
    }
}
