//! Tournament calculations.
//!
//! - Leaderboard aggregation with the multi-key tie-break
//! - Windowed player ratings
//! - The all-time standings table

mod leaderboard;
mod rating;
mod standings;

pub use leaderboard::{aggregate, compare_standings};
pub use rating::{RatingEngine, DEFAULT_WINDOW_DAYS};
pub use standings::{percent, standings};
