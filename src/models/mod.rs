//! Core data models for tournaments, players and ratings.

mod ids;
mod profile;
mod result;
mod roster;
mod round;
mod stats;
mod tournament;

pub use ids::*;
pub use profile::*;
pub use result::*;
pub use roster::*;
pub use round::*;
pub use stats::*;
pub use tournament::*;
