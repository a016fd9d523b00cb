//! # Swingers
//!
//! Rotating-partner doubles tournaments: every round re-pairs players so
//! partnerships spread evenly, results rank players individually, and a
//! windowed rating follows each player across tournaments.
//!
//! ## Architecture
//!
//! - **models**: Core data structures (rosters, rounds, results, records, profiles)
//! - **schedule**: Greedy rotating-partner round generation
//! - **ledger**: Match score entry and completeness
//! - **calculate**: Leaderboards, ratings and player standings
//! - **tournament**: A tournament from schedule to stored results
//! - **storage**: Player and tournament persistence (JSONL, in-memory)
//! - **api**: REST API endpoints
//! - **config**: Configuration loading and validation

pub mod api;
pub mod calculate;
pub mod config;
pub mod ledger;
pub mod models;
pub mod schedule;
pub mod storage;
pub mod tournament;

pub use models::*;
