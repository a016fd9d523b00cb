//! Persistence for players and finished tournaments.
//!
//! The tournament core never talks to storage directly; it goes through the
//! [`TournamentStore`] trait:
//! - a player directory (name -> durable ID, created on first use)
//! - write-once tournament records
//! - versioned player profiles updated by compare-and-swap with retry
//!
//! Two implementations ship: [`JsonlStore`] (files under the data directory)
//! and [`MemoryStore`] (in-process).

mod jsonl;
mod local;
mod memory;

pub use jsonl::*;
pub use local::JsonlStore;
pub use memory::MemoryStore;

use std::collections::BTreeMap;
use std::path::PathBuf;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::models::{PlayerId, PlayerProfile, ProfileDelta, TournamentId, TournamentRecord};

/// Errors that can occur during storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Tournament {0} has already been recorded")]
    DuplicateRecord(TournamentId),

    #[error("Unknown player: {0}")]
    UnknownPlayer(PlayerId),

    #[error("Profile update for {player_id} gave up after {attempts} conflicting attempts")]
    Conflict { player_id: PlayerId, attempts: u32 },
}

/// Configuration for storage paths.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub data_dir: PathBuf,
}

impl StorageConfig {
    pub fn new(data_dir: PathBuf) -> Self {
        Self { data_dir }
    }

    pub fn tournaments_path(&self) -> PathBuf {
        self.data_dir.join(EntityType::Tournament.filename())
    }

    pub fn players_path(&self) -> PathBuf {
        self.data_dir.join(EntityType::Player.filename())
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self::new(PathBuf::from("./data"))
    }
}

/// A record plus the version it was read at.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Versioned<T> {
    pub version: u64,
    pub record: T,
}

/// One page of tournament history, newest first.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryPage {
    pub tournaments: Vec<TournamentRecord>,
    /// Pass as `before` to fetch the next page; absent on the last page.
    pub next_before: Option<DateTime<Utc>>,
}

/// Slice a page out of `records` (any order).
pub fn paginate(
    mut records: Vec<TournamentRecord>,
    before: Option<DateTime<Utc>>,
    page_size: usize,
) -> HistoryPage {
    records.retain(|r| before.map_or(true, |b| r.created_at < b));
    records.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    records.truncate(page_size);

    let next_before = if page_size > 0 && records.len() == page_size {
        records.last().map(|r| r.created_at)
    } else {
        None
    };

    HistoryPage {
        tournaments: records,
        next_before,
    }
}

/// The persistence collaborator used by the tournament lifecycle and the API.
#[async_trait]
pub trait TournamentStore: Send + Sync {
    /// Every known player, name -> ID.
    async fn player_directory(&self) -> Result<BTreeMap<String, PlayerId>, StorageError>;

    /// Look up IDs for `names`, creating empty profiles for unknown names.
    async fn resolve_players(
        &self,
        names: &[String],
    ) -> Result<BTreeMap<String, PlayerId>, StorageError>;

    async fn player_profiles(&self) -> Result<Vec<PlayerProfile>, StorageError>;

    async fn load_profile(&self, id: &PlayerId)
        -> Result<Versioned<PlayerProfile>, StorageError>;

    /// Store `profile` only if its stored version is still `expected_version`.
    /// Returns `false` when another writer got there first.
    async fn compare_and_swap_profile(
        &self,
        expected_version: u64,
        profile: PlayerProfile,
    ) -> Result<bool, StorageError>;

    /// Records created at or after `since` (all when `None`), oldest first.
    async fn tournament_history(
        &self,
        since: Option<DateTime<Utc>>,
    ) -> Result<Vec<TournamentRecord>, StorageError>;

    /// Write a finished tournament. Records are write-once.
    async fn append_tournament_record(&self, record: &TournamentRecord)
        -> Result<(), StorageError>;

    /// Apply `delta` with a read-modify-write transaction, retrying on
    /// conflict up to `max_attempts` times.
    ///
    /// A delta whose placement names a tournament the profile already holds
    /// is not applied again; the stored profile is returned unchanged.
    async fn update_player_profile(
        &self,
        id: &PlayerId,
        delta: &ProfileDelta,
        max_attempts: u32,
    ) -> Result<PlayerProfile, StorageError> {
        for attempt in 1..=max_attempts {
            let Versioned { version, mut record } = self.load_profile(id).await?;
            if let Some(tournament_id) = &delta.placement.tournament_id {
                if record.has_recorded(tournament_id) {
                    debug!("Profile {} already holds tournament {}", id, tournament_id);
                    return Ok(record);
                }
            }
            record.apply(delta);

            if self.compare_and_swap_profile(version, record.clone()).await? {
                debug!("Updated profile {} (attempt {})", id, attempt);
                return Ok(record);
            }
            warn!(
                "Profile {} changed underneath us, retrying ({}/{})",
                id, attempt, max_attempts
            );
        }

        Err(StorageError::Conflict {
            player_id: id.clone(),
            attempts: max_attempts,
        })
    }

    /// Newest-first history page of records created strictly before `before`.
    async fn history_page(
        &self,
        before: Option<DateTime<Utc>>,
        page_size: usize,
    ) -> Result<HistoryPage, StorageError> {
        let records = self.tournament_history(None).await?;
        Ok(paginate(records, before, page_size))
    }
}
