//! File-backed store under the data directory.
//!
//! `tournaments.jsonl` is append-only. `players.jsonl` holds one versioned
//! profile per line and is rewritten whole on each successful swap.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;
use tracing::{debug, info};

use super::{
    EntityType, JsonlReader, JsonlWriter, StorageConfig, StorageError, TournamentStore, Versioned,
};
use crate::models::{EntityId, PlayerId, PlayerProfile, TournamentRecord};

/// JSONL-backed [`TournamentStore`].
pub struct JsonlStore {
    config: StorageConfig,
    /// Serialises read-modify-write cycles on the files.
    write_lock: Mutex<()>,
}

impl JsonlStore {
    pub fn new(config: StorageConfig) -> Self {
        Self {
            config,
            write_lock: Mutex::new(()),
        }
    }

    pub fn config(&self) -> &StorageConfig {
        &self.config
    }

    /// Strict: this file is written back whole, so a skipped line would be lost.
    fn read_profiles(&self) -> Result<Vec<Versioned<PlayerProfile>>, StorageError> {
        JsonlReader::for_entity(&self.config, EntityType::Player).read_all_strict()
    }

    fn write_profiles(&self, profiles: &[Versioned<PlayerProfile>]) -> Result<(), StorageError> {
        JsonlWriter::for_entity(&self.config, EntityType::Player).write_all(profiles)?;
        Ok(())
    }

    fn read_tournaments(&self) -> Result<Vec<TournamentRecord>, StorageError> {
        JsonlReader::for_entity(&self.config, EntityType::Tournament).read_all()
    }
}

#[async_trait]
impl TournamentStore for JsonlStore {
    async fn player_directory(&self) -> Result<BTreeMap<String, PlayerId>, StorageError> {
        Ok(self
            .read_profiles()?
            .into_iter()
            .map(|v| (v.record.name, v.record.id))
            .collect())
    }

    async fn resolve_players(
        &self,
        names: &[String],
    ) -> Result<BTreeMap<String, PlayerId>, StorageError> {
        let _guard = self.write_lock.lock().await;

        let mut profiles = self.read_profiles()?;
        let mut resolved = BTreeMap::new();
        let mut created = 0;

        for name in names {
            let existing = profiles.iter().position(|v| &v.record.name == name);
            let id = match existing {
                Some(idx) => profiles[idx].record.id.clone(),
                None => {
                    let profile = PlayerProfile::new(EntityId::random(), name.clone());
                    let id = profile.id.clone();
                    profiles.push(Versioned {
                        version: 0,
                        record: profile,
                    });
                    created += 1;
                    id
                }
            };
            resolved.insert(name.clone(), id);
        }

        if created > 0 {
            self.write_profiles(&profiles)?;
            info!("Created {} new player profiles", created);
        }
        Ok(resolved)
    }

    async fn player_profiles(&self) -> Result<Vec<PlayerProfile>, StorageError> {
        Ok(self.read_profiles()?.into_iter().map(|v| v.record).collect())
    }

    async fn load_profile(
        &self,
        id: &PlayerId,
    ) -> Result<Versioned<PlayerProfile>, StorageError> {
        self.read_profiles()?
            .into_iter()
            .find(|v| &v.record.id == id)
            .ok_or_else(|| StorageError::UnknownPlayer(id.clone()))
    }

    async fn compare_and_swap_profile(
        &self,
        expected_version: u64,
        profile: PlayerProfile,
    ) -> Result<bool, StorageError> {
        let _guard = self.write_lock.lock().await;

        let mut profiles = self.read_profiles()?;
        let slot = profiles
            .iter_mut()
            .find(|v| v.record.id == profile.id)
            .ok_or_else(|| StorageError::UnknownPlayer(profile.id.clone()))?;

        if slot.version != expected_version {
            debug!(
                "Version mismatch for {}: expected {}, found {}",
                profile.id, expected_version, slot.version
            );
            return Ok(false);
        }

        slot.version += 1;
        slot.record = profile;
        self.write_profiles(&profiles)?;
        Ok(true)
    }

    async fn tournament_history(
        &self,
        since: Option<DateTime<Utc>>,
    ) -> Result<Vec<TournamentRecord>, StorageError> {
        let mut records = JsonlReader::<TournamentRecord>::for_entity(
            &self.config,
            EntityType::Tournament,
        )
        .read_where(|r| since.map_or(true, |s| r.created_at >= s))?;
        records.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(records)
    }

    async fn append_tournament_record(
        &self,
        record: &TournamentRecord,
    ) -> Result<(), StorageError> {
        let _guard = self.write_lock.lock().await;

        if self.read_tournaments()?.iter().any(|r| r.id == record.id) {
            return Err(StorageError::DuplicateRecord(record.id.clone()));
        }

        JsonlWriter::for_entity(&self.config, EntityType::Tournament).append(record)?;
        info!("Recorded tournament {} ({})", record.name, record.id);
        Ok(())
    }
}
