//! In-process store, used by `serve --ephemeral` and tests.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;

use super::{StorageError, TournamentStore, Versioned};
use crate::models::{EntityId, PlayerId, PlayerProfile, TournamentRecord};

#[derive(Default)]
struct Inner {
    profiles: BTreeMap<PlayerId, Versioned<PlayerProfile>>,
    tournaments: Vec<TournamentRecord>,
}

/// [`TournamentStore`] that keeps everything in memory.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TournamentStore for MemoryStore {
    async fn player_directory(&self) -> Result<BTreeMap<String, PlayerId>, StorageError> {
        let inner = self.inner.lock().await;
        Ok(inner
            .profiles
            .values()
            .map(|v| (v.record.name.clone(), v.record.id.clone()))
            .collect())
    }

    async fn resolve_players(
        &self,
        names: &[String],
    ) -> Result<BTreeMap<String, PlayerId>, StorageError> {
        let mut inner = self.inner.lock().await;
        let mut resolved = BTreeMap::new();

        for name in names {
            let known = inner
                .profiles
                .values()
                .find(|v| &v.record.name == name)
                .map(|v| v.record.id.clone());

            let id = match known {
                Some(id) => id,
                None => {
                    let id = EntityId::random();
                    inner.profiles.insert(
                        id.clone(),
                        Versioned {
                            version: 0,
                            record: PlayerProfile::new(id.clone(), name.clone()),
                        },
                    );
                    id
                }
            };
            resolved.insert(name.clone(), id);
        }
        Ok(resolved)
    }

    async fn player_profiles(&self) -> Result<Vec<PlayerProfile>, StorageError> {
        let inner = self.inner.lock().await;
        Ok(inner.profiles.values().map(|v| v.record.clone()).collect())
    }

    async fn load_profile(
        &self,
        id: &PlayerId,
    ) -> Result<Versioned<PlayerProfile>, StorageError> {
        let inner = self.inner.lock().await;
        inner
            .profiles
            .get(id)
            .cloned()
            .ok_or_else(|| StorageError::UnknownPlayer(id.clone()))
    }

    async fn compare_and_swap_profile(
        &self,
        expected_version: u64,
        profile: PlayerProfile,
    ) -> Result<bool, StorageError> {
        let mut inner = self.inner.lock().await;
        let slot = inner
            .profiles
            .get_mut(&profile.id)
            .ok_or_else(|| StorageError::UnknownPlayer(profile.id.clone()))?;

        if slot.version != expected_version {
            return Ok(false);
        }
        slot.version += 1;
        slot.record = profile;
        Ok(true)
    }

    async fn tournament_history(
        &self,
        since: Option<DateTime<Utc>>,
    ) -> Result<Vec<TournamentRecord>, StorageError> {
        let inner = self.inner.lock().await;
        let mut records: Vec<TournamentRecord> = inner
            .tournaments
            .iter()
            .filter(|r| since.map_or(true, |s| r.created_at >= s))
            .cloned()
            .collect();
        records.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(records)
    }

    async fn append_tournament_record(
        &self,
        record: &TournamentRecord,
    ) -> Result<(), StorageError> {
        let mut inner = self.inner.lock().await;
        if inner.tournaments.iter().any(|r| r.id == record.id) {
            return Err(StorageError::DuplicateRecord(record.id.clone()));
        }
        inner.tournaments.push(record.clone());
        Ok(())
    }
}
