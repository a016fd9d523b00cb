//! A tournament from generated schedule to persisted results.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::calculate::aggregate;
use crate::ledger::{self, LedgerError, MatchRef};
use crate::models::{
    Leaderboard, PlayerProfile, ProfileDelta, ProfilePlacement, RecordedResult, Roster, Round,
    Side, TournamentRecord, ValidationError, DEFAULT_TOURNAMENT_NAME,
};
use crate::schedule::{LeftoverPolicy, PairingScheduler};
use crate::storage::{StorageError, TournamentStore};

/// How a caller should react to an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ErrorKind {
    /// The input is wrong; retrying unchanged will fail again.
    FixInput,
    /// A collaborator failed; the same request may succeed later.
    TryAgain,
}

/// Errors from running a tournament.
#[derive(Debug, Error)]
pub enum TournamentError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Ledger(#[from] LedgerError),

    #[error("Please enter scores for all matches ({} outstanding)", .outstanding.len())]
    Incomplete { outstanding: Vec<MatchRef> },

    #[error("Results are already recorded; scores can no longer change")]
    AlreadyRecorded,

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

impl TournamentError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            TournamentError::Validation(_)
            | TournamentError::Ledger(_)
            | TournamentError::Incomplete { .. }
            | TournamentError::AlreadyRecorded
            | TournamentError::Storage(StorageError::DuplicateRecord(_)) => ErrorKind::FixInput,
            TournamentError::Storage(_) => ErrorKind::TryAgain,
        }
    }
}

/// RNG for scheduling: reproducible when seeded, from entropy otherwise.
pub fn schedule_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}

/// An in-progress tournament.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tournament {
    pub name: String,
    pub roster: Roster,
    pub rounds: Vec<Round>,
    pub leftover_policy: LeftoverPolicy,

    /// Rounds asked for at generation; more than `rounds.len()` when the
    /// scheduler ran out of pairings.
    pub requested_rounds: usize,

    /// Partnership counts over the whole schedule, keyed `"A-B"`.
    pub partnerships: BTreeMap<String, u32>,

    /// Creation time of the stored record once one has been written.
    /// Retried finishes reuse it so the record ID stays the same.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recorded_at: Option<DateTime<Utc>>,
}

/// What [`Tournament::finish`] wrote.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FinishedTournament {
    pub record: TournamentRecord,
    pub leaderboard: Leaderboard,
    pub profiles: Vec<PlayerProfile>,
}

impl Tournament {
    /// Validate the round count and schedule every round.
    pub fn generate<R: Rng + ?Sized>(
        name: &str,
        roster: Roster,
        round_count: usize,
        scheduler: &PairingScheduler,
        rng: &mut R,
    ) -> Result<Self, TournamentError> {
        roster.validate_round_count(round_count)?;

        let schedule = scheduler.generate_rounds(&roster, round_count, rng);
        if schedule.is_exhausted() {
            warn!(
                "Only {} of {} rounds could be scheduled",
                schedule.rounds.len(),
                round_count
            );
        }

        let name = match name.trim() {
            "" => DEFAULT_TOURNAMENT_NAME.to_string(),
            trimmed => trimmed.to_string(),
        };

        Ok(Self {
            name,
            roster,
            rounds: schedule.rounds,
            leftover_policy: scheduler.leftover_policy(),
            requested_rounds: round_count,
            partnerships: schedule.partnerships.to_keyed(),
            recorded_at: None,
        })
    }

    /// Enter a score. `round` and `match_index` are 0-based.
    pub fn set_score(
        &mut self,
        round: usize,
        match_index: usize,
        side: Side,
        value: u8,
    ) -> Result<(), TournamentError> {
        if self.recorded_at.is_some() {
            return Err(TournamentError::AlreadyRecorded);
        }
        ledger::set_score(&mut self.rounds, round, match_index, side, value)?;
        Ok(())
    }

    pub fn is_complete(&self) -> bool {
        ledger::is_tournament_complete(&self.rounds)
    }

    pub fn outstanding(&self) -> Vec<MatchRef> {
        ledger::outstanding_matches(&self.rounds)
    }

    /// Live leaderboard over the matches decided so far.
    pub fn leaderboard(&self) -> Leaderboard {
        aggregate(&self.roster, &self.rounds)
    }

    /// Persist the finished tournament and fold it into every player's profile.
    ///
    /// The record is written before any profile is touched. If a profile
    /// update then fails, the record stays and the error is returned; calling
    /// `finish` again reuses the same record and only updates the profiles
    /// that do not hold it yet.
    pub async fn finish(
        &mut self,
        store: &dyn TournamentStore,
        now: DateTime<Utc>,
        max_attempts: u32,
    ) -> Result<FinishedTournament, TournamentError> {
        let outstanding = self.outstanding();
        if !outstanding.is_empty() {
            return Err(TournamentError::Incomplete { outstanding });
        }

        let leaderboard = self.leaderboard();
        let ids = store.resolve_players(self.roster.players()).await?;

        let mut results = Vec::with_capacity(leaderboard.len());
        for standing in &leaderboard.standings {
            let id = ids.get(&standing.name).cloned().ok_or_else(|| {
                StorageError::UnknownPlayer(standing.name.as_str().into())
            })?;
            results.push(RecordedResult::new(
                id,
                standing.name.clone(),
                standing.result.clone(),
            ));
        }

        let created_at = self.recorded_at.unwrap_or(now);
        let record = TournamentRecord::new(&self.name, created_at, results);
        match store.append_tournament_record(&record).await {
            Ok(()) => {}
            Err(StorageError::DuplicateRecord(id)) if self.recorded_at.is_some() => {
                debug!("Record {} already stored, resuming profile updates", id);
            }
            Err(e) => return Err(e.into()),
        }
        self.recorded_at = Some(created_at);

        let mut profiles = Vec::with_capacity(record.results.len());
        for (idx, result) in record.results.iter().enumerate() {
            let delta = ProfileDelta {
                match_wins: result.result.match_wins,
                matches_played: result.result.matches_played,
                games_won: result.result.games_won,
                total_games_played: result.result.total_games_played,
                placement: ProfilePlacement {
                    rank: (idx + 1) as u32,
                    name: record.name.clone(),
                    tournament_id: Some(record.id.clone()),
                },
            };
            let profile = store
                .update_player_profile(&result.player_id, &delta, max_attempts)
                .await?;
            profiles.push(profile);
        }

        info!(
            "Finished {} ({} players, winner {})",
            record.name,
            record.participants(),
            leaderboard
                .podium()
                .first()
                .map(|s| s.name.as_str())
                .unwrap_or("-")
        );

        Ok(FinishedTournament {
            record,
            leaderboard,
            profiles,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PlayerId;
    use crate::storage::{MemoryStore, Versioned};
    use async_trait::async_trait;
    use chrono::TimeZone;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn roster(names: &[&str]) -> Roster {
        Roster::new(names.iter().copied()).unwrap()
    }

    fn four() -> Tournament {
        let mut rng = schedule_rng(Some(7));
        Tournament::generate(
            "Friday",
            roster(&["A", "B", "C", "D"]),
            3,
            &PairingScheduler::default(),
            &mut rng,
        )
        .unwrap()
    }

    /// Team 1 wins every match 3-1.
    fn score_all(t: &mut Tournament) {
        for r in 0..t.rounds.len() {
            for m in 0..t.rounds[r].matches.len() {
                t.set_score(r, m, Side::Team2, 1).unwrap();
            }
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 2, 21, 0, 0).unwrap()
    }

    #[test]
    fn test_generate_validates_round_count() {
        let mut rng = schedule_rng(Some(1));
        let err = Tournament::generate(
            "x",
            roster(&["A", "B", "C", "D"]),
            4,
            &PairingScheduler::default(),
            &mut rng,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            TournamentError::Validation(ValidationError::TooManyRounds { .. })
        ));
        assert_eq!(err.kind(), ErrorKind::FixInput);
    }

    #[test]
    fn test_generate_four_players() {
        let t = four();
        assert_eq!(t.rounds.len(), 3);
        assert_eq!(t.requested_rounds, 3);
        assert_eq!(t.partnerships.len(), 6);
        assert!(t.partnerships.values().all(|c| *c == 1));
        assert!(!t.is_complete());
        assert_eq!(t.outstanding().len(), 3);
    }

    #[test]
    fn test_blank_name_defaults() {
        let mut rng = schedule_rng(Some(1));
        let t = Tournament::generate(
            "  ",
            roster(&["A", "B", "C", "D"]),
            1,
            &PairingScheduler::default(),
            &mut rng,
        )
        .unwrap();
        assert_eq!(t.name, DEFAULT_TOURNAMENT_NAME);
    }

    #[test]
    fn test_same_seed_same_schedule() {
        assert_eq!(four().rounds, four().rounds);
    }

    #[test]
    fn test_set_score_errors() {
        let mut t = four();
        assert!(matches!(
            t.set_score(9, 0, Side::Team1, 1),
            Err(TournamentError::Ledger(LedgerError::UnknownRound(9)))
        ));
        assert!(matches!(
            t.set_score(0, 0, Side::Team1, 4),
            Err(TournamentError::Ledger(LedgerError::ScoreOutOfRange(4)))
        ));
    }

    #[test]
    fn test_finish_blocks_until_complete() {
        let mut t = four();
        t.set_score(0, 0, Side::Team1, 2).unwrap();
        let store = MemoryStore::new();

        let err = tokio_test::block_on(t.finish(&store, now(), 3)).unwrap_err();
        match &err {
            TournamentError::Incomplete { outstanding } => {
                assert_eq!(
                    outstanding,
                    &vec![
                        MatchRef { round: 1, match_index: 0 },
                        MatchRef { round: 2, match_index: 0 },
                    ]
                );
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(err.kind(), ErrorKind::FixInput);
        assert!(tokio_test::block_on(store.tournament_history(None))
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_finish_records_and_updates_profiles() {
        let mut t = four();
        score_all(&mut t);
        assert!(t.is_complete());

        let store = MemoryStore::new();
        let finished = t.finish(&store, now(), 3).await.unwrap();

        assert_eq!(finished.record.name, "Friday");
        assert_eq!(finished.record.participants(), 4);
        assert_eq!(finished.leaderboard.names(), t.leaderboard().names());
        assert_eq!(finished.profiles.len(), 4);

        let history = store.tournament_history(None).await.unwrap();
        assert_eq!(history, vec![finished.record.clone()]);

        for (idx, result) in finished.record.results.iter().enumerate() {
            let profile = store.load_profile(&result.player_id).await.unwrap().record;
            assert_eq!(profile.name, result.name);
            assert_eq!(profile.tournaments_played, 1);
            assert_eq!(profile.matches_played, 3);
            assert_eq!(profile.total_games_played, 12);
            assert_eq!(profile.match_wins, result.result.match_wins);
            assert_eq!(
                profile.placements,
                vec![ProfilePlacement {
                    rank: (idx + 1) as u32,
                    name: "Friday".to_string(),
                    tournament_id: Some(finished.record.id.clone()),
                }]
            );
        }
    }

    #[tokio::test]
    async fn test_second_tournament_reuses_players() {
        let store = MemoryStore::new();

        let mut first = four();
        score_all(&mut first);
        let a = first.finish(&store, now(), 3).await.unwrap();

        let mut second = four();
        score_all(&mut second);
        let later = now() + chrono::Duration::days(7);
        let b = second.finish(&store, later, 3).await.unwrap();

        assert_eq!(store.player_profiles().await.unwrap().len(), 4);
        let ann_first = a.record.results.iter().find(|r| r.name == "A").unwrap();
        let ann_second = b.record.results.iter().find(|r| r.name == "A").unwrap();
        assert_eq!(ann_first.player_id, ann_second.player_id);

        let profile = store.load_profile(&ann_first.player_id).await.unwrap();
        assert_eq!(profile.record.tournaments_played, 2);
        assert_eq!(profile.record.placements.len(), 2);
    }

    #[tokio::test]
    async fn test_finishing_twice_records_once() {
        let mut t = four();
        score_all(&mut t);
        let store = MemoryStore::new();

        let first = t.finish(&store, now(), 3).await.unwrap();
        let later = now() + chrono::Duration::minutes(5);
        let second = t.finish(&store, later, 3).await.unwrap();

        assert_eq!(first.record, second.record);
        assert_eq!(store.tournament_history(None).await.unwrap().len(), 1);
        for profile in store.player_profiles().await.unwrap() {
            assert_eq!(profile.tournaments_played, 1);
        }
    }

    #[tokio::test]
    async fn test_scores_locked_once_recorded() {
        let mut t = four();
        score_all(&mut t);
        t.finish(&MemoryStore::new(), now(), 3).await.unwrap();

        let err = t.set_score(0, 0, Side::Team1, 1).unwrap_err();
        assert!(matches!(err, TournamentError::AlreadyRecorded));
        assert_eq!(err.kind(), ErrorKind::FixInput);
    }

    /// Fails one profile swap with an I/O error, then behaves.
    struct FailsOnce {
        inner: MemoryStore,
        swaps: AtomicUsize,
        fail_on: usize,
    }

    #[async_trait]
    impl TournamentStore for FailsOnce {
        async fn player_directory(&self) -> Result<BTreeMap<String, PlayerId>, StorageError> {
            self.inner.player_directory().await
        }

        async fn resolve_players(
            &self,
            names: &[String],
        ) -> Result<BTreeMap<String, PlayerId>, StorageError> {
            self.inner.resolve_players(names).await
        }

        async fn player_profiles(&self) -> Result<Vec<PlayerProfile>, StorageError> {
            self.inner.player_profiles().await
        }

        async fn load_profile(
            &self,
            id: &PlayerId,
        ) -> Result<Versioned<PlayerProfile>, StorageError> {
            self.inner.load_profile(id).await
        }

        async fn compare_and_swap_profile(
            &self,
            expected_version: u64,
            profile: PlayerProfile,
        ) -> Result<bool, StorageError> {
            if self.swaps.fetch_add(1, Ordering::SeqCst) + 1 == self.fail_on {
                return Err(StorageError::Io(std::io::Error::new(
                    std::io::ErrorKind::Other,
                    "disk unavailable",
                )));
            }
            self.inner
                .compare_and_swap_profile(expected_version, profile)
                .await
        }

        async fn tournament_history(
            &self,
            since: Option<DateTime<Utc>>,
        ) -> Result<Vec<TournamentRecord>, StorageError> {
            self.inner.tournament_history(since).await
        }

        async fn append_tournament_record(
            &self,
            record: &TournamentRecord,
        ) -> Result<(), StorageError> {
            self.inner.append_tournament_record(record).await
        }
    }

    #[tokio::test]
    async fn test_retry_after_failed_profile_update_counts_once() {
        let mut t = four();
        score_all(&mut t);
        let store = FailsOnce {
            inner: MemoryStore::new(),
            swaps: AtomicUsize::new(0),
            fail_on: 3,
        };

        let err = t.finish(&store, now(), 3).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::TryAgain);
        assert!(t.recorded_at.is_some());

        let later = now() + chrono::Duration::seconds(5);
        let finished = t.finish(&store, later, 3).await.unwrap();
        assert_eq!(finished.record.created_at, now());
        assert_eq!(finished.profiles.len(), 4);

        let history = store.tournament_history(None).await.unwrap();
        assert_eq!(history.len(), 1);

        for profile in store.player_profiles().await.unwrap() {
            assert_eq!(profile.tournaments_played, 1, "{}", profile.name);
            assert_eq!(profile.placements.len(), 1, "{}", profile.name);
            assert_eq!(profile.matches_played, 3, "{}", profile.name);
        }
    }

    #[test]
    fn test_storage_errors_are_retryable() {
        let err = TournamentError::from(StorageError::Conflict {
            player_id: "p1".into(),
            attempts: 3,
        });
        assert_eq!(err.kind(), ErrorKind::TryAgain);

        let err = TournamentError::from(StorageError::DuplicateRecord("t1".into()));
        assert_eq!(err.kind(), ErrorKind::FixInput);
    }
}
