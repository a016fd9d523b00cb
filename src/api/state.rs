use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;
use uuid::Uuid;

use crate::calculate::RatingEngine;
use crate::config::AppConfig;
use crate::schedule::PairingScheduler;
use crate::storage::TournamentStore;
use crate::tournament::Tournament;

/// Tournaments being played, keyed by session ID.
pub type Sessions = Arc<RwLock<HashMap<Uuid, Tournament>>>;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn TournamentStore>,
    pub sessions: Sessions,
    pub config: Arc<AppConfig>,
    pub rating: RatingEngine,
}

impl AppState {
    pub fn new(store: Arc<dyn TournamentStore>, config: AppConfig) -> Self {
        let rating = RatingEngine::new(config.rating.window_days);
        Self {
            store,
            sessions: Arc::new(RwLock::new(HashMap::new())),
            config: Arc::new(config),
            rating,
        }
    }

    pub fn scheduler(&self) -> PairingScheduler {
        PairingScheduler::new(self.config.tournament.leftover_policy)
    }
}
