use axum::extract::{Path, Query, State};
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::api::state::AppState;
use crate::api::ApiError;
use crate::ledger::MatchRef;
use crate::models::{round_choices as choices_for, Leaderboard, Roster, RoundChoice, Side};
use crate::schedule::PairingScheduler;
use crate::storage::HistoryPage;
use crate::tournament::{schedule_rng, FinishedTournament, Tournament, TournamentError};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTournamentRequest {
    #[serde(default)]
    pub name: Option<String>,
    pub players: Vec<String>,
    pub rounds: usize,
    /// Fixes the shuffle so the schedule can be reproduced.
    #[serde(default)]
    pub seed: Option<u64>,
}

/// A session as returned to clients.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TournamentView {
    pub id: Uuid,
    #[serde(flatten)]
    pub tournament: Tournament,
    pub complete: bool,
    pub outstanding: Vec<MatchRef>,
    pub leaderboard: Leaderboard,
}

impl TournamentView {
    fn new(id: Uuid, tournament: &Tournament) -> Self {
        Self {
            id,
            tournament: tournament.clone(),
            complete: tournament.is_complete(),
            outstanding: tournament.outstanding(),
            leaderboard: tournament.leaderboard(),
        }
    }
}

fn not_found(id: Uuid) -> ApiError {
    ApiError::NotFound(format!("Tournament not found: {}", id))
}

pub async fn create_tournament(
    State(state): State<AppState>,
    Json(req): Json<CreateTournamentRequest>,
) -> Result<Json<TournamentView>, ApiError> {
    let roster = Roster::new(req.players).map_err(TournamentError::from)?;
    let name = req
        .name
        .filter(|n| !n.trim().is_empty())
        .unwrap_or_else(|| state.config.tournament.default_name.clone());

    let scheduler: PairingScheduler = state.scheduler();
    let mut rng = schedule_rng(req.seed);
    let tournament = Tournament::generate(&name, roster, req.rounds, &scheduler, &mut rng)?;

    let id = Uuid::new_v4();
    let view = TournamentView::new(id, &tournament);
    state.sessions.write().await.insert(id, tournament);
    info!("Started tournament {} ({})", view.tournament.name, id);

    Ok(Json(view))
}

pub async fn get_tournament(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<TournamentView>, ApiError> {
    let sessions = state.sessions.read().await;
    let tournament = sessions.get(&id).ok_or_else(|| not_found(id))?;
    Ok(Json(TournamentView::new(id, tournament)))
}

#[derive(Debug, Deserialize)]
pub struct ScoreRequest {
    pub team: Side,
    pub score: u8,
}

/// `round` and `match_index` are 0-based positions in the `rounds` array.
pub async fn set_score(
    State(state): State<AppState>,
    Path((id, round, match_index)): Path<(Uuid, usize, usize)>,
    Json(req): Json<ScoreRequest>,
) -> Result<Json<TournamentView>, ApiError> {
    let mut sessions = state.sessions.write().await;
    let tournament = sessions.get_mut(&id).ok_or_else(|| not_found(id))?;
    tournament.set_score(round, match_index, req.team, req.score)?;
    Ok(Json(TournamentView::new(id, tournament)))
}

/// Persist results. The session is dropped once the record is written.
///
/// The session is taken out of the map while its results are stored so other
/// tournaments are not held up; it goes back in if finishing fails.
pub async fn finish_tournament(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<FinishedTournament>, ApiError> {
    let mut tournament = state
        .sessions
        .write()
        .await
        .remove(&id)
        .ok_or_else(|| not_found(id))?;

    let outcome = tournament
        .finish(
            state.store.as_ref(),
            Utc::now(),
            state.config.storage.max_profile_retries,
        )
        .await;

    match outcome {
        Ok(finished) => Ok(Json(finished)),
        Err(err) => {
            state.sessions.write().await.insert(id, tournament);
            Err(err.into())
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct HistoryParams {
    pub before: Option<DateTime<Utc>>,
    pub page_size: Option<usize>,
}

pub async fn tournament_history(
    State(state): State<AppState>,
    Query(params): Query<HistoryParams>,
) -> Result<Json<HistoryPage>, ApiError> {
    let page_size = params
        .page_size
        .unwrap_or(state.config.rating.history_page_size)
        .clamp(1, 100);
    let page = state.store.history_page(params.before, page_size).await?;
    Ok(Json(page))
}

#[derive(Debug, Deserialize)]
pub struct RoundChoiceParams {
    pub players: usize,
}

#[derive(Debug, Serialize)]
pub struct RoundChoicesResponse {
    pub choices: Vec<RoundChoice>,
}

pub async fn round_choices(
    State(state): State<AppState>,
    Query(params): Query<RoundChoiceParams>,
) -> Json<RoundChoicesResponse> {
    Json(RoundChoicesResponse {
        choices: choices_for(params.players, state.config.tournament.round_choice_limit),
    })
}
