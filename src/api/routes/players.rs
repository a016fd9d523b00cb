use axum::extract::{Path, State};
use axum::Json;
use chrono::Utc;
use serde::Serialize;

use crate::api::state::AppState;
use crate::api::ApiError;
use crate::calculate::standings;
use crate::models::{PlayerId, PlayerRating, PlayerStanding};

#[derive(Debug, Serialize)]
pub struct StandingsResponse {
    pub players: Vec<PlayerStanding>,
}

/// Every player with at least one finished tournament, best rating first.
pub async fn list_standings(
    State(state): State<AppState>,
) -> Result<Json<StandingsResponse>, ApiError> {
    let now = Utc::now();
    let profiles = state.store.player_profiles().await?;
    let history = state
        .store
        .tournament_history(Some(state.rating.window_start(now)))
        .await?;

    Ok(Json(StandingsResponse {
        players: standings(&state.rating, &profiles, &history, now),
    }))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RatingResponse {
    pub player_id: PlayerId,
    pub name: String,
    pub rating: PlayerRating,
    pub breakdown: String,
}

pub async fn player_rating(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<RatingResponse>, ApiError> {
    let now = Utc::now();
    let player_id = PlayerId::from(id);
    let profile = state.store.load_profile(&player_id).await?.record;
    let history = state
        .store
        .tournament_history(Some(state.rating.window_start(now)))
        .await?;

    let rating = state.rating.rating(&player_id, &history, now);
    Ok(Json(RatingResponse {
        player_id,
        name: profile.name,
        breakdown: rating.breakdown(),
        rating,
    }))
}
