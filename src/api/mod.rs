//! REST API endpoints.
//!
//! Axum-based HTTP API for running tournaments and querying player
//! standings and tournament history.

pub mod routes;
pub mod state;

use axum::{
    http::{HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use serde::Serialize;
use thiserror::Error;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::warn;

use crate::storage::StorageError;
use crate::tournament::{ErrorKind, TournamentError};
use state::AppState;

/// API error types.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    /// The request is well-formed but the tournament is not in a state to accept it.
    #[error("{0}")]
    Unprocessable(String),

    #[error("Temporarily unavailable: {0}")]
    Unavailable(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            ApiError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, "FIX_INPUT"),
            ApiError::Unprocessable(_) => (StatusCode::UNPROCESSABLE_ENTITY, "FIX_INPUT"),
            ApiError::Unavailable(_) => (StatusCode::SERVICE_UNAVAILABLE, "TRY_AGAIN"),
            ApiError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        };

        let body = ErrorResponse {
            error: ErrorDetail {
                code: code.to_string(),
                message: self.to_string(),
            },
        };

        (status, Json(body)).into_response()
    }
}

impl From<TournamentError> for ApiError {
    fn from(err: TournamentError) -> Self {
        match (&err, err.kind()) {
            (TournamentError::Storage(StorageError::UnknownPlayer(id)), _) => {
                ApiError::NotFound(format!("Player not found: {}", id))
            }
            (TournamentError::Incomplete { .. }, _)
            | (TournamentError::AlreadyRecorded, _)
            | (TournamentError::Storage(StorageError::DuplicateRecord(_)), _) => {
                ApiError::Unprocessable(err.to_string())
            }
            (_, ErrorKind::FixInput) => ApiError::BadRequest(err.to_string()),
            (_, ErrorKind::TryAgain) => ApiError::Unavailable(err.to_string()),
        }
    }
}

impl From<StorageError> for ApiError {
    fn from(err: StorageError) -> Self {
        TournamentError::from(err).into()
    }
}

fn cors_layer(origin: &str) -> CorsLayer {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    if origin == "*" {
        return layer.allow_origin(Any);
    }
    match origin.parse::<HeaderValue>() {
        Ok(value) => layer.allow_origin(value),
        Err(_) => {
            warn!("Ignoring invalid CORS origin {:?}, allowing any", origin);
            layer.allow_origin(Any)
        }
    }
}

/// Build the application router.
pub fn build_router(state: AppState) -> Router {
    let cors = cors_layer(&state.config.server.cors_origin);

    Router::new()
        .route("/api/tournaments", post(routes::tournaments::create_tournament))
        .route(
            "/api/tournaments/history",
            get(routes::tournaments::tournament_history),
        )
        .route("/api/tournaments/:id", get(routes::tournaments::get_tournament))
        .route(
            "/api/tournaments/:id/rounds/:round/matches/:match_index/score",
            put(routes::tournaments::set_score),
        )
        .route(
            "/api/tournaments/:id/finish",
            post(routes::tournaments::finish_tournament),
        )
        .route("/api/round-choices", get(routes::tournaments::round_choices))
        .route("/api/players", get(routes::players::list_standings))
        .route("/api/players/:id/rating", get(routes::players::player_rating))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
