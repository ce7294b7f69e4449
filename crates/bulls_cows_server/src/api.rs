//! REST API: routes, request/response bodies and error mapping.
//!
//! | Route | Method | Body | Reply |
//! |---|---|---|---|
//! | `/api/game/new` | POST | none | `{game_id}` |
//! | `/api/game/guess` | POST | `{game_id, guess}` | `{result: {A, B}, attempts, is_correct, state}` |
//! | `/api/records` | GET | none | `{best_attempts, best_time}` |
//! | `/api/records` | POST | `{attempts, time}` | `{updated}` |
//! | `/health` | GET | none | `{status: "ok"}` |
//!
//! Errors reply `{detail}` with 400, 404, 409 or 500.

use std::sync::Arc;

use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use bulls_cows::{GameState, MAX_ATTEMPTS, Score};
use serde::{Deserialize, Serialize};
use tracing::{error, info, instrument, warn};

use crate::config::RecordSource;
use crate::records::{Record, RecordError, RecordStore};
use crate::session::{SessionError, SessionStore};

/// Shared state handed to every handler.
#[derive(Debug, Clone)]
pub struct AppState {
    sessions: SessionStore,
    records: Arc<RecordStore>,
    record_source: RecordSource,
}

impl AppState {
    /// Bundles the stores for the router.
    #[instrument(skip(sessions, records))]
    pub fn new(sessions: SessionStore, records: Arc<RecordStore>, record_source: RecordSource) -> Self {
        Self {
            sessions,
            records,
            record_source,
        }
    }

    /// Session store.
    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    /// Record store.
    pub fn records(&self) -> &Arc<RecordStore> {
        &self.records
    }
}

/// Builds the API router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/game/new", post(new_game))
        .route("/api/game/guess", post(submit_guess))
        .route("/api/records", get(get_records).post(report_record))
        .route("/health", get(health))
        .with_state(state)
}

/// Reply to `POST /api/game/new`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewGameResponse {
    /// Id of the new game.
    pub game_id: String,
}

/// Body of `POST /api/game/guess`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GuessRequest {
    /// Game to guess in.
    pub game_id: String,
    /// Four distinct digits, e.g. `"0123"`.
    pub guess: String,
}

/// Reply to `POST /api/game/guess`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GuessResponse {
    /// A/B score.
    pub result: Score,
    /// Attempts used, including this guess.
    pub attempts: u32,
    /// True if the guess matched the secret.
    pub is_correct: bool,
    /// Game state after this guess.
    pub state: GameState,
}

/// Body of `POST /api/records`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordRequest {
    /// Attempts the win took.
    pub attempts: u32,
    /// Seconds the win took.
    pub time: u64,
}

impl RecordRequest {
    /// Rejects values no won game can produce.
    fn validate(&self) -> Result<(), ApiError> {
        if !(1..=MAX_ATTEMPTS).contains(&self.attempts) {
            return Err(ApiError::BadRequest(format!(
                "attempts must be between 1 and {}, got {}",
                MAX_ATTEMPTS, self.attempts
            )));
        }
        if i64::try_from(self.time).is_err() {
            return Err(ApiError::BadRequest(format!(
                "time {} is out of range",
                self.time
            )));
        }
        Ok(())
    }
}

/// Reply to `POST /api/records`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordResponse {
    /// True if a best value improved.
    pub updated: bool,
}

/// Error body shared by every failing route.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Human-readable reason.
    pub detail: String,
}

/// Failure of an API call, mapped onto an HTTP status.
#[derive(Debug, Clone, derive_more::Display)]
pub enum ApiError {
    /// Malformed request or guess. 400.
    #[display("{}", _0)]
    BadRequest(String),
    /// Unknown game id. 404.
    #[display("{}", _0)]
    NotFound(String),
    /// Game already over. 409.
    #[display("{}", _0)]
    Conflict(String),
    /// Storage or runtime failure. 500.
    #[display("{}", _0)]
    Internal(String),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = ErrorBody {
            detail: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

impl From<SessionError> for ApiError {
    fn from(err: SessionError) -> Self {
        match err {
            SessionError::NotFound(_) => Self::NotFound(err.to_string()),
            SessionError::InvalidState { .. } => Self::Conflict(err.to_string()),
            SessionError::Validation(_) => Self::BadRequest(err.to_string()),
        }
    }
}

impl From<RecordError> for ApiError {
    fn from(err: RecordError) -> Self {
        error!(error = %err, "Record store failure");
        Self::Internal("Record storage unavailable".to_string())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

/// Runs a record-store call off the async workers; it may touch SQLite.
async fn with_records<T, F>(records: &Arc<RecordStore>, f: F) -> Result<T, ApiError>
where
    T: Send + 'static,
    F: FnOnce(&RecordStore) -> Result<T, RecordError> + Send + 'static,
{
    let records = Arc::clone(records);
    tokio::task::spawn_blocking(move || f(&records))
        .await
        .map_err(|e| {
            error!(error = %e, "Record task failed");
            ApiError::Internal("Record storage unavailable".to_string())
        })?
        .map_err(ApiError::from)
}

#[instrument(skip(state))]
async fn new_game(State(state): State<AppState>) -> Json<NewGameResponse> {
    let game_id = state.sessions.create_session();
    Json(NewGameResponse { game_id })
}

#[instrument(skip_all)]
async fn submit_guess(
    State(state): State<AppState>,
    payload: Result<Json<GuessRequest>, JsonRejection>,
) -> Result<Json<GuessResponse>, ApiError> {
    let Json(req) = payload?;
    let outcome = state.sessions.submit_guess(&req.game_id, &req.guess)?;

    let server_timed_win = match state.record_source {
        RecordSource::Server => *outcome.elapsed_seconds(),
        RecordSource::Client => None,
    };
    if let Some(elapsed) = server_timed_win {
        let attempts = *outcome.attempts();
        // The guess is already applied; a storage failure must not hide it.
        match with_records(&state.records, move |r| r.report_win(attempts, elapsed)).await {
            Ok(updated) => info!(game_id = %req.game_id, attempts, elapsed, updated, "Win recorded"),
            Err(e) => warn!(game_id = %req.game_id, error = %e, "Failed to record win"),
        }
    }

    Ok(Json(GuessResponse {
        result: *outcome.score(),
        attempts: *outcome.attempts(),
        is_correct: *outcome.is_correct(),
        state: *outcome.state(),
    }))
}

#[instrument(skip(state))]
async fn get_records(State(state): State<AppState>) -> Result<Json<Record>, ApiError> {
    // A concurrent report holds the record lock across its SQLite write.
    let best = with_records(&state.records, |r| Ok(r.best())).await?;
    Ok(Json(best))
}

#[instrument(skip_all)]
async fn report_record(
    State(state): State<AppState>,
    payload: Result<Json<RecordRequest>, JsonRejection>,
) -> Result<Json<RecordResponse>, ApiError> {
    let Json(req) = payload?;
    req.validate()?;
    let updated = match state.record_source {
        RecordSource::Client => {
            with_records(&state.records, move |r| r.report_win(req.attempts, req.time)).await?
        }
        RecordSource::Server => {
            info!(attempts = req.attempts, time = req.time, "Ignoring client record report");
            false
        }
    };
    Ok(Json(RecordResponse { updated }))
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({"status": "ok"}))
}
