//! Tests for the REST API, driven through the router in process.

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use bulls_cows::Secret;
use bulls_cows_server::{
    AppState, Record, RecordRepository, RecordSource, RecordStore, SessionStore, router,
};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tempfile::TempDir;
use tower::ServiceExt;

/// Router whose games all have the secret 1234.
fn test_app(record_source: RecordSource) -> (Router, Arc<RecordStore>) {
    let sessions = SessionStore::with_secrets(Duration::from_secs(3600), || {
        "1234".parse::<Secret>().expect("valid secret")
    });
    let records = Arc::new(RecordStore::in_memory());
    let state = AppState::new(sessions, Arc::clone(&records), record_source);
    (router(state), records)
}

/// Router backed by a SQLite file whose directory has been removed, so every
/// record write fails.
fn broken_storage_app(record_source: RecordSource) -> (Router, Arc<RecordStore>) {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let db_path = dir.path().join("records.db");
    let repo = RecordRepository::open(db_path.to_str().expect("Invalid path").to_string())
        .expect("Failed to open repository");
    let records = Arc::new(RecordStore::persistent(repo).expect("open store"));
    drop(dir);

    let sessions = SessionStore::with_secrets(Duration::from_secs(3600), || {
        "1234".parse::<Secret>().expect("valid secret")
    });
    let state = AppState::new(sessions, Arc::clone(&records), record_source);
    (router(state), records)
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string())),
        None => builder.body(Body::empty()),
    }
    .expect("Failed to build request");

    let response = app
        .clone()
        .oneshot(request)
        .await
        .expect("Request failed");
    let status = response.status();
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("Failed to read body")
        .to_bytes();
    let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, json)
}

async fn new_game(app: &Router) -> String {
    let (status, body) = send(app, "POST", "/api/game/new", None).await;
    assert_eq!(status, StatusCode::OK);
    body["game_id"].as_str().expect("game_id missing").to_string()
}

async fn guess(app: &Router, game_id: &str, guess: &str) -> (StatusCode, Value) {
    send(
        app,
        "POST",
        "/api/game/guess",
        Some(json!({"game_id": game_id, "guess": guess})),
    )
    .await
}

#[tokio::test]
async fn test_health() {
    let (app, _) = test_app(RecordSource::Server);
    let (status, body) = send(&app, "GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"status": "ok"}));
}

#[tokio::test]
async fn test_guess_response_shape() {
    let (app, _) = test_app(RecordSource::Server);
    let game_id = new_game(&app).await;

    let (status, body) = guess(&app, &game_id, "1243").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({
            "result": {"A": 2, "B": 2},
            "attempts": 1,
            "is_correct": false,
            "state": "active"
        })
    );
}

#[tokio::test]
async fn test_winning_guess() {
    let (app, _) = test_app(RecordSource::Server);
    let game_id = new_game(&app).await;

    let (status, body) = guess(&app, &game_id, "1234").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["result"], json!({"A": 4, "B": 0}));
    assert_eq!(body["is_correct"], json!(true));
    assert_eq!(body["state"], json!("won"));

    let (status, body) = guess(&app, &game_id, "5678").await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body["detail"].as_str().is_some());
}

#[tokio::test]
async fn test_duplicate_digits_rejected_without_using_an_attempt() {
    let (app, _) = test_app(RecordSource::Server);
    let game_id = new_game(&app).await;

    let (status, body) = guess(&app, &game_id, "1123").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["detail"].as_str().expect("detail").contains("repeat"));

    let (_, body) = guess(&app, &game_id, "5678").await;
    assert_eq!(body["attempts"], json!(1));
}

#[tokio::test]
async fn test_unknown_game_is_404() {
    let (app, _) = test_app(RecordSource::Server);
    let (status, body) = guess(&app, "missing1", "1234").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["detail"].as_str().is_some());
}

#[tokio::test]
async fn test_malformed_body_is_400_with_detail() {
    let (app, _) = test_app(RecordSource::Server);
    let (status, body) = send(
        &app,
        "POST",
        "/api/game/guess",
        Some(json!({"game_id": "abc"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["detail"].as_str().is_some());

    let (status, _) = send(&app, "POST", "/api/game/guess", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_ten_misses_lose() {
    let (app, _) = test_app(RecordSource::Server);
    let game_id = new_game(&app).await;

    for _ in 0..9 {
        let (status, _) = guess(&app, &game_id, "5678").await;
        assert_eq!(status, StatusCode::OK);
    }
    let (status, body) = guess(&app, &game_id, "5678").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["attempts"], json!(10));
    assert_eq!(body["state"], json!("lost"));

    let (status, _) = guess(&app, &game_id, "1234").await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_records_start_empty() {
    let (app, _) = test_app(RecordSource::Server);
    let (status, body) = send(&app, "GET", "/api/records", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"best_attempts": null, "best_time": null}));
}

#[tokio::test]
async fn test_server_mode_records_wins_and_ignores_client_reports() {
    let (app, records) = test_app(RecordSource::Server);
    let game_id = new_game(&app).await;
    guess(&app, &game_id, "5678").await;
    guess(&app, &game_id, "4321").await;
    guess(&app, &game_id, "1234").await;

    let (_, body) = send(&app, "GET", "/api/records", None).await;
    assert_eq!(body, json!({"best_attempts": 3, "best_time": 0}));

    let (status, body) = send(
        &app,
        "POST",
        "/api/records",
        Some(json!({"attempts": 1, "time": 0})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"updated": false}));
    assert_eq!(records.best().best_attempts(), Some(3));
}

#[tokio::test]
async fn test_client_mode_applies_reports() {
    let (app, _) = test_app(RecordSource::Client);

    // Wins are not recorded automatically in client mode.
    let game_id = new_game(&app).await;
    guess(&app, &game_id, "1234").await;
    let (_, body) = send(&app, "GET", "/api/records", None).await;
    assert_eq!(body, json!({"best_attempts": null, "best_time": null}));

    let (_, body) = send(
        &app,
        "POST",
        "/api/records",
        Some(json!({"attempts": 5, "time": 30})),
    )
    .await;
    assert_eq!(body, json!({"updated": true}));
    let (_, body) = send(
        &app,
        "POST",
        "/api/records",
        Some(json!({"attempts": 3, "time": 50})),
    )
    .await;
    assert_eq!(body, json!({"updated": true}));
    let (_, body) = send(
        &app,
        "POST",
        "/api/records",
        Some(json!({"attempts": 4, "time": 40})),
    )
    .await;
    assert_eq!(body, json!({"updated": false}));

    let (_, body) = send(&app, "GET", "/api/records", None).await;
    assert_eq!(body, json!({"best_attempts": 3, "best_time": 30}));
}

#[tokio::test]
async fn test_negative_record_time_is_400() {
    let (app, _) = test_app(RecordSource::Client);
    let (status, body) = send(
        &app,
        "POST",
        "/api/records",
        Some(json!({"attempts": 3, "time": -5})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["detail"].as_str().is_some());
}

#[tokio::test]
async fn test_record_attempts_out_of_range_is_400() {
    let (app, records) = test_app(RecordSource::Client);
    for attempts in [0, 11, 1000] {
        let (status, body) = send(
            &app,
            "POST",
            "/api/records",
            Some(json!({"attempts": attempts, "time": 5})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "attempts {attempts}");
        assert!(body["detail"].as_str().expect("detail").contains("attempts"));
    }
    assert_eq!(records.best(), Record::default());
}

#[tokio::test]
async fn test_record_time_beyond_storage_range_is_400() {
    let (app, records) = test_app(RecordSource::Client);
    let (status, body) = send(
        &app,
        "POST",
        "/api/records",
        Some(json!({"attempts": 3, "time": u64::MAX})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["detail"].as_str().expect("detail").contains("time"));
    assert_eq!(records.best(), Record::default());
}

#[tokio::test]
async fn test_record_time_beyond_storage_range_is_400_with_sqlite() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let db_path = dir.path().join("records.db");
    let repo = RecordRepository::open(db_path.to_str().expect("Invalid path").to_string())
        .expect("Failed to open repository");
    let records = Arc::new(RecordStore::persistent(repo).expect("open store"));
    let sessions = SessionStore::new(Duration::from_secs(3600));
    let app = router(AppState::new(sessions, Arc::clone(&records), RecordSource::Client));

    let (status, _) = send(
        &app,
        "POST",
        "/api/records",
        Some(json!({"attempts": 3, "time": u64::MAX})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(
        &app,
        "POST",
        "/api/records",
        Some(json!({"attempts": 3, "time": 12})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"updated": true}));
}

#[tokio::test]
async fn test_winning_guess_succeeds_when_record_storage_fails() {
    let (app, records) = broken_storage_app(RecordSource::Server);
    let game_id = new_game(&app).await;

    let (status, body) = guess(&app, &game_id, "1234").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["is_correct"], json!(true));
    assert_eq!(body["state"], json!("won"));

    assert_eq!(records.best(), Record::default());
    let (status, body) = send(&app, "GET", "/api/records", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"best_attempts": null, "best_time": null}));
}

#[tokio::test]
async fn test_storage_failure_detail_hides_internals() {
    let (app, _) = broken_storage_app(RecordSource::Client);
    let (status, body) = send(
        &app,
        "POST",
        "/api/records",
        Some(json!({"attempts": 3, "time": 12})),
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({"detail": "Record storage unavailable"}));
}
