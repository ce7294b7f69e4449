//! 1A2B game server library.
//!
//! # Architecture
//!
//! - **Sessions**: one game per id, per-session locking, TTL sweep
//! - **Records**: best attempts and best time over all wins, optionally
//!   persisted in SQLite
//! - **API**: axum router exposing the JSON contract
//! - **Config**: TOML file plus command-line overrides
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use std::time::Duration;
//! use bulls_cows_server::{AppState, RecordSource, RecordStore, SessionStore, router};
//!
//! let sessions = SessionStore::new(Duration::from_secs(3600));
//! let records = Arc::new(RecordStore::in_memory());
//! let app = router(AppState::new(sessions, records, RecordSource::Server));
//! # let _ = app;
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod api;
mod cli;
mod config;
mod db;
mod records;
mod session;

// Crate-level exports - API
pub use api::{
    ApiError, AppState, ErrorBody, GuessRequest, GuessResponse, NewGameResponse, RecordRequest,
    RecordResponse, router,
};

// Crate-level exports - CLI and configuration
pub use cli::Cli;
pub use config::{ConfigError, RecordSource, ServerConfig};

// Crate-level exports - Persistence
pub use db::{BestRecordRow, DbError, DbErrorKind, NewBestRecord, RecordRepository};

// Crate-level exports - Records
pub use records::{Record, RecordError, RecordStore};

// Crate-level exports - Session management
pub use session::{
    GuessOutcome, SessionError, SessionId, SessionSnapshot, SessionStore, spawn_sweeper,
};
