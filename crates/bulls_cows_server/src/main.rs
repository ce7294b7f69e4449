//! 1A2B game server (HTTP transport)

use std::sync::Arc;

use anyhow::Result;
use bulls_cows_server::{
    AppState, Cli, RecordRepository, RecordStore, ServerConfig, SessionStore, router,
    spawn_sweeper,
};
use clap::Parser;
use tracing::{info, instrument};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => ServerConfig::from_file(path)?,
        None => ServerConfig::default(),
    };
    let config = cli.apply(config);
    config.validate()?;

    run(config).await
}

/// Builds the stores, serves until Ctrl-C, then stops the sweeper.
#[instrument(skip_all, fields(host = %config.host(), port = config.port()))]
async fn run(config: ServerConfig) -> Result<()> {
    let records = match config.database_path() {
        Some(path) => {
            let repository = RecordRepository::open(path.clone())?;
            RecordStore::persistent(repository)?
        }
        None => RecordStore::in_memory(),
    };
    let records = Arc::new(records);
    let sessions = SessionStore::new(config.session_ttl());
    let sweeper = spawn_sweeper(sessions.clone(), config.sweep_interval());

    let state = AppState::new(sessions, Arc::clone(&records), *config.record_source());
    let app = router(state);

    let listener = tokio::net::TcpListener::bind((config.host().as_str(), *config.port())).await?;
    info!(
        record_source = %config.record_source(),
        "Server ready at http://{}:{}/",
        config.host(),
        config.port()
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    sweeper.abort();
    let best = records.best();
    info!(
        best_attempts = ?best.best_attempts(),
        best_time = ?best.best_time(),
        "Server stopped"
    );
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
