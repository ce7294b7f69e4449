//! Command-line interface for bulls_cows_server.

use std::path::PathBuf;

use clap::Parser;

use crate::config::{RecordSource, ServerConfig};

/// 1A2B game server - guess four distinct digits in ten tries
#[derive(Parser, Debug)]
#[command(name = "bulls_cows_server")]
#[command(about = "REST server for the 1A2B number-guessing game", long_about = None)]
#[command(version)]
pub struct Cli {
    /// TOML configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Host to bind to
    #[arg(long)]
    pub host: Option<String>,

    /// Port to bind to
    #[arg(short, long)]
    pub port: Option<u16>,

    /// SQLite file for persistent records (created if it doesn't exist)
    #[arg(long)]
    pub database: Option<String>,

    /// Who supplies record values: server or client
    #[arg(long)]
    pub record_source: Option<RecordSource>,
}

impl Cli {
    /// Applies flags given on the command line on top of `config`.
    pub fn apply(&self, mut config: ServerConfig) -> ServerConfig {
        if let Some(host) = &self.host {
            config = config.with_host(host.clone());
        }
        if let Some(port) = self.port {
            config = config.with_port(port);
        }
        if let Some(database) = &self.database {
            config = config.with_database_path(database.clone());
        }
        if let Some(source) = self.record_source {
            config = config.with_record_source(source);
        }
        config
    }
}
