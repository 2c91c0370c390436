//! OJWatch CLI
//!
//! Command-line client for the online judge: browse problems, submit code
//! and follow the judging until a verdict arrives.

mod commands;
mod config;
mod output;

use anyhow::Result;
use clap::Parser;
use commands::{Commands, handle_command};
use config::{Config, default_session_file};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "ojwatch")]
#[command(about = "Online judge client with live verdict watching", long_about = None)]
struct Cli {
    /// Judge API base URL
    #[arg(long, env = "OJWATCH_API_URL", default_value = "http://localhost:8080/api")]
    api_url: String,

    /// Token to authenticate with, overriding the stored session
    #[arg(long, env = "OJWATCH_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// Where the login session is stored
    #[arg(long, env = "OJWATCH_SESSION_FILE")]
    session_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr so they never mix with command output
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ojwatch_cli=warn,ojwatch_watcher=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let config = Config {
        api_url: cli.api_url,
        token: cli.token,
        session_file: cli.session_file.unwrap_or_else(default_session_file),
    };

    handle_command(cli.command, &config).await
}
