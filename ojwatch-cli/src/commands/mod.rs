//! Commands module
//!
//! Defines all CLI commands and their handlers.

mod auth;
mod language;
mod problem;
mod submission;

pub use auth::AuthCommands;
pub use language::LanguageCommands;
pub use problem::ProblemCommands;
pub use submission::{SubmissionCommands, WatchArgs};

use anyhow::Result;
use clap::Subcommand;
use std::path::PathBuf;

use crate::config::Config;

/// Top-level CLI commands
#[derive(Subcommand)]
pub enum Commands {
    // login, logout, whoami
    #[command(flatten)]
    Auth(AuthCommands),
    /// Problem browsing
    Problem {
        #[command(subcommand)]
        command: ProblemCommands,
    },
    /// Available languages
    Language {
        #[command(subcommand)]
        command: LanguageCommands,
    },
    /// Submit code and follow the judging
    Submit {
        /// Problem ID
        #[arg(short, long)]
        problem: i64,
        /// Language ID (see `ojwatch language list`)
        #[arg(short, long)]
        language: i64,
        /// Source file to submit
        file: PathBuf,
        /// Return right after submitting instead of waiting for the verdict
        #[arg(long)]
        no_watch: bool,
        #[command(flatten)]
        watch: WatchArgs,
    },
    /// Follow a submission until it is judged
    Watch {
        /// Submission ID
        id: i64,
        #[command(flatten)]
        watch: WatchArgs,
    },
    /// Show the current status of a submission
    Status {
        /// Submission ID
        id: i64,
    },
    /// Submission history
    Submission {
        #[command(subcommand)]
        command: SubmissionCommands,
    },
}

/// Handle a CLI command
///
/// Routes the command to the appropriate handler module.
pub async fn handle_command(command: Commands, config: &Config) -> Result<()> {
    match command {
        Commands::Auth(command) => auth::handle_auth_command(command, config).await,
        Commands::Problem { command } => problem::handle_problem_command(command, config).await,
        Commands::Language { command } => language::handle_language_command(command, config).await,
        Commands::Submit {
            problem,
            language,
            file,
            no_watch,
            watch,
        } => submission::submit(config, problem, language, &file, no_watch, &watch).await,
        Commands::Watch { id, watch } => submission::watch(config, id, &watch).await,
        Commands::Status { id } => submission::status(config, id).await,
        Commands::Submission { command } => {
            submission::handle_submission_command(command, config).await
        }
    }
}
