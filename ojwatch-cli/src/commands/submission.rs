//! Submission command handlers
//!
//! Submitting, watching and listing submissions. Watching drives a
//! `SubmissionWatcher` and redraws progress after every poll.

use anyhow::{Context, Result, anyhow};
use clap::{Args, Subcommand};
use colored::*;
use ojwatch_client::JudgeClient;
use ojwatch_core::domain::submission::{SubmissionId, Verdict};
use ojwatch_core::dto::page::PageQuery;
use ojwatch_core::dto::submission::{SubmissionQuery, SubmitCode};
use ojwatch_watcher::{SubmissionWatcher, Watch, WatchConfig, WatchError};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use crate::config::Config;
use crate::output::{print_submission_details, print_submission_summary, progress_line};

/// Polling overrides for `submit` and `watch`
#[derive(Args, Debug, Clone, Default)]
pub struct WatchArgs {
    /// Delay between polls in milliseconds
    #[arg(long, env = "OJWATCH_POLL_INTERVAL_MS")]
    pub interval_ms: Option<u64>,
    /// Give up after this many polls
    #[arg(long, env = "OJWATCH_MAX_ATTEMPTS")]
    pub max_attempts: Option<u32>,
}

impl WatchArgs {
    /// Default configuration with the given overrides applied
    pub fn to_config(&self) -> Result<WatchConfig> {
        let mut config = WatchConfig::default();
        if let Some(ms) = self.interval_ms {
            config = config.with_interval(Duration::from_millis(ms))?;
        }
        if let Some(max_attempts) = self.max_attempts {
            config = config.with_max_attempts(max_attempts)?;
        }
        Ok(config)
    }
}

/// Submission subcommands
#[derive(Subcommand)]
pub enum SubmissionCommands {
    /// List submissions
    List {
        /// Page number (1-based)
        #[arg(long, default_value_t = 1)]
        page: u32,
        /// Page size
        #[arg(long, default_value_t = 20)]
        size: u32,
        /// Only submissions for this problem
        #[arg(long)]
        problem: Option<i64>,
        /// Only submissions by this user
        #[arg(long)]
        user: Option<i64>,
    },
}

/// Handle submission history commands
pub async fn handle_submission_command(command: SubmissionCommands, config: &Config) -> Result<()> {
    let client = config.client()?;

    match command {
        SubmissionCommands::List {
            page,
            size,
            problem,
            user,
        } => {
            let query = SubmissionQuery {
                page: PageQuery {
                    page_no: page,
                    page_size: size,
                },
                problem_id: problem,
                user_id: user,
            };
            let submissions = client.list_submissions(&query).await?;

            if submissions.is_empty() {
                println!("{}", "No submissions found.".yellow());
                return Ok(());
            }

            println!(
                "{}",
                format!(
                    "Page {} of {} ({} submission(s) total):",
                    page, submissions.pages, submissions.total
                )
                .bold()
            );
            for submission in &submissions.list {
                print_submission_summary(submission);
            }
            Ok(())
        }
    }
}

/// Submit a source file, then follow it unless told not to
pub async fn submit(
    config: &Config,
    problem_id: i64,
    language_id: i64,
    file: &Path,
    no_watch: bool,
    watch_args: &WatchArgs,
) -> Result<()> {
    // Validate before submitting so a bad flag does not leave an orphan submission
    let watch_config = watch_args.to_config()?;

    let code = std::fs::read_to_string(file)
        .with_context(|| format!("Failed to read {}", file.display()))?;
    if code.trim().is_empty() {
        return Err(anyhow!("{} is empty", file.display()));
    }

    let client = config.client()?;
    let id = client
        .submit_code(&SubmitCode {
            problem_id,
            language_id,
            code,
        })
        .await
        .context("Failed to submit code")?;

    println!("{} Submitted as {}", "✓".green(), id.to_string().cyan());

    if no_watch {
        println!(
            "  Follow it with: {}",
            format!("ojwatch watch {}", id).dimmed()
        );
        return Ok(());
    }

    follow(client, id, watch_config).await
}

/// Follow an existing submission
pub async fn watch(config: &Config, id: SubmissionId, watch_args: &WatchArgs) -> Result<()> {
    let watch_config = watch_args.to_config()?;
    follow(config.client()?, id, watch_config).await
}

/// Show the current status once
pub async fn status(config: &Config, id: SubmissionId) -> Result<()> {
    let submission = config.client()?.get_submission(id).await?;
    print_submission_details(&submission);
    Ok(())
}

/// How following a watch ended
enum Followed {
    Settled(ojwatch_watcher::Result<Verdict>),
    Interrupted,
}

/// Print progress until the watch settles or `interrupt` completes
///
/// An interrupt cancels the watch. `interrupt` is created once by the caller
/// so a signal arriving between two progress updates is not lost.
async fn wait_for_outcome<F>(
    watcher: &SubmissionWatcher,
    watch: Watch,
    max_attempts: u32,
    interrupt: F,
) -> Followed
where
    F: Future<Output = ()>,
{
    let id = watch.submission_id();
    let mut progress = watch.subscribe();
    let outcome = watch.outcome();
    tokio::pin!(outcome, interrupt);

    loop {
        tokio::select! {
            result = &mut outcome => return Followed::Settled(result),
            Ok(()) = progress.changed() => {
                let handle = *progress.borrow_and_update();
                println!("{}", progress_line(&handle, max_attempts));
            }
            () = &mut interrupt => {
                watcher.cancel_watch(id);
                return Followed::Interrupted;
            }
        }
    }
}

async fn ctrl_c() {
    if tokio::signal::ctrl_c().await.is_err() {
        // No signal handler; run until the watch settles.
        std::future::pending::<()>().await;
    }
}

/// Watch a submission until it settles, printing progress
///
/// Ctrl-C cancels the watch; the submission itself keeps being judged.
async fn follow(client: JudgeClient, id: SubmissionId, watch_config: WatchConfig) -> Result<()> {
    let watcher = SubmissionWatcher::new(Arc::new(client.clone()));
    let watch = watcher.start_watch(id, watch_config);

    let followed = wait_for_outcome(&watcher, watch, watch_config.max_attempts(), ctrl_c()).await;
    let result = match followed {
        Followed::Settled(result) => result,
        Followed::Interrupted => {
            println!(
                "{} Stopped watching. Resume with: {}",
                "⚠".yellow(),
                format!("ojwatch watch {}", id).dimmed()
            );
            return Ok(());
        }
    };

    match result {
        Ok(_) => {
            println!();
            let submission = client
                .get_submission(id)
                .await
                .context("Failed to fetch final submission details")?;
            print_submission_details(&submission);
            Ok(())
        }
        Err(e @ WatchError::PollTimeout { .. }) => {
            println!("{} {}", "⏳".yellow(), e.user_message().yellow());
            println!(
                "  Check again with: {}",
                format!("ojwatch status {}", id).dimmed()
            );
            Ok(())
        }
        Err(e) => {
            println!("{} {}", "✗".red(), e.user_message().red());
            Err(e).with_context(|| format!("Watching submission {} failed", id))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use ojwatch_client::ClientError;
    use ojwatch_watcher::StatusSource;

    #[test]
    fn test_watch_args_default_to_watch_config() {
        let config = WatchArgs::default().to_config().unwrap();
        assert_eq!(config, WatchConfig::default());
    }

    #[test]
    fn test_watch_args_overrides() {
        let args = WatchArgs {
            interval_ms: Some(500),
            max_attempts: Some(4),
        };
        let config = args.to_config().unwrap();
        assert_eq!(config.interval(), Duration::from_millis(500));
        assert_eq!(config.max_attempts(), 4);
    }

    /// Every submission stays in judging
    struct StillJudging;

    #[async_trait]
    impl StatusSource for StillJudging {
        async fn fetch_status(&self, _id: SubmissionId) -> std::result::Result<Verdict, ClientError> {
            Ok(Verdict::Judging)
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_interrupt_survives_progress_updates() {
        let watcher = SubmissionWatcher::new(Arc::new(StillJudging));
        let config = WatchConfig::new(Duration::from_millis(10), 60).unwrap();
        let watch = watcher.start_watch(12, config);

        // Several progress lines are printed before the interrupt fires.
        let interrupt = tokio::time::sleep(Duration::from_millis(35));
        let followed = wait_for_outcome(&watcher, watch, config.max_attempts(), interrupt).await;

        assert!(matches!(followed, Followed::Interrupted));
        assert!(!watcher.is_watching(12));
    }

    #[tokio::test(start_paused = true)]
    async fn test_settled_watch_is_reported() {
        let watcher = SubmissionWatcher::new(Arc::new(StillJudging));
        let config = WatchConfig::new(Duration::from_millis(10), 2).unwrap();
        let watch = watcher.start_watch(13, config);

        let followed =
            wait_for_outcome(&watcher, watch, config.max_attempts(), std::future::pending()).await;

        assert!(matches!(
            followed,
            Followed::Settled(Err(WatchError::PollTimeout { attempts: 2 }))
        ));
    }

    #[test]
    fn test_watch_args_reject_zero() {
        let args = WatchArgs {
            interval_ms: Some(0),
            max_attempts: None,
        };
        assert!(args.to_config().is_err());
    }
}
