//! OJWatch Submission Watcher
//!
//! Polls the judge for the verdict of submitted code until judging finishes.
//!
//! Architecture:
//! - Source: The `StatusSource` seam the watcher polls (the HTTP client in
//!   production, scripted fakes in tests)
//! - Config: Poll interval and attempt budget
//! - Scheduler: The session table and the per-submission poll loops
//!
//! A watch polls immediately, then once per interval, and settles exactly
//! once: with a terminal verdict, a `PollTimeout`, a transport error, or
//! `Cancelled` when the caller stops watching.
//!
//! ```no_run
//! use std::sync::Arc;
//! use ojwatch_client::JudgeClient;
//! use ojwatch_watcher::{SubmissionWatcher, WatchConfig};
//!
//! # async fn example() -> Result<(), ojwatch_watcher::WatchError> {
//! let client = JudgeClient::new("http://localhost:8080/api");
//! let watcher = SubmissionWatcher::new(Arc::new(client));
//!
//! let verdict = watcher.start_watch(42, WatchConfig::default()).outcome().await?;
//! println!("Submission 42: {}", verdict);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod scheduler;
pub mod source;

pub use config::WatchConfig;
pub use error::{Result, WatchError};
pub use scheduler::{SubmissionWatcher, Watch};
pub use source::StatusSource;
