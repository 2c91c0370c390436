//! Scheduler layer for the watcher
//!
//! Keeps the table of live watch sessions and runs one poll loop per
//! watched submission. At most one session exists per submission id; the
//! loops never overlap for the same id.

mod session;
pub mod watcher;

pub use watcher::{SubmissionWatcher, Watch};
