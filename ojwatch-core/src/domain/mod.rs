//! Core domain types
//!
//! These types mirror the entities exposed by the judge REST API and are
//! shared between the HTTP client, the submission watcher and the CLI.

pub mod language;
pub mod problem;
pub mod submission;
pub mod user;
