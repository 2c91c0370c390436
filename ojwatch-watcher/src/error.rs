//! Error types for submission watching

use ojwatch_client::ClientError;
use thiserror::Error;

/// Result type alias for watch operations
pub type Result<T> = std::result::Result<T, WatchError>;

/// Ways a watch can end without a terminal verdict
#[derive(Debug, Error)]
pub enum WatchError {
    /// Fetching the status failed; not retried
    #[error("Failed to fetch submission status: {0}")]
    Transport(#[from] ClientError),

    /// The attempt budget ran out while the submission was still being judged
    #[error("Submission still judging after {attempts} poll(s)")]
    PollTimeout {
        /// Number of polls that were answered
        attempts: u32,
    },

    /// The watch was cancelled, replaced or torn down
    #[error("Watch cancelled")]
    Cancelled,

    /// Interval or attempt budget out of range
    #[error("Invalid watch configuration: {0}")]
    InvalidConfig(String),
}

impl WatchError {
    /// Check if the judge simply has not finished yet
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::PollTimeout { .. })
    }

    /// Check if the caller stopped watching
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }

    /// Text suitable for showing to the person waiting on the verdict
    pub fn user_message(&self) -> String {
        match self {
            Self::PollTimeout { .. } => "Still judging, please check back later".to_string(),
            Self::Transport(e) if e.is_auth_error() => {
                "Your session has expired, please log in again".to_string()
            }
            Self::Transport(_) => "Failed to fetch the judging result, please retry".to_string(),
            Self::Cancelled => "Stopped watching".to_string(),
            Self::InvalidConfig(msg) => msg.clone(),
        }
    }
}
