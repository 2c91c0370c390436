//! Submission domain types

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Identifier the judge assigns to a submission
pub type SubmissionId = i64;

/// Judging outcome of a submission
///
/// `Pending` and `Judging` are the only non-terminal verdicts. Once a
/// submission reports any other verdict its status never changes again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Verdict {
    Pending,
    Judging,
    Accepted,
    #[serde(rename = "Wrong Answer")]
    WrongAnswer,
    #[serde(rename = "Time Limit Exceeded")]
    TimeLimitExceeded,
    #[serde(rename = "Memory Limit Exceeded")]
    MemoryLimitExceeded,
    #[serde(rename = "Runtime Error")]
    RuntimeError,
    #[serde(rename = "Compile Error")]
    CompileError,
    #[serde(rename = "System Error")]
    SystemError,
}

impl Verdict {
    /// Every verdict, non-terminal ones first
    pub const ALL: [Verdict; 9] = [
        Verdict::Pending,
        Verdict::Judging,
        Verdict::Accepted,
        Verdict::WrongAnswer,
        Verdict::TimeLimitExceeded,
        Verdict::MemoryLimitExceeded,
        Verdict::RuntimeError,
        Verdict::CompileError,
        Verdict::SystemError,
    ];

    /// Verdicts after which polling stops
    pub const TERMINAL: [Verdict; 7] = [
        Verdict::Accepted,
        Verdict::WrongAnswer,
        Verdict::TimeLimitExceeded,
        Verdict::MemoryLimitExceeded,
        Verdict::RuntimeError,
        Verdict::CompileError,
        Verdict::SystemError,
    ];

    /// Whether judging has finished
    pub fn is_terminal(self) -> bool {
        !matches!(self, Verdict::Pending | Verdict::Judging)
    }

    /// Whether the submission passed every test
    pub fn is_accepted(self) -> bool {
        self == Verdict::Accepted
    }

    /// Status string as the judge API spells it
    pub fn as_str(self) -> &'static str {
        match self {
            Verdict::Pending => "Pending",
            Verdict::Judging => "Judging",
            Verdict::Accepted => "Accepted",
            Verdict::WrongAnswer => "Wrong Answer",
            Verdict::TimeLimitExceeded => "Time Limit Exceeded",
            Verdict::MemoryLimitExceeded => "Memory Limit Exceeded",
            Verdict::RuntimeError => "Runtime Error",
            Verdict::CompileError => "Compile Error",
            Verdict::SystemError => "System Error",
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a status string is not one of the nine known verdicts
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown verdict: {0:?}")]
pub struct UnknownVerdict(pub String);

impl FromStr for Verdict {
    type Err = UnknownVerdict;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Verdict::ALL
            .into_iter()
            .find(|v| v.as_str() == s)
            .ok_or_else(|| UnknownVerdict(s.to_string()))
    }
}

/// Submission detail record
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Submission {
    pub id: SubmissionId,
    pub problem_id: i64,
    pub problem_title: Option<String>,
    pub user_id: Option<i64>,
    pub username: Option<String>,
    pub language: Option<String>,
    pub code: Option<String>,
    pub status: Verdict,
    /// Peak running time in milliseconds
    pub time: Option<u64>,
    /// Peak memory in kilobytes
    pub memory: Option<u64>,
    /// Compiler output or checker message
    pub judge_info: Option<String>,
    pub create_time: Option<String>,
}

/// Live progress of one watched submission
///
/// `status` stays `None` until the first poll answers. `attempts` counts
/// answered polls and only ever grows within one watch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubmissionHandle {
    pub submission_id: SubmissionId,
    pub status: Option<Verdict>,
    pub attempts: u32,
}

impl SubmissionHandle {
    /// A handle for a watch that has not polled yet
    pub fn new(submission_id: SubmissionId) -> Self {
        Self {
            submission_id,
            status: None,
            attempts: 0,
        }
    }

    /// Whether the last observed verdict is terminal
    pub fn is_terminal(&self) -> bool {
        self.status.is_some_and(Verdict::is_terminal)
    }
}
