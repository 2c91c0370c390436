//! Status source
//!
//! The single collaborator the watcher depends on: something that can tell
//! the current verdict of a submission. It is trait-based so the scheduler
//! can be driven by scripted sources in tests.

use async_trait::async_trait;
use ojwatch_client::{ClientError, JudgeClient};
use ojwatch_core::domain::submission::{SubmissionId, Verdict};

/// Source of submission verdicts
#[async_trait]
pub trait StatusSource: Send + Sync {
    /// Fetches the current verdict of a submission
    ///
    /// # Errors
    /// Any transport, HTTP or decode failure. The watcher never retries these.
    async fn fetch_status(&self, submission_id: SubmissionId) -> Result<Verdict, ClientError>;
}

#[async_trait]
impl StatusSource for JudgeClient {
    async fn fetch_status(&self, submission_id: SubmissionId) -> Result<Verdict, ClientError> {
        let submission = self.get_submission(submission_id).await?;
        Ok(submission.status)
    }
}
