//! Submission endpoints

use crate::JudgeClient;
use crate::error::Result;
use ojwatch_core::domain::submission::{Submission, SubmissionId};
use ojwatch_core::dto::page::Page;
use ojwatch_core::dto::submission::{SubmissionQuery, SubmitCode};
use reqwest::Method;
use tracing::info;

impl JudgeClient {
    /// Submit code for judging
    ///
    /// Judging is asynchronous: the call returns as soon as the submission is
    /// queued. Poll [`JudgeClient::get_submission`] (or use a watcher) for
    /// the verdict.
    ///
    /// # Returns
    /// The ID of the new submission
    ///
    /// # Example
    /// ```no_run
    /// # use ojwatch_client::JudgeClient;
    /// # use ojwatch_core::dto::submission::SubmitCode;
    /// # async fn example() -> anyhow::Result<()> {
    /// let client = JudgeClient::new("http://localhost:8080/api").with_token("...");
    /// let id = client.submit_code(&SubmitCode {
    ///     problem_id: 1,
    ///     language_id: 2,
    ///     code: "fn main() {}".to_string(),
    /// }).await?;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn submit_code(&self, req: &SubmitCode) -> Result<SubmissionId> {
        let response = self
            .request(Method::POST, "/client/submission/client/submit")?
            .json(req)
            .send()
            .await?;

        let id: SubmissionId = self.handle_response(response).await?;
        info!("Submitted code for problem {} as submission {}", req.problem_id, id);
        Ok(id)
    }

    /// List one page of submissions
    pub async fn list_submissions(&self, query: &SubmissionQuery) -> Result<Page<Submission>> {
        let response = self
            .request(Method::GET, "/client/submission/page")?
            .query(query)
            .send()
            .await?;

        self.handle_response(response).await
    }

    /// Get a submission by ID, including its current verdict
    pub async fn get_submission(&self, id: SubmissionId) -> Result<Submission> {
        let response = self
            .request(Method::GET, &format!("/client/submission/{}", id))?
            .send()
            .await?;

        self.handle_response(response).await
    }
}
