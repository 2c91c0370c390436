//! Problem endpoints

use crate::JudgeClient;
use crate::error::Result;
use ojwatch_core::domain::problem::Problem;
use ojwatch_core::dto::page::Page;
use ojwatch_core::dto::problem::ProblemQuery;
use reqwest::Method;

impl JudgeClient {
    /// List one page of problems
    ///
    /// # Arguments
    /// * `query` - Page selector plus optional difficulty and keyword filters
    pub async fn list_problems(&self, query: &ProblemQuery) -> Result<Page<Problem>> {
        let response = self
            .request(Method::GET, "/client/problem/page")?
            .query(query)
            .send()
            .await?;

        self.handle_response(response).await
    }

    /// Get a problem by ID
    pub async fn get_problem(&self, id: i64) -> Result<Problem> {
        let response = self
            .request(Method::GET, &format!("/client/problem/{}", id))?
            .send()
            .await?;

        self.handle_response(response).await
    }
}
