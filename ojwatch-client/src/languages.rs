//! Language endpoints

use crate::JudgeClient;
use crate::error::Result;
use ojwatch_core::domain::language::Language;
use reqwest::Method;

impl JudgeClient {
    /// List every language the judge knows
    pub async fn list_languages(&self) -> Result<Vec<Language>> {
        let response = self
            .request(Method::GET, "/client/language/list")?
            .send()
            .await?;

        self.handle_response(response).await
    }

    /// Get a language by ID
    pub async fn get_language(&self, id: i64) -> Result<Language> {
        let response = self
            .request(Method::GET, &format!("/client/language/{}", id))?
            .send()
            .await?;

        self.handle_response(response).await
    }
}
