//! Authentication endpoints

use crate::JudgeClient;
use crate::error::Result;
use ojwatch_core::dto::auth::{LoginRequest, LoginResponse};
use reqwest::Method;

impl JudgeClient {
    /// Log in and obtain a token
    ///
    /// The returned client is unchanged; attach the token with
    /// [`JudgeClient::with_token`].
    pub async fn login(&self, req: LoginRequest) -> Result<LoginResponse> {
        let response = self
            .request(Method::POST, "/auth/login")?
            .json(&req)
            .send()
            .await?;

        self.handle_response(response).await
    }

    /// Invalidate the current token on the server
    pub async fn logout(&self) -> Result<()> {
        let response = self.request(Method::POST, "/auth/logout")?.send().await?;

        self.handle_empty_response(response).await
    }
}
