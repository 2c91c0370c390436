//! OJWatch HTTP Client
//!
//! A type-safe HTTP client for the online-judge REST API.
//!
//! Every endpoint answers with a [`ResponseResult`] envelope; the client
//! unwraps it and turns non-200 envelope codes into [`ClientError`]s so callers
//! only ever see the payload or an error.
//!
//! # Example
//!
//! ```no_run
//! use ojwatch_client::JudgeClient;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let client = JudgeClient::new("http://localhost:8080/api");
//!
//!     let submission = client.get_submission(42).await?;
//!     println!("Submission 42: {}", submission.status);
//!     Ok(())
//! }
//! ```

mod auth;
pub mod error;
mod languages;
mod problems;
mod submissions;
pub mod token;

// Re-export commonly used types
pub use error::{ClientError, Result};
pub use ojwatch_core::domain::submission::{Submission, SubmissionId, Verdict};
pub use token::{EXPIRY_SKEW, TokenClaims};

use ojwatch_core::dto::response::{CODE_OK, CODE_UNAUTHORIZED, ResponseResult};
use reqwest::{Client, Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use tracing::debug;

/// HTTP client for the judge API
///
/// Endpoints are grouped by resource:
/// - Authentication (login, logout)
/// - Problems and languages
/// - Submissions (submit, list, detail)
#[derive(Debug, Clone)]
pub struct JudgeClient {
    /// Base URL of the API (e.g., "http://localhost:8080/api")
    base_url: String,
    /// HTTP client instance
    client: Client,
    /// Token sent in the `Authorization` header
    token: Option<String>,
}

impl JudgeClient {
    /// Create a new judge client
    ///
    /// # Arguments
    /// * `base_url` - The base URL of the judge API (e.g., "http://localhost:8080/api")
    ///
    /// # Example
    /// ```
    /// use ojwatch_client::JudgeClient;
    ///
    /// let client = JudgeClient::new("http://localhost:8080/api");
    /// ```
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(base_url, Client::new())
    }

    /// Create a new judge client with a custom HTTP client
    ///
    /// This allows you to configure timeouts, proxies, TLS settings, etc.
    ///
    /// # Example
    /// ```
    /// use ojwatch_client::JudgeClient;
    /// use reqwest::Client;
    /// use std::time::Duration;
    ///
    /// let http_client = Client::builder()
    ///     .timeout(Duration::from_secs(15))
    ///     .build()
    ///     .unwrap();
    ///
    /// let client = JudgeClient::with_client("http://localhost:8080/api", http_client);
    /// ```
    pub fn with_client(base_url: impl Into<String>, client: Client) -> Self {
        let base_url = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
            token: None,
        }
    }

    /// Return a client that authenticates with `token`
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        let token = token.into();
        let token = token.trim();
        self.token = (!token.is_empty()).then(|| token.to_string());
        self
    }

    /// Get the base URL of the API
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Get the token attached to requests, if any
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    /// Build a request for `path`, attaching the token
    ///
    /// A token whose `exp` claim lies in the past, or within [`EXPIRY_SKEW`] of
    /// now, is refused here, so no request is sent with a credential the
    /// server would reject anyway.
    fn request(&self, method: Method, path: &str) -> Result<RequestBuilder> {
        let url = format!("{}{}", self.base_url, path);
        debug!("{} {}", method, url);

        let mut builder = self.client.request(method, &url);
        if let Some(token) = &self.token {
            if TokenClaims::decode(token).is_ok_and(|claims| claims.is_expired()) {
                return Err(ClientError::TokenExpired);
            }
            builder = builder.header(reqwest::header::AUTHORIZATION, token);
        }
        Ok(builder)
    }

    // =============================================================================
    // Response Handlers
    // =============================================================================

    /// Handle an API response and return the envelope payload
    async fn handle_response<T: DeserializeOwned>(&self, response: reqwest::Response) -> Result<T> {
        let envelope = Self::read_envelope::<T>(response).await?;
        envelope
            .data
            .ok_or_else(|| ClientError::ParseError("Response envelope carried no data".to_string()))
    }

    /// Handle an API response whose payload is irrelevant (e.g., logout)
    async fn handle_empty_response(&self, response: reqwest::Response) -> Result<()> {
        Self::read_envelope::<serde_json::Value>(response).await?;
        Ok(())
    }

    async fn read_envelope<T: DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<ResponseResult<T>> {
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(http_error(status, &body));
        }

        decode_envelope(&body)
    }
}

/// Map a non-2xx HTTP answer to an error, preferring the envelope message
fn http_error(status: StatusCode, body: &str) -> ClientError {
    let message = serde_json::from_str::<ResponseResult<serde_json::Value>>(body)
        .ok()
        .and_then(|envelope| envelope.msg)
        .unwrap_or_else(|| {
            if body.is_empty() {
                status
                    .canonical_reason()
                    .unwrap_or("Unknown error")
                    .to_string()
            } else {
                body.to_string()
            }
        });

    if status == StatusCode::UNAUTHORIZED {
        ClientError::Unauthorized(message)
    } else {
        ClientError::api_error(status.as_u16(), message)
    }
}

/// Decode a 2xx body and check the envelope code
fn decode_envelope<T: DeserializeOwned>(body: &str) -> Result<ResponseResult<T>> {
    let envelope: ResponseResult<T> = serde_json::from_str(body)
        .map_err(|e| ClientError::ParseError(format!("Failed to parse JSON response: {}", e)))?;

    match envelope.code {
        CODE_OK => Ok(envelope),
        CODE_UNAUTHORIZED => Err(ClientError::Unauthorized(envelope.message().to_string())),
        code => Err(ClientError::api_error(
            u16::try_from(code).unwrap_or(500),
            envelope.message(),
        )),
    }
}
