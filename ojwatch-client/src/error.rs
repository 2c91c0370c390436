//! Error types for the judge client

use thiserror::Error;

/// Result type alias for client operations
pub type Result<T> = std::result::Result<T, ClientError>;

/// Errors that can occur when using the judge client
#[derive(Debug, Error)]
pub enum ClientError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    /// API returned an error status code or a non-200 envelope code
    #[error("API error (status {status}): {message}")]
    ApiError {
        /// HTTP status code, or the envelope code when HTTP itself succeeded
        status: u16,
        /// Error message from the API
        message: String,
    },

    /// The server rejected the credential, or none was supplied
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// The stored token expired before the request was sent
    #[error("Token expired, please log in again")]
    TokenExpired,

    /// The token is not a decodable JWT
    #[error("Invalid token: {0}")]
    InvalidToken(String),

    /// Failed to parse response
    #[error("Failed to parse response: {0}")]
    ParseError(String),
}

impl ClientError {
    /// Create an API error from status code and message
    pub fn api_error(status: u16, message: impl Into<String>) -> Self {
        Self::ApiError {
            status,
            message: message.into(),
        }
    }

    /// Check if this error is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::ApiError { status: 404, .. })
    }

    /// Check if this error is a client error (4xx status)
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::ApiError { status, .. } if *status >= 400 && *status < 500)
            || self.is_auth_error()
    }

    /// Check if this error is a server error (5xx status)
    pub fn is_server_error(&self) -> bool {
        matches!(self, Self::ApiError { status, .. } if *status >= 500)
    }

    /// Check if the caller has to log in (again) before retrying
    pub fn is_auth_error(&self) -> bool {
        matches!(
            self,
            Self::Unauthorized(_) | Self::TokenExpired | Self::InvalidToken(_)
        )
    }
}
