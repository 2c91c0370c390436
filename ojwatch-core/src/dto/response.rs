//! Uniform response envelope

use serde::{Deserialize, Serialize};

/// Envelope code signalling success
pub const CODE_OK: i32 = 200;

/// Envelope code signalling a missing or rejected credential
pub const CODE_UNAUTHORIZED: i32 = 401;

/// Every judge API response body is wrapped in this envelope
///
/// A request only succeeded when `code` is 200; the HTTP status alone is
/// not enough.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResponseResult<T> {
    pub code: i32,
    #[serde(default, alias = "message")]
    pub msg: Option<String>,
    #[serde(default = "Option::default")]
    pub data: Option<T>,
}

impl<T> ResponseResult<T> {
    /// Wraps `data` in a successful envelope
    pub fn ok(data: T) -> Self {
        Self {
            code: CODE_OK,
            msg: Some("success".to_string()),
            data: Some(data),
        }
    }

    /// Builds a failed envelope
    pub fn error(code: i32, msg: impl Into<String>) -> Self {
        Self {
            code,
            msg: Some(msg.into()),
            data: None,
        }
    }

    pub fn is_ok(&self) -> bool {
        self.code == CODE_OK
    }

    /// The server message, or a generic one when the server sent none
    pub fn message(&self) -> &str {
        self.msg.as_deref().unwrap_or("request failed")
    }
}
