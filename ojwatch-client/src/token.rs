//! JWT claim consumption
//!
//! The client never verifies signatures; it only reads the payload to learn
//! when the token expires and which permissions it grants.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{ClientError, Result};

/// Tokens this close to `exp` already count as expired, absorbing clock skew
/// and request latency
pub const EXPIRY_SKEW: TimeDelta = TimeDelta::seconds(30);

/// Claims read from a JWT payload
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawClaims")]
pub struct TokenClaims {
    /// Expiry as seconds since the Unix epoch
    pub exp: Option<i64>,
    pub sub: Option<String>,
    pub permissions: Vec<String>,
}

/// Payload as the judge issues it
///
/// User details travel in `userLogin`, a claim holding a JSON document
/// encoded as a string.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawClaims {
    #[serde(default)]
    exp: Option<i64>,
    #[serde(default)]
    sub: Option<String>,
    #[serde(default)]
    permissions: Vec<String>,
    #[serde(default)]
    user_login: Option<String>,
}

#[derive(Deserialize)]
struct UserLogin {
    #[serde(default)]
    username: Option<String>,
    #[serde(default)]
    permissions: Vec<String>,
}

impl TryFrom<RawClaims> for TokenClaims {
    type Error = String;

    fn try_from(raw: RawClaims) -> std::result::Result<Self, Self::Error> {
        let Some(user_login) = raw.user_login else {
            return Ok(Self {
                exp: raw.exp,
                sub: raw.sub,
                permissions: raw.permissions,
            });
        };

        let login: UserLogin = serde_json::from_str(&user_login)
            .map_err(|e| format!("userLogin claim is not a JSON object: {}", e))?;

        Ok(Self {
            exp: raw.exp,
            sub: raw.sub.or(login.username),
            permissions: if login.permissions.is_empty() {
                raw.permissions
            } else {
                login.permissions
            },
        })
    }
}

impl TokenClaims {
    /// Decode the payload segment of `token`
    ///
    /// A leading `Bearer ` scheme is tolerated.
    pub fn decode(token: &str) -> Result<Self> {
        let token = token.trim();
        let token = token.strip_prefix("Bearer ").unwrap_or(token).trim();

        let mut segments = token.split('.');
        let payload = match (segments.next(), segments.next(), segments.next()) {
            (Some(_), Some(payload), Some(_)) if segments.next().is_none() => payload,
            _ => {
                return Err(ClientError::InvalidToken(
                    "expected three dot-separated segments".to_string(),
                ));
            }
        };

        let bytes = URL_SAFE_NO_PAD
            .decode(payload.trim_end_matches('='))
            .map_err(|e| ClientError::InvalidToken(format!("payload is not base64url: {}", e)))?;

        serde_json::from_slice(&bytes)
            .map_err(|e| ClientError::InvalidToken(format!("payload is not a claims object: {}", e)))
    }

    /// Expiry instant, if the token carries one
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.exp.and_then(|exp| DateTime::from_timestamp(exp, 0))
    }

    /// Whether the token is expired at `now`, or will be within
    /// [`EXPIRY_SKEW`]; tokens without `exp` never expire
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        let deadline = (now + EXPIRY_SKEW).timestamp();
        self.exp.is_some_and(|exp| exp < deadline)
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }

    pub fn has_permission(&self, permission: &str) -> bool {
        self.permissions.iter().any(|p| p == permission)
    }

    /// True when at least one of `permissions` is granted
    pub fn has_any_permission(&self, permissions: &[&str]) -> bool {
        permissions.iter().any(|p| self.has_permission(p))
    }
}
