//! Configuration module
//!
//! CLI configuration and the on-disk login session.

use anyhow::{Context, Result};
use ojwatch_client::{JudgeClient, TokenClaims};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// CLI configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the judge API
    pub api_url: String,
    /// Token given on the command line or in the environment
    pub token: Option<String>,
    /// File holding the stored login session
    pub session_file: PathBuf,
}

impl Config {
    pub fn session_store(&self) -> SessionStore {
        SessionStore::new(self.session_file.clone())
    }

    /// Client without credentials
    pub fn anonymous_client(&self) -> JudgeClient {
        JudgeClient::new(&self.api_url)
    }

    /// Client carrying the explicit token, else the stored one
    pub fn client(&self) -> Result<JudgeClient> {
        let client = self.anonymous_client();

        if let Some(token) = &self.token {
            return Ok(client.with_token(token.clone()));
        }

        match self.session_store().load()? {
            Some(session) => Ok(client.with_token(session.token)),
            None => Ok(client),
        }
    }
}

/// `$HOME/.ojwatch/session.json`, or relative to the working directory
/// when no home directory is known
pub fn default_session_file() -> PathBuf {
    std::env::var_os("HOME")
        .map(PathBuf::from)
        .unwrap_or_default()
        .join(".ojwatch")
        .join("session.json")
}

/// A logged-in session as persisted between invocations
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredSession {
    pub token: String,
    pub username: String,
    #[serde(default)]
    pub permissions: Vec<String>,
}

impl StoredSession {
    /// Builds a session, reading permissions from the token when it is a JWT
    pub fn new(token: String, username: String) -> Self {
        let permissions = TokenClaims::decode(&token)
            .map(|claims| claims.permissions)
            .unwrap_or_default();

        Self {
            token,
            username,
            permissions,
        }
    }

    pub fn claims(&self) -> Option<TokenClaims> {
        TokenClaims::decode(&self.token).ok()
    }

    pub fn is_expired(&self) -> bool {
        self.claims().is_some_and(|claims| claims.is_expired())
    }
}

/// Reads and writes the session file
#[derive(Debug, Clone)]
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the stored session
    ///
    /// An expired session is deleted and reported as absent.
    pub fn load(&self) -> Result<Option<StoredSession>> {
        if !self.path.exists() {
            debug!("No session file at {}", self.path.display());
            return Ok(None);
        }

        let contents = std::fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read session file {}", self.path.display()))?;
        let session: StoredSession = serde_json::from_str(&contents)
            .with_context(|| format!("Corrupt session file {}", self.path.display()))?;

        if session.is_expired() {
            info!("Stored session for {} has expired", session.username);
            self.clear()?;
            return Ok(None);
        }

        Ok(Some(session))
    }

    pub fn save(&self, session: &StoredSession) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }

        let contents = serde_json::to_string_pretty(session)?;
        std::fs::write(&self.path, contents)
            .with_context(|| format!("Failed to write session file {}", self.path.display()))
    }

    /// Remove the stored session; succeeds when there is none
    pub fn clear(&self) -> Result<()> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e)
                .with_context(|| format!("Failed to remove session file {}", self.path.display())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::Engine;
    use base64::engine::general_purpose::URL_SAFE_NO_PAD;

    fn scratch_store(name: &str) -> SessionStore {
        let dir = std::env::temp_dir().join(format!("ojwatch-test-{}-{}", std::process::id(), name));
        let _ = std::fs::remove_dir_all(&dir);
        SessionStore::new(dir.join("nested").join("session.json"))
    }

    fn jwt(payload: &str) -> String {
        format!("e30.{}.sig", URL_SAFE_NO_PAD.encode(payload))
    }

    #[test]
    fn test_missing_session_is_none() {
        let store = scratch_store("missing");
        assert_eq!(store.load().unwrap(), None);
        assert!(store.clear().is_ok());
    }

    #[test]
    fn test_save_load_clear() {
        let store = scratch_store("roundtrip");
        let session = StoredSession::new(
            jwt(r#"{"exp":4102444800,"permissions":["SUBMIT"]}"#),
            "alice".to_string(),
        );
        assert_eq!(session.permissions, vec!["SUBMIT".to_string()]);

        store.save(&session).unwrap();
        assert_eq!(store.load().unwrap(), Some(session));

        store.clear().unwrap();
        assert_eq!(store.load().unwrap(), None);
    }

    #[test]
    fn test_permissions_read_from_user_login_claim() {
        let session = StoredSession::new(
            jwt(r#"{"exp":4102444800,"userLogin":"{\"username\":\"alice\",\"permissions\":[\"SUBMIT\",\"PROBLEM.ADD\"]}"}"#),
            "alice".to_string(),
        );
        assert_eq!(
            session.permissions,
            vec!["SUBMIT".to_string(), "PROBLEM.ADD".to_string()]
        );
    }

    #[test]
    fn test_expired_session_is_discarded() {
        let store = scratch_store("expired");
        let session = StoredSession::new(jwt(r#"{"exp":1}"#), "bob".to_string());
        store.save(&session).unwrap();

        assert_eq!(store.load().unwrap(), None);
        assert!(!store.path().exists());
    }

    #[test]
    fn test_explicit_token_wins() {
        let config = Config {
            api_url: "http://localhost:8080/api/".to_string(),
            token: Some("cli-token".to_string()),
            session_file: scratch_store("explicit").path().to_path_buf(),
        };

        let client = config.client().unwrap();
        assert_eq!(client.base_url(), "http://localhost:8080/api");
        assert_eq!(client.token(), Some("cli-token"));
    }
}
