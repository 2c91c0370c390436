//! Authentication command handlers
//!
//! Login stores the issued token in the session file; every other command
//! picks it up from there.

use anyhow::{Context, Result, bail};
use clap::Subcommand;
use colored::*;
use ojwatch_core::dto::auth::LoginRequest;
use std::io::{BufRead, Write};
use tracing::warn;

use crate::config::{Config, StoredSession};

/// Authentication subcommands
#[derive(Subcommand)]
pub enum AuthCommands {
    /// Log in and store the session
    Login {
        /// Username
        username: String,
        /// Password; prompted for when omitted
        #[arg(long, env = "OJWATCH_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },
    /// Log out and forget the stored session
    Logout,
    /// Show the stored session
    Whoami,
}

/// Handle authentication commands
pub async fn handle_auth_command(command: AuthCommands, config: &Config) -> Result<()> {
    match command {
        AuthCommands::Login { username, password } => login(config, username, password).await,
        AuthCommands::Logout => logout(config).await,
        AuthCommands::Whoami => whoami(config),
    }
}

async fn login(config: &Config, username: String, password: Option<String>) -> Result<()> {
    let password = match password {
        Some(password) => password,
        None => prompt_password()?,
    };

    let response = config
        .anonymous_client()
        .login(LoginRequest {
            username: username.clone(),
            password,
        })
        .await
        .context("Login failed")?;

    let username = response
        .user
        .map(|user| user.username)
        .unwrap_or(username);
    let session = StoredSession::new(response.token, username);

    let store = config.session_store();
    store.save(&session)?;

    println!("{} Logged in as {}", "✓".green(), session.username.bold());
    println!("  Session stored in {}", store.path().display().to_string().dimmed());
    Ok(())
}

async fn logout(config: &Config) -> Result<()> {
    let store = config.session_store();

    // The local session is dropped whether or not the server call succeeds
    if let Some(session) = store.load()? {
        let client = config.anonymous_client().with_token(session.token);
        if let Err(e) = client.logout().await {
            warn!("Server-side logout failed: {}", e);
        }
    }
    store.clear()?;

    println!("{} Logged out", "✓".green());
    Ok(())
}

fn whoami(config: &Config) -> Result<()> {
    let Some(session) = config.session_store().load()? else {
        println!("{}", "Not logged in.".yellow());
        return Ok(());
    };

    println!("{}", "Session:".bold());
    println!("  User:        {}", session.username.cyan());

    if let Some(expires) = session.claims().and_then(|claims| claims.expires_at()) {
        println!("  Expires:     {}", expires.format("%Y-%m-%d %H:%M:%S UTC"));
    }

    if session.permissions.is_empty() {
        println!("  Permissions: {}", "none".dimmed());
    } else {
        println!("  Permissions: {}", session.permissions.join(", "));
    }

    Ok(())
}

fn prompt_password() -> Result<String> {
    print!("Password: ");
    std::io::stdout().flush()?;

    let mut line = String::new();
    std::io::stdin()
        .lock()
        .read_line(&mut line)
        .context("Failed to read password")?;

    let password = line.trim_end_matches(['\r', '\n']).to_string();
    if password.is_empty() {
        bail!("Password cannot be empty");
    }
    Ok(password)
}
