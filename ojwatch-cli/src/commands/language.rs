//! Language command handlers

use anyhow::Result;
use clap::Subcommand;
use colored::*;

use crate::config::Config;

/// Language subcommands
#[derive(Subcommand)]
pub enum LanguageCommands {
    /// List available languages
    List,
}

/// Handle language commands
pub async fn handle_language_command(command: LanguageCommands, config: &Config) -> Result<()> {
    let client = config.client()?;

    match command {
        LanguageCommands::List => {
            let languages = client.list_languages().await?;

            if languages.is_empty() {
                println!("{}", "No languages found.".yellow());
                return Ok(());
            }

            println!("{}", format!("Found {} language(s):", languages.len()).bold());
            for language in languages {
                let name = if language.is_enabled() {
                    language.name.normal()
                } else {
                    format!("{} (disabled)", language.name).dimmed()
                };
                println!("  {} {:>4}  {}", "▸".cyan(), language.id, name);
            }
            Ok(())
        }
    }
}
