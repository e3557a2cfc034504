//! OpenRouter API key loading and the first-run setup wizard.
//!
//! Lookup order: `OPENROUTER_API_KEY` in the environment (a `.env` file in
//! the working directory is loaded first), then `~/.superchat/config`.
//! When nothing is found the interactive wizard prompts for a key and
//! persists it to the config file.

use anyhow::{Context, Result};
use colored::Colorize;
use std::fs;
use std::path::{Path, PathBuf};

const KEY_NAME: &str = "OPENROUTER_API_KEY";

/// Returns `~/.superchat/config`, if a home directory can be determined.
pub fn config_file_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".superchat").join("config"))
}

/// Loads the API key from the environment (after `.env`) or the config file.
pub fn load_api_key() -> Option<String> {
    // A .env in the working directory feeds the environment lookup.
    let _ = dotenvy::dotenv();

    if let Ok(key) = std::env::var(KEY_NAME) {
        if !key.trim().is_empty() {
            return Some(key.trim().to_string());
        }
    }

    let path = config_file_path()?;
    read_key_from_file(&path)
}

/// Parses `OPENROUTER_API_KEY=<value>` out of a config file, tolerating
/// surrounding quotes.
fn read_key_from_file(path: &Path) -> Option<String> {
    let content = fs::read_to_string(path).ok()?;
    for line in content.lines() {
        let line = line.trim();
        if let Some(value) = line.strip_prefix(&format!("{KEY_NAME}=")) {
            let value = value.trim().trim_matches(|c| c == '"' || c == '\'');
            if !value.is_empty() {
                return Some(value.to_string());
            }
        }
    }
    None
}

/// Writes the key to the config file, replacing an existing entry and
/// preserving every other line.
fn save_key_to_file(path: &Path, api_key: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }

    let existing = fs::read_to_string(path).unwrap_or_default();
    let mut lines: Vec<String> = Vec::new();
    let mut replaced = false;

    for line in existing.lines() {
        if line.trim().starts_with(&format!("{KEY_NAME}=")) {
            lines.push(format!("{KEY_NAME}={api_key}"));
            replaced = true;
        } else {
            lines.push(line.to_string());
        }
    }
    if !replaced {
        lines.push(format!("{KEY_NAME}={api_key}"));
    }

    fs::write(path, lines.join("\n") + "\n")
        .with_context(|| format!("failed to write {}", path.display()))
}

/// Runs the interactive key setup. Returns the key on success, `None` when
/// the user cancels.
pub fn run_api_key_wizard() -> Result<Option<String>> {
    println!("OpenRouter API key not found.");
    println!();
    println!("To use superchat, you need an OpenRouter API key:");
    println!();
    println!("1. Go to https://openrouter.ai/keys");
    println!("2. Sign up for a free account");
    println!("3. Create a new API key");
    println!("4. Add credits to your account at https://openrouter.ai/credits");
    println!();

    let mut rl = rustyline::DefaultEditor::new()?;
    let line = match rl.readline("Input your OpenRouter API key: ") {
        Ok(line) => line,
        Err(rustyline::error::ReadlineError::Interrupted)
        | Err(rustyline::error::ReadlineError::Eof) => {
            println!("\nSetup cancelled.");
            return Ok(None);
        }
        Err(err) => return Err(err.into()),
    };

    let api_key = line.trim().to_string();
    if api_key.is_empty() {
        println!("\nNo API key entered.");
        return Ok(None);
    }
    if !api_key.starts_with("sk-or-") {
        println!(
            "{}",
            "Warning: API key should start with 'sk-or-'. Continuing anyway...".yellow()
        );
    }

    let Some(path) = config_file_path() else {
        println!("Could not determine home directory; key will not be saved.");
        return Ok(Some(api_key));
    };

    match save_key_to_file(&path, &api_key) {
        Ok(()) => println!("API key saved to {}", path.display()),
        Err(err) => println!("Failed to save API key: {err}"),
    }
    println!();

    Ok(Some(api_key))
}
