//! `palaver auth` / `palaver deauth`

use std::error::Error;
use std::io::{self, BufRead, IsTerminal, Write};

use crate::core::credentials::{CredentialStore, API_KEY_ENV};
use crate::utils::masked_input::prompt_masked;

const KEY_PROMPT: &str = "Enter your OpenAI API key: ";

/// Read the key from the terminal with masked echo, or the first line of
/// piped stdin.
fn read_api_key() -> Result<String, Box<dyn Error>> {
    if io::stdin().is_terminal() {
        return Ok(prompt_masked(KEY_PROMPT)?);
    }
    read_first_line(io::stdin().lock())
}

fn read_first_line<R: BufRead>(mut reader: R) -> Result<String, Box<dyn Error>> {
    let mut line = String::new();
    reader.read_line(&mut line)?;
    Ok(line)
}

/// Trimmed key, rejecting blank input.
pub fn normalize_key(raw: &str) -> Result<String, &'static str> {
    let key = raw.trim();
    if key.is_empty() {
        return Err("API key cannot be empty");
    }
    Ok(key.to_string())
}

pub fn parse_confirmation(input: &str) -> bool {
    matches!(input.trim().to_lowercase().as_str(), "y" | "yes")
}

pub fn run_auth(store: &CredentialStore) -> Result<(), Box<dyn Error>> {
    println!("🔐 palaver authentication setup");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    let key = normalize_key(&read_api_key()?)?;
    store.store_key(&key)?;
    println!("✓ API key stored securely in the system keyring");

    if std::env::var(API_KEY_ENV).is_ok_and(|value| !value.trim().is_empty()) {
        println!("⚠️  {API_KEY_ENV} is set and takes precedence over the stored key.");
    }
    Ok(())
}

pub fn run_deauth(store: &CredentialStore) -> Result<(), Box<dyn Error>> {
    if store.stored_key()?.is_none() {
        println!("No stored API key found.");
        return Ok(());
    }

    print!("Remove the stored API key? (y/N): ");
    io::stdout().flush()?;
    let answer = read_first_line(io::stdin().lock())?;
    if !parse_confirmation(&answer) {
        println!("Cancelled.");
        return Ok(());
    }

    if store.remove_key()? {
        println!("✅ Removed the stored API key");
    } else {
        println!("No stored API key found.");
    }
    Ok(())
}
