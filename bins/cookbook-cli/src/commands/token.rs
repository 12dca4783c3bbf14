//! Local credential inspection

use super::config;
use crate::{output, Format};
use anyhow::Result;
use cookbook_api_client::store::{CredentialStore, DurableCredentialStore};
use owo_colors::OwoColorize;

/// Show the stored token
pub fn show(backend: Option<&str>, reveal: bool, format: Format) -> Result<()> {
    let store = DurableCredentialStore::new(config(backend)?.storage_config())?;
    let token = store.get();
    let display = token.as_deref().map(|t| if reveal { t.to_string() } else { mask(t) });

    match format {
        Format::Json => println!(
            "{}",
            serde_json::json!({
                "stored": token.is_some(),
                "token": display,
                "path": store.storage().path(),
            })
        ),
        Format::Text => match display {
            Some(display) => println!("{} {display}", "Token:".bold()),
            None => println!("{}", "No token stored".dimmed()),
        },
    }

    Ok(())
}

/// Wipe all stored credentials
pub fn clear(backend: Option<&str>) -> Result<()> {
    let store = DurableCredentialStore::new(config(backend)?.storage_config())?;
    store.clear();
    output::success("Credentials cleared", Format::Text);
    Ok(())
}

/// Keep the first and last four characters of a token
pub fn mask(token: &str) -> String {
    let chars: Vec<char> = token.chars().collect();
    if chars.len() <= 8 {
        return "*".repeat(chars.len());
    }

    let head: String = chars[..4].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{head}…{tail}")
}
