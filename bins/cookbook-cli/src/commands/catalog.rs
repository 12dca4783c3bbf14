//! Read-only catalog commands

use super::client;
use crate::{output, Format};
use anyhow::{bail, Result};
use serde_json::{Map, Value};

/// List recipes, optionally filtered
pub async fn recipes(backend: Option<&str>, filters: &[String], format: Format) -> Result<()> {
    let filter = parse_filters(filters)?;
    let response = client(backend)?.recipes().list(&filter).await?;
    output::response("Recipes", &response, format)
}

/// Show one recipe
pub async fn recipe(backend: Option<&str>, id: &str, format: Format) -> Result<()> {
    let response = client(backend)?.recipes().get(id).await?;
    output::response("Recipe", &response, format)
}

/// List categories
pub async fn categories(backend: Option<&str>, format: Format) -> Result<()> {
    let response = client(backend)?.categories().list().await?;
    output::response("Categories", &response, format)
}

/// Turn `key=value` arguments into a filter mapping
///
/// A key given more than once becomes a list.
pub fn parse_filters(filters: &[String]) -> Result<Map<String, Value>> {
    let mut map = Map::new();

    for raw in filters {
        let Some((key, value)) = raw.split_once('=') else {
            bail!("invalid filter `{raw}`, expected KEY=VALUE");
        };
        if key.is_empty() {
            bail!("invalid filter `{raw}`, key is empty");
        }

        let value = Value::String(value.to_string());
        match map.get_mut(key) {
            None => {
                map.insert(key.to_string(), value);
            }
            Some(Value::Array(items)) => items.push(value),
            Some(existing) => {
                let first = existing.take();
                *existing = Value::Array(vec![first, value]);
            }
        }
    }

    Ok(map)
}
