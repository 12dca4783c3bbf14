//! Terminal rendering

use crate::Format;
use cookbook_api_client::ApiResponse;
use owo_colors::OwoColorize;
use serde_json::Value;

/// Print a response body in the requested format
pub fn response(title: &str, response: &ApiResponse, format: Format) -> anyhow::Result<()> {
    if format == Format::Json {
        println!("{}", serde_json::to_string_pretty(&response.body)?);
        return Ok(());
    }

    println!();
    println!("  {} {}", title.blue().bold(), format!("({})", response.status).dimmed());
    println!();

    match response.data().unwrap_or(&response.body) {
        Value::Array(items) if items.is_empty() => println!("  {}", "(none)".dimmed()),
        Value::Array(items) => {
            for item in items {
                println!("  {} {}", "•".cyan(), summary(item));
            }
        }
        other => println!("{}", indent(&serde_json::to_string_pretty(other)?)),
    }
    println!();

    Ok(())
}

/// Print a one-line success message
pub fn success(message: &str, format: Format) {
    match format {
        Format::Json => println!("{}", serde_json::json!({ "ok": true, "message": message })),
        Format::Text => println!("{} {message}", "✓".green()),
    }
}

/// One-line description of a list item
pub fn summary(item: &Value) -> String {
    let id = item
        .get("_id")
        .or_else(|| item.get("id"))
        .map(|v| v.as_str().map_or_else(|| v.to_string(), str::to_string));
    let label = ["title", "name", "email"]
        .iter()
        .find_map(|key| item.get(*key).and_then(Value::as_str));

    match (id, label) {
        (Some(id), Some(label)) => format!("{label} [{id}]"),
        (None, Some(label)) => label.to_string(),
        (Some(id), None) => id,
        (None, None) => item.to_string(),
    }
}

fn indent(text: &str) -> String {
    text.lines()
        .map(|line| format!("  {line}"))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_summary() {
        assert_eq!(summary(&json!({"_id": "r1", "title": "Soup"})), "Soup [r1]");
        assert_eq!(summary(&json!({"id": 3, "name": "Dessert"})), "Dessert [3]");
        assert_eq!(summary(&json!({"name": "Dessert"})), "Dessert");
        assert_eq!(summary(&json!("plain")), "\"plain\"");
    }

    #[test]
    fn test_indent() {
        assert_eq!(indent("a\nb"), "  a\n  b");
    }
}
