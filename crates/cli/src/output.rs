use billingo_core::Listing;
use clap::ValueEnum;
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Pretty-printed JSON document
    Json,
    /// Indexed blocks for lists, indented JSON otherwise
    Pretty,
}

/// Render an API response for stdout.
pub fn render(value: &Value, format: OutputFormat) -> String {
    match (format, value) {
        (OutputFormat::Pretty, Value::Array(items)) => items
            .iter()
            .enumerate()
            .map(|(idx, item)| format!("[{}] {}", idx, to_pretty(item)))
            .collect::<Vec<_>>()
            .join("\n\n"),
        _ => to_pretty(value),
    }
}

fn to_pretty(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}

/// "Page 1 of 3 (61 total)" when the response carried pagination fields.
pub fn page_summary(listing: &Listing) -> Option<String> {
    match (listing.current_page, listing.last_page, listing.total) {
        (Some(page), Some(last), Some(total)) => {
            Some(format!("Page {} of {} ({} total)", page, last, total))
        }
        (Some(page), Some(last), None) => Some(format!("Page {} of {}", page, last)),
        (_, _, Some(total)) => Some(format!("{} total", total)),
        _ => None,
    }
}

/// Show the first few characters of a secret.
pub fn mask_secret(secret: &str) -> String {
    let visible: String = secret.chars().take(4).collect();
    if secret.chars().count() <= 4 {
        return "****".to_string();
    }
    format!("{}****", visible)
}
