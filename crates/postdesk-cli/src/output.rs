//! Output formatting helpers for the CLI.

use std::collections::BTreeMap;
use std::io::IsTerminal;
use std::path::Path;

use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{ContentArrangement, Table};
use serde_json::Value;

/// Render a value for humans: strings bare, everything else as JSON.
pub fn display_value(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

/// Key/value listing.
///
/// Pretty mode (stdout is a TTY): bordered table.
/// Plain mode: one `key=value` line per setting.
pub fn settings_listing(settings: &BTreeMap<String, Value>) -> String {
    if std::io::stdout().is_terminal() {
        let mut table = Table::new();
        table
            .load_preset(UTF8_FULL)
            .apply_modifier(UTF8_ROUND_CORNERS)
            .set_content_arrangement(ContentArrangement::Dynamic)
            .set_header(vec!["KEY", "VALUE"]);
        for (key, value) in settings {
            table.add_row(vec![key.clone(), display_value(value)]);
        }
        table.to_string()
    } else {
        settings
            .iter()
            .map(|(key, value)| format!("{}={}", key, display_value(value)))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Write `contents` to `output` atomically, or print it to stdout.
pub fn write_or_print(output: Option<&str>, contents: &str) -> anyhow::Result<()> {
    match output {
        Some(path) => {
            postdesk_core::fs::write_atomic(Path::new(path), contents.as_bytes())
                .map_err(|e| anyhow::anyhow!("Failed to write {}: {}", path, e))?;
        }
        None => println!("{}", contents),
    }
    Ok(())
}

/// Print an error and its hint to stderr.
pub fn print_error(message: &str, hint: Option<&str>) {
    eprintln!("Error: {}", message);
    if let Some(hint) = hint {
        eprintln!("{}", hint);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_display_value() {
        assert_eq!(display_value(&json!("dark")), "dark");
        assert_eq!(display_value(&json!("true")), "true");
        assert_eq!(display_value(&json!(280)), "280");
        assert_eq!(display_value(&json!({"a": 1})), "{\"a\":1}");
        assert_eq!(display_value(&Value::Null), "null");
    }

    #[test]
    fn test_write_or_print_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out").join("backup.json");
        write_or_print(path.to_str(), "{}").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "{}");
    }
}
