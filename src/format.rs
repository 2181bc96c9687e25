//! Output formatting.
//!
//! Structured data can be printed as JSON, YAML or a plain-text table.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use strum::{Display, EnumIter, EnumString, IntoStaticStr, IntoEnumIterator};
use tabled::{builder::Builder, settings::Style};

const MAX_CELL_WIDTH: usize = 100;

/// Error types that can occur during formatting operations
#[derive(Debug, thiserror::Error)]
pub enum FormattingError {
    #[error("invalid output format '{0}'. Valid formats: json, yaml, table")]
    UnsupportedOutputFormat(String),
    #[error("JSON serialization error: {0}")]
    JsonSerializationError(#[from] serde_json::Error),
    #[error("YAML serialization error: {0}")]
    YamlSerializationError(#[from] serde_yaml::Error),
}

#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    IntoStaticStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum OutputFormat {
    #[default]
    Json,
    Yaml,
    Table,
}

impl OutputFormat {
    /// Returns all supported format names
    pub fn names() -> Vec<&'static str> {
        OutputFormat::iter().map(Into::into).collect()
    }

    /// Parses a format name, reporting the valid choices on failure.
    pub fn parse(name: &str) -> Result<OutputFormat, FormattingError> {
        name.parse()
            .map_err(|_| FormattingError::UnsupportedOutputFormat(name.to_string()))
    }
}

pub trait Formattable {
    fn format(&self, f: OutputFormat) -> Result<String, FormattingError>;
}

/// Pretty JSON or YAML for any serializable value. Tables are type specific.
pub fn serialize<T: Serialize + ?Sized>(
    value: &T,
    f: OutputFormat,
) -> Result<String, FormattingError> {
    match f {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(value)?),
        OutputFormat::Yaml => Ok(serde_yaml::to_string(value)?),
        OutputFormat::Table => Err(FormattingError::UnsupportedOutputFormat(f.to_string())),
    }
}

/// Borderless table with a header row.
pub fn render_table<H, R>(headers: &[H], rows: R) -> String
where
    H: AsRef<str>,
    R: IntoIterator<Item = Vec<String>>,
{
    let mut builder = Builder::default();
    builder.push_record(headers.iter().map(|h| h.as_ref().to_string()));
    for row in rows {
        builder.push_record(row);
    }
    let mut table = builder.build();
    table.with(Style::blank());
    table.to_string()
}

/// Compact single-line rendering of a JSON value for a table cell.
pub fn cell_value(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => truncate(s),
        Value::Array(items) => match items.len() {
            0 => "[]".to_string(),
            1 => format!("[{}]", scalar(&items[0])),
            n => format!("[{}, ... ({} items)]", scalar(&items[0]), n),
        },
        Value::Object(map) if map.is_empty() => "{}".to_string(),
        Value::Object(map) => format!("{{...}} ({} fields)", map.len()),
        other => other.to_string(),
    }
}

fn scalar(value: &Value) -> String {
    match value {
        Value::String(s) => truncate(s),
        Value::Object(_) | Value::Array(_) => cell_value(value),
        other => other.to_string(),
    }
}

fn truncate(s: &str) -> String {
    if s.chars().count() > MAX_CELL_WIDTH {
        let head: String = s.chars().take(MAX_CELL_WIDTH - 3).collect();
        format!("{}...", head)
    } else {
        s.to_string()
    }
}

/// Upper-cases the first character.
pub fn title_case(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Byte count with a binary unit suffix.
pub fn human_size(bytes: u64) -> String {
    const UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];
    if bytes < 1024 {
        return format!("{} B", bytes);
    }
    let mut size = bytes as f64;
    let mut unit = 0;
    while size >= 1024.0 && unit < UNITS.len() - 1 {
        size /= 1024.0;
        unit += 1;
    }
    format!("{:.1} {}", size, UNITS[unit])
}

/// Coarse relative age such as `3 hours ago`.
pub fn time_ago(elapsed: chrono::Duration) -> String {
    let plural = |n: i64, unit: &str| {
        if n == 1 {
            format!("1 {} ago", unit)
        } else {
            format!("{} {}s ago", n, unit)
        }
    };
    if elapsed.num_seconds() < 60 {
        "just now".to_string()
    } else if elapsed.num_minutes() < 60 {
        plural(elapsed.num_minutes(), "minute")
    } else if elapsed.num_hours() < 24 {
        plural(elapsed.num_hours(), "hour")
    } else {
        plural(elapsed.num_days(), "day")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::str::FromStr;

    #[test]
    fn test_output_format_parsing() {
        assert_eq!(OutputFormat::from_str("json").unwrap(), OutputFormat::Json);
        assert_eq!(OutputFormat::from_str("YAML").unwrap(), OutputFormat::Yaml);
        assert_eq!(OutputFormat::parse("Table").unwrap(), OutputFormat::Table);
        let err = OutputFormat::parse("csv").unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid output format 'csv'. Valid formats: json, yaml, table"
        );
    }

    #[test]
    fn test_output_format_names_and_display() {
        assert_eq!(OutputFormat::names(), vec!["json", "yaml", "table"]);
        assert_eq!(OutputFormat::Table.to_string(), "table");
        assert_eq!(OutputFormat::default(), OutputFormat::Json);
    }

    #[test]
    fn test_serialize_json_and_yaml() {
        let value = json!({"name": "dev"});
        assert_eq!(
            serialize(&value, OutputFormat::Json).unwrap(),
            "{\n  \"name\": \"dev\"\n}"
        );
        assert_eq!(serialize(&value, OutputFormat::Yaml).unwrap(), "name: dev\n");
        assert!(serialize(&value, OutputFormat::Table).is_err());
    }

    #[test]
    fn test_render_table() {
        let table = render_table(
            &["NAME", "URL"],
            vec![vec!["dev".to_string(), "http://localhost:8090".to_string()]],
        );
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("NAME"));
        assert!(lines[1].contains("http://localhost:8090"));
    }

    #[test]
    fn test_cell_value() {
        assert_eq!(cell_value(&json!(null)), "");
        assert_eq!(cell_value(&json!("abc")), "abc");
        assert_eq!(cell_value(&json!(42)), "42");
        assert_eq!(cell_value(&json!([])), "[]");
        assert_eq!(cell_value(&json!(["a"])), "[a]");
        assert_eq!(cell_value(&json!(["a", "b", "c"])), "[a, ... (3 items)]");
        assert_eq!(cell_value(&json!({"a": 1, "b": 2})), "{...} (2 fields)");
        let long = "x".repeat(150);
        assert_eq!(cell_value(&json!(long)).chars().count(), 100);
    }

    #[test]
    fn test_human_size() {
        assert_eq!(human_size(512), "512 B");
        assert_eq!(human_size(2048), "2.0 KB");
        assert_eq!(human_size(5 * 1024 * 1024), "5.0 MB");
    }

    #[test]
    fn test_time_ago() {
        assert_eq!(time_ago(chrono::Duration::seconds(5)), "just now");
        assert_eq!(time_ago(chrono::Duration::minutes(1)), "1 minute ago");
        assert_eq!(time_ago(chrono::Duration::hours(3)), "3 hours ago");
        assert_eq!(time_ago(chrono::Duration::days(2)), "2 days ago");
    }

    #[test]
    fn test_title_case() {
        assert_eq!(title_case("posts"), "Posts");
        assert_eq!(title_case(""), "");
    }
}
