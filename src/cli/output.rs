//! Output format selection and rendering of flat key/value records.

use std::fmt;
use std::str::FromStr;

use probectl_error_reporter::UsageError;
use serde_json::{Map, Value};

pub const OUTPUT_FORMATS: &[&str] = &["table", "json", "yaml"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
    Yaml,
}

impl FromStr for OutputFormat {
    type Err = UsageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "table" => Ok(Self::Table),
            "json" => Ok(Self::Json),
            "yaml" => Ok(Self::Yaml),
            _ => Err(UsageError::new("output format", s, OUTPUT_FORMATS)),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Table => write!(f, "table"),
            Self::Json => write!(f, "json"),
            Self::Yaml => write!(f, "yaml"),
        }
    }
}

/// Render an ordered record in the chosen format. Always ends with a newline.
pub fn render_record(format: OutputFormat, record: &[(&str, Value)]) -> String {
    match format {
        OutputFormat::Table => {
            let width = record.iter().map(|(key, _)| key.len()).max().unwrap_or(0);
            record
                .iter()
                .map(|(key, value)| format!("{key:<width$}  {}\n", plain(value)))
                .collect()
        }
        OutputFormat::Json => {
            let object: Map<String, Value> = record
                .iter()
                .map(|(key, value)| ((*key).to_string(), value.clone()))
                .collect();
            // Serializing a Value cannot fail.
            let mut text = serde_json::to_string_pretty(&Value::Object(object)).unwrap_or_default();
            text.push('\n');
            text
        }
        // JSON scalars are valid YAML flow scalars.
        OutputFormat::Yaml => record
            .iter()
            .map(|(key, value)| format!("{key}: {value}\n"))
            .collect(),
    }
}

fn plain(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => "-".to_string(),
        other => other.to_string(),
    }
}
