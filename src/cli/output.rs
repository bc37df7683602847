//! Output formatting for CLI commands.

use serde::Serialize;

/// Output format for command results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Human-readable text.
    #[default]
    Text,
    /// Pretty-printed JSON.
    Json,
}

impl OutputFormat {
    /// Parses a format name. Unknown names fall back to text.
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "json" => Self::Json,
            _ => Self::Text,
        }
    }

    /// Serializes a value as pretty JSON followed by a newline.
    #[must_use]
    pub fn to_json<T: Serialize>(self, value: &T) -> String {
        let mut out = serde_json::to_string_pretty(value)
            .unwrap_or_else(|e| format!(r#"{{"error": "serialization failed: {e}"}}"#));
        out.push('\n');
        out
    }
}
