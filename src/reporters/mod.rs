//! Output reporters for `funcloc analyze`
//!
//! - `text` - Terminal table with category colors
//! - `json` - Machine-readable JSON

mod json;
mod text;

use crate::models::AnalysisReport;
use anyhow::{anyhow, Result};
use std::str::FromStr;

/// Supported output formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl FromStr for OutputFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" | "txt" | "terminal" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            _ => Err(anyhow!("Unknown format '{}'. Valid formats: text, json", s)),
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

/// Render an analysis report in the specified format
pub fn report(report: &AnalysisReport, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Text => text::render(report),
        OutputFormat::Json => json::render(report),
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::models::{Category, FunctionMetric, Position, Range};

    /// Two files, one function per tier plus an empty file
    pub(crate) fn test_report() -> AnalysisReport {
        let metric = |name: &str, line: u32, loc: u32| FunctionMetric {
            name: name.to_string(),
            range: Range::lines(line, line + loc + 1),
            signature_position: Position::new(line, 12),
            loc,
        };
        AnalysisReport::new(
            vec![
                (
                    "src/parser.rs".to_string(),
                    Some("rust".to_string()),
                    vec![
                        metric("parse", 4, 12),
                        metric("parse_expr", 30, 48),
                        metric("parse_stmt", 90, 75),
                    ],
                ),
                ("src/empty.py".to_string(), Some("python".to_string()), vec![]),
            ],
            Category::Low,
        )
    }

    #[test]
    fn test_format_parsing() {
        assert_eq!(OutputFormat::from_str("text").unwrap(), OutputFormat::Text);
        assert_eq!(OutputFormat::from_str("JSON").unwrap(), OutputFormat::Json);
        assert!(OutputFormat::from_str("sarif").is_err());
        assert_eq!(OutputFormat::Json.to_string(), "json");
    }
}
