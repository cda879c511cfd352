//! Output reporters for audit results
//!
//! Supports multiple output formats:
//! - `text` - Terminal output with colors
//! - `json` - The flat `AuditResult` document for CI tooling
//! - `markdown` - GitHub-flavored Markdown for pull request comments

mod json;
mod markdown;
mod text;

use crate::models::AuditResult;
use anyhow::{anyhow, Result};
use std::str::FromStr;

/// Supported output formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
    Markdown,
}

impl FromStr for OutputFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" | "txt" | "terminal" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            "markdown" | "md" => Ok(OutputFormat::Markdown),
            _ => Err(anyhow!(
                "Unknown format '{}'. Valid formats: text, json, markdown",
                s
            )),
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Markdown => write!(f, "markdown"),
        }
    }
}

/// Render an audit result in the specified format
pub fn report(result: &AuditResult, format: &str) -> Result<String> {
    let fmt = OutputFormat::from_str(format)?;
    report_with_format(result, fmt)
}

/// Render an audit result using an OutputFormat enum
pub fn report_with_format(result: &AuditResult, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Text => text::render(result),
        OutputFormat::Json => json::render(result),
        OutputFormat::Markdown => markdown::render(result),
    }
}

/// Get the recommended file extension for a format
pub fn file_extension(format: OutputFormat) -> &'static str {
    match format {
        OutputFormat::Text => "txt",
        OutputFormat::Json => "json",
        OutputFormat::Markdown => "md",
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::models::{AuditSummary, Category, CategoryScore, Grade, Severity, Violation};
    use chrono::{TimeZone, Utc};
    use std::collections::BTreeMap;

    /// Create a small AuditResult for testing
    pub(crate) fn test_result() -> AuditResult {
        let violations = vec![
            Violation {
                rule_id: "sec-https-only".into(),
                severity: Severity::Error,
                message: "Server URLs must use HTTPS".into(),
                path: "servers.0.url".into(),
                line: None,
                column: None,
            },
            Violation {
                rule_id: "com-info-contact".into(),
                severity: Severity::Warn,
                message: "Info object should include contact details".into(),
                path: "info.contact".into(),
                line: Some(4),
                column: Some(3),
            },
        ];

        let weights = [
            (Category::Security, 0.30, 25.0, vec![violations[0].clone()]),
            (Category::Completeness, 0.25, 3.0, vec![violations[1].clone()]),
            (Category::Structure, 0.20, 0.0, vec![]),
            (Category::Consistency, 0.15, 0.0, vec![]),
            (Category::Architecture, 0.10, 0.0, vec![]),
        ];
        let category_breakdown: BTreeMap<Category, CategoryScore> = weights
            .into_iter()
            .map(|(category, weight, points_deducted, violations)| {
                (
                    category,
                    CategoryScore {
                        category,
                        weight,
                        points_deducted,
                        violations,
                    },
                )
            })
            .collect();

        AuditResult {
            file: "openapi.yaml".into(),
            final_score: 92,
            grade: Grade::A,
            passed: true,
            has_fatal_errors: false,
            summary: AuditSummary::from_violations(&violations, |_| false),
            violations,
            category_breakdown,
            rules_evaluated: 16,
            timestamp: Utc.with_ymd_and_hms(2026, 1, 2, 3, 4, 5).unwrap(),
            duration: 12,
            notes: vec![],
        }
    }

    #[test]
    fn test_format_parsing() {
        assert_eq!(OutputFormat::from_str("text").unwrap(), OutputFormat::Text);
        assert_eq!(OutputFormat::from_str("JSON").unwrap(), OutputFormat::Json);
        assert_eq!(
            OutputFormat::from_str("md").unwrap(),
            OutputFormat::Markdown
        );
        assert!(OutputFormat::from_str("sarif").is_err());
    }

    #[test]
    fn test_file_extension() {
        assert_eq!(file_extension(OutputFormat::Text), "txt");
        assert_eq!(file_extension(OutputFormat::Markdown), "md");
    }

    #[test]
    fn test_report_by_name() {
        let out = report(&test_result(), "json").unwrap();
        assert!(out.contains("\"finalScore\": 92"));
    }
}
