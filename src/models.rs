//! Core data models for apigrade
//!
//! These models are shared by the rule engine, the scorer and the
//! reporters. `AuditResult` is the sole output contract and serializes to
//! the flat camelCase JSON document consumed by CI annotations.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::str::FromStr;

/// Rule severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warn,
    Info,
    Hint,
}

impl Severity {
    pub const ALL: [Severity; 4] = [
        Severity::Error,
        Severity::Warn,
        Severity::Info,
        Severity::Hint,
    ];

    /// Numeric code used by the rule engine (0=error .. 3=hint)
    pub fn code(self) -> u8 {
        match self {
            Severity::Error => 0,
            Severity::Warn => 1,
            Severity::Info => 2,
            Severity::Hint => 3,
        }
    }

    /// Map an engine severity code back to a level. Codes above 3 are hints.
    pub fn from_code(code: u8) -> Self {
        match code {
            0 => Severity::Error,
            1 => Severity::Warn,
            2 => Severity::Info,
            _ => Severity::Hint,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Error => "error",
            Severity::Warn => "warn",
            Severity::Info => "info",
            Severity::Hint => "hint",
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "error" => Ok(Severity::Error),
            "warn" => Ok(Severity::Warn),
            "info" => Ok(Severity::Info),
            "hint" => Ok(Severity::Hint),
            other => Err(format!(
                "unknown severity '{}' (expected one of: error, warn, info, hint)",
                other
            )),
        }
    }
}

/// Quality categories used to group violations for weighted scoring
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Security,
    Completeness,
    Structure,
    Consistency,
    Architecture,
}

impl Category {
    /// Every configured weight category
    pub const ALL: [Category; 5] = [
        Category::Security,
        Category::Completeness,
        Category::Structure,
        Category::Consistency,
        Category::Architecture,
    ];

    /// Categories that violations can be classified into, in tag priority order
    pub const SCORED: [Category; 4] = [
        Category::Security,
        Category::Completeness,
        Category::Structure,
        Category::Consistency,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Category::Security => "security",
            Category::Completeness => "completeness",
            Category::Structure => "structure",
            Category::Consistency => "consistency",
            Category::Architecture => "architecture",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| format!("unknown category '{}'", s))
    }
}

/// Letter grades, best first
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Grade {
    A,
    B,
    C,
    D,
    F,
}

impl Grade {
    pub const ALL: [Grade; 5] = [Grade::A, Grade::B, Grade::C, Grade::D, Grade::F];

    pub fn as_str(self) -> &'static str {
        match self {
            Grade::A => "A",
            Grade::B => "B",
            Grade::C => "C",
            Grade::D => "D",
            Grade::F => "F",
        }
    }
}

impl std::fmt::Display for Grade {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Grade {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Grade::ALL
            .into_iter()
            .find(|g| g.as_str() == s)
            .ok_or_else(|| format!("unknown grade '{}'", s))
    }
}

/// Line/column of a finding in the source document (1-based)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceLocation {
    pub line: u32,
    pub column: u32,
}

/// A finding as reported by the rule engine, before scoring
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawFinding {
    /// Rule identifier
    pub code: String,
    /// 0=error, 1=warn, 2=info, 3=hint
    pub severity: u8,
    pub message: String,
    /// Path segments from the document root
    pub path: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub range: Option<SourceLocation>,
}

/// One reported rule-check failure against the audited document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Violation {
    pub rule_id: String,
    pub severity: Severity,
    pub message: String,
    /// Dotted location in the document
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column: Option<u32>,
}

impl From<RawFinding> for Violation {
    fn from(raw: RawFinding) -> Self {
        Self {
            rule_id: raw.code,
            severity: Severity::from_code(raw.severity),
            message: raw.message,
            path: raw.path.join("."),
            line: raw.range.map(|r| r.line),
            column: raw.range.map(|r| r.column),
        }
    }
}

/// Per-category share of the score
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryScore {
    pub category: Category,
    pub weight: f64,
    pub points_deducted: f64,
    pub violations: Vec<Violation>,
}

/// Violation counts by severity
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditSummary {
    pub total: usize,
    pub errors: usize,
    pub warnings: usize,
    pub infos: usize,
    pub hints: usize,
    /// Violations of rules configured as fatal
    pub fatal: usize,
}

impl AuditSummary {
    pub fn from_violations(violations: &[Violation], is_fatal: impl Fn(&str) -> bool) -> Self {
        let mut summary = Self::default();
        for v in violations {
            match v.severity {
                Severity::Error => summary.errors += 1,
                Severity::Warn => summary.warnings += 1,
                Severity::Info => summary.infos += 1,
                Severity::Hint => summary.hints += 1,
            }
            if is_fatal(&v.rule_id) {
                summary.fatal += 1;
            }
            summary.total += 1;
        }
        summary
    }
}

/// Terminal output of one audit run
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditResult {
    /// Audited document path
    pub file: String,
    pub final_score: u32,
    pub grade: Grade,
    pub passed: bool,
    pub has_fatal_errors: bool,
    pub violations: Vec<Violation>,
    pub category_breakdown: BTreeMap<Category, CategoryScore>,
    pub summary: AuditSummary,
    pub rules_evaluated: usize,
    pub timestamp: DateTime<Utc>,
    /// Wall-clock duration in milliseconds
    pub duration: u64,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub notes: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_codes() {
        for s in Severity::ALL {
            assert_eq!(Severity::from_code(s.code()), s);
        }
        assert_eq!(Severity::from_code(9), Severity::Hint);
        assert!("fatal".parse::<Severity>().is_err());
    }

    #[test]
    fn test_violation_from_raw_finding() {
        let raw = RawFinding {
            code: "com-info-contact".to_string(),
            severity: 1,
            message: "Info object should have a contact".to_string(),
            path: vec!["info".to_string(), "contact".to_string()],
            range: Some(SourceLocation { line: 3, column: 5 }),
        };
        let v = Violation::from(raw);
        assert_eq!(v.rule_id, "com-info-contact");
        assert_eq!(v.severity, Severity::Warn);
        assert_eq!(v.path, "info.contact");
        assert_eq!(v.line, Some(3));
        assert_eq!(v.column, Some(5));
    }

    #[test]
    fn test_violation_serializes_camel_case() {
        let v = Violation {
            rule_id: "sec-https-only".to_string(),
            severity: Severity::Error,
            message: "m".to_string(),
            path: "servers.0.url".to_string(),
            line: None,
            column: None,
        };
        let json = serde_json::to_value(&v).expect("serialize");
        assert_eq!(json["ruleId"], "sec-https-only");
        assert_eq!(json["severity"], "error");
        assert!(json.get("line").is_none());
    }

    #[test]
    fn test_summary_counts() {
        let mk = |id: &str, severity| Violation {
            rule_id: id.to_string(),
            severity,
            message: String::new(),
            path: String::new(),
            line: None,
            column: None,
        };
        let violations = vec![
            mk("a", Severity::Error),
            mk("b", Severity::Warn),
            mk("b", Severity::Warn),
            mk("c", Severity::Hint),
        ];
        let summary = AuditSummary::from_violations(&violations, |id| id == "b");
        assert_eq!(summary.total, 4);
        assert_eq!(summary.errors, 1);
        assert_eq!(summary.warnings, 2);
        assert_eq!(summary.infos, 0);
        assert_eq!(summary.hints, 1);
        assert_eq!(summary.fatal, 2);
    }

    #[test]
    fn test_category_round_trip_names() {
        for c in Category::ALL {
            assert_eq!(c.as_str().parse::<Category>(), Ok(c));
        }
        assert_eq!(Grade::F.to_string(), "F");
    }
}
