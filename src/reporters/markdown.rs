//! Markdown reporter for pull request comments
//!
//! Renders a compact GitHub-flavored summary: grade, category table and the
//! violations grouped by severity.

use crate::models::{AuditResult, Grade, Severity, Violation};
use anyhow::Result;

/// Maximum violations to show per severity level
const MAX_PER_SEVERITY: usize = 10;

/// Render result as GitHub-flavored Markdown
pub fn render(result: &AuditResult) -> Result<String> {
    let mut md = String::new();
    md.push_str(&render_header(result));
    md.push('\n');
    md.push_str(&render_categories(result));
    md.push('\n');
    md.push_str(&render_violations(result));

    if !result.notes.is_empty() {
        md.push_str("\n## Notes\n\n");
        for note in &result.notes {
            md.push_str(&format!("- {}\n", note));
        }
    }
    Ok(md)
}

fn render_header(result: &AuditResult) -> String {
    let badge = match result.grade {
        Grade::A => "🏆",
        Grade::B => "⭐",
        Grade::C => "⚠️",
        Grade::D => "❌",
        Grade::F => "💀",
    };
    let status = match (result.passed, result.has_fatal_errors) {
        (true, _) => "✅ Passed",
        (false, true) => "❌ Failed (fatal violation)",
        (false, false) => "❌ Failed",
    };

    format!(
        r#"# {} API Contract Audit: `{}`

**Grade: {}** | **Score: {}/100** | {}

Audited {} rules at {}
"#,
        badge,
        result.file,
        result.grade,
        result.final_score,
        status,
        result.rules_evaluated,
        result.timestamp.format("%Y-%m-%d %H:%M:%S UTC")
    )
}

fn render_categories(result: &AuditResult) -> String {
    let mut md = String::from(
        "## Categories\n\n| Category | Weight | Violations | Points | Weighted |\n|----------|--------|------------|--------|----------|\n",
    );
    for score in result.category_breakdown.values() {
        md.push_str(&format!(
            "| {} | {:.0}% | {} | {:.1} | {:.2} |\n",
            capitalize(score.category.as_str()),
            score.weight * 100.0,
            score.violations.len(),
            score.points_deducted,
            score.points_deducted * score.weight
        ));
    }
    md
}

fn render_violations(result: &AuditResult) -> String {
    let mut md = String::from("## Violations\n\n");

    if result.violations.is_empty() {
        md.push_str("✅ No violations found.\n");
        return md;
    }

    for severity in Severity::ALL {
        let violations: Vec<&Violation> = result
            .violations
            .iter()
            .filter(|v| v.severity == severity)
            .collect();
        if violations.is_empty() {
            continue;
        }

        md.push_str(&format!(
            "### {} {} ({})\n\n",
            severity_emoji(severity),
            capitalize(severity.as_str()),
            violations.len()
        ));
        md.push_str("| Rule | Location | Message |\n|------|----------|---------|\n");
        for v in violations.iter().take(MAX_PER_SEVERITY) {
            md.push_str(&format!(
                "| `{}` | `{}` | {} |\n",
                v.rule_id,
                v.path,
                v.message.replace('|', "\\|")
            ));
        }

        let hidden = violations.len().saturating_sub(MAX_PER_SEVERITY);
        if hidden > 0 {
            md.push_str(&format!("\n*...and {} more*\n", hidden));
        }
        md.push('\n');
    }
    md
}

fn severity_emoji(severity: Severity) -> &'static str {
    match severity {
        Severity::Error => "🔴",
        Severity::Warn => "🟡",
        Severity::Info => "🔵",
        Severity::Hint => "ℹ️",
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        None => String::new(),
        Some(c) => c.to_uppercase().collect::<String>() + chars.as_str(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reporters::tests::test_result;

    #[test]
    fn test_markdown_header() {
        let md = render(&test_result()).unwrap();
        assert!(md.contains("**Grade: A** | **Score: 92/100** | ✅ Passed"));
        assert!(md.contains("`openapi.yaml`"));
    }

    #[test]
    fn test_markdown_category_table() {
        let md = render(&test_result()).unwrap();
        assert!(md.contains("| Security | 30% | 1 | 25.0 | 7.50 |"), "{}", md);
        assert!(md.contains("| Architecture | 10% | 0 | 0.0 | 0.00 |"));
    }

    #[test]
    fn test_markdown_groups_by_severity() {
        let md = render(&test_result()).unwrap();
        assert!(md.contains("### 🔴 Error (1)"));
        assert!(md.contains("### 🟡 Warn (1)"));
        assert!(!md.contains("Hint ("));
    }

    #[test]
    fn test_markdown_no_violations() {
        let mut result = test_result();
        result.violations.clear();
        assert!(render(&result).unwrap().contains("No violations found"));
    }
}
