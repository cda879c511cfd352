//! Text (terminal) reporter with colors and formatting

use crate::models::{AuditResult, Grade, Severity, Violation};
use anyhow::Result;

/// Grade colors (ANSI escape codes)
fn grade_color(grade: Grade) -> &'static str {
    match grade {
        Grade::A => "\x1b[32m", // Green
        Grade::B => "\x1b[92m", // Light green
        Grade::C => "\x1b[33m", // Yellow
        Grade::D => "\x1b[91m", // Light red
        Grade::F => "\x1b[31m", // Red
    }
}

fn severity_color(severity: Severity) -> &'static str {
    match severity {
        Severity::Error => "\x1b[31m",
        Severity::Warn => "\x1b[33m",
        Severity::Info => "\x1b[34m",
        Severity::Hint => "\x1b[90m",
    }
}

const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const DIM: &str = "\x1b[2m";

/// Violations listed before truncating
const MAX_LISTED: usize = 25;

fn severity_tag(severity: Severity) -> &'static str {
    match severity {
        Severity::Error => "[E]",
        Severity::Warn => "[W]",
        Severity::Info => "[I]",
        Severity::Hint => "[H]",
    }
}

/// Render result as formatted terminal output
pub fn render(result: &AuditResult) -> Result<String> {
    let mut out = String::new();

    // Header
    let grade_c = grade_color(result.grade);
    out.push_str(&format!("\n{BOLD}API Contract Audit{RESET}  {DIM}{}{RESET}\n", result.file));
    out.push_str(&format!(
        "{DIM}──────────────────────────────────────{RESET}\n"
    ));
    out.push_str(&format!(
        "Score: {BOLD}{}/100{RESET}  Grade: {grade_c}{BOLD}{}{RESET}  ",
        result.final_score, result.grade
    ));
    let status = if result.passed {
        "\x1b[32mPASSED\x1b[0m".to_string()
    } else if result.has_fatal_errors {
        "\x1b[31mFAILED (fatal violation)\x1b[0m".to_string()
    } else {
        "\x1b[31mFAILED\x1b[0m".to_string()
    };
    out.push_str(&format!(
        "{}  {DIM}{} rules in {}ms{RESET}\n\n",
        status, result.rules_evaluated, result.duration
    ));

    // Category breakdown
    out.push_str(&format!("{BOLD}CATEGORIES{RESET}\n"));
    for score in result.category_breakdown.values() {
        let deducted = if score.points_deducted > 0.0 {
            format!(
                "\x1b[33m-{:.1} pts{RESET} {DIM}(x {:.2} = -{:.2}){RESET}",
                score.points_deducted,
                score.weight,
                score.points_deducted * score.weight
            )
        } else {
            format!("{DIM}-0 pts{RESET}")
        };
        out.push_str(&format!(
            "  {:<14} {DIM}weight {:.2}{RESET}  {:>3} violations  {}\n",
            score.category.as_str(),
            score.weight,
            score.violations.len(),
            deducted
        ));
    }
    out.push('\n');

    // Violations summary
    let s = &result.summary;
    out.push_str(&format!("{BOLD}VIOLATIONS{RESET} ({} total)\n", s.total));

    let mut summary_parts = Vec::new();
    if s.fatal > 0 {
        summary_parts.push(format!("\x1b[31m{BOLD}{} fatal{RESET}", s.fatal));
    }
    if s.errors > 0 {
        summary_parts.push(format!("\x1b[31m{} errors{RESET}", s.errors));
    }
    if s.warnings > 0 {
        summary_parts.push(format!("\x1b[33m{} warnings{RESET}", s.warnings));
    }
    if s.infos > 0 {
        summary_parts.push(format!("\x1b[34m{} info{RESET}", s.infos));
    }
    if s.hints > 0 {
        summary_parts.push(format!("\x1b[90m{} hints{RESET}", s.hints));
    }
    if !summary_parts.is_empty() {
        out.push_str(&format!("  {}\n\n", summary_parts.join(" | ")));
    }

    if !result.violations.is_empty() {
        out.push_str(&format!(
            "{DIM}  SEV  RULE                          LOCATION{RESET}\n"
        ));
        out.push_str(&format!(
            "{DIM}  ─────────────────────────────────────────────────────────────────{RESET}\n"
        ));

        for violation in result.violations.iter().take(MAX_LISTED) {
            let sev_c = severity_color(violation.severity);
            out.push_str(&format!(
                "  {sev_c}{}{RESET}  {:<28}  {DIM}{}{RESET}\n",
                severity_tag(violation.severity),
                violation.rule_id,
                format_location(violation)
            ));
            out.push_str(&format!("       {}\n", violation.message));
        }

        let remaining = result.violations.len().saturating_sub(MAX_LISTED);
        if remaining > 0 {
            out.push_str(&format!(
                "\n  {DIM}...and {} more (use --format json for the full list){RESET}\n",
                remaining
            ));
        }
        out.push('\n');
    }

    for note in &result.notes {
        out.push_str(&format!("\x1b[33mnote:{RESET} {}\n", note));
    }

    Ok(out)
}

/// Dotted path, with line/column when the engine reported one
fn format_location(violation: &Violation) -> String {
    let path = if violation.path.chars().count() > 40 {
        let skip = violation.path.chars().count() - 37;
        format!("...{}", violation.path.chars().skip(skip).collect::<String>())
    } else if violation.path.is_empty() {
        "$".to_string()
    } else {
        violation.path.clone()
    };
    match (violation.line, violation.column) {
        (Some(line), Some(column)) => format!("{} ({}:{})", path, line, column),
        (Some(line), None) => format!("{} ({})", path, line),
        _ => path,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reporters::tests::test_result;

    #[test]
    fn test_text_render_contains_score_and_rules() {
        let out = render(&test_result()).unwrap();
        let plain = console::strip_ansi_codes(&out);
        assert!(plain.contains("Score: 92/100"));
        assert!(plain.contains("Grade: A"));
        assert!(plain.contains("PASSED"));
        assert!(plain.contains("sec-https-only"));
        assert!(plain.contains("info.contact (4:3)"));
        assert!(plain.contains("architecture"));
    }

    #[test]
    fn test_text_render_fatal_and_notes() {
        let mut result = test_result();
        result.passed = false;
        result.has_fatal_errors = true;
        result.notes.push("Reference resolution failed".into());
        let plain = console::strip_ansi_codes(&render(&result).unwrap()).to_string();
        assert!(plain.contains("FAILED (fatal violation)"));
        assert!(plain.contains("note: Reference resolution failed"));
    }

    #[test]
    fn test_long_paths_truncated() {
        let mut v = test_result().violations[0].clone();
        v.path = "paths./a/very/long/path/that/keeps/going/and/going.get.responses".into();
        let loc = format_location(&v);
        assert!(loc.starts_with("..."));
        assert_eq!(loc.chars().count(), 40);
    }
}
