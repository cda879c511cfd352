//! Audit command - grade one contract document

use anyhow::{Context, Result};
use apigrade::audit::Auditor;
use apigrade::config::ConfigLoader;
use apigrade::models::{AuditResult, Grade};
use apigrade::reporters::{self, OutputFormat};
use console::style;
use std::path::Path;
use std::process::ExitCode;
use std::str::FromStr;
use std::sync::Arc;

pub fn run(
    loader: &ConfigLoader,
    file: &Path,
    format: &str,
    output: Option<&Path>,
    min_grade: Option<Grade>,
) -> Result<ExitCode> {
    let format = OutputFormat::from_str(format)?;
    let config = loader.load_all().context("Failed to load configuration")?;
    let auditor = Auditor::new(Arc::new(config));

    let result = auditor
        .audit(file)
        .with_context(|| format!("Audit failed for {}", file.display()))?;

    let rendered = reporters::report_with_format(&result, format)?;
    match output {
        Some(path) => {
            // `-o report` picks up the format's extension
            let path = if path.extension().is_none() {
                path.with_extension(reporters::file_extension(format))
            } else {
                path.to_path_buf()
            };
            let plain = console::strip_ansi_codes(&rendered);
            std::fs::write(&path, plain.as_bytes())
                .with_context(|| format!("Failed to write report to {}", path.display()))?;
            eprintln!("Report written to: {}", style(path.display()).cyan());
        }
        None if format == OutputFormat::Text && !console::colors_enabled() => {
            println!("{}", console::strip_ansi_codes(&rendered));
        }
        None => println!("{}", rendered),
    }

    if gate_passes(&result, min_grade) {
        Ok(ExitCode::SUCCESS)
    } else {
        if let Some(min) = min_grade.filter(|_| result.passed) {
            eprintln!("Failing because grade {} is below --min-grade {}", result.grade, min);
        }
        Ok(ExitCode::from(1))
    }
}

/// Passed, and at least `min_grade` when one is given
fn gate_passes(result: &AuditResult, min_grade: Option<Grade>) -> bool {
    result.passed && min_grade.map_or(true, |min| result.grade <= min)
}
