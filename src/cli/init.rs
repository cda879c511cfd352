//! Init command - write starter configuration files

use anyhow::{Context, Result};
use apigrade::config::BUILTIN_SCORING;
use console::style;
use std::path::Path;
use std::process::ExitCode;

const STARTER_RULES: &str = r#"# apigrade rules
#
# The built-in rules always apply. Rules listed here are added, or replace
# the built-in rule with the same id entirely.

extends:
  - "apigrade:recommended"

rules: {}
  # com-info-contact:
  #   description: Contact details are optional for internal APIs
  #   severity: hint
  #   enabled: false
  #   given: $.info
  #   then:
  #     field: contact
  #     function: truthy
"#;

/// Run the init command
pub fn run(dir: &Path, force: bool) -> Result<ExitCode> {
    if !dir.exists() {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create {}", dir.display()))?;
    }
    if !dir.is_dir() {
        anyhow::bail!("Path is not a directory: {}", dir.display());
    }

    println!("\n{} Initializing apigrade\n", style("▸").bold());

    for (name, content) in [
        ("apigrade-scoring.toml", BUILTIN_SCORING),
        ("apigrade-rules.yaml", STARTER_RULES),
    ] {
        let path = dir.join(name);
        if path.exists() && !force {
            println!(
                "{} {} already exists (use --force to overwrite)",
                style("•").yellow(),
                style(path.display()).cyan()
            );
            continue;
        }
        std::fs::write(&path, content)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        println!("{} Created {}", style("✓").green(), style(path.display()).cyan());
    }

    println!(
        "\nRun {} to check your configuration.",
        style("apigrade validate-config").yellow()
    );
    Ok(ExitCode::SUCCESS)
}
