//! Validate-config command

use anyhow::Result;
use apigrade::config::ConfigLoader;
use console::style;
use std::process::ExitCode;

pub fn run(loader: &ConfigLoader) -> Result<ExitCode> {
    let config = match loader.load_all() {
        Ok(config) => config,
        Err(e) => {
            eprintln!(
                "{} {}",
                style("✗").red().bold(),
                style(e.path.display()).cyan()
            );
            for message in &e.messages {
                eprintln!("  - {}", message);
            }
            return Ok(ExitCode::from(2));
        }
    };

    let describe = |path: &Option<std::path::PathBuf>, fallback: &str| match path {
        Some(p) => p.display().to_string(),
        None => fallback.to_string(),
    };

    println!(
        "{} scoring: {}",
        style("✓").green(),
        style(describe(&config.sources.scoring, "built-in defaults")).cyan()
    );
    println!(
        "{} rules:   {}",
        style("✓").green(),
        style(describe(&config.sources.ruleset, "built-in baseline")).cyan()
    );
    for extra in &config.sources.extends {
        println!("  extends {}", style(extra.display()).dim());
    }
    println!(
        "\n{} rules ({} enabled), {} penalties, weights sum to {:.3}",
        config.ruleset.len(),
        config.ruleset.enabled().count(),
        config.scoring.penalties.len(),
        config.scoring.weights.sum()
    );

    Ok(ExitCode::SUCCESS)
}
