//! Rules command - list the merged ruleset

use anyhow::{Context, Result};
use apigrade::config::{ConfigLoader, LoadedConfig};
use apigrade::models::Category;
use apigrade::scoring::{classify, default_points};
use console::style;
use serde::Serialize;
use std::process::ExitCode;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RuleRow {
    id: String,
    category: Category,
    severity: String,
    enabled: bool,
    points: f64,
    fatal: bool,
    description: String,
}

fn rows(config: &LoadedConfig) -> Vec<RuleRow> {
    config
        .ruleset
        .iter()
        .map(|rule| {
            let penalty = config.scoring.penalty(&rule.id);
            RuleRow {
                id: rule.id.clone(),
                category: classify(&rule.id, &rule.definition.tags),
                severity: rule.definition.severity.to_string(),
                enabled: rule.definition.enabled,
                points: penalty
                    .map(|p| p.points)
                    .unwrap_or_else(|| default_points(rule.definition.severity)),
                fatal: penalty.is_some_and(|p| p.fatal),
                description: rule.definition.description.clone(),
            }
        })
        .collect()
}

pub fn run(loader: &ConfigLoader, format: &str) -> Result<ExitCode> {
    let config = loader.load_all().context("Failed to load configuration")?;
    let rows = rows(&config);

    if format == "json" {
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(ExitCode::SUCCESS);
    }

    println!(
        "{}",
        style(format!(
            "{:<32} {:<13} {:<6} {:>6}  DESCRIPTION",
            "RULE", "CATEGORY", "SEV", "POINTS"
        ))
        .dim()
    );
    for row in &rows {
        let mut points = format!("{:>6.1}", row.points);
        if row.fatal {
            points = style(points).red().bold().to_string();
        }
        let id = if row.enabled {
            style(format!("{:<32}", row.id)).to_string()
        } else {
            style(format!("{:<32}", row.id)).dim().to_string()
        };
        println!(
            "{} {:<13} {:<6} {}  {}",
            id,
            row.category.as_str(),
            row.severity,
            points,
            row.description
        );
    }
    Ok(ExitCode::SUCCESS)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rows_for_builtin_rules() {
        let config = ConfigLoader::builtin().load_all().unwrap();
        let rows = rows(&config);
        assert_eq!(rows.len(), config.ruleset.len());
        let version = rows.iter().find(|r| r.id == "str-openapi-version").unwrap();
        assert!(version.fatal);
        assert_eq!(version.category, Category::Structure);
        assert!(rows.iter().all(|r| r.category != Category::Architecture));
    }
}
