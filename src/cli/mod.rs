//! CLI command definitions and handlers

mod audit;
mod init;
mod rules;
mod validate;

use anyhow::Result;
use apigrade::config::ConfigLoader;
use apigrade::models::Grade;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

/// apigrade - OpenAPI contract quality gate
#[derive(Parser, Debug)]
#[command(name = "apigrade")]
#[command(
    version,
    about = "Audit OpenAPI contracts against a rule set and grade them A-F",
    long_about = "apigrade runs declarative rules against an OpenAPI document, groups the \
violations into weighted quality categories (security, completeness, structure, \
consistency) and turns them into a 0-100 score and a letter grade.\n\n\
Exit codes: 0 passed, 1 audit failed, 2 configuration or input error.",
    after_help = "\
Examples:
  apigrade audit openapi.yaml                     Audit with the built-in rules
  apigrade audit openapi.yaml --format json       Machine-readable result
  apigrade audit api.json --min-grade B           Fail the build below a B
  apigrade audit api.yaml -f md -o comment.md     Markdown for a PR comment
  apigrade init                                   Write starter config files
  apigrade validate-config --config-dir ci/       Check config without auditing
  apigrade rules                                  List rules and their categories"
)]
pub struct Cli {
    /// Directory searched for apigrade-scoring.* and apigrade-rules.*
    #[arg(long, global = true, default_value = ".", env = "APIGRADE_CONFIG_DIR")]
    pub config_dir: PathBuf,

    /// Scoring file to use instead of searching the config directory
    #[arg(long, global = true)]
    pub scoring: Option<PathBuf>,

    /// Ruleset file to use instead of searching the config directory
    #[arg(long, global = true)]
    pub rules: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace); RUST_LOG takes precedence
    #[arg(
        long,
        global = true,
        default_value = "warn",
        value_parser = ["error", "warn", "info", "debug", "trace"]
    )]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Audit a contract document and print its grade
    #[command(after_help = "\
Examples:
  apigrade audit openapi.yaml
  apigrade audit openapi.yaml --format json --output result.json
  apigrade audit openapi.yaml --min-grade C")]
    Audit {
        /// OpenAPI document (YAML or JSON)
        file: PathBuf,

        /// Output format: text, json, markdown (or md)
        #[arg(
            long,
            short = 'f',
            default_value = "text",
            value_parser = ["text", "json", "markdown", "md"]
        )]
        format: String,

        /// Write the report to a file instead of stdout
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,

        /// Also fail when the grade is worse than this (A, B, C, D)
        #[arg(long, value_parser = parse_grade)]
        min_grade: Option<Grade>,
    },

    /// Validate configuration files without auditing anything
    ValidateConfig,

    /// Write starter configuration files to the config directory
    Init {
        /// Overwrite existing files
        #[arg(long)]
        force: bool,
    },

    /// List the merged rules with category, severity and penalty
    Rules {
        /// Output format: text or json
        #[arg(long, short = 'f', default_value = "text", value_parser = ["text", "json"])]
        format: String,
    },
}

fn parse_grade(s: &str) -> Result<Grade, String> {
    s.to_uppercase().parse::<Grade>()
}

/// Loader honoring the global config flags
pub(crate) fn config_loader(
    config_dir: &Path,
    scoring: Option<&Path>,
    rules: Option<&Path>,
) -> ConfigLoader {
    let mut loader = ConfigLoader::new(config_dir);
    if let Some(path) = scoring {
        loader = loader.with_scoring_file(path);
    }
    if let Some(path) = rules {
        loader = loader.with_ruleset_file(path);
    }
    loader
}

pub fn run(cli: Cli) -> Result<ExitCode> {
    let loader = config_loader(&cli.config_dir, cli.scoring.as_deref(), cli.rules.as_deref());

    match cli.command {
        Commands::Audit {
            file,
            format,
            output,
            min_grade,
        } => audit::run(&loader, &file, &format, output.as_deref(), min_grade),
        Commands::ValidateConfig => validate::run(&loader),
        Commands::Init { force } => init::run(&cli.config_dir, force),
        Commands::Rules { format } => rules::run(&loader, &format),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_audit_args() {
        let cli = Cli::try_parse_from([
            "apigrade",
            "audit",
            "api.yaml",
            "-f",
            "json",
            "--min-grade",
            "b",
        ])
        .unwrap();
        match cli.command {
            Commands::Audit { file, format, min_grade, .. } => {
                assert_eq!(file, PathBuf::from("api.yaml"));
                assert_eq!(format, "json");
                assert_eq!(min_grade, Some(Grade::B));
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_bad_grade_rejected() {
        let parsed = Cli::try_parse_from(["apigrade", "audit", "api.yaml", "--min-grade", "Z"]);
        assert!(parsed.is_err());
    }
}
