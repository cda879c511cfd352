//! Configuration discovery and loading
//!
//! Looks in a config directory for a scoring file and a ruleset file:
//!
//! - `apigrade-scoring.toml`, `apigrade-scoring.json`, `apigrade-scoring.yaml|yml`
//! - `apigrade-rules.yaml|yml`, `apigrade-rules.json`, `apigrade-rules.toml`
//!
//! The first match of each wins. A missing file falls back to the built-in
//! default; a present but invalid file is an error. User rules are merged
//! over the built-in baseline, so a ruleset file only needs the rules it
//! adds or replaces.
//!
//! Loading produces an immutable `LoadedConfig`. `LoadedConfig::reload`
//! re-reads the same sources into a fresh value.

use crate::config::ruleset::{validate_ruleset, RulesetDocument};
use crate::config::scoring::{validate_scoring, ScoringConfig};
use crate::document::DocumentFormat;
use crate::rules::resolver::{merge_rulesets, resolve_ruleset, ResolvedRuleset};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Built-in scoring configuration
pub const BUILTIN_SCORING: &str = include_str!("defaults/apigrade-scoring.toml");

/// Built-in baseline ruleset
pub const BUILTIN_RULESET: &str = include_str!("defaults/apigrade-rules.yaml");

pub const SCORING_FILE_NAMES: &[&str] = &[
    "apigrade-scoring.toml",
    "apigrade-scoring.json",
    "apigrade-scoring.yaml",
    "apigrade-scoring.yml",
];

pub const RULESET_FILE_NAMES: &[&str] = &[
    "apigrade-rules.yaml",
    "apigrade-rules.yml",
    "apigrade-rules.json",
    "apigrade-rules.toml",
];

/// `extends` entry naming the built-in baseline
pub const BASELINE_EXTENDS: &str = "apigrade:recommended";

const BUILTIN_SOURCE: &str = "<builtin>";

/// A configuration file that could not be loaded
#[derive(Debug, Error)]
#[error("invalid configuration in {}: {}", path.display(), messages.join("; "))]
pub struct ConfigError {
    pub path: PathBuf,
    pub messages: Vec<String>,
}

impl ConfigError {
    fn new(path: &Path, messages: Vec<String>) -> Self {
        Self {
            path: path.to_path_buf(),
            messages,
        }
    }

    fn single(path: &Path, message: impl Into<String>) -> Self {
        Self::new(path, vec![message.into()])
    }
}

/// Where each part of a loaded configuration came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigSources {
    /// `None` means the built-in scoring
    pub scoring: Option<PathBuf>,
    /// `None` means the baseline ruleset alone
    pub ruleset: Option<PathBuf>,
    /// Extra ruleset files pulled in through `extends`
    pub extends: Vec<PathBuf>,
}

/// Validated configuration, shared read-only between audits
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub scoring: ScoringConfig,
    pub ruleset: ResolvedRuleset,
    pub sources: ConfigSources,
    loader: ConfigLoader,
}

impl LoadedConfig {
    /// Re-read the same sources into a new value
    pub fn reload(&self) -> Result<LoadedConfig, ConfigError> {
        info!("Reloading configuration");
        self.loader.load_all()
    }
}

/// Finds and loads configuration files
#[derive(Debug, Clone, Default)]
pub struct ConfigLoader {
    dir: Option<PathBuf>,
    scoring_file: Option<PathBuf>,
    ruleset_file: Option<PathBuf>,
}

impl ConfigLoader {
    /// Search `dir` for configuration files
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: Some(dir.into()),
            ..Self::default()
        }
    }

    /// Built-in configuration only
    pub fn builtin() -> Self {
        Self::default()
    }

    /// Use this scoring file instead of searching. It must exist.
    pub fn with_scoring_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.scoring_file = Some(path.into());
        self
    }

    /// Use this ruleset file instead of searching. It must exist.
    pub fn with_ruleset_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.ruleset_file = Some(path.into());
        self
    }

    pub fn scoring_path(&self) -> Option<PathBuf> {
        self.scoring_file
            .clone()
            .or_else(|| self.find(SCORING_FILE_NAMES))
    }

    pub fn ruleset_path(&self) -> Option<PathBuf> {
        self.ruleset_file
            .clone()
            .or_else(|| self.find(RULESET_FILE_NAMES))
    }

    fn find(&self, names: &[&str]) -> Option<PathBuf> {
        let dir = self.dir.as_ref()?;
        names.iter().map(|name| dir.join(name)).find(|p| p.is_file())
    }

    /// Load, validate and resolve scoring and rules
    pub fn load_all(&self) -> Result<LoadedConfig, ConfigError> {
        let scoring_path = self.scoring_path();
        let scoring = self.load_scoring(scoring_path.as_deref())?;

        let ruleset_path = self.ruleset_path();
        let (ruleset, extends) = self.load_ruleset(ruleset_path.as_deref())?;

        for rule_id in scoring.penalties.keys() {
            if ruleset.get(rule_id).is_none() {
                warn!("Penalty configured for unknown rule '{}'", rule_id);
            }
        }

        info!(
            "Loaded {} rules ({} enabled)",
            ruleset.len(),
            ruleset.enabled().count()
        );

        Ok(LoadedConfig {
            scoring,
            ruleset,
            sources: ConfigSources {
                scoring: scoring_path,
                ruleset: ruleset_path,
                extends,
            },
            loader: self.clone(),
        })
    }

    fn load_scoring(&self, path: Option<&Path>) -> Result<ScoringConfig, ConfigError> {
        let (value, source) = match path {
            Some(path) => {
                debug!("Loading scoring config from {}", path.display());
                (read_config_file(path)?, path.to_path_buf())
            }
            None => {
                debug!("No scoring config found, using built-in defaults");
                (
                    parse_builtin(BUILTIN_SCORING, DocumentFormat::Toml)?,
                    PathBuf::from(BUILTIN_SOURCE),
                )
            }
        };
        validate_scoring(&value).map_err(|messages| ConfigError::new(&source, messages))
    }

    fn load_ruleset(
        &self,
        path: Option<&Path>,
    ) -> Result<(ResolvedRuleset, Vec<PathBuf>), ConfigError> {
        let builtin = Path::new(BUILTIN_SOURCE);
        let baseline = validate_ruleset(&parse_builtin(BUILTIN_RULESET, DocumentFormat::Yaml)?)
            .map_err(|messages| ConfigError::new(builtin, messages))?;

        let Some(path) = path else {
            debug!("No ruleset found, using the baseline rules");
            let resolved = resolve_ruleset(baseline)
                .map_err(|e| ConfigError::single(builtin, e.to_string()))?;
            return Ok((resolved, Vec::new()));
        };

        debug!("Loading ruleset from {}", path.display());
        let custom = read_ruleset_file(path)?;
        let base_dir = path.parent().unwrap_or_else(|| Path::new("."));

        let mut merged = baseline;
        let mut extended = Vec::new();
        for entry in &custom.extends {
            if entry == BASELINE_EXTENDS {
                continue;
            }
            if entry.starts_with("apigrade:") {
                return Err(ConfigError::single(
                    path,
                    format!("extends: unknown preset '{}' (expected {})", entry, BASELINE_EXTENDS),
                ));
            }
            let extra_path = base_dir.join(entry);
            if !extra_path.is_file() {
                return Err(ConfigError::single(
                    path,
                    format!("extends: '{}' not found at {}", entry, extra_path.display()),
                ));
            }
            debug!("Extending ruleset with {}", extra_path.display());
            let extra = read_ruleset_file(&extra_path)?;
            // Bind here so a bad rule is reported against the file that defines it
            resolve_ruleset(extra.clone())
                .map_err(|e| ConfigError::single(&extra_path, e.to_string()))?;
            if !extra.extends.is_empty() {
                warn!(
                    "Ignoring nested extends in {}; only the top-level ruleset may extend",
                    extra_path.display()
                );
            }
            merged = merge_rulesets(merged, extra);
            extended.push(extra_path);
        }

        let merged = merge_rulesets(merged, custom);
        let resolved =
            resolve_ruleset(merged).map_err(|e| ConfigError::single(path, e.to_string()))?;
        Ok((resolved, extended))
    }
}

fn read_config_file(path: &Path) -> Result<serde_json::Value, ConfigError> {
    if !path.is_file() {
        return Err(ConfigError::single(path, "file not found"));
    }
    let text = std::fs::read_to_string(path)
        .map_err(|e| ConfigError::single(path, format!("failed to read: {}", e)))?;
    let format = DocumentFormat::from_path(path);
    format
        .parse(&text)
        .map_err(|e| ConfigError::single(path, format!("invalid {}: {}", format.as_str(), e)))
}

fn read_ruleset_file(path: &Path) -> Result<RulesetDocument, ConfigError> {
    let value = read_config_file(path)?;
    validate_ruleset(&value).map_err(|messages| ConfigError::new(path, messages))
}

fn parse_builtin(text: &str, format: DocumentFormat) -> Result<serde_json::Value, ConfigError> {
    format
        .parse(text)
        .map_err(|e| ConfigError::single(Path::new(BUILTIN_SOURCE), e))
}
