//! Configuration for apigrade
//!
//! This module handles:
//! - Scoring configuration (weights, penalties, grading scale)
//! - Ruleset documents (declarative rule definitions)
//! - Discovery and loading, with built-in defaults

pub mod loader;
pub mod ruleset;
pub mod scoring;

pub use loader::{
    ConfigError, ConfigLoader, ConfigSources, LoadedConfig, BASELINE_EXTENDS, BUILTIN_RULESET,
    BUILTIN_SCORING, RULESET_FILE_NAMES, SCORING_FILE_NAMES,
};
pub use ruleset::{validate_ruleset, OneOrMany, RuleDefinition, RulesetDocument, ThenClause};
pub use scoring::{
    validate_scoring, CategoryWeights, GradeBand, GradingScale, Penalty, ScoringConfig,
    WEIGHT_SUM_TOLERANCE,
};
