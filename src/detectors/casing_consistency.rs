//! Casing Consistency Detector
//!
//! Property-level casing rules see one key at a time. This detector looks
//! at a whole subtree and reports when its property names mix camelCase
//! and snake_case in significant proportion:
//!
//! - Schema keywords (`type`, `format`, ...) are not counted, but the values
//!   of `properties` and `items` are still descended into
//! - Keys matching neither style count toward the total only
//! - Subtrees with 5 or fewer keys are never judged
//! - A minority share above 20% produces exactly one finding

use regex::Regex;
use serde_json::Value;
use std::sync::OnceLock;
use tracing::debug;

/// Schema keywords that are not user-defined names
const IGNORED_KEYS: &[&str] = &[
    "type",
    "format",
    "properties",
    "items",
    "required",
    "description",
    "example",
    "examples",
];

/// Ignored keys whose values still hold user-defined names
const DESCEND_KEYS: &[&str] = &["properties", "items"];

/// Subtrees with this many keys or fewer are too small to judge
const MIN_KEYS: usize = 5;

/// Largest tolerated minority share
const MAX_MINORITY_RATIO: f64 = 0.20;

static CAMEL_CASE: OnceLock<Regex> = OnceLock::new();
static SNAKE_CASE: OnceLock<Regex> = OnceLock::new();

fn camel_case() -> &'static Regex {
    CAMEL_CASE.get_or_init(|| Regex::new(r"^[a-z][a-zA-Z0-9]*$").unwrap())
}

fn snake_case() -> &'static Regex {
    SNAKE_CASE.get_or_init(|| Regex::new(r"^[a-z][a-z0-9]*(_[a-z][a-z0-9]*)*$").unwrap())
}

/// Naming convention of a key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NamingStyle {
    CamelCase,
    SnakeCase,
}

impl NamingStyle {
    pub fn as_str(self) -> &'static str {
        match self {
            NamingStyle::CamelCase => "camelCase",
            NamingStyle::SnakeCase => "snake_case",
        }
    }
}

impl std::fmt::Display for NamingStyle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classify a key. `None` for keys that follow neither convention.
pub fn classify_key(key: &str) -> Option<NamingStyle> {
    if !key.contains('_') && camel_case().is_match(key) {
        Some(NamingStyle::CamelCase)
    } else if key.contains('_') && snake_case().is_match(key) {
        Some(NamingStyle::SnakeCase)
    } else {
        None
    }
}

/// Key counts gathered over a subtree
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CasingStats {
    /// Every counted key, including ones matching neither style
    pub total: usize,
    pub camel: usize,
    pub snake: usize,
}

impl CasingStats {
    /// Walk a subtree and count its keys
    pub fn collect(value: &Value) -> Self {
        let mut stats = Self::default();
        stats.walk(value);
        stats
    }

    fn walk(&mut self, value: &Value) {
        match value {
            Value::Object(map) => {
                for (key, child) in map {
                    if IGNORED_KEYS.contains(&key.as_str()) {
                        if DESCEND_KEYS.contains(&key.as_str()) {
                            self.walk(child);
                        }
                        continue;
                    }

                    self.total += 1;
                    match classify_key(key) {
                        Some(NamingStyle::CamelCase) => self.camel += 1,
                        Some(NamingStyle::SnakeCase) => self.snake += 1,
                        None => {}
                    }
                    self.walk(child);
                }
            }
            // Indices are not names
            Value::Array(items) => {
                for item in items {
                    self.walk(item);
                }
            }
            _ => {}
        }
    }
}

/// A detected mix of naming conventions
#[derive(Debug, Clone, PartialEq)]
pub struct MixedCasing {
    pub stats: CasingStats,
    pub majority: NamingStyle,
    pub minority: NamingStyle,
    /// minority / (majority + minority)
    pub minority_ratio: f64,
}

impl MixedCasing {
    pub fn message(&self) -> String {
        let (majority_count, minority_count) = match self.majority {
            NamingStyle::CamelCase => (self.stats.camel, self.stats.snake),
            NamingStyle::SnakeCase => (self.stats.snake, self.stats.camel),
        };
        format!(
            "Mixed naming conventions: {} {} and {} {} properties. Majority style is {}; {} makes up {:.1}% of styled properties",
            majority_count,
            self.majority,
            minority_count,
            self.minority,
            self.majority,
            self.minority,
            self.minority_ratio * 100.0
        )
    }
}

/// Decide whether a set of counts is inconsistent enough to report.
///
/// Ties count camelCase as the majority.
pub fn judge(stats: CasingStats) -> Option<MixedCasing> {
    if stats.total <= MIN_KEYS {
        return None;
    }

    let (majority, minority, majority_count, minority_count) = if stats.camel >= stats.snake {
        (NamingStyle::CamelCase, NamingStyle::SnakeCase, stats.camel, stats.snake)
    } else {
        (NamingStyle::SnakeCase, NamingStyle::CamelCase, stats.snake, stats.camel)
    };

    if minority_count == 0 {
        return None;
    }

    let ratio = minority_count as f64 / (majority_count + minority_count) as f64;
    debug!(
        "Casing stats: total={} camel={} snake={} minority ratio={:.3}",
        stats.total, stats.camel, stats.snake, ratio
    );

    (ratio > MAX_MINORITY_RATIO).then_some(MixedCasing {
        stats,
        majority,
        minority,
        minority_ratio: ratio,
    })
}

/// Run the detector over a subtree
pub fn detect_mixed_casing(value: &Value) -> Option<MixedCasing> {
    judge(CasingStats::collect(value))
}
