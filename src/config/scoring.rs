//! Scoring configuration: weights, penalties and the grading scale
//!
//! The scoring document is validated from an untyped `serde_json::Value`
//! so that every problem is reported in one pass instead of stopping at
//! the first deserialization error.
//!
//! ```toml
//! base_score = 100
//!
//! [weights]
//! security = 0.30
//! completeness = 0.25
//! structure = 0.20
//! consistency = 0.15
//! architecture = 0.10
//!
//! [penalties]
//! str-openapi-version = { points = 100, fatal = true }
//!
//! [grading_scale]
//! A = { min = 90, max = 100 }
//! # ...
//! ```

use crate::models::{Category, Grade};
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::{BTreeMap, HashMap};

/// Allowed distance of the weight sum from 1.0
pub const WEIGHT_SUM_TOLERANCE: f64 = 0.001;

/// Validated scoring configuration
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoringConfig {
    /// Score before any deduction (0-100)
    pub base_score: f64,
    pub weights: CategoryWeights,
    /// Per-rule penalty overrides keyed by rule id
    pub penalties: HashMap<String, Penalty>,
    pub grading_scale: GradingScale,
}

impl ScoringConfig {
    /// Configured penalty for a rule, if any
    pub fn penalty(&self, rule_id: &str) -> Option<&Penalty> {
        self.penalties.get(rule_id)
    }

    /// Whether violations of this rule force the score to zero
    pub fn is_fatal(&self, rule_id: &str) -> bool {
        self.penalty(rule_id).is_some_and(|p| p.fatal)
    }
}

impl Default for ScoringConfig {
    fn default() -> Self {
        let penalties = [
            ("str-openapi-version", 100.0, true),
            ("sec-global-security", 30.0, false),
            ("sec-https-only", 25.0, false),
            ("sec-no-api-key-in-query", 15.0, false),
            ("sec-no-http-basic", 20.0, false),
            ("com-info-description", 5.0, false),
            ("com-info-contact", 3.0, false),
            ("com-operation-description", 3.0, false),
            ("com-operation-id", 8.0, false),
            ("com-operation-responses", 8.0, false),
            ("com-response-description", 2.0, false),
            ("str-paths-kebab-case", 4.0, false),
            ("str-no-trailing-slash", 4.0, false),
            ("str-no-query-in-path", 6.0, false),
            ("cns-operation-id-camel-case", 3.0, false),
            ("cns-property-casing", 10.0, false),
        ]
        .into_iter()
        .map(|(id, points, fatal)| (id.to_string(), Penalty { points, fatal }))
        .collect();

        Self {
            base_score: 100.0,
            weights: CategoryWeights::default(),
            penalties,
            grading_scale: GradingScale::default(),
        }
    }
}

/// Weights for the five quality categories
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CategoryWeights {
    pub security: f64,
    pub completeness: f64,
    pub structure: f64,
    pub consistency: f64,
    pub architecture: f64,
}

impl Default for CategoryWeights {
    fn default() -> Self {
        Self {
            security: 0.30,
            completeness: 0.25,
            structure: 0.20,
            consistency: 0.15,
            architecture: 0.10,
        }
    }
}

impl CategoryWeights {
    pub fn get(&self, category: Category) -> f64 {
        match category {
            Category::Security => self.security,
            Category::Completeness => self.completeness,
            Category::Structure => self.structure,
            Category::Consistency => self.consistency,
            Category::Architecture => self.architecture,
        }
    }

    fn set(&mut self, category: Category, weight: f64) {
        match category {
            Category::Security => self.security = weight,
            Category::Completeness => self.completeness = weight,
            Category::Structure => self.structure = weight,
            Category::Consistency => self.consistency = weight,
            Category::Architecture => self.architecture = weight,
        }
    }

    pub fn sum(&self) -> f64 {
        Category::ALL.iter().map(|c| self.get(*c)).sum()
    }

    /// Validate that weights sum to 1.0 (with tolerance)
    pub fn is_valid(&self) -> bool {
        (self.sum() - 1.0).abs() <= WEIGHT_SUM_TOLERANCE
    }
}

/// Penalty configured for a single rule
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Penalty {
    pub points: f64,
    pub fatal: bool,
}

/// Inclusive score band for one grade
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GradeBand {
    pub min: i64,
    pub max: i64,
}

/// Validated grading scale. Every grade has a band.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GradingScale {
    bands: BTreeMap<Grade, GradeBand>,
}

impl GradingScale {
    /// Build a scale without checking coverage. Use `validate_scoring` for
    /// untrusted input.
    pub fn from_bands(bands: impl IntoIterator<Item = (Grade, GradeBand)>) -> Self {
        Self {
            bands: bands.into_iter().collect(),
        }
    }

    pub fn band(&self, grade: Grade) -> Option<&GradeBand> {
        self.bands.get(&grade)
    }

    /// Lower bound of a grade, if the grade is configured
    pub fn min_for(&self, grade: Grade) -> Option<i64> {
        self.band(grade).map(|b| b.min)
    }

    pub fn bands(&self) -> impl Iterator<Item = (Grade, &GradeBand)> {
        self.bands.iter().map(|(g, b)| (*g, b))
    }
}

impl Default for GradingScale {
    fn default() -> Self {
        Self::from_bands([
            (Grade::A, GradeBand { min: 90, max: 100 }),
            (Grade::B, GradeBand { min: 80, max: 89 }),
            (Grade::C, GradeBand { min: 70, max: 79 }),
            (Grade::D, GradeBand { min: 60, max: 69 }),
            (Grade::F, GradeBand { min: 0, max: 59 }),
        ])
    }
}

/// Validate a parsed scoring document.
///
/// Returns every problem found; never a partially valid config.
pub fn validate_scoring(value: &Value) -> Result<ScoringConfig, Vec<String>> {
    let Some(root) = value.as_object() else {
        return Err(vec!["scoring configuration must be an object".to_string()]);
    };

    let mut errors = Vec::new();
    let base_score = validate_base_score(root.get("base_score"), &mut errors);
    let weights = validate_weights(root.get("weights"), &mut errors);
    let penalties = validate_penalties(root.get("penalties"), &mut errors);
    let grading_scale = validate_grading_scale(root.get("grading_scale"), &mut errors);

    match (base_score, weights, penalties, grading_scale) {
        (Some(base_score), Some(weights), Some(penalties), Some(grading_scale))
            if errors.is_empty() =>
        {
            Ok(ScoringConfig {
                base_score,
                weights,
                penalties,
                grading_scale,
            })
        }
        _ => Err(errors),
    }
}

fn validate_base_score(value: Option<&Value>, errors: &mut Vec<String>) -> Option<f64> {
    match value {
        None => {
            errors.push("base_score is required".to_string());
            None
        }
        Some(v) => match v.as_f64() {
            Some(n) if (0.0..=100.0).contains(&n) => Some(n),
            Some(n) => {
                errors.push(format!("base_score must be between 0 and 100 (got {})", n));
                None
            }
            None => {
                errors.push(format!("base_score must be a number (got {})", v));
                None
            }
        },
    }
}

fn validate_weights(value: Option<&Value>, errors: &mut Vec<String>) -> Option<CategoryWeights> {
    let Some(value) = value else {
        errors.push("weights is required".to_string());
        return None;
    };
    let Some(map) = value.as_object() else {
        errors.push("weights must be an object".to_string());
        return None;
    };

    let before = errors.len();
    for key in map.keys() {
        if key.parse::<Category>().is_err() {
            errors.push(format!(
                "weights.{}: unknown category (expected security, completeness, structure, consistency, architecture)",
                key
            ));
        }
    }

    let mut weights = CategoryWeights {
        security: 0.0,
        completeness: 0.0,
        structure: 0.0,
        consistency: 0.0,
        architecture: 0.0,
    };
    for category in Category::ALL {
        match map.get(category.as_str()) {
            None => errors.push(format!("weights.{} is required", category)),
            Some(v) => match v.as_f64() {
                Some(w) if w >= 0.0 => weights.set(category, w),
                Some(w) => errors.push(format!(
                    "weights.{} must be non-negative (got {})",
                    category, w
                )),
                None => errors.push(format!(
                    "weights.{} must be a number (got {})",
                    category, v
                )),
            },
        }
    }

    if errors.len() > before {
        return None;
    }
    if !weights.is_valid() {
        errors.push(format!("weights must sum to 1.0 (got {:.4})", weights.sum()));
        return None;
    }
    Some(weights)
}

fn validate_penalties(
    value: Option<&Value>,
    errors: &mut Vec<String>,
) -> Option<HashMap<String, Penalty>> {
    let empty = Map::new();
    let map = match value {
        None => &empty,
        Some(Value::Object(map)) => map,
        Some(_) => {
            errors.push("penalties must be an object".to_string());
            return None;
        }
    };

    let before = errors.len();
    let mut penalties = HashMap::with_capacity(map.len());
    for (rule_id, entry) in map {
        let Some(entry) = entry.as_object() else {
            errors.push(format!("penalties.{} must be an object with `points`", rule_id));
            continue;
        };
        let points = match entry.get("points").map(|p| (p, p.as_f64())) {
            Some((_, Some(p))) if p >= 0.0 => p,
            Some((_, Some(p))) => {
                errors.push(format!(
                    "penalties.{}.points must be non-negative (got {})",
                    rule_id, p
                ));
                continue;
            }
            Some((raw, None)) => {
                errors.push(format!(
                    "penalties.{}.points must be a number (got {})",
                    rule_id, raw
                ));
                continue;
            }
            None => {
                errors.push(format!("penalties.{}.points is required", rule_id));
                continue;
            }
        };
        let fatal = match entry.get("fatal") {
            None => false,
            Some(Value::Bool(b)) => *b,
            Some(other) => {
                errors.push(format!(
                    "penalties.{}.fatal must be a boolean (got {})",
                    rule_id, other
                ));
                continue;
            }
        };
        penalties.insert(rule_id.clone(), Penalty { points, fatal });
    }

    (errors.len() == before).then_some(penalties)
}

fn validate_grading_scale(value: Option<&Value>, errors: &mut Vec<String>) -> Option<GradingScale> {
    let Some(value) = value else {
        errors.push("grading_scale is required".to_string());
        return None;
    };
    let Some(map) = value.as_object() else {
        errors.push("grading_scale must be an object".to_string());
        return None;
    };

    let before = errors.len();
    for key in map.keys() {
        if key.parse::<Grade>().is_err() {
            errors.push(format!("grading_scale.{}: unknown grade (expected A, B, C, D, F)", key));
        }
    }

    let mut bands = Vec::with_capacity(Grade::ALL.len());
    for grade in Grade::ALL {
        let Some(entry) = map.get(grade.as_str()) else {
            errors.push(format!("grading_scale.{} is missing", grade));
            continue;
        };
        let min = bound(entry, "min");
        let max = bound(entry, "max");
        let in_range = |b: i64| SCORE_RANGE.contains(&b);
        match (min, max) {
            (Some(min), Some(max)) if !in_range(min) || !in_range(max) => {
                errors.push(format!(
                    "grading_scale.{}: min and max must be between 0 and 100 (got {} and {})",
                    grade, min, max
                ))
            }
            (Some(min), Some(max)) if min <= max => bands.push((grade, GradeBand { min, max })),
            (Some(min), Some(max)) => errors.push(format!(
                "grading_scale.{}: min ({}) must be <= max ({})",
                grade, min, max
            )),
            _ => errors.push(format!(
                "grading_scale.{} must have integer `min` and `max`",
                grade
            )),
        }
    }

    if errors.len() > before {
        return None;
    }

    // Sorted by max, each band must begin right after the previous one ends
    bands.sort_by_key(|(_, band)| band.max);
    for pair in bands.windows(2) {
        let (lower_grade, lower) = pair[0];
        let (upper_grade, upper) = pair[1];
        if lower.max + 1 != upper.min {
            let kind = if lower.max + 1 < upper.min { "gap" } else { "overlap" };
            errors.push(format!(
                "grading_scale: {} between {} (max {}) and {} (min {})",
                kind, lower_grade, lower.max, upper_grade, upper.min
            ));
        }
    }

    (errors.len() == before).then(|| GradingScale::from_bands(bands))
}

/// Grade bounds partition the score range
const SCORE_RANGE: std::ops::RangeInclusive<i64> = 0..=100;

/// Integer bound; floats with no fractional part are accepted
fn bound(entry: &Value, key: &str) -> Option<i64> {
    let v = entry.get(key)?;
    v.as_i64().or_else(|| {
        v.as_f64()
            .filter(|f| f.fract() == 0.0 && f.is_finite())
            .map(|f| f as i64)
    })
}
