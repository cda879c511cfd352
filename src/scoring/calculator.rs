//! Weighted score calculation

use crate::config::ScoringConfig;
use crate::models::{Category, CategoryScore, Severity, Violation};
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

/// Result of scoring one set of categorized violations
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreOutcome {
    /// Rounded score reported to users
    pub final_score: u32,
    /// Score before rounding
    pub raw_score: f64,
    /// Weighted sum of all category deductions
    pub total_penalty: f64,
    pub has_fatal_errors: bool,
    pub breakdown: BTreeMap<Category, CategoryScore>,
}

/// Points for a violation with no configured penalty
pub fn default_points(severity: Severity) -> f64 {
    match severity {
        Severity::Error => 10.0,
        Severity::Warn => 5.0,
        Severity::Info | Severity::Hint => 2.0,
    }
}

pub fn penalty_points(violation: &Violation, config: &ScoringConfig) -> f64 {
    config
        .penalty(&violation.rule_id)
        .map(|p| p.points)
        .unwrap_or_else(|| default_points(violation.severity))
}

/// Score categorized violations.
///
/// A fatal violation forces the score to 0 and skips the weighted math; the
/// breakdown then lists violations with nothing deducted.
pub fn score(
    categorized: &BTreeMap<Category, Vec<Violation>>,
    config: &ScoringConfig,
) -> ScoreOutcome {
    let fatal_rule = categorized
        .values()
        .flatten()
        .find(|v| config.is_fatal(&v.rule_id));

    if let Some(fatal) = fatal_rule {
        warn!("Fatal violation of '{}', score forced to 0", fatal.rule_id);
        let breakdown = Category::ALL
            .into_iter()
            .map(|category| {
                let violations = categorized.get(&category).cloned().unwrap_or_default();
                (
                    category,
                    CategoryScore {
                        category,
                        weight: config.weights.get(category),
                        points_deducted: 0.0,
                        violations,
                    },
                )
            })
            .collect();
        return ScoreOutcome {
            final_score: 0,
            raw_score: 0.0,
            total_penalty: 0.0,
            has_fatal_errors: true,
            breakdown,
        };
    }

    let mut total_penalty = 0.0;
    let mut breakdown = BTreeMap::new();
    for category in Category::ALL {
        let violations = categorized.get(&category).cloned().unwrap_or_default();
        let points: f64 = violations.iter().map(|v| penalty_points(v, config)).sum();
        let weight = config.weights.get(category);
        total_penalty += points * weight;

        if !violations.is_empty() {
            debug!(
                "{}: {} violations, {:.1} points x {:.2}",
                category,
                violations.len(),
                points,
                weight
            );
        }

        breakdown.insert(
            category,
            CategoryScore {
                category,
                weight,
                points_deducted: points,
                violations,
            },
        );
    }

    let raw_score = (config.base_score - total_penalty).max(0.0);
    // f64::round rounds half away from zero: 92.5 -> 93
    let final_score = raw_score.round() as u32;

    info!(
        "Score: {} (base {:.1} - weighted penalty {:.2})",
        final_score, config.base_score, total_penalty
    );

    ScoreOutcome {
        final_score,
        raw_score,
        total_penalty,
        has_fatal_errors: false,
        breakdown,
    }
}
