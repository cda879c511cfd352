//! Property-based tests for scoring, config validation and the casing
//! detector.

use apigrade::config::{validate_scoring, GradingScale, ScoringConfig};
use apigrade::detectors::{judge, CasingStats};
use apigrade::models::{Grade, Severity, Violation};
use apigrade::rules::ResolvedRuleset;
use apigrade::scoring::{categorize, grade, score};
use proptest::prelude::*;
use serde_json::{json, Value};

// ============================================================================
// Strategies
// ============================================================================

fn arb_severity() -> impl Strategy<Value = Severity> {
    prop_oneof![
        Just(Severity::Error),
        Just(Severity::Warn),
        Just(Severity::Info),
        Just(Severity::Hint),
    ]
}

/// Rule ids from the built-in set, plus a few with no penalty entry
fn arb_rule_id() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("sec-https-only"),
        Just("sec-global-security"),
        Just("com-info-contact"),
        Just("com-operation-id"),
        Just("str-no-trailing-slash"),
        Just("cns-property-casing"),
        Just("x-custom-rule"),
        Just("arch-layering"),
    ]
    .prop_map(String::from)
}

fn arb_violation() -> impl Strategy<Value = Violation> {
    (arb_rule_id(), arb_severity(), "[a-z]{1,8}(\\.[a-z]{1,8}){0,3}").prop_map(
        |(rule_id, severity, path)| Violation {
            rule_id,
            severity,
            message: "generated".to_string(),
            path,
            line: None,
            column: None,
        },
    )
}

/// Four distinct cut points; bands are F [0, c1), D [c1, c2), ... A [c4, 100]
fn arb_cuts() -> impl Strategy<Value = [i64; 4]> {
    prop::collection::btree_set(1i64..100, 4).prop_map(|set| {
        let v: Vec<i64> = set.into_iter().collect();
        [v[0], v[1], v[2], v[3]]
    })
}

fn scale_json(cuts: [i64; 4]) -> Value {
    let [c1, c2, c3, c4] = cuts;
    json!({
        "A": { "min": c4, "max": 100 },
        "B": { "min": c3, "max": c4 - 1 },
        "C": { "min": c2, "max": c3 - 1 },
        "D": { "min": c1, "max": c2 - 1 },
        "F": { "min": 0, "max": c1 - 1 },
    })
}

fn scoring_json(weights: [f64; 5], grading_scale: Value) -> Value {
    json!({
        "base_score": 100,
        "weights": {
            "security": weights[0],
            "completeness": weights[1],
            "structure": weights[2],
            "consistency": weights[3],
            "architecture": weights[4],
        },
        "grading_scale": grading_scale,
    })
}

fn default_scale_json() -> Value {
    scale_json([60, 70, 80, 90])
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    #[test]
    fn prop_grade_is_monotonic(a in 0.0f64..=100.0, b in 0.0f64..=100.0) {
        let scale = GradingScale::default();
        let (low, high) = if a <= b { (a, b) } else { (b, a) };
        // A sorts before F, so a higher score never gets a larger grade
        prop_assert!(grade(high, &scale) <= grade(low, &scale));
    }

    #[test]
    fn prop_valid_scale_grades_every_integer(cuts in arb_cuts()) {
        let config = validate_scoring(&scoring_json([0.3, 0.25, 0.2, 0.15, 0.1], scale_json(cuts)))
            .map_err(|e| TestCaseError::fail(e.join("; ")))?;

        for s in 0..=100i64 {
            let g = grade(s as f64, &config.grading_scale);
            let band = config.grading_scale.band(g).unwrap();
            prop_assert!(band.min <= s && s <= band.max, "{} graded {} with band {:?}", s, g, band);
        }
    }

    #[test]
    fn prop_gap_in_scale_is_rejected(cuts in arb_cuts()) {
        let mut scale = scale_json(cuts);
        scale["A"]["min"] = json!(cuts[3] + 1);

        let errors =
            validate_scoring(&scoring_json([0.3, 0.25, 0.2, 0.15, 0.1], scale)).unwrap_err();
        prop_assert!(errors.iter().any(|e| e.contains("gap")), "{:?}", errors);
    }

    #[test]
    fn prop_weights_summing_to_one_accepted(parts in prop::array::uniform4(0.0f64..=0.25)) {
        let rest = 1.0 - parts.iter().sum::<f64>();
        let weights = [parts[0], parts[1], parts[2], parts[3], rest];
        prop_assert!(validate_scoring(&scoring_json(weights, default_scale_json())).is_ok());
    }

    #[test]
    fn prop_weights_off_by_more_than_tolerance_rejected(
        parts in prop::array::uniform4(0.0f64..=0.25),
        drift in prop_oneof![-0.5f64..-0.002, 0.002f64..0.5],
    ) {
        let rest = (1.0 - parts.iter().sum::<f64>() + drift).max(0.0);
        let weights = [parts[0], parts[1], parts[2], parts[3], rest];
        prop_assume!((weights.iter().sum::<f64>() - 1.0).abs() > 0.0015);

        let errors = validate_scoring(&scoring_json(weights, default_scale_json())).unwrap_err();
        prop_assert!(errors.iter().any(|e| e.contains("sum to 1.0")), "{:?}", errors);
    }

    #[test]
    fn prop_score_stays_in_range(violations in prop::collection::vec(arb_violation(), 0..40)) {
        let config = ScoringConfig::default();
        let categorized = categorize(&violations, &ResolvedRuleset::default());
        let outcome = score(&categorized, &config);

        prop_assert!(outcome.final_score <= 100);
        prop_assert!(outcome.raw_score >= 0.0);
        let counted: usize = outcome.breakdown.values().map(|c| c.violations.len()).sum();
        prop_assert_eq!(counted, violations.len());
        if violations.is_empty() {
            prop_assert_eq!(outcome.final_score, 100);
        }
    }

    #[test]
    fn prop_more_violations_never_raise_score(
        violations in prop::collection::vec(arb_violation(), 0..20),
        extra in arb_violation(),
    ) {
        let config = ScoringConfig::default();
        let ruleset = ResolvedRuleset::default();
        let before = score(&categorize(&violations, &ruleset), &config);

        let mut more = violations.clone();
        more.push(extra);
        let after = score(&categorize(&more, &ruleset), &config);

        prop_assert!(after.raw_score <= before.raw_score);
    }

    #[test]
    fn prop_casing_judgement_matches_threshold(
        camel in 0usize..50,
        snake in 0usize..50,
        neither in 0usize..10,
    ) {
        let stats = CasingStats { total: camel + snake + neither, camel, snake };
        let minority = camel.min(snake);
        let expected = stats.total > 5
            && minority > 0
            && minority as f64 / (camel + snake) as f64 > 0.20;

        let judged = judge(stats);
        prop_assert_eq!(judged.is_some(), expected);
        if let Some(mixed) = judged {
            prop_assert!(mixed.minority_ratio <= 0.5);
        }
    }
}

#[test]
fn fatal_short_circuits_any_mix() {
    let config = ScoringConfig::default();
    let ids = ["sec-https-only", "com-info-contact", "str-openapi-version"];
    let mut violations: Vec<Violation> = ids
        .iter()
        .map(|id| Violation {
            rule_id: id.to_string(),
            severity: Severity::Error,
            message: "m".to_string(),
            path: String::new(),
            line: None,
            column: None,
        })
        .collect();
    violations.reverse();

    let outcome = score(&categorize(&violations, &ResolvedRuleset::default()), &config);
    assert!(outcome.has_fatal_errors);
    assert_eq!(outcome.final_score, 0);
    assert!(outcome.breakdown.values().all(|c| c.points_deducted == 0.0));
    assert_eq!(grade(0.0, &config.grading_scale), Grade::F);
}
