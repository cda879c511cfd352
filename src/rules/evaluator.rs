//! Bound rule functions
//!
//! `Evaluator` is the closed set of functions a rule can invoke. Binding a
//! symbolic name plus its `functionOptions` happens once, when the ruleset
//! is resolved; options are checked and regexes compiled at that point.

use crate::detectors::{casing_consistency, core_functions, CasingType};
use regex::Regex;
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

/// Why a function reference could not be bound
#[derive(Debug, Error, PartialEq)]
pub enum BindError {
    #[error("unknown function '{0}'")]
    UnknownFunction(String),

    #[error("invalid options for '{function}': {reason}")]
    InvalidOptions { function: String, reason: String },
}

/// A rule function with its options already parsed
#[derive(Debug, Clone)]
pub enum Evaluator {
    Truthy,
    Falsy,
    Defined,
    Undefined,
    Pattern {
        must_match: Option<Regex>,
        must_not_match: Option<Regex>,
    },
    Enumeration {
        values: Vec<Value>,
    },
    Length {
        min: Option<f64>,
        max: Option<f64>,
    },
    Casing {
        casing_type: CasingType,
    },
    CasingConsistency,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
struct PatternOptions {
    #[serde(rename = "match")]
    must_match: Option<String>,
    not_match: Option<String>,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct EnumerationOptions {
    values: Vec<Value>,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct LengthOptions {
    min: Option<f64>,
    max: Option<f64>,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct CasingOptions {
    #[serde(rename = "type")]
    casing_type: CasingType,
}

/// Every function name accepted in `then.function`
pub const KNOWN_FUNCTIONS: &[&str] = &[
    "truthy",
    "falsy",
    "defined",
    "undefined",
    "pattern",
    "enumeration",
    "length",
    "casing",
    "casingConsistency",
];

impl Evaluator {
    /// Bind a function name and its options
    pub fn bind(function: &str, options: Option<&Value>) -> Result<Self, BindError> {
        let invalid = |reason: String| BindError::InvalidOptions {
            function: function.to_string(),
            reason,
        };

        match function {
            "truthy" => Ok(Evaluator::Truthy),
            "falsy" => Ok(Evaluator::Falsy),
            "defined" => Ok(Evaluator::Defined),
            "undefined" => Ok(Evaluator::Undefined),
            "casingConsistency" => Ok(Evaluator::CasingConsistency),
            "pattern" => {
                let opts: PatternOptions = parse_options(options).map_err(invalid)?;
                if opts.must_match.is_none() && opts.not_match.is_none() {
                    return Err(invalid("expected `match` or `notMatch`".to_string()));
                }
                let compile = |p: Option<String>| -> Result<Option<Regex>, BindError> {
                    p.map(|p| Regex::new(&p).map_err(|e| invalid(e.to_string())))
                        .transpose()
                };
                Ok(Evaluator::Pattern {
                    must_match: compile(opts.must_match)?,
                    must_not_match: compile(opts.not_match)?,
                })
            }
            "enumeration" => {
                let opts: EnumerationOptions = parse_options(options).map_err(invalid)?;
                Ok(Evaluator::Enumeration { values: opts.values })
            }
            "length" => {
                let opts: LengthOptions = parse_options(options).map_err(invalid)?;
                if opts.min.is_none() && opts.max.is_none() {
                    return Err(invalid("expected `min` or `max`".to_string()));
                }
                Ok(Evaluator::Length {
                    min: opts.min,
                    max: opts.max,
                })
            }
            "casing" => {
                let opts: CasingOptions = parse_options(options).map_err(invalid)?;
                Ok(Evaluator::Casing {
                    casing_type: opts.casing_type,
                })
            }
            other => Err(BindError::UnknownFunction(other.to_string())),
        }
    }

    /// Symbolic name this evaluator was bound from
    pub fn name(&self) -> &'static str {
        match self {
            Evaluator::Truthy => "truthy",
            Evaluator::Falsy => "falsy",
            Evaluator::Defined => "defined",
            Evaluator::Undefined => "undefined",
            Evaluator::Pattern { .. } => "pattern",
            Evaluator::Enumeration { .. } => "enumeration",
            Evaluator::Length { .. } => "length",
            Evaluator::Casing { .. } => "casing",
            Evaluator::CasingConsistency => "casingConsistency",
        }
    }

    /// Check one target. `label` names the field in messages.
    pub fn evaluate(&self, value: Option<&Value>, label: &str) -> Option<String> {
        match self {
            Evaluator::Truthy => core_functions::truthy(value, label),
            Evaluator::Falsy => core_functions::falsy(value, label),
            Evaluator::Defined => core_functions::defined(value, label),
            Evaluator::Undefined => core_functions::undefined(value, label),
            Evaluator::Pattern {
                must_match,
                must_not_match,
            } => core_functions::pattern(
                value,
                label,
                must_match.as_ref(),
                must_not_match.as_ref(),
            ),
            Evaluator::Enumeration { values } => core_functions::enumeration(value, label, values),
            Evaluator::Length { min, max } => core_functions::length(value, label, *min, *max),
            Evaluator::Casing { casing_type } => core_functions::casing(value, label, *casing_type),
            Evaluator::CasingConsistency => {
                casing_consistency::detect_mixed_casing(value?).map(|m| m.message())
            }
        }
    }
}

fn parse_options<T: serde::de::DeserializeOwned>(options: Option<&Value>) -> Result<T, String> {
    let options = options.cloned().unwrap_or_else(|| Value::Object(Default::default()));
    serde_json::from_value(options).map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_bind_known_functions() {
        for name in ["truthy", "falsy", "defined", "undefined", "casingConsistency"] {
            let evaluator = Evaluator::bind(name, None).expect("bind");
            assert_eq!(evaluator.name(), name);
        }
    }

    #[test]
    fn test_every_known_function_binds_with_options() {
        let options = |name: &str| match name {
            "pattern" => Some(json!({ "match": "^a" })),
            "enumeration" => Some(json!({ "values": ["a"] })),
            "length" => Some(json!({ "max": 3 })),
            "casing" => Some(json!({ "type": "kebab" })),
            _ => None,
        };
        for name in KNOWN_FUNCTIONS {
            let evaluator = Evaluator::bind(name, options(*name).as_ref()).expect("bind");
            assert_eq!(evaluator.name(), *name);
        }
    }

    #[test]
    fn test_unknown_function() {
        let err = Evaluator::bind("schemaMagic", None).unwrap_err();
        assert_eq!(err, BindError::UnknownFunction("schemaMagic".to_string()));
    }

    #[test]
    fn test_pattern_requires_options() {
        assert!(matches!(
            Evaluator::bind("pattern", None),
            Err(BindError::InvalidOptions { .. })
        ));
        assert!(matches!(
            Evaluator::bind("pattern", Some(&json!({ "match": "(" }))),
            Err(BindError::InvalidOptions { .. })
        ));
        assert!(matches!(
            Evaluator::bind("pattern", Some(&json!({ "matches": "^a" }))),
            Err(BindError::InvalidOptions { .. })
        ));
    }

    #[test]
    fn test_casing_rejects_unknown_type() {
        assert!(Evaluator::bind("casing", Some(&json!({ "type": "screaming" }))).is_err());
    }

    #[test]
    fn test_evaluate_pattern() {
        let evaluator = Evaluator::bind("pattern", Some(&json!({ "notMatch": "\\?" }))).unwrap();
        assert!(evaluator.evaluate(Some(&json!("/users?id=1")), "/users?id=1").is_some());
        assert!(evaluator.evaluate(Some(&json!("/users")), "/users").is_none());
    }

    #[test]
    fn test_evaluate_casing_consistency_skips_missing_target() {
        assert!(Evaluator::CasingConsistency.evaluate(None, "schema").is_none());
    }
}
