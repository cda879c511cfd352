//! Rule resolution
//!
//! Turns a validated ruleset document into something the engine can run:
//! selectors are parsed and every `then` clause is bound to an `Evaluator`.
//! A reference to an unknown function fails the whole load.

use crate::config::ruleset::{OneOrMany, RuleDefinition, RulesetDocument, ThenClause};
use crate::rules::engine::Selector;
use crate::rules::evaluator::{BindError, Evaluator};
use std::collections::BTreeMap;
use thiserror::Error;
use tracing::debug;

/// Errors binding a ruleset. Always fatal to configuration loading.
#[derive(Debug, Error, PartialEq)]
pub enum RuleResolutionError {
    #[error("rule '{rule_id}' references unknown function '{function}'")]
    UnknownFunction { rule_id: String, function: String },

    #[error("rule '{rule_id}': invalid options for function '{function}': {reason}")]
    InvalidOptions {
        rule_id: String,
        function: String,
        reason: String,
    },

    #[error("rule '{rule_id}': invalid selector '{selector}': {reason}")]
    InvalidSelector {
        rule_id: String,
        selector: String,
        reason: String,
    },
}

/// What a clause checks relative to its target
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldRef {
    /// `@key`: every key of the target object
    Key,
    /// Dotted field path below the target
    Path(Vec<String>),
}

impl FieldRef {
    pub fn parse(field: &str) -> Self {
        if field == "@key" {
            FieldRef::Key
        } else {
            FieldRef::Path(field.split('.').map(str::to_string).collect())
        }
    }
}

/// A `then` clause with its function bound
#[derive(Debug, Clone)]
pub struct BoundClause {
    pub field: Option<FieldRef>,
    pub evaluator: Evaluator,
}

/// A rule ready for evaluation
#[derive(Debug, Clone)]
pub struct ResolvedRule {
    pub id: String,
    /// Definition as written, kept for reporting
    pub definition: RuleDefinition,
    pub given: OneOrMany<Selector>,
    /// Same single/list shape as the definition's `then`
    pub then: OneOrMany<BoundClause>,
}

/// Merged and bound ruleset
#[derive(Debug, Clone, Default)]
pub struct ResolvedRuleset {
    pub extends: Vec<String>,
    rules: BTreeMap<String, ResolvedRule>,
}

impl ResolvedRuleset {
    pub fn get(&self, rule_id: &str) -> Option<&ResolvedRule> {
        self.rules.get(rule_id)
    }

    /// All rules in id order, including disabled ones
    pub fn iter(&self) -> impl Iterator<Item = &ResolvedRule> {
        self.rules.values()
    }

    /// Rules the engine should run, in id order
    pub fn enabled(&self) -> impl Iterator<Item = &ResolvedRule> {
        self.rules.values().filter(|r| r.definition.enabled)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Tags of a rule; empty for ids not in the ruleset
    pub fn tags(&self, rule_id: &str) -> &[String] {
        self.rules
            .get(rule_id)
            .map(|r| r.definition.tags.as_slice())
            .unwrap_or(&[])
    }
}

/// Merge user rules over a baseline. A user rule replaces the baseline rule
/// with the same id entirely; fields are not merged.
pub fn merge_rulesets(baseline: RulesetDocument, custom: RulesetDocument) -> RulesetDocument {
    let mut rules = baseline.rules;
    for (id, rule) in custom.rules {
        if rules.contains_key(&id) {
            debug!("Custom rule '{}' replaces the baseline definition", id);
        }
        rules.insert(id, rule);
    }
    RulesetDocument {
        extends: custom.extends,
        rules,
    }
}

/// Bind every rule in the document
pub fn resolve_ruleset(document: RulesetDocument) -> Result<ResolvedRuleset, RuleResolutionError> {
    let mut rules = BTreeMap::new();
    for (id, definition) in document.rules {
        let resolved = resolve_rule(&id, definition)?;
        rules.insert(id, resolved);
    }
    debug!("Resolved {} rules", rules.len());
    Ok(ResolvedRuleset {
        extends: document.extends,
        rules,
    })
}

fn resolve_rule(id: &str, definition: RuleDefinition) -> Result<ResolvedRule, RuleResolutionError> {
    let given = definition.given.try_map(|selector| {
        Selector::parse(selector).map_err(|reason| RuleResolutionError::InvalidSelector {
            rule_id: id.to_string(),
            selector: selector.clone(),
            reason,
        })
    })?;

    let then = definition.then.try_map(|clause| bind_clause(id, clause))?;

    Ok(ResolvedRule {
        id: id.to_string(),
        definition,
        given,
        then,
    })
}

fn bind_clause(id: &str, clause: &ThenClause) -> Result<BoundClause, RuleResolutionError> {
    let evaluator = Evaluator::bind(&clause.function, clause.function_options.as_ref())
        .map_err(|e| match e {
            BindError::UnknownFunction(function) => RuleResolutionError::UnknownFunction {
                rule_id: id.to_string(),
                function,
            },
            BindError::InvalidOptions { function, reason } => {
                RuleResolutionError::InvalidOptions {
                    rule_id: id.to_string(),
                    function,
                    reason,
                }
            }
        })?;

    Ok(BoundClause {
        field: clause.field.as_deref().map(FieldRef::parse),
        evaluator,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ruleset::validate_ruleset;
    use serde_json::json;

    fn doc(rules: serde_json::Value) -> RulesetDocument {
        validate_ruleset(&json!({ "rules": rules })).expect("valid ruleset")
    }

    fn rule(description: &str, function: &str) -> serde_json::Value {
        json!({
            "description": description,
            "severity": "warn",
            "given": "$.info",
            "then": { "field": "description", "function": function }
        })
    }

    #[test]
    fn test_resolve_preserves_then_shape() {
        let resolved = resolve_ruleset(doc(json!({
            "single": rule("single", "truthy"),
            "list": {
                "description": "list",
                "severity": "error",
                "given": ["$.info", "$.paths.*"],
                "then": [
                    { "field": "title", "function": "truthy" },
                    { "field": "title", "function": "length", "functionOptions": { "min": 3 } }
                ]
            }
        })))
        .expect("resolves");

        let single = resolved.get("single").unwrap();
        assert!(!single.then.is_many());
        assert_eq!(single.then.iter().next().unwrap().evaluator.name(), "truthy");

        let list = resolved.get("list").unwrap();
        assert!(list.then.is_many());
        let names: Vec<&str> = list.then.iter().map(|c| c.evaluator.name()).collect();
        assert_eq!(names, vec!["truthy", "length"]);
        assert_eq!(list.given.len(), 2);
    }

    #[test]
    fn test_unknown_function_names_rule_and_function() {
        let err =
            resolve_ruleset(doc(json!({ "cns-odd": rule("odd", "oddFunction") }))).unwrap_err();
        assert_eq!(
            err,
            RuleResolutionError::UnknownFunction {
                rule_id: "cns-odd".to_string(),
                function: "oddFunction".to_string()
            }
        );
        assert_eq!(err.to_string(), "rule 'cns-odd' references unknown function 'oddFunction'");
    }

    #[test]
    fn test_unknown_function_in_list_fails() {
        let err = resolve_ruleset(doc(json!({
            "r": {
                "description": "r",
                "severity": "warn",
                "given": "$",
                "then": [{ "function": "truthy" }, { "function": "nope" }]
            }
        })))
        .unwrap_err();
        assert!(matches!(err, RuleResolutionError::UnknownFunction { .. }));
    }

    #[test]
    fn test_invalid_selector() {
        let err = resolve_ruleset(doc(json!({
            "r": { "description": "r", "severity": "warn", "given": "$..info", "then": { "function": "truthy" } }
        })))
        .unwrap_err();
        assert!(matches!(err, RuleResolutionError::InvalidSelector { .. }));
    }

    #[test]
    fn test_field_ref_parse() {
        assert_eq!(FieldRef::parse("@key"), FieldRef::Key);
        assert_eq!(
            FieldRef::parse("info.contact"),
            FieldRef::Path(vec!["info".to_string(), "contact".to_string()])
        );
    }

    #[test]
    fn test_merge_replaces_whole_rule() {
        let baseline = doc(json!({
            "a": rule("baseline a", "truthy"),
            "b": rule("baseline b", "truthy")
        }));
        let custom = doc(json!({
            "b": {
                "description": "custom b",
                "severity": "hint",
                "given": "$",
                "then": { "function": "defined" }
            },
            "c": rule("custom c", "falsy")
        }));
        let merged = merge_rulesets(baseline, custom);
        assert_eq!(merged.rules.len(), 3);
        assert_eq!(merged.rules["a"].description, "baseline a");
        let b = &merged.rules["b"];
        assert_eq!(b.description, "custom b");
        // Not deep-merged: baseline fields are gone
        assert!(b.then.iter().all(|c| c.field.is_none()));
        assert_eq!(merged.rules["c"].description, "custom c");
    }

    #[test]
    fn test_tags_lookup() {
        let resolved = resolve_ruleset(doc(json!({
            "x": {
                "description": "x",
                "severity": "warn",
                "given": "$",
                "tags": ["security"],
                "then": { "function": "truthy" }
            }
        })))
        .unwrap();
        assert_eq!(resolved.tags("x"), ["security".to_string()]);
        assert!(resolved.tags("missing").is_empty());
    }
}
