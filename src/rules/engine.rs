//! Rule engine
//!
//! The `RuleEngine` trait is the seam between scoring and rule evaluation:
//! it takes a document plus the resolved ruleset and returns raw findings.
//! `PathWalkEngine` is the bundled implementation.
//!
//! # Selectors
//!
//! `given` selectors are deliberately small: `$` followed by dot-separated
//! segments, each either a literal key (or array index) or `*`:
//!
//! ```text
//! $                               document root
//! $.info                          one object
//! $.paths.*.get                   every GET operation
//! $.components.schemas.*          every named schema
//! ```
//!
//! Filters, recursive descent and slices are not supported.

use crate::models::RawFinding;
use crate::rules::resolver::{BoundClause, FieldRef, ResolvedRuleset};
use serde_json::Value;
use std::collections::HashSet;
use thiserror::Error;
use tracing::debug;

/// Failure inside a rule engine
#[derive(Debug, Error)]
#[error("{0}")]
pub struct EngineError(pub String);

/// Evaluates a resolved ruleset against a document
pub trait RuleEngine: Send + Sync {
    /// Run every enabled rule and return findings in a stable order
    fn evaluate(
        &self,
        document: &Value,
        ruleset: &ResolvedRuleset,
    ) -> Result<Vec<RawFinding>, EngineError>;
}

/// One segment of a selector
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Key(String),
    Wildcard,
}

/// A parsed `given` selector
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selector {
    source: String,
    segments: Vec<Segment>,
}

impl Selector {
    pub fn parse(source: &str) -> Result<Self, String> {
        let rest = source
            .strip_prefix('$')
            .ok_or_else(|| "selector must start with `$`".to_string())?;

        let mut segments = Vec::new();
        if !rest.is_empty() {
            let rest = rest
                .strip_prefix('.')
                .ok_or_else(|| "expected `.` after `$`".to_string())?;
            for part in rest.split('.') {
                match part {
                    "" => return Err("empty segment".to_string()),
                    "*" => segments.push(Segment::Wildcard),
                    p if p.starts_with('[') || p.starts_with('?') => {
                        return Err(format!("unsupported segment `{}`", p))
                    }
                    p => segments.push(Segment::Key(p.to_string())),
                }
            }
        }

        Ok(Self {
            source: source.to_string(),
            segments,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// All nodes matched by this selector, with their paths
    pub fn select<'a>(&self, document: &'a Value) -> Vec<(Vec<String>, &'a Value)> {
        let mut current = vec![(Vec::new(), document)];
        for segment in &self.segments {
            let mut next = Vec::new();
            for (path, node) in current {
                match segment {
                    Segment::Key(key) => {
                        if let Some(found) = child(node, key) {
                            let mut p = path.clone();
                            p.push(key.clone());
                            next.push((p, found));
                        }
                    }
                    Segment::Wildcard => match node {
                        Value::Object(map) => {
                            for (key, value) in map {
                                let mut p = path.clone();
                                p.push(key.clone());
                                next.push((p, value));
                            }
                        }
                        Value::Array(items) => {
                            for (i, item) in items.iter().enumerate() {
                                let mut p = path.clone();
                                p.push(i.to_string());
                                next.push((p, item));
                            }
                        }
                        _ => {}
                    },
                }
            }
            current = next;
        }
        current
    }
}

fn child<'a>(node: &'a Value, key: &str) -> Option<&'a Value> {
    match node {
        Value::Object(map) => map.get(key),
        Value::Array(items) => key.parse::<usize>().ok().and_then(|i| items.get(i)),
        _ => None,
    }
}

/// Walks selectors over the document tree and applies rule functions
#[derive(Debug, Clone, Copy, Default)]
pub struct PathWalkEngine;

impl PathWalkEngine {
    pub fn new() -> Self {
        Self
    }
}

impl RuleEngine for PathWalkEngine {
    fn evaluate(
        &self,
        document: &Value,
        ruleset: &ResolvedRuleset,
    ) -> Result<Vec<RawFinding>, EngineError> {
        if !document.is_object() {
            return Err(EngineError(
                "document root must be a mapping of OpenAPI fields".to_string(),
            ));
        }

        let mut findings = Vec::new();
        let mut seen: HashSet<(String, Vec<String>, String)> = HashSet::new();

        for rule in ruleset.enabled() {
            let before = findings.len();
            for selector in rule.given.iter() {
                for (path, target) in selector.select(document) {
                    for clause in rule.then.iter() {
                        for (finding_path, message) in apply_clause(clause, &path, target) {
                            let message = rule.definition.message.clone().unwrap_or(message);
                            let key = (rule.id.clone(), finding_path.clone(), message.clone());
                            if !seen.insert(key) {
                                continue;
                            }
                            findings.push(RawFinding {
                                code: rule.id.clone(),
                                severity: rule.definition.severity.code(),
                                message,
                                path: finding_path,
                                range: None,
                            });
                        }
                    }
                }
            }
            debug!("Rule {} produced {} findings", rule.id, findings.len() - before);
        }

        Ok(findings)
    }
}

fn apply_clause(
    clause: &BoundClause,
    path: &[String],
    target: &Value,
) -> Vec<(Vec<String>, String)> {
    let mut results = Vec::new();
    match &clause.field {
        None => {
            let label = path.last().map(String::as_str).unwrap_or("$");
            if let Some(message) = clause.evaluator.evaluate(Some(target), label) {
                results.push((path.to_vec(), message));
            }
        }
        Some(FieldRef::Key) => {
            if let Value::Object(map) = target {
                for key in map.keys() {
                    let key_value = Value::String(key.clone());
                    if let Some(message) = clause.evaluator.evaluate(Some(&key_value), key) {
                        let mut p = path.to_vec();
                        p.push(key.clone());
                        results.push((p, message));
                    }
                }
            }
        }
        Some(FieldRef::Path(segments)) => {
            let value = segments
                .iter()
                .try_fold(target, |node, segment| child(node, segment));
            let label = segments.join(".");
            if let Some(message) = clause.evaluator.evaluate(value, &label) {
                let mut p = path.to_vec();
                p.extend(segments.iter().cloned());
                results.push((p, message));
            }
        }
    }
    results
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ruleset::validate_ruleset;
    use crate::rules::resolver::resolve_ruleset;
    use serde_json::json;

    fn ruleset(rules: Value) -> ResolvedRuleset {
        let doc = validate_ruleset(&json!({ "rules": rules })).expect("valid ruleset");
        resolve_ruleset(doc).expect("resolvable ruleset")
    }

    #[test]
    fn test_selector_parse() {
        let s = Selector::parse("$.paths.*.get").unwrap();
        assert_eq!(
            s.segments(),
            &[
                Segment::Key("paths".to_string()),
                Segment::Wildcard,
                Segment::Key("get".to_string())
            ]
        );
        assert!(Selector::parse("$").unwrap().segments().is_empty());
        assert!(Selector::parse("paths").is_err());
        assert!(Selector::parse("$..description").is_err());
        assert!(Selector::parse("$.paths.[0]").is_err());
        assert!(Selector::parse("$paths").is_err());
    }

    #[test]
    fn test_selector_select() {
        let doc = json!({
            "servers": [{ "url": "a" }, { "url": "b" }],
            "paths": { "/users": { "get": {}, "post": {} }, "/pets": { "get": {} } }
        });
        let gets = Selector::parse("$.paths.*.get").unwrap().select(&doc);
        let paths: Vec<String> = gets.iter().map(|(p, _)| p.join(".")).collect();
        assert_eq!(paths, vec!["paths./pets.get", "paths./users.get"]);

        let servers = Selector::parse("$.servers.*").unwrap().select(&doc);
        assert_eq!(servers.len(), 2);
        assert_eq!(servers[1].0, vec!["servers".to_string(), "1".to_string()]);

        let first = Selector::parse("$.servers.0.url").unwrap().select(&doc);
        assert_eq!(first[0].1, &json!("a"));

        assert!(Selector::parse("$.missing.*").unwrap().select(&doc).is_empty());
    }

    #[test]
    fn test_field_check_on_missing_field() {
        let rules = ruleset(json!({
            "com-info-contact": {
                "description": "Info should have contact",
                "severity": "warn",
                "given": "$.info",
                "then": { "field": "contact", "function": "truthy" }
            }
        }));
        let findings = PathWalkEngine
            .evaluate(&json!({ "info": { "title": "x" } }), &rules)
            .unwrap();
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].code, "com-info-contact");
        assert_eq!(findings[0].severity, 1);
        assert_eq!(findings[0].path, vec!["info".to_string(), "contact".to_string()]);
    }

    #[test]
    fn test_key_field() {
        let rules = ruleset(json!({
            "str-no-trailing-slash": {
                "description": "No trailing slash",
                "severity": "warn",
                "given": "$.paths",
                "then": { "field": "@key", "function": "pattern", "functionOptions": { "notMatch": ".+/$" } }
            }
        }));
        let doc = json!({ "paths": { "/users/": {}, "/pets": {} } });
        let findings = PathWalkEngine.evaluate(&doc, &rules).unwrap();
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].path, vec!["paths".to_string(), "/users/".to_string()]);
    }

    #[test]
    fn test_rule_message_overrides_function_message() {
        let rules = ruleset(json!({
            "com-info-description": {
                "description": "Info description",
                "message": "Describe your API",
                "severity": "error",
                "given": "$.info",
                "then": { "field": "description", "function": "truthy" }
            }
        }));
        let findings = PathWalkEngine.evaluate(&json!({ "info": {} }), &rules).unwrap();
        assert_eq!(findings[0].message, "Describe your API");
    }

    #[test]
    fn test_disabled_rules_skipped() {
        let rules = ruleset(json!({
            "com-info-description": {
                "description": "Info description",
                "severity": "error",
                "enabled": false,
                "given": "$.info",
                "then": { "field": "description", "function": "truthy" }
            }
        }));
        let findings = PathWalkEngine.evaluate(&json!({ "info": {} }), &rules).unwrap();
        assert!(findings.is_empty());
    }

    #[test]
    fn test_overlapping_selectors_deduplicated() {
        let rules = ruleset(json!({
            "com-info-description": {
                "description": "Info description",
                "severity": "error",
                "given": ["$.info", "$.info"],
                "then": { "field": "description", "function": "truthy" }
            }
        }));
        let findings = PathWalkEngine.evaluate(&json!({ "info": {} }), &rules).unwrap();
        assert_eq!(findings.len(), 1);
    }

    #[test]
    fn test_non_object_document_is_an_error() {
        let rules = ruleset(json!({}));
        assert!(PathWalkEngine.evaluate(&json!("just a string"), &rules).is_err());
    }
}
