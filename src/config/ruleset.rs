//! Ruleset documents
//!
//! A ruleset maps rule ids to declarative definitions. Each rule selects
//! targets with `given` and runs one or more `then` clauses on them; the
//! clause's `function` is bound to an evaluator by the rule resolver.

use crate::models::Severity;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// A value written either as a single item or as a list.
///
/// The original shape is kept so resolved rules round-trip the way
/// the user wrote them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany<T> {
    One(T),
    Many(Vec<T>),
}

impl<T> OneOrMany<T> {
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        match self {
            OneOrMany::One(item) => std::slice::from_ref(item).iter(),
            OneOrMany::Many(items) => items.iter(),
        }
    }

    pub fn is_many(&self) -> bool {
        matches!(self, OneOrMany::Many(_))
    }

    pub fn len(&self) -> usize {
        match self {
            OneOrMany::One(_) => 1,
            OneOrMany::Many(items) => items.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Map every item, keeping the single/list shape
    pub fn try_map<U, E>(&self, mut f: impl FnMut(&T) -> Result<U, E>) -> Result<OneOrMany<U>, E> {
        Ok(match self {
            OneOrMany::One(item) => OneOrMany::One(f(item)?),
            OneOrMany::Many(items) => {
                OneOrMany::Many(items.iter().map(f).collect::<Result<Vec<_>, _>>()?)
            }
        })
    }
}

/// One function invocation of a rule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThenClause {
    /// Field of the target to check; `@key` checks the target's keys
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    /// Symbolic function name
    pub function: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub function_options: Option<Value>,
}

/// A declarative rule definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleDefinition {
    pub description: String,
    pub severity: Severity,
    /// Overrides the function's message when set
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub given: OneOrMany<String>,
    pub then: OneOrMany<ThenClause>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_enabled() -> bool {
    true
}

/// Parsed ruleset document
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RulesetDocument {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub extends: Vec<String>,
    #[serde(default)]
    pub rules: BTreeMap<String, RuleDefinition>,
}

/// Validate a parsed ruleset document, reporting every malformed rule.
pub fn validate_ruleset(value: &Value) -> Result<RulesetDocument, Vec<String>> {
    let Some(root) = value.as_object() else {
        return Err(vec!["ruleset must be an object".to_string()]);
    };

    let mut errors = Vec::new();

    if let Some(extends) = root.get("extends") {
        match extends.as_array() {
            Some(items) => {
                for (i, item) in items.iter().enumerate() {
                    if !item.is_string() {
                        errors.push(format!("extends[{}] must be a string", i));
                    }
                }
            }
            None => errors.push("extends must be an array".to_string()),
        }
    }

    match root.get("rules") {
        None => {}
        Some(Value::Object(rules)) => {
            for (id, rule) in rules {
                validate_rule(id, rule, &mut errors);
            }
        }
        Some(_) => errors.push("rules must be an object".to_string()),
    }

    if !errors.is_empty() {
        return Err(errors);
    }

    serde_json::from_value(value.clone()).map_err(|e| vec![format!("ruleset: {}", e)])
}

fn validate_rule(id: &str, rule: &Value, errors: &mut Vec<String>) {
    let Some(rule) = rule.as_object() else {
        errors.push(format!("rule '{}': must be an object", id));
        return;
    };

    match rule.get("description") {
        Some(Value::String(s)) if !s.trim().is_empty() => {}
        Some(Value::String(_)) => {
            errors.push(format!("rule '{}': description must not be empty", id))
        }
        Some(_) => errors.push(format!("rule '{}': description must be a string", id)),
        None => errors.push(format!("rule '{}': description is required", id)),
    }

    match rule.get("severity") {
        Some(Value::String(s)) => {
            if let Err(e) = s.parse::<Severity>() {
                errors.push(format!("rule '{}': {}", id, e));
            }
        }
        Some(_) => errors.push(format!("rule '{}': severity must be a string", id)),
        None => errors.push(format!("rule '{}': severity is required", id)),
    }

    match rule.get("given") {
        Some(Value::String(_)) => {}
        Some(Value::Array(items)) if !items.is_empty() && items.iter().all(Value::is_string) => {}
        Some(_) => errors.push(format!(
            "rule '{}': given must be a selector string or a non-empty list of selectors",
            id
        )),
        None => errors.push(format!("rule '{}': given is required", id)),
    }

    match rule.get("then") {
        Some(Value::Object(clause)) => validate_clause(id, None, clause, errors),
        Some(Value::Array(clauses)) if !clauses.is_empty() => {
            for (i, clause) in clauses.iter().enumerate() {
                match clause.as_object() {
                    Some(clause) => validate_clause(id, Some(i), clause, errors),
                    None => errors.push(format!("rule '{}': then[{}] must be an object", id, i)),
                }
            }
        }
        Some(_) => errors.push(format!(
            "rule '{}': then must be a clause or a non-empty list of clauses",
            id
        )),
        None => errors.push(format!("rule '{}': then is required", id)),
    }

    if let Some(tags) = rule.get("tags") {
        let ok = tags.as_array().is_some_and(|t| t.iter().all(Value::is_string));
        if !ok {
            errors.push(format!("rule '{}': tags must be a list of strings", id));
        }
    }
    if let Some(enabled) = rule.get("enabled") {
        if !enabled.is_boolean() {
            errors.push(format!("rule '{}': enabled must be a boolean", id));
        }
    }
    if let Some(message) = rule.get("message") {
        if !message.is_string() {
            errors.push(format!("rule '{}': message must be a string", id));
        }
    }
}

fn validate_clause(
    id: &str,
    index: Option<usize>,
    clause: &serde_json::Map<String, Value>,
    errors: &mut Vec<String>,
) {
    let at = index.map(|i| format!("then[{}]", i)).unwrap_or_else(|| "then".to_string());
    match clause.get("function") {
        Some(Value::String(_)) => {}
        Some(_) => errors.push(format!("rule '{}': {}.function must be a string", id, at)),
        None => errors.push(format!("rule '{}': {}.function is required", id, at)),
    }
    if let Some(field) = clause.get("field") {
        if !field.is_string() {
            errors.push(format!("rule '{}': {}.field must be a string", id, at));
        }
    }
    if let Some(options) = clause.get("functionOptions") {
        if !options.is_object() {
            errors.push(format!("rule '{}': {}.functionOptions must be an object", id, at));
        }
    }
}
