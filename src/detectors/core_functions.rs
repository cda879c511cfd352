//! Declarative rule functions
//!
//! Each function checks a single target value. A `None` target means the
//! requested field is absent from the document.

use regex::Regex;
use serde::Deserialize;
use serde_json::Value;
use std::sync::OnceLock;

/// JavaScript-style truthiness
pub fn is_truthy(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Number(n)) => n.as_f64().is_some_and(|f| f != 0.0),
        Some(Value::Array(_)) | Some(Value::Object(_)) => true,
    }
}

pub fn truthy(value: Option<&Value>, label: &str) -> Option<String> {
    (!is_truthy(value)).then(|| format!("`{}` property must be truthy", label))
}

pub fn falsy(value: Option<&Value>, label: &str) -> Option<String> {
    is_truthy(value).then(|| format!("`{}` property must be falsy", label))
}

pub fn defined(value: Option<&Value>, label: &str) -> Option<String> {
    value.is_none().then(|| format!("`{}` property must be defined", label))
}

pub fn undefined(value: Option<&Value>, label: &str) -> Option<String> {
    value.is_some().then(|| format!("`{}` property must be undefined", label))
}

/// Regex checks on string values. Non-strings are skipped.
pub fn pattern(
    value: Option<&Value>,
    label: &str,
    must_match: Option<&Regex>,
    must_not_match: Option<&Regex>,
) -> Option<String> {
    let text = value?.as_str()?;
    if let Some(re) = must_match {
        if !re.is_match(text) {
            return Some(format!("`{}` must match the pattern '{}'", label, re.as_str()));
        }
    }
    if let Some(re) = must_not_match {
        if re.is_match(text) {
            return Some(format!("`{}` must not match the pattern '{}'", label, re.as_str()));
        }
    }
    None
}

pub fn enumeration(value: Option<&Value>, label: &str, allowed: &[Value]) -> Option<String> {
    let value = value?;
    if allowed.contains(value) {
        return None;
    }
    let listed: Vec<String> = allowed
        .iter()
        .map(|v| v.as_str().map(str::to_string).unwrap_or_else(|| v.to_string()))
        .collect();
    Some(format!(
        "`{}` must be equal to one of the allowed values: {}",
        label,
        listed.join(", ")
    ))
}

/// Bounds on string length, collection size or numeric value
pub fn length(
    value: Option<&Value>,
    label: &str,
    min: Option<f64>,
    max: Option<f64>,
) -> Option<String> {
    let measured = match value? {
        Value::String(s) => s.chars().count() as f64,
        Value::Array(items) => items.len() as f64,
        Value::Object(map) => map.len() as f64,
        Value::Number(n) => n.as_f64()?,
        _ => return None,
    };
    if let Some(min) = min {
        if measured < min {
            return Some(format!("`{}` must be longer than {}", label, min));
        }
    }
    if let Some(max) = max {
        if measured > max {
            return Some(format!("`{}` must be shorter than {}", label, max));
        }
    }
    None
}

/// Naming conventions accepted by the `casing` function
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CasingType {
    Flat,
    Camel,
    Pascal,
    Kebab,
    Cobol,
    Snake,
    Macro,
}

static CASING_PATTERNS: OnceLock<[Regex; 7]> = OnceLock::new();

fn casing_patterns() -> &'static [Regex; 7] {
    CASING_PATTERNS.get_or_init(|| {
        [
            r"^[a-z][a-z0-9]*$",
            r"^[a-z][a-z0-9]*(?:[A-Z0-9][a-z0-9]*)*$",
            r"^[A-Z][a-z0-9]*(?:[A-Z0-9][a-z0-9]*)*$",
            r"^[a-z][a-z0-9]*(?:-[a-z0-9]+)*$",
            r"^[A-Z][A-Z0-9]*(?:-[A-Z0-9]+)*$",
            r"^[a-z][a-z0-9]*(?:_[a-z0-9]+)*$",
            r"^[A-Z][A-Z0-9]*(?:_[A-Z0-9]+)*$",
        ]
        .map(|p| Regex::new(p).unwrap())
    })
}

impl CasingType {
    pub fn as_str(self) -> &'static str {
        match self {
            CasingType::Flat => "flat",
            CasingType::Camel => "camel",
            CasingType::Pascal => "pascal",
            CasingType::Kebab => "kebab",
            CasingType::Cobol => "cobol",
            CasingType::Snake => "snake",
            CasingType::Macro => "macro",
        }
    }

    fn regex(self) -> &'static Regex {
        &casing_patterns()[self as usize]
    }

    pub fn matches(self, text: &str) -> bool {
        self.regex().is_match(text)
    }
}

pub fn casing(value: Option<&Value>, label: &str, casing_type: CasingType) -> Option<String> {
    let text = value?.as_str()?;
    (!casing_type.matches(text))
        .then(|| format!("`{}` must be {} case", label, casing_type.as_str()))
}
