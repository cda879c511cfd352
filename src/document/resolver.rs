//! Reference pre-resolution
//!
//! Runs before rule evaluation. A failure here never aborts an audit: the
//! caller records a note and evaluates the unresolved document instead.

use serde_json::{Map, Value};
use std::path::Path;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error, PartialEq)]
pub enum ResolveError {
    #[error("external reference '{0}' cannot be resolved locally")]
    External(String),

    #[error("reference '{0}' points to nothing")]
    Missing(String),

    #[error("circular reference '{0}'")]
    Circular(String),

    #[error("`$ref` must be a string (got {0})")]
    Invalid(String),
}

/// Produces a document with cross-references dereferenced
pub trait DocumentResolver: Send + Sync {
    fn resolve(&self, source: &Path, document: &Value) -> Result<Value, ResolveError>;
}

/// Leaves the document untouched
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopResolver;

impl DocumentResolver for NoopResolver {
    fn resolve(&self, _source: &Path, document: &Value) -> Result<Value, ResolveError> {
        Ok(document.clone())
    }
}

/// Inlines `#/...` references within the same document.
///
/// Keys next to a `$ref` are laid over the resolved target, so a local
/// `description` wins over the referenced one.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalRefResolver;

impl DocumentResolver for LocalRefResolver {
    fn resolve(&self, source: &Path, document: &Value) -> Result<Value, ResolveError> {
        let mut stack = Vec::new();
        let mut inlined = 0usize;
        let resolved = inline(document, document, &mut stack, &mut inlined)?;
        debug!("Inlined {} references in {}", inlined, source.display());
        Ok(resolved)
    }
}

fn inline(
    root: &Value,
    node: &Value,
    stack: &mut Vec<String>,
    inlined: &mut usize,
) -> Result<Value, ResolveError> {
    match node {
        Value::Object(map) => match map.get("$ref") {
            Some(Value::String(reference)) => {
                let pointer = reference
                    .strip_prefix('#')
                    .ok_or_else(|| ResolveError::External(reference.clone()))?;
                if stack.iter().any(|r| r == reference) {
                    return Err(ResolveError::Circular(reference.clone()));
                }
                let target = root
                    .pointer(pointer)
                    .ok_or_else(|| ResolveError::Missing(reference.clone()))?;

                stack.push(reference.clone());
                let resolved = inline(root, target, stack, inlined);
                stack.pop();
                let mut resolved = resolved?;
                *inlined += 1;

                if let Value::Object(target_map) = &mut resolved {
                    for (key, value) in map.iter().filter(|(k, _)| k.as_str() != "$ref") {
                        target_map.insert(key.clone(), inline(root, value, stack, inlined)?);
                    }
                }
                Ok(resolved)
            }
            Some(other) => Err(ResolveError::Invalid(other.to_string())),
            None => {
                let mut out = Map::with_capacity(map.len());
                for (key, value) in map {
                    out.insert(key.clone(), inline(root, value, stack, inlined)?);
                }
                Ok(Value::Object(out))
            }
        },
        Value::Array(items) => Ok(Value::Array(
            items
                .iter()
                .map(|item| inline(root, item, stack, inlined))
                .collect::<Result<_, _>>()?,
        )),
        other => Ok(other.clone()),
    }
}
