//! JSON reporter
//!
//! Outputs the full AuditResult as pretty-printed JSON. Field names are the
//! flat camelCase contract read by CI annotations and PR comment bots.

use crate::models::AuditResult;
use anyhow::Result;

/// Render result as JSON
pub fn render(result: &AuditResult) -> Result<String> {
    Ok(serde_json::to_string_pretty(result)?)
}
