//! Audit pipeline
//!
//! ```text
//! document -> resolver -> rule engine -> violations -> classify -> score -> grade
//! ```
//!
//! A resolver failure degrades to a note on the result. Anything else that
//! goes wrong is an `AuditError` for that one document.

use crate::config::LoadedConfig;
use crate::document::{load_document, DocumentError, DocumentResolver, LocalRefResolver};
use crate::models::{AuditResult, AuditSummary, Grade, Violation};
use crate::rules::{EngineError, PathWalkEngine, RuleEngine};
use crate::scoring;
use chrono::Utc;
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Debug, Error)]
pub enum AuditError {
    #[error("file not found: {}", path.display())]
    NotFound { path: PathBuf },

    #[error(transparent)]
    Document(#[from] DocumentError),

    #[error("rule evaluation failed for {}: {source}", path.display())]
    Evaluation {
        path: PathBuf,
        #[source]
        source: EngineError,
    },
}

impl AuditError {
    /// The document the failure relates to
    pub fn path(&self) -> &Path {
        match self {
            AuditError::NotFound { path } | AuditError::Evaluation { path, .. } => path.as_path(),
            AuditError::Document(DocumentError::Read { path, .. })
            | AuditError::Document(DocumentError::Parse { path, .. }) => path.as_path(),
        }
    }
}

/// Audits contract documents against a loaded configuration.
///
/// Holds no per-run state; one auditor can serve concurrent audits.
pub struct Auditor {
    config: Arc<LoadedConfig>,
    engine: Box<dyn RuleEngine>,
    resolver: Box<dyn DocumentResolver>,
}

impl Auditor {
    pub fn new(config: Arc<LoadedConfig>) -> Self {
        Self {
            config,
            engine: Box::new(PathWalkEngine::new()),
            resolver: Box::new(LocalRefResolver),
        }
    }

    pub fn with_engine(mut self, engine: impl RuleEngine + 'static) -> Self {
        self.engine = Box::new(engine);
        self
    }

    pub fn with_resolver(mut self, resolver: impl DocumentResolver + 'static) -> Self {
        self.resolver = Box::new(resolver);
        self
    }

    pub fn config(&self) -> &Arc<LoadedConfig> {
        &self.config
    }

    /// Load and audit a document from disk
    pub fn audit(&self, path: &Path) -> Result<AuditResult, AuditError> {
        if !path.is_file() {
            return Err(AuditError::NotFound {
                path: path.to_path_buf(),
            });
        }
        info!("Auditing {}", path.display());
        let document = load_document(path)?;
        self.audit_document(path, &document)
    }

    /// Audit an already parsed document. `source` names it in the result.
    pub fn audit_document(
        &self,
        source: &Path,
        document: &Value,
    ) -> Result<AuditResult, AuditError> {
        let start = Instant::now();
        let timestamp = Utc::now();
        let mut notes = Vec::new();

        let resolved = match self.resolver.resolve(source, document) {
            Ok(resolved) => resolved,
            Err(e) => {
                warn!("Reference resolution failed for {}: {}", source.display(), e);
                notes.push(format!(
                    "Reference resolution failed ({}); rules were evaluated against the unresolved document",
                    e
                ));
                document.clone()
            }
        };

        let ruleset = &self.config.ruleset;
        let scoring_config = &self.config.scoring;

        let findings = self
            .engine
            .evaluate(&resolved, ruleset)
            .map_err(|source_err| AuditError::Evaluation {
                path: source.to_path_buf(),
                source: source_err,
            })?;
        debug!("Rule engine returned {} findings", findings.len());

        let violations: Vec<Violation> = findings.into_iter().map(Violation::from).collect();
        let categorized = scoring::categorize(&violations, ruleset);
        let outcome = scoring::score(&categorized, scoring_config);

        let grade = if outcome.has_fatal_errors {
            Grade::F
        } else {
            scoring::grade(outcome.final_score as f64, &scoring_config.grading_scale)
        };
        let passed = scoring::passed(grade, outcome.has_fatal_errors);
        let summary = AuditSummary::from_violations(&violations, |id| scoring_config.is_fatal(id));

        Ok(AuditResult {
            file: source.display().to_string(),
            final_score: outcome.final_score,
            grade,
            passed,
            has_fatal_errors: outcome.has_fatal_errors,
            violations,
            category_breakdown: outcome.breakdown,
            summary,
            rules_evaluated: ruleset.enabled().count(),
            timestamp,
            duration: start.elapsed().as_millis() as u64,
            notes,
        })
    }
}
