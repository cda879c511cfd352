//! apigrade - scoring and rule-categorization engine for API contracts
//!
//! ```no_run
//! use apigrade::audit::Auditor;
//! use apigrade::config::ConfigLoader;
//! use std::path::Path;
//! use std::sync::Arc;
//!
//! let config = ConfigLoader::new(".").load_all()?;
//! let auditor = Auditor::new(Arc::new(config));
//! let result = auditor.audit(Path::new("openapi.yaml"))?;
//! println!("{} ({})", result.final_score, result.grade);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod audit;
pub mod config;
pub mod detectors;
pub mod document;
pub mod models;
pub mod reporters;
pub mod rules;
pub mod scoring;
