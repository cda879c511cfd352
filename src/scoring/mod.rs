//! Contract Quality Scoring
//!
//! Converts violations into a 0-100 score and a letter grade.
//!
//! # Scoring Formula
//!
//! ```text
//! Final Score = max(0, base_score - Σ category_points × category_weight)
//!
//! Where per category:
//!   category_points = Σ penalty(violation)
//!   penalty = configured points for the rule, otherwise
//!             10 (error) / 5 (warn) / 2 (info, hint)
//! ```
//!
//! Any violation of a rule whose penalty is marked `fatal` short-circuits
//! the weighted math: the score is 0 and the grade is F.
//!
//! # Categories
//!
//! Violations are classified by tag first (security, completeness,
//! structure, consistency, in that priority), then by rule id prefix
//! (`sec-`, `com-`, `str-`, `cns-`), defaulting to completeness. The
//! architecture weight is configurable but no violation is classified into
//! it.
//!
//! # Example
//!
//! One completeness violation with a 30 point penalty at weight 0.25:
//! 100 - 30 × 0.25 = 92.5, reported as 93 (A).

mod calculator;
mod classifier;
mod grade;

pub use calculator::{default_points, penalty_points, score, ScoreOutcome};
pub use classifier::{categorize, classify};
pub use grade::{grade, passed};
