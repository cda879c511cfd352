//! Letter grade mapping

use crate::config::GradingScale;
use crate::models::Grade;

/// First of A, B, C, D whose minimum the score reaches; otherwise F
pub fn grade(score: f64, scale: &GradingScale) -> Grade {
    [Grade::A, Grade::B, Grade::C, Grade::D]
        .into_iter()
        .find(|g| scale.min_for(*g).is_some_and(|min| score >= min as f64))
        .unwrap_or(Grade::F)
}

/// A run passes when it is not an F and had no fatal violations
pub fn passed(grade: Grade, has_fatal_errors: bool) -> bool {
    grade != Grade::F && !has_fatal_errors
}
