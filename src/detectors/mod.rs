//! Rule functions
//!
//! Implementations behind the symbolic `function` names used in rule
//! definitions. The rule resolver binds names to these at load time (see
//! `rules::Evaluator`), so an unknown name never reaches evaluation.
//!
//! # Functions
//!
//! - `truthy` / `falsy` / `defined` / `undefined` - presence checks
//! - `pattern` - `match` / `notMatch` regexes on strings
//! - `enumeration` - value must be one of `values`
//! - `length` - `min` / `max` on strings, collections and numbers
//! - `casing` - single value naming convention
//! - `casingConsistency` - mixed camelCase / snake_case across a subtree

pub mod casing_consistency;
pub mod core_functions;

pub use casing_consistency::{
    classify_key, detect_mixed_casing, judge, CasingStats, MixedCasing, NamingStyle,
};
pub use core_functions::{is_truthy, CasingType};
