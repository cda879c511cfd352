//! Rule binding and evaluation
//!
//! - `evaluator` - the closed set of rule functions
//! - `resolver` - merges rulesets and binds function names at load time
//! - `engine` - the `RuleEngine` seam and the bundled selector walker

pub mod engine;
pub mod evaluator;
pub mod resolver;

pub use engine::{EngineError, PathWalkEngine, RuleEngine, Selector};
pub use evaluator::{BindError, Evaluator, KNOWN_FUNCTIONS};
pub use resolver::{
    merge_rulesets, resolve_ruleset, BoundClause, FieldRef, ResolvedRule, ResolvedRuleset,
    RuleResolutionError,
};
