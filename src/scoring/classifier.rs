//! Violation categorization

use crate::models::{Category, Violation};
use crate::rules::ResolvedRuleset;
use std::collections::BTreeMap;

const PREFIXES: [(&str, Category); 4] = [
    ("sec-", Category::Security),
    ("com-", Category::Completeness),
    ("str-", Category::Structure),
    ("cns-", Category::Consistency),
];

/// Assign a rule to exactly one scored category
pub fn classify(rule_id: &str, tags: &[String]) -> Category {
    if let Some(category) = Category::SCORED
        .into_iter()
        .find(|c| tags.iter().any(|t| t == c.as_str()))
    {
        return category;
    }

    PREFIXES
        .iter()
        .find(|(prefix, _)| rule_id.starts_with(prefix))
        .map(|(_, category)| *category)
        .unwrap_or(Category::Completeness)
}

/// Group violations by category. Every configured category gets an entry,
/// empty or not.
pub fn categorize(
    violations: &[Violation],
    ruleset: &ResolvedRuleset,
) -> BTreeMap<Category, Vec<Violation>> {
    let mut grouped: BTreeMap<Category, Vec<Violation>> =
        Category::ALL.into_iter().map(|c| (c, Vec::new())).collect();

    for violation in violations {
        let category = classify(&violation.rule_id, ruleset.tags(&violation.rule_id));
        grouped.entry(category).or_default().push(violation.clone());
    }
    grouped
}
