//! Query-parameter matching and first-match rule selection.

use super::types::RuleRecord;
use std::collections::HashMap;

/// Strict equality of parameter sets.
///
/// Same cardinality and every required pair present with an identical
/// value. A request carrying extra parameters does not match, and a rule
/// without parameters only matches requests without a query string.
pub fn params_equal(required: &HashMap<String, String>, actual: &HashMap<String, String>) -> bool {
    required.len() == actual.len()
        && required
            .iter()
            .all(|(name, expected)| actual.get(name) == Some(expected))
}

/// First candidate, in table order, whose parameters equal the request's.
pub fn select<'a>(
    candidates: &'a [RuleRecord],
    actual: &HashMap<String, String>,
) -> Option<&'a RuleRecord> {
    candidates
        .iter()
        .find(|record| params_equal(&record.required_params, actual))
}
