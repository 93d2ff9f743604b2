//! Startup analysis for rules that can never be selected.
//!
//! Matching is first-match-wins with strict parameter equality, so a rule
//! whose parameters repeat an earlier rule of the same route is dead. A few
//! route shapes can also never be produced by an HTTP request. None of these
//! stop the server; they are reported so the operator can fix the document.

use super::matcher::params_equal;
use super::types::{RouteKey, RouteTable};
use std::fmt;
use tracing::warn;

/// Kind of problem found in the rule set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WarningKind {
    /// Same route and same parameters as an earlier rule
    ExactDuplicate,
    /// Method with lower-case letters; standard clients send upper-case methods
    NonCanonicalMethod,
    /// URI that a request path never equals (no leading `/`, or a query part)
    UnreachableUri,
}

impl WarningKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            WarningKind::ExactDuplicate => "exact_duplicate",
            WarningKind::NonCanonicalMethod => "non_canonical_method",
            WarningKind::UnreachableUri => "unreachable_uri",
        }
    }
}

/// A single finding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleWarning {
    pub kind: WarningKind,
    pub route: RouteKey,
    /// Source index of the affected rule
    pub rule_index: usize,
    /// Source index of the earlier rule that always wins instead
    pub shadowed_by: Option<usize>,
    pub message: String,
}

impl fmt::Display for RuleWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.kind.as_str(), self.message)
    }
}

/// Inspect every group of the table.
pub fn analyze(table: &RouteTable) -> Vec<RuleWarning> {
    let mut warnings = Vec::new();

    for (route, rules) in table.routes() {
        let first = rules[0].index();

        if route.method.chars().any(|c| c.is_ascii_lowercase()) {
            warnings.push(RuleWarning {
                kind: WarningKind::NonCanonicalMethod,
                route: route.clone(),
                rule_index: first,
                shadowed_by: None,
                message: format!(
                    "Route {route} uses method '{}'; standard clients send '{}', which does not match",
                    route.method,
                    route.method.to_ascii_uppercase()
                ),
            });
        }

        if !route.uri.starts_with('/') || route.uri.contains('?') {
            warnings.push(RuleWarning {
                kind: WarningKind::UnreachableUri,
                route: route.clone(),
                rule_index: first,
                shadowed_by: None,
                message: format!(
                    "Route {route}: URI must be a plain path starting with '/' to be reachable"
                ),
            });
        }

        for (position, rule) in rules.iter().enumerate() {
            let shadowing = rules[..position]
                .iter()
                .find(|earlier| params_equal(earlier.required_params(), rule.required_params()));
            if let Some(earlier) = shadowing {
                warnings.push(RuleWarning {
                    kind: WarningKind::ExactDuplicate,
                    route: route.clone(),
                    rule_index: rule.index(),
                    shadowed_by: Some(earlier.index()),
                    message: format!(
                        "Rule #{} for {route} has the same parameters as rule #{} and will never match",
                        rule.index(),
                        earlier.index()
                    ),
                });
            }
        }
    }

    warnings
}

/// Run [`analyze`] and log each finding at warn level. Returns the count.
pub fn log_warnings(table: &RouteTable) -> usize {
    let warnings = analyze(table);
    for warning in &warnings {
        warn!("{}", warning);
    }
    warnings.len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RawRule;
    use crate::route::compile::compile;
    use tracing_test::traced_test;

    fn rule(uri: &str, method: &str, params: &[(&str, &str)]) -> RawRule {
        RawRule {
            uri: uri.to_string(),
            method: Some(method.to_string()),
            params: params
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            ..Default::default()
        }
    }

    #[test]
    fn test_clean_table_has_no_warnings() {
        let table = compile(vec![
            rule("/users", "GET", &[("id", "1")]),
            rule("/users", "GET", &[("id", "2")]),
            rule("/users", "GET", &[]),
            rule("/users", "POST", &[]),
        ])
        .unwrap();
        assert!(analyze(&table).is_empty());
    }

    #[test]
    fn test_exact_duplicate_is_reported() {
        let table = compile(vec![
            rule("/users", "GET", &[("id", "1")]),
            rule("/other", "GET", &[]),
            rule("/users", "GET", &[("id", "1")]),
        ])
        .unwrap();

        let warnings = analyze(&table);
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].kind, WarningKind::ExactDuplicate);
        assert_eq!(warnings[0].rule_index, 2);
        assert_eq!(warnings[0].shadowed_by, Some(0));
        assert_eq!(warnings[0].route, RouteKey::new("/users", "GET"));
    }

    #[test]
    fn test_duplicates_on_different_routes_are_fine() {
        let table = compile(vec![
            rule("/users", "GET", &[("id", "1")]),
            rule("/users", "POST", &[("id", "1")]),
        ])
        .unwrap();
        assert!(analyze(&table).is_empty());
    }

    #[test]
    fn test_lowercase_method_is_reported() {
        let table = compile(vec![rule("/users", "get", &[])]).unwrap();
        let warnings = analyze(&table);
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].kind, WarningKind::NonCanonicalMethod);
        assert!(warnings[0].message.contains("'GET'"));
        assert!(warnings[0].message.contains("standard clients"));
    }

    #[test]
    fn test_unreachable_uri_is_reported() {
        let table = compile(vec![
            rule("users", "GET", &[]),
            rule("/search?q=x", "GET", &[]),
        ])
        .unwrap();
        let kinds: Vec<WarningKind> = analyze(&table).into_iter().map(|w| w.kind).collect();
        assert_eq!(
            kinds,
            vec![WarningKind::UnreachableUri, WarningKind::UnreachableUri]
        );
    }

    #[traced_test]
    #[test]
    fn test_log_warnings() {
        let table = compile(vec![rule("/a", "GET", &[]), rule("/a", "GET", &[])]).unwrap();
        assert_eq!(log_warnings(&table), 1);
        assert!(logs_contain("exact_duplicate"));
    }
}
