//! Per-request entry point: lookup, match, delay, result.

use super::delay::simulated_delay;
use super::matcher::select;
use super::types::{RouteTable, RuleRecord};
use bytes::Bytes;
use std::collections::HashMap;
use std::fmt;
use std::time::Duration;
use tracing::debug;

/// Why a request was not answered with a canned response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotMatchedReason {
    /// No rule group exists for the request's `(uri, method)`
    RouteNotMapped,
    /// The group exists but no rule's parameters equal the request's
    NoMatch,
}

impl NotMatchedReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotMatchedReason::RouteNotMapped => "route_not_mapped",
            NotMatchedReason::NoMatch => "no_match",
        }
    }
}

impl fmt::Display for NotMatchedReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of dispatching one request.
#[derive(Debug, Clone, PartialEq)]
pub enum MatchResult<'a> {
    Matched {
        headers: &'a HashMap<String, String>,
        body: Bytes,
        /// Source index of the selected rule
        rule_index: usize,
        /// Latency that was applied before returning
        delay: Duration,
    },
    NotMatched(NotMatchedReason),
}

impl MatchResult<'_> {
    pub fn is_matched(&self) -> bool {
        matches!(self, MatchResult::Matched { .. })
    }
}

/// Resolves requests against an immutable [`RouteTable`].
///
/// Holds no per-request state; share it behind an `Arc` and call
/// [`Dispatcher::dispatch`] from any number of tasks.
#[derive(Debug)]
pub struct Dispatcher {
    table: RouteTable,
}

impl Dispatcher {
    pub fn new(table: RouteTable) -> Self {
        Self { table }
    }

    pub fn table(&self) -> &RouteTable {
        &self.table
    }

    /// Lookup and match only, without the simulated delay.
    pub fn resolve(
        &self,
        method: &str,
        uri: &str,
        params: &HashMap<String, String>,
    ) -> Result<&RuleRecord, NotMatchedReason> {
        let candidates = self
            .table
            .candidates(uri, method)
            .ok_or(NotMatchedReason::RouteNotMapped)?;
        select(candidates, params).ok_or(NotMatchedReason::NoMatch)
    }

    /// Resolve a request and, on a match, wait out the rule's simulated latency.
    ///
    /// Unmapped routes and parameter mismatches return immediately.
    pub async fn dispatch(
        &self,
        method: &str,
        uri: &str,
        params: &HashMap<String, String>,
    ) -> MatchResult<'_> {
        let record = match self.resolve(method, uri, params) {
            Ok(record) => record,
            Err(reason) => {
                debug!("{} {} not matched: {}", method, uri, reason);
                return MatchResult::NotMatched(reason);
            }
        };

        let delay = simulated_delay(record);
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        MatchResult::Matched {
            headers: record.response_headers(),
            body: record.response_body().clone(),
            rule_index: record.index(),
            delay,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{DelaySpec, RawRule};
    use crate::route::compile::compile;
    use std::sync::Arc;
    use std::time::Instant;

    fn params(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn users_dispatcher() -> Dispatcher {
        let rules: Vec<RawRule> = serde_json::from_str(
            r#"[{
                "uri": "/users",
                "method": "GET",
                "params": {"id": "7"},
                "response": {"name": "Ann"},
                "delay_in_ms": 0
            }]"#,
        )
        .unwrap();
        Dispatcher::new(compile(rules).unwrap())
    }

    #[tokio::test]
    async fn test_end_to_end_users_scenario() {
        let dispatcher = users_dispatcher();

        match dispatcher.dispatch("GET", "/users", &params(&[("id", "7")])).await {
            MatchResult::Matched {
                body, rule_index, ..
            } => {
                assert_eq!(body.as_ref(), br#"{"name":"Ann"}"#);
                assert_eq!(rule_index, 0);
            }
            other => panic!("expected match, got {other:?}"),
        }

        assert_eq!(
            dispatcher.dispatch("GET", "/users", &params(&[("id", "8")])).await,
            MatchResult::NotMatched(NotMatchedReason::NoMatch)
        );
    }

    #[tokio::test]
    async fn test_unmapped_route() {
        let dispatcher = users_dispatcher();
        assert_eq!(
            dispatcher.dispatch("GET", "/nope", &params(&[])).await,
            MatchResult::NotMatched(NotMatchedReason::RouteNotMapped)
        );
        assert_eq!(
            dispatcher.dispatch("POST", "/users", &params(&[("id", "7")])).await,
            MatchResult::NotMatched(NotMatchedReason::RouteNotMapped)
        );
    }

    #[tokio::test]
    async fn test_matched_headers_are_the_rules() {
        let mut rule = RawRule {
            uri: "/h".to_string(),
            ..Default::default()
        };
        rule.response_headers
            .insert("X-Mock".to_string(), "1".to_string());
        let dispatcher = Dispatcher::new(compile(vec![rule]).unwrap());

        match dispatcher.dispatch("GET", "/h", &params(&[])).await {
            MatchResult::Matched { headers, .. } => {
                assert_eq!(headers.get("X-Mock").map(String::as_str), Some("1"));
            }
            other => panic!("expected match, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_fixed_delay_is_applied() {
        let rule = RawRule {
            uri: "/slow".to_string(),
            delay: Some(DelaySpec::Fixed(30)),
            ..Default::default()
        };
        let dispatcher = Dispatcher::new(compile(vec![rule]).unwrap());

        let started = Instant::now();
        let result = dispatcher.dispatch("GET", "/slow", &params(&[])).await;
        assert!(started.elapsed() >= Duration::from_millis(30));
        assert!(matches!(
            result,
            MatchResult::Matched { delay, .. } if delay == Duration::from_millis(30)
        ));
    }

    #[tokio::test]
    async fn test_no_delay_when_not_matched() {
        let rule = RawRule {
            uri: "/slow".to_string(),
            params: params(&[("a", "1")]),
            delay: Some(DelaySpec::Fixed(5_000)),
            ..Default::default()
        };
        let dispatcher = Dispatcher::new(compile(vec![rule]).unwrap());

        let started = Instant::now();
        let result = dispatcher.dispatch("GET", "/slow", &params(&[])).await;
        assert_eq!(result, MatchResult::NotMatched(NotMatchedReason::NoMatch));
        assert!(started.elapsed() < Duration::from_millis(1_000));
    }

    #[tokio::test]
    async fn test_concurrent_dispatch() {
        let dispatcher = Arc::new(users_dispatcher());
        let tasks: Vec<_> = (0..32)
            .map(|i| {
                let dispatcher = Arc::clone(&dispatcher);
                tokio::spawn(async move {
                    let id = if i % 2 == 0 { "7" } else { "8" };
                    let query = params(&[("id", id)]);
                    dispatcher.dispatch("GET", "/users", &query).await.is_matched() == (i % 2 == 0)
                })
            })
            .collect();
        for task in tasks {
            assert!(task.await.unwrap());
        }
    }

    #[test]
    fn test_resolve_without_delay() {
        let dispatcher = users_dispatcher();
        let record = dispatcher
            .resolve("GET", "/users", &params(&[("id", "7")]))
            .unwrap();
        assert_eq!(record.index(), 0);
        assert_eq!(
            dispatcher.resolve("GET", "/users", &params(&[("id", "7"), ("x", "1")])),
            Err(NotMatchedReason::NoMatch)
        );
    }
}
