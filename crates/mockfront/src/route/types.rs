//! Route table data model.

use super::delay::DelayRange;
use bytes::Bytes;
use std::collections::{HashMap, HashSet};
use std::fmt;

/// `(uri, method)` pair that groups rules. Both parts compare byte for byte.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RouteKey {
    pub uri: String,
    pub method: String,
}

impl RouteKey {
    pub fn new(uri: impl Into<String>, method: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            method: method.into(),
        }
    }
}

impl fmt::Display for RouteKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.method, self.uri)
    }
}

/// One compiled rule. Created by the compiler and never modified afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct RuleRecord {
    pub(crate) index: usize,
    pub(crate) required_params: HashMap<String, String>,
    pub(crate) response_headers: HashMap<String, String>,
    pub(crate) delay: DelayRange,
    pub(crate) response_body: Bytes,
}

impl RuleRecord {
    /// Position of the rule in the source document
    pub fn index(&self) -> usize {
        self.index
    }

    /// Query parameters a request must carry, no more and no less
    pub fn required_params(&self) -> &HashMap<String, String> {
        &self.required_params
    }

    pub fn response_headers(&self) -> &HashMap<String, String> {
        &self.response_headers
    }

    pub fn delay(&self) -> DelayRange {
        self.delay
    }

    /// Canonical JSON bytes of the response payload
    pub fn response_body(&self) -> &Bytes {
        &self.response_body
    }
}

/// Compiled rules grouped by route, in source order within each group.
///
/// Lookups go `uri -> method -> rules` so a request can be resolved from
/// borrowed strings without building a [`RouteKey`].
#[derive(Debug, Default)]
pub struct RouteTable {
    pub(crate) routes: HashMap<String, HashMap<String, Vec<RuleRecord>>>,
    /// Route keys in order of first appearance, for startup listing
    pub(crate) order: Vec<RouteKey>,
    /// Every method some route is keyed under
    pub(crate) methods: HashSet<String>,
    pub(crate) rule_count: usize,
}

impl RouteTable {
    /// Candidate rules for a route, in match order.
    pub fn candidates(&self, uri: &str, method: &str) -> Option<&[RuleRecord]> {
        self.routes
            .get(uri)
            .and_then(|methods| methods.get(method))
            .map(Vec::as_slice)
    }

    pub fn get(&self, key: &RouteKey) -> Option<&[RuleRecord]> {
        self.candidates(&key.uri, &key.method)
    }

    /// Iterate over all groups in order of first appearance in the source.
    pub fn routes(&self) -> impl Iterator<Item = (&RouteKey, &[RuleRecord])> {
        self.order
            .iter()
            .filter_map(move |key| self.get(key).map(|rules| (key, rules)))
    }

    /// Whether any route is keyed under `method`.
    pub fn has_method(&self, method: &str) -> bool {
        self.methods.contains(method)
    }

    pub fn route_count(&self) -> usize {
        self.order.len()
    }

    pub fn rule_count(&self) -> usize {
        self.rule_count
    }

    pub fn is_empty(&self) -> bool {
        self.rule_count == 0
    }

    pub(crate) fn push(&mut self, key: RouteKey, record: RuleRecord) {
        let group = self
            .routes
            .entry(key.uri.clone())
            .or_default()
            .entry(key.method.clone())
            .or_default();
        if group.is_empty() {
            self.methods.insert(key.method.clone());
            self.order.push(key);
        }
        group.push(record);
        self.rule_count += 1;
    }
}
