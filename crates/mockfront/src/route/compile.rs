//! Compilation of raw rule records into a [`RouteTable`].
//!
//! Runs once at startup. Every response payload is serialized here so a
//! payload without a JSON form stops the server before it listens, instead
//! of failing on the first matching request.

use super::delay::DelayRange;
use super::types::{RouteKey, RouteTable, RuleRecord};
use crate::config::{Payload, RawRule};
use bytes::Bytes;
use hyper::header::{HeaderName, HeaderValue};
use thiserror::Error;
use tracing::debug;

/// Method used for rules that do not name one.
pub const DEFAULT_METHOD: &str = "GET";

/// Fatal problems found while compiling the rule set.
#[derive(Debug, Error)]
pub enum CompileError {
    #[error("rule #{index} ({method} {uri}): response cannot be serialized: {source}")]
    Serialization {
        index: usize,
        uri: String,
        method: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("rule #{index} ({method} {uri}): invalid response header '{name}': {reason}")]
    InvalidHeader {
        index: usize,
        uri: String,
        method: String,
        name: String,
        reason: String,
    },
}

/// Compile rules in source order. Either every rule compiles or nothing is returned.
pub fn compile<I>(rules: I) -> Result<RouteTable, CompileError>
where
    I: IntoIterator<Item = RawRule>,
{
    let mut table = RouteTable::default();

    for (index, rule) in rules.into_iter().enumerate() {
        let method = match rule.method {
            Some(method) if !method.is_empty() => method,
            _ => DEFAULT_METHOD.to_string(),
        };

        let response_body =
            canonical_body(&rule.response).map_err(|source| CompileError::Serialization {
                index,
                uri: rule.uri.clone(),
                method: method.clone(),
                source,
            })?;

        for (name, value) in &rule.response_headers {
            if let Err(reason) = validate_header(name, value) {
                return Err(CompileError::InvalidHeader {
                    index,
                    uri: rule.uri.clone(),
                    method: method.clone(),
                    name: name.clone(),
                    reason,
                });
            }
        }

        let record = RuleRecord {
            index,
            required_params: rule.params,
            response_headers: rule.response_headers,
            delay: DelayRange::from_spec(rule.delay.as_ref()),
            response_body,
        };

        debug!(
            "Compiled rule #{} for {} {} ({} bytes)",
            index,
            method,
            rule.uri,
            record.response_body.len()
        );
        table.push(RouteKey::new(rule.uri, method), record);
    }

    Ok(table)
}

/// Serialize a payload to compact JSON with object keys in sorted order.
///
/// NaN and infinities have no JSON form and are rejected.
pub fn canonical_body(payload: &Payload) -> Result<Bytes, serde_json::Error> {
    reject_non_finite(payload)?;
    // Going through serde_json::Value sorts keys and rejects non-string keys.
    let value = serde_json::to_value(payload)?;
    Ok(Bytes::from(serde_json::to_vec(&value)?))
}

// serde_json::to_value maps non-finite floats to null instead of failing.
fn reject_non_finite(payload: &Payload) -> Result<(), serde_json::Error> {
    match payload {
        Payload::Number(n) => match n.as_f64() {
            Some(f) if !f.is_finite() => Err(serde::ser::Error::custom(format!(
                "non-finite number {n} cannot be represented in JSON"
            ))),
            _ => Ok(()),
        },
        Payload::Sequence(items) => items.iter().try_for_each(reject_non_finite),
        Payload::Mapping(map) => map.iter().try_for_each(|(key, value)| {
            reject_non_finite(key)?;
            reject_non_finite(value)
        }),
        Payload::Tagged(tagged) => reject_non_finite(&tagged.value),
        _ => Ok(()),
    }
}

fn validate_header(name: &str, value: &str) -> Result<(), String> {
    HeaderName::from_bytes(name.as_bytes()).map_err(|e| e.to_string())?;
    HeaderValue::from_str(value).map_err(|e| e.to_string())?;
    Ok(())
}
