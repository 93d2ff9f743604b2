//! Raw rule records as they appear in the rule-definition document.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Arbitrary structured response payload.
///
/// YAML values are a superset of JSON values, so both document formats
/// deserialize into this type. Whether the payload has a JSON form is only
/// decided when the route table is compiled.
pub type Payload = serde_yaml::Value;

/// One rule exactly as written in the document, before compilation.
///
/// Capitalized aliases (`Uri`, `Method`, ...) accept documents written for
/// older mock servers that serialized Go-style field names.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RawRule {
    #[serde(alias = "Uri")]
    pub uri: String,
    /// Defaults to `GET` at compile time when absent or empty
    #[serde(default, alias = "Method", skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
    #[serde(default, alias = "Params", skip_serializing_if = "HashMap::is_empty")]
    pub params: HashMap<String, String>,
    #[serde(
        default,
        alias = "headers",
        alias = "Headers",
        skip_serializing_if = "HashMap::is_empty"
    )]
    pub response_headers: HashMap<String, String>,
    #[serde(
        default,
        alias = "Delay",
        alias = "delay_in_ms",
        alias = "delayInMs",
        skip_serializing_if = "Option::is_none"
    )]
    pub delay: Option<DelaySpec>,
    #[serde(default, alias = "Response")]
    pub response: Payload,
}

/// Latency configuration in milliseconds: a fixed value or an inclusive range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum DelaySpec {
    Fixed(u64),
    Range {
        #[serde(rename = "min")]
        min_ms: u64,
        #[serde(rename = "max")]
        max_ms: u64,
    },
}

impl DelaySpec {
    /// Lower and upper bound in milliseconds, upper clamped to never fall below lower.
    pub fn bounds_ms(&self) -> (u64, u64) {
        match *self {
            DelaySpec::Fixed(ms) => (ms, ms),
            DelaySpec::Range { min_ms, max_ms } => (min_ms, max_ms.max(min_ms)),
        }
    }
}
