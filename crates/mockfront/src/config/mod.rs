//! Rule-definition document loading.
//!
//! A document is a JSON or YAML array of [`RawRule`] records. Loading only
//! decodes the document; canonicalization and validation happen when the
//! route table is compiled.

mod rules;

use std::path::Path;

use thiserror::Error;
use tracing::info;

pub use rules::{DelaySpec, Payload, RawRule};

/// Errors raised while reading or decoding a rule document.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read rule file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid JSON rule document: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid YAML rule document: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Encoding of a rule document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Json,
    Yaml,
}

impl DocumentFormat {
    /// Pick the format from a file extension; anything not YAML is read as JSON.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Self {
        match path
            .as_ref()
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase())
            .as_deref()
        {
            Some("yaml") | Some("yml") => DocumentFormat::Yaml,
            _ => DocumentFormat::Json,
        }
    }
}

/// Read and decode the rule document at `path`.
pub fn load_rules<P: AsRef<Path>>(path: P) -> Result<Vec<RawRule>, ConfigError> {
    let path = path.as_ref();
    info!("Reading rule file [{}]", path.display());
    let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.display().to_string(),
        source,
    })?;
    parse_rules(&contents, DocumentFormat::from_path(path))
}

/// Decode a rule document held in memory.
pub fn parse_rules(contents: &str, format: DocumentFormat) -> Result<Vec<RawRule>, ConfigError> {
    let rules = match format {
        DocumentFormat::Json => serde_json::from_str(contents)?,
        DocumentFormat::Yaml => serde_yaml::from_str(contents)?,
    };
    Ok(rules)
}
