use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::shared::ValidationError;

/// Settings of the parallel document loader.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct DocumentLoadConfig {
    /// Number of documents loaded concurrently.
    #[serde(default = "default_max_workers")]
    pub max_workers: usize,
    /// Time budget, in milliseconds, for loading one document.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    /// Documents larger than this many bytes are rejected without being parsed.
    #[serde(default = "default_max_document_bytes")]
    pub max_document_bytes: u64,
}

impl DocumentLoadConfig {
    /// Default worker count. Fixed rather than derived from the host's core count so runs
    /// behave the same on every machine.
    pub const DEFAULT_MAX_WORKERS: usize = 8;

    /// Default per-document timeout in milliseconds.
    pub const DEFAULT_TIMEOUT_MS: u64 = 5_000;

    /// Default maximum document size (10 MiB).
    pub const DEFAULT_MAX_DOCUMENT_BYTES: u64 = 10 * 1024 * 1024;

    /// Returns the per-document timeout.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Validates the loader settings.
    ///
    /// Every limit must be non-zero.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let zero_field = if self.max_workers == 0 {
            Some("documents.max_workers")
        } else if self.timeout_ms == 0 {
            Some("documents.timeout_ms")
        } else if self.max_document_bytes == 0 {
            Some("documents.max_document_bytes")
        } else {
            None
        };

        match zero_field {
            Some(field) => Err(ValidationError::InvalidFieldValue {
                field: field.to_string(),
                constraint: "must be greater than 0".to_string(),
            }),
            None => Ok(()),
        }
    }
}

impl Default for DocumentLoadConfig {
    fn default() -> Self {
        Self {
            max_workers: default_max_workers(),
            timeout_ms: default_timeout_ms(),
            max_document_bytes: default_max_document_bytes(),
        }
    }
}

fn default_max_workers() -> usize {
    DocumentLoadConfig::DEFAULT_MAX_WORKERS
}

fn default_timeout_ms() -> u64 {
    DocumentLoadConfig::DEFAULT_TIMEOUT_MS
}

fn default_max_document_bytes() -> u64 {
    DocumentLoadConfig::DEFAULT_MAX_DOCUMENT_BYTES
}
