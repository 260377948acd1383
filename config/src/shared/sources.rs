use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::shared::ValidationError;

/// Locations of the two registry sources.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct SourcesConfig {
    /// Path of the tabular registry export.
    pub tabular_path: PathBuf,
    /// Directory holding one structured document per identifier.
    pub documents_dir: PathBuf,
    /// File extension of the structured documents, without the leading dot.
    #[serde(default = "default_document_extension")]
    pub document_extension: String,
}

impl SourcesConfig {
    /// Default extension of structured documents.
    pub const DEFAULT_DOCUMENT_EXTENSION: &'static str = "json";

    /// Creates a source configuration with the default document extension.
    pub fn new(tabular_path: impl Into<PathBuf>, documents_dir: impl Into<PathBuf>) -> Self {
        Self {
            tabular_path: tabular_path.into(),
            documents_dir: documents_dir.into(),
            document_extension: default_document_extension(),
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.tabular_path.as_os_str().is_empty() {
            return Err(ValidationError::EmptyPath("sources.tabular_path".to_string()));
        }
        if self.documents_dir.as_os_str().is_empty() {
            return Err(ValidationError::EmptyPath("sources.documents_dir".to_string()));
        }
        if self.document_extension.is_empty() || self.document_extension.starts_with('.') {
            return Err(ValidationError::InvalidFieldValue {
                field: "sources.document_extension".to_string(),
                constraint: "must be non-empty and must not start with a dot".to_string(),
            });
        }

        Ok(())
    }
}

fn default_document_extension() -> String {
    SourcesConfig::DEFAULT_DOCUMENT_EXTENSION.to_string()
}
