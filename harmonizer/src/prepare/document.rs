//! Parallel loading of the structured study documents.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use harmonizer_config::shared::DocumentLoadConfig;
use metrics::counter;
use serde::Serialize;
use tracing::{info, warn};

use crate::document::{FlattenedDocument, StudyDocument};
use crate::error::{ErrorKind, HarmonizerResult};
use crate::harmonizer_error;
use crate::metrics::{HARMONIZER_DOCUMENTS_TOTAL, OUTCOME_LABEL};
use crate::types::TrialId;
use crate::workers::pool::{WorkerPool, WorkerResult};

/// Result of loading the document of one identifier.
#[derive(Debug, Clone, PartialEq)]
pub enum DocumentOutcome {
    Loaded(Box<FlattenedDocument>),
    /// No file exists for the identifier.
    Missing,
    /// The file is unreadable, is not a study document, or belongs to another identifier.
    Invalid(String),
    TimedOut,
    TooLarge { size: u64, limit: u64 },
    Panicked(String),
}

impl DocumentOutcome {
    /// Metric label of the outcome.
    pub fn label(&self) -> &'static str {
        match self {
            DocumentOutcome::Loaded(_) => "loaded",
            DocumentOutcome::Missing => "missing",
            DocumentOutcome::Invalid(_) => "invalid",
            DocumentOutcome::TimedOut => "timed_out",
            DocumentOutcome::TooLarge { .. } => "too_large",
            DocumentOutcome::Panicked(_) => "panicked",
        }
    }
}

/// Per-outcome counts of one document preparation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DocumentLoadCounts {
    pub requested: usize,
    pub loaded: usize,
    pub missing: usize,
    pub invalid: usize,
    pub timed_out: usize,
    pub too_large: usize,
    pub panicked: usize,
}

impl DocumentLoadCounts {
    /// Number of requested documents that were excluded.
    pub fn failed(&self) -> usize {
        self.missing + self.invalid + self.timed_out + self.too_large + self.panicked
    }

    fn record(&mut self, outcome: &DocumentOutcome) {
        match outcome {
            DocumentOutcome::Loaded(_) => self.loaded += 1,
            DocumentOutcome::Missing => self.missing += 1,
            DocumentOutcome::Invalid(_) => self.invalid += 1,
            DocumentOutcome::TimedOut => self.timed_out += 1,
            DocumentOutcome::TooLarge { .. } => self.too_large += 1,
            DocumentOutcome::Panicked(_) => self.panicked += 1,
        }
    }
}

/// Output of [`prepare_documents`].
///
/// `documents` holds one entry per loaded identifier in no particular order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DocumentPreparation {
    pub documents: Vec<FlattenedDocument>,
    pub counts: DocumentLoadCounts,
}

/// Loads, validates and flattens the requested documents.
///
/// `files` maps each requested identifier to the file discovery found for it in `dir`.
/// Work is spread over a pool of `settings.max_workers` concurrent loads, each bounded by
/// `settings.timeout()`. A document that is missing, oversized, malformed, slow or that
/// panics its loader is logged, counted and left out. Only a missing document directory
/// fails the call. An empty request returns immediately without touching the directory.
pub async fn prepare_documents(
    dir: &Path,
    files: &BTreeMap<TrialId, PathBuf>,
    settings: &DocumentLoadConfig,
) -> HarmonizerResult<DocumentPreparation> {
    if files.is_empty() {
        return Ok(DocumentPreparation::default());
    }

    let is_dir = tokio::fs::metadata(dir)
        .await
        .map(|metadata| metadata.is_dir())
        .unwrap_or(false);
    if !is_dir {
        return Err(harmonizer_error!(
            ErrorKind::SourceUnavailable,
            "Document source is unavailable",
            dir.display()
        ));
    }

    let mut pool = WorkerPool::new(settings.max_workers, settings.timeout());
    for (id, path) in files {
        pool.spawn(
            id.clone(),
            load_document(path.clone(), id.clone(), settings.max_document_bytes),
        )
        .await?;
    }
    let pooled = pool.wait_all().await;

    let mut counts = DocumentLoadCounts {
        requested: files.len(),
        panicked: pooled.lost,
        ..DocumentLoadCounts::default()
    };
    let mut documents = Vec::with_capacity(pooled.results.len());

    for (id, result) in pooled.results {
        let outcome = match result {
            WorkerResult::Completed(outcome) => outcome,
            WorkerResult::TimedOut => DocumentOutcome::TimedOut,
            WorkerResult::Panicked(message) => DocumentOutcome::Panicked(message),
        };

        counts.record(&outcome);
        counter!(HARMONIZER_DOCUMENTS_TOTAL, OUTCOME_LABEL => outcome.label()).increment(1);

        match outcome {
            DocumentOutcome::Loaded(document) => documents.push(*document),
            DocumentOutcome::Missing => warn!(%id, "document is missing, skipping"),
            DocumentOutcome::Invalid(reason) => warn!(%id, %reason, "document is invalid, skipping"),
            DocumentOutcome::TimedOut => warn!(%id, "document load timed out, skipping"),
            DocumentOutcome::TooLarge { size, limit } => {
                warn!(%id, size, limit, "document exceeds the size limit, skipping")
            }
            DocumentOutcome::Panicked(message) => {
                warn!(%id, %message, "document loader panicked, skipping")
            }
        }
    }

    info!(
        requested = counts.requested,
        loaded = counts.loaded,
        failed = counts.failed(),
        "prepared documents"
    );

    Ok(DocumentPreparation { documents, counts })
}

/// Loads one document file. Never fails: every problem becomes an outcome.
async fn load_document(path: PathBuf, id: TrialId, max_bytes: u64) -> DocumentOutcome {
    let metadata = match tokio::fs::metadata(&path).await {
        Ok(metadata) => metadata,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return DocumentOutcome::Missing,
        Err(err) => return DocumentOutcome::Invalid(format!("cannot stat document: {err}")),
    };
    if metadata.len() > max_bytes {
        return DocumentOutcome::TooLarge {
            size: metadata.len(),
            limit: max_bytes,
        };
    }

    let bytes = match tokio::fs::read(&path).await {
        Ok(bytes) => bytes,
        Err(err) => return DocumentOutcome::Invalid(format!("cannot read document: {err}")),
    };

    match parse_document(&id, &bytes) {
        Ok(document) => DocumentOutcome::Loaded(Box::new(FlattenedDocument::flatten(id, &document))),
        Err(reason) => DocumentOutcome::Invalid(reason),
    }
}

/// Parses and validates a document requested as `id`.
fn parse_document(id: &TrialId, bytes: &[u8]) -> Result<StudyDocument, String> {
    if !bytes.trim_ascii_start().starts_with(b"{") {
        return Err("document is not a JSON object".to_string());
    }

    let document: StudyDocument =
        serde_json::from_slice(bytes).map_err(|err| format!("malformed document: {err}"))?;

    if let Some(document_id) = document.nct_id()
        && !document_id.eq_ignore_ascii_case(id.as_str())
    {
        return Err(format!(
            "document declares identifier `{document_id}` but was requested as `{id}`"
        ));
    }

    Ok(document)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(raw: &str) -> TrialId {
        TrialId::parse(raw).unwrap()
    }

    #[test]
    fn rejects_non_object_documents() {
        assert!(parse_document(&id("NCT00000001"), b"[]").is_err());
        assert!(parse_document(&id("NCT00000001"), b"  {\"protocolSection\": ").is_err());
    }

    #[test]
    fn rejects_identifier_mismatch() {
        let body = br#"{"protocolSection":{"identificationModule":{"nctId":"NCT00000002"}}}"#;

        let reason = parse_document(&id("NCT00000001"), body).unwrap_err();

        assert!(reason.contains("NCT00000002"));
    }

    #[test]
    fn rejects_identification_without_identifier() {
        let missing = br#"{"protocolSection":{"identificationModule":{"officialTitle":"Iron"}}}"#;
        let blank = br#"{"protocolSection":{"identificationModule":{"nctId":"  "}}}"#;

        assert!(parse_document(&id("NCT00000001"), missing).is_err());
        assert!(parse_document(&id("NCT00000001"), blank).is_err());
    }

    #[test]
    fn accepts_document_without_identification() {
        let body = br#"{"protocolSection":{"statusModule":{"overallStatus":"COMPLETED"}}}"#;

        let document = parse_document(&id("NCT00000001"), body).unwrap();

        assert_eq!(document.overall_status(), Some("COMPLETED"));
    }

    #[test]
    fn failed_count_sums_every_exclusion() {
        let mut counts = DocumentLoadCounts::default();
        counts.record(&DocumentOutcome::Missing);
        counts.record(&DocumentOutcome::TimedOut);
        counts.record(&DocumentOutcome::Invalid("bad".to_string()));
        counts.record(&DocumentOutcome::Loaded(Box::new(FlattenedDocument::empty(id(
            "NCT00000003",
        )))));

        assert_eq!(counts.failed(), 3);
        assert_eq!(counts.loaded, 1);
    }
}
