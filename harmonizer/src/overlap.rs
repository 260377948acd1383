//! Identifier discovery and overlap analysis between the two sources.

use std::collections::btree_map::Entry;
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::error::{ErrorKind, HarmonizerResult};
use crate::harmonizer_error;
use crate::prepare::tabular::{identifier_column, open_tabular_source};
use crate::types::TrialId;

/// Identifiers found in one source, plus how many candidates were rejected as invalid.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IdentifierDiscovery {
    pub identifiers: BTreeSet<TrialId>,
    pub rejected: usize,
}

/// Document files found in the document directory, keyed by the identifier in their name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DocumentDiscovery {
    pub files: BTreeMap<TrialId, PathBuf>,
    pub rejected: usize,
}

impl DocumentDiscovery {
    pub fn identifiers(&self) -> BTreeSet<TrialId> {
        self.files.keys().cloned().collect()
    }

    /// Returns the discovered files of `ids`. Identifiers without a file are left out.
    pub fn files_of(&self, ids: &BTreeSet<TrialId>) -> BTreeMap<TrialId, PathBuf> {
        ids.iter()
            .filter_map(|id| self.files.get(id).map(|path| (id.clone(), path.clone())))
            .collect()
    }
}

/// Reads the identifier column of the tabular source.
///
/// Only the identifier field of each record is decoded. Rows with an invalid identifier are
/// counted as rejected. Rows the reader cannot decode are left to the tabular preparer, which
/// reports them as malformed.
pub fn discover_tabular_identifiers(path: &Path) -> HarmonizerResult<IdentifierDiscovery> {
    let mut reader = open_tabular_source(path)?;
    let id_index = identifier_column(&mut reader, path)?;

    let mut discovery = IdentifierDiscovery::default();
    let mut record = csv::ByteRecord::new();

    loop {
        match reader.read_byte_record(&mut record) {
            Ok(true) => {}
            Ok(false) => break,
            Err(err) if matches!(err.kind(), csv::ErrorKind::Io(_)) => {
                return Err(harmonizer_error!(
                    ErrorKind::SourceUnavailable,
                    "Tabular source could not be read",
                    path.display(),
                    source: err
                ));
            }
            Err(err) => {
                debug!(error = %err, "skipping undecodable tabular row during discovery");
                continue;
            }
        }

        let raw = record
            .get(id_index)
            .and_then(|bytes| std::str::from_utf8(bytes).ok())
            .unwrap_or_default();

        match TrialId::parse(raw) {
            Ok(id) => {
                discovery.identifiers.insert(id);
            }
            Err(_) => {
                debug!(raw, "skipping tabular row with invalid identifier");
                discovery.rejected += 1;
            }
        }
    }

    if discovery.rejected > 0 {
        warn!(
            rejected = discovery.rejected,
            "tabular source contains rows without a valid identifier"
        );
    }

    Ok(discovery)
}

/// Lists the document files available in the document directory.
///
/// Only file names are inspected. `{identifier}.{extension}` files are kept with the
/// extension and identifier matched case-insensitively, files with another extension are
/// ignored and files whose stem is not a valid identifier are counted as rejected. When
/// several names resolve to the same identifier the lexically smallest one is kept and the
/// others are counted as rejected.
pub async fn discover_document_identifiers(
    dir: &Path,
    extension: &str,
) -> HarmonizerResult<DocumentDiscovery> {
    let mut entries = tokio::fs::read_dir(dir).await.map_err(|err| {
        harmonizer_error!(
            ErrorKind::SourceUnavailable,
            "Document source is unavailable",
            dir.display(),
            source: err
        )
    })?;

    let mut discovery = DocumentDiscovery::default();

    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        let matches_extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case(extension));
        if !matches_extension || !entry.file_type().await?.is_file() {
            continue;
        }

        let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or_default();
        let Ok(id) = TrialId::parse(stem) else {
            debug!(file = %path.display(), "skipping document with invalid identifier name");
            discovery.rejected += 1;
            continue;
        };

        match discovery.files.entry(id) {
            Entry::Vacant(entry) => {
                entry.insert(path);
            }
            Entry::Occupied(mut entry) => {
                warn!(
                    nct_id = %entry.key(),
                    kept = %entry.get().min(&path).display(),
                    skipped = %entry.get().max(&path).display(),
                    "several documents resolve to the same identifier, keeping one"
                );
                if path < *entry.get() {
                    entry.insert(path);
                }
                discovery.rejected += 1;
            }
        }
    }

    Ok(discovery)
}

/// Partition of the identifier universe of a run.
///
/// `overlap`, `tabular_only` and `document_only` are disjoint and their union is every
/// identifier found in either source.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OverlapStats {
    pub overlap: BTreeSet<TrialId>,
    pub tabular_only: BTreeSet<TrialId>,
    pub document_only: BTreeSet<TrialId>,
}

/// Counts derived from [`OverlapStats`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct OverlapSummary {
    pub tabular_total: usize,
    pub document_total: usize,
    pub overlap_count: usize,
    pub tabular_only_count: usize,
    pub document_only_count: usize,
    pub overlap_percentage: f64,
}

impl OverlapStats {
    pub fn tabular_total(&self) -> usize {
        self.overlap.len() + self.tabular_only.len()
    }

    pub fn document_total(&self) -> usize {
        self.overlap.len() + self.document_only.len()
    }

    /// Share of tabular identifiers that also have a document, in percent.
    pub fn overlap_percentage(&self) -> f64 {
        let total = self.tabular_total();
        if total == 0 {
            return 0.0;
        }

        self.overlap.len() as f64 / total as f64 * 100.0
    }

    /// Identifiers the tabular preparer has to load.
    pub fn tabular_identifiers(&self) -> BTreeSet<TrialId> {
        self.overlap.union(&self.tabular_only).cloned().collect()
    }

    /// Identifiers the document preparer has to load.
    pub fn document_identifiers(&self) -> BTreeSet<TrialId> {
        self.overlap.union(&self.document_only).cloned().collect()
    }

    pub fn summary(&self) -> OverlapSummary {
        OverlapSummary {
            tabular_total: self.tabular_total(),
            document_total: self.document_total(),
            overlap_count: self.overlap.len(),
            tabular_only_count: self.tabular_only.len(),
            document_only_count: self.document_only.len(),
            overlap_percentage: self.overlap_percentage(),
        }
    }
}

/// Splits the two identifier sets into their intersection and the two differences.
pub fn analyze_overlap(tabular: &BTreeSet<TrialId>, document: &BTreeSet<TrialId>) -> OverlapStats {
    let overlap: BTreeSet<TrialId> = tabular.intersection(document).cloned().collect();
    let tabular_only = tabular.difference(document).cloned().collect();
    let document_only = document.difference(&overlap).cloned().collect();

    let stats = OverlapStats {
        overlap,
        tabular_only,
        document_only,
    };

    info!(
        tabular_total = stats.tabular_total(),
        document_total = stats.document_total(),
        overlap = stats.overlap.len(),
        overlap_percentage = stats.overlap_percentage(),
        "analyzed source overlap"
    );

    stats
}
