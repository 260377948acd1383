//! Tabular registry export.
//!
//! The export is a CSV file with a header row. Columns are located by header name, so their
//! order does not matter and any column other than the identifier may be missing.

use std::collections::{BTreeSet, HashSet};
use std::fs::File;
use std::path::Path;

use chrono::NaiveDate;
use metrics::counter;
use serde::Serialize;
use tracing::{info, warn};

use crate::conversions::bool::parse_flag;
use crate::conversions::date::parse_date;
use crate::conversions::list::split_list;
use crate::conversions::numeric::parse_i64_lenient;
use crate::error::{ErrorKind, HarmonizerResult};
use crate::harmonizer_error;
use crate::metrics::HARMONIZER_TABULAR_ROWS_REJECTED_TOTAL;
use crate::types::TrialId;

/// Header of the identifier column.
pub const IDENTIFIER_HEADER: &str = "NCT Number";

/// Byte order mark some exporters put in front of the first header.
const BYTE_ORDER_MARK: char = '\u{feff}';

/// One tabular row with its columns renamed and typed.
#[derive(Debug, Clone, PartialEq)]
pub struct TabularRecord {
    pub nct_id: TrialId,
    pub title: Option<String>,
    pub study_url: Option<String>,
    pub acronym: Option<String>,
    pub overall_status: Option<String>,
    pub brief_summary: Option<String>,
    pub has_results: Option<bool>,
    pub conditions: Vec<String>,
    pub interventions: Vec<String>,
    pub lead_sponsor: Option<String>,
    pub collaborators: Vec<String>,
    pub sex: Option<String>,
    pub minimum_age: Option<String>,
    pub study_phase: Option<String>,
    pub enrollment: Option<i64>,
    pub study_type: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub primary_completion_date: Option<NaiveDate>,
    pub completion_date: Option<NaiveDate>,
    pub first_posted: Option<NaiveDate>,
    pub last_update_posted: Option<NaiveDate>,
    pub document_urls: Vec<String>,
    pub locations: Vec<String>,
}

impl TabularRecord {
    /// Creates a record that carries only its identifier.
    pub fn new(nct_id: TrialId) -> Self {
        Self {
            nct_id,
            title: None,
            study_url: None,
            acronym: None,
            overall_status: None,
            brief_summary: None,
            has_results: None,
            conditions: Vec::new(),
            interventions: Vec::new(),
            lead_sponsor: None,
            collaborators: Vec::new(),
            sex: None,
            minimum_age: None,
            study_phase: None,
            enrollment: None,
            study_type: None,
            start_date: None,
            primary_completion_date: None,
            completion_date: None,
            first_posted: None,
            last_update_posted: None,
            document_urls: Vec::new(),
            locations: Vec::new(),
        }
    }
}

/// Row counts of one tabular preparation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TabularCounts {
    pub requested: usize,
    pub prepared: usize,
    pub duplicate_rows: usize,
    pub malformed_rows: usize,
}

/// Output of [`prepare_tabular`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TabularPreparation {
    pub records: Vec<TabularRecord>,
    pub counts: TabularCounts,
}

/// Column positions resolved from the header row.
#[derive(Debug)]
struct TabularColumns {
    nct_id: usize,
    title: Option<usize>,
    study_url: Option<usize>,
    acronym: Option<usize>,
    overall_status: Option<usize>,
    brief_summary: Option<usize>,
    has_results: Option<usize>,
    conditions: Option<usize>,
    interventions: Option<usize>,
    lead_sponsor: Option<usize>,
    collaborators: Option<usize>,
    sex: Option<usize>,
    minimum_age: Option<usize>,
    study_phase: Option<usize>,
    enrollment: Option<usize>,
    study_type: Option<usize>,
    start_date: Option<usize>,
    primary_completion_date: Option<usize>,
    completion_date: Option<usize>,
    first_posted: Option<usize>,
    last_update_posted: Option<usize>,
    document_urls: Option<usize>,
    locations: Option<usize>,
}

impl TabularColumns {
    fn resolve(headers: &csv::StringRecord, nct_id: usize) -> Self {
        let find = |name: &str| headers.iter().position(|h| normalize_header(h) == name);

        Self {
            nct_id,
            title: find("Study Title"),
            study_url: find("Study URL"),
            acronym: find("Acronym"),
            overall_status: find("Study Status"),
            brief_summary: find("Brief Summary"),
            has_results: find("Study Results"),
            conditions: find("Conditions"),
            interventions: find("Interventions"),
            lead_sponsor: find("Sponsor"),
            collaborators: find("Collaborators"),
            sex: find("Sex"),
            minimum_age: find("Age"),
            study_phase: find("Phases"),
            enrollment: find("Enrollment"),
            study_type: find("Study Type"),
            start_date: find("Start Date"),
            primary_completion_date: find("Primary Completion Date"),
            completion_date: find("Completion Date"),
            first_posted: find("First Posted"),
            last_update_posted: find("Last Update Posted"),
            document_urls: find("Study Documents"),
            locations: find("Locations"),
        }
    }

    fn build(&self, nct_id: TrialId, row: &csv::StringRecord) -> TabularRecord {
        let text = |index: Option<usize>| {
            index
                .and_then(|i| row.get(i))
                .map(str::trim)
                .filter(|value| !value.is_empty())
                .map(str::to_string)
        };
        let raw = |index: Option<usize>| index.and_then(|i| row.get(i)).unwrap_or_default();

        TabularRecord {
            nct_id,
            title: text(self.title),
            study_url: text(self.study_url),
            acronym: text(self.acronym),
            overall_status: text(self.overall_status),
            brief_summary: text(self.brief_summary),
            has_results: parse_flag(raw(self.has_results)),
            conditions: split_list(raw(self.conditions)),
            interventions: split_list(raw(self.interventions)),
            lead_sponsor: text(self.lead_sponsor),
            collaborators: split_list(raw(self.collaborators)),
            sex: text(self.sex),
            minimum_age: text(self.minimum_age),
            study_phase: text(self.study_phase),
            enrollment: parse_i64_lenient(raw(self.enrollment)),
            study_type: text(self.study_type),
            start_date: parse_date(raw(self.start_date)),
            primary_completion_date: parse_date(raw(self.primary_completion_date)),
            completion_date: parse_date(raw(self.completion_date)),
            first_posted: parse_date(raw(self.first_posted)),
            last_update_posted: parse_date(raw(self.last_update_posted)),
            document_urls: split_list(raw(self.document_urls)),
            locations: split_list(raw(self.locations)),
        }
    }
}

fn normalize_header(header: &str) -> &str {
    header.trim_start_matches(BYTE_ORDER_MARK).trim()
}

/// Opens the tabular export. A missing or unreadable file is fatal.
pub(crate) fn open_tabular_source(path: &Path) -> HarmonizerResult<csv::Reader<File>> {
    csv::ReaderBuilder::new()
        .has_headers(true)
        .from_path(path)
        .map_err(|err| {
            harmonizer_error!(
                ErrorKind::SourceUnavailable,
                "Tabular source is unavailable",
                path.display(),
                source: err
            )
        })
}

/// Returns the position of the identifier column.
pub(crate) fn identifier_column(
    reader: &mut csv::Reader<File>,
    path: &Path,
) -> HarmonizerResult<usize> {
    let headers = reader.headers().map_err(|err| {
        harmonizer_error!(
            ErrorKind::SourceUnavailable,
            "Tabular source header could not be read",
            path.display(),
            source: err
        )
    })?;

    headers
        .iter()
        .position(|header| normalize_header(header) == IDENTIFIER_HEADER)
        .ok_or_else(|| {
            harmonizer_error!(
                ErrorKind::SourceSchemaError,
                "Tabular source has no identifier column",
                format!("`{IDENTIFIER_HEADER}` is missing from {}", path.display())
            )
        })
}

/// Loads the tabular rows of the requested identifiers.
///
/// An empty `ids` set returns an empty preparation without opening the file. Rows whose
/// identifier is not requested are skipped. When an identifier occurs more than once the
/// first row wins and later rows are counted as duplicates. Rows the CSV reader cannot
/// decode are counted as malformed and skipped.
pub fn prepare_tabular(
    path: &Path,
    ids: &BTreeSet<TrialId>,
) -> HarmonizerResult<TabularPreparation> {
    if ids.is_empty() {
        return Ok(TabularPreparation::default());
    }

    let mut reader = open_tabular_source(path)?;
    let id_index = identifier_column(&mut reader, path)?;
    let columns = {
        let headers = reader.headers()?;
        TabularColumns::resolve(headers, id_index)
    };

    let mut counts = TabularCounts {
        requested: ids.len(),
        ..TabularCounts::default()
    };
    let mut seen = HashSet::with_capacity(ids.len());
    let mut records = Vec::with_capacity(ids.len());

    for row in reader.records() {
        let row = match row {
            Ok(row) => row,
            Err(err) if matches!(err.kind(), csv::ErrorKind::Io(_)) => {
                return Err(harmonizer_error!(
                    ErrorKind::SourceUnavailable,
                    "Tabular source could not be read",
                    path.display(),
                    source: err
                ));
            }
            Err(err) => {
                warn!(error = %err, "skipping malformed tabular row");
                counts.malformed_rows += 1;
                continue;
            }
        };

        let Some(nct_id) = row
            .get(columns.nct_id)
            .and_then(|raw| TrialId::parse(raw).ok())
        else {
            continue;
        };
        if !ids.contains(&nct_id) {
            continue;
        }
        if !seen.insert(nct_id.clone()) {
            warn!(%nct_id, "duplicate tabular row, keeping the first occurrence");
            counts.duplicate_rows += 1;
            continue;
        }

        records.push(columns.build(nct_id, &row));
    }

    counts.prepared = records.len();
    let rejected = counts.duplicate_rows + counts.malformed_rows;
    if rejected > 0 {
        counter!(HARMONIZER_TABULAR_ROWS_REJECTED_TOTAL).increment(rejected as u64);
    }

    info!(
        requested = counts.requested,
        prepared = counts.prepared,
        duplicate_rows = counts.duplicate_rows,
        malformed_rows = counts.malformed_rows,
        "prepared tabular records"
    );

    Ok(TabularPreparation { records, counts })
}
