//! Metric names emitted during harmonization runs.
//!
//! Counters go through the [`metrics`] facade and are no-ops unless the embedding process
//! installs a recorder.

/// Label carrying the outcome of a document load.
pub const OUTCOME_LABEL: &str = "outcome";

/// Label carrying the coalesce strategy of a run.
pub const STRATEGY_LABEL: &str = "strategy";

/// Counter of documents processed by the loader, labelled by [`OUTCOME_LABEL`].
pub const HARMONIZER_DOCUMENTS_TOTAL: &str = "harmonizer_documents_total";

/// Counter of requested tabular rows dropped as malformed or duplicate.
pub const HARMONIZER_TABULAR_ROWS_REJECTED_TOTAL: &str = "harmonizer_tabular_rows_rejected_total";

/// Counter of records written to the canonical table.
pub const HARMONIZER_RECORDS_HARMONIZED_TOTAL: &str = "harmonizer_records_harmonized_total";

/// Counter of values replaced by null because they could not be cast.
pub const HARMONIZER_COERCION_FAILURES_TOTAL: &str = "harmonizer_coercion_failures_total";

/// Counter of shard files written.
pub const HARMONIZER_SHARDS_WRITTEN_TOTAL: &str = "harmonizer_shards_written_total";
