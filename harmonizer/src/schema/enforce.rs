use arrow::datatypes::SchemaRef;
use arrow::record_batch::RecordBatch;
use chrono::{DateTime, Utc};
use metrics::counter;
use tracing::{debug, info};

use crate::conversions::cast::cast_cell;
use crate::error::HarmonizerResult;
use crate::hash::stable_hash;
use crate::metrics::HARMONIZER_COERCION_FAILURES_TOTAL;
use crate::schema::canonical::{
    CANONICAL_COLUMNS, CONTENT_HASH_COLUMN, PROCESSING_TIMESTAMP_COLUMN, canonical_schema,
    column_index,
};
use crate::schema::encoding::rows_to_record_batch;
use crate::strategy::CoalescedRecord;
use crate::types::{Cell, TableRow, TrialId};

/// The canonical output table: rows sorted by identifier, every value typed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HarmonizedTable {
    ids: Vec<TrialId>,
    rows: Vec<TableRow>,
    coercion_failures: usize,
}

impl HarmonizedTable {
    pub fn schema(&self) -> SchemaRef {
        canonical_schema()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn rows(&self) -> &[TableRow] {
        &self.rows
    }

    /// Row identifiers, aligned with [`HarmonizedTable::rows`].
    pub fn ids(&self) -> &[TrialId] {
        &self.ids
    }

    /// Number of values replaced by a typed null because they could not be cast.
    pub fn coercion_failures(&self) -> usize {
        self.coercion_failures
    }

    /// Returns the row of `id`, if present.
    pub fn row(&self, id: &TrialId) -> Option<&TableRow> {
        self.ids
            .binary_search(id)
            .ok()
            .and_then(|index| self.rows.get(index))
    }

    /// Returns the value of `column` in the row of `id`.
    pub fn cell(&self, id: &TrialId, column: &str) -> Option<&Cell> {
        let index = column_index(column)?;
        self.row(id)?.get(index)
    }

    /// Encodes the rows at `indices` into a batch with the canonical schema.
    pub fn to_record_batch(&self, indices: &[usize]) -> HarmonizerResult<RecordBatch> {
        let rows: Vec<&TableRow> = indices.iter().filter_map(|i| self.rows.get(*i)).collect();
        rows_to_record_batch(&rows, &canonical_schema())
    }
}

/// Casts the coalesced records into the canonical schema.
///
/// Every record gets exactly the canonical columns in canonical order. Values that cannot be
/// cast become typed nulls and are counted. `processed_at` fills the timestamp column of every
/// row so callers control whether reruns are byte-identical.
pub fn enforce_schema(
    mut records: Vec<CoalescedRecord>,
    processed_at: DateTime<Utc>,
) -> HarmonizedTable {
    records.sort_by(|a, b| a.nct_id.cmp(&b.nct_id));

    let mut table = HarmonizedTable {
        ids: Vec::with_capacity(records.len()),
        rows: Vec::with_capacity(records.len()),
        coercion_failures: 0,
    };

    for record in records {
        let mut values = Vec::with_capacity(CANONICAL_COLUMNS.len());

        for column in &CANONICAL_COLUMNS {
            let value = match column.name {
                CONTENT_HASH_COLUMN => Cell::U64(stable_hash(record.nct_id.as_str())),
                PROCESSING_TIMESTAMP_COLUMN => Cell::TimestampTz(processed_at),
                name => match record.get(name) {
                    None => column.column_type.null_cell(),
                    Some(cell) => match cast_cell(cell.clone(), column.column_type) {
                        Ok(cast) => cast,
                        Err(err) => {
                            debug!(
                                nct_id = %record.nct_id,
                                column = name,
                                error = %err,
                                "value could not be cast, substituting null"
                            );
                            table.coercion_failures += 1;
                            column.column_type.null_cell()
                        }
                    },
                },
            };
            values.push(value);
        }

        table.ids.push(record.nct_id);
        table.rows.push(TableRow::new(values));
    }

    if table.coercion_failures > 0 {
        counter!(HARMONIZER_COERCION_FAILURES_TOTAL).increment(table.coercion_failures as u64);
    }
    info!(
        rows = table.len(),
        coercion_failures = table.coercion_failures,
        "enforced canonical schema"
    );

    table
}
