//! The canonical output schema and its enforcement.

mod canonical;
mod encoding;
mod enforce;

pub use canonical::{
    CANONICAL_COLUMNS, CONTENT_HASH_COLUMN, CanonicalColumn, NCT_ID_COLUMN,
    PROCESSING_TIMESTAMP_COLUMN, canonical_schema, column_index,
};
pub use encoding::rows_to_record_batch;
pub use enforce::{HarmonizedTable, enforce_schema};
