use std::sync::{Arc, LazyLock};

use arrow::datatypes::{Field, Schema, SchemaRef};

use crate::types::ColumnType;

/// One column of the canonical output table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CanonicalColumn {
    pub name: &'static str,
    pub column_type: ColumnType,
    pub nullable: bool,
}

impl CanonicalColumn {
    const fn new(name: &'static str, column_type: ColumnType, nullable: bool) -> Self {
        Self {
            name,
            column_type,
            nullable,
        }
    }

    /// Arrow field persisted for the column.
    pub fn arrow_field(&self) -> Field {
        Field::new(self.name, self.column_type.arrow_type(), self.nullable)
    }
}

const fn optional(name: &'static str, column_type: ColumnType) -> CanonicalColumn {
    CanonicalColumn::new(name, column_type, true)
}

const fn required(name: &'static str, column_type: ColumnType) -> CanonicalColumn {
    CanonicalColumn::new(name, column_type, false)
}

/// Column of the record identifier.
pub const NCT_ID_COLUMN: &str = "nct_id";
/// Column of the [`stable_hash`](crate::hash::stable_hash) of the identifier.
pub const CONTENT_HASH_COLUMN: &str = "content_hash";
/// Column of the run timestamp.
pub const PROCESSING_TIMESTAMP_COLUMN: &str = "processing_timestamp";

/// The canonical columns in output order.
pub const CANONICAL_COLUMNS: [CanonicalColumn; 37] = [
    required(NCT_ID_COLUMN, ColumnType::String),
    optional("title", ColumnType::String),
    optional("official_title", ColumnType::String),
    optional("brief_title", ColumnType::String),
    optional("study_url", ColumnType::String),
    optional("acronym", ColumnType::String),
    optional("overall_status", ColumnType::String),
    optional("study_type", ColumnType::String),
    optional("study_phase", ColumnType::String),
    optional("has_results", ColumnType::Bool),
    optional("brief_summary", ColumnType::String),
    optional("detailed_description", ColumnType::String),
    optional("conditions", ColumnType::StringList),
    optional("interventions", ColumnType::StringList),
    optional("condition_meshes", ColumnType::StringList),
    optional("sex", ColumnType::String),
    optional("minimum_age", ColumnType::String),
    optional("maximum_age", ColumnType::String),
    optional("healthy_volunteers", ColumnType::Bool),
    optional("enrollment", ColumnType::I64),
    optional("start_date", ColumnType::Date),
    optional("primary_completion_date", ColumnType::Date),
    optional("completion_date", ColumnType::Date),
    optional("first_posted", ColumnType::Date),
    optional("last_update_posted", ColumnType::Date),
    optional("lead_sponsor", ColumnType::String),
    optional("collaborators", ColumnType::StringList),
    optional("document_urls", ColumnType::StringList),
    optional("document_files", ColumnType::StringList),
    optional("locations", ColumnType::StringList),
    optional("tabular_title", ColumnType::String),
    optional("tabular_overall_status", ColumnType::String),
    optional("tabular_sex", ColumnType::String),
    optional("tabular_enrollment", ColumnType::I64),
    required("data_source", ColumnType::String),
    required(CONTENT_HASH_COLUMN, ColumnType::U64),
    required(PROCESSING_TIMESTAMP_COLUMN, ColumnType::TimestampTz),
];

static CANONICAL_SCHEMA: LazyLock<SchemaRef> = LazyLock::new(|| {
    Arc::new(Schema::new(
        CANONICAL_COLUMNS
            .iter()
            .map(CanonicalColumn::arrow_field)
            .collect::<Vec<_>>(),
    ))
});

/// Arrow schema shared by every shard file.
pub fn canonical_schema() -> SchemaRef {
    Arc::clone(&CANONICAL_SCHEMA)
}

/// Position of `name` in the canonical column order.
pub fn column_index(name: &str) -> Option<usize> {
    CANONICAL_COLUMNS.iter().position(|column| column.name == name)
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn column_names_are_unique() {
        let names: HashSet<_> = CANONICAL_COLUMNS.iter().map(|c| c.name).collect();
        assert_eq!(names.len(), CANONICAL_COLUMNS.len());
    }

    #[test]
    fn schema_follows_column_order() {
        let schema = canonical_schema();

        assert_eq!(schema.fields().len(), 37);
        assert_eq!(schema.field(0).name(), NCT_ID_COLUMN);
        assert_eq!(schema.field(36).name(), PROCESSING_TIMESTAMP_COLUMN);
        assert!(!schema.field(35).is_nullable());
        assert_eq!(column_index("data_source"), Some(34));
        assert_eq!(column_index("unknown"), None);
    }
}
