use std::fmt;

use serde::Serialize;

/// Which sources contributed to one merged record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Presence {
    TabularOnly,
    DocumentOnly,
    Both,
}

/// Provenance label stored in the `data_source` column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(into = "&'static str")]
pub enum DataSource {
    TabularOnly,
    DocumentOnly,
    TabularPriority,
    DocumentPriority,
    Merged,
}

impl DataSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            DataSource::TabularOnly => "tabular-only",
            DataSource::DocumentOnly => "document-only",
            DataSource::TabularPriority => "tabular-priority",
            DataSource::DocumentPriority => "document-priority",
            DataSource::Merged => "merged",
        }
    }
}

impl From<DataSource> for &'static str {
    fn from(value: DataSource) -> Self {
        value.as_str()
    }
}

impl fmt::Display for DataSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Conflict resolution rules applied to every field shared by both sources.
///
/// A policy decides which side wins for scalar fields, how list fields are combined and which
/// provenance label a record gets. Values present on only one side are used as-is whatever
/// the policy, so implementations only have to decide the case where both sides are present.
pub trait CoalescePolicy {
    /// Resolves a scalar field. A scalar is present when it is `Some`.
    fn pick<T>(&self, document: Option<T>, tabular: Option<T>) -> Option<T>;

    /// Resolves a list field. A list is present when it is non-empty.
    fn combine(&self, document: Vec<String>, tabular: Vec<String>) -> Vec<String>;

    /// Returns the label for a record with the given source presence.
    fn provenance(&self, presence: Presence) -> DataSource;

    /// Returns whether the tabular values of the conflicting fields are kept in side columns.
    ///
    /// The default implementation keeps none.
    fn preserves_tabular_fields(&self) -> bool {
        false
    }
}

/// Picks `first` when present, else `second`.
pub(super) fn prefer<T>(first: Option<T>, second: Option<T>) -> Option<T> {
    first.or(second)
}

/// Picks `first` when non-empty, else `second`.
pub(super) fn prefer_list(first: Vec<String>, second: Vec<String>) -> Vec<String> {
    if first.is_empty() { second } else { first }
}
