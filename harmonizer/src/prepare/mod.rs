//! Loading both sources into typed, identifier-keyed records.

pub mod document;
pub mod tabular;

pub use document::{DocumentLoadCounts, DocumentOutcome, DocumentPreparation, prepare_documents};
pub use tabular::{TabularCounts, TabularPreparation, TabularRecord, prepare_tabular};
