//! Full outer join of the prepared sources on the trial identifier.

use std::collections::BTreeMap;
use std::collections::btree_map::Entry;

use tracing::{info, warn};

use crate::document::FlattenedDocument;
use crate::prepare::TabularRecord;
use crate::types::TrialId;

/// One identifier with whatever each source knows about it.
///
/// At least one of `tabular` and `document` is set.
#[derive(Debug, Clone, PartialEq)]
pub struct MergedRecord {
    pub nct_id: TrialId,
    pub tabular: Option<TabularRecord>,
    pub document: Option<FlattenedDocument>,
}

impl MergedRecord {
    /// Returns whether both sources contributed a row.
    pub fn has_both(&self) -> bool {
        self.tabular.is_some() && self.document.is_some()
    }
}

/// Joins both tables on the identifier.
///
/// Produces exactly one record per identifier present in either input, sorted by identifier.
/// The key of each output record is the tabular key when present, else the document key.
/// Input order is irrelevant. If an identifier occurs twice in the same input the first
/// occurrence is kept.
pub fn merge_sources(
    tabular: Vec<TabularRecord>,
    documents: Vec<FlattenedDocument>,
) -> Vec<MergedRecord> {
    let tabular_rows = tabular.len();
    let document_rows = documents.len();
    let mut merged: BTreeMap<TrialId, MergedRecord> = BTreeMap::new();

    for record in tabular {
        match merged.entry(record.nct_id.clone()) {
            Entry::Vacant(entry) => {
                entry.insert(MergedRecord {
                    nct_id: record.nct_id.clone(),
                    tabular: Some(record),
                    document: None,
                });
            }
            Entry::Occupied(entry) => {
                warn!(nct_id = %entry.key(), "duplicate tabular record in merge input, keeping the first");
            }
        }
    }

    for document in documents {
        match merged.entry(document.nct_id.clone()) {
            Entry::Vacant(entry) => {
                entry.insert(MergedRecord {
                    nct_id: document.nct_id.clone(),
                    tabular: None,
                    document: Some(document),
                });
            }
            Entry::Occupied(mut entry) => {
                let record = entry.get_mut();
                if record.document.is_some() {
                    warn!(nct_id = %record.nct_id, "duplicate document record in merge input, keeping the first");
                } else {
                    record.document = Some(document);
                }
            }
        }
    }

    let records: Vec<MergedRecord> = merged.into_values().collect();

    info!(
        tabular_rows,
        document_rows,
        merged_rows = records.len(),
        "merged sources"
    );

    records
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(n: u32) -> TrialId {
        TrialId::parse(&format!("NCT{n:08}")).unwrap()
    }

    fn tabular(n: u32, title: &str) -> TabularRecord {
        let mut record = TabularRecord::new(id(n));
        record.title = Some(title.to_string());
        record
    }

    #[test]
    fn produces_one_row_per_identifier() {
        let merged = merge_sources(
            vec![tabular(3, "three"), tabular(1, "one")],
            vec![FlattenedDocument::empty(id(2)), FlattenedDocument::empty(id(3))],
        );

        let keys: Vec<&str> = merged.iter().map(|r| r.nct_id.as_str()).collect();
        assert_eq!(keys, ["NCT00000001", "NCT00000002", "NCT00000003"]);

        assert!(merged[0].tabular.is_some() && merged[0].document.is_none());
        assert!(merged[1].tabular.is_none() && merged[1].document.is_some());
        assert!(merged[2].has_both());
    }

    #[test]
    fn keeps_first_duplicate() {
        let merged = merge_sources(vec![tabular(1, "first"), tabular(1, "second")], vec![]);

        assert_eq!(merged.len(), 1);
        assert_eq!(
            merged[0].tabular.as_ref().and_then(|t| t.title.as_deref()),
            Some("first")
        );
    }

    #[test]
    fn empty_inputs_merge_to_empty_output() {
        assert!(merge_sources(vec![], vec![]).is_empty());
    }
}
