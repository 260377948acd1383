use crate::conversions::list::union_dedup;
use crate::strategy::base::{CoalescePolicy, DataSource, Presence, prefer, prefer_list};

/// The structured document wins every conflict.
#[derive(Debug, Clone, Copy, Default)]
pub struct DocumentPriority;

impl CoalescePolicy for DocumentPriority {
    fn pick<T>(&self, document: Option<T>, tabular: Option<T>) -> Option<T> {
        prefer(document, tabular)
    }

    fn combine(&self, document: Vec<String>, tabular: Vec<String>) -> Vec<String> {
        prefer_list(document, tabular)
    }

    fn provenance(&self, presence: Presence) -> DataSource {
        match presence {
            Presence::Both => DataSource::DocumentPriority,
            Presence::DocumentOnly => DataSource::DocumentOnly,
            Presence::TabularOnly => DataSource::TabularOnly,
        }
    }
}

/// The tabular row wins every conflict.
#[derive(Debug, Clone, Copy, Default)]
pub struct TabularPriority;

impl CoalescePolicy for TabularPriority {
    fn pick<T>(&self, document: Option<T>, tabular: Option<T>) -> Option<T> {
        prefer(tabular, document)
    }

    fn combine(&self, document: Vec<String>, tabular: Vec<String>) -> Vec<String> {
        prefer_list(tabular, document)
    }

    fn provenance(&self, presence: Presence) -> DataSource {
        match presence {
            Presence::Both => DataSource::TabularPriority,
            Presence::DocumentOnly => DataSource::DocumentOnly,
            Presence::TabularOnly => DataSource::TabularOnly,
        }
    }
}

/// Document scalars win, lists are unioned and the losing tabular scalars are kept aside.
#[derive(Debug, Clone, Copy, Default)]
pub struct MergeBoth;

impl CoalescePolicy for MergeBoth {
    fn pick<T>(&self, document: Option<T>, tabular: Option<T>) -> Option<T> {
        prefer(document, tabular)
    }

    fn combine(&self, document: Vec<String>, tabular: Vec<String>) -> Vec<String> {
        if document.is_empty() || tabular.is_empty() {
            return prefer_list(document, tabular);
        }

        union_dedup(document, tabular)
    }

    fn provenance(&self, presence: Presence) -> DataSource {
        match presence {
            Presence::Both => DataSource::Merged,
            Presence::DocumentOnly => DataSource::DocumentOnly,
            Presence::TabularOnly => DataSource::TabularOnly,
        }
    }

    fn preserves_tabular_fields(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn one_sided_values_pass_through_every_policy() {
        assert_eq!(DocumentPriority.pick(None, Some("tab")), Some("tab"));
        assert_eq!(TabularPriority.pick(Some("doc"), None), Some("doc"));
        assert_eq!(MergeBoth.pick(None, Some("tab")), Some("tab"));

        assert_eq!(
            TabularPriority.combine(strings(&["a"]), vec![]),
            strings(&["a"])
        );
        assert_eq!(MergeBoth.combine(vec![], strings(&["b"])), strings(&["b"]));
    }

    #[test]
    fn merge_both_unions_lists_document_first() {
        let combined = MergeBoth.combine(
            strings(&["Hypertension", "Diabetes"]),
            strings(&["Diabetes", "Obesity"]),
        );

        assert_eq!(combined, strings(&["Hypertension", "Diabetes", "Obesity"]));
    }

    #[test]
    fn single_source_provenance_is_policy_independent() {
        for presence in [Presence::TabularOnly, Presence::DocumentOnly] {
            let labels = [
                DocumentPriority.provenance(presence),
                TabularPriority.provenance(presence),
                MergeBoth.provenance(presence),
            ];
            assert!(labels.iter().all(|label| *label == labels[0]));
        }
    }
}
