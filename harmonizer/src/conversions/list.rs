use std::collections::HashSet;

/// Delimiter between list items inside one tabular cell.
pub const LIST_DELIMITER: &str = "|";

/// Splits a pipe-delimited cell into trimmed, non-empty items.
pub fn split_list(raw: &str) -> Vec<String> {
    raw.split(LIST_DELIMITER)
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

/// Joins items back into a pipe-delimited string, `None` when there are no items.
pub fn join_list(items: &[String]) -> Option<String> {
    if items.is_empty() {
        return None;
    }

    Some(items.join(LIST_DELIMITER))
}

/// Concatenates two lists and drops repeated items, keeping first occurrences in order.
pub fn union_dedup(first: Vec<String>, second: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::with_capacity(first.len() + second.len());
    first
        .into_iter()
        .chain(second)
        .filter(|item| seen.insert(item.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn splits_and_trims_items() {
        assert_eq!(split_list("Asthma| COPD ||"), strings(&["Asthma", "COPD"]));
        assert!(split_list("   ").is_empty());
    }

    #[test]
    fn joins_with_pipe() {
        assert_eq!(join_list(&strings(&["PHASE2", "PHASE3"])), Some("PHASE2|PHASE3".to_string()));
        assert_eq!(join_list(&[]), None);
    }

    #[test]
    fn union_keeps_first_occurrence_order() {
        let merged = union_dedup(
            strings(&["Diabetes", "Hypertension"]),
            strings(&["Obesity", "Diabetes"]),
        );

        assert_eq!(merged, strings(&["Diabetes", "Hypertension", "Obesity"]));
    }
}
