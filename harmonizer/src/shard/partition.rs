use std::collections::BTreeMap;
use std::num::NonZeroU32;

use crate::hash::shard_id;
use crate::schema::HarmonizedTable;

/// Rows of a table that land in the same shard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShardPartition {
    pub shard_id: u32,
    /// Row indices into the table, in identifier order.
    pub rows: Vec<usize>,
}

/// Groups the rows of `table` by shard.
///
/// Partitions are sorted by shard id. Shards without rows are omitted.
pub fn partition(table: &HarmonizedTable, shard_count: NonZeroU32) -> Vec<ShardPartition> {
    let mut groups: BTreeMap<u32, Vec<usize>> = BTreeMap::new();

    // Table rows are sorted by identifier, so every group stays sorted as well.
    for (index, id) in table.ids().iter().enumerate() {
        groups
            .entry(shard_id(id, shard_count))
            .or_default()
            .push(index);
    }

    groups
        .into_iter()
        .map(|(shard_id, rows)| ShardPartition { shard_id, rows })
        .collect()
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use harmonizer_config::shared::CoalesceStrategy;

    use super::*;
    use crate::merge::merge_sources;
    use crate::prepare::TabularRecord;
    use crate::schema::enforce_schema;
    use crate::strategy::coalesce_records;
    use crate::types::TrialId;

    fn table(count: u32) -> HarmonizedTable {
        let tabular = (0..count)
            .map(|i| TabularRecord::new(TrialId::parse(&format!("NCT{i:08}")).unwrap()))
            .collect();
        let records = coalesce_records(
            merge_sources(tabular, vec![]),
            CoalesceStrategy::DocumentPriority,
        );
        enforce_schema(records, Utc::now())
    }

    #[test]
    fn covers_every_row_once_in_sorted_groups() {
        let table = table(500);

        let partitions = partition(&table, NonZeroU32::new(16).unwrap());

        let mut covered: Vec<usize> = partitions.iter().flat_map(|p| p.rows.clone()).collect();
        covered.sort_unstable();
        assert_eq!(covered, (0..500).collect::<Vec<_>>());

        assert!(partitions.windows(2).all(|w| w[0].shard_id < w[1].shard_id));
        for group in &partitions {
            assert!(!group.rows.is_empty());
            assert!(group.rows.windows(2).all(|w| table.ids()[w[0]] < table.ids()[w[1]]));
            assert!(group.shard_id < 16);
        }
    }

    #[test]
    fn single_shard_holds_everything() {
        let table = table(10);

        let partitions = partition(&table, NonZeroU32::MIN);

        assert_eq!(partitions.len(), 1);
        assert_eq!(partitions[0].shard_id, 0);
        assert_eq!(partitions[0].rows.len(), 10);
    }

    #[test]
    fn empty_table_has_no_partitions() {
        assert!(partition(&table(0), NonZeroU32::new(8).unwrap()).is_empty());
    }
}
