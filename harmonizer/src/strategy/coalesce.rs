use std::collections::BTreeMap;

use harmonizer_config::shared::CoalesceStrategy;
use metrics::counter;
use tracing::info;

use crate::conversions::list::join_list;
use crate::document::FlattenedDocument;
use crate::merge::MergedRecord;
use crate::metrics::{HARMONIZER_RECORDS_HARMONIZED_TOTAL, STRATEGY_LABEL};
use crate::prepare::TabularRecord;
use crate::strategy::base::{CoalescePolicy, DataSource, Presence};
use crate::strategy::policies::{DocumentPriority, MergeBoth, TabularPriority};
use crate::types::{Cell, TrialId};

/// One identifier after conflict resolution, keyed by canonical column name.
///
/// Columns the coalescer has nothing for are simply missing. The schema enforcer fills them
/// with typed nulls.
#[derive(Debug, Clone, PartialEq)]
pub struct CoalescedRecord {
    pub nct_id: TrialId,
    pub data_source: DataSource,
    fields: BTreeMap<&'static str, Cell>,
}

impl CoalescedRecord {
    pub(crate) fn new(nct_id: TrialId, data_source: DataSource) -> Self {
        let mut fields = BTreeMap::new();
        fields.insert("nct_id", Cell::String(nct_id.as_str().to_string()));
        fields.insert("data_source", Cell::String(data_source.as_str().to_string()));

        Self {
            nct_id,
            data_source,
            fields,
        }
    }

    pub(crate) fn set(&mut self, column: &'static str, value: impl Into<Cell>) {
        self.fields.insert(column, value.into());
    }

    /// Returns the value of `column`, `None` when the coalescer did not produce it.
    pub fn get(&self, column: &str) -> Option<&Cell> {
        self.fields.get(column)
    }

    /// Names of the columns carried by this record.
    pub fn columns(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.fields.keys().copied()
    }
}

/// Resolves every merged record with the policy selected by `strategy`.
pub fn coalesce_records(
    records: Vec<MergedRecord>,
    strategy: CoalesceStrategy,
) -> Vec<CoalescedRecord> {
    let coalesced = match strategy {
        CoalesceStrategy::DocumentPriority => coalesce_with(&DocumentPriority, records),
        CoalesceStrategy::TabularPriority => coalesce_with(&TabularPriority, records),
        CoalesceStrategy::MergeBoth => coalesce_with(&MergeBoth, records),
    };

    counter!(HARMONIZER_RECORDS_HARMONIZED_TOTAL, STRATEGY_LABEL => strategy.as_str())
        .increment(coalesced.len() as u64);
    info!(%strategy, records = coalesced.len(), "coalesced records");

    coalesced
}

/// Resolves every merged record with `policy`.
pub fn coalesce_with<P>(policy: &P, records: Vec<MergedRecord>) -> Vec<CoalescedRecord>
where
    P: CoalescePolicy,
{
    records
        .into_iter()
        .map(|record| coalesce_record(policy, record))
        .collect()
}

fn coalesce_record<P>(policy: &P, record: MergedRecord) -> CoalescedRecord
where
    P: CoalescePolicy,
{
    let presence = match (record.tabular.is_some(), record.document.is_some()) {
        (true, true) => Presence::Both,
        (false, true) => Presence::DocumentOnly,
        _ => Presence::TabularOnly,
    };
    let has_document = record.document.is_some();

    let t = record
        .tabular
        .unwrap_or_else(|| TabularRecord::new(record.nct_id.clone()));
    let d = record
        .document
        .unwrap_or_else(|| FlattenedDocument::empty(record.nct_id.clone()));

    let mut out = CoalescedRecord::new(record.nct_id, policy.provenance(presence));

    out.set("official_title", policy.pick(d.official_title, t.title.clone()));
    out.set("brief_title", policy.pick(d.brief_title, t.title.clone()));
    out.set("acronym", policy.pick(d.acronym, t.acronym));
    out.set(
        "overall_status",
        policy.pick(d.overall_status, t.overall_status.clone()),
    );
    out.set("study_type", policy.pick(d.study_type, t.study_type));
    out.set(
        "study_phase",
        policy.pick(join_list(&d.phases), t.study_phase),
    );
    out.set("brief_summary", policy.pick(d.brief_summary, t.brief_summary));
    out.set("sex", policy.pick(d.sex, t.sex.clone()));
    out.set("minimum_age", policy.pick(d.minimum_age, t.minimum_age));
    out.set("enrollment", policy.pick(d.enrollment, t.enrollment));
    out.set("start_date", policy.pick(d.start_date, t.start_date));
    out.set(
        "completion_date",
        policy.pick(d.completion_date, t.completion_date),
    );
    out.set("lead_sponsor", policy.pick(d.lead_sponsor, t.lead_sponsor));

    out.set("conditions", policy.combine(d.conditions, t.conditions));
    out.set(
        "interventions",
        policy.combine(d.interventions, t.interventions),
    );
    out.set(
        "collaborators",
        policy.combine(d.collaborators, t.collaborators),
    );

    out.set("detailed_description", d.detailed_description);
    out.set("condition_meshes", d.condition_meshes);
    out.set("maximum_age", d.maximum_age);
    out.set("healthy_volunteers", d.healthy_volunteers);
    out.set("document_files", d.files);

    out.set(
        "has_results",
        if has_document {
            Some(d.has_results)
        } else {
            t.has_results
        },
    );

    if policy.preserves_tabular_fields() {
        out.set("tabular_title", t.title.clone());
        out.set("tabular_overall_status", t.overall_status);
        out.set("tabular_sex", t.sex);
        out.set("tabular_enrollment", t.enrollment);
    }

    out.set("title", t.title);
    out.set("study_url", t.study_url);
    out.set("primary_completion_date", t.primary_completion_date);
    out.set("first_posted", t.first_posted);
    out.set("last_update_posted", t.last_update_posted);
    out.set("document_urls", t.document_urls);
    out.set("locations", t.locations);

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::merge::merge_sources;
    use crate::schema::CANONICAL_COLUMNS;

    fn id(raw: &str) -> TrialId {
        TrialId::parse(raw).unwrap()
    }

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn text(record: &CoalescedRecord, column: &str) -> Option<String> {
        record.get(column).and_then(Cell::as_str).map(str::to_string)
    }

    fn list(record: &CoalescedRecord, column: &str) -> Vec<String> {
        record
            .get(column)
            .and_then(Cell::as_list)
            .map(<[String]>::to_vec)
            .unwrap_or_default()
    }

    /// X only in the tabular source, Y in both with conflicting titles, Z in both with
    /// overlapping condition lists.
    fn fixture() -> Vec<MergedRecord> {
        let mut x = TabularRecord::new(id("NCT00000001"));
        x.title = Some("Iron Study".to_string());

        let mut y_tab = TabularRecord::new(id("NCT00000002"));
        y_tab.title = Some("A".to_string());
        y_tab.overall_status = Some("RECRUITING".to_string());
        let mut y_doc = FlattenedDocument::empty(id("NCT00000002"));
        y_doc.official_title = Some("B".to_string());
        y_doc.overall_status = Some("COMPLETED".to_string());

        let mut z_tab = TabularRecord::new(id("NCT00000003"));
        z_tab.conditions = strings(&["Diabetes"]);
        let mut z_doc = FlattenedDocument::empty(id("NCT00000003"));
        z_doc.conditions = strings(&["Diabetes", "Hypertension"]);

        merge_sources(vec![x, y_tab, z_tab], vec![y_doc, z_doc])
    }

    #[test]
    fn tabular_only_record_is_the_same_under_every_strategy() {
        for strategy in CoalesceStrategy::ALL {
            let records = coalesce_records(fixture(), strategy);
            let x = &records[0];

            assert_eq!(text(x, "official_title").as_deref(), Some("Iron Study"));
            assert_eq!(text(x, "data_source").as_deref(), Some("tabular-only"));
            assert_eq!(x.data_source, DataSource::TabularOnly);
        }
    }

    #[test]
    fn document_priority_prefers_document_values() {
        let records = coalesce_records(fixture(), CoalesceStrategy::DocumentPriority);
        let (y, z) = (&records[1], &records[2]);

        assert_eq!(text(y, "official_title").as_deref(), Some("B"));
        assert_eq!(text(y, "overall_status").as_deref(), Some("COMPLETED"));
        assert_eq!(y.data_source, DataSource::DocumentPriority);
        assert!(y.get("tabular_title").is_none());
        assert_eq!(list(z, "conditions"), strings(&["Diabetes", "Hypertension"]));
    }

    #[test]
    fn tabular_priority_prefers_tabular_values() {
        let records = coalesce_records(fixture(), CoalesceStrategy::TabularPriority);
        let (y, z) = (&records[1], &records[2]);

        assert_eq!(text(y, "official_title").as_deref(), Some("A"));
        assert_eq!(y.data_source, DataSource::TabularPriority);
        assert_eq!(list(z, "conditions"), strings(&["Diabetes"]));
    }

    #[test]
    fn merge_both_keeps_tabular_side_fields_and_unions_lists() {
        let records = coalesce_records(fixture(), CoalesceStrategy::MergeBoth);
        let (y, z) = (&records[1], &records[2]);

        assert_eq!(text(y, "official_title").as_deref(), Some("B"));
        assert_eq!(text(y, "tabular_title").as_deref(), Some("A"));
        assert_eq!(
            text(y, "tabular_overall_status").as_deref(),
            Some("RECRUITING")
        );
        assert_eq!(y.data_source, DataSource::Merged);
        assert_eq!(list(z, "conditions"), strings(&["Diabetes", "Hypertension"]));
    }

    #[test]
    fn has_results_follows_the_document_when_present() {
        let mut tabular = TabularRecord::new(id("NCT00000004"));
        tabular.has_results = Some(false);
        let mut document = FlattenedDocument::empty(id("NCT00000004"));
        document.has_results = true;

        let merged = merge_sources(vec![tabular], vec![document]);
        let records = coalesce_records(merged, CoalesceStrategy::TabularPriority);

        assert_eq!(records[0].get("has_results"), Some(&Cell::Bool(true)));
    }

    #[test]
    fn document_phases_become_a_delimited_phase() {
        let mut document = FlattenedDocument::empty(id("NCT00000005"));
        document.phases = strings(&["PHASE2", "PHASE3"]);

        let records = coalesce_records(
            merge_sources(vec![], vec![document]),
            CoalesceStrategy::DocumentPriority,
        );

        assert_eq!(text(&records[0], "study_phase").as_deref(), Some("PHASE2|PHASE3"));
        assert_eq!(records[0].data_source, DataSource::DocumentOnly);
    }

    #[test]
    fn produced_columns_are_canonical() {
        let records = coalesce_records(fixture(), CoalesceStrategy::MergeBoth);

        for record in &records {
            for column in record.columns() {
                assert!(
                    CANONICAL_COLUMNS.iter().any(|c| c.name == column),
                    "`{column}` is not a canonical column"
                );
            }
        }
    }
}
