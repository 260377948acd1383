use chrono::NaiveDate;

use crate::conversions::date::parse_date;
use crate::document::StudyDocument;
use crate::types::TrialId;

/// A study document projected onto one level.
///
/// Each field comes from a fixed path in [`StudyDocument`]. Scalars are `None` and lists
/// are empty when their section is missing, so the shape never depends on the input.
#[derive(Debug, Clone, PartialEq)]
pub struct FlattenedDocument {
    pub nct_id: TrialId,
    pub official_title: Option<String>,
    pub brief_title: Option<String>,
    pub acronym: Option<String>,
    pub overall_status: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub primary_completion_date: Option<NaiveDate>,
    pub completion_date: Option<NaiveDate>,
    pub lead_sponsor: Option<String>,
    pub collaborators: Vec<String>,
    pub brief_summary: Option<String>,
    pub detailed_description: Option<String>,
    pub conditions: Vec<String>,
    pub keywords: Vec<String>,
    pub study_type: Option<String>,
    pub phases: Vec<String>,
    pub enrollment: Option<i64>,
    pub interventions: Vec<String>,
    pub sex: Option<String>,
    pub minimum_age: Option<String>,
    pub maximum_age: Option<String>,
    pub healthy_volunteers: Option<bool>,
    pub condition_meshes: Vec<String>,
    pub files: Vec<String>,
    pub has_results: bool,
}

impl FlattenedDocument {
    /// Flattens `document`, keyed by the identifier its file was requested under.
    pub fn flatten(nct_id: TrialId, document: &StudyDocument) -> Self {
        let owned = |value: Option<&str>| value.map(str::to_string);

        Self {
            nct_id,
            official_title: owned(document.official_title()),
            brief_title: owned(document.brief_title()),
            acronym: owned(document.acronym()),
            overall_status: owned(document.overall_status()),
            start_date: document.start_date().and_then(parse_date),
            primary_completion_date: document.primary_completion_date().and_then(parse_date),
            completion_date: document.completion_date().and_then(parse_date),
            lead_sponsor: owned(document.lead_sponsor()),
            collaborators: document.collaborators(),
            brief_summary: owned(document.brief_summary()),
            detailed_description: owned(document.detailed_description()),
            conditions: document.conditions(),
            keywords: document.keywords(),
            study_type: owned(document.study_type()),
            phases: normalize_phases(document.phases()),
            enrollment: document.enrollment(),
            interventions: document.interventions(),
            sex: owned(document.sex()),
            minimum_age: owned(document.minimum_age()),
            maximum_age: owned(document.maximum_age()),
            healthy_volunteers: document.healthy_volunteers(),
            condition_meshes: document.condition_meshes(),
            files: document.document_files(),
            has_results: document.has_results,
        }
    }

    /// Creates a flattened record with every optional field empty.
    pub fn empty(nct_id: TrialId) -> Self {
        Self::flatten(nct_id, &StudyDocument::default())
    }
}

/// Phase recorded for spellings outside the registry vocabulary.
const UNKNOWN_PHASE: &str = "NA";

/// Maps phase spellings onto the registry tokens used by the tabular export.
///
/// Matching ignores case and treats spaces like underscores. Combined phases expand to both
/// tokens and unknown spellings become [`UNKNOWN_PHASE`]. Repeated tokens are kept once.
fn normalize_phases(phases: Vec<String>) -> Vec<String> {
    let mut normalized: Vec<String> = Vec::with_capacity(phases.len());

    for phase in phases {
        let key = phase.trim().to_uppercase().replace(' ', "_");
        let tokens: &[&str] = match key.as_str() {
            "PHASE1" | "PHASE_1" => &["PHASE1"],
            "PHASE2" | "PHASE_2" => &["PHASE2"],
            "PHASE3" | "PHASE_3" => &["PHASE3"],
            "PHASE4" | "PHASE_4" => &["PHASE4"],
            "EARLY_PHASE1" | "EARLY_PHASE_1" => &["EARLY_PHASE1"],
            "PHASE_1_PHASE_2" | "PHASE1/PHASE2" | "PHASE_1/PHASE_2" => &["PHASE1", "PHASE2"],
            "PHASE_2_PHASE_3" | "PHASE2/PHASE3" | "PHASE_2/PHASE_3" => &["PHASE2", "PHASE3"],
            _ => &[UNKNOWN_PHASE],
        };

        for token in tokens {
            if !normalized.iter().any(|existing| existing == token) {
                normalized.push((*token).to_string());
            }
        }
    }

    normalized
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flattens_partial_document() {
        let document: StudyDocument = serde_json::from_str(
            r#"{
                "protocolSection": {
                    "identificationModule": {"nctId": "NCT00000042", "officialTitle": "A Study of Iron"},
                    "statusModule": {"completionDateStruct": {"date": "June 30, 2022"}},
                    "designModule": {"phases": ["PHASE2", "PHASE3"]}
                }
            }"#,
        )
        .unwrap();

        let id = TrialId::parse("NCT00000042").unwrap();
        let flattened = FlattenedDocument::flatten(id.clone(), &document);

        assert_eq!(flattened.nct_id, id);
        assert_eq!(flattened.official_title.as_deref(), Some("A Study of Iron"));
        assert_eq!(flattened.completion_date, NaiveDate::from_ymd_opt(2022, 6, 30));
        assert_eq!(flattened.phases, vec!["PHASE2".to_string(), "PHASE3".to_string()]);
        assert_eq!(flattened.brief_summary, None);
        assert!(flattened.interventions.is_empty());
        assert!(!flattened.has_results);
    }

    #[test]
    fn unparseable_document_dates_are_dropped() {
        let document: StudyDocument = serde_json::from_str(
            r#"{"protocolSection": {"statusModule": {"startDateStruct": {"date": "TBD"}}}}"#,
        )
        .unwrap();

        let flattened = FlattenedDocument::flatten(TrialId::parse("NCT00000001").unwrap(), &document);

        assert_eq!(flattened.start_date, None);
    }

    #[test]
    fn phases_use_registry_tokens() {
        let phases = [
            "Phase 1",
            "phase_2",
            "PHASE2",
            "N/A",
            "Not Applicable",
            "Phase 2/Phase 3",
            "Pilot",
        ]
        .map(str::to_string)
        .to_vec();

        assert_eq!(
            normalize_phases(phases),
            ["PHASE1", "PHASE2", "NA", "PHASE3"].map(str::to_string).to_vec()
        );
    }
}
