//! Serde model of a registry study document.
//!
//! Every section is optional and every list defaults to empty, so a document that only
//! carries a few sections still deserializes. Explicit `null` values are treated like absent
//! keys. The accessors on [`StudyDocument`] walk the optional sections and return `None` or
//! an empty list as soon as a hop is missing.

use serde::{Deserialize, Deserializer};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StudyDocument {
    pub protocol_section: Option<ProtocolSection>,
    pub derived_section: Option<DerivedSection>,
    pub document_section: Option<DocumentSection>,
    #[serde(deserialize_with = "null_as_default")]
    pub has_results: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProtocolSection {
    pub identification_module: Option<IdentificationModule>,
    pub status_module: Option<StatusModule>,
    pub sponsor_collaborators_module: Option<SponsorCollaboratorsModule>,
    pub description_module: Option<DescriptionModule>,
    pub conditions_module: Option<ConditionsModule>,
    pub design_module: Option<DesignModule>,
    pub arms_interventions_module: Option<ArmsInterventionsModule>,
    pub eligibility_module: Option<EligibilityModule>,
}

/// Identification of the study. A present module must name its identifier.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdentificationModule {
    pub nct_id: String,
    #[serde(default)]
    pub brief_title: Option<String>,
    #[serde(default)]
    pub official_title: Option<String>,
    #[serde(default)]
    pub acronym: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StatusModule {
    pub overall_status: Option<String>,
    pub start_date_struct: Option<DateStruct>,
    pub primary_completion_date_struct: Option<DateStruct>,
    pub completion_date_struct: Option<DateStruct>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DateStruct {
    pub date: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SponsorCollaboratorsModule {
    pub lead_sponsor: Option<Organization>,
    #[serde(deserialize_with = "null_as_default")]
    pub collaborators: Vec<Organization>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Organization {
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DescriptionModule {
    pub brief_summary: Option<String>,
    pub detailed_description: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ConditionsModule {
    #[serde(deserialize_with = "null_as_default")]
    pub conditions: Vec<Option<String>>,
    #[serde(deserialize_with = "null_as_default")]
    pub keywords: Vec<Option<String>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DesignModule {
    pub study_type: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub phases: Vec<Option<String>>,
    pub enrollment_info: Option<EnrollmentInfo>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct EnrollmentInfo {
    pub count: Option<i64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ArmsInterventionsModule {
    #[serde(deserialize_with = "null_as_default")]
    pub interventions: Vec<Intervention>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Intervention {
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EligibilityModule {
    pub sex: Option<String>,
    pub minimum_age: Option<String>,
    pub maximum_age: Option<String>,
    pub healthy_volunteers: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DerivedSection {
    pub condition_browse_module: Option<ConditionBrowseModule>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ConditionBrowseModule {
    #[serde(deserialize_with = "null_as_default")]
    pub meshes: Vec<MeshTerm>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct MeshTerm {
    pub id: Option<String>,
    pub term: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DocumentSection {
    pub large_document_module: Option<LargeDocumentModule>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LargeDocumentModule {
    #[serde(deserialize_with = "null_as_default")]
    pub large_docs: Vec<LargeDocument>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LargeDocument {
    pub type_abbrev: Option<String>,
    pub filename: Option<String>,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Returns the trimmed value, or `None` when it is blank.
fn non_blank(value: Option<&String>) -> Option<&str> {
    value.map(|v| v.trim()).filter(|v| !v.is_empty())
}

fn collect_non_blank<'a>(values: impl Iterator<Item = Option<&'a String>>) -> Vec<String> {
    values
        .filter_map(non_blank)
        .map(str::to_string)
        .collect()
}

impl StudyDocument {
    pub fn identification(&self) -> Option<&IdentificationModule> {
        self.protocol_section.as_ref()?.identification_module.as_ref()
    }

    pub fn status(&self) -> Option<&StatusModule> {
        self.protocol_section.as_ref()?.status_module.as_ref()
    }

    pub fn sponsor_collaborators(&self) -> Option<&SponsorCollaboratorsModule> {
        self.protocol_section
            .as_ref()?
            .sponsor_collaborators_module
            .as_ref()
    }

    pub fn description(&self) -> Option<&DescriptionModule> {
        self.protocol_section.as_ref()?.description_module.as_ref()
    }

    pub fn conditions_module(&self) -> Option<&ConditionsModule> {
        self.protocol_section.as_ref()?.conditions_module.as_ref()
    }

    pub fn design(&self) -> Option<&DesignModule> {
        self.protocol_section.as_ref()?.design_module.as_ref()
    }

    pub fn arms_interventions(&self) -> Option<&ArmsInterventionsModule> {
        self.protocol_section
            .as_ref()?
            .arms_interventions_module
            .as_ref()
    }

    pub fn eligibility(&self) -> Option<&EligibilityModule> {
        self.protocol_section.as_ref()?.eligibility_module.as_ref()
    }

    /// Identifier declared by the document, `None` when it has no identification module.
    pub fn nct_id(&self) -> Option<&str> {
        self.identification().map(|module| module.nct_id.trim())
    }

    pub fn official_title(&self) -> Option<&str> {
        non_blank(self.identification()?.official_title.as_ref())
    }

    pub fn brief_title(&self) -> Option<&str> {
        non_blank(self.identification()?.brief_title.as_ref())
    }

    pub fn acronym(&self) -> Option<&str> {
        non_blank(self.identification()?.acronym.as_ref())
    }

    pub fn overall_status(&self) -> Option<&str> {
        non_blank(self.status()?.overall_status.as_ref())
    }

    pub fn start_date(&self) -> Option<&str> {
        non_blank(self.status()?.start_date_struct.as_ref()?.date.as_ref())
    }

    pub fn primary_completion_date(&self) -> Option<&str> {
        non_blank(
            self.status()?
                .primary_completion_date_struct
                .as_ref()?
                .date
                .as_ref(),
        )
    }

    pub fn completion_date(&self) -> Option<&str> {
        non_blank(self.status()?.completion_date_struct.as_ref()?.date.as_ref())
    }

    pub fn lead_sponsor(&self) -> Option<&str> {
        non_blank(
            self.sponsor_collaborators()?
                .lead_sponsor
                .as_ref()?
                .name
                .as_ref(),
        )
    }

    pub fn collaborators(&self) -> Vec<String> {
        self.sponsor_collaborators()
            .map(|module| collect_non_blank(module.collaborators.iter().map(|c| c.name.as_ref())))
            .unwrap_or_default()
    }

    pub fn brief_summary(&self) -> Option<&str> {
        non_blank(self.description()?.brief_summary.as_ref())
    }

    pub fn detailed_description(&self) -> Option<&str> {
        non_blank(self.description()?.detailed_description.as_ref())
    }

    pub fn conditions(&self) -> Vec<String> {
        self.conditions_module()
            .map(|module| collect_non_blank(module.conditions.iter().map(Option::as_ref)))
            .unwrap_or_default()
    }

    pub fn keywords(&self) -> Vec<String> {
        self.conditions_module()
            .map(|module| collect_non_blank(module.keywords.iter().map(Option::as_ref)))
            .unwrap_or_default()
    }

    pub fn study_type(&self) -> Option<&str> {
        non_blank(self.design()?.study_type.as_ref())
    }

    pub fn phases(&self) -> Vec<String> {
        self.design()
            .map(|module| collect_non_blank(module.phases.iter().map(Option::as_ref)))
            .unwrap_or_default()
    }

    pub fn enrollment(&self) -> Option<i64> {
        self.design()?.enrollment_info.as_ref()?.count
    }

    pub fn interventions(&self) -> Vec<String> {
        self.arms_interventions()
            .map(|module| collect_non_blank(module.interventions.iter().map(|i| i.name.as_ref())))
            .unwrap_or_default()
    }

    pub fn sex(&self) -> Option<&str> {
        non_blank(self.eligibility()?.sex.as_ref())
    }

    pub fn minimum_age(&self) -> Option<&str> {
        non_blank(self.eligibility()?.minimum_age.as_ref())
    }

    pub fn maximum_age(&self) -> Option<&str> {
        non_blank(self.eligibility()?.maximum_age.as_ref())
    }

    pub fn healthy_volunteers(&self) -> Option<bool> {
        self.eligibility()?.healthy_volunteers
    }

    pub fn condition_meshes(&self) -> Vec<String> {
        self.derived_section
            .as_ref()
            .and_then(|section| section.condition_browse_module.as_ref())
            .map(|module| collect_non_blank(module.meshes.iter().map(|m| m.term.as_ref())))
            .unwrap_or_default()
    }

    pub fn document_files(&self) -> Vec<String> {
        self.document_section
            .as_ref()
            .and_then(|section| section.large_document_module.as_ref())
            .map(|module| collect_non_blank(module.large_docs.iter().map(|d| d.filename.as_ref())))
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_degrades_to_defaults() {
        let document: StudyDocument = serde_json::from_str("{}").unwrap();

        assert_eq!(document.nct_id(), None);
        assert_eq!(document.official_title(), None);
        assert_eq!(document.enrollment(), None);
        assert!(document.conditions().is_empty());
        assert!(document.condition_meshes().is_empty());
        assert!(document.document_files().is_empty());
        assert!(!document.has_results);
    }

    #[test]
    fn explicit_nulls_are_treated_as_absent() {
        let document: StudyDocument = serde_json::from_str(
            r#"{
                "protocolSection": {
                    "identificationModule": null,
                    "conditionsModule": {"conditions": null},
                    "designModule": {"phases": ["PHASE2", null, " "]}
                },
                "hasResults": null
            }"#,
        )
        .unwrap();

        assert_eq!(document.nct_id(), None);
        assert!(document.conditions().is_empty());
        assert_eq!(document.phases(), vec!["PHASE2".to_string()]);
        assert!(!document.has_results);
    }

    #[test]
    fn reads_nested_fields() {
        let document: StudyDocument = serde_json::from_str(
            r#"{
                "protocolSection": {
                    "identificationModule": {"nctId": "NCT01234567", "briefTitle": " Iron "},
                    "statusModule": {"startDateStruct": {"date": "2020-03"}},
                    "sponsorCollaboratorsModule": {
                        "leadSponsor": {"name": "Acme"},
                        "collaborators": [{"name": "Beta"}, {}]
                    },
                    "designModule": {"enrollmentInfo": {"count": 40}},
                    "armsInterventionsModule": {"interventions": [{"name": "Iron sucrose"}]},
                    "eligibilityModule": {"healthyVolunteers": true}
                },
                "derivedSection": {"conditionBrowseModule": {"meshes": [{"id": "D1", "term": "Anemia"}]}},
                "documentSection": {"largeDocumentModule": {"largeDocs": [{"filename": "Prot_000.pdf"}]}},
                "hasResults": true
            }"#,
        )
        .unwrap();

        assert_eq!(document.nct_id(), Some("NCT01234567"));
        assert_eq!(document.brief_title(), Some("Iron"));
        assert_eq!(document.start_date(), Some("2020-03"));
        assert_eq!(document.lead_sponsor(), Some("Acme"));
        assert_eq!(document.collaborators(), vec!["Beta".to_string()]);
        assert_eq!(document.enrollment(), Some(40));
        assert_eq!(document.interventions(), vec!["Iron sucrose".to_string()]);
        assert_eq!(document.healthy_volunteers(), Some(true));
        assert_eq!(document.condition_meshes(), vec!["Anemia".to_string()]);
        assert_eq!(document.document_files(), vec!["Prot_000.pdf".to_string()]);
        assert!(document.has_results);
    }

    #[test]
    fn identification_without_identifier_is_rejected() {
        let result = serde_json::from_str::<StudyDocument>(
            r#"{"protocolSection": {"identificationModule": {"briefTitle": "Iron"}}}"#,
        );

        assert!(result.is_err());
    }
}
