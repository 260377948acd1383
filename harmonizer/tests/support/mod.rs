#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Once;

use harmonizer_config::shared::{
    CoalesceStrategy, DocumentLoadConfig, HarmonizerConfig, ShardingConfig, SourcesConfig,
};
use serde_json::{Value, json};
use tempfile::TempDir;
use tracing_subscriber::EnvFilter;

static INIT_TRACING: Once = Once::new();

/// Installs a test-friendly tracing subscriber once per test binary.
///
/// Set `RUST_LOG` to see pipeline logs in failing tests.
pub fn init_test_tracing() {
    INIT_TRACING.call_once(|| {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .try_init();
    });
}

pub const TABULAR_HEADER: &str = "NCT Number,Study Title,Study URL,Acronym,Study Status,Brief Summary,Study Results,Conditions,Interventions,Sponsor,Collaborators,Sex,Age,Phases,Enrollment,Study Type,Start Date,Primary Completion Date,Completion Date,First Posted,Last Update Posted,Study Documents,Locations";

/// One row of the tabular fixture. Unset columns are written empty.
#[derive(Debug, Clone, Default)]
pub struct TabularRow {
    pub nct_id: String,
    pub title: String,
    pub status: String,
    pub results: String,
    pub conditions: String,
    pub enrollment: String,
    pub start_date: String,
    pub locations: String,
}

impl TabularRow {
    pub fn new(nct_id: &str, title: &str) -> Self {
        Self {
            nct_id: nct_id.to_string(),
            title: title.to_string(),
            ..Self::default()
        }
    }

    pub fn with_conditions(mut self, conditions: &str) -> Self {
        self.conditions = conditions.to_string();
        self
    }

    pub fn with_status(mut self, status: &str) -> Self {
        self.status = status.to_string();
        self
    }

    pub fn with_enrollment(mut self, enrollment: &str) -> Self {
        self.enrollment = enrollment.to_string();
        self
    }

    pub fn to_csv_line(&self) -> String {
        let url = format!("https://clinicaltrials.gov/study/{}", self.nct_id);
        let fields = [
            self.nct_id.as_str(),
            self.title.as_str(),
            url.as_str(),
            "",
            self.status.as_str(),
            "",
            self.results.as_str(),
            self.conditions.as_str(),
            "",
            "",
            "",
            "",
            "",
            "",
            self.enrollment.as_str(),
            "",
            self.start_date.as_str(),
            "",
            "",
            "",
            "",
            "",
            self.locations.as_str(),
        ];

        fields
            .iter()
            .map(|field| format!("\"{}\"", field.replace('"', "\"\"")))
            .collect::<Vec<_>>()
            .join(",")
    }
}

/// Builds a study document with the given identification and conditions.
pub fn study_document(nct_id: &str, official_title: &str, conditions: &[&str]) -> Value {
    json!({
        "protocolSection": {
            "identificationModule": {
                "nctId": nct_id,
                "briefTitle": official_title,
                "officialTitle": official_title
            },
            "statusModule": {
                "overallStatus": "COMPLETED",
                "startDateStruct": { "date": "2021-03" },
                "completionDateStruct": { "date": "2023-06-30" }
            },
            "conditionsModule": { "conditions": conditions },
            "designModule": {
                "studyType": "INTERVENTIONAL",
                "phases": ["PHASE2", "PHASE3"],
                "enrollmentInfo": { "count": 240 }
            },
            "eligibilityModule": {
                "sex": "ALL",
                "minimumAge": "18 Years",
                "healthyVolunteers": false
            }
        },
        "derivedSection": {
            "conditionBrowseModule": {
                "meshes": [{ "id": "D003920", "term": "Diabetes Mellitus" }]
            }
        },
        "hasResults": true
    })
}

/// Inputs and output directory of one test run, removed on drop.
pub struct Fixture {
    dir: TempDir,
}

impl Fixture {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("failed to create fixture directory");
        fs::create_dir(dir.path().join("documents")).expect("failed to create documents dir");

        Self { dir }
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn tabular_path(&self) -> PathBuf {
        self.root().join("studies.csv")
    }

    pub fn documents_dir(&self) -> PathBuf {
        self.root().join("documents")
    }

    pub fn output_dir(&self) -> PathBuf {
        self.root().join("output")
    }

    pub fn write_tabular(&self, rows: &[TabularRow]) {
        let mut content = format!("{TABULAR_HEADER}\n");
        for row in rows {
            content.push_str(&row.to_csv_line());
            content.push('\n');
        }
        fs::write(self.tabular_path(), content).expect("failed to write tabular fixture");
    }

    /// Appends raw text to the tabular fixture, for rows the CSV reader must reject.
    pub fn append_tabular_line(&self, line: &str) {
        let mut content = fs::read_to_string(self.tabular_path()).unwrap_or_default();
        content.push_str(line);
        content.push('\n');
        fs::write(self.tabular_path(), content).expect("failed to append tabular fixture");
    }

    pub fn write_document(&self, nct_id: &str, document: &Value) {
        let body = serde_json::to_vec_pretty(document).expect("failed to encode document");
        self.write_raw_document(&format!("{nct_id}.json"), &body);
    }

    pub fn write_raw_document(&self, file_name: &str, body: &[u8]) {
        fs::write(self.documents_dir().join(file_name), body).expect("failed to write document");
    }

    pub fn config(&self, strategy: CoalesceStrategy, shard_count: u32) -> HarmonizerConfig {
        HarmonizerConfig {
            sources: SourcesConfig::new(self.tabular_path(), self.documents_dir()),
            strategy,
            documents: DocumentLoadConfig {
                max_workers: 4,
                ..DocumentLoadConfig::default()
            },
            sharding: ShardingConfig {
                shard_count,
                output_dir: self.output_dir(),
            },
        }
    }
}

/// Lists the shard files of `dir` in name order.
pub fn shard_files(dir: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = fs::read_dir(dir)
        .expect("failed to list output directory")
        .map(|entry| entry.expect("failed to read entry").path())
        .filter(|path| {
            path.file_name()
                .and_then(|name| name.to_str())
                .is_some_and(|name| name.starts_with("shard_") && name.ends_with(".parquet"))
        })
        .collect();
    files.sort();
    files
}
