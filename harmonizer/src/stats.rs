//! Run statistics persisted next to the shard files.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use harmonizer_config::shared::CoalesceStrategy;
use serde::Serialize;

use crate::error::{ErrorKind, HarmonizerResult};
use crate::harmonizer_error;
use crate::overlap::OverlapSummary;
use crate::prepare::{DocumentLoadCounts, TabularCounts};
use crate::shard::ShardDescriptor;

/// File name of the statistics artifact inside the output directory.
pub const STATS_FILE_NAME: &str = "harmonization_stats.json";

/// Identifiers rejected during discovery because they are not valid trial identifiers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct InvalidIdentifiers {
    pub tabular: usize,
    pub documents: usize,
}

/// Counts describing one harmonization run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HarmonizationStats {
    pub strategy: CoalesceStrategy,
    pub hash_version: u32,
    pub shard_count: u32,
    pub processed_at: DateTime<Utc>,
    pub overlap: OverlapSummary,
    pub invalid_identifiers: InvalidIdentifiers,
    pub tabular: TabularCounts,
    pub documents: DocumentLoadCounts,
    pub merged_records: usize,
    pub output_records: usize,
    pub coercion_failures: usize,
    pub shards: Vec<ShardDescriptor>,
}

impl HarmonizationStats {
    /// Writes the statistics as pretty-printed JSON to [`STATS_FILE_NAME`] under `dir`.
    pub fn write_to(&self, dir: &Path) -> HarmonizerResult<PathBuf> {
        let path = dir.join(STATS_FILE_NAME);
        let json = serde_json::to_vec_pretty(self).map_err(|err| {
            harmonizer_error!(
                ErrorKind::SerializationError,
                "Failed to serialize run statistics",
                source: err
            )
        })?;
        fs::write(&path, json).map_err(|err| {
            harmonizer_error!(
                ErrorKind::IoError,
                "Failed to write run statistics",
                path.display(),
                source: err
            )
        })?;

        Ok(path)
    }
}
