use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::shared::ValidationError;

/// Output partitioning of the harmonized table.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ShardingConfig {
    /// Number of hash buckets records are spread across.
    #[serde(default = "default_shard_count")]
    pub shard_count: u32,
    /// Directory receiving the shard files and the run statistics.
    pub output_dir: PathBuf,
}

impl ShardingConfig {
    pub const DEFAULT_SHARD_COUNT: u32 = 256;

    pub const MAX_SHARD_COUNT: u32 = 1024;

    /// Creates a sharding configuration with the default shard count.
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            shard_count: default_shard_count(),
            output_dir: output_dir.into(),
        }
    }

    /// Validates the sharding settings.
    ///
    /// The shard count must lie in `1..=MAX_SHARD_COUNT`.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !(1..=Self::MAX_SHARD_COUNT).contains(&self.shard_count) {
            return Err(ValidationError::InvalidFieldValue {
                field: "sharding.shard_count".to_string(),
                constraint: format!("must be between 1 and {}", Self::MAX_SHARD_COUNT),
            });
        }
        if self.output_dir.as_os_str().is_empty() {
            return Err(ValidationError::EmptyPath("sharding.output_dir".to_string()));
        }

        Ok(())
    }
}

fn default_shard_count() -> u32 {
    ShardingConfig::DEFAULT_SHARD_COUNT
}
