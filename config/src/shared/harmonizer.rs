use serde::{Deserialize, Serialize};

use crate::Config;
use crate::shared::{
    CoalesceStrategy, DocumentLoadConfig, ShardingConfig, SourcesConfig, ValidationError,
};

/// Complete configuration of a harmonization run.
///
/// Passed explicitly to every stage. There is no process-wide settings object.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct HarmonizerConfig {
    /// Where the tabular export and the document directory live.
    pub sources: SourcesConfig,
    /// How conflicting fields are resolved.
    #[serde(default)]
    pub strategy: CoalesceStrategy,
    /// Limits of the parallel document loader.
    #[serde(default)]
    pub documents: DocumentLoadConfig,
    /// Shard count and output location.
    pub sharding: ShardingConfig,
}

impl HarmonizerConfig {
    /// Validates every section of the configuration.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.sources.validate()?;
        self.documents.validate()?;
        self.sharding.validate()
    }
}

impl Config for HarmonizerConfig {
    const LIST_PARSE_KEYS: &'static [&'static str] = &[];
}
