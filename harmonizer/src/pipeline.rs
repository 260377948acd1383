use std::num::NonZeroU32;
use std::path::PathBuf;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use harmonizer_config::shared::HarmonizerConfig;
use tracing::info;

use crate::error::{ErrorKind, HarmonizerResult};
use crate::harmonizer_error;
use crate::hash::HASH_VERSION;
use crate::merge::merge_sources;
use crate::overlap::{analyze_overlap, discover_document_identifiers, discover_tabular_identifiers};
use crate::prepare::{prepare_documents, prepare_tabular};
use crate::schema::{HarmonizedTable, enforce_schema};
use crate::stats::{HarmonizationStats, InvalidIdentifiers};
use crate::shard::write_shards;
use crate::strategy::coalesce_records;

/// Result of a completed run.
#[derive(Debug, Clone)]
pub struct HarmonizationOutput {
    pub table: HarmonizedTable,
    pub stats: HarmonizationStats,
    /// Location of the persisted statistics.
    pub stats_path: PathBuf,
}

/// A harmonization run over one pair of sources.
///
/// Stages run one after another. Only document loading fans out over a worker pool.
#[derive(Debug, Clone)]
pub struct Pipeline {
    config: Arc<HarmonizerConfig>,
}

impl Pipeline {
    pub fn new(config: HarmonizerConfig) -> Self {
        Self {
            config: Arc::new(config),
        }
    }

    pub fn config(&self) -> &HarmonizerConfig {
        &self.config
    }

    /// Runs the pipeline stamped with the current time.
    pub async fn run(&self) -> HarmonizerResult<HarmonizationOutput> {
        self.run_at(Utc::now()).await
    }

    /// Runs the pipeline with `processed_at` as the processing timestamp of every row.
    ///
    /// Two runs over identical inputs and configuration with the same `processed_at` produce
    /// byte-identical shard files.
    pub async fn run_at(&self, processed_at: DateTime<Utc>) -> HarmonizerResult<HarmonizationOutput> {
        self.config.validate()?;
        let shard_count = NonZeroU32::new(self.config.sharding.shard_count).ok_or_else(|| {
            harmonizer_error!(ErrorKind::ConfigError, "Shard count must be greater than zero")
        })?;

        let sources = &self.config.sources;
        let strategy = self.config.strategy;

        info!(
            tabular = %sources.tabular_path.display(),
            documents = %sources.documents_dir.display(),
            %strategy,
            shard_count = shard_count.get(),
            "starting harmonization"
        );

        // We only read identifiers first, so that each preparer loads exactly the records the
        // overlap analysis assigns to it.
        let tabular_path = sources.tabular_path.clone();
        let tabular_discovery =
            tokio::task::spawn_blocking(move || discover_tabular_identifiers(&tabular_path))
                .await??;
        let document_discovery =
            discover_document_identifiers(&sources.documents_dir, &sources.document_extension)
                .await?;

        let overlap = analyze_overlap(
            &tabular_discovery.identifiers,
            &document_discovery.identifiers(),
        );

        let tabular_path = sources.tabular_path.clone();
        let tabular_ids = overlap.tabular_identifiers();
        let tabular =
            tokio::task::spawn_blocking(move || prepare_tabular(&tabular_path, &tabular_ids))
                .await??;

        let documents = prepare_documents(
            &sources.documents_dir,
            &document_discovery.files_of(&overlap.document_identifiers()),
            &self.config.documents,
        )
        .await?;

        let merged = merge_sources(tabular.records, documents.documents);
        let merged_records = merged.len();

        // Coalescing, casting and encoding are CPU bound and the writer uses blocking file
        // io, so the rest of the run happens off the async workers.
        let output_dir = self.config.sharding.output_dir.clone();
        let (table, shards) = tokio::task::spawn_blocking(move || {
            let table = enforce_schema(coalesce_records(merged, strategy), processed_at);
            let shards = write_shards(&table, shard_count, &output_dir)?;
            HarmonizerResult::Ok((table, shards))
        })
        .await??;

        let stats = HarmonizationStats {
            strategy,
            hash_version: HASH_VERSION,
            shard_count: shard_count.get(),
            processed_at,
            overlap: overlap.summary(),
            invalid_identifiers: InvalidIdentifiers {
                tabular: tabular_discovery.rejected,
                documents: document_discovery.rejected,
            },
            tabular: tabular.counts,
            documents: documents.counts,
            merged_records,
            output_records: table.len(),
            coercion_failures: table.coercion_failures(),
            shards,
        };

        let stats_dir = self.config.sharding.output_dir.clone();
        let stats_path = {
            let stats = stats.clone();
            tokio::task::spawn_blocking(move || stats.write_to(&stats_dir)).await??
        };

        info!(
            output_records = stats.output_records,
            shards = stats.shards.len(),
            documents_failed = stats.documents.failed(),
            coercion_failures = stats.coercion_failures,
            "harmonization completed"
        );

        Ok(HarmonizationOutput {
            table,
            stats,
            stats_path,
        })
    }
}
