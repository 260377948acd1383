use harmonizer::pipeline::Pipeline;
use harmonizer_config::shared::{DocumentLoadConfig, HarmonizerConfig, SourcesConfig};
use tracing::{debug, info};

use crate::error::RunnerResult;

/// Runs one harmonization with the provided configuration and logs its summary.
pub async fn start_harmonizer_with_config(config: HarmonizerConfig) -> RunnerResult<()> {
    info!("starting harmonizer run");

    log_config(&config);

    let pipeline = Pipeline::new(config);
    let output = pipeline.run().await?;
    let stats = &output.stats;

    info!(
        strategy = %stats.strategy,
        tabular_total = stats.overlap.tabular_total,
        document_total = stats.overlap.document_total,
        overlap = stats.overlap.overlap_count,
        overlap_percentage = stats.overlap.overlap_percentage,
        "source overlap"
    );
    info!(
        tabular_prepared = stats.tabular.prepared,
        tabular_duplicates = stats.tabular.duplicate_rows,
        tabular_malformed = stats.tabular.malformed_rows,
        invalid_tabular_ids = stats.invalid_identifiers.tabular,
        invalid_document_names = stats.invalid_identifiers.documents,
        documents_loaded = stats.documents.loaded,
        documents_failed = stats.documents.failed(),
        "source preparation"
    );
    info!(
        output_records = stats.output_records,
        coercion_failures = stats.coercion_failures,
        shards = stats.shards.len(),
        stats_path = %output.stats_path.display(),
        "harmonizer run finished"
    );

    Ok(())
}

fn log_config(config: &HarmonizerConfig) {
    log_sources_config(&config.sources);
    log_documents_config(&config.documents);
    debug!(
        strategy = %config.strategy,
        shard_count = config.sharding.shard_count,
        output_dir = %config.sharding.output_dir.display(),
        "using output config"
    );
}

fn log_sources_config(config: &SourcesConfig) {
    debug!(
        tabular_path = %config.tabular_path.display(),
        documents_dir = %config.documents_dir.display(),
        document_extension = %config.document_extension,
        "using sources config"
    );
}

fn log_documents_config(config: &DocumentLoadConfig) {
    debug!(
        max_workers = config.max_workers,
        timeout_ms = config.timeout_ms,
        max_document_bytes = config.max_document_bytes,
        "using document loader config"
    );
}
