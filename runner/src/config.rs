use std::path::PathBuf;

use clap::Parser;
use harmonizer_config::shared::{CoalesceStrategy, HarmonizerConfig};
use harmonizer_config::{Environment, load_config, load_config_from};

use crate::error::{RunnerError, RunnerResult};

/// Harmonizes a tabular trial registry export with per-trial study documents.
#[derive(Parser, Debug, Default)]
#[command(name = "harmonizer-runner", version)]
pub struct Args {
    /// Directory containing the `configuration/` folder (default: working directory)
    #[arg(long)]
    pub config_root: Option<PathBuf>,

    /// Conflict resolution strategy: document_priority, tabular_priority or merge_both
    #[arg(long)]
    pub strategy: Option<CoalesceStrategy>,

    /// Number of output shards
    #[arg(long)]
    pub shard_count: Option<u32>,

    /// Directory receiving the shard files and run statistics
    #[arg(long)]
    pub output_dir: Option<PathBuf>,
}

impl Args {
    /// Applies the command line overrides on top of the loaded configuration.
    pub fn apply(&self, config: &mut HarmonizerConfig) {
        if let Some(strategy) = self.strategy {
            config.strategy = strategy;
        }
        if let Some(shard_count) = self.shard_count {
            config.sharding.shard_count = shard_count;
        }
        if let Some(output_dir) = &self.output_dir {
            config.sharding.output_dir = output_dir.clone();
        }
    }
}

/// Loads the configuration, applies `args` and validates the result.
pub fn load_harmonizer_config(args: &Args) -> RunnerResult<HarmonizerConfig> {
    let mut config = match &args.config_root {
        Some(root) => {
            let environment = Environment::load().map_err(RunnerError::config)?;
            load_config_from::<HarmonizerConfig>(root, environment)
        }
        None => load_config::<HarmonizerConfig>(),
    }
    .map_err(RunnerError::config)?;

    args.apply(&mut config);
    config.validate().map_err(RunnerError::config)?;

    Ok(config)
}
