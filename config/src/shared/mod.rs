//! Shared configuration types for harmonization runs.

mod base;
mod documents;
mod harmonizer;
mod sharding;
mod sources;
mod strategy;

pub use base::ValidationError;
pub use documents::DocumentLoadConfig;
pub use harmonizer::HarmonizerConfig;
pub use sharding::ShardingConfig;
pub use sources::SourcesConfig;
pub use strategy::{CoalesceStrategy, ParseStrategyError};
