//! Harmonization of clinical trial registry data.
//!
//! Combines a tabular registry export with per-trial structured documents into one canonical,
//! hash-sharded Parquet table. See [`pipeline::Pipeline`] for the end-to-end run.

pub mod conversions;
pub mod document;
pub mod error;
pub mod hash;
mod macros;
pub mod merge;
pub mod metrics;
pub mod overlap;
pub mod pipeline;
pub mod prepare;
pub mod schema;
pub mod shard;
pub mod stats;
pub mod strategy;
pub mod types;
pub mod workers;
