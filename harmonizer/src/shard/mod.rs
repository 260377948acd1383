//! Deterministic partitioning of the canonical table into Parquet shard files.

mod partition;
mod writer;

pub use partition::{ShardPartition, partition};
pub use writer::{ShardDescriptor, shard_file_name, write_shards};
