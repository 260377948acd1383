use std::fs::{self, File};
use std::num::NonZeroU32;
use std::path::{Path, PathBuf};

use metrics::counter;
use parquet::arrow::ArrowWriter;
use parquet::basic::Compression;
use parquet::file::properties::WriterProperties;
use serde::Serialize;
use tracing::{debug, info};

use crate::error::{ErrorKind, HarmonizerResult};
use crate::harmonizer_error;
use crate::metrics::HARMONIZER_SHARDS_WRITTEN_TOTAL;
use crate::schema::HarmonizedTable;
use crate::shard::partition::partition;

const SHARD_FILE_PREFIX: &str = "shard_";
const SHARD_FILE_EXTENSION: &str = "parquet";

/// A shard file written by [`write_shards`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShardDescriptor {
    pub shard_id: u32,
    pub path: PathBuf,
    pub record_count: usize,
}

/// File name of shard `shard_id`.
pub fn shard_file_name(shard_id: u32) -> String {
    format!("{SHARD_FILE_PREFIX}{shard_id:03}.{SHARD_FILE_EXTENSION}")
}

/// Writes every non-empty shard of `table` to its own Parquet file under `dir`.
///
/// The directory is created when missing and shard files left by earlier runs are removed
/// first, so the directory holds exactly the shards of this table afterwards. Descriptors are
/// returned in shard id order.
pub fn write_shards(
    table: &HarmonizedTable,
    shard_count: NonZeroU32,
    dir: &Path,
) -> HarmonizerResult<Vec<ShardDescriptor>> {
    fs::create_dir_all(dir).map_err(|err| {
        harmonizer_error!(
            ErrorKind::IoError,
            "Failed to create output directory",
            dir.display(),
            source: err
        )
    })?;
    remove_stale_shards(dir)?;

    let props = WriterProperties::builder()
        .set_compression(Compression::SNAPPY)
        .build();

    let mut descriptors = Vec::new();
    for group in partition(table, shard_count) {
        let path = dir.join(shard_file_name(group.shard_id));
        let batch = table.to_record_batch(&group.rows)?;

        let file = File::create(&path).map_err(|err| {
            harmonizer_error!(
                ErrorKind::IoError,
                "Failed to create shard file",
                path.display(),
                source: err
            )
        })?;
        let mut writer = ArrowWriter::try_new(file, table.schema(), Some(props.clone()))?;
        writer.write(&batch)?;
        writer.close()?;

        debug!(shard_id = group.shard_id, records = group.rows.len(), path = %path.display(), "wrote shard");
        counter!(HARMONIZER_SHARDS_WRITTEN_TOTAL).increment(1);

        descriptors.push(ShardDescriptor {
            shard_id: group.shard_id,
            path,
            record_count: group.rows.len(),
        });
    }

    info!(
        shards = descriptors.len(),
        records = table.len(),
        dir = %dir.display(),
        "wrote shards"
    );

    Ok(descriptors)
}

fn remove_stale_shards(dir: &Path) -> HarmonizerResult<()> {
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        let is_shard = path.is_file()
            && path.extension().and_then(|ext| ext.to_str()) == Some(SHARD_FILE_EXTENSION)
            && path
                .file_name()
                .and_then(|name| name.to_str())
                .is_some_and(|name| name.starts_with(SHARD_FILE_PREFIX));

        if is_shard {
            debug!(path = %path.display(), "removing stale shard");
            fs::remove_file(&path)?;
        }
    }

    Ok(())
}
