use std::fs::{self, File};
use std::num::NonZeroU32;

use arrow::array::{Array, AsArray};
use arrow::datatypes::{DataType, TimeUnit, UInt64Type};
use chrono::{TimeZone, Utc};
use harmonizer::hash::{shard_id, stable_hash};
use harmonizer::pipeline::Pipeline;
use harmonizer::schema::{CANONICAL_COLUMNS, canonical_schema};
use harmonizer::shard::shard_file_name;
use harmonizer::stats::STATS_FILE_NAME;
use harmonizer::types::TrialId;
use harmonizer_config::shared::CoalesceStrategy;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use parquet::basic::Compression;

use crate::support::{Fixture, TabularRow, init_test_tracing, shard_files, study_document};

mod support;

fn many_rows(count: u32) -> Vec<TabularRow> {
    (0..count)
        .map(|i| {
            TabularRow::new(&format!("NCT{i:08}"), &format!("Study {i}"))
                .with_conditions("Asthma|COPD")
                .with_enrollment(&i.to_string())
        })
        .collect()
}

#[tokio::test(flavor = "multi_thread")]
async fn shard_files_carry_canonical_schema_and_rows() {
    init_test_tracing();

    // Arrange
    let fixture = Fixture::new();
    fixture.write_tabular(&many_rows(200));
    for i in (0..200).step_by(10) {
        let nct_id = format!("NCT{i:08}");
        fixture.write_document(&nct_id, &study_document(&nct_id, "Documented", &["Asthma"]));
    }
    let shard_count = 8;
    let pipeline = Pipeline::new(fixture.config(CoalesceStrategy::MergeBoth, shard_count));

    // Act
    let output = pipeline
        .run_at(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap())
        .await
        .unwrap();

    // Assert
    let files = shard_files(&fixture.output_dir());
    assert_eq!(files.len(), output.stats.shards.len());

    let mut total_rows = 0;
    for descriptor in &output.stats.shards {
        assert_eq!(
            descriptor.path.file_name().and_then(|n| n.to_str()),
            Some(shard_file_name(descriptor.shard_id).as_str())
        );

        let file = File::open(&descriptor.path).unwrap();
        let builder = ParquetRecordBatchReaderBuilder::try_new(file).unwrap();

        let row_group = builder.metadata().row_group(0);
        assert_eq!(row_group.column(0).compression(), Compression::SNAPPY);

        let schema = builder.schema().clone();
        assert_eq!(schema.fields().len(), CANONICAL_COLUMNS.len());
        for (field, expected) in schema.fields().iter().zip(canonical_schema().fields()) {
            assert_eq!(field.name(), expected.name());
            assert_eq!(field.data_type(), expected.data_type());
            assert_eq!(field.is_nullable(), expected.is_nullable());
        }
        assert_eq!(
            schema.field(36).data_type(),
            &DataType::Timestamp(TimeUnit::Microsecond, Some("UTC".into()))
        );

        let mut file_rows = 0;
        for batch in builder.build().unwrap() {
            let batch = batch.unwrap();
            file_rows += batch.num_rows();

            let ids = batch.column(0).as_string::<i32>();
            let hashes = batch.column(35).as_primitive::<UInt64Type>();
            assert_eq!(hashes.null_count(), 0);
            assert_eq!(batch.column(36).null_count(), 0);

            for row in 0..batch.num_rows() {
                let id = TrialId::parse(ids.value(row)).unwrap();
                assert_eq!(hashes.value(row), stable_hash(id.as_str()));
                assert_eq!(
                    shard_id(&id, NonZeroU32::new(shard_count).unwrap()),
                    descriptor.shard_id
                );
            }
        }

        assert_eq!(file_rows, descriptor.record_count);
        total_rows += file_rows;
    }
    assert_eq!(total_rows, 200);
}

#[tokio::test(flavor = "multi_thread")]
async fn rerun_with_fewer_shards_leaves_no_orphans() {
    init_test_tracing();

    // Arrange
    let fixture = Fixture::new();
    fixture.write_tabular(&many_rows(300));

    // Act
    Pipeline::new(fixture.config(CoalesceStrategy::DocumentPriority, 64))
        .run()
        .await
        .unwrap();
    let before = shard_files(&fixture.output_dir()).len();
    let output = Pipeline::new(fixture.config(CoalesceStrategy::DocumentPriority, 2))
        .run()
        .await
        .unwrap();

    // Assert
    assert!(before > 2);
    let after = shard_files(&fixture.output_dir());
    assert_eq!(after.len(), output.stats.shards.len());
    assert!(after.len() <= 2);
}

#[tokio::test(flavor = "multi_thread")]
async fn stats_artifact_describes_the_run() {
    init_test_tracing();

    // Arrange
    let fixture = Fixture::new();
    fixture.write_tabular(&many_rows(20));
    fixture.write_document("NCT00000003", &study_document("NCT00000003", "Doc", &[]));
    fixture.write_raw_document("NCT00000004.json", b"[]");

    // Act
    let output = Pipeline::new(fixture.config(CoalesceStrategy::MergeBoth, 4))
        .run()
        .await
        .unwrap();

    // Assert
    assert_eq!(output.stats_path, fixture.output_dir().join(STATS_FILE_NAME));
    let stats: serde_json::Value =
        serde_json::from_slice(&fs::read(&output.stats_path).unwrap()).unwrap();

    assert_eq!(stats["strategy"], "merge_both");
    assert_eq!(stats["hash_version"], 1);
    assert_eq!(stats["shard_count"], 4);
    assert_eq!(stats["overlap"]["overlap_count"], 2);
    assert_eq!(stats["documents"]["loaded"], 1);
    assert_eq!(stats["documents"]["invalid"], 1);
    assert_eq!(stats["output_records"], 20);
    assert_eq!(
        stats["shards"].as_array().map(Vec::len),
        Some(output.stats.shards.len())
    );
}
