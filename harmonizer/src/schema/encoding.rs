//! Conversion of canonical rows into Arrow record batches.

use std::sync::Arc;

use arrow::array::{
    ArrayRef, BooleanBuilder, Date32Builder, Int64Builder, ListBuilder, StringBuilder,
    TimestampMicrosecondBuilder, UInt64Builder,
};
use arrow::datatypes::{DataType, Date32Type, Field, SchemaRef, TimeUnit};
use arrow::record_batch::RecordBatch;
use tracing::debug;

use crate::bail;
use crate::error::{ErrorKind, HarmonizerResult};
use crate::harmonizer_error;
use crate::types::{Cell, TableRow};

/// Converts rows into a batch with `schema`.
///
/// Row values must be in schema order and already typed. A value whose variant does not
/// match its column is written as null.
pub fn rows_to_record_batch(rows: &[&TableRow], schema: &SchemaRef) -> HarmonizerResult<RecordBatch> {
    if rows.is_empty() {
        return Ok(RecordBatch::new_empty(Arc::clone(schema)));
    }

    let mut arrays: Vec<ArrayRef> = Vec::with_capacity(schema.fields().len());
    for (index, field) in schema.fields().iter().enumerate() {
        arrays.push(build_array(rows, index, field.data_type())?);
    }

    let batch = RecordBatch::try_new(Arc::clone(schema), arrays).map_err(|err| {
        harmonizer_error!(
            ErrorKind::SerializationError,
            "Failed to create Arrow record batch",
            source: err
        )
    })?;

    debug!(
        rows = batch.num_rows(),
        columns = batch.num_columns(),
        "encoded record batch"
    );

    Ok(batch)
}

fn build_array(rows: &[&TableRow], index: usize, data_type: &DataType) -> HarmonizerResult<ArrayRef> {
    let array: ArrayRef = match data_type {
        DataType::Utf8 => {
            let mut builder = StringBuilder::new();
            for row in rows {
                builder.append_option(row.get(index).and_then(Cell::as_str));
            }
            Arc::new(builder.finish())
        }
        DataType::Boolean => {
            let mut builder = BooleanBuilder::with_capacity(rows.len());
            for row in rows {
                builder.append_option(match row.get(index) {
                    Some(Cell::Bool(value)) => Some(*value),
                    _ => None,
                });
            }
            Arc::new(builder.finish())
        }
        DataType::Int64 => {
            let mut builder = Int64Builder::with_capacity(rows.len());
            for row in rows {
                builder.append_option(match row.get(index) {
                    Some(Cell::I64(value)) => Some(*value),
                    _ => None,
                });
            }
            Arc::new(builder.finish())
        }
        DataType::UInt64 => {
            let mut builder = UInt64Builder::with_capacity(rows.len());
            for row in rows {
                builder.append_option(match row.get(index) {
                    Some(Cell::U64(value)) => Some(*value),
                    _ => None,
                });
            }
            Arc::new(builder.finish())
        }
        DataType::Date32 => {
            let mut builder = Date32Builder::with_capacity(rows.len());
            for row in rows {
                builder.append_option(match row.get(index) {
                    Some(Cell::Date(date)) => Some(Date32Type::from_naive_date(*date)),
                    _ => None,
                });
            }
            Arc::new(builder.finish())
        }
        DataType::Timestamp(TimeUnit::Microsecond, timezone) => {
            let mut builder = TimestampMicrosecondBuilder::with_capacity(rows.len())
                .with_timezone_opt(timezone.clone());
            for row in rows {
                builder.append_option(match row.get(index) {
                    Some(Cell::TimestampTz(ts)) => Some(ts.timestamp_micros()),
                    _ => None,
                });
            }
            Arc::new(builder.finish())
        }
        DataType::List(item) if item.data_type() == &DataType::Utf8 => {
            let mut builder = ListBuilder::new(StringBuilder::new()).with_field(Arc::new(
                Field::new(item.name(), DataType::Utf8, item.is_nullable()),
            ));
            for row in rows {
                match row.get(index) {
                    Some(Cell::List(items)) => {
                        for value in items {
                            builder.values().append_value(value);
                        }
                        builder.append(true);
                    }
                    _ => builder.append(false),
                }
            }
            Arc::new(builder.finish())
        }
        other => {
            bail!(
                ErrorKind::SerializationError,
                "Unsupported column type in canonical schema",
                format!("{other:?}")
            );
        }
    };

    Ok(array)
}
