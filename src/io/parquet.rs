//! Arrow/Parquet side of the conversion.
//!
//! This module provides:
//! - **Typing and batch building**: [`infer_column_type`] and [`records_to_batch`]
//!   turn a batch of CSV records into an Arrow `RecordBatch` with a
//!   self-describing schema.
//! - **Atomic writes**: [`write_parquet_atomic`] writes through a hidden temp
//!   file in the destination directory and renames it into place, so a reader
//!   never observes a truncated file at the final path.
//! - **Readback**: [`read_parquet_batches`] and [`read_parquet_head`].
//!
//! Each batch is typed on its own; two segments of one run may disagree on a
//! column's type.

use crate::config::SegmentCompression;
use crate::error::ColumnarError;
use arrow::array::{ArrayRef, BooleanBuilder, Float64Builder, Int64Builder, StringBuilder};
use arrow::datatypes::{DataType, Field, Schema, SchemaRef};
use arrow::error::ArrowError;
use arrow::record_batch::{RecordBatch, RecordBatchOptions};
use csv::StringRecord;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use parquet::arrow::arrow_writer::ArrowWriter;
use parquet::file::properties::WriterProperties;
use std::fs::{self, File};
use std::path::Path;
use std::sync::Arc;

/// Mode of written Parquet files; temp files start out owner-only.
#[cfg(unix)]
const OUTPUT_FILE_MODE: u32 = 0o644;

/// Field values read as null.
const NULL_TOKENS: &[&str] = &["", "NA", "N/A", "NaN", "nan", "null", "NULL"];

fn is_null(value: &str) -> bool {
    NULL_TOKENS.contains(&value)
}

fn parse_bool(value: &str) -> Option<bool> {
    if value.eq_ignore_ascii_case("true") {
        Some(true)
    } else if value.eq_ignore_ascii_case("false") {
        Some(false)
    } else {
        None
    }
}

/// Narrowest Arrow type holding every non-null value:
/// `Int64`, then `Float64`, then `Boolean`, else `Utf8`. An all-null column is `Utf8`.
pub fn infer_column_type<'a>(values: impl IntoIterator<Item = &'a str>) -> DataType {
    let (mut ints, mut floats, mut bools, mut any) = (true, true, true, false);
    for raw in values {
        if is_null(raw) {
            continue;
        }
        any = true;
        let v = raw.trim();
        if ints && v.parse::<i64>().is_err() {
            ints = false;
        }
        if !ints && floats && v.parse::<f64>().is_err() {
            floats = false;
        }
        if bools && parse_bool(v).is_none() {
            bools = false;
        }
        if !(ints || floats || bools) {
            break;
        }
    }
    match (any, ints, floats, bools) {
        (false, ..) => DataType::Utf8,
        (true, true, ..) => DataType::Int64,
        (true, false, true, _) => DataType::Float64,
        (true, false, false, true) => DataType::Boolean,
        _ => DataType::Utf8,
    }
}

fn build_column(data_type: &DataType, values: &[&str]) -> ArrayRef {
    match data_type {
        DataType::Int64 => {
            let mut b = Int64Builder::with_capacity(values.len());
            for v in values {
                b.append_option((!is_null(v)).then(|| v.trim().parse().ok()).flatten());
            }
            Arc::new(b.finish())
        }
        DataType::Float64 => {
            let mut b = Float64Builder::with_capacity(values.len());
            for v in values {
                b.append_option((!is_null(v)).then(|| v.trim().parse().ok()).flatten());
            }
            Arc::new(b.finish())
        }
        DataType::Boolean => {
            let mut b = BooleanBuilder::with_capacity(values.len());
            for v in values {
                b.append_option((!is_null(v)).then(|| parse_bool(v.trim())).flatten());
            }
            Arc::new(b.finish())
        }
        _ => {
            let bytes = values.iter().map(|v| v.len()).sum();
            let mut b = StringBuilder::with_capacity(values.len(), bytes);
            for v in values {
                if is_null(v) {
                    b.append_null();
                } else {
                    b.append_value(v);
                }
            }
            Arc::new(b.finish())
        }
    }
}

/// Convert a batch of CSV records into a `RecordBatch`, one nullable column per
/// header in header order. Records must have exactly `headers.len()` fields.
///
/// # Errors
/// Returns an error if Arrow rejects the assembled columns.
pub fn records_to_batch(
    headers: &[String],
    records: &[StringRecord],
) -> Result<RecordBatch, ArrowError> {
    let mut fields = Vec::with_capacity(headers.len());
    let mut columns = Vec::with_capacity(headers.len());
    for (idx, name) in headers.iter().enumerate() {
        let values: Vec<&str> = records.iter().map(|r| r.get(idx).unwrap_or("")).collect();
        let data_type = infer_column_type(values.iter().copied());
        columns.push(build_column(&data_type, &values));
        fields.push(Field::new(name, data_type, true));
    }
    let schema: SchemaRef = Arc::new(Schema::new(fields));
    RecordBatch::try_new_with_options(
        schema,
        columns,
        &RecordBatchOptions::new().with_row_count(Some(records.len())),
    )
}

/// Write `batch` as a single Parquet file at `path` and return the size of the
/// file on disk.
///
/// The file is written to a temporary sibling and renamed over `path` once it
/// has been closed and synced. On Unix the final file is `0644`. On error the temporary file is removed and
/// `path` is untouched.
///
/// # Errors
/// Returns an error if the temp file, the Parquet encoding, the sync or the
/// rename fails.
pub fn write_parquet_atomic(
    path: impl AsRef<Path>,
    batch: &RecordBatch,
    compression: SegmentCompression,
) -> Result<u64, ColumnarError> {
    let path = path.as_ref();
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut tmp = tempfile::Builder::new()
        .prefix(".")
        .suffix(".partial")
        .tempfile_in(dir)?;

    let props = WriterProperties::builder()
        .set_compression(compression.codec())
        .build();
    let mut writer = ArrowWriter::try_new(tmp.as_file_mut(), batch.schema(), Some(props))?;
    writer.write(batch)?;
    writer.close()?;
    tmp.as_file().sync_all()?;
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        tmp.as_file()
            .set_permissions(fs::Permissions::from_mode(OUTPUT_FILE_MODE))?;
    }

    tmp.persist(path).map_err(|e| e.error)?;
    Ok(fs::metadata(path)?.len())
}

/// Read an entire Parquet file as Arrow batches of up to `batch_size` rows.
///
/// # Errors
/// Returns an error if the file cannot be opened or decoded.
pub fn read_parquet_batches(
    path: impl AsRef<Path>,
    batch_size: usize,
) -> Result<(SchemaRef, Vec<RecordBatch>), ColumnarError> {
    let file = File::open(path.as_ref())?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)?;
    let schema = builder.schema().clone();
    let reader = builder.with_batch_size(batch_size.max(1)).build()?;
    let batches = reader.collect::<Result<Vec<_>, ArrowError>>()?;
    Ok((schema, batches))
}

/// Schema, total row count and the first `rows` rows of a Parquet file.
///
/// Only the leading rows are decoded; the total comes from the footer.
///
/// # Errors
/// Returns an error if the file cannot be opened or decoded.
pub fn read_parquet_head(
    path: impl AsRef<Path>,
    rows: usize,
) -> Result<(SchemaRef, i64, Vec<RecordBatch>), ColumnarError> {
    let file = File::open(path.as_ref())?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)?;
    let schema = builder.schema().clone();
    let total = builder.metadata().file_metadata().num_rows();
    if rows == 0 {
        return Ok((schema, total, Vec::new()));
    }
    let reader = builder
        .with_batch_size(rows.min(64 * 1024))
        .with_limit(rows)
        .build()?;
    let batches = reader.collect::<Result<Vec<_>, ArrowError>>()?;
    Ok((schema, total, batches))
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrow::array::{Array, AsArray};
    use arrow::datatypes::Int64Type;

    #[test]
    fn inference_prefers_narrowest_type() {
        assert_eq!(infer_column_type(["1", "2", ""]), DataType::Int64);
        assert_eq!(infer_column_type(["1", "2.5"]), DataType::Float64);
        assert_eq!(infer_column_type(["true", "FALSE", "NA"]), DataType::Boolean);
        assert_eq!(infer_column_type(["1", "x"]), DataType::Utf8);
        assert_eq!(infer_column_type(["", "null"]), DataType::Utf8);
    }

    #[test]
    fn batch_columns_follow_header_order() {
        let headers = vec!["id".to_string(), "name".to_string()];
        let records = vec![
            StringRecord::from(vec!["1", "a"]),
            StringRecord::from(vec!["", "b"]),
        ];
        let batch = records_to_batch(&headers, &records).unwrap();

        assert_eq!(batch.num_rows(), 2);
        assert_eq!(batch.schema().field(0).name(), "id");
        assert_eq!(batch.schema().field(1).data_type(), &DataType::Utf8);
        let ids = batch.column(0).as_primitive::<Int64Type>();
        assert_eq!(ids.value(0), 1);
        assert!(ids.is_null(1));
    }

    #[test]
    fn empty_batch_keeps_schema() {
        let headers = vec!["a".to_string()];
        let batch = records_to_batch(&headers, &[]).unwrap();
        assert_eq!(batch.num_rows(), 0);
        assert_eq!(batch.num_columns(), 1);
    }
}
