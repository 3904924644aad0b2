//! Read-only inspection of a Parquet file: schema, row count and a row preview.

use crate::error::ColumnarError;
use crate::io::parquet::read_parquet_head;
use arrow::datatypes::{DataType, SchemaRef};
use arrow::error::ArrowError;
use arrow::record_batch::RecordBatch;
use arrow::util::pretty::pretty_format_batches;
use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Clone, Debug)]
pub struct ColumnSummary {
    pub name: String,
    pub data_type: DataType,
    pub nullable: bool,
}

/// What [`inspect_parquet`] found.
#[derive(Clone, Debug)]
pub struct ParquetSummary {
    pub path: PathBuf,
    pub num_rows: i64,
    pub columns: Vec<ColumnSummary>,
    /// Size of the file on disk.
    pub file_bytes: u64,
    /// Leading rows, at most the number requested.
    pub preview: Vec<RecordBatch>,
    schema: SchemaRef,
}

impl ParquetSummary {
    #[must_use]
    pub fn schema(&self) -> &SchemaRef {
        &self.schema
    }

    /// In-memory size of the preview rows.
    #[must_use]
    pub fn preview_memory_bytes(&self) -> usize {
        self.preview.iter().map(RecordBatch::get_array_memory_size).sum()
    }

    #[must_use]
    pub fn preview_rows(&self) -> usize {
        self.preview.iter().map(RecordBatch::num_rows).sum()
    }

    /// Human-readable report.
    ///
    /// # Errors
    /// Returns an error if the preview cannot be formatted.
    pub fn render(&self, show_info: bool, show_schema: bool) -> Result<String, ArrowError> {
        let rule = "=".repeat(50);
        let mut out = String::new();
        let _ = writeln!(out, "{rule}\nFile: {}\n{rule}", self.path.display());

        if show_info {
            let _ = writeln!(out, "\nInfo:");
            let _ = writeln!(out, "Number of rows: {}", self.num_rows);
            let _ = writeln!(out, "Number of columns: {}", self.columns.len());
            let _ = writeln!(out, "File size: {} bytes", self.file_bytes);
            let _ = writeln!(
                out,
                "Preview memory usage: {} bytes ({} rows)",
                self.preview_memory_bytes(),
                self.preview_rows()
            );
        }

        if show_schema {
            let _ = writeln!(out, "\nSchema:");
            for col in &self.columns {
                let null = if col.nullable { "" } else { " (not null)" };
                let _ = writeln!(out, "{}: {}{null}", col.name, col.data_type);
            }
        }

        let _ = writeln!(out, "\nFirst {} rows:", self.preview_rows());
        let table = if self.preview.is_empty() {
            pretty_format_batches(&[RecordBatch::new_empty(self.schema.clone())])?
        } else {
            pretty_format_batches(&self.preview)?
        };
        let _ = writeln!(out, "{table}");
        Ok(out)
    }
}

/// Open `path` and collect its schema, row count and the first `rows` rows.
///
/// # Errors
/// Returns an error if the file is missing or is not valid Parquet.
pub fn inspect_parquet(path: impl AsRef<Path>, rows: usize) -> Result<ParquetSummary, ColumnarError> {
    let path = path.as_ref();
    let file_bytes = fs::metadata(path)?.len();
    let (schema, num_rows, preview) = read_parquet_head(path, rows)?;
    let columns = schema
        .fields()
        .iter()
        .map(|f| ColumnSummary {
            name: f.name().clone(),
            data_type: f.data_type().clone(),
            nullable: f.is_nullable(),
        })
        .collect();
    Ok(ParquetSummary {
        path: path.to_path_buf(),
        num_rows,
        columns,
        file_bytes,
        preview,
        schema,
    })
}
