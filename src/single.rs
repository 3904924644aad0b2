//! Whole-file conversion without chunking.
//!
//! [`convert_file`] loads the entire CSV into one Arrow batch and writes one
//! Parquet file with the same atomic write used for segments. Memory is
//! proportional to the input, so prefer [`split_file`](crate::split_file) for
//! large inputs. [`convert_dir`] applies it to every `*.csv` below a directory.

use crate::config::{CsvOptions, SegmentCompression};
use crate::io::csv::CsvRecordReader;
use crate::io::glob::csv_files_under;
use crate::io::parquet::{records_to_batch, write_parquet_atomic};
use anyhow::{Context, Result};
use std::fs::create_dir_all;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Convert one CSV file to one Parquet file.
///
/// `output` defaults to `input` with its extension replaced by `.parquet`.
/// Parent directories of the output are created. Malformed records are
/// skipped as in chunked conversion.
///
/// # Returns
/// The path of the written Parquet file.
///
/// # Errors
/// Returns an error if the input cannot be read or the output cannot be written.
pub fn convert_file(
    input: impl AsRef<Path>,
    output: Option<&Path>,
    csv: &CsvOptions,
    compression: SegmentCompression,
) -> Result<PathBuf> {
    let input = input.as_ref();
    let output = output.map_or_else(|| input.with_extension("parquet"), Path::to_path_buf);
    if let Some(parent) = output.parent()
        && !parent.as_os_str().is_empty()
    {
        create_dir_all(parent).with_context(|| format!("mkdir -p {}", parent.display()))?;
    }

    let mut reader = CsvRecordReader::open(input, csv)
        .with_context(|| format!("converting {}", input.display()))?;
    let records = reader
        .read_batch(usize::MAX)
        .with_context(|| format!("converting {}", input.display()))?;
    let batch = records_to_batch(reader.headers(), &records)
        .with_context(|| format!("build record batch for {}", input.display()))?;
    let bytes = write_parquet_atomic(&output, &batch, compression)
        .with_context(|| format!("write {}", output.display()))?;

    if reader.skipped() > 0 {
        warn!(path = %input.display(), skipped = reader.skipped(), "skipped malformed CSV records");
    }
    info!(
        input = %input.display(),
        output = %output.display(),
        records = records.len(),
        bytes,
        "converted file"
    );
    Ok(output)
}

/// Convert every `*.csv` under `input_dir` (recursively, sorted).
///
/// With `output_dir`, the relative layout below `input_dir` is mirrored there;
/// otherwise each Parquet file is written next to its CSV. A file that fails
/// to convert is logged and skipped.
///
/// # Returns
/// Paths of the Parquet files written, in input order.
///
/// # Errors
/// Returns an error only if the directory cannot be listed or `output_dir`
/// cannot be created.
pub fn convert_dir(
    input_dir: impl AsRef<Path>,
    output_dir: Option<&Path>,
    csv: &CsvOptions,
    compression: SegmentCompression,
) -> Result<Vec<PathBuf>> {
    let input_dir = input_dir.as_ref();
    if let Some(dir) = output_dir {
        create_dir_all(dir).with_context(|| format!("mkdir -p {}", dir.display()))?;
    }

    let mut converted = Vec::new();
    for file in csv_files_under(input_dir)? {
        let target = output_dir.map(|dir| {
            let rel = file.strip_prefix(input_dir).unwrap_or(&file);
            dir.join(rel).with_extension("parquet")
        });
        match convert_file(&file, target.as_deref(), csv, compression) {
            Ok(out) => {
                info!("converted {} -> {}", file.display(), out.display());
                converted.push(out);
            }
            Err(err) => warn!("failed to convert {}: {err:#}", file.display()),
        }
    }
    Ok(converted)
}
