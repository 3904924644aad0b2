//! Chunked conversion: stream the input in batches of `records_per_segment`
//! records and persist each batch as its own Parquet segment.
//!
//! Segments are numbered from 0 without gaps and named
//! `<prefix>_<sequence>.parquet` with the sequence zero-padded to at least four
//! digits. Each segment is written once, atomically, and never reopened.
//! When the record total is known the padding widens to fit the last expected
//! sequence, so names sort in sequence order. With an unknown total a run past
//! 9999 segments goes from `chunk_9999` to `chunk_10000`, which no longer sorts
//! lexicographically; use [`Segment::sequence`] for ordering in that case.
//!
//! On a read or write failure the run stops; segments already persisted stay
//! on disk and come back in [`ConversionFailure::completed`].
//!
//! ```no_run
//! use csv_splitter::{ConversionRequest, LogProgress, SplitOptions, split_file};
//!
//! # fn main() -> anyhow::Result<()> {
//! let request = ConversionRequest::from_megabytes("events.csv", "events_parquet", 250.0)?;
//! let result = split_file(&request, &SplitOptions::default(), &mut LogProgress::default())?;
//! println!("{} segments, {} bytes", result.segments.len(), result.total_bytes());
//! # Ok(())
//! # }
//! ```

use crate::config::{BYTES_PER_MB, ConversionRequest, SplitOptions};
use crate::error::{ColumnarError, ConfigError, ConversionError, ConversionFailure, ReadError};
use crate::io::csv::CsvRecordReader;
use crate::io::parquet::{records_to_batch, write_parquet_atomic};
use crate::plan::{ChunkPlan, plan_run};
use crate::progress::ProgressObserver;
use serde::Serialize;
use std::fs::{File, create_dir_all};
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, warn};

/// File extension of produced segments.
pub const SEGMENT_EXTENSION: &str = "parquet";

/// One persisted output file.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Segment {
    /// Zero-based position in the run.
    pub sequence: usize,
    pub path: PathBuf,
    /// Records written to this segment.
    pub records: usize,
    /// Size of the file on disk.
    pub bytes: u64,
}

impl Segment {
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn size_mb(&self) -> f64 {
        self.bytes as f64 / BYTES_PER_MB as f64
    }
}

/// Segments of a completed run in sequence order.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ConversionResult {
    pub segments: Vec<Segment>,
    /// Malformed input records left out of every segment.
    pub skipped_records: u64,
}

impl ConversionResult {
    #[must_use]
    pub fn total_records(&self) -> u64 {
        self.segments.iter().map(|s| s.records as u64).sum()
    }

    #[must_use]
    pub fn total_bytes(&self) -> u64 {
        self.segments.iter().map(|s| s.bytes).sum()
    }

    pub fn paths(&self) -> impl Iterator<Item = &Path> {
        self.segments.iter().map(|s| s.path.as_path())
    }
}

/// `<prefix>_<sequence padded to width>.parquet`
#[must_use]
pub fn segment_file_name(prefix: &str, sequence: usize, width: usize) -> String {
    format!("{prefix}_{sequence:0width$}.{SEGMENT_EXTENSION}")
}

/// Check that the input is a readable file and the output directory exists
/// (creating it recursively if needed).
///
/// # Errors
/// [`ConfigError::InputUnreadable`] or [`ConfigError::OutputDir`].
pub fn prepare(request: &ConversionRequest) -> Result<(), ConfigError> {
    let unreadable = |source: io::Error| ConfigError::InputUnreadable {
        path: request.input().to_path_buf(),
        source,
    };
    let file = File::open(request.input()).map_err(unreadable)?;
    if file.metadata().map_err(unreadable)?.is_dir() {
        return Err(unreadable(io::Error::new(
            io::ErrorKind::IsADirectory,
            "input is a directory",
        )));
    }
    create_dir_all(request.output_dir()).map_err(|source| ConfigError::OutputDir {
        path: request.output_dir().to_path_buf(),
        source,
    })
}

/// Estimate, count, then convert `request` in one sequential pass each.
///
/// # Errors
/// A [`ConversionFailure`] carrying a configuration error (no segments) or the
/// batch read / segment write error together with every segment persisted
/// before it.
pub fn split_file(
    request: &ConversionRequest,
    options: &SplitOptions,
    observer: &mut dyn ProgressObserver,
) -> Result<ConversionResult, ConversionFailure> {
    prepare(request).map_err(ConversionFailure::before_start)?;
    info!(
        input = %request.input().display(),
        output_dir = %request.output_dir().display(),
        target_bytes = request.target_segment_bytes(),
        "splitting CSV into Parquet segments"
    );
    let plan = plan_run(request, options, observer);
    convert_in_chunks(request, &plan, options, observer)
}

/// Stream `request.input()` in batches of `plan.records_per_segment()` records
/// and write one segment per batch under `request.output_dir()`.
///
/// Malformed records are skipped and do not count toward a batch. Only the
/// final segment may hold fewer records than requested.
///
/// # Errors
/// See [`split_file`].
pub fn convert_in_chunks(
    request: &ConversionRequest,
    plan: &ChunkPlan,
    options: &SplitOptions,
    observer: &mut dyn ProgressObserver,
) -> Result<ConversionResult, ConversionFailure> {
    let output_dir = request.output_dir();
    create_dir_all(output_dir).map_err(|source| {
        ConversionFailure::before_start(ConfigError::OutputDir {
            path: output_dir.to_path_buf(),
            source,
        })
    })?;

    let reader = CsvRecordReader::open(request.input(), &options.csv).map_err(|err| {
        ConversionFailure::before_start(match err {
            ReadError::Open { path, source } => {
                ConversionError::from(ConfigError::InputUnreadable { path, source })
            }
            other => ConversionError::BatchRead {
                sequence: 0,
                source: other,
            },
        })
    })?;

    observer.on_plan(plan);

    let width = plan.index_width();
    let headers = reader.headers().to_vec();
    let mut batches = reader.batches(plan.records_per_segment());
    let mut segments: Vec<Segment> = Vec::new();
    let mut failure = None;

    for (sequence, batch) in batches.by_ref().enumerate() {
        let records = match batch {
            Ok(records) => records,
            Err(source) => {
                failure = Some(ConversionError::BatchRead { sequence, source });
                break;
            }
        };

        let path = output_dir.join(segment_file_name(&options.segment_prefix, sequence, width));
        debug!(sequence, records = records.len(), path = %path.display(), "writing segment");

        let written = records_to_batch(&headers, &records)
            .map_err(ColumnarError::from)
            .and_then(|batch| write_parquet_atomic(&path, &batch, options.compression));
        let bytes = match written {
            Ok(bytes) => bytes,
            Err(source) => {
                failure = Some(ConversionError::SegmentWrite {
                    sequence,
                    path,
                    source,
                });
                break;
            }
        };

        let segment = Segment {
            sequence,
            path,
            records: records.len(),
            bytes,
        };
        info!(
            sequence,
            records = segment.records,
            bytes,
            path = %segment.path.display(),
            "segment written"
        );
        observer.on_segment(&segment);
        segments.push(segment);
    }

    let skipped_records = batches.skipped();
    if skipped_records > 0 {
        warn!(
            path = %request.input().display(),
            skipped = skipped_records,
            "skipped malformed CSV records"
        );
    }
    observer.on_finish(&segments);

    match failure {
        None => Ok(ConversionResult {
            segments,
            skipped_records,
        }),
        Some(err) => {
            error!(
                completed = segments.len(),
                error = %err,
                "conversion stopped; keeping segments already written"
            );
            Err(ConversionFailure {
                completed: segments,
                error: err,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_names_are_zero_padded() {
        assert_eq!(segment_file_name("chunk", 0, 4), "chunk_0000.parquet");
        assert_eq!(segment_file_name("chunk", 42, 4), "chunk_0042.parquet");
        assert_eq!(segment_file_name("chunk", 12_345, 4), "chunk_12345.parquet");
        assert_eq!(segment_file_name("part", 7, 6), "part_000007.parquet");
    }

    #[test]
    fn result_totals() {
        let seg = |sequence, records, bytes| Segment {
            sequence,
            path: PathBuf::from(segment_file_name("chunk", sequence, 4)),
            records,
            bytes,
        };
        let result = ConversionResult {
            segments: vec![seg(0, 10, 100), seg(1, 5, 60)],
            skipped_records: 2,
        };
        assert_eq!(result.total_records(), 15);
        assert_eq!(result.total_bytes(), 160);
        assert_eq!(
            result.paths().collect::<Vec<_>>(),
            vec![Path::new("chunk_0000.parquet"), Path::new("chunk_0001.parquet")]
        );
    }
}
