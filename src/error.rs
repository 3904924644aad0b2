//! Error taxonomy for estimation, counting and chunked conversion.
//!
//! Two classes of failure exist:
//! - **advisory** ([`EstimationError`], [`CountingError`]): the run recovers with a
//!   default records-per-segment or an unknown total;
//! - **fatal** ([`ConversionError`]): the run stops. Segments already persisted are
//!   handed back through [`ConversionFailure`].

use crate::split::Segment;
use arrow::error::ArrowError;
use parquet::errors::ParquetError;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// An invalid [`ConversionRequest`](crate::ConversionRequest) or an environment
/// that cannot host the run. Raised before any segment is written.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Target segment size of zero bytes.
    #[error("target segment size must be greater than zero")]
    ZeroTargetSize,

    /// Target segment size in megabytes that is NaN, infinite or not positive.
    #[error("target segment size must be a positive number of megabytes, got {0}")]
    InvalidMegabytes(f64),

    /// The input cannot be opened for reading.
    #[error("input {} is not readable", .path.display())]
    InputUnreadable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The output directory cannot be created.
    #[error("cannot create output directory {}", .path.display())]
    OutputDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Failure of the CSV stream itself. Malformed records are never reported here;
/// they are skipped by the reader.
#[derive(Debug, Error)]
pub enum ReadError {
    #[error("open {}", .path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("read CSV header of {}", .path.display())]
    Header {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    /// The input has no header row at all (empty file).
    #[error("{} has no header row", .path.display())]
    MissingHeader { path: PathBuf },

    #[error("read CSV record #{record} of {}", .path.display())]
    Record {
        path: PathBuf,
        record: u64,
        #[source]
        source: csv::Error,
    },
}

/// Why the size estimator could not measure a sample.
#[derive(Debug, Error)]
pub enum EstimationError {
    #[error(transparent)]
    Read(#[from] ReadError),

    #[error("sample of {} contains no records", .path.display())]
    EmptySample { path: PathBuf },

    #[error("build sample batch")]
    Columnar(#[from] ColumnarError),

    #[error("sample of {records} records measured zero bytes")]
    ZeroFootprint { records: usize },
}

/// Why the full-pass row count is unavailable.
#[derive(Debug, Error)]
#[error("row count unavailable")]
pub struct CountingError(#[from] pub ReadError);

/// Arrow/Parquet level failures while building, writing or reading a columnar file.
#[derive(Debug, Error)]
pub enum ColumnarError {
    #[error("I/O error")]
    Io(#[from] io::Error),

    #[error("arrow error")]
    Arrow(#[from] ArrowError),

    #[error("parquet error")]
    Parquet(#[from] ParquetError),
}

/// Fatal run-level error.
#[derive(Debug, Error)]
pub enum ConversionError {
    #[error("invalid conversion request")]
    Configuration(#[from] ConfigError),

    /// The streaming reader could not produce batch `sequence`.
    #[error("could not read batch {sequence}")]
    BatchRead {
        sequence: usize,
        #[source]
        source: ReadError,
    },

    /// Batch `sequence` was read but could not be persisted to `path`.
    #[error("could not write segment {sequence} to {}", .path.display())]
    SegmentWrite {
        sequence: usize,
        path: PathBuf,
        #[source]
        source: ColumnarError,
    },
}

/// A run that stopped early. `completed` holds every segment persisted before
/// `error`; those files are left on disk and are independently readable.
#[derive(Debug, Error)]
#[error("conversion stopped after {} segment(s)", .completed.len())]
pub struct ConversionFailure {
    pub completed: Vec<Segment>,
    #[source]
    pub error: ConversionError,
}

impl ConversionFailure {
    /// A failure before any segment was produced.
    #[must_use]
    pub fn before_start(error: impl Into<ConversionError>) -> Self {
        Self {
            completed: Vec::new(),
            error: error.into(),
        }
    }
}
