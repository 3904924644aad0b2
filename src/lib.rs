//! # csv-splitter
//!
//! Convert CSV files that are too large to handle comfortably into a directory
//! of size-bounded Parquet segments, without ever loading the whole input.
//!
//! ## How a split run works
//!
//! 1. **Estimate** ([`estimate`]): the first `sample_records` records are
//!    converted to an Arrow batch and measured. The average in-memory bytes per
//!    record turns the target size into a records-per-segment value, never
//!    below `min_records_per_segment`. If sampling fails, a fixed default is used.
//! 2. **Count** ([`count`]): a best-effort full pass counts records so progress
//!    can show `segment i/N`. If counting fails the total is simply unknown.
//! 3. **Convert** ([`split`]): the input is streamed in batches of
//!    records-per-segment records; each batch becomes `chunk_0000.parquet`,
//!    `chunk_0001.parquet`, … written atomically and measured on disk.
//!
//! Every phase is a separate sequential read pass holding at most one sample,
//! one batch or one counting window in memory.
//!
//! ## Quick Start
//!
//! ```no_run
//! use csv_splitter::*;
//! # use anyhow::Result;
//!
//! # fn main() -> Result<()> {
//! let request = ConversionRequest::from_megabytes("big.csv", "big_parquet", 64.0)?;
//! match split_file(&request, &SplitOptions::default(), &mut NoProgress) {
//!     Ok(result) => println!("{} segments", result.segments.len()),
//!     Err(failure) => {
//!         // Segments written before the failure are still on disk.
//!         eprintln!("{failure}: kept {} segments", failure.completed.len());
//!     }
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Input handling
//!
//! - The first row is the header. Blank names become `Unnamed: <i>`,
//!   duplicates get `.1`, `.2`, … suffixes.
//! - Records whose field count differs from the header's, or that are not
//!   UTF-8, are skipped everywhere (sampling, counting, conversion).
//! - `.gz`, `.zst`, `.bz2` and `.xz` inputs are decompressed transparently
//!   (see [`io::compression`]).
//! - Columns are typed per segment: `Int64`, `Float64`, `Boolean` or `Utf8`.
//!
//! ## Feature Flags
//!
//! - `compression-gzip`, `compression-zstd`, `compression-bzip2`,
//!   `compression-xz` - decompression of compressed CSV inputs (all default)
//!
//! ## Module Overview
//!
//! - [`config`] - `ConversionRequest` and `SplitOptions`
//! - [`estimate`] - sample-based size estimation
//! - [`count`] - best-effort record count
//! - [`plan`] - `ChunkPlan` assembly with explicit fallbacks
//! - [`split`] - chunked conversion
//! - [`single`] - whole-file and directory conversion
//! - [`inspect`] - Parquet schema and row preview
//! - [`progress`] - advisory progress observers
//! - [`io`] - CSV reading, Parquet writing, decompression, globbing

pub mod config;
pub mod count;
pub mod error;
pub mod estimate;
pub mod inspect;
pub mod io;
pub mod logging;
pub mod plan;
pub mod progress;
pub mod single;
pub mod split;
pub mod testing;

pub use config::{ConversionRequest, CsvOptions, SegmentCompression, SplitOptions};
pub use count::{RecordTotal, count_records};
pub use error::{
    ColumnarError, ConfigError, ConversionError, ConversionFailure, CountingError,
    EstimationError, ReadError,
};
pub use estimate::{Estimate, SampleStatistics, estimate_records_per_segment, sample_statistics};
pub use inspect::{ParquetSummary, inspect_parquet};
pub use plan::{ChunkPlan, plan_run};
pub use progress::{LogProgress, NoProgress, ProgressObserver};
pub use single::{convert_dir, convert_file};
pub use split::{ConversionResult, Segment, convert_in_chunks, segment_file_name, split_file};
