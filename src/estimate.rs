//! Size estimation from a bounded sample of the input.
//!
//! The sample is the first `sample_records` well-formed records (or the whole
//! input if it is shorter). It is converted to an Arrow batch exactly as a
//! segment would be, and the batch's in-memory footprint, variable-length
//! buffers included, gives the average cost per record.

use crate::config::{CsvOptions, SplitOptions};
use crate::error::{ColumnarError, EstimationError};
use crate::io::csv::CsvRecordReader;
use crate::io::parquet::records_to_batch;
use std::path::Path;
use tracing::debug;

/// What the sample measured.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SampleStatistics {
    /// Records in the sample; equals the input's record count when the input
    /// is shorter than the sample bound.
    pub sample_records: usize,
    /// In-memory size of the sample batch in bytes.
    pub footprint_bytes: usize,
    /// `footprint_bytes / sample_records`, always > 0.
    pub avg_bytes_per_record: f64,
}

impl SampleStatistics {
    /// Records per segment for a `target_bytes` budget, never below `floor`.
    #[must_use]
    pub fn records_for_budget(&self, target_bytes: u64, floor: usize) -> usize {
        records_for_budget(self.avg_bytes_per_record, target_bytes, floor)
    }
}

/// `max(floor, ⌊target_bytes / avg_bytes_per_record⌋)`.
#[must_use]
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss
)]
pub fn records_for_budget(avg_bytes_per_record: f64, target_bytes: u64, floor: usize) -> usize {
    let raw = (target_bytes as f64 / avg_bytes_per_record).floor();
    // `as` saturates for out-of-range floats.
    (raw as usize).max(floor)
}

/// Measure the first `sample_records` records of `path`.
///
/// Malformed records inside the sample window are skipped and do not count.
///
/// # Errors
/// [`EstimationError::Read`] if the input cannot be read,
/// [`EstimationError::EmptySample`] if no well-formed record exists, and
/// [`EstimationError::ZeroFootprint`] if the measured size is zero.
pub fn sample_statistics(
    path: impl AsRef<Path>,
    csv: &CsvOptions,
    sample_records: usize,
) -> Result<SampleStatistics, EstimationError> {
    let path = path.as_ref();
    let mut reader = CsvRecordReader::open(path, csv)?;
    let sample = reader.read_batch(sample_records.max(1))?;
    if sample.is_empty() {
        return Err(EstimationError::EmptySample {
            path: path.to_path_buf(),
        });
    }

    let batch = records_to_batch(reader.headers(), &sample).map_err(ColumnarError::from)?;
    let footprint_bytes = batch.get_array_memory_size();
    if footprint_bytes == 0 {
        return Err(EstimationError::ZeroFootprint {
            records: sample.len(),
        });
    }

    #[allow(clippy::cast_precision_loss)]
    let avg_bytes_per_record = footprint_bytes as f64 / sample.len() as f64;
    debug!(
        path = %path.display(),
        records = sample.len(),
        skipped = reader.skipped(),
        footprint_bytes,
        avg_bytes_per_record,
        "sampled input"
    );
    Ok(SampleStatistics {
        sample_records: sample.len(),
        footprint_bytes,
        avg_bytes_per_record,
    })
}

/// Outcome of size estimation: a measured value or the configured default.
#[derive(Debug)]
pub enum Estimate {
    Measured {
        stats: SampleStatistics,
        records_per_segment: usize,
    },
    Fallback {
        records_per_segment: usize,
        reason: EstimationError,
    },
}

impl Estimate {
    #[must_use]
    pub const fn records_per_segment(&self) -> usize {
        match self {
            Self::Measured {
                records_per_segment,
                ..
            }
            | Self::Fallback {
                records_per_segment,
                ..
            } => *records_per_segment,
        }
    }

    #[must_use]
    pub const fn is_fallback(&self) -> bool {
        matches!(self, Self::Fallback { .. })
    }
}

/// Estimate records per segment for `target_bytes`, falling back to
/// `options.fallback_records_per_segment` when the sample cannot be measured.
#[must_use]
pub fn estimate_records_per_segment(
    path: impl AsRef<Path>,
    target_bytes: u64,
    options: &SplitOptions,
) -> Estimate {
    match sample_statistics(path, &options.csv, options.sample_records) {
        Ok(stats) => Estimate::Measured {
            records_per_segment: stats
                .records_for_budget(target_bytes, options.min_records_per_segment),
            stats,
        },
        Err(reason) => Estimate::Fallback {
            records_per_segment: options.fallback_records_per_segment.max(1),
            reason,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn budget_divides_and_floors() {
        assert_eq!(records_for_budget(100.0, 1_000_000, 1000), 10_000);
        assert_eq!(records_for_budget(3.0, 10_000, 1000), 3333);
    }

    #[test]
    fn floor_applies_when_records_exceed_budget() {
        assert_eq!(records_for_budget(5_000.0, 1_000, 1000), 1000);
        assert_eq!(records_for_budget(10.0, 5_000, 1000), 1000);
    }
}
