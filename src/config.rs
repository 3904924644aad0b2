//! Run configuration: the immutable [`ConversionRequest`] and the tunables in
//! [`SplitOptions`].

use crate::error::ConfigError;
use parquet::basic::{Compression, ZstdLevel};
use std::path::{Path, PathBuf};

/// Bytes in one megabyte as used for `--chunk-size`.
pub const BYTES_PER_MB: u64 = 1024 * 1024;

/// Default segment budget in megabytes.
pub const DEFAULT_CHUNK_SIZE_MB: f64 = 250.0;

/// What to convert, where to put it, and how big each segment should roughly be.
///
/// Built once per run and never mutated afterwards. Construction validates that
/// the target size is positive; input readability and output directory creation
/// are checked when the run starts.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConversionRequest {
    input: PathBuf,
    output_dir: PathBuf,
    target_segment_bytes: u64,
}

impl ConversionRequest {
    /// # Errors
    /// [`ConfigError::ZeroTargetSize`] if `target_segment_bytes == 0`.
    pub fn new(
        input: impl Into<PathBuf>,
        output_dir: impl Into<PathBuf>,
        target_segment_bytes: u64,
    ) -> Result<Self, ConfigError> {
        if target_segment_bytes == 0 {
            return Err(ConfigError::ZeroTargetSize);
        }
        Ok(Self {
            input: input.into(),
            output_dir: output_dir.into(),
            target_segment_bytes,
        })
    }

    /// Build a request from a size budget in megabytes (fractions allowed).
    ///
    /// # Errors
    /// [`ConfigError::InvalidMegabytes`] for NaN, infinite, zero or negative
    /// values, and [`ConfigError::ZeroTargetSize`] if the value rounds down to
    /// zero bytes.
    pub fn from_megabytes(
        input: impl Into<PathBuf>,
        output_dir: impl Into<PathBuf>,
        megabytes: f64,
    ) -> Result<Self, ConfigError> {
        if !megabytes.is_finite() || megabytes <= 0.0 {
            return Err(ConfigError::InvalidMegabytes(megabytes));
        }
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
        let bytes = (megabytes * BYTES_PER_MB as f64) as u64;
        Self::new(input, output_dir, bytes)
    }

    #[must_use]
    pub fn input(&self) -> &Path {
        &self.input
    }

    #[must_use]
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    #[must_use]
    pub const fn target_segment_bytes(&self) -> u64 {
        self.target_segment_bytes
    }
}

/// CSV dialect of the input. The first row is always the header.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CsvOptions {
    pub delimiter: u8,
    pub quote: u8,
}

impl Default for CsvOptions {
    fn default() -> Self {
        Self {
            delimiter: b',',
            quote: b'"',
        }
    }
}

/// Parquet codec used for every written file.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SegmentCompression {
    Uncompressed,
    #[default]
    Snappy,
    Zstd,
}

impl SegmentCompression {
    pub(crate) fn codec(self) -> Compression {
        match self {
            Self::Uncompressed => Compression::UNCOMPRESSED,
            Self::Snappy => Compression::SNAPPY,
            Self::Zstd => Compression::ZSTD(ZstdLevel::default()),
        }
    }
}

impl std::str::FromStr for SegmentCompression {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "uncompressed" | "none" => Ok(Self::Uncompressed),
            "snappy" => Ok(Self::Snappy),
            "zstd" => Ok(Self::Zstd),
            other => Err(format!(
                "unknown compression '{other}' (expected snappy, zstd or uncompressed)"
            )),
        }
    }
}

/// Tunables for a split run.
///
/// ```
/// use csv_splitter::SplitOptions;
///
/// let opts = SplitOptions {
///     sample_records: 500,
///     ..Default::default()
/// };
/// assert_eq!(opts.min_records_per_segment, 1000);
/// ```
#[derive(Clone, Debug)]
pub struct SplitOptions {
    pub csv: CsvOptions,
    /// Upper bound on records read by the size estimator.
    pub sample_records: usize,
    /// Floor applied to every estimate.
    pub min_records_per_segment: usize,
    /// Records per segment when estimation fails.
    pub fallback_records_per_segment: usize,
    /// Window size of the row counter; independent of the segment size.
    pub count_batch_records: usize,
    /// File name prefix of produced segments (`<prefix>_0000.parquet`).
    pub segment_prefix: String,
    pub compression: SegmentCompression,
}

impl Default for SplitOptions {
    fn default() -> Self {
        Self {
            csv: CsvOptions::default(),
            sample_records: 1000,
            min_records_per_segment: 1000,
            fallback_records_per_segment: 10_000,
            count_batch_records: 10_000,
            segment_prefix: "chunk".to_string(),
            compression: SegmentCompression::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_target_is_rejected() {
        let err = ConversionRequest::new("in.csv", "out", 0).unwrap_err();
        assert!(matches!(err, ConfigError::ZeroTargetSize));
    }

    #[test]
    fn megabytes_are_validated_and_converted() {
        let req = ConversionRequest::from_megabytes("in.csv", "out", 1.5).unwrap();
        assert_eq!(req.target_segment_bytes(), 1_572_864);

        for bad in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            assert!(matches!(
                ConversionRequest::from_megabytes("in.csv", "out", bad),
                Err(ConfigError::InvalidMegabytes(_))
            ));
        }
    }

    #[test]
    fn compression_parses_case_insensitively() {
        assert_eq!("ZSTD".parse::<SegmentCompression>(), Ok(SegmentCompression::Zstd));
        assert_eq!("none".parse::<SegmentCompression>(), Ok(SegmentCompression::Uncompressed));
        assert!("lz4".parse::<SegmentCompression>().is_err());
    }
}
