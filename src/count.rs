//! Best-effort full-pass record count.
//!
//! The count is advisory: it only feeds progress reporting and the estimated
//! segment count. It is computed in windows of `count_batch_records`, so no
//! more than one window is resident at a time.

use crate::config::CsvOptions;
use crate::error::CountingError;
use crate::io::csv::CsvRecordReader;
use std::path::Path;
use tracing::debug;

/// Count well-formed data records in `path` (header excluded, malformed
/// records skipped).
///
/// # Errors
/// [`CountingError`] if the input cannot be opened or the stream fails part way.
pub fn count_records(
    path: impl AsRef<Path>,
    csv: &CsvOptions,
    window: usize,
) -> Result<u64, CountingError> {
    let path = path.as_ref();
    let mut total = 0u64;
    let mut batches = CsvRecordReader::open(path, csv)?.batches(window);
    for batch in batches.by_ref() {
        total += batch?.len() as u64;
    }
    debug!(
        path = %path.display(),
        records = total,
        skipped = batches.skipped(),
        "counted input records"
    );
    Ok(total)
}

/// Total record count of the input, or why it is unknown.
#[derive(Debug)]
pub enum RecordTotal {
    Known(u64),
    Unknown(CountingError),
}

impl RecordTotal {
    #[must_use]
    pub const fn known(&self) -> Option<u64> {
        match self {
            Self::Known(n) => Some(*n),
            Self::Unknown(_) => None,
        }
    }
}

impl From<Result<u64, CountingError>> for RecordTotal {
    fn from(res: Result<u64, CountingError>) -> Self {
        match res {
            Ok(n) => Self::Known(n),
            Err(err) => Self::Unknown(err),
        }
    }
}
