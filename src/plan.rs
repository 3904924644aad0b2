//! Chunk planning: combine the size estimate and the optional record total.

use crate::config::{ConversionRequest, SplitOptions};
use crate::count::{RecordTotal, count_records};
use crate::estimate::{Estimate, estimate_records_per_segment};
use crate::progress::ProgressObserver;
use serde::Serialize;
use tracing::{info, warn};

/// Minimum zero-padding of segment sequence numbers in file names.
pub const MIN_INDEX_WIDTH: usize = 4;

/// How the input will be cut into segments.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct ChunkPlan {
    records_per_segment: usize,
    total_records: Option<u64>,
    estimated_segments: Option<u64>,
}

impl ChunkPlan {
    /// `records_per_segment` is clamped to at least 1.
    #[must_use]
    pub fn new(records_per_segment: usize, total_records: Option<u64>) -> Self {
        let records_per_segment = records_per_segment.max(1);
        Self {
            records_per_segment,
            total_records,
            estimated_segments: total_records.map(|n| n.div_ceil(records_per_segment as u64)),
        }
    }

    #[must_use]
    pub const fn records_per_segment(&self) -> usize {
        self.records_per_segment
    }

    #[must_use]
    pub const fn total_records(&self) -> Option<u64> {
        self.total_records
    }

    #[must_use]
    pub const fn estimated_segments(&self) -> Option<u64> {
        self.estimated_segments
    }

    /// Zero-padding for segment numbers: four digits, or more when the
    /// estimated segment count needs them to keep names sorting in order.
    #[must_use]
    pub fn index_width(&self) -> usize {
        let last = self.estimated_segments.unwrap_or(0).saturating_sub(1);
        (last.checked_ilog10().unwrap_or(0) as usize + 1).max(MIN_INDEX_WIDTH)
    }
}

/// Estimate, count and assemble the [`ChunkPlan`] for `request`.
///
/// Estimation and counting failures are reported to `observer` as advisories
/// and replaced by their defaults; this never fails.
pub fn plan_run(
    request: &ConversionRequest,
    options: &SplitOptions,
    observer: &mut dyn ProgressObserver,
) -> ChunkPlan {
    let input = request.input();

    let estimate = estimate_records_per_segment(input, request.target_segment_bytes(), options);
    if let Estimate::Fallback {
        records_per_segment,
        reason,
    } = &estimate
    {
        warn!(
            path = %input.display(),
            error = %reason,
            records_per_segment,
            "size estimation failed, using default records per segment"
        );
        observer.on_advisory(&format!(
            "could not estimate segment size ({reason}); using {records_per_segment} records per segment"
        ));
    }

    let total = RecordTotal::from(count_records(
        input,
        &options.csv,
        options.count_batch_records,
    ));
    if let RecordTotal::Unknown(reason) = &total {
        warn!(path = %input.display(), error = %reason, "could not count input records");
        observer.on_advisory(&format!(
            "could not count rows ({reason}); proceeding with unknown total"
        ));
    }

    let plan = ChunkPlan::new(estimate.records_per_segment(), total.known());
    info!(
        path = %input.display(),
        records_per_segment = plan.records_per_segment(),
        total_records = plan.total_records(),
        estimated_segments = plan.estimated_segments(),
        "planned conversion"
    );
    plan
}
