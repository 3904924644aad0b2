//! Advisory progress callbacks.
//!
//! The converter never depends on what an observer does; callbacks cannot fail
//! and cannot stop a run.

use crate::plan::ChunkPlan;
use crate::split::Segment;
use tracing::info;

/// Receives progress events from a split run. Every method defaults to a no-op.
pub trait ProgressObserver {
    /// The plan is known; conversion is about to start.
    fn on_plan(&mut self, _plan: &ChunkPlan) {}

    /// A non-fatal problem (estimation or counting fell back to a default).
    fn on_advisory(&mut self, _message: &str) {}

    /// Segment `segment.sequence` was persisted.
    fn on_segment(&mut self, _segment: &Segment) {}

    /// The run ended; `segments` are all segments produced, successful or not.
    fn on_finish(&mut self, _segments: &[Segment]) {}
}

/// Ignores all events.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoProgress;

impl ProgressObserver for NoProgress {}

/// Renders progress as `tracing` events: `segment 3/12` when the total is
/// known, `segment 3` otherwise. Advisories are already logged by
/// [`plan_run`](crate::plan_run) and are not repeated.
#[derive(Clone, Debug, Default)]
pub struct LogProgress {
    expected: Option<u64>,
}

impl ProgressObserver for LogProgress {
    fn on_plan(&mut self, plan: &ChunkPlan) {
        self.expected = plan.estimated_segments();
        match plan.total_records() {
            Some(total) => info!("total rows: {total}"),
            None => info!("processing in chunks (total rows unknown)"),
        }
        info!("estimated rows per chunk: {}", plan.records_per_segment());
        if let Some(n) = self.expected {
            info!("expected number of chunks: {n}");
        }
    }

    fn on_segment(&mut self, segment: &Segment) {
        let position = match self.expected {
            Some(n) => format!("{}/{n}", segment.sequence + 1),
            None => format!("{}", segment.sequence + 1),
        };
        info!(
            "segment {position}: {} rows, {:.2} MB",
            segment.records,
            segment.size_mb()
        );
    }

    fn on_finish(&mut self, segments: &[Segment]) {
        info!("created {} files", segments.len());
        for segment in segments {
            let name = segment
                .path
                .file_name()
                .map_or_else(|| segment.path.display().to_string(), |n| n.to_string_lossy().into_owned());
            info!("- {name}: {:.2} MB", segment.size_mb());
        }
    }
}
