//! Per-step performance metrics for the time-step loop.
//!
//! [`StepMetrics`] captures timing for a single iteration so that callers
//! can tell synthesis cost apart from time spent inside the runtime.

/// Timing collected during a single step.
///
/// All durations are in microseconds.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StepMetrics {
    /// Wall-clock time for the entire step.
    pub total_us: u64,
    /// Time spent filling the point (and, if enabled, cell) buffers.
    pub synthesis_us: u64,
    /// Time spent in `publish` plus both action lists.
    pub publish_us: u64,
    /// Number of vertex samples written this step.
    pub point_count: usize,
}

impl StepMetrics {
    /// Time not attributed to synthesis or publication.
    pub fn overhead_us(&self) -> u64 {
        self.total_us
            .saturating_sub(self.synthesis_us)
            .saturating_sub(self.publish_us)
    }
}

pub(crate) fn elapsed_us(since: std::time::Instant) -> u64 {
    u64::try_from(since.elapsed().as_micros()).unwrap_or(u64::MAX)
}
