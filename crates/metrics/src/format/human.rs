//! Human-readable throughput formatter
//!
//! ```text
//! [metrics] throughput: 2.4/s | 12 tweets in 5s | total: 1.3K
//! ```

use super::{MetricsFormatter, format_count, format_rate, format_window};
use crate::ThroughputSample;

/// Human-readable formatter
#[derive(Debug, Clone, Default)]
pub struct HumanFormatter;

impl HumanFormatter {
    pub fn new() -> Self {
        Self
    }
}

impl MetricsFormatter for HumanFormatter {
    fn format_sample(&self, sample: &ThroughputSample) -> String {
        format!(
            "[metrics] throughput: {} | {} tweets in {} | total: {}",
            format_rate(sample.rate),
            sample.count,
            format_window(sample.window),
            format_count(sample.total),
        )
    }
}
