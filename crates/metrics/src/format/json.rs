//! JSON throughput formatter
//!
//! ```json
//! {"type":"throughput","count":12,"window_secs":5.0,"rate":2.4,"total":1300}
//! ```

use serde::Serialize;

use super::MetricsFormatter;
use crate::ThroughputSample;

/// Structured JSON formatter
#[derive(Debug, Clone, Default)]
pub struct JsonFormatter;

impl JsonFormatter {
    pub fn new() -> Self {
        Self
    }
}

#[derive(Serialize)]
struct SampleJson {
    #[serde(rename = "type")]
    report_type: &'static str,
    count: u64,
    window_secs: f64,
    rate: f64,
    total: u64,
}

impl MetricsFormatter for JsonFormatter {
    fn format_sample(&self, sample: &ThroughputSample) -> String {
        let json = SampleJson {
            report_type: "throughput",
            count: sample.count,
            window_secs: sample.window.as_secs_f64(),
            rate: sample.rate,
            total: sample.total,
        };
        serde_json::to_string(&json).unwrap_or_else(|e| format!("{{\"error\":\"{}\"}}", e))
    }
}
