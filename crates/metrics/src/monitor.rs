//! Throughput monitor
//!
//! Samples the delivered-event counter once per window and reports the rate
//! through `tracing`. Window boundaries follow the tokio interval; scheduling
//! jitter is not corrected for.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::{MissedTickBehavior, interval};
use tokio_util::sync::CancellationToken;
use tracing::info;
use tweetcast_config::{MetricsConfig, MetricsFormat};
use tweetcast_pipeline::ThroughputCounter;

use crate::format::{HumanFormatter, JsonFormatter, MetricsFormatter};

/// One sampling window
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThroughputSample {
    /// Events counted during the window
    pub count: u64,
    /// Nominal window length
    pub window: Duration,
    /// `count / window` in events per second
    pub rate: f64,
    /// Events counted since the monitor was created
    pub total: u64,
}

/// Periodic throughput reporter
pub struct ThroughputMonitor {
    counter: Arc<ThroughputCounter>,
    window: Duration,
    formatter: Box<dyn MetricsFormatter>,
    total: u64,
}

impl ThroughputMonitor {
    /// Create a monitor sampling `counter` every `window`
    ///
    /// A zero window is clamped to one millisecond.
    pub fn new(counter: Arc<ThroughputCounter>, window: Duration) -> Self {
        Self {
            counter,
            window: window.max(Duration::from_millis(1)),
            formatter: Box::new(HumanFormatter::new()),
            total: 0,
        }
    }

    /// Create a monitor from the `[metrics]` section
    pub fn from_config(counter: Arc<ThroughputCounter>, config: &MetricsConfig) -> Self {
        Self::new(counter, config.interval).with_format(config.format)
    }

    /// Select the output format
    pub fn with_format(mut self, format: MetricsFormat) -> Self {
        self.formatter = match format {
            MetricsFormat::Human => Box::new(HumanFormatter::new()),
            MetricsFormat::Json => Box::new(JsonFormatter::new()),
        };
        self
    }

    /// Take the current count, reset it to zero and compute the rate
    pub fn sample(&mut self) -> ThroughputSample {
        let count = self.counter.take();
        self.total = self.total.saturating_add(count);

        ThroughputSample {
            count,
            window: self.window,
            rate: count as f64 / self.window.as_secs_f64(),
            total: self.total,
        }
    }

    /// Sample once and log the formatted report
    pub fn report(&mut self) -> ThroughputSample {
        let sample = self.sample();
        info!("{}", self.formatter.format_sample(&sample));
        sample
    }

    /// Report every window until cancelled
    pub async fn run(mut self, cancel: CancellationToken) {
        let mut ticker = interval(self.window);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        // first tick completes immediately
        ticker.tick().await;

        info!(
            window_ms = self.window.as_millis() as u64,
            "throughput monitor started"
        );

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    info!(total = self.total, "throughput monitor shutting down");
                    break;
                }
                _ = ticker.tick() => {
                    self.report();
                }
            }
        }
    }
}

impl std::fmt::Debug for ThroughputMonitor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ThroughputMonitor")
            .field("window", &self.window)
            .field("total", &self.total)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn monitor(window: Duration) -> (Arc<ThroughputCounter>, ThroughputMonitor) {
        let counter = Arc::new(ThroughputCounter::new());
        let monitor = ThroughputMonitor::new(Arc::clone(&counter), window);
        (counter, monitor)
    }

    #[test]
    fn test_sample_rate_is_count_over_window() {
        let (counter, mut monitor) = monitor(Duration::from_secs(5));
        for _ in 0..12 {
            counter.record();
        }

        let sample = monitor.sample();
        assert_eq!(sample.count, 12);
        assert_eq!(sample.window, Duration::from_secs(5));
        assert!((sample.rate - 2.4).abs() < f64::EPSILON);
    }

    #[test]
    fn test_sample_resets_counter() {
        let (counter, mut monitor) = monitor(Duration::from_secs(1));
        counter.record();
        counter.record();

        assert_eq!(monitor.sample().count, 2);
        assert_eq!(counter.current(), 0);
        assert_eq!(monitor.sample().count, 0);
    }

    #[test]
    fn test_total_accumulates_across_windows() {
        let (counter, mut monitor) = monitor(Duration::from_secs(1));
        counter.record();
        monitor.sample();
        counter.record();
        counter.record();

        let sample = monitor.sample();
        assert_eq!(sample.count, 2);
        assert_eq!(sample.total, 3);
    }

    #[test]
    fn test_empty_window_reports_zero() {
        let (_counter, mut monitor) = monitor(Duration::from_millis(500));
        let sample = monitor.sample();
        assert_eq!(sample.count, 0);
        assert_eq!(sample.rate, 0.0);
    }

    #[test]
    fn test_zero_window_is_clamped() {
        let (_counter, monitor) = monitor(Duration::ZERO);
        assert_eq!(monitor.window, Duration::from_millis(1));
    }

    #[test]
    fn test_from_config() {
        let config = MetricsConfig {
            interval: Duration::from_secs(2),
            format: MetricsFormat::Json,
            ..Default::default()
        };
        let monitor = ThroughputMonitor::from_config(Arc::new(ThroughputCounter::new()), &config);
        assert_eq!(monitor.window, Duration::from_secs(2));
    }

    #[tokio::test]
    async fn test_run_samples_and_stops_on_cancel() {
        let (counter, monitor) = monitor(Duration::from_millis(20));
        let cancel = CancellationToken::new();
        let task = tokio::spawn(monitor.run(cancel.clone()));

        counter.record();
        counter.record();
        tokio::time::sleep(Duration::from_millis(100)).await;

        // at least one window elapsed, which took the count
        assert_eq!(counter.current(), 0);

        cancel.cancel();
        tokio::time::timeout(Duration::from_secs(1), task)
            .await
            .unwrap()
            .unwrap();
    }

    #[tokio::test]
    async fn test_increments_during_sampling_are_not_lost() {
        let (counter, mut monitor) = monitor(Duration::from_secs(1));
        let writer = {
            let counter = Arc::clone(&counter);
            tokio::task::spawn_blocking(move || {
                for _ in 0..10_000 {
                    counter.record();
                }
            })
        };

        let mut seen = 0;
        while !writer.is_finished() {
            seen += monitor.sample().count;
            tokio::task::yield_now().await;
        }
        writer.await.unwrap();
        seen += monitor.sample().count;

        assert_eq!(seen, 10_000);
        assert_eq!(monitor.sample().total, 10_000);
    }
}
