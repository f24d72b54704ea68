use std::time::Duration;

use hdrhistogram::Histogram;

/// Tracks latency percentiles in nanoseconds.
#[derive(Debug, Clone)]
pub struct LatencyTracker {
    histogram: Histogram<u64>,
}

impl LatencyTracker {
    /// Creates a new latency tracker with 3 significant digits.
    pub fn new() -> Self {
        Self {
            histogram: Histogram::new(3).expect("valid histogram config"),
        }
    }

    /// Records a latency measurement in nanoseconds.
    pub fn record(&mut self, latency_ns: u64) {
        self.histogram.saturating_record(latency_ns);
    }

    pub fn record_duration(&mut self, latency: Duration) {
        self.record(latency.as_nanos().min(u128::from(u64::MAX)) as u64);
    }

    /// Returns the total number of recorded samples.
    pub fn count(&self) -> u64 {
        self.histogram.len()
    }

    pub fn p50(&self) -> u64 {
        self.histogram.value_at_quantile(0.50)
    }

    pub fn p99(&self) -> u64 {
        self.histogram.value_at_quantile(0.99)
    }

    pub fn p999(&self) -> u64 {
        self.histogram.value_at_quantile(0.999)
    }

    pub fn max(&self) -> u64 {
        self.histogram.max()
    }

    pub fn mean(&self) -> f64 {
        self.histogram.mean()
    }

    /// Labelled percentiles for tabular output.
    pub fn summary_rows(&self) -> [(&'static str, u64); 4] {
        [
            ("p50", self.p50()),
            ("p99", self.p99()),
            ("p99.9", self.p999()),
            ("max", self.max()),
        ]
    }

    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "count": self.count(),
            "p50_ns": self.p50(),
            "p99_ns": self.p99(),
            "p999_ns": self.p999(),
            "max_ns": self.max(),
            "mean_ns": self.mean(),
        })
    }
}

impl Default for LatencyTracker {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percentiles_are_ordered() {
        let mut tracker = LatencyTracker::new();
        for i in 1..=1000 {
            tracker.record(i * 1000);
        }

        assert_eq!(tracker.count(), 1000);
        assert!(tracker.p50() > 0);
        assert!(tracker.p99() > tracker.p50());
        assert!(tracker.p999() >= tracker.p99());
        assert!(tracker.max() >= tracker.p999());
    }

    #[test]
    fn test_record_duration() {
        let mut tracker = LatencyTracker::new();
        tracker.record_duration(Duration::from_micros(2));
        tracker.record_duration(Duration::from_micros(4));

        assert!((tracker.mean() - 3000.0).abs() < 10.0);
        let rows = tracker.summary_rows();
        assert_eq!(rows[0].0, "p50");
        assert!(rows[3].1 >= 4000);
    }

    #[test]
    fn test_json_export() {
        let mut tracker = LatencyTracker::new();
        tracker.record(1000);
        tracker.record(10000);

        let json = tracker.to_json();
        assert_eq!(json["count"], 2);
        assert!(json["max_ns"].as_u64().unwrap() >= 10000);
    }
}
