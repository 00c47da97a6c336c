use serde::Serialize;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::Duration;

pub struct Metrics {
    // Catalog
    catalog_loads: AtomicUsize,
    catalog_failures: AtomicUsize,

    // Extraction
    submitted: AtomicUsize,
    succeeded: AtomicUsize,
    failed: AtomicUsize,
    rejected_empty: AtomicUsize,

    // Timing (in microseconds)
    total_extract_time_us: AtomicU64,
}

impl Metrics {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            catalog_loads: AtomicUsize::new(0),
            catalog_failures: AtomicUsize::new(0),
            submitted: AtomicUsize::new(0),
            succeeded: AtomicUsize::new(0),
            failed: AtomicUsize::new(0),
            rejected_empty: AtomicUsize::new(0),
            total_extract_time_us: AtomicU64::new(0),
        })
    }

    pub fn record_catalog(&self, success: bool) {
        if success {
            self.catalog_loads.fetch_add(1, Ordering::Relaxed);
        } else {
            self.catalog_failures.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn record_rejected(&self) {
        self.rejected_empty.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_submit(&self) {
        self.submitted.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_extract(&self, duration: Duration, success: bool) {
        self.total_extract_time_us.fetch_add(duration.as_micros() as u64, Ordering::Relaxed);
        if success {
            self.succeeded.fetch_add(1, Ordering::Relaxed);
        } else {
            self.failed.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        let settled = self.succeeded.load(Ordering::Relaxed) + self.failed.load(Ordering::Relaxed);
        let total_us = self.total_extract_time_us.load(Ordering::Relaxed) as f64;

        MetricsSnapshot {
            catalog_loads: self.catalog_loads.load(Ordering::Relaxed),
            catalog_failures: self.catalog_failures.load(Ordering::Relaxed),
            extractions_submitted: self.submitted.load(Ordering::Relaxed),
            extractions_succeeded: self.succeeded.load(Ordering::Relaxed),
            extractions_failed: self.failed.load(Ordering::Relaxed),
            rejected_empty: self.rejected_empty.load(Ordering::Relaxed),
            avg_extract_time_ms: if settled > 0 {
                total_us / settled as f64 / 1000.0
            } else {
                0.0
            },
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MetricsSnapshot {
    pub catalog_loads: usize,
    pub catalog_failures: usize,
    pub extractions_submitted: usize,
    pub extractions_succeeded: usize,
    pub extractions_failed: usize,
    pub rejected_empty: usize,
    pub avg_extract_time_ms: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_averages_settled_calls() {
        let metrics = Metrics::new();
        metrics.record_submit();
        metrics.record_submit();
        metrics.record_extract(Duration::from_millis(10), true);
        metrics.record_extract(Duration::from_millis(30), false);
        metrics.record_rejected();

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.extractions_submitted, 2);
        assert_eq!(snapshot.extractions_succeeded, 1);
        assert_eq!(snapshot.extractions_failed, 1);
        assert_eq!(snapshot.rejected_empty, 1);
        assert!((snapshot.avg_extract_time_ms - 20.0).abs() < 1e-9);
    }
}
