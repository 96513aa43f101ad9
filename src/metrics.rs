//! Request metrics and statistics tracking for the screening service.

use crate::error::ScreenError;
use crate::types::verdict::Outcome;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;
use std::time::{Duration, Instant};
use tracing::info;

/// Process-wide counters, shared read-mostly across request handlers
pub struct ScreenerMetrics {
    /// Total prediction requests received
    pub requests: AtomicU64,
    /// Requests that produced a verdict
    pub verdicts: AtomicU64,
    /// Verdicts with the positive label
    positive_verdicts: AtomicU64,
    /// Requests rejected by the normalizer
    validation_failures: AtomicU64,
    /// Requests where the ensemble failed to vote
    prediction_failures: AtomicU64,
    /// Other per-request failures (empty ensemble)
    other_failures: AtomicU64,
    /// Request handling times (in microseconds)
    processing_times: RwLock<Vec<u64>>,
    /// Start time for rate calculation
    start_time: Instant,
}

impl ScreenerMetrics {
    pub fn new() -> Self {
        Self {
            requests: AtomicU64::new(0),
            verdicts: AtomicU64::new(0),
            positive_verdicts: AtomicU64::new(0),
            validation_failures: AtomicU64::new(0),
            prediction_failures: AtomicU64::new(0),
            other_failures: AtomicU64::new(0),
            processing_times: RwLock::new(Vec::with_capacity(1000)),
            start_time: Instant::now(),
        }
    }

    /// Record a request that produced a verdict
    pub fn record_verdict(&self, processing_time: Duration, outcome: Outcome) {
        self.requests.fetch_add(1, Ordering::Relaxed);
        self.verdicts.fetch_add(1, Ordering::Relaxed);
        if outcome == Outcome::Diabetes {
            self.positive_verdicts.fetch_add(1, Ordering::Relaxed);
        }
        self.record_time(processing_time);
    }

    /// Record a request that failed before a verdict
    pub fn record_failure(&self, processing_time: Duration, error: &ScreenError) {
        self.requests.fetch_add(1, Ordering::Relaxed);
        let counter = match error {
            ScreenError::Validation { .. } => &self.validation_failures,
            ScreenError::Prediction { .. } => &self.prediction_failures,
            _ => &self.other_failures,
        };
        counter.fetch_add(1, Ordering::Relaxed);
        self.record_time(processing_time);
    }

    fn record_time(&self, processing_time: Duration) {
        if let Ok(mut times) = self.processing_times.write() {
            times.push(processing_time.as_micros() as u64);
            // Keep only the last 10000 for memory efficiency
            if times.len() > 10000 {
                times.drain(0..5000);
            }
        }
    }

    /// Get processing time statistics
    pub fn get_processing_stats(&self) -> ProcessingStats {
        let times = self.processing_times.read().unwrap();
        if times.is_empty() {
            return ProcessingStats::default();
        }

        let mut sorted: Vec<u64> = times.clone();
        sorted.sort();

        let sum: u64 = sorted.iter().sum();
        let count = sorted.len();

        ProcessingStats {
            count: count as u64,
            mean_us: sum / count as u64,
            p50_us: sorted[count / 2],
            p95_us: sorted[(count as f64 * 0.95) as usize],
            p99_us: sorted[(count as f64 * 0.99) as usize],
            max_us: *sorted.last().unwrap_or(&0),
        }
    }

    /// Get current throughput (requests per second)
    pub fn get_throughput(&self) -> f64 {
        let elapsed = self.start_time.elapsed().as_secs_f64();
        if elapsed > 0.0 {
            self.requests.load(Ordering::Relaxed) as f64 / elapsed
        } else {
            0.0
        }
    }

    /// Fraction of verdicts that were positive
    pub fn get_positive_rate(&self) -> f64 {
        let verdicts = self.verdicts.load(Ordering::Relaxed);
        if verdicts > 0 {
            self.positive_verdicts.load(Ordering::Relaxed) as f64 / verdicts as f64
        } else {
            0.0
        }
    }

    /// Log summary statistics
    pub fn print_summary(&self) {
        let requests = self.requests.load(Ordering::Relaxed);
        let verdicts = self.verdicts.load(Ordering::Relaxed);
        let processing = self.get_processing_stats();

        info!(
            requests,
            verdicts,
            positive_rate = format!("{:.1}%", self.get_positive_rate() * 100.0),
            throughput = format!("{:.2} req/s", self.get_throughput()),
            "Screening summary"
        );
        info!(
            validation_failures = self.validation_failures.load(Ordering::Relaxed),
            prediction_failures = self.prediction_failures.load(Ordering::Relaxed),
            other_failures = self.other_failures.load(Ordering::Relaxed),
            "Failure counts"
        );
        info!(
            mean_us = processing.mean_us,
            p50_us = processing.p50_us,
            p95_us = processing.p95_us,
            p99_us = processing.p99_us,
            "Processing time"
        );
    }
}

impl Default for ScreenerMetrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Processing time statistics
#[derive(Debug, Default)]
pub struct ProcessingStats {
    pub count: u64,
    pub mean_us: u64,
    pub p50_us: u64,
    pub p95_us: u64,
    pub p99_us: u64,
    pub max_us: u64,
}

/// Periodic reporter that logs a summary on an interval
pub struct MetricsReporter {
    metrics: std::sync::Arc<ScreenerMetrics>,
    interval_secs: u64,
}

impl MetricsReporter {
    pub fn new(metrics: std::sync::Arc<ScreenerMetrics>, interval_secs: u64) -> Self {
        Self {
            metrics,
            interval_secs,
        }
    }

    /// Start the periodic reporting task
    pub async fn start(self) {
        let mut interval = tokio::time::interval(Duration::from_secs(self.interval_secs));
        loop {
            interval.tick().await;
            self.metrics.print_summary();
        }
    }
}
