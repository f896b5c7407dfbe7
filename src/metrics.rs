//! Throughput and outcome statistics for a scoring run.

use crate::types::Decision;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;
use std::time::{Duration, Instant};
use tracing::info;

/// Metrics collector for the scoring pipeline
pub struct PipelineMetrics {
    /// Records successfully classified
    pub records_processed: AtomicU64,
    /// Records with a positive VIP verdict
    pub vip_verdicts: AtomicU64,
    /// Records rejected by input validation
    pub records_rejected: AtomicU64,
    /// Processing times (in microseconds)
    processing_times: RwLock<Vec<u64>>,
    /// Decisions per cluster
    cluster_counts: RwLock<HashMap<usize, u64>>,
    /// P(VIP) distribution buckets (10% wide)
    score_buckets: RwLock<[u64; 10]>,
    /// Start time for rate calculation
    start_time: Instant,
}

impl PipelineMetrics {
    pub fn new() -> Self {
        Self {
            records_processed: AtomicU64::new(0),
            vip_verdicts: AtomicU64::new(0),
            records_rejected: AtomicU64::new(0),
            processing_times: RwLock::new(Vec::with_capacity(1000)),
            cluster_counts: RwLock::new(HashMap::new()),
            score_buckets: RwLock::new([0; 10]),
            start_time: Instant::now(),
        }
    }

    /// Record a classified record and its decision.
    pub fn record_decision(&self, processing_time: Duration, decision: &Decision) {
        self.records_processed.fetch_add(1, Ordering::Relaxed);
        if decision.vip_verdict {
            self.vip_verdicts.fetch_add(1, Ordering::Relaxed);
        }

        if let Ok(mut times) = self.processing_times.write() {
            times.push(processing_time.as_micros() as u64);
            // Keep only the most recent window for memory efficiency
            if times.len() > 10000 {
                times.drain(0..5000);
            }
        }

        let p_vip = decision.primary_probabilities[1];
        let bucket = ((p_vip / 10.0).min(9.0).max(0.0)) as usize;
        if let Ok(mut buckets) = self.score_buckets.write() {
            buckets[bucket] += 1;
        }

        if let Ok(mut clusters) = self.cluster_counts.write() {
            *clusters.entry(decision.cluster_id).or_insert(0) += 1;
        }
    }

    /// Record a record rejected by validation.
    pub fn record_rejected(&self) {
        self.records_rejected.fetch_add(1, Ordering::Relaxed);
    }

    /// Get processing time statistics
    pub fn processing_stats(&self) -> ProcessingStats {
        let times = match self.processing_times.read() {
            Ok(times) => times,
            Err(_) => return ProcessingStats::default(),
        };
        if times.is_empty() {
            return ProcessingStats::default();
        }

        let mut sorted: Vec<u64> = times.clone();
        sorted.sort_unstable();

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

    /// Fraction of classified records judged VIP, in percent.
    pub fn vip_rate(&self) -> f64 {
        let processed = self.records_processed.load(Ordering::Relaxed);
        if processed == 0 {
            return 0.0;
        }
        self.vip_verdicts.load(Ordering::Relaxed) as f64 / processed as f64 * 100.0
    }

    /// Get current throughput (records per second)
    pub fn throughput(&self) -> f64 {
        let elapsed = self.start_time.elapsed().as_secs_f64();
        if elapsed > 0.0 {
            self.records_processed.load(Ordering::Relaxed) as f64 / elapsed
        } else {
            0.0
        }
    }

    /// Decisions per cluster, sorted by cluster id.
    pub fn cluster_distribution(&self) -> Vec<(usize, u64)> {
        let mut distribution: Vec<(usize, u64)> = self
            .cluster_counts
            .read()
            .map(|clusters| clusters.iter().map(|(&id, &count)| (id, count)).collect())
            .unwrap_or_default();
        distribution.sort_unstable_by_key(|&(id, _)| id);
        distribution
    }

    /// P(VIP) distribution across 10% buckets.
    pub fn score_distribution(&self) -> [u64; 10] {
        self.score_buckets.read().map(|buckets| *buckets).unwrap_or([0; 10])
    }

    /// Print summary statistics
    pub fn print_summary(&self) {
        let processed = self.records_processed.load(Ordering::Relaxed);
        let rejected = self.records_rejected.load(Ordering::Relaxed);
        let stats = self.processing_stats();

        info!(
            records_processed = processed,
            records_rejected = rejected,
            vip_rate_pct = format!("{:.1}", self.vip_rate()),
            throughput = format!("{:.1} rec/s", self.throughput()),
            "Scoring run summary"
        );
        info!(
            mean_us = stats.mean_us,
            p50_us = stats.p50_us,
            p95_us = stats.p95_us,
            p99_us = stats.p99_us,
            max_us = stats.max_us,
            "Processing times"
        );

        for (cluster, count) in self.cluster_distribution() {
            let pct = if processed > 0 {
                count as f64 / processed as f64 * 100.0
            } else {
                0.0
            };
            info!(cluster, count, pct = format!("{pct:.1}"), "Cluster share");
        }
    }
}

impl Default for PipelineMetrics {
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
