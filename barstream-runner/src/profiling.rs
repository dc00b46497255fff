//! Latency measurement for streaming updates.
//!
//! `profile_per_bar` times every `on_bar` call individually and summarizes
//! the distribution. The live-use budget is a mean below a caller-chosen
//! limit with the 99th-percentile update at most three times the mean. A
//! single outlier (first call, scheduler preemption) does not fail it.

use barstream_core::access::ValueAccess;
use barstream_core::error::IndicatorError;
use barstream_core::indicator::StreamingIndicator;
use serde::Serialize;
use std::time::{Duration, Instant};
use tracing::debug;

/// Per-bar latency summary.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LatencyStats {
    pub mean: Duration,
    pub max: Duration,
    pub p99: Duration,
    pub bars: usize,
}

impl LatencyStats {
    /// Summarize raw samples. Empty input gives all-zero stats.
    pub fn from_samples(samples: &mut [Duration]) -> Self {
        if samples.is_empty() {
            return Self {
                mean: Duration::ZERO,
                max: Duration::ZERO,
                p99: Duration::ZERO,
                bars: 0,
            };
        }
        samples.sort_unstable();
        let n = samples.len();
        let total: Duration = samples.iter().sum();
        // Nearest-rank percentile.
        let rank = ((n as f64) * 0.99).ceil() as usize;
        Self {
            mean: total / n as u32,
            max: samples[n - 1],
            p99: samples[rank.clamp(1, n) - 1],
            bars: n,
        }
    }

    /// Mean strictly below `mean_limit` and p99 at most 3x the mean.
    pub fn within_budget(&self, mean_limit: Duration) -> bool {
        self.mean < mean_limit && self.p99 <= self.mean * 3
    }
}

/// Feed `bars` through `indicator`, timing each update.
pub fn profile_per_bar<I, B>(indicator: &mut I, bars: &[B]) -> Result<LatencyStats, IndicatorError>
where
    I: StreamingIndicator,
    B: ValueAccess,
{
    let mut samples = Vec::with_capacity(bars.len());
    for bar in bars {
        let start = Instant::now();
        let out = indicator.on_bar(bar)?;
        samples.push(start.elapsed());
        std::hint::black_box(out);
    }
    let stats = LatencyStats::from_samples(&mut samples);
    debug!(
        indicator = indicator.name(),
        bars = stats.bars,
        mean_us = stats.mean.as_secs_f64() * 1e6,
        max_us = stats.max.as_secs_f64() * 1e6,
        "profiled per-bar latency"
    );
    Ok(stats)
}

/// A timing scope that logs its duration at debug level on drop.
pub struct ProfileScope {
    name: &'static str,
    label: String,
    start: Instant,
}

impl ProfileScope {
    pub fn new(name: &'static str, label: impl Into<String>) -> Self {
        Self {
            name,
            label: label.into(),
            start: Instant::now(),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }
}

impl Drop for ProfileScope {
    fn drop(&mut self) {
        debug!(
            scope = self.name,
            label = %self.label,
            ms = self.start.elapsed().as_secs_f64() * 1000.0,
            "scope finished"
        );
    }
}
