//! WindowedAggregate: rolling sum, mean, variance, min and max over the last
//! N samples.
//!
//! NaN policy: a NaN sample occupies a window slot. While any NaN is inside
//! the window, `sum`, `mean` and `variance` are NaN; `min` and `max` ignore NaN
//! samples. Once the NaN is evicted the statistics recover.
//!
//! The incremental strategy keeps sums relative to a shift value (the
//! shifted-data variance algorithm) and re-derives them from the ring contents
//! once every `capacity` evictions, which bounds floating-point drift at O(1)
//! amortized cost.

use super::extrema::{Extremum, RollingExtremum};
use super::ring::RingBuffer;
use super::strategy::WindowStrategy;

#[derive(Debug, Clone)]
pub struct WindowedAggregate {
    strategy: WindowStrategy,
    values: RingBuffer<f64>,
    shift: f64,
    shifted_sum: f64,
    shifted_sum_sq: f64,
    finite: usize,
    evictions_since_resync: usize,
    min: RollingExtremum,
    max: RollingExtremum,
}

impl WindowedAggregate {
    pub fn new(capacity: usize) -> Self {
        Self::with_strategy(capacity, WindowStrategy::Incremental)
    }

    pub fn with_strategy(capacity: usize, strategy: WindowStrategy) -> Self {
        assert!(capacity >= 1, "window capacity must be >= 1");
        Self {
            strategy,
            values: RingBuffer::new(capacity),
            shift: f64::NAN,
            shifted_sum: 0.0,
            shifted_sum_sq: 0.0,
            finite: 0,
            evictions_since_resync: 0,
            min: RollingExtremum::new(Extremum::Min, capacity),
            max: RollingExtremum::new(Extremum::Max, capacity),
        }
    }

    pub fn strategy(&self) -> WindowStrategy {
        self.strategy
    }

    pub fn capacity(&self) -> usize {
        self.values.capacity()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.values.is_full()
    }

    /// Push a sample, returning the evicted oldest sample once the window is full.
    pub fn push(&mut self, value: f64) -> Option<f64> {
        let evicted = self.values.push(value);
        if self.strategy == WindowStrategy::Rescan {
            return evicted;
        }

        if let Some(old) = evicted {
            if old.is_finite() {
                let d = old - self.shift;
                self.shifted_sum -= d;
                self.shifted_sum_sq -= d * d;
                self.finite -= 1;
            }
            self.evictions_since_resync += 1;
        }

        if value.is_finite() {
            if self.shift.is_nan() {
                self.shift = value;
            }
            let d = value - self.shift;
            self.shifted_sum += d;
            self.shifted_sum_sq += d * d;
            self.finite += 1;
        }

        self.min.push(value);
        self.max.push(value);

        if self.evictions_since_resync >= self.capacity() {
            self.resync();
        }
        evicted
    }

    fn resync(&mut self) {
        self.evictions_since_resync = 0;
        self.shift = self
            .values
            .iter()
            .copied()
            .find(|v| v.is_finite())
            .unwrap_or(f64::NAN);
        self.shifted_sum = 0.0;
        self.shifted_sum_sq = 0.0;
        self.finite = 0;
        for &v in self.values.iter() {
            if v.is_finite() {
                let d = v - self.shift;
                self.shifted_sum += d;
                self.shifted_sum_sq += d * d;
                self.finite += 1;
            }
        }
    }

    fn has_nan(&self) -> bool {
        match self.strategy {
            WindowStrategy::Incremental => self.finite < self.values.len(),
            WindowStrategy::Rescan => self.values.iter().any(|v| !v.is_finite()),
        }
    }

    /// Sum of the window; 0.0 when empty.
    pub fn sum(&self) -> f64 {
        if self.has_nan() {
            return f64::NAN;
        }
        match self.strategy {
            WindowStrategy::Incremental if self.finite == 0 => 0.0,
            WindowStrategy::Incremental => self.shifted_sum + self.finite as f64 * self.shift,
            WindowStrategy::Rescan => self.values.iter().sum(),
        }
    }

    /// Arithmetic mean; NaN when empty.
    pub fn mean(&self) -> f64 {
        let n = self.values.len();
        if n == 0 || self.has_nan() {
            return f64::NAN;
        }
        match self.strategy {
            WindowStrategy::Incremental => self.shift + self.shifted_sum / n as f64,
            WindowStrategy::Rescan => self.values.iter().sum::<f64>() / n as f64,
        }
    }

    /// Population variance; NaN when empty, never negative.
    pub fn variance(&self) -> f64 {
        let n = self.values.len();
        if n == 0 || self.has_nan() {
            return f64::NAN;
        }
        let nf = n as f64;
        let var = match self.strategy {
            WindowStrategy::Incremental => {
                let m = self.shifted_sum / nf;
                self.shifted_sum_sq / nf - m * m
            }
            WindowStrategy::Rescan => {
                let mean = self.mean();
                self.values.iter().map(|v| (v - mean) * (v - mean)).sum::<f64>() / nf
            }
        };
        var.max(0.0)
    }

    pub fn std_dev(&self) -> f64 {
        self.variance().sqrt()
    }

    /// Mean absolute deviation from the window mean. Always O(len).
    pub fn mean_abs_deviation(&self) -> f64 {
        let mean = self.mean();
        if mean.is_nan() {
            return f64::NAN;
        }
        self.values.iter().map(|v| (v - mean).abs()).sum::<f64>() / self.values.len() as f64
    }

    /// Smallest finite sample in the window; NaN if none.
    pub fn min(&self) -> f64 {
        match self.strategy {
            WindowStrategy::Incremental => self.min.value(),
            WindowStrategy::Rescan => self.fold_finite(f64::min),
        }
    }

    /// Largest finite sample in the window; NaN if none.
    pub fn max(&self) -> f64 {
        match self.strategy {
            WindowStrategy::Incremental => self.max.value(),
            WindowStrategy::Rescan => self.fold_finite(f64::max),
        }
    }

    /// max - min; 0.0 for a flat window, NaN if empty.
    pub fn range(&self) -> f64 {
        self.max() - self.min()
    }

    fn fold_finite(&self, f: fn(f64, f64) -> f64) -> f64 {
        self.values
            .iter()
            .copied()
            .filter(|v| !v.is_nan())
            .reduce(f)
            .unwrap_or(f64::NAN)
    }

    pub fn newest(&self) -> Option<f64> {
        self.values.newest().copied()
    }

    pub fn oldest(&self) -> Option<f64> {
        self.values.oldest().copied()
    }

    /// Iterate the window oldest → newest.
    pub fn iter(&self) -> impl Iterator<Item = f64> + '_ {
        self.values.iter().copied()
    }

    pub fn clear(&mut self) {
        self.values.clear();
        self.shift = f64::NAN;
        self.shifted_sum = 0.0;
        self.shifted_sum_sq = 0.0;
        self.finite = 0;
        self.evictions_since_resync = 0;
        self.min.clear();
        self.max.clear();
    }
}
