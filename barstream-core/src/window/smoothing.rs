//! Exponential smoothing state (EMA and Wilder).
//!
//! Recursive: S[t] = alpha * x[t] + (1 - alpha) * S[t-1]
//! Seed: S[period-1] = simple mean of the first `period` samples.
//! EMA uses alpha = 2 / (period + 1); Wilder uses alpha = 1 / period.
//! A NaN sample taints every later value until `clear`.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SmoothingKind {
    Ema,
    Wilder,
}

#[derive(Debug, Clone)]
pub struct ExpSmoother {
    period: usize,
    alpha: f64,
    seed_sum: f64,
    count: usize,
    value: f64,
}

impl ExpSmoother {
    pub fn new(kind: SmoothingKind, period: usize) -> Self {
        assert!(period >= 1, "smoothing period must be >= 1");
        let alpha = match kind {
            SmoothingKind::Ema => 2.0 / (period as f64 + 1.0),
            SmoothingKind::Wilder => 1.0 / period as f64,
        };
        Self {
            period,
            alpha,
            seed_sum: 0.0,
            count: 0,
            value: f64::NAN,
        }
    }

    pub fn ema(period: usize) -> Self {
        Self::new(SmoothingKind::Ema, period)
    }

    pub fn wilder(period: usize) -> Self {
        Self::new(SmoothingKind::Wilder, period)
    }

    pub fn period(&self) -> usize {
        self.period
    }

    /// Feed one sample. Returns the smoothed value once seeded.
    pub fn update(&mut self, x: f64) -> Option<f64> {
        self.count += 1;
        if self.count < self.period {
            self.seed_sum += x;
            return None;
        }
        if self.count == self.period {
            self.seed_sum += x;
            self.value = self.seed_sum / self.period as f64;
        } else {
            self.value = self.alpha * x + (1.0 - self.alpha) * self.value;
        }
        Some(self.value)
    }

    pub fn is_ready(&self) -> bool {
        self.count >= self.period
    }

    /// Smoothed value, NaN before seeding.
    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn samples(&self) -> usize {
        self.count
    }

    pub fn clear(&mut self) {
        self.seed_sum = 0.0;
        self.count = 0;
        self.value = f64::NAN;
    }
}
