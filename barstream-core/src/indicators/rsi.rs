//! Relative Strength Index (RSI).
//!
//! Uses Wilder smoothing of average gains and average losses.
//! RSI = 100 - 100 / (1 + avg_gain / avg_loss)
//! Lookback: period + 1 (period price changes).
//! Edge cases: avg_loss == 0 → RSI = 100; avg_gain == 0 → RSI = 0;
//! no movement at all → RSI = 50.

use crate::access::{InputSlot, ValueAccess, CLOSE_SLOT};
use crate::error::IndicatorError;
use crate::indicator::{StreamingIndicator, WarmupState};
use crate::params::{ParameterSet, RsiParams};
use crate::window::ExpSmoother;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RsiZone {
    Overbought,
    Oversold,
    Neutral,
}

#[derive(Debug, Clone)]
pub struct Rsi {
    params: RsiParams,
    name: String,
    prev_close: Option<f64>,
    avg_gain: ExpSmoother,
    avg_loss: ExpSmoother,
    warmup: WarmupState,
    value: f64,
}

impl Rsi {
    pub fn new(params: RsiParams) -> Result<Self, IndicatorError> {
        params.validate()?;
        Ok(Self {
            params,
            name: format!("rsi_{}", params.period),
            prev_close: None,
            avg_gain: ExpSmoother::wilder(params.period),
            avg_loss: ExpSmoother::wilder(params.period),
            warmup: WarmupState::new(params.period + 1),
            value: f64::NAN,
        })
    }

    pub fn with_period(period: usize) -> Result<Self, IndicatorError> {
        Self::new(RsiParams::new(period))
    }

    /// Zone of the current value; `None` while warming or NaN.
    ///
    /// Thresholds are inclusive: RSI == overbought is overbought.
    pub fn zone(&self) -> Option<RsiZone> {
        if !self.is_ready() || self.value.is_nan() {
            return None;
        }
        Some(if self.value >= self.params.overbought {
            RsiZone::Overbought
        } else if self.value <= self.params.oversold {
            RsiZone::Oversold
        } else {
            RsiZone::Neutral
        })
    }
}

impl StreamingIndicator for Rsi {
    type Output = f64;

    fn name(&self) -> &str {
        &self.name
    }

    fn input_slot(&self) -> InputSlot {
        CLOSE_SLOT
    }

    fn lookback(&self) -> usize {
        self.params.period + 1
    }

    fn bars_seen(&self) -> usize {
        self.warmup.bars_processed()
    }

    fn value(&self) -> f64 {
        self.value
    }

    fn on_bar<B: ValueAccess + ?Sized>(&mut self, bar: &B) -> Result<f64, IndicatorError> {
        let close = CLOSE_SLOT.primary(bar)?;
        self.warmup.process_bar();

        if let Some(prev) = self.prev_close.replace(close) {
            let change = close - prev;
            // NaN change feeds NaN into both averages.
            let (gain, loss) = if change.is_nan() {
                (f64::NAN, f64::NAN)
            } else {
                (change.max(0.0), (-change).max(0.0))
            };
            let g = self.avg_gain.update(gain);
            let l = self.avg_loss.update(loss);
            if let (Some(g), Some(l)) = (g, l) {
                self.value = compute_rsi(g, l);
            }
        }
        Ok(self.value)
    }

    fn clear(&mut self) {
        self.prev_close = None;
        self.avg_gain.clear();
        self.avg_loss.clear();
        self.warmup.reset();
        self.value = f64::NAN;
    }
}

pub(crate) fn compute_rsi(avg_gain: f64, avg_loss: f64) -> f64 {
    if avg_gain.is_nan() || avg_loss.is_nan() {
        f64::NAN
    } else if avg_loss == 0.0 && avg_gain == 0.0 {
        50.0 // no movement
    } else if avg_loss == 0.0 {
        100.0
    } else if avg_gain == 0.0 {
        0.0
    } else {
        100.0 - 100.0 / (1.0 + avg_gain / avg_loss)
    }
}
