//! ATR: Average True Range (Wilder).
//!
//! TR = max(high - low, |high - prev_close|, |low - prev_close|); the first
//! bar has no previous close and uses high - low.
//! ATR = Wilder-smoothed TR.
//! Lookback: period.

use crate::access::{InputSlot, ValueAccess, HLC_SLOT};
use crate::error::IndicatorError;
use crate::indicator::StreamingIndicator;
use crate::params::{ParameterSet, PeriodParams};
use crate::window::ExpSmoother;

/// True range of one bar given the previous close, if any.
///
/// NaN in any input yields NaN.
pub fn true_range(high: f64, low: f64, prev_close: Option<f64>) -> f64 {
    if high.is_nan() || low.is_nan() || prev_close.is_some_and(f64::is_nan) {
        return f64::NAN;
    }
    match prev_close {
        Some(pc) => (high - low).max((high - pc).abs()).max((low - pc).abs()),
        None => high - low,
    }
}

#[derive(Debug, Clone)]
pub struct Atr {
    params: PeriodParams,
    name: String,
    prev_close: Option<f64>,
    smoother: ExpSmoother,
}

impl Atr {
    pub fn new(params: PeriodParams) -> Result<Self, IndicatorError> {
        params.validate()?;
        Ok(Self {
            params,
            name: format!("atr_{}", params.period),
            prev_close: None,
            smoother: ExpSmoother::wilder(params.period),
        })
    }

    pub fn with_period(period: usize) -> Result<Self, IndicatorError> {
        Self::new(PeriodParams::new(period))
    }
}

impl StreamingIndicator for Atr {
    type Output = f64;

    fn name(&self) -> &str {
        &self.name
    }

    fn input_slot(&self) -> InputSlot {
        HLC_SLOT
    }

    fn lookback(&self) -> usize {
        self.params.period
    }

    fn bars_seen(&self) -> usize {
        self.smoother.samples()
    }

    fn value(&self) -> f64 {
        self.smoother.value()
    }

    fn on_bar<B: ValueAccess + ?Sized>(&mut self, bar: &B) -> Result<f64, IndicatorError> {
        let [high, low, close]: [f64; 3] = HLC_SLOT.read(bar)?;
        let tr = true_range(high, low, self.prev_close.replace(close));
        Ok(self.smoother.update(tr).unwrap_or(f64::NAN))
    }

    fn clear(&mut self) {
        self.prev_close = None;
        self.smoother.clear();
    }
}
