//! CCI: Commodity Channel Index.
//!
//! TP = (high + low + close) / 3
//! CCI = (TP - SMA(TP)) / (0.015 * mean absolute deviation of TP)
//! A zero deviation (flat window) gives 0.
//! Lookback: period.

use crate::access::{InputSlot, PriceSource, ValueAccess, HLC_SLOT};
use crate::error::IndicatorError;
use crate::indicator::{StreamingIndicator, WarmupState};
use crate::params::{ParameterSet, WindowParams};
use crate::window::{WindowStrategy, WindowedAggregate};

/// Lambert's scaling constant.
pub const CCI_CONSTANT: f64 = 0.015;

#[derive(Debug, Clone)]
pub struct Cci {
    params: WindowParams,
    name: String,
    typical: WindowedAggregate,
    warmup: WarmupState,
    value: f64,
}

impl Cci {
    pub fn new(params: WindowParams) -> Result<Self, IndicatorError> {
        params.validate()?;
        let strategy = params.hint.resolve(params.period);
        Ok(Self {
            params,
            name: format!("cci_{}", params.period),
            typical: WindowedAggregate::with_strategy(params.period, strategy),
            warmup: WarmupState::new(params.period),
            value: f64::NAN,
        })
    }

    pub fn with_period(period: usize) -> Result<Self, IndicatorError> {
        Self::new(WindowParams::new(period))
    }

    pub fn strategy(&self) -> WindowStrategy {
        self.typical.strategy()
    }
}

impl StreamingIndicator for Cci {
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
        self.warmup.bars_processed()
    }

    fn value(&self) -> f64 {
        self.value
    }

    fn on_bar<B: ValueAccess + ?Sized>(&mut self, bar: &B) -> Result<f64, IndicatorError> {
        HLC_SLOT.check(bar)?;
        let tp = PriceSource::Hlc3.read(bar).unwrap_or(f64::NAN);
        self.typical.push(tp);
        self.warmup.process_bar();
        if !self.warmup.is_warm() {
            return Ok(f64::NAN);
        }

        let mean = self.typical.mean();
        let mad = self.typical.mean_abs_deviation();
        self.value = if mean.is_nan() || mad.is_nan() {
            f64::NAN
        } else if mad == 0.0 {
            0.0
        } else {
            (tp - mean) / (CCI_CONSTANT * mad)
        };
        Ok(self.value)
    }

    fn clear(&mut self) {
        self.typical.clear();
        self.warmup.reset();
        self.value = f64::NAN;
    }
}
