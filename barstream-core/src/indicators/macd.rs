//! MACD: Moving Average Convergence/Divergence.
//!
//! macd = EMA(fast) - EMA(slow)
//! signal = EMA(signal) of the macd line
//! histogram = macd - signal
//! Lookback: slow + signal - 1. The line exists earlier but is only
//! published once the signal line is seeded.

use crate::access::{InputSlot, ValueAccess, CLOSE_SLOT};
use crate::error::IndicatorError;
use crate::indicator::{FlatOutput, StreamingIndicator};
use crate::params::{MacdParams, ParameterSet};
use crate::window::ExpSmoother;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MacdOutput {
    pub macd: f64,
    pub signal: f64,
    pub histogram: f64,
}

impl FlatOutput for MacdOutput {
    fn warming() -> Self {
        Self {
            macd: f64::NAN,
            signal: f64::NAN,
            histogram: f64::NAN,
        }
    }

    fn fields(&self) -> Vec<(&'static str, f64)> {
        vec![
            ("macd", self.macd),
            ("signal", self.signal),
            ("histogram", self.histogram),
        ]
    }
}

#[derive(Debug, Clone)]
pub struct Macd {
    params: MacdParams,
    name: String,
    fast: ExpSmoother,
    slow: ExpSmoother,
    signal: ExpSmoother,
    bars: usize,
    value: MacdOutput,
}

impl Macd {
    pub fn new(params: MacdParams) -> Result<Self, IndicatorError> {
        params.validate()?;
        Ok(Self {
            params,
            name: format!(
                "macd_{}_{}_{}",
                params.fast_period, params.slow_period, params.signal_period
            ),
            fast: ExpSmoother::ema(params.fast_period),
            slow: ExpSmoother::ema(params.slow_period),
            signal: ExpSmoother::ema(params.signal_period),
            bars: 0,
            value: MacdOutput::warming(),
        })
    }
}

impl StreamingIndicator for Macd {
    type Output = MacdOutput;

    fn name(&self) -> &str {
        &self.name
    }

    fn input_slot(&self) -> InputSlot {
        CLOSE_SLOT
    }

    fn lookback(&self) -> usize {
        self.params.slow_period + self.params.signal_period - 1
    }

    fn bars_seen(&self) -> usize {
        self.bars
    }

    fn value(&self) -> MacdOutput {
        self.value
    }

    fn on_bar<B: ValueAccess + ?Sized>(&mut self, bar: &B) -> Result<MacdOutput, IndicatorError> {
        let close = CLOSE_SLOT.primary(bar)?;
        self.bars += 1;
        let fast = self.fast.update(close);
        let slow = self.slow.update(close);
        if let (Some(fast), Some(slow)) = (fast, slow) {
            let line = fast - slow;
            if let Some(signal) = self.signal.update(line) {
                if self.bars >= self.lookback() {
                    self.value = MacdOutput {
                        macd: line,
                        signal,
                        histogram: line - signal,
                    };
                }
            }
        }
        Ok(self.value)
    }

    fn clear(&mut self) {
        self.fast.clear();
        self.slow.clear();
        self.signal.clear();
        self.bars = 0;
        self.value = MacdOutput::warming();
    }
}
