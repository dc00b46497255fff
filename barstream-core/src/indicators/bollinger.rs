//! Bollinger Bands.
//!
//! Middle = SMA(close, period), upper/lower = middle ± mult * population stddev.
//! Lookback: period.

use crate::access::{InputSlot, ValueAccess, CLOSE_SLOT};
use crate::error::IndicatorError;
use crate::indicator::{FlatOutput, StreamingIndicator, WarmupState};
use crate::params::{BollingerParams, ParameterSet};
use crate::window::{WindowStrategy, WindowedAggregate};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BollingerOutput {
    pub upper: f64,
    pub middle: f64,
    pub lower: f64,
}

impl BollingerOutput {
    /// upper - lower.
    pub fn width(&self) -> f64 {
        self.upper - self.lower
    }
}

impl FlatOutput for BollingerOutput {
    fn warming() -> Self {
        Self {
            upper: f64::NAN,
            middle: f64::NAN,
            lower: f64::NAN,
        }
    }

    fn fields(&self) -> Vec<(&'static str, f64)> {
        vec![
            ("upper", self.upper),
            ("middle", self.middle),
            ("lower", self.lower),
        ]
    }
}

#[derive(Debug, Clone)]
pub struct Bollinger {
    params: BollingerParams,
    name: String,
    window: WindowedAggregate,
    warmup: WarmupState,
    value: BollingerOutput,
}

impl Bollinger {
    pub fn new(params: BollingerParams) -> Result<Self, IndicatorError> {
        params.validate()?;
        let strategy = params.hint.resolve(params.period);
        Ok(Self {
            params,
            name: format!("bollinger_{}_{}", params.period, params.std_dev_mult),
            window: WindowedAggregate::with_strategy(params.period, strategy),
            warmup: WarmupState::new(params.period),
            value: BollingerOutput::warming(),
        })
    }

    pub fn strategy(&self) -> WindowStrategy {
        self.window.strategy()
    }
}

impl StreamingIndicator for Bollinger {
    type Output = BollingerOutput;

    fn name(&self) -> &str {
        &self.name
    }

    fn input_slot(&self) -> InputSlot {
        CLOSE_SLOT
    }

    fn lookback(&self) -> usize {
        self.params.period
    }

    fn bars_seen(&self) -> usize {
        self.warmup.bars_processed()
    }

    fn value(&self) -> BollingerOutput {
        self.value
    }

    fn on_bar<B: ValueAccess + ?Sized>(
        &mut self,
        bar: &B,
    ) -> Result<BollingerOutput, IndicatorError> {
        let close = CLOSE_SLOT.primary(bar)?;
        self.window.push(close);
        self.warmup.process_bar();
        if self.warmup.is_warm() {
            let middle = self.window.mean();
            let band = self.params.std_dev_mult * self.window.std_dev();
            self.value = BollingerOutput {
                upper: middle + band,
                middle,
                lower: middle - band,
            };
        }
        Ok(self.value)
    }

    fn clear(&mut self) {
        self.window.clear();
        self.warmup.reset();
        self.value = BollingerOutput::warming();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, make_bars, DEFAULT_EPSILON};

    #[test]
    fn bands_known_values() {
        // 2, 4, 4, 4, 5, 5, 7, 9: mean 5, population std 2
        let params = BollingerParams {
            period: 8,
            ..BollingerParams::default()
        };
        let mut bb = Bollinger::new(params).unwrap();
        let out = bb
            .replay(&make_bars(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]))
            .unwrap();
        assert!(out[6].middle.is_nan());
        assert_approx(out[7].middle, 5.0, DEFAULT_EPSILON);
        assert_approx(out[7].upper, 9.0, 1e-9);
        assert_approx(out[7].lower, 1.0, 1e-9);
        assert_approx(out[7].width(), 8.0, 1e-9);
    }

    #[test]
    fn flat_series_collapses_bands() {
        let params = BollingerParams {
            period: 3,
            ..BollingerParams::default()
        };
        let mut bb = Bollinger::new(params).unwrap();
        let out = bb.replay(&[10.0_f64; 5]).unwrap();
        assert_eq!(out[4].upper, 10.0);
        assert_eq!(out[4].lower, 10.0);
    }
}
