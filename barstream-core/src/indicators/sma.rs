//! Simple Moving Average (SMA).
//!
//! Rolling mean of close prices over a lookback window.
//! Lookback: period (first valid output on the period-th bar).
//! The computation strategy (rescan vs. running sum) is resolved from the
//! implementation hint at construction.

use crate::access::{InputSlot, ValueAccess, CLOSE_SLOT};
use crate::error::IndicatorError;
use crate::indicator::{StreamingIndicator, WarmupState};
use crate::params::{ParameterSet, WindowParams};
use crate::window::{WindowStrategy, WindowedAggregate};

#[derive(Debug, Clone)]
pub struct Sma {
    params: WindowParams,
    name: String,
    window: WindowedAggregate,
    warmup: WarmupState,
    value: f64,
}

impl Sma {
    pub fn new(params: WindowParams) -> Result<Self, IndicatorError> {
        params.validate()?;
        let strategy = params.hint.resolve(params.period);
        Ok(Self {
            params,
            name: format!("sma_{}", params.period),
            window: WindowedAggregate::with_strategy(params.period, strategy),
            warmup: WarmupState::new(params.period),
            value: f64::NAN,
        })
    }

    pub fn with_period(period: usize) -> Result<Self, IndicatorError> {
        Self::new(WindowParams::new(period))
    }

    pub fn params(&self) -> &WindowParams {
        &self.params
    }

    pub fn strategy(&self) -> WindowStrategy {
        self.window.strategy()
    }
}

impl StreamingIndicator for Sma {
    type Output = f64;

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

    fn value(&self) -> f64 {
        self.value
    }

    fn on_bar<B: ValueAccess + ?Sized>(&mut self, bar: &B) -> Result<f64, IndicatorError> {
        let close = CLOSE_SLOT.primary(bar)?;
        self.window.push(close);
        self.warmup.process_bar();
        self.value = if self.warmup.is_warm() {
            self.window.mean()
        } else {
            f64::NAN
        };
        Ok(self.value)
    }

    fn clear(&mut self) {
        self.window.clear();
        self.warmup.reset();
        self.value = f64::NAN;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, make_bars, DEFAULT_EPSILON};
    use crate::window::ImplementationHint;

    #[test]
    fn sma_5_basic() {
        let bars = make_bars(&[10.0, 11.0, 12.0, 13.0, 14.0, 15.0, 16.0]);
        let mut sma = Sma::with_period(5).unwrap();
        let result = sma.replay(&bars).unwrap();

        assert_eq!(result.len(), 7);
        for (i, v) in result.iter().enumerate().take(4) {
            assert!(v.is_nan(), "expected NaN at index {i}");
        }
        assert_approx(result[4], 12.0, DEFAULT_EPSILON);
        assert_approx(result[5], 13.0, DEFAULT_EPSILON);
        assert_approx(result[6], 14.0, DEFAULT_EPSILON);
    }

    #[test]
    fn readiness_boundary_period_3() {
        let mut sma = Sma::with_period(3).unwrap();
        let mut ready = Vec::new();
        let mut values = Vec::new();
        for v in [1.0_f64, 2.0, 3.0, 4.0, 5.0] {
            values.push(sma.on_bar(&v).unwrap());
            ready.push(sma.is_ready());
        }
        assert_eq!(ready, vec![false, false, true, true, true]);
        assert!(values[0].is_nan() && values[1].is_nan());
        assert_eq!(&values[2..], &[2.0, 3.0, 4.0]);
    }

    #[test]
    fn sma_1_is_close() {
        let mut sma = Sma::with_period(1).unwrap();
        let result = sma.replay(&[100.0_f64, 200.0, 300.0]).unwrap();
        assert_eq!(result, vec![100.0, 200.0, 300.0]);
    }

    #[test]
    fn sma_nan_propagation() {
        let mut bars = make_bars(&[10.0, 11.0, 12.0, 13.0, 14.0, 15.0]);
        bars[2].close = f64::NAN;
        let mut sma = Sma::with_period(3).unwrap();
        let result = sma.replay(&bars).unwrap();
        assert!(result[2].is_nan());
        assert!(result[3].is_nan());
        assert!(result[4].is_nan());
        assert_approx(result[5], 14.0, DEFAULT_EPSILON);
    }

    #[test]
    fn hint_selects_strategy() {
        let rescan = Sma::new(WindowParams::new(50).with_hint(ImplementationHint::Reference)).unwrap();
        assert_eq!(rescan.strategy(), WindowStrategy::Rescan);
        let auto = Sma::with_period(50).unwrap();
        assert_eq!(auto.strategy(), WindowStrategy::Incremental);
    }

    #[test]
    fn zero_period_is_a_config_error() {
        assert!(matches!(
            Sma::with_period(0),
            Err(IndicatorError::Config(_))
        ));
    }

    #[test]
    fn output_length_mismatch_leaves_state_untouched() {
        let mut sma = Sma::with_period(2).unwrap();
        let mut out = vec![0.0; 2];
        let err = sma
            .on_bar_batch(&[1.0_f64, 2.0, 3.0], Some(&mut out[..]))
            .unwrap_err();
        assert_eq!(
            err,
            IndicatorError::ShapeMismatch {
                inputs: 3,
                outputs: 2
            }
        );
        assert_eq!(sma.bars_seen(), 0);
    }
}
