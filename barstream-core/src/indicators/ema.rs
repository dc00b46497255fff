//! Exponential Moving Average (EMA).
//!
//! Recursive: EMA[t] = alpha * close[t] + (1 - alpha) * EMA[t-1]
//! Seed: SMA of the first `period` closes.
//! Lookback: period.

use crate::access::{InputSlot, ValueAccess, CLOSE_SLOT};
use crate::error::IndicatorError;
use crate::indicator::StreamingIndicator;
use crate::params::{ParameterSet, PeriodParams};
use crate::window::ExpSmoother;

#[derive(Debug, Clone)]
pub struct Ema {
    params: PeriodParams,
    name: String,
    smoother: ExpSmoother,
}

impl Ema {
    pub fn new(params: PeriodParams) -> Result<Self, IndicatorError> {
        params.validate()?;
        Ok(Self {
            params,
            name: format!("ema_{}", params.period),
            smoother: ExpSmoother::ema(params.period),
        })
    }

    pub fn with_period(period: usize) -> Result<Self, IndicatorError> {
        Self::new(PeriodParams::new(period))
    }
}

impl StreamingIndicator for Ema {
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
        self.smoother.samples()
    }

    fn value(&self) -> f64 {
        self.smoother.value()
    }

    fn on_bar<B: ValueAccess + ?Sized>(&mut self, bar: &B) -> Result<f64, IndicatorError> {
        let close = CLOSE_SLOT.primary(bar)?;
        Ok(self.smoother.update(close).unwrap_or(f64::NAN))
    }

    fn clear(&mut self) {
        self.smoother.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, make_bars, DEFAULT_EPSILON};

    #[test]
    fn ema_period_1_equals_close() {
        let mut ema = Ema::with_period(1).unwrap();
        let result = ema.replay(&make_bars(&[100.0, 200.0, 300.0])).unwrap();
        assert_approx(result[0], 100.0, DEFAULT_EPSILON);
        assert_approx(result[1], 200.0, DEFAULT_EPSILON);
        assert_approx(result[2], 300.0, DEFAULT_EPSILON);
    }

    #[test]
    fn ema_3_known_values() {
        // alpha = 0.5, seed at index 2 = SMA(10,11,12) = 11
        let mut ema = Ema::with_period(3).unwrap();
        let result = ema.replay(&make_bars(&[10.0, 11.0, 12.0, 13.0, 14.0])).unwrap();
        assert!(result[0].is_nan());
        assert!(result[1].is_nan());
        assert_approx(result[2], 11.0, DEFAULT_EPSILON);
        assert_approx(result[3], 12.0, DEFAULT_EPSILON);
        assert_approx(result[4], 13.0, DEFAULT_EPSILON);
    }

    #[test]
    fn ema_nan_after_seed_propagates() {
        let mut bars = make_bars(&[10.0, 11.0, 12.0, 13.0, 14.0]);
        bars[3].close = f64::NAN;
        let mut ema = Ema::with_period(3).unwrap();
        let result = ema.replay(&bars).unwrap();
        assert_approx(result[2], 11.0, DEFAULT_EPSILON);
        assert!(result[3].is_nan());
        assert!(result[4].is_nan());
    }

    #[test]
    fn ema_lookback() {
        assert_eq!(Ema::with_period(20).unwrap().lookback(), 20);
    }
}
