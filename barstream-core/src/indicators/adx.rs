//! ADX: Average Directional Index (Wilder).
//!
//! Steps, per bar from the second bar on:
//! 1. +DM and -DM from consecutive highs/lows, TR against the previous close
//! 2. Wilder-smooth +DM, -DM and TR (alpha = 1/period)
//! 3. +DI = 100 * smoothed(+DM) / smoothed(TR), -DI likewise
//! 4. DX = 100 * |+DI - -DI| / (+DI + -DI)
//! 5. ADX = Wilder-smoothed DX
//!
//! Zero smoothed TR gives DI = 0; a zero DI sum gives DX = 0.
//! Lookback: 2 * period (period for DI smoothing, then period for ADX smoothing).

use crate::access::{InputSlot, ValueAccess, HLC_SLOT};
use crate::error::IndicatorError;
use crate::indicator::StreamingIndicator;
use crate::indicators::atr::true_range;
use crate::params::{ParameterSet, PeriodParams};
use crate::window::ExpSmoother;

#[derive(Debug, Clone, Copy)]
struct PrevBar {
    high: f64,
    low: f64,
    close: f64,
}

#[derive(Debug, Clone)]
pub struct Adx {
    params: PeriodParams,
    name: String,
    prev: Option<PrevBar>,
    smooth_plus_dm: ExpSmoother,
    smooth_minus_dm: ExpSmoother,
    smooth_tr: ExpSmoother,
    smooth_dx: ExpSmoother,
    plus_di: f64,
    minus_di: f64,
    bars: usize,
}

impl Adx {
    pub fn new(params: PeriodParams) -> Result<Self, IndicatorError> {
        params.validate()?;
        let p = params.period;
        Ok(Self {
            params,
            name: format!("adx_{p}"),
            prev: None,
            smooth_plus_dm: ExpSmoother::wilder(p),
            smooth_minus_dm: ExpSmoother::wilder(p),
            smooth_tr: ExpSmoother::wilder(p),
            smooth_dx: ExpSmoother::wilder(p),
            plus_di: f64::NAN,
            minus_di: f64::NAN,
            bars: 0,
        })
    }

    pub fn with_period(period: usize) -> Result<Self, IndicatorError> {
        Self::new(PeriodParams::new(period))
    }

    /// +DI of the last bar; NaN until `period + 1` bars.
    pub fn plus_di(&self) -> f64 {
        self.plus_di
    }

    /// -DI of the last bar; NaN until `period + 1` bars.
    pub fn minus_di(&self) -> f64 {
        self.minus_di
    }
}

/// (+DM, -DM) between two bars. NaN in any input gives NaN for both.
pub(crate) fn directional_movement(high: f64, low: f64, prev_high: f64, prev_low: f64) -> (f64, f64) {
    if high.is_nan() || low.is_nan() || prev_high.is_nan() || prev_low.is_nan() {
        return (f64::NAN, f64::NAN);
    }
    let up = high - prev_high;
    let down = prev_low - low;
    let plus = if up > down && up > 0.0 { up } else { 0.0 };
    let minus = if down > up && down > 0.0 { down } else { 0.0 };
    (plus, minus)
}

/// (+DI, -DI, DX) from smoothed +DM, -DM and TR.
pub(crate) fn directional_index(s_plus: f64, s_minus: f64, s_tr: f64) -> (f64, f64, f64) {
    if s_plus.is_nan() || s_minus.is_nan() || s_tr.is_nan() {
        return (f64::NAN, f64::NAN, f64::NAN);
    }
    let (plus_di, minus_di) = if s_tr == 0.0 {
        (0.0, 0.0)
    } else {
        (100.0 * s_plus / s_tr, 100.0 * s_minus / s_tr)
    };
    let di_sum = plus_di + minus_di;
    let dx = if di_sum == 0.0 {
        0.0
    } else {
        100.0 * (plus_di - minus_di).abs() / di_sum
    };
    (plus_di, minus_di, dx)
}

impl StreamingIndicator for Adx {
    type Output = f64;

    fn name(&self) -> &str {
        &self.name
    }

    fn input_slot(&self) -> InputSlot {
        HLC_SLOT
    }

    fn lookback(&self) -> usize {
        2 * self.params.period
    }

    fn bars_seen(&self) -> usize {
        self.bars
    }

    fn value(&self) -> f64 {
        self.smooth_dx.value()
    }

    fn on_bar<B: ValueAccess + ?Sized>(&mut self, bar: &B) -> Result<f64, IndicatorError> {
        let [high, low, close]: [f64; 3] = HLC_SLOT.read(bar)?;
        self.bars += 1;
        let prev = self.prev.replace(PrevBar { high, low, close });
        let Some(prev) = prev else {
            return Ok(f64::NAN);
        };

        let (plus_dm, minus_dm) = directional_movement(high, low, prev.high, prev.low);
        let tr = true_range(high, low, Some(prev.close));
        let s_plus = self.smooth_plus_dm.update(plus_dm);
        let s_minus = self.smooth_minus_dm.update(minus_dm);
        let s_tr = self.smooth_tr.update(tr);

        if let (Some(p), Some(m), Some(t)) = (s_plus, s_minus, s_tr) {
            let (plus_di, minus_di, dx) = directional_index(p, m, t);
            self.plus_di = plus_di;
            self.minus_di = minus_di;
            if let Some(adx) = self.smooth_dx.update(dx) {
                return Ok(adx);
            }
        }
        Ok(f64::NAN)
    }

    fn clear(&mut self) {
        self.prev = None;
        self.smooth_plus_dm.clear();
        self.smooth_minus_dm.clear();
        self.smooth_tr.clear();
        self.smooth_dx.clear();
        self.plus_di = f64::NAN;
        self.minus_di = f64::NAN;
        self.bars = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Ohlc;

    fn make_ohlc(data: &[(f64, f64, f64, f64)]) -> Vec<Ohlc> {
        data.iter()
            .map(|&(open, high, low, close)| Ohlc {
                open,
                high,
                low,
                close,
            })
            .collect()
    }

    #[test]
    fn adx_bounds() {
        let bars = make_ohlc(&[
            (100.0, 105.0, 95.0, 102.0),
            (102.0, 108.0, 100.0, 106.0),
            (106.0, 107.0, 98.0, 99.0),
            (99.0, 103.0, 97.0, 101.0),
            (101.0, 106.0, 100.0, 105.0),
            (105.0, 110.0, 103.0, 108.0),
            (108.0, 112.0, 106.0, 110.0),
            (110.0, 111.0, 104.0, 105.0),
            (105.0, 109.0, 103.0, 107.0),
            (107.0, 113.0, 105.0, 112.0),
        ]);
        let mut adx = Adx::with_period(3).unwrap();
        let result = adx.replay(&bars).unwrap();

        assert!(result[..5].iter().all(|v| v.is_nan()));
        for (i, &v) in result.iter().enumerate().skip(5) {
            assert!((0.0..=100.0).contains(&v), "ADX out of bounds at bar {i}: {v}");
        }
    }

    #[test]
    fn adx_strong_trend_higher() {
        let data: Vec<_> = (0..20)
            .map(|i| {
                let base = 100.0 + i as f64 * 5.0;
                (base - 1.0, base + 3.0, base - 3.0, base + 2.0)
            })
            .collect();
        let mut adx = Adx::with_period(5).unwrap();
        let result = adx.replay(&make_ohlc(&data)).unwrap();
        let last = *result.last().unwrap();
        assert!(last > 10.0, "ADX should be elevated in strong trend, got {last}");
        assert!(adx.plus_di() > adx.minus_di());
    }

    #[test]
    fn flat_market_is_zero_not_nan() {
        let bars = vec![100.0_f64; 10];
        let mut adx = Adx::with_period(2).unwrap();
        let result = adx.replay(&bars).unwrap();
        assert_eq!(result[3], 0.0);
        assert_eq!(adx.plus_di(), 0.0);
    }

    #[test]
    fn adx_lookback() {
        assert_eq!(Adx::with_period(14).unwrap().lookback(), 28);
        assert_eq!(Adx::with_period(7).unwrap().lookback(), 14);
    }

    #[test]
    fn adx_too_few_bars() {
        let mut adx = Adx::with_period(3).unwrap();
        let result = adx.replay(&make_ohlc(&[(100.0, 105.0, 95.0, 102.0)])).unwrap();
        assert!(result.iter().all(|v| v.is_nan()));
        assert!(!adx.is_ready());
    }
}
