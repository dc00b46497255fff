//! Reference (batch) indicator implementations.
//!
//! Each function computes a whole series in one pass over a slice, NaN-prefixed
//! to the same lookback as its streaming counterpart. Only the scalar formulas
//! (true range, the RSI ratio) are shared with the streaming indicators;
//! windowed statistics are recomputed from scratch at every index. Used by the
//! conformance suite.

use crate::access::{PriceAspect, ValueAccess};
use crate::indicator::FlatOutput;
use crate::indicators::{BollingerOutput, MacdOutput};
use crate::indicators::true_range as bar_true_range;

/// Column view of a record slice. Missing aspects read as NaN.
#[derive(Debug, Clone, Default)]
pub struct Series {
    pub high: Vec<f64>,
    pub low: Vec<f64>,
    pub close: Vec<f64>,
}

impl Series {
    pub fn from_records<B: ValueAccess>(records: &[B]) -> Self {
        let col = |aspect| {
            records
                .iter()
                .map(|r| r.value(aspect).unwrap_or(f64::NAN))
                .collect::<Vec<_>>()
        };
        Self {
            high: col(PriceAspect::High),
            low: col(PriceAspect::Low),
            close: col(PriceAspect::Close),
        }
    }

    pub fn len(&self) -> usize {
        self.close.len()
    }

    pub fn is_empty(&self) -> bool {
        self.close.is_empty()
    }
}

/// Rolling mean, recomputed over each full window.
pub fn sma(values: &[f64], period: usize) -> Vec<f64> {
    let mut result = vec![f64::NAN; values.len()];
    if period == 0 {
        return result;
    }
    for i in (period - 1)..values.len() {
        let window = &values[i + 1 - period..=i];
        result[i] = window.iter().sum::<f64>() / period as f64;
    }
    result
}

/// Exponential smoothing seeded with the mean of the first `period` values.
/// A NaN anywhere taints the rest of the series.
fn exp_smooth(values: &[f64], period: usize, alpha: f64) -> Vec<f64> {
    let n = values.len();
    let mut result = vec![f64::NAN; n];
    if period == 0 || n < period {
        return result;
    }
    let mut prev = values[..period].iter().sum::<f64>() / period as f64;
    result[period - 1] = prev;
    for i in period..n {
        prev = alpha * values[i] + (1.0 - alpha) * prev;
        result[i] = prev;
    }
    result
}

pub fn ema(values: &[f64], period: usize) -> Vec<f64> {
    exp_smooth(values, period, 2.0 / (period as f64 + 1.0))
}

/// Apply Wilder smoothing to a series. Alpha = 1/period.
pub fn wilder_smooth(values: &[f64], period: usize) -> Vec<f64> {
    exp_smooth(values, period, 1.0 / period as f64)
}

/// RSI over closes; first value at index `period`.
pub fn rsi(closes: &[f64], period: usize) -> Vec<f64> {
    let n = closes.len();
    let mut result = vec![f64::NAN; n];
    if n < 2 {
        return result;
    }
    let (gains, losses): (Vec<f64>, Vec<f64>) = closes
        .windows(2)
        .map(|w| {
            let ch = w[1] - w[0];
            if ch.is_nan() {
                (f64::NAN, f64::NAN)
            } else if ch > 0.0 {
                (ch, 0.0)
            } else {
                (0.0, -ch)
            }
        })
        .unzip();
    let avg_gain = wilder_smooth(&gains, period);
    let avg_loss = wilder_smooth(&losses, period);
    for i in 0..n - 1 {
        result[i + 1] = crate::indicators::rsi::compute_rsi(avg_gain[i], avg_loss[i]);
    }
    result
}

/// True range series. TR[0] = high[0] - low[0].
pub fn true_range(series: &Series) -> Vec<f64> {
    (0..series.len())
        .map(|i| {
            let prev_close = i.checked_sub(1).map(|p| series.close[p]);
            bar_true_range(series.high[i], series.low[i], prev_close)
        })
        .collect()
}

pub fn atr(series: &Series, period: usize) -> Vec<f64> {
    wilder_smooth(&true_range(series), period)
}

/// ADX with +DM, -DM and TR all starting at the second bar.
pub fn adx(series: &Series, period: usize) -> Vec<f64> {
    let n = series.len();
    let mut result = vec![f64::NAN; n];
    if n < 2 || period == 0 {
        return result;
    }

    let mut plus_dm = Vec::with_capacity(n - 1);
    let mut minus_dm = Vec::with_capacity(n - 1);
    let mut tr = Vec::with_capacity(n - 1);
    for i in 1..n {
        let (h, l) = (series.high[i], series.low[i]);
        let (ph, pl) = (series.high[i - 1], series.low[i - 1]);
        if h.is_nan() || l.is_nan() || ph.is_nan() || pl.is_nan() {
            plus_dm.push(f64::NAN);
            minus_dm.push(f64::NAN);
        } else {
            let up = h - ph;
            let down = pl - l;
            plus_dm.push(if up > down && up > 0.0 { up } else { 0.0 });
            minus_dm.push(if down > up && down > 0.0 { down } else { 0.0 });
        }
        tr.push(bar_true_range(h, l, Some(series.close[i - 1])));
    }

    let s_plus = wilder_smooth(&plus_dm, period);
    let s_minus = wilder_smooth(&minus_dm, period);
    let s_tr = wilder_smooth(&tr, period);

    let first_dx = period - 1;
    if s_tr.len() <= first_dx {
        return result;
    }
    let dx: Vec<f64> = (first_dx..s_tr.len())
        .map(|i| {
            if s_tr[i].is_nan() || s_plus[i].is_nan() || s_minus[i].is_nan() {
                return f64::NAN;
            }
            if s_tr[i] == 0.0 {
                return 0.0;
            }
            let plus_di = 100.0 * s_plus[i] / s_tr[i];
            let minus_di = 100.0 * s_minus[i] / s_tr[i];
            let di_sum = plus_di + minus_di;
            if di_sum == 0.0 {
                0.0
            } else {
                100.0 * (plus_di - minus_di).abs() / di_sum
            }
        })
        .collect();

    // dx[j] belongs to bar 1 + first_dx + j.
    for (j, v) in wilder_smooth(&dx, period).into_iter().enumerate() {
        result[1 + first_dx + j] = v;
    }
    result
}

/// CCI over typical price; zero mean deviation gives 0.
pub fn cci(series: &Series, period: usize) -> Vec<f64> {
    let n = series.len();
    let mut result = vec![f64::NAN; n];
    if period == 0 {
        return result;
    }
    let tp: Vec<f64> = (0..n)
        .map(|i| (series.high[i] + series.low[i] + series.close[i]) / 3.0)
        .collect();
    for i in (period - 1)..n {
        let window = &tp[i + 1 - period..=i];
        let mean = window.iter().sum::<f64>() / period as f64;
        let mad = window.iter().map(|v| (v - mean).abs()).sum::<f64>() / period as f64;
        result[i] = if mean.is_nan() {
            f64::NAN
        } else if mad == 0.0 {
            0.0
        } else {
            (tp[i] - mean) / (crate::indicators::cci::CCI_CONSTANT * mad)
        };
    }
    result
}

pub fn macd(closes: &[f64], fast: usize, slow: usize, signal: usize) -> Vec<MacdOutput> {
    let fast_ema = ema(closes, fast);
    let slow_ema = ema(closes, slow);
    let line: Vec<f64> = fast_ema.iter().zip(&slow_ema).map(|(f, s)| f - s).collect();
    let mut signal_line = vec![f64::NAN; closes.len()];
    if slow >= 1 && closes.len() >= slow {
        for (j, v) in ema(&line[slow - 1..], signal).into_iter().enumerate() {
            signal_line[slow - 1 + j] = v;
        }
    }
    let first_valid = (slow + signal).saturating_sub(2);
    line.iter()
        .zip(&signal_line)
        .enumerate()
        .map(|(i, (&m, &s))| {
            if i < first_valid {
                MacdOutput::warming()
            } else {
                MacdOutput {
                    macd: m,
                    signal: s,
                    histogram: m - s,
                }
            }
        })
        .collect()
}

/// Bollinger bands with a two-pass population standard deviation.
pub fn bollinger(closes: &[f64], period: usize, mult: f64) -> Vec<BollingerOutput> {
    let n = closes.len();
    let mut result = vec![
        BollingerOutput {
            upper: f64::NAN,
            middle: f64::NAN,
            lower: f64::NAN,
        };
        n
    ];
    if period == 0 {
        return result;
    }
    for i in (period - 1)..n {
        let window = &closes[i + 1 - period..=i];
        let mean = window.iter().sum::<f64>() / period as f64;
        let var = window.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / period as f64;
        let band = mult * var.sqrt();
        result[i] = BollingerOutput {
            upper: mean + band,
            middle: mean,
            lower: mean - band,
        };
    }
    result
}
