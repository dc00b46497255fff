//! Streaming indicator implementations.
//!
//! Every indicator implements [`StreamingIndicator`](crate::indicator::StreamingIndicator):
//! one bar in, one output out, state bounded by its parameters. These are the
//! consumers of the window primitives and the building blocks of the
//! Lorentzian feature extractor.
//!
//! Multi-output indicators (MACD, Bollinger) return a flat composite result.

pub mod adx;
pub mod atr;
pub mod bollinger;
pub mod cci;
pub mod ema;
pub mod macd;
pub mod rsi;
pub mod sma;

pub use adx::Adx;
pub use atr::{true_range, Atr};
pub use bollinger::{Bollinger, BollingerOutput};
pub use cci::Cci;
pub use ema::Ema;
pub use macd::{Macd, MacdOutput};
pub use rsi::{Rsi, RsiZone};
pub use sma::Sma;

/// Create synthetic bars from close prices for testing.
///
/// Generates plausible OHLV: open = prev_close (or close for first bar),
/// high = max(open,close) + 1.0, low = min(open,close) - 1.0, volume = 1000.
#[cfg(test)]
pub fn make_bars(closes: &[f64]) -> Vec<crate::domain::Bar> {
    use crate::domain::Bar;
    let base_date = chrono::NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| {
            let open = if i == 0 { close } else { closes[i - 1] };
            let high = open.max(close) + 1.0;
            let low = open.min(close) - 1.0;
            Bar {
                symbol: "TEST".to_string(),
                date: base_date + chrono::Duration::days(i as i64),
                open,
                high,
                low,
                close,
                volume: 1000,
            }
        })
        .collect()
}

/// Assert two f64 values are approximately equal (within epsilon).
#[cfg(test)]
pub fn assert_approx(actual: f64, expected: f64, epsilon: f64) {
    assert!(
        (actual - expected).abs() < epsilon,
        "assert_approx failed: actual={actual}, expected={expected}, diff={}, epsilon={epsilon}",
        (actual - expected).abs()
    );
}

/// Default epsilon for indicator tests.
#[cfg(test)]
pub const DEFAULT_EPSILON: f64 = 1e-10;
