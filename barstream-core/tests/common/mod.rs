//! Shared fixtures for integration tests.

#![allow(dead_code)]

use barstream_core::domain::Bar;
use chrono::NaiveDate;

/// Generate N bars of synthetic OHLCV data with realistic variation.
///
/// Deterministic pseudo-random walk using a simple LCG; price floored at 10.
pub fn make_test_bars(n: usize) -> Vec<Bar> {
    let base_date = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
    let mut bars = Vec::with_capacity(n);
    let mut price = 100.0_f64;

    for i in 0..n {
        let seed = (i as u64).wrapping_mul(6364136223846793005).wrapping_add(1);
        let change = ((seed >> 33) % 200) as f64 * 0.05 - 5.0;
        price = (price + change).max(10.0);

        let open = price - 0.5;
        let close = price + 0.3;
        let high = open.max(close) + 2.0;
        let low = open.min(close) - 2.0;

        bars.push(Bar {
            symbol: "TEST".to_string(),
            date: base_date + chrono::Duration::days(i as i64),
            open,
            high,
            low,
            close,
            volume: 1000 + (i as u64 * 100),
        });
    }

    bars
}

pub fn closes(bars: &[Bar]) -> Vec<f64> {
    bars.iter().map(|b| b.close).collect()
}
