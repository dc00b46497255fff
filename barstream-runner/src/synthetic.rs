//! Deterministic synthetic bars.
//!
//! A master seed is expanded into a per-symbol sub-seed via BLAKE3 hashing.
//! Derivation is hash-based, not order-dependent, so the same master seed
//! produces identical series regardless of how many symbols are generated or
//! on which thread.

use barstream_core::domain::Bar;
use chrono::{Datelike, NaiveDate, Weekday};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Master seed plus per-symbol derivation.
#[derive(Debug, Clone, Copy)]
pub struct SeedHierarchy {
    master_seed: u64,
}

impl SeedHierarchy {
    pub fn new(master_seed: u64) -> Self {
        Self { master_seed }
    }

    pub fn master_seed(&self) -> u64 {
        self.master_seed
    }

    /// Derive a deterministic sub-seed for `symbol`.
    pub fn sub_seed(&self, symbol: &str) -> u64 {
        let mut hasher = blake3::Hasher::new();
        hasher.update(&self.master_seed.to_le_bytes());
        hasher.update(symbol.as_bytes());
        let hash = hasher.finalize();
        let mut first = [0u8; 8];
        first.copy_from_slice(&hash.as_bytes()[..8]);
        u64::from_le_bytes(first)
    }

    pub fn rng_for(&self, symbol: &str) -> StdRng {
        StdRng::seed_from_u64(self.sub_seed(symbol))
    }
}

/// `n` weekday bars of a random walk starting at 100 on 2020-01-01.
///
/// Daily returns are uniform in ±3%; highs and lows extend up to 1% beyond
/// the open/close range.
pub fn synthetic_bars(symbol: &str, n: usize, master_seed: u64) -> Vec<Bar> {
    let mut rng = SeedHierarchy::new(master_seed).rng_for(symbol);
    let mut bars = Vec::with_capacity(n);
    let mut price = 100.0_f64;
    let mut current = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap_or(NaiveDate::MIN);

    while bars.len() < n {
        let weekday = current.weekday();
        if weekday != Weekday::Sat && weekday != Weekday::Sun {
            let daily_return: f64 = rng.gen_range(-0.03..0.03);
            let open = price;
            let close = price * (1.0 + daily_return);
            let high = open.max(close) * (1.0 + rng.gen_range(0.0..0.01));
            let low = open.min(close) * (1.0 - rng.gen_range(0.0..0.01));
            let volume = rng.gen_range(500_000..5_000_000u64);

            bars.push(Bar {
                symbol: symbol.to_string(),
                date: current,
                open,
                high,
                low,
                close,
                volume,
            });
            price = close;
        }
        current += chrono::Duration::days(1);
    }

    bars
}
