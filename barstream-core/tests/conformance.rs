//! Conformance suite: every streaming indicator against its batch reference,
//! and the rescan strategy against the incremental one.
//!
//! Identical inputs are replayed through both implementations; outputs must
//! agree within tolerance at every index, including the NaN warm-up prefix.

mod common;

use barstream_core::conformance::{assert_batch_equivalence, assert_conformance};
use barstream_core::indicators::*;
use barstream_core::lorentzian::{FeatureExtractor, LorentzianClassifier};
use barstream_core::params::*;
use barstream_core::reference::{self, Series};
use barstream_core::window::ImplementationHint;
use barstream_core::StreamingIndicator;
use common::{closes, make_test_bars};

const TOL: f64 = 1e-9;

// ── Streaming vs reference ───────────────────────────────────────────

#[test]
fn sma_matches_reference() {
    let bars = make_test_bars(300);
    let expected = reference::sma(&closes(&bars), 20);
    for hint in [ImplementationHint::Reference, ImplementationHint::Optimized] {
        let mut sma = Sma::new(WindowParams::new(20).with_hint(hint)).unwrap();
        assert_conformance(&mut sma, &bars, &expected, TOL);
    }
}

#[test]
fn ema_matches_reference() {
    let bars = make_test_bars(300);
    let mut ema = Ema::with_period(12).unwrap();
    assert_conformance(&mut ema, &bars, &reference::ema(&closes(&bars), 12), TOL);
}

#[test]
fn rsi_matches_reference() {
    let bars = make_test_bars(300);
    let mut rsi = Rsi::with_period(14).unwrap();
    assert_conformance(&mut rsi, &bars, &reference::rsi(&closes(&bars), 14), TOL);
}

#[test]
fn atr_matches_reference() {
    let bars = make_test_bars(300);
    let series = Series::from_records(&bars);
    let mut atr = Atr::with_period(14).unwrap();
    assert_conformance(&mut atr, &bars, &reference::atr(&series, 14), TOL);
}

#[test]
fn adx_matches_reference() {
    let bars = make_test_bars(300);
    let series = Series::from_records(&bars);
    let mut adx = Adx::with_period(14).unwrap();
    assert_conformance(&mut adx, &bars, &reference::adx(&series, 14), TOL);
}

#[test]
fn cci_matches_reference() {
    let bars = make_test_bars(300);
    let series = Series::from_records(&bars);
    for hint in [ImplementationHint::Reference, ImplementationHint::FirstParty] {
        let mut cci = Cci::new(WindowParams::new(20).with_hint(hint)).unwrap();
        assert_conformance(&mut cci, &bars, &reference::cci(&series, 20), 1e-7);
    }
}

#[test]
fn macd_matches_reference() {
    let bars = make_test_bars(300);
    let mut macd = Macd::new(MacdParams::new(12, 26, 9)).unwrap();
    assert_conformance(&mut macd, &bars, &reference::macd(&closes(&bars), 12, 26, 9), TOL);
}

#[test]
fn bollinger_matches_reference() {
    let bars = make_test_bars(300);
    for hint in [ImplementationHint::Reference, ImplementationHint::Optimized] {
        let params = BollingerParams {
            period: 20,
            std_dev_mult: 2.0,
            hint,
        };
        let mut bb = Bollinger::new(params).unwrap();
        assert_conformance(&mut bb, &bars, &reference::bollinger(&closes(&bars), 20, 2.0), 1e-7);
    }
}

#[test]
fn nan_gap_agrees_with_reference() {
    let mut bars = make_test_bars(120);
    bars[40].close = f64::NAN;
    let expected = reference::sma(&closes(&bars), 10);
    let mut sma = Sma::new(WindowParams::new(10).with_hint(ImplementationHint::Optimized)).unwrap();
    assert_conformance(&mut sma, &bars, &expected, TOL);
    // Recovered once the NaN left the window.
    assert!(!expected[50].is_nan());
}

// ── Rescan vs incremental ────────────────────────────────────────────

#[test]
fn window_strategies_agree_over_long_stream() {
    let bars = make_test_bars(5_000);
    let mut rescan =
        Sma::new(WindowParams::new(50).with_hint(ImplementationHint::Reference)).unwrap();
    let mut incremental =
        Sma::new(WindowParams::new(50).with_hint(ImplementationHint::Optimized)).unwrap();
    let expected = rescan.replay(&bars).unwrap();
    assert_conformance(&mut incremental, &bars, &expected, TOL);
}

// ── Batch vs sequential ──────────────────────────────────────────────

#[test]
fn batch_equals_sequential_for_catalog() {
    let bars = make_test_bars(200);
    assert_batch_equivalence(|| Sma::with_period(20).unwrap(), &bars);
    assert_batch_equivalence(|| Ema::with_period(20).unwrap(), &bars);
    assert_batch_equivalence(|| Rsi::with_period(14).unwrap(), &bars);
    assert_batch_equivalence(|| Atr::with_period(14).unwrap(), &bars);
    assert_batch_equivalence(|| Adx::with_period(14).unwrap(), &bars);
    assert_batch_equivalence(|| Cci::with_period(20).unwrap(), &bars);
    assert_batch_equivalence(|| Macd::new(MacdParams::default()).unwrap(), &bars);
    assert_batch_equivalence(|| Bollinger::new(BollingerParams::default()).unwrap(), &bars);
}

#[test]
fn batch_equals_sequential_for_lorentzian() {
    let bars = make_test_bars(400);
    let params = LorentzianParams {
        lookback_period: 120,
        ..LorentzianParams::default()
    };
    assert_batch_equivalence(|| FeatureExtractor::new(params.features).unwrap(), &bars);
    assert_batch_equivalence(|| LorentzianClassifier::new(params).unwrap(), &bars);
}
