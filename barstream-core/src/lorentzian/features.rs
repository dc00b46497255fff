//! Feature extraction for the Lorentzian classifier.
//!
//! Per bar, four raw values are computed from owned sub-indicators:
//! one-bar price return, RSI, CCI and ADX. Each is rescaled over a trailing
//! `normalization_window` of its own raw history so that features entering
//! the distance metric share a scale. Until every sub-indicator is ready the
//! extractor reports not-ready and yields the zero vector.
//!
//! Normalization fallbacks: a flat window (zero range, zero std) yields 0.0.

use crate::access::{InputSlot, ValueAccess, HLC_SLOT};
use crate::error::IndicatorError;
use crate::indicator::{FlatOutput, StreamingIndicator};
use crate::indicators::{Adx, Cci, Rsi};
use crate::params::{FeatureParams, NormalizationMode, ParameterSet, PeriodParams, RsiParams, WindowParams};
use crate::window::{ImplementationHint, WindowedAggregate};
use serde::{Deserialize, Serialize};

pub const FEATURE_COUNT: usize = 4;

/// Position of each feature in a [`FeatureVector`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeatureKind {
    PriceReturn,
    Rsi,
    Cci,
    Adx,
}

impl FeatureKind {
    pub const ALL: [FeatureKind; FEATURE_COUNT] = [
        FeatureKind::PriceReturn,
        FeatureKind::Rsi,
        FeatureKind::Cci,
        FeatureKind::Adx,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            FeatureKind::PriceReturn => "price_return",
            FeatureKind::Rsi => "rsi",
            FeatureKind::Cci => "cci",
            FeatureKind::Adx => "adx",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct FeatureVector(pub [f64; FEATURE_COUNT]);

impl FeatureVector {
    pub fn zero() -> Self {
        Self([0.0; FEATURE_COUNT])
    }

    pub fn get(&self, kind: FeatureKind) -> f64 {
        self.0[kind.index()]
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }
}

impl FlatOutput for FeatureVector {
    fn warming() -> Self {
        Self::zero()
    }

    fn fields(&self) -> Vec<(&'static str, f64)> {
        FeatureKind::ALL
            .iter()
            .map(|k| (k.name(), self.get(*k)))
            .collect()
    }
}

/// Trailing-window rescaler for one feature.
#[derive(Debug, Clone)]
struct Normalizer {
    mode: NormalizationMode,
    window: WindowedAggregate,
}

impl Normalizer {
    fn new(mode: NormalizationMode, window: usize) -> Self {
        let strategy = ImplementationHint::Auto.resolve(window);
        Self {
            mode,
            window: WindowedAggregate::with_strategy(window, strategy),
        }
    }

    fn normalize(&mut self, raw: f64) -> f64 {
        self.window.push(raw);
        if raw.is_nan() {
            return f64::NAN;
        }
        match self.mode {
            NormalizationMode::MinMax => {
                let min = self.window.min();
                let range = self.window.max() - min;
                if range > 0.0 {
                    (raw - min) / range
                } else {
                    0.0
                }
            }
            NormalizationMode::ZScore => {
                let std = self.window.std_dev();
                if std.is_nan() {
                    f64::NAN
                } else if std > 0.0 {
                    (raw - self.window.mean()) / std
                } else {
                    0.0
                }
            }
        }
    }

    fn clear(&mut self) {
        self.window.clear();
    }
}

#[derive(Debug, Clone)]
pub struct FeatureExtractor {
    params: FeatureParams,
    rsi: Rsi,
    cci: Cci,
    adx: Adx,
    prev_close: Option<f64>,
    normalizers: [Normalizer; FEATURE_COUNT],
    raw: FeatureVector,
    current: FeatureVector,
    bars: usize,
}

impl FeatureExtractor {
    pub fn new(params: FeatureParams) -> Result<Self, IndicatorError> {
        params.validate()?;
        let normalizer = || Normalizer::new(params.normalization, params.normalization_window);
        Ok(Self {
            params,
            rsi: Rsi::new(RsiParams::new(params.rsi_period))?,
            cci: Cci::new(WindowParams::new(params.cci_period))?,
            adx: Adx::new(PeriodParams::new(params.adx_period))?,
            prev_close: None,
            normalizers: [normalizer(), normalizer(), normalizer(), normalizer()],
            raw: FeatureVector::zero(),
            current: FeatureVector::zero(),
            bars: 0,
        })
    }

    pub fn params(&self) -> &FeatureParams {
        &self.params
    }

    /// Un-normalized values from the last ready bar.
    pub fn raw(&self) -> FeatureVector {
        self.raw
    }

    fn price_return(prev: f64, close: f64) -> f64 {
        if prev == 0.0 {
            0.0
        } else {
            (close - prev) / prev
        }
    }
}

impl StreamingIndicator for FeatureExtractor {
    type Output = FeatureVector;

    fn name(&self) -> &str {
        "lorentzian_features"
    }

    fn input_slot(&self) -> InputSlot {
        HLC_SLOT
    }

    fn lookback(&self) -> usize {
        self.params.lookback()
    }

    fn bars_seen(&self) -> usize {
        self.bars
    }

    /// Cached vector for the last bar; repeated reads do not recompute.
    fn value(&self) -> FeatureVector {
        self.current
    }

    fn on_bar<B: ValueAccess + ?Sized>(&mut self, bar: &B) -> Result<FeatureVector, IndicatorError> {
        HLC_SLOT.check(bar)?;
        let close = HLC_SLOT.primary(bar)?;
        let rsi = self.rsi.on_bar(bar)?;
        let cci = self.cci.on_bar(bar)?;
        let adx = self.adx.on_bar(bar)?;
        let ret = self
            .prev_close
            .replace(close)
            .map(|prev| Self::price_return(prev, close));
        self.bars += 1;

        let ready = self.rsi.is_ready() && self.cci.is_ready() && self.adx.is_ready();
        let Some(ret) = ret.filter(|_| ready) else {
            self.current = FeatureVector::zero();
            return Ok(self.current);
        };

        self.raw = FeatureVector([ret, rsi, cci, adx]);
        for (i, normalizer) in self.normalizers.iter_mut().enumerate() {
            self.current.0[i] = normalizer.normalize(self.raw.0[i]);
        }
        Ok(self.current)
    }

    fn clear(&mut self) {
        self.rsi.clear();
        self.cci.clear();
        self.adx.clear();
        self.prev_close = None;
        for n in &mut self.normalizers {
            n.clear();
        }
        self.raw = FeatureVector::zero();
        self.current = FeatureVector::zero();
        self.bars = 0;
    }
}
