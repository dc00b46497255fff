//! Parameter sets: typed, validated indicator configuration.
//!
//! Parameters may carry optimizer bounds elsewhere; this module enforces only
//! logical constraints (positivity, period ordering, threshold ordering).
//! Violations are reported as [`ConfigError`] naming the offending fields.
//! Values are never clamped.
//!
//! Every struct deserializes with defaults for missing fields, and every
//! indicator constructor calls [`ParameterSet::validate`], so a parameter set
//! read from a config file cannot bypass validation.

use crate::error::ConfigError;
use crate::window::ImplementationHint;
use serde::{Deserialize, Serialize};
use std::fmt;

pub trait ParameterSet: Clone + fmt::Debug {
    fn validate(&self) -> Result<(), ConfigError>;
}

fn positive(field: &'static str, value: usize) -> Result<(), ConfigError> {
    if value == 0 {
        Err(ConfigError::new(field, "must be >= 1"))
    } else {
        Ok(())
    }
}

fn finite(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::new(field, format!("must be finite, got {value}")))
    }
}

/// A single lookback period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PeriodParams {
    pub period: usize,
}

impl PeriodParams {
    pub fn new(period: usize) -> Self {
        Self { period }
    }
}

impl Default for PeriodParams {
    fn default() -> Self {
        Self { period: 14 }
    }
}

impl ParameterSet for PeriodParams {
    fn validate(&self) -> Result<(), ConfigError> {
        positive("period", self.period)
    }
}

/// A rolling window period plus the computation strategy hint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WindowParams {
    pub period: usize,
    pub hint: ImplementationHint,
}

impl WindowParams {
    pub fn new(period: usize) -> Self {
        Self {
            period,
            hint: ImplementationHint::Auto,
        }
    }

    pub fn with_hint(mut self, hint: ImplementationHint) -> Self {
        self.hint = hint;
        self
    }
}

impl Default for WindowParams {
    fn default() -> Self {
        Self::new(20)
    }
}

impl ParameterSet for WindowParams {
    fn validate(&self) -> Result<(), ConfigError> {
        positive("period", self.period)
    }
}

/// RSI period plus overbought/oversold zone thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RsiParams {
    pub period: usize,
    pub overbought: f64,
    pub oversold: f64,
}

impl RsiParams {
    pub fn new(period: usize) -> Self {
        Self {
            period,
            ..Self::default()
        }
    }
}

impl Default for RsiParams {
    fn default() -> Self {
        Self {
            period: 14,
            overbought: 70.0,
            oversold: 30.0,
        }
    }
}

impl ParameterSet for RsiParams {
    fn validate(&self) -> Result<(), ConfigError> {
        positive("period", self.period)?;
        finite("overbought", self.overbought)?;
        finite("oversold", self.oversold)?;
        if self.overbought <= self.oversold {
            return Err(ConfigError::fields(
                &["overbought", "oversold"],
                format!(
                    "overbought ({}) must be greater than oversold ({})",
                    self.overbought, self.oversold
                ),
            ));
        }
        Ok(())
    }
}

/// Two-stage smoother: fast/slow EMAs and a signal EMA of their difference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MacdParams {
    pub fast_period: usize,
    pub slow_period: usize,
    pub signal_period: usize,
}

impl MacdParams {
    pub fn new(fast_period: usize, slow_period: usize, signal_period: usize) -> Self {
        Self {
            fast_period,
            slow_period,
            signal_period,
        }
    }
}

impl Default for MacdParams {
    fn default() -> Self {
        Self::new(12, 26, 9)
    }
}

impl ParameterSet for MacdParams {
    fn validate(&self) -> Result<(), ConfigError> {
        positive("fast_period", self.fast_period)?;
        positive("slow_period", self.slow_period)?;
        positive("signal_period", self.signal_period)?;
        if self.fast_period >= self.slow_period {
            return Err(ConfigError::fields(
                &["fast_period", "slow_period"],
                format!(
                    "fast_period ({}) must be less than slow_period ({})",
                    self.fast_period, self.slow_period
                ),
            ));
        }
        Ok(())
    }
}

/// Bollinger band window and width.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BollingerParams {
    pub period: usize,
    pub std_dev_mult: f64,
    pub hint: ImplementationHint,
}

impl Default for BollingerParams {
    fn default() -> Self {
        Self {
            period: 20,
            std_dev_mult: 2.0,
            hint: ImplementationHint::Auto,
        }
    }
}

impl ParameterSet for BollingerParams {
    fn validate(&self) -> Result<(), ConfigError> {
        positive("period", self.period)?;
        finite("std_dev_mult", self.std_dev_mult)?;
        if self.std_dev_mult <= 0.0 {
            return Err(ConfigError::new("std_dev_mult", "must be > 0"));
        }
        Ok(())
    }
}

/// How raw feature values are rescaled over the normalization window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NormalizationMode {
    /// (x - min) / (max - min), in [0, 1]. Zero range → 0.0.
    #[default]
    MinMax,
    /// (x - mean) / std. Zero std → 0.0.
    ZScore,
}

/// Sub-indicator periods and normalization for the Lorentzian feature space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FeatureParams {
    pub rsi_period: usize,
    pub cci_period: usize,
    pub adx_period: usize,
    pub normalization_window: usize,
    pub normalization: NormalizationMode,
}

impl Default for FeatureParams {
    fn default() -> Self {
        Self {
            rsi_period: 14,
            cci_period: 20,
            adx_period: 14,
            normalization_window: 100,
            normalization: NormalizationMode::MinMax,
        }
    }
}

impl FeatureParams {
    /// Bars until every feature is available: the slowest sub-indicator
    /// (price return needs two bars).
    pub fn lookback(&self) -> usize {
        (self.rsi_period + 1)
            .max(self.cci_period)
            .max(2 * self.adx_period)
            .max(2)
    }
}

impl ParameterSet for FeatureParams {
    fn validate(&self) -> Result<(), ConfigError> {
        positive("rsi_period", self.rsi_period)?;
        positive("cci_period", self.cci_period)?;
        positive("adx_period", self.adx_period)?;
        positive("normalization_window", self.normalization_window)
    }
}

/// Lorentzian classifier configuration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LorentzianParams {
    pub features: FeatureParams,
    /// Pattern buffer capacity.
    pub lookback_period: usize,
    /// k in k-NN.
    pub neighbors_count: usize,
    /// Bars between a pattern and the bar that labels it.
    pub label_lookahead: usize,
    /// Relative price change beyond which a pattern is labeled directional.
    pub label_threshold: f64,
    /// Votes below this agreement fraction produce a neutral signal.
    pub min_confidence: f64,
}

impl Default for LorentzianParams {
    fn default() -> Self {
        Self {
            features: FeatureParams::default(),
            lookback_period: 2000,
            neighbors_count: 8,
            label_lookahead: 4,
            label_threshold: 0.0,
            min_confidence: 0.0,
        }
    }
}

impl LorentzianParams {
    /// Bars until `neighbors_count` labeled patterns exist.
    pub fn lookback(&self) -> usize {
        self.features.lookback() + self.label_lookahead + self.neighbors_count - 1
    }
}

impl ParameterSet for LorentzianParams {
    fn validate(&self) -> Result<(), ConfigError> {
        self.features.validate()?;
        positive("lookback_period", self.lookback_period)?;
        positive("neighbors_count", self.neighbors_count)?;
        positive("label_lookahead", self.label_lookahead)?;
        finite("label_threshold", self.label_threshold)?;
        if self.label_threshold < 0.0 {
            return Err(ConfigError::new("label_threshold", "must be >= 0"));
        }
        finite("min_confidence", self.min_confidence)?;
        if !(0.0..=1.0).contains(&self.min_confidence) {
            return Err(ConfigError::new(
                "min_confidence",
                format!("must be within [0, 1], got {}", self.min_confidence),
            ));
        }
        if self.lookback_period < self.label_lookahead + self.neighbors_count {
            return Err(ConfigError::fields(
                &["lookback_period", "label_lookahead", "neighbors_count"],
                format!(
                    "lookback_period ({}) must be >= label_lookahead ({}) + neighbors_count ({})",
                    self.lookback_period, self.label_lookahead, self.neighbors_count
                ),
            ));
        }
        Ok(())
    }
}
