//! ValueAccess: reading named price aspects from arbitrary input records.
//!
//! Indicators never touch record fields directly. Each one declares an
//! [`InputSlot`] (name, required aspects, default source index) at
//! construction and reads through it, so any record type that implements
//! [`ValueAccess`] can drive any indicator whose required aspects it exposes.

use crate::domain::{Bar, Ohlc, Ohlcv};
use crate::error::IndicatorError;
use serde::{Deserialize, Serialize};

/// One named aspect of a bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriceAspect {
    Open,
    High,
    Low,
    Close,
    Volume,
}

/// Extracts price/volume aspects from a record.
///
/// Returns `None` when the record does not carry the aspect at all. A carried
/// aspect whose value is NaN is returned as `Some(NaN)`.
pub trait ValueAccess {
    fn value(&self, aspect: PriceAspect) -> Option<f64>;
}

impl<T: ValueAccess + ?Sized> ValueAccess for &T {
    fn value(&self, aspect: PriceAspect) -> Option<f64> {
        (**self).value(aspect)
    }
}

impl ValueAccess for Bar {
    fn value(&self, aspect: PriceAspect) -> Option<f64> {
        Some(match aspect {
            PriceAspect::Open => self.open,
            PriceAspect::High => self.high,
            PriceAspect::Low => self.low,
            PriceAspect::Close => self.close,
            PriceAspect::Volume => self.volume as f64,
        })
    }
}

impl ValueAccess for Ohlc {
    fn value(&self, aspect: PriceAspect) -> Option<f64> {
        match aspect {
            PriceAspect::Open => Some(self.open),
            PriceAspect::High => Some(self.high),
            PriceAspect::Low => Some(self.low),
            PriceAspect::Close => Some(self.close),
            PriceAspect::Volume => None,
        }
    }
}

impl ValueAccess for Ohlcv {
    fn value(&self, aspect: PriceAspect) -> Option<f64> {
        Some(match aspect {
            PriceAspect::Open => self.open,
            PriceAspect::High => self.high,
            PriceAspect::Low => self.low,
            PriceAspect::Close => self.close,
            PriceAspect::Volume => self.volume,
        })
    }
}

/// A bare value is a single-price series: every price aspect reads the value,
/// volume is absent.
impl ValueAccess for f64 {
    fn value(&self, aspect: PriceAspect) -> Option<f64> {
        match aspect {
            PriceAspect::Volume => None,
            _ => Some(*self),
        }
    }
}

/// A price series derived from one or more aspects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriceSource {
    Aspect(PriceAspect),
    /// (high + low) / 2
    Hl2,
    /// (high + low + close) / 3
    Hlc3,
    /// (open + high + low + close) / 4
    Ohlc4,
}

impl Default for PriceSource {
    fn default() -> Self {
        Self::Aspect(PriceAspect::Close)
    }
}

impl PriceSource {
    /// Read the derived value, or `None` if any underlying aspect is missing.
    pub fn read<B: ValueAccess + ?Sized>(&self, bar: &B) -> Option<f64> {
        use PriceAspect::*;
        match self {
            Self::Aspect(a) => bar.value(*a),
            Self::Hl2 => Some((bar.value(High)? + bar.value(Low)?) / 2.0),
            Self::Hlc3 => Some((bar.value(High)? + bar.value(Low)? + bar.value(Close)?) / 3.0),
            Self::Ohlc4 => Some(
                (bar.value(Open)? + bar.value(High)? + bar.value(Low)? + bar.value(Close)?) / 4.0,
            ),
        }
    }
}

/// Input shape an indicator fixes at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InputSlot {
    pub name: &'static str,
    pub required: &'static [PriceAspect],
    /// Index into `required` of the primary series.
    pub default_source: usize,
}

/// Close-only input.
pub const CLOSE_SLOT: InputSlot = InputSlot {
    name: "close",
    required: &[PriceAspect::Close],
    default_source: 0,
};

/// High/low/close input, close as the primary series.
pub const HLC_SLOT: InputSlot = InputSlot {
    name: "hlc",
    required: &[PriceAspect::High, PriceAspect::Low, PriceAspect::Close],
    default_source: 2,
};

impl InputSlot {
    /// Read all required aspects in declaration order.
    ///
    /// `N` must equal `required.len()`.
    pub fn read<const N: usize, B: ValueAccess + ?Sized>(
        &self,
        bar: &B,
    ) -> Result<[f64; N], IndicatorError> {
        debug_assert_eq!(N, self.required.len(), "slot '{}' arity", self.name);
        let mut out = [f64::NAN; N];
        for (slot, aspect) in out.iter_mut().zip(self.required) {
            *slot = bar.value(*aspect).ok_or(IndicatorError::MissingAspect {
                slot: self.name,
                aspect: *aspect,
            })?;
        }
        Ok(out)
    }

    /// Read the primary series value.
    pub fn primary<B: ValueAccess + ?Sized>(&self, bar: &B) -> Result<f64, IndicatorError> {
        let aspect = self.required[self.default_source];
        bar.value(aspect).ok_or(IndicatorError::MissingAspect {
            slot: self.name,
            aspect,
        })
    }

    /// Verify that `bar` provides every required aspect.
    pub fn check<B: ValueAccess + ?Sized>(&self, bar: &B) -> Result<(), IndicatorError> {
        for aspect in self.required {
            if bar.value(*aspect).is_none() {
                return Err(IndicatorError::MissingAspect {
                    slot: self.name,
                    aspect: *aspect,
                });
            }
        }
        Ok(())
    }
}
