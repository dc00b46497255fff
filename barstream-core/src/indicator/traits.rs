//! `StreamingIndicator`: the state machine every indicator implements.
//!
//! Lifecycle: construct (validated parameters) → warming (`is_ready() == false`,
//! outputs are `FlatOutput::warming()`) → ready. `clear()` returns to the
//! freshly constructed state; replaying the same bars afterwards reproduces
//! bit-identical outputs.
//!
//! # Look-ahead contamination guard
//! The output for bar t depends only on bars 0..=t. Batch replay writes
//! `outputs[i]` as the cumulative state through bar i.

use crate::access::{InputSlot, ValueAccess};
use crate::error::IndicatorError;
use std::fmt;

/// Indicator output flattened into named scalar fields.
pub trait FlatOutput: Copy + fmt::Debug {
    /// Value reported while the indicator is warming up.
    fn warming() -> Self;

    /// `(name, value)` pairs in declaration order.
    fn fields(&self) -> Vec<(&'static str, f64)>;
}

impl FlatOutput for f64 {
    fn warming() -> Self {
        f64::NAN
    }

    fn fields(&self) -> Vec<(&'static str, f64)> {
        vec![("value", *self)]
    }
}

pub trait StreamingIndicator {
    type Output: FlatOutput;

    /// Human-readable name (e.g., "sma_20", "macd_12_26_9").
    fn name(&self) -> &str;

    /// Input shape fixed at construction.
    fn input_slot(&self) -> InputSlot;

    /// Number of bars required before the output is valid.
    fn lookback(&self) -> usize;

    /// Bars observed since construction or the last `clear`.
    fn bars_seen(&self) -> usize;

    fn is_ready(&self) -> bool {
        self.bars_seen() >= self.lookback()
    }

    /// Output for the most recent bar (`FlatOutput::warming()` until ready).
    fn value(&self) -> Self::Output;

    /// Consume one bar and return the updated output.
    ///
    /// A record missing a required aspect is rejected before any state changes.
    fn on_bar<B: ValueAccess + ?Sized>(&mut self, bar: &B) -> Result<Self::Output, IndicatorError>;

    /// Discard all accumulated state.
    fn clear(&mut self);

    /// Apply `on_bar` to every element in order.
    ///
    /// If `outputs` is supplied its length must equal `bars.len()`. Shape and
    /// input-slot checks run before the first bar is applied, so a rejected
    /// batch leaves the indicator untouched.
    fn on_bar_batch<B: ValueAccess>(
        &mut self,
        bars: &[B],
        outputs: Option<&mut [Self::Output]>,
    ) -> Result<(), IndicatorError> {
        if let Some(out) = outputs.as_deref() {
            if out.len() != bars.len() {
                return Err(IndicatorError::ShapeMismatch {
                    inputs: bars.len(),
                    outputs: out.len(),
                });
            }
        }
        let slot = self.input_slot();
        for bar in bars {
            slot.check(bar)?;
        }

        match outputs {
            Some(out) => {
                for (bar, dst) in bars.iter().zip(out.iter_mut()) {
                    *dst = self.on_bar(bar)?;
                }
            }
            None => {
                for bar in bars {
                    self.on_bar(bar)?;
                }
            }
        }
        Ok(())
    }

    /// Batch replay collecting one output per bar.
    fn replay<B: ValueAccess>(&mut self, bars: &[B]) -> Result<Vec<Self::Output>, IndicatorError> {
        let mut out = vec![Self::Output::warming(); bars.len()];
        self.on_bar_batch(bars, Some(&mut out[..]))?;
        Ok(out)
    }
}
