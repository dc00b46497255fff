//! Retrospective labeling.
//!
//! When bar t arrives, the entry produced at bar t - L (L = `label_lookahead`)
//! is labeled from the relative close change over those L bars:
//! `r = (close_t - anchor) / anchor`.
//! `r > threshold` → Bullish, `r < -threshold` → Bearish, otherwise Neutral.
//! Both comparisons are strict. A zero or non-finite anchor, or a NaN close,
//! labels Neutral.

use super::pattern::{Label, PatternBuffer};
use tracing::trace;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LabelGenerator {
    lookahead: usize,
    threshold: f64,
}

impl LabelGenerator {
    pub fn new(lookahead: usize, threshold: f64) -> Self {
        Self {
            lookahead,
            threshold,
        }
    }

    pub fn lookahead(&self) -> usize {
        self.lookahead
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Label for a move from `anchor` to `close`.
    pub fn classify(&self, anchor: f64, close: f64) -> Label {
        if anchor == 0.0 || !anchor.is_finite() {
            return Label::Neutral;
        }
        let change = (close - anchor) / anchor;
        if change > self.threshold {
            Label::Bullish
        } else if change < -self.threshold {
            Label::Bearish
        } else {
            Label::Neutral
        }
    }

    /// Label the entry `lookahead` positions behind the newest one, which must
    /// have been pushed for the bar closing at `close`.
    ///
    /// Returns the labeled entry's id, or `None` if that entry does not exist
    /// yet or already carries a label.
    pub fn apply(&self, buffer: &mut PatternBuffer, close: f64) -> Option<(u64, Label)> {
        let entry = buffer.get_from_newest_mut(self.lookahead)?;
        if entry.label.is_set() {
            return None;
        }
        entry.label = self.classify(entry.anchor_close, close);
        trace!(id = entry.id, label = %entry.label, "pattern labeled");
        Some((entry.id, entry.label))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lorentzian::features::FeatureVector;
    use crate::lorentzian::pattern::PatternEntry;

    #[test]
    fn thresholds_are_strict() {
        let labeler = LabelGenerator::new(1, 0.01);
        assert_eq!(labeler.classify(100.0, 101.5), Label::Bullish);
        assert_eq!(labeler.classify(100.0, 98.5), Label::Bearish);
        assert_eq!(labeler.classify(100.0, 100.5), Label::Neutral);
        assert_eq!(labeler.classify(1.0, 1.5), Label::Bullish);

        // Exactly +/- threshold is not a directional move.
        let exact = LabelGenerator::new(1, 0.5);
        assert_eq!(exact.classify(1.0, 1.5), Label::Neutral);
        assert_eq!(exact.classify(1.0, 0.5), Label::Neutral);
    }

    #[test]
    fn zero_threshold_labels_any_move() {
        let labeler = LabelGenerator::new(1, 0.0);
        assert_eq!(labeler.classify(10.0, 10.0), Label::Neutral);
        assert_eq!(labeler.classify(10.0, 10.01), Label::Bullish);
        assert_eq!(labeler.classify(10.0, 9.99), Label::Bearish);
    }

    #[test]
    fn degenerate_anchor_is_neutral() {
        let labeler = LabelGenerator::new(1, 0.0);
        assert_eq!(labeler.classify(0.0, 5.0), Label::Neutral);
        assert_eq!(labeler.classify(f64::NAN, 5.0), Label::Neutral);
        assert_eq!(labeler.classify(5.0, f64::NAN), Label::Neutral);
    }

    #[test]
    fn apply_labels_exactly_lookahead_back() {
        let labeler = LabelGenerator::new(2, 0.0);
        let mut buf = PatternBuffer::new(8);
        for (id, close) in [(0, 100.0), (1, 90.0)] {
            buf.push(PatternEntry {
                id,
                features: FeatureVector::zero(),
                label: Label::Unset,
                anchor_close: close,
            });
            assert_eq!(labeler.apply(&mut buf, close), None);
        }
        buf.push(PatternEntry {
            id: 2,
            features: FeatureVector::zero(),
            label: Label::Unset,
            anchor_close: 110.0,
        });
        assert_eq!(labeler.apply(&mut buf, 110.0), Some((0, Label::Bullish)));
        assert_eq!(buf.labeled_count(), 1);
        // A second call for the same bar is a no-op.
        assert_eq!(labeler.apply(&mut buf, 110.0), None);
    }
}
