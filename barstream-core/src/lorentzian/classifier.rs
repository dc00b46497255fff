//! Lorentzian k-NN classifier.
//!
//! Per bar: extract features; once they are ready, push the current pattern,
//! label the pattern `label_lookahead` bars old, then vote among the
//! `neighbors_count` labeled patterns nearest to the current vector.
//!
//! Neighbor order is (distance, id) ascending, so equal distances prefer the
//! older pattern. The most recent `label_lookahead` patterns are unlabeled and
//! never vote.
//!
//! Vote: the label with the most neighbors wins; a tie for the top count is
//! Neutral. Confidence is the top count over `neighbors_count`. Below
//! `min_confidence` the signal is forced Neutral and confidence is kept.
//!
//! Per-bar cost is O(|PatternBuffer|) for distances plus an O(n) selection,
//! bounded by `lookback_period`.

use super::distance::lorentzian_distance;
use super::features::{FeatureExtractor, FeatureVector};
use super::labels::LabelGenerator;
use super::pattern::{IdSource, Label, PatternBuffer, PatternEntry, SequentialIds};
use crate::access::{InputSlot, ValueAccess, HLC_SLOT};
use crate::error::IndicatorError;
use crate::indicator::{FlatOutput, StreamingIndicator};
use crate::params::{LorentzianParams, ParameterSet};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Signal {
    Short = -1,
    #[default]
    Neutral = 0,
    Long = 1,
}

impl Signal {
    pub fn as_i8(self) -> i8 {
        self as i8
    }

    fn from_label(label: Label) -> Self {
        match label {
            Label::Bullish => Signal::Long,
            Label::Bearish => Signal::Short,
            Label::Neutral | Label::Unset => Signal::Neutral,
        }
    }
}

/// Neighbor label counts behind one classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct VoteTally {
    pub bullish: usize,
    pub bearish: usize,
    pub neutral: usize,
}

impl VoteTally {
    pub fn total(&self) -> usize {
        self.bullish + self.bearish + self.neutral
    }

    fn add(&mut self, label: Label) {
        match label {
            Label::Bullish => self.bullish += 1,
            Label::Bearish => self.bearish += 1,
            Label::Neutral => self.neutral += 1,
            Label::Unset => {}
        }
    }

    /// Winning label and its count; `Label::Neutral` on a tie for the top.
    pub fn majority(&self) -> (Label, usize) {
        let counts = [
            (Label::Bullish, self.bullish),
            (Label::Bearish, self.bearish),
            (Label::Neutral, self.neutral),
        ];
        let top = counts.iter().map(|(_, c)| *c).max().unwrap_or(0);
        let mut leaders = counts.iter().filter(|(_, c)| *c == top);
        match (leaders.next(), leaders.next()) {
            (Some((label, _)), None) => (*label, top),
            _ => (Label::Neutral, top),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClassificationResult {
    pub signal: Signal,
    /// Fraction of neighbors agreeing with the majority, in [0, 1].
    pub confidence: f64,
    pub votes: VoteTally,
}

impl ClassificationResult {
    pub fn neutral() -> Self {
        Self {
            signal: Signal::Neutral,
            confidence: 0.0,
            votes: VoteTally::default(),
        }
    }
}

impl FlatOutput for ClassificationResult {
    fn warming() -> Self {
        Self::neutral()
    }

    fn fields(&self) -> Vec<(&'static str, f64)> {
        vec![
            ("signal", f64::from(self.signal.as_i8())),
            ("confidence", self.confidence),
        ]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassifierState {
    /// No bars since construction or `clear`.
    Uninitialized,
    /// Features not ready.
    Warming,
    /// Features ready, fewer than `neighbors_count` labeled patterns.
    PartiallyPopulated,
    Ready,
}

#[derive(Debug, Clone)]
pub struct LorentzianClassifier<S: IdSource = SequentialIds> {
    params: LorentzianParams,
    name: String,
    features: FeatureExtractor,
    patterns: PatternBuffer,
    labeler: LabelGenerator,
    ids: S,
    state: ClassifierState,
    bars: usize,
    result: ClassificationResult,
    // (distance, id, label) of labeled candidates, reused across bars.
    scratch: Vec<(f64, u64, Label)>,
}

impl LorentzianClassifier<SequentialIds> {
    pub fn new(params: LorentzianParams) -> Result<Self, IndicatorError> {
        Self::with_id_source(params, SequentialIds::default())
    }
}

impl<S: IdSource> LorentzianClassifier<S> {
    pub fn with_id_source(params: LorentzianParams, ids: S) -> Result<Self, IndicatorError> {
        params.validate()?;
        Ok(Self {
            name: format!(
                "lorentzian_{}_{}_{}",
                params.neighbors_count, params.lookback_period, params.label_lookahead
            ),
            features: FeatureExtractor::new(params.features)?,
            patterns: PatternBuffer::new(params.lookback_period),
            labeler: LabelGenerator::new(params.label_lookahead, params.label_threshold),
            ids,
            state: ClassifierState::Uninitialized,
            bars: 0,
            result: ClassificationResult::neutral(),
            scratch: Vec::with_capacity(params.lookback_period),
            params,
        })
    }

    pub fn params(&self) -> &LorentzianParams {
        &self.params
    }

    pub fn state(&self) -> ClassifierState {
        self.state
    }

    pub fn patterns(&self) -> &PatternBuffer {
        &self.patterns
    }

    /// Normalized features of the last bar.
    pub fn features(&self) -> FeatureVector {
        self.features.value()
    }

    fn transition(&mut self, next: ClassifierState) {
        if self.state != next {
            debug!(
                classifier = %self.name,
                bar = self.bars,
                from = ?self.state,
                to = ?next,
                "classifier state change"
            );
            self.state = next;
        }
    }
}

/// Vote among the `k` labeled entries of `patterns` nearest to `current`.
///
/// `scratch` is cleared and refilled; pass the same vector every bar to avoid
/// reallocating. Fewer than `k` labeled entries yields a neutral result with
/// an empty tally.
pub fn knn_vote(
    patterns: &PatternBuffer,
    current: &FeatureVector,
    k: usize,
    min_confidence: f64,
    scratch: &mut Vec<(f64, u64, Label)>,
) -> ClassificationResult {
    scratch.clear();
    scratch.extend(patterns.labeled().map(|e| {
        (
            lorentzian_distance(current.as_slice(), e.features.as_slice()),
            e.id,
            e.label,
        )
    }));
    if k == 0 || scratch.len() < k {
        return ClassificationResult::neutral();
    }

    let by_distance_then_age = |a: &(f64, u64, Label), b: &(f64, u64, Label)| -> Ordering {
        a.0.total_cmp(&b.0).then(a.1.cmp(&b.1))
    };
    if scratch.len() > k {
        scratch.select_nth_unstable_by(k - 1, by_distance_then_age);
    }

    let mut votes = VoteTally::default();
    for (_, _, label) in &scratch[..k] {
        votes.add(*label);
    }
    let (label, top) = votes.majority();
    let confidence = top as f64 / k as f64;
    let signal = if confidence < min_confidence {
        Signal::Neutral
    } else {
        Signal::from_label(label)
    };
    ClassificationResult {
        signal,
        confidence,
        votes,
    }
}

impl<S: IdSource> StreamingIndicator for LorentzianClassifier<S> {
    type Output = ClassificationResult;

    fn name(&self) -> &str {
        &self.name
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

    fn is_ready(&self) -> bool {
        self.state == ClassifierState::Ready
    }

    fn value(&self) -> ClassificationResult {
        self.result
    }

    fn on_bar<B: ValueAccess + ?Sized>(
        &mut self,
        bar: &B,
    ) -> Result<ClassificationResult, IndicatorError> {
        let current = self.features.on_bar(bar)?;
        let close = HLC_SLOT.primary(bar)?;
        self.bars += 1;

        if !self.features.is_ready() {
            self.transition(ClassifierState::Warming);
            self.result = ClassificationResult::neutral();
            return Ok(self.result);
        }

        self.patterns.push(PatternEntry {
            id: self.ids.next_id(),
            features: current,
            label: Label::Unset,
            anchor_close: close,
        });
        self.labeler.apply(&mut self.patterns, close);

        self.result = knn_vote(
            &self.patterns,
            &current,
            self.params.neighbors_count,
            self.params.min_confidence,
            &mut self.scratch,
        );
        let next = if self.result.votes.total() == self.params.neighbors_count {
            ClassifierState::Ready
        } else {
            ClassifierState::PartiallyPopulated
        };
        self.transition(next);
        Ok(self.result)
    }

    fn clear(&mut self) {
        self.features.clear();
        self.patterns.clear();
        self.ids.reset();
        self.scratch = Vec::new();
        self.bars = 0;
        self.result = ClassificationResult::neutral();
        self.transition(ClassifierState::Uninitialized);
    }
}
