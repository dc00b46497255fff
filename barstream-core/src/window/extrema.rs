//! Rolling min/max via monotonic deque.

use std::collections::VecDeque;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Extremum {
    Min,
    Max,
}

/// Rolling minimum or maximum over the last `period` samples.
///
/// Keeps a deque of (sequence, value) candidates that is monotonic in value,
/// so each sample is pushed and popped at most once. NaN samples occupy a
/// slot in the window but never become candidates.
#[derive(Debug, Clone)]
pub struct RollingExtremum {
    kind: Extremum,
    period: usize,
    seq: u64,
    candidates: VecDeque<(u64, f64)>,
}

impl RollingExtremum {
    pub fn new(kind: Extremum, period: usize) -> Self {
        assert!(period >= 1, "extremum period must be >= 1");
        Self {
            kind,
            period,
            seq: 0,
            candidates: VecDeque::with_capacity(period),
        }
    }

    fn dominates(&self, incoming: f64, existing: f64) -> bool {
        match self.kind {
            Extremum::Min => incoming <= existing,
            Extremum::Max => incoming >= existing,
        }
    }

    pub fn push(&mut self, value: f64) {
        let seq = self.seq;
        self.seq += 1;

        if !value.is_nan() {
            while let Some(&(_, back)) = self.candidates.back() {
                if self.dominates(value, back) {
                    self.candidates.pop_back();
                } else {
                    break;
                }
            }
            self.candidates.push_back((seq, value));
        }

        let window_start = self.seq.saturating_sub(self.period as u64);
        while let Some(&(front_seq, _)) = self.candidates.front() {
            if front_seq < window_start {
                self.candidates.pop_front();
            } else {
                break;
            }
        }
    }

    /// Current extremum, NaN if the window holds no finite sample.
    pub fn value(&self) -> f64 {
        self.candidates.front().map_or(f64::NAN, |&(_, v)| v)
    }

    pub fn clear(&mut self) {
        self.seq = 0;
        self.candidates = VecDeque::new();
    }
}
