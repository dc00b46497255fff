//! Pattern history: a fixed-capacity FIFO of feature vectors awaiting or
//! carrying a label.

use super::features::FeatureVector;
use crate::window::RingBuffer;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Outcome assigned to a pattern once its lookahead bar arrives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Label {
    /// Lookahead bar not yet seen.
    #[default]
    Unset,
    Bullish,
    Bearish,
    Neutral,
}

impl Label {
    pub fn is_set(self) -> bool {
        self != Label::Unset
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Label::Unset => "unset",
            Label::Bullish => "bullish",
            Label::Bearish => "bearish",
            Label::Neutral => "neutral",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PatternEntry {
    /// Monotonic insertion id; lower is older.
    pub id: u64,
    pub features: FeatureVector,
    pub label: Label,
    /// Close of the bar that produced `features`; the labeling baseline.
    pub anchor_close: f64,
}

/// Source of pattern ids. Injected into the classifier so id generation is
/// never process-wide state.
pub trait IdSource {
    fn next_id(&mut self) -> u64;

    /// Restart the sequence; called by the owner's `clear()`.
    fn reset(&mut self);
}

/// 0, 1, 2, ...
#[derive(Debug, Clone, Default)]
pub struct SequentialIds {
    next: u64,
}

impl IdSource for SequentialIds {
    fn next_id(&mut self) -> u64 {
        let id = self.next;
        self.next += 1;
        id
    }

    fn reset(&mut self) {
        self.next = 0;
    }
}

/// Bounded pattern history with strict FIFO eviction, regardless of label.
#[derive(Debug, Clone)]
pub struct PatternBuffer {
    entries: RingBuffer<PatternEntry>,
}

impl PatternBuffer {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: RingBuffer::new(capacity),
        }
    }

    pub fn capacity(&self) -> usize {
        self.entries.capacity()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entry slots currently allocated; 0 after `clear`.
    pub fn allocated(&self) -> usize {
        self.entries.allocated()
    }

    /// Append an entry, returning the evicted oldest entry when full.
    pub fn push(&mut self, entry: PatternEntry) -> Option<PatternEntry> {
        self.entries.push(entry)
    }

    /// Entry `age` positions back from the newest (0 = newest).
    pub fn get_from_newest(&self, age: usize) -> Option<&PatternEntry> {
        self.entries.get_from_newest(age)
    }

    pub fn get_from_newest_mut(&mut self, age: usize) -> Option<&mut PatternEntry> {
        self.entries.get_from_newest_mut(age)
    }

    /// Oldest → newest.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &PatternEntry> + '_ {
        self.entries.iter()
    }

    /// Entries eligible as neighbors.
    pub fn labeled(&self) -> impl Iterator<Item = &PatternEntry> + '_ {
        self.entries.iter().filter(|e| e.label.is_set())
    }

    pub fn labeled_count(&self) -> usize {
        self.labeled().count()
    }

    /// Drop every entry and release the storage.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(id: u64, label: Label) -> PatternEntry {
        PatternEntry {
            id,
            features: FeatureVector::zero(),
            label,
            anchor_close: 100.0,
        }
    }

    #[test]
    fn sequential_ids_restart_on_reset() {
        let mut ids = SequentialIds::default();
        assert_eq!(ids.next_id(), 0);
        assert_eq!(ids.next_id(), 1);
        ids.reset();
        assert_eq!(ids.next_id(), 0);
    }

    #[test]
    fn bounded_fifo_eviction() {
        let mut buf = PatternBuffer::new(3);
        for id in 0..10 {
            let evicted = buf.push(entry(id, Label::Neutral));
            assert!(buf.len() <= 3);
            if id >= 3 {
                assert_eq!(evicted.map(|e| e.id), Some(id - 3));
            }
        }
        let ids: Vec<u64> = buf.iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![7, 8, 9]);
    }

    #[test]
    fn eviction_ignores_label_state() {
        let mut buf = PatternBuffer::new(2);
        buf.push(entry(0, Label::Unset));
        buf.push(entry(1, Label::Bullish));
        let evicted = buf.push(entry(2, Label::Unset)).unwrap();
        assert_eq!(evicted.id, 0);
        assert_eq!(buf.labeled_count(), 1);
    }

    #[test]
    fn get_from_newest_counts_back() {
        let mut buf = PatternBuffer::new(4);
        for id in 0..4 {
            buf.push(entry(id, Label::Unset));
        }
        assert_eq!(buf.get_from_newest(0).unwrap().id, 3);
        assert_eq!(buf.get_from_newest(3).unwrap().id, 0);
        assert!(buf.get_from_newest(4).is_none());
    }
}
