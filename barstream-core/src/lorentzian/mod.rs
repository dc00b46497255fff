//! Lorentzian classification: k-nearest-neighbor voting over a bounded
//! history of normalized feature vectors.
//!
//! Data flow per bar:
//! `FeatureExtractor` → `PatternBuffer` (push current entry) →
//! `LabelGenerator` (label the entry `label_lookahead` bars old) →
//! `LorentzianClassifier` (vote among the k nearest labeled entries).

pub mod classifier;
pub mod distance;
pub mod features;
pub mod labels;
pub mod pattern;

pub use classifier::{
    knn_vote, ClassificationResult, ClassifierState, LorentzianClassifier, Signal, VoteTally,
};
pub use distance::lorentzian_distance;
pub use features::{FeatureExtractor, FeatureKind, FeatureVector, FEATURE_COUNT};
pub use labels::LabelGenerator;
pub use pattern::{IdSource, Label, PatternBuffer, PatternEntry, SequentialIds};
