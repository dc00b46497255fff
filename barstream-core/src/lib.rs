//! Barstream Core: streaming technical indicators and Lorentzian k-NN
//! classification over price bars.
//!
//! This crate contains:
//! - Domain types (bars) and `ValueAccess` adapters over arbitrary records
//! - Fixed-capacity window primitives (ring buffer, rolling aggregates, smoothers)
//! - The `StreamingIndicator` state machine and a catalog of indicators
//! - Validated, serde-loadable parameter sets
//! - Batch reference implementations and conformance helpers
//! - The Lorentzian classifier (features, pattern buffer, labeling, voting)

pub mod access;
pub mod conformance;
pub mod domain;
pub mod error;
pub mod indicator;
pub mod indicators;
pub mod lorentzian;
pub mod params;
pub mod reference;
pub mod window;

pub use access::{InputSlot, PriceAspect, PriceSource, ValueAccess};
pub use domain::Bar;
pub use error::{ConfigError, IndicatorError};
pub use indicator::{FlatOutput, StreamingIndicator};
pub use lorentzian::{ClassificationResult, LorentzianClassifier, Signal};
pub use params::{LorentzianParams, ParameterSet};
