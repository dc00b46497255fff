//! Fixed-capacity windowed aggregation primitives.
//!
//! Every primitive here is O(1) amortized per update and bounded in memory by
//! its configured capacity, independent of how many samples have been pushed.

pub mod aggregate;
pub mod extrema;
pub mod ring;
pub mod smoothing;
pub mod strategy;

pub use aggregate::WindowedAggregate;
pub use extrema::{Extremum, RollingExtremum};
pub use ring::RingBuffer;
pub use smoothing::{ExpSmoother, SmoothingKind};
pub use strategy::{ImplementationHint, WindowStrategy, RESCAN_MAX_PERIOD};
