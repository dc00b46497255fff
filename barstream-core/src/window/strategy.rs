//! Computation strategy selection for windowed aggregates.
//!
//! Callers pass an [`ImplementationHint`]; it is resolved once, at
//! construction, into a concrete [`WindowStrategy`]. Both strategies honor the
//! same contract and are cross-checked by the conformance tests.

use serde::{Deserialize, Serialize};

/// Windows at or below this size are cheaper to rescan than to maintain.
pub const RESCAN_MAX_PERIOD: usize = 8;

/// Caller preference for how an aggregate is computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImplementationHint {
    /// Pick based on window size.
    #[default]
    Auto,
    /// Straightforward recomputation over the window contents.
    Reference,
    /// Running accumulators.
    FirstParty,
    /// Fastest available path.
    Optimized,
}

/// Resolved computation strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WindowStrategy {
    /// Recompute every statistic from the ring contents on read. O(period).
    Rescan,
    /// Maintain running sums and monotonic extrema. O(1) amortized.
    Incremental,
}

impl ImplementationHint {
    pub fn resolve(self, period: usize) -> WindowStrategy {
        match self {
            Self::Reference => WindowStrategy::Rescan,
            Self::FirstParty | Self::Optimized => WindowStrategy::Incremental,
            Self::Auto if period <= RESCAN_MAX_PERIOD => WindowStrategy::Rescan,
            Self::Auto => WindowStrategy::Incremental,
        }
    }
}
