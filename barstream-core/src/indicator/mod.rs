//! The streaming indicator contract: warm-up, incremental update, batch
//! replay, and reset.

pub mod traits;
pub mod warmup;

pub use traits::{FlatOutput, StreamingIndicator};
pub use warmup::WarmupState;
