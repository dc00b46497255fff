//! Domain types for barstream.

pub mod bar;

pub use bar::{Bar, Ohlc, Ohlcv};

/// Symbol type alias
pub type Symbol = String;
