//! Barstream runner: turns a run config into per-symbol classifications.
//!
//! This crate builds on `barstream-core` to provide:
//! - TOML run configuration with a content-addressed run id
//! - CSV bar loading and seeded synthetic series
//! - A per-symbol classifier pool (sequential or rayon)
//! - Per-bar latency profiling
//! - JSON/CSV artifact export

pub mod config;
pub mod data_loader;
pub mod export;
pub mod profiling;
pub mod runner;
pub mod synthetic;

pub use config::{ConfigFileError, RunConfig, RunId, SymbolSource};
pub use data_loader::{load_csv_bars, read_csv_bars, LoadError};
pub use export::{load_manifest, save_artifacts, RunManifest, SCHEMA_VERSION};
pub use profiling::{profile_per_bar, LatencyStats, ProfileScope};
pub use runner::{
    classify_series, load_universe, run, run_universe, RunError, SeriesResult, SignalSummary,
    SymbolSeries,
};
pub use synthetic::{synthetic_bars, SeedHierarchy};

#[cfg(test)]
mod send_sync_checks {
    use super::*;

    fn assert_send<T: Send>() {}
    fn assert_sync<T: Sync>() {}

    #[test]
    fn results_are_send_sync() {
        assert_send::<SeriesResult>();
        assert_sync::<SeriesResult>();
        assert_send::<SymbolSeries>();
        assert_sync::<SymbolSeries>();
    }

    #[test]
    fn config_is_send_sync() {
        assert_send::<RunConfig>();
        assert_sync::<RunConfig>();
    }

    #[test]
    fn errors_are_send_sync() {
        assert_send::<RunError>();
        assert_sync::<RunError>();
    }
}
