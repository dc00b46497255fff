//! Serializable run configuration, loaded from TOML.
//!
//! ```toml
//! parallel = true
//! master_seed = 42
//! output_dir = "out"
//!
//! [classifier]
//! neighbors_count = 8
//! lookback_period = 2000
//!
//! [[symbols]]
//! source = "csv"
//! symbol = "SPY"
//! path = "data/spy.csv"
//!
//! [[symbols]]
//! source = "synthetic"
//! symbol = "SYN"
//! bars = 5000
//! ```

use barstream_core::error::ConfigError;
use barstream_core::params::{LorentzianParams, ParameterSet};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Unique identifier for a run (content-addressable hash).
pub type RunId = String;

#[derive(Debug, Error)]
pub enum ConfigFileError {
    #[error("failed to read config '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("failed to serialize config: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("classifier parameters: {0}")]
    Invalid(#[from] ConfigError),

    #[error("no symbols configured")]
    EmptyUniverse,

    #[error("symbol '{0}' is configured more than once")]
    DuplicateSymbol(String),

    #[error("synthetic symbol '{0}' requests zero bars")]
    EmptySynthetic(String),

    #[error("symbol '{0}' is not usable as a file name")]
    InvalidSymbol(String),
}

/// Where a symbol's bars come from.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "source", rename_all = "snake_case")]
pub enum SymbolSource {
    /// CSV file with columns `date,open,high,low,close,volume`.
    Csv { symbol: String, path: PathBuf },
    /// Deterministic random walk seeded from the master seed and symbol.
    Synthetic { symbol: String, bars: usize },
}

impl SymbolSource {
    pub fn symbol(&self) -> &str {
        match self {
            SymbolSource::Csv { symbol, .. } | SymbolSource::Synthetic { symbol, .. } => symbol,
        }
    }
}

/// Everything needed to reproduce a classification run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct RunConfig {
    #[serde(default)]
    pub classifier: LorentzianParams,

    pub symbols: Vec<SymbolSource>,

    /// One worker per symbol on the rayon pool.
    #[serde(default = "default_parallel")]
    pub parallel: bool,

    #[serde(default = "default_master_seed")]
    pub master_seed: u64,

    /// Excluded from `run_id`: where results land does not change them.
    #[serde(default, skip_serializing)]
    pub output_dir: Option<PathBuf>,
}

fn default_parallel() -> bool {
    true
}

fn default_master_seed() -> u64 {
    42
}

/// Symbols name export files (`{symbol}_signals.csv`), so they may not
/// contain path separators or be a relative path component.
fn is_file_safe(symbol: &str) -> bool {
    !symbol.is_empty()
        && symbol != "."
        && symbol != ".."
        && !symbol
            .chars()
            .any(|c| c == '/' || c == '\\' || c == ':' || c.is_control())
}

impl RunConfig {
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigFileError> {
        Ok(toml::from_str(s)?)
    }

    /// Read, parse and validate a TOML config file.
    pub fn load(path: &Path) -> Result<Self, ConfigFileError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigFileError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigFileError> {
        self.classifier.validate()?;
        if self.symbols.is_empty() {
            return Err(ConfigFileError::EmptyUniverse);
        }
        let mut seen = HashSet::new();
        for source in &self.symbols {
            if !is_file_safe(source.symbol()) {
                return Err(ConfigFileError::InvalidSymbol(source.symbol().to_string()));
            }
            if !seen.insert(source.symbol()) {
                return Err(ConfigFileError::DuplicateSymbol(source.symbol().to_string()));
            }
            if let SymbolSource::Synthetic { symbol, bars: 0 } = source {
                return Err(ConfigFileError::EmptySynthetic(symbol.clone()));
            }
        }
        Ok(())
    }

    /// Computes a deterministic hash ID for this configuration.
    ///
    /// BLAKE3 over the canonical JSON serialization: identical configs share
    /// a RunId.
    pub fn run_id(&self) -> Result<RunId, ConfigFileError> {
        let mut hasher = blake3::Hasher::new();
        serde_json::to_writer(&mut hasher, self)?;
        Ok(hasher.finalize().to_hex().to_string())
    }
}
