//! Per-symbol classification pool.
//!
//! Each symbol gets its own classifier instance; instances share nothing, so
//! the parallel path (`rayon`) and the sequential path produce identical
//! results in the same order.

use crate::config::{ConfigFileError, RunConfig, SymbolSource};
use crate::data_loader::{load_csv_bars, LoadError};
use crate::profiling::ProfileScope;
use crate::synthetic::synthetic_bars;
use barstream_core::domain::Bar;
use barstream_core::error::IndicatorError;
use barstream_core::indicator::{FlatOutput, StreamingIndicator};
use barstream_core::lorentzian::{ClassificationResult, LorentzianClassifier, Signal};
use barstream_core::params::LorentzianParams;
use chrono::NaiveDate;
use rayon::prelude::*;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info};

#[derive(Debug, Error)]
pub enum RunError {
    #[error("{symbol}: {source}")]
    Indicator {
        symbol: String,
        #[source]
        source: IndicatorError,
    },

    #[error("{symbol}: {source}")]
    Load {
        symbol: String,
        #[source]
        source: LoadError,
    },

    #[error(transparent)]
    Config(#[from] ConfigFileError),
}

/// One symbol's ordered bars.
#[derive(Debug, Clone, PartialEq)]
pub struct SymbolSeries {
    pub symbol: String,
    pub bars: Vec<Bar>,
}

/// Signal counts over the ready portion of a series.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct SignalSummary {
    pub long: usize,
    pub short: usize,
    pub neutral: usize,
    /// Mean confidence over ready bars; 0 when none are ready.
    pub mean_confidence: f64,
}

impl SignalSummary {
    fn from_ready(signals: &[ClassificationResult]) -> Self {
        let mut s = Self::default();
        for r in signals {
            match r.signal {
                Signal::Long => s.long += 1,
                Signal::Short => s.short += 1,
                Signal::Neutral => s.neutral += 1,
            }
            s.mean_confidence += r.confidence;
        }
        if !signals.is_empty() {
            s.mean_confidence /= signals.len() as f64;
        }
        s
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesResult {
    pub symbol: String,
    /// Number of bars processed.
    pub bars: usize,
    /// Index of the first bar with a full neighbor vote.
    pub ready_at: Option<usize>,
    #[serde(skip)]
    pub dates: Vec<NaiveDate>,
    #[serde(skip)]
    pub signals: Vec<ClassificationResult>,
    pub summary: SignalSummary,
}

/// Resolve every configured source into bars.
pub fn load_universe(config: &RunConfig) -> Result<Vec<SymbolSeries>, RunError> {
    config
        .symbols
        .iter()
        .map(|source| {
            let symbol = source.symbol().to_string();
            let bars = match source {
                SymbolSource::Csv { path, .. } => {
                    load_csv_bars(path, &symbol).map_err(|source| RunError::Load {
                        symbol: symbol.clone(),
                        source,
                    })?
                }
                SymbolSource::Synthetic { bars, .. } => {
                    synthetic_bars(&symbol, *bars, config.master_seed)
                }
            };
            Ok(SymbolSeries { symbol, bars })
        })
        .collect()
}

/// Classify one series with a fresh classifier.
pub fn classify_series(
    params: &LorentzianParams,
    series: &SymbolSeries,
) -> Result<SeriesResult, RunError> {
    let _scope = ProfileScope::new("classify_series", series.symbol.as_str());
    let wrap = |source| RunError::Indicator {
        symbol: series.symbol.clone(),
        source,
    };

    let mut classifier = LorentzianClassifier::new(*params).map_err(wrap)?;
    let mut signals = vec![ClassificationResult::warming(); series.bars.len()];
    classifier
        .on_bar_batch(&series.bars, Some(&mut signals[..]))
        .map_err(wrap)?;

    let lookback = classifier.lookback();
    let ready_at = (lookback >= 1 && series.bars.len() >= lookback).then(|| lookback - 1);
    let summary = SignalSummary::from_ready(ready_at.map_or(&[][..], |i| &signals[i..]));

    Ok(SeriesResult {
        symbol: series.symbol.clone(),
        bars: series.bars.len(),
        ready_at,
        dates: series.bars.iter().map(|b| b.date).collect(),
        signals,
        summary,
    })
}

/// Run one classifier per symbol, in parallel when `config.parallel` is set.
///
/// Results come back in input order either way.
pub fn run_universe(
    config: &RunConfig,
    series: &[SymbolSeries],
) -> Result<Vec<SeriesResult>, RunError> {
    debug!(
        symbols = series.len(),
        parallel = config.parallel,
        "starting classification pool"
    );
    let results = if config.parallel {
        series
            .par_iter()
            .map(|s| classify_series(&config.classifier, s))
            .collect::<Result<Vec<_>, _>>()?
    } else {
        series
            .iter()
            .map(|s| classify_series(&config.classifier, s))
            .collect::<Result<Vec<_>, _>>()?
    };
    debug!(symbols = results.len(), "classification pool finished");
    Ok(results)
}

/// Validate, load and classify everything a config names.
pub fn run(config: &RunConfig) -> Result<Vec<SeriesResult>, RunError> {
    config.validate()?;
    let series = load_universe(config)?;
    let results = run_universe(config, &series)?;
    for r in &results {
        info!(
            symbol = %r.symbol,
            bars = r.bars,
            long = r.summary.long,
            short = r.summary.short,
            neutral = r.summary.neutral,
            "classified"
        );
    }
    Ok(results)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::synthetic::synthetic_bars;

    fn small_params() -> LorentzianParams {
        let mut p = LorentzianParams {
            lookback_period: 100,
            neighbors_count: 5,
            label_lookahead: 3,
            ..LorentzianParams::default()
        };
        p.features.normalization_window = 30;
        p
    }

    fn series(symbol: &str, n: usize) -> SymbolSeries {
        SymbolSeries {
            symbol: symbol.to_string(),
            bars: synthetic_bars(symbol, n, 9),
        }
    }

    #[test]
    fn ready_at_matches_lookback() {
        let params = small_params();
        let r = classify_series(&params, &series("AAA", 200)).unwrap();
        assert_eq!(r.ready_at, Some(params.lookback() - 1));
        assert_eq!(r.signals.len(), 200);
        let ready = r.summary.long + r.summary.short + r.summary.neutral;
        assert_eq!(ready, 200 - params.lookback() + 1);
        assert!(r.signals[..params.lookback() - 1]
            .iter()
            .all(|s| s.votes.total() == 0));
    }

    #[test]
    fn short_series_never_ready() {
        let r = classify_series(&small_params(), &series("AAA", 10)).unwrap();
        assert_eq!(r.ready_at, None);
        assert_eq!(r.summary, SignalSummary::default());
    }
}
