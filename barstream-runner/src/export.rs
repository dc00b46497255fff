//! Run artifacts: a JSON manifest plus one signal tape per symbol.
//!
//! Every manifest carries `schema_version`; newer versions are rejected on
//! load.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

use crate::config::{RunConfig, RunId};
use crate::runner::{SeriesResult, SignalSummary};

pub const SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SymbolManifest {
    pub symbol: String,
    pub bars: usize,
    pub ready_at: Option<usize>,
    pub long: usize,
    pub short: usize,
    pub neutral: usize,
    pub mean_confidence: f64,
}

impl SymbolManifest {
    fn from_result(r: &SeriesResult) -> Self {
        let SignalSummary {
            long,
            short,
            neutral,
            mean_confidence,
        } = r.summary;
        Self {
            symbol: r.symbol.clone(),
            bars: r.bars,
            ready_at: r.ready_at,
            long,
            short,
            neutral,
            mean_confidence,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunManifest {
    pub schema_version: u32,
    pub run_id: RunId,
    pub config: RunConfig,
    pub symbols: Vec<SymbolManifest>,
}

impl RunManifest {
    pub fn new(run_id: RunId, config: &RunConfig, results: &[SeriesResult]) -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            run_id,
            config: config.clone(),
            symbols: results.iter().map(SymbolManifest::from_result).collect(),
        }
    }
}

pub fn export_manifest_json(manifest: &RunManifest) -> Result<String> {
    serde_json::to_string_pretty(manifest).context("failed to serialize run manifest")
}

pub fn import_manifest_json(json: &str) -> Result<RunManifest> {
    let manifest: RunManifest =
        serde_json::from_str(json).context("failed to deserialize run manifest")?;
    if manifest.schema_version > SCHEMA_VERSION {
        bail!(
            "unsupported schema version {} (max supported: {})",
            manifest.schema_version,
            SCHEMA_VERSION
        );
    }
    Ok(manifest)
}

/// Per-bar signal tape.
///
/// Columns: bar_index, date, signal, confidence, bullish, bearish, neutral.
/// Warm-up bars are included with a zero tally.
pub fn export_signals_csv(result: &SeriesResult) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record([
        "bar_index",
        "date",
        "signal",
        "confidence",
        "bullish",
        "bearish",
        "neutral",
    ])?;

    for (i, s) in result.signals.iter().enumerate() {
        let date = result
            .dates
            .get(i)
            .map(|d| d.to_string())
            .unwrap_or_default();
        wtr.write_record([
            &i.to_string(),
            &date,
            &s.signal.as_i8().to_string(),
            &format!("{:.4}", s.confidence),
            &s.votes.bullish.to_string(),
            &s.votes.bearish.to_string(),
            &s.votes.neutral.to_string(),
        ])?;
    }

    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

/// Write `manifest.json` and `{symbol}_signals.csv` files into
/// `{output_dir}/{run_id}/`. Returns the run directory.
///
/// The config is validated first, so every symbol is a plain file name.
pub fn save_artifacts(
    config: &RunConfig,
    results: &[SeriesResult],
    output_dir: &Path,
) -> Result<PathBuf> {
    config.validate()?;
    let run_id = config.run_id()?;
    let run_dir = output_dir.join(&run_id);
    std::fs::create_dir_all(&run_dir)
        .with_context(|| format!("failed to create artifact dir: {}", run_dir.display()))?;

    let manifest = RunManifest::new(run_id, config, results);
    std::fs::write(run_dir.join("manifest.json"), export_manifest_json(&manifest)?)?;

    for r in results {
        let path = run_dir.join(format!("{}_signals.csv", r.symbol));
        std::fs::write(&path, export_signals_csv(r)?)
            .with_context(|| format!("failed to write {}", path.display()))?;
    }

    tracing::info!(dir = %run_dir.display(), symbols = results.len(), "artifacts saved");
    Ok(run_dir)
}

pub fn load_manifest(dir: &Path) -> Result<RunManifest> {
    let path = dir.join("manifest.json");
    let json = std::fs::read_to_string(&path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    import_manifest_json(&json)
}

#[cfg(test)]
mod tests {
    use super::*;
    use barstream_core::lorentzian::{ClassificationResult, Signal, VoteTally};
    use chrono::NaiveDate;

    fn result() -> SeriesResult {
        let d0 = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        SeriesResult {
            symbol: "SPY".into(),
            bars: 2,
            ready_at: Some(1),
            dates: vec![d0, d0.succ_opt().unwrap()],
            signals: vec![
                ClassificationResult::neutral(),
                ClassificationResult {
                    signal: Signal::Short,
                    confidence: 0.75,
                    votes: VoteTally {
                        bullish: 1,
                        bearish: 3,
                        neutral: 0,
                    },
                },
            ],
            summary: SignalSummary {
                long: 0,
                short: 1,
                neutral: 0,
                mean_confidence: 0.75,
            },
        }
    }

    #[test]
    fn signals_csv_rows() {
        let csv = export_signals_csv(&result()).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(
            lines[0],
            "bar_index,date,signal,confidence,bullish,bearish,neutral"
        );
        assert_eq!(lines[1], "0,2024-01-02,0,0.0000,0,0,0");
        assert_eq!(lines[2], "1,2024-01-03,-1,0.7500,1,3,0");
    }

    #[test]
    fn newer_schema_rejected() {
        let config = RunConfig::from_toml_str(
            "[[symbols]]\nsource = \"synthetic\"\nsymbol = \"SPY\"\nbars = 2\n",
        )
        .unwrap();
        let mut manifest = RunManifest::new("abc".into(), &config, &[result()]);
        let json = export_manifest_json(&manifest).unwrap();
        assert_eq!(import_manifest_json(&json).unwrap(), manifest);

        manifest.schema_version = SCHEMA_VERSION + 1;
        let json = export_manifest_json(&manifest).unwrap();
        assert!(import_manifest_json(&json).is_err());
    }
}
