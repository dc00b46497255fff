//! Barstream CLI: classify a universe, profile indicators, check configs.
//!
//! Commands:
//! - `classify` runs the Lorentzian classifier over every symbol in a TOML config
//! - `profile` times per-bar updates of one indicator over synthetic bars
//! - `check-config` validates a config and prints its run id

use anyhow::{bail, Context, Result};
use barstream_core::domain::Bar;
use barstream_core::indicators::{Adx, Atr, Bollinger, Cci, Ema, Macd, Rsi, Sma};
use barstream_core::params::{BollingerParams, LorentzianParams, MacdParams};
use barstream_core::{LorentzianClassifier, StreamingIndicator};
use barstream_runner::{
    profile_per_bar, run, save_artifacts, synthetic_bars, LatencyStats, RunConfig, SeriesResult,
};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "barstream",
    about = "Barstream: streaming indicators and a k-NN bar classifier"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Classify every symbol named in a TOML run config.
    Classify {
        /// Path to a TOML run config.
        #[arg(long)]
        config: PathBuf,

        /// Output directory for artifacts. Overrides `output_dir` in the config.
        #[arg(long)]
        output_dir: Option<PathBuf>,
    },
    /// Time per-bar updates of one indicator over a synthetic series.
    Profile {
        #[arg(long, value_enum, default_value_t = IndicatorKind::Classifier)]
        indicator: IndicatorKind,

        /// Number of synthetic bars.
        #[arg(long, default_value_t = 10_000)]
        bars: usize,

        /// Period for single-period indicators.
        #[arg(long, default_value_t = 20)]
        period: usize,

        /// Fail if mean per-bar latency exceeds this many microseconds.
        #[arg(long)]
        budget_us: Option<u64>,

        #[arg(long, default_value_t = 42)]
        seed: u64,
    },
    /// Validate a run config and print its run id.
    CheckConfig {
        #[arg(long)]
        config: PathBuf,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum IndicatorKind {
    Sma,
    Ema,
    Rsi,
    Atr,
    Adx,
    Cci,
    Macd,
    Bollinger,
    Classifier,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Classify { config, output_dir } => run_classify(config, output_dir),
        Commands::Profile {
            indicator,
            bars,
            period,
            budget_us,
            seed,
        } => run_profile(indicator, bars, period, budget_us, seed),
        Commands::CheckConfig { config } => {
            let config = RunConfig::load(&config)
                .with_context(|| format!("invalid config: {}", config.display()))?;
            println!("{}", config.run_id()?);
            Ok(())
        }
    }
}

fn run_classify(config_path: PathBuf, output_dir: Option<PathBuf>) -> Result<()> {
    let config = RunConfig::load(&config_path)
        .with_context(|| format!("invalid config: {}", config_path.display()))?;
    let results = run(&config)?;

    print_summary(&results);

    if let Some(dir) = output_dir.or_else(|| config.output_dir.clone()) {
        let run_dir = save_artifacts(&config, &results, &dir)?;
        println!("Artifacts saved to: {}", run_dir.display());
    }
    Ok(())
}

fn print_summary(results: &[SeriesResult]) {
    println!(
        "{:<10} {:>7} {:>9} {:>6} {:>6} {:>8} {:>10}",
        "symbol", "bars", "ready_at", "long", "short", "neutral", "mean_conf"
    );
    for r in results {
        let ready = r
            .ready_at
            .map(|i| i.to_string())
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{:<10} {:>7} {:>9} {:>6} {:>6} {:>8} {:>10.3}",
            r.symbol,
            r.bars,
            ready,
            r.summary.long,
            r.summary.short,
            r.summary.neutral,
            r.summary.mean_confidence
        );
    }
}

fn run_profile(
    kind: IndicatorKind,
    n: usize,
    period: usize,
    budget_us: Option<u64>,
    seed: u64,
) -> Result<()> {
    if n == 0 {
        bail!("--bars must be positive");
    }
    let bars = synthetic_bars("PROFILE", n, seed);

    let stats = match kind {
        IndicatorKind::Sma => profile(Sma::with_period(period)?, &bars)?,
        IndicatorKind::Ema => profile(Ema::with_period(period)?, &bars)?,
        IndicatorKind::Rsi => profile(Rsi::with_period(period)?, &bars)?,
        IndicatorKind::Atr => profile(Atr::with_period(period)?, &bars)?,
        IndicatorKind::Adx => profile(Adx::with_period(period)?, &bars)?,
        IndicatorKind::Cci => profile(Cci::with_period(period)?, &bars)?,
        IndicatorKind::Macd => profile(Macd::new(MacdParams::default())?, &bars)?,
        IndicatorKind::Bollinger => profile(
            Bollinger::new(BollingerParams {
                period,
                ..BollingerParams::default()
            })?,
            &bars,
        )?,
        IndicatorKind::Classifier => {
            profile(LorentzianClassifier::new(LorentzianParams::default())?, &bars)?
        }
    };

    println!("{}", serde_json::to_string_pretty(&stats)?);

    if let Some(limit) = budget_us {
        if !stats.within_budget(Duration::from_micros(limit)) {
            bail!(
                "per-bar latency over budget: mean {:?}, p99 {:?}, limit {limit}us",
                stats.mean,
                stats.p99
            );
        }
    }
    Ok(())
}

fn profile<I: StreamingIndicator>(mut indicator: I, bars: &[Bar]) -> Result<LatencyStats> {
    tracing::info!(indicator = indicator.name(), bars = bars.len(), "profiling");
    Ok(profile_per_bar(&mut indicator, bars)?)
}
