//! End-to-end: config file -> bars -> classifier pool -> artifacts.

use std::io::Write;
use std::path::Path;

use barstream_core::domain::Bar;
use barstream_runner::{
    load_manifest, load_universe, run, run_universe, save_artifacts, synthetic_bars, RunConfig,
    SymbolSeries, SCHEMA_VERSION,
};
use proptest::prelude::*;

fn write_csv(path: &Path, bars: &[Bar]) {
    let mut f = std::fs::File::create(path).unwrap();
    writeln!(f, "date,open,high,low,close,volume").unwrap();
    for b in bars {
        writeln!(
            f,
            "{},{},{},{},{},{}",
            b.date, b.open, b.high, b.low, b.close, b.volume
        )
        .unwrap();
    }
}

fn config_text(csv_path: &Path, parallel: bool) -> String {
    format!(
        r#"
parallel = {parallel}
master_seed = 11

[classifier]
lookback_period = 200
neighbors_count = 6
label_lookahead = 3

[classifier.features]
normalization_window = 40

[[symbols]]
source = "csv"
symbol = "CSV1"
path = "{}"

[[symbols]]
source = "synthetic"
symbol = "SYN1"
bars = 400

[[symbols]]
source = "synthetic"
symbol = "SYN2"
bars = 300
"#,
        csv_path.display().to_string().replace('\\', "/")
    )
}

fn setup(parallel: bool) -> (tempfile::TempDir, RunConfig) {
    let dir = tempfile::tempdir().unwrap();
    let csv_path = dir.path().join("csv1.csv");
    write_csv(&csv_path, &synthetic_bars("CSV1", 350, 3));

    let config_path = dir.path().join("run.toml");
    std::fs::write(&config_path, config_text(&csv_path, parallel)).unwrap();
    let config = RunConfig::load(&config_path).unwrap();
    (dir, config)
}

#[test]
fn csv_source_loads_what_was_written() {
    let (_dir, config) = setup(false);
    let universe = load_universe(&config).unwrap();
    let written = synthetic_bars("CSV1", 350, 3);

    assert_eq!(universe.len(), 3);
    assert_eq!(universe[0].symbol, "CSV1");
    assert_eq!(universe[0].bars.len(), written.len());
    for (a, b) in universe[0].bars.iter().zip(&written) {
        assert_eq!(a.date, b.date);
        assert_eq!(a.close, b.close);
    }
    assert_eq!(universe[1].bars.len(), 400);
    assert_eq!(universe[2].bars.len(), 300);
}

#[test]
fn parallel_and_sequential_pools_agree() {
    let (_dir, mut config) = setup(true);
    let universe = load_universe(&config).unwrap();

    let parallel = run_universe(&config, &universe).unwrap();
    config.parallel = false;
    let sequential = run_universe(&config, &universe).unwrap();

    assert_eq!(parallel, sequential);
    let symbols: Vec<&str> = parallel.iter().map(|r| r.symbol.as_str()).collect();
    assert_eq!(symbols, ["CSV1", "SYN1", "SYN2"]);
}

#[test]
fn repeated_runs_are_identical() {
    let (_dir, config) = setup(true);
    assert_eq!(run(&config).unwrap(), run(&config).unwrap());
}

#[test]
fn artifacts_round_trip() {
    let (dir, config) = setup(true);
    let results = run(&config).unwrap();
    let out = dir.path().join("out");

    let run_dir = save_artifacts(&config, &results, &out).unwrap();
    assert_eq!(run_dir, out.join(config.run_id().unwrap()));

    let manifest = load_manifest(&run_dir).unwrap();
    assert_eq!(manifest.schema_version, SCHEMA_VERSION);
    assert_eq!(manifest.symbols.len(), 3);
    assert_eq!(manifest.symbols[1].bars, 400);

    for r in &results {
        let csv = std::fs::read_to_string(run_dir.join(format!("{}_signals.csv", r.symbol))).unwrap();
        // header + one row per bar
        assert_eq!(csv.lines().count(), r.bars + 1);
    }
}

#[test]
fn missing_csv_is_a_load_error() {
    let dir = tempfile::tempdir().unwrap();
    let config_path = dir.path().join("run.toml");
    std::fs::write(&config_path, config_text(&dir.path().join("absent.csv"), false)).unwrap();
    let config = RunConfig::load(&config_path).unwrap();

    let err = load_universe(&config).unwrap_err();
    assert!(err.to_string().starts_with("CSV1:"), "{err}");
}

#[test]
fn artifacts_refuse_symbols_outside_run_dir() {
    let (dir, config) = setup(false);
    let mut results = run(&config).unwrap();
    let mut bad = config.clone();
    if let barstream_runner::SymbolSource::Synthetic { symbol, .. } = &mut bad.symbols[1] {
        *symbol = "../escaped".to_string();
    }
    results[1].symbol = "../escaped".to_string();

    let out = dir.path().join("out");
    assert!(save_artifacts(&bad, &results, &out).is_err());
    assert!(!out.join("escaped_signals.csv").exists());
    assert!(!dir.path().join("escaped_signals.csv").exists());
}

// ── Pool equivalence (proptest) ──────────────────────────────────────

fn pool_config(parallel: bool) -> RunConfig {
    RunConfig::from_toml_str(&format!(
        r#"
parallel = {parallel}

[classifier]
lookback_period = 60
neighbors_count = 4
label_lookahead = 2

[classifier.features]
rsi_period = 5
cci_period = 5
adx_period = 4
normalization_window = 20

[[symbols]]
source = "synthetic"
symbol = "UNUSED"
bars = 1
"#
    ))
    .unwrap()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    /// The rayon pool and the sequential loop return the same results in the
    /// same order for any seed and universe size.
    #[test]
    fn parallel_pool_matches_sequential(
        seed in any::<u64>(),
        symbols in 1usize..6,
        bars in 1usize..150,
    ) {
        let series: Vec<SymbolSeries> = (0..symbols)
            .map(|i| {
                let symbol = format!("S{i}");
                let bars = synthetic_bars(&symbol, bars + i * 7, seed);
                SymbolSeries { symbol, bars }
            })
            .collect();

        let parallel = run_universe(&pool_config(true), &series).unwrap();
        let sequential = run_universe(&pool_config(false), &series).unwrap();
        prop_assert_eq!(parallel.len(), symbols);
        prop_assert_eq!(parallel, sequential);
    }
}
