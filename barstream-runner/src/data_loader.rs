//! CSV bar loading.
//!
//! Expected header: `date,open,high,low,close,volume` with ISO dates
//! (`YYYY-MM-DD`). Rows must be strictly increasing by date; a row dated at or
//! before its predecessor fails the load. Rows that fail the OHLC sanity check
//! are skipped with a warning, so one bad print does not abort a long series.

use barstream_core::domain::Bar;
use chrono::NaiveDate;
use serde::Deserialize;
use std::io::Read;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

/// Errors from the data loading layer.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to open '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{origin}: {source}")]
    Csv {
        origin: String,
        #[source]
        source: csv::Error,
    },

    #[error("{origin} row {row}: date {date} is not after previous date {previous}")]
    OutOfOrder {
        origin: String,
        row: usize,
        date: NaiveDate,
        previous: NaiveDate,
    },

    #[error("{origin}: no usable bars")]
    Empty { origin: String },
}

#[derive(Debug, Deserialize)]
struct CsvRow {
    date: NaiveDate,
    open: f64,
    high: f64,
    low: f64,
    close: f64,
    volume: u64,
}

/// Load one symbol's bars from a CSV file.
pub fn load_csv_bars(path: &Path, symbol: &str) -> Result<Vec<Bar>, LoadError> {
    let file = std::fs::File::open(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    read_csv_bars(file, symbol, &path.display().to_string())
}

/// Parse bars from any CSV reader. `origin` names the source in errors.
pub fn read_csv_bars<R: Read>(reader: R, symbol: &str, origin: &str) -> Result<Vec<Bar>, LoadError> {
    let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
    let mut bars: Vec<Bar> = Vec::new();
    let mut skipped = 0usize;

    for (i, row) in rdr.deserialize::<CsvRow>().enumerate() {
        // Header is row 1.
        let row_no = i + 2;
        let row = row.map_err(|source| LoadError::Csv {
            origin: origin.to_string(),
            source,
        })?;

        if let Some(prev) = bars.last() {
            if row.date <= prev.date {
                return Err(LoadError::OutOfOrder {
                    origin: origin.to_string(),
                    row: row_no,
                    date: row.date,
                    previous: prev.date,
                });
            }
        }

        let bar = Bar {
            symbol: symbol.to_string(),
            date: row.date,
            open: row.open,
            high: row.high,
            low: row.low,
            close: row.close,
            volume: row.volume,
        };
        if !bar.is_sane() {
            warn!(symbol, row = row_no, date = %bar.date, "skipping bar that fails OHLC sanity check");
            skipped += 1;
            continue;
        }
        bars.push(bar);
    }

    if bars.is_empty() {
        return Err(LoadError::Empty {
            origin: origin.to_string(),
        });
    }
    debug!(symbol, bars = bars.len(), skipped, "loaded CSV bars");
    Ok(bars)
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "date,open,high,low,close,volume\n";

    #[test]
    fn parses_rows_in_order() {
        let csv = format!(
            "{HEADER}2024-01-02,100,102,99,101,1000\n2024-01-03,101,103,100,102.5,1200\n"
        );
        let bars = read_csv_bars(csv.as_bytes(), "SPY", "inline").unwrap();
        assert_eq!(bars.len(), 2);
        assert_eq!(bars[1].close, 102.5);
        assert_eq!(bars[0].symbol, "SPY");
        assert_eq!(bars[1].date, NaiveDate::from_ymd_opt(2024, 1, 3).unwrap());
    }

    #[test]
    fn rejects_out_of_order_dates() {
        let csv = format!(
            "{HEADER}2024-01-03,100,102,99,101,1000\n2024-01-02,101,103,100,102,1200\n"
        );
        let err = read_csv_bars(csv.as_bytes(), "SPY", "inline").unwrap_err();
        assert!(matches!(err, LoadError::OutOfOrder { row: 3, .. }), "{err}");
    }

    #[test]
    fn rejects_duplicate_dates() {
        let csv = format!(
            "{HEADER}2024-01-02,100,102,99,101,1000\n2024-01-02,101,103,100,102,1200\n"
        );
        assert!(matches!(
            read_csv_bars(csv.as_bytes(), "SPY", "inline"),
            Err(LoadError::OutOfOrder { .. })
        ));
    }

    #[test]
    fn skips_insane_rows() {
        // high < low on the middle row
        let csv = format!(
            "{HEADER}2024-01-02,100,102,99,101,1000\n2024-01-03,100,98,99,99,1000\n2024-01-04,101,103,100,102,1200\n"
        );
        let bars = read_csv_bars(csv.as_bytes(), "SPY", "inline").unwrap();
        assert_eq!(bars.len(), 2);
    }

    #[test]
    fn malformed_row_is_a_csv_error() {
        let csv = format!("{HEADER}2024-01-02,abc,102,99,101,1000\n");
        assert!(matches!(
            read_csv_bars(csv.as_bytes(), "SPY", "inline"),
            Err(LoadError::Csv { .. })
        ));
    }

    #[test]
    fn header_only_is_empty() {
        assert!(matches!(
            read_csv_bars(HEADER.as_bytes(), "SPY", "inline"),
            Err(LoadError::Empty { .. })
        ));
    }
}
