//! Per-ticker CSV price series loader.

use crate::types::{PriceRecord, PriceSeries};
use crate::{Error, Result};
use csv::{ReaderBuilder, StringRecord, Trim};
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::{debug, info};

/// Column names in file order.
pub const FIELD_NAMES: [&str; 5] = ["date", "open", "high", "low", "close"];

/// Conventional location of a ticker's price file: `<dir>/<TICKER>.csv`.
pub fn series_path(dir: impl AsRef<Path>, ticker: &str) -> PathBuf {
    dir.as_ref().join(format!("{ticker}.csv"))
}

/// Load a ticker's price series from a file on disk.
///
/// Fails with `FileAccess` if the file cannot be opened, `Parse` on the
/// first malformed field and `EmptySeries` if the file holds no records.
pub fn load_series(path: impl AsRef<Path>, ticker: &str) -> Result<PriceSeries> {
    let path = path.as_ref();
    info!("Loading {} from {}", ticker, path.display());

    let file = File::open(path).map_err(|source| Error::FileAccess {
        path: path.to_path_buf(),
        source,
    })?;

    parse_series(ticker, file)
}

/// Parse a price series from any reader.
///
/// Every line is a data row; there is no header.
pub fn parse_series<R: Read>(ticker: &str, reader: R) -> Result<PriceSeries> {
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(reader);

    let mut records = Vec::new();
    let mut row = StringRecord::new();

    loop {
        let more = reader.read_record(&mut row).map_err(|source| Error::Csv {
            ticker: ticker.to_string(),
            source,
        })?;
        if !more {
            break;
        }

        let line = row.position().map(|p| p.line()).unwrap_or(0);
        records.push(parse_record(ticker, line, &row)?);
    }

    debug!("Parsed {} records for {}", records.len(), ticker);
    PriceSeries::new(ticker, records)
}

fn parse_record(ticker: &str, line: u64, row: &StringRecord) -> Result<PriceRecord> {
    if row.len() != FIELD_NAMES.len() {
        return Err(Error::Parse {
            ticker: ticker.to_string(),
            line,
            field: "record",
            value: row.iter().collect::<Vec<_>>().join(","),
        });
    }

    Ok(PriceRecord {
        date: parse_field(ticker, line, row, 0)?,
        open: parse_field(ticker, line, row, 1)?,
        high: parse_field(ticker, line, row, 2)?,
        low: parse_field(ticker, line, row, 3)?,
        close: parse_field(ticker, line, row, 4)?,
    })
}

fn parse_field<T: FromStr>(ticker: &str, line: u64, row: &StringRecord, idx: usize) -> Result<T> {
    let raw = row.get(idx).unwrap_or_default();
    raw.parse().map_err(|_| Error::Parse {
        ticker: ticker.to_string(),
        line,
        field: FIELD_NAMES[idx],
        value: raw.to_string(),
    })
}
