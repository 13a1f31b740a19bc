//! The set of instruments a simulation walks over.

use super::loader::{load_series, series_path};
use crate::types::{DailySnapshot, PriceSeries};
use crate::{Error, Result};
use std::collections::HashSet;
use std::path::Path;
use tracing::info;

/// Price series for every instrument in the run, in ticker order.
#[derive(Debug, Clone)]
pub struct PriceUniverse {
    series: Vec<PriceSeries>,
}

impl PriceUniverse {
    /// Group already-loaded series. Tickers must be unique.
    pub fn new(series: Vec<PriceSeries>) -> Result<Self> {
        if series.is_empty() {
            return Err(Error::InsufficientData(
                "Universe needs at least one instrument".to_string(),
            ));
        }

        let mut seen = HashSet::new();
        for s in &series {
            if !seen.insert(s.ticker()) {
                return Err(Error::Config(format!("Duplicate ticker: {}", s.ticker())));
            }
        }

        Ok(Self { series })
    }

    /// Tickers in load order.
    pub fn tickers(&self) -> Vec<String> {
        self.series.iter().map(|s| s.ticker().to_string()).collect()
    }

    /// Series for a ticker.
    pub fn series(&self, ticker: &str) -> Option<&PriceSeries> {
        self.series.iter().find(|s| s.ticker() == ticker)
    }

    pub fn iter(&self) -> impl Iterator<Item = &PriceSeries> {
        self.series.iter()
    }

    /// Number of instruments.
    pub fn len(&self) -> usize {
        self.series.len()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }

    /// Trading days in the longest series.
    pub fn days(&self) -> usize {
        self.iter().map(PriceSeries::len).max().unwrap_or(0)
    }

    /// Verify every series has the same length.
    ///
    /// Returns the common length. Otherwise reports the first shortest
    /// series and the first day it cannot supply.
    pub fn check_alignment(&self) -> Result<usize> {
        let expected = self.days();
        let shortest = self.iter().min_by_key(|s| s.len());

        match shortest {
            Some(s) if s.len() < expected => Err(Error::RunAlignment {
                ticker: s.ticker().to_string(),
                day: s.len(),
                expected_days: expected,
            }),
            _ => Ok(expected),
        }
    }

    /// Build the price snapshot for a day offset.
    pub fn snapshot(&self, day: usize) -> Result<DailySnapshot> {
        let mut snapshot = DailySnapshot::new();
        for s in &self.series {
            let record = s.get(day).ok_or_else(|| Error::RunAlignment {
                ticker: s.ticker().to_string(),
                day,
                expected_days: self.days(),
            })?;
            snapshot.insert(s.ticker(), *record);
        }
        Ok(snapshot)
    }
}

/// Load `<dir>/<TICKER>.csv` for every ticker, failing on the first error.
pub fn load_universe(dir: impl AsRef<Path>, tickers: &[String]) -> Result<PriceUniverse> {
    let dir = dir.as_ref();
    let series = tickers
        .iter()
        .map(|ticker| load_series(series_path(dir, ticker), ticker))
        .collect::<Result<Vec<_>>>()?;

    let universe = PriceUniverse::new(series)?;
    info!(
        "Loaded {} instruments from {} ({} days in longest series)",
        universe.len(),
        dir.display(),
        universe.days()
    );
    Ok(universe)
}
