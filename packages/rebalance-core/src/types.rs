//! Core data types for the rebalancing backtest.

use crate::{Error, Result};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One daily OHLC price record.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct PriceRecord {
    /// Trading date, either `YYYYMMDD` or seconds since the Unix epoch
    pub date: i64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    /// Closing price, the only field used for valuation
    pub close: f64,
}

impl PriceRecord {
    /// Create a record from its five fields.
    pub fn new(date: i64, open: f64, high: f64, low: f64, close: f64) -> Self {
        Self {
            date,
            open,
            high,
            low,
            close,
        }
    }

    /// Create a record where every price field equals `close`.
    pub fn flat(date: i64, close: f64) -> Self {
        Self::new(date, close, close, close, close)
    }

    /// Interpret the integer date as a calendar date.
    ///
    /// Eight-digit values that form a valid `YYYYMMDD` date are read that
    /// way; anything else is treated as epoch seconds.
    pub fn calendar_date(&self) -> Option<NaiveDate> {
        if (10_000_101..=99_991_231).contains(&self.date) {
            let year = (self.date / 10_000) as i32;
            let month = ((self.date / 100) % 100) as u32;
            let day = (self.date % 100) as u32;
            if let Some(date) = NaiveDate::from_ymd_opt(year, month, day) {
                return Some(date);
            }
        }

        DateTime::<Utc>::from_timestamp(self.date, 0).map(|dt| dt.date_naive())
    }
}

/// Time-ordered price records for one instrument.
///
/// Never empty: both `new` and deserialization reject an empty record
/// list. Order comes from the source file and is not re-checked.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(try_from = "PriceSeriesData")]
pub struct PriceSeries {
    ticker: String,
    records: Vec<PriceRecord>,
}

/// Unchecked wire form of a `PriceSeries`.
#[derive(Deserialize)]
struct PriceSeriesData {
    ticker: String,
    records: Vec<PriceRecord>,
}

impl TryFrom<PriceSeriesData> for PriceSeries {
    type Error = Error;

    fn try_from(data: PriceSeriesData) -> Result<Self> {
        Self::new(&data.ticker, data.records)
    }
}

impl PriceSeries {
    /// Build a series, rejecting an empty record list.
    pub fn new(ticker: &str, records: Vec<PriceRecord>) -> Result<Self> {
        if records.is_empty() {
            return Err(Error::EmptySeries(ticker.to_string()));
        }

        Ok(Self {
            ticker: ticker.to_string(),
            records,
        })
    }

    /// Build a series of flat records from closing prices, dated 1, 2, 3...
    pub fn from_closes(ticker: &str, closes: &[f64]) -> Result<Self> {
        let records = closes
            .iter()
            .enumerate()
            .map(|(i, &close)| PriceRecord::flat(i as i64 + 1, close))
            .collect();
        Self::new(ticker, records)
    }

    pub fn ticker(&self) -> &str {
        &self.ticker
    }

    pub fn records(&self) -> &[PriceRecord] {
        &self.records
    }

    /// Number of trading days in the series.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// False for every series built through `new` or deserialization,
    /// which reject empty record lists.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Record for a day offset, if the series is long enough.
    pub fn get(&self, day: usize) -> Option<&PriceRecord> {
        self.records.get(day)
    }

    pub fn first(&self) -> &PriceRecord {
        &self.records[0]
    }

    pub fn last(&self) -> &PriceRecord {
        &self.records[self.records.len() - 1]
    }
}

/// Quantity held of each instrument, fractional units allowed.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Holdings(BTreeMap<String, f64>);

impl Holdings {
    /// Create empty holdings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Start every ticker at zero units.
    pub fn zeroed(tickers: &[String]) -> Self {
        tickers.iter().map(|t| (t.clone(), 0.0)).collect()
    }

    /// Quantity held, zero if the ticker is not tracked.
    pub fn quantity(&self, ticker: &str) -> f64 {
        self.0.get(ticker).copied().unwrap_or(0.0)
    }

    /// Overwrite the quantity for a ticker.
    pub fn set(&mut self, ticker: &str, quantity: f64) {
        self.0.insert(ticker.to_string(), quantity);
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.0.iter().map(|(t, &q)| (t.as_str(), q))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Every quantity multiplied by `factor`.
    pub fn scaled(&self, factor: f64) -> Self {
        self.iter().map(|(t, q)| (t.to_string(), q * factor)).collect()
    }
}

impl FromIterator<(String, f64)> for Holdings {
    fn from_iter<I: IntoIterator<Item = (String, f64)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Target weight of each instrument. Weights are expected, not required,
/// to sum to 1.0.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Allocation(BTreeMap<String, f64>);

impl Allocation {
    /// Give every ticker the same weight.
    pub fn equal_weight(tickers: &[String]) -> Self {
        if tickers.is_empty() {
            return Self::default();
        }

        let weight = 1.0 / tickers.len() as f64;
        tickers.iter().map(|t| (t.clone(), weight)).collect()
    }

    /// Target weight for a ticker, if allocated.
    pub fn weight(&self, ticker: &str) -> Option<f64> {
        self.0.get(ticker).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.0.iter().map(|(t, &w)| (t.as_str(), w))
    }

    pub fn tickers(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Sum of all target weights.
    pub fn total_weight(&self) -> f64 {
        self.0.values().sum()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(String, f64)> for Allocation {
    fn from_iter<I: IntoIterator<Item = (String, f64)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// One day's price record for every tracked instrument.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DailySnapshot(BTreeMap<String, PriceRecord>);

impl DailySnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, ticker: &str, record: PriceRecord) {
        self.0.insert(ticker.to_string(), record);
    }

    pub fn get(&self, ticker: &str) -> Option<&PriceRecord> {
        self.0.get(ticker)
    }

    /// Closing price for a ticker, or `MissingPrice` if absent.
    pub fn close(&self, ticker: &str) -> Result<f64> {
        self.0
            .get(ticker)
            .map(|r| r.close)
            .ok_or_else(|| Error::MissingPrice(ticker.to_string()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(String, PriceRecord)> for DailySnapshot {
    fn from_iter<I: IntoIterator<Item = (String, PriceRecord)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Append-only output of a simulation run.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SimulationTrace {
    /// Portfolio value at each day's close
    pub values: Vec<f64>,
    /// Day-over-day return; day 0 is measured against the initial investment
    pub returns: Vec<f64>,
    /// Day offsets on which holdings were reset to the target allocation
    pub rebalance_days: Vec<usize>,
}

impl SimulationTrace {
    pub fn with_capacity(days: usize) -> Self {
        Self {
            values: Vec::with_capacity(days),
            returns: Vec::with_capacity(days),
            rebalance_days: Vec::new(),
        }
    }

    /// Number of simulated days.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Portfolio value after the last simulated day.
    pub fn final_value(&self) -> Option<f64> {
        self.values.last().copied()
    }
}

/// Summary of a completed run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationReport {
    /// Instruments in the universe
    pub tickers: Vec<String>,
    /// First trading date (YYYY-MM-DD), if the date column could be read as a date
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
    /// Last trading date (YYYY-MM-DD)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
    /// Number of simulated days
    pub trading_days: usize,
    /// Number of rebalances, including the day-0 rebalance
    pub rebalance_count: usize,
    /// Amount invested before day 0
    pub initial_investment: f64,
    /// Portfolio value after the last day
    pub final_value: f64,
    /// Final value over initial investment, in percent
    pub total_return_percent: f64,
    /// Chained return over the value trace, in percent
    pub time_weighted_return_percent: f64,
    /// Population standard deviation of daily returns
    pub volatility: f64,
    /// Largest peak-to-trough decline as a fraction of the peak
    pub max_drawdown: f64,
    /// Per-period Sharpe ratio (not annualized)
    pub sharpe_ratio: f64,
    /// Per-period risk-free rate used for the Sharpe ratio
    pub risk_free_rate: f64,
}

/// Response envelope for JSON output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    /// Create a successful response.
    pub fn ok(data: T) -> Self {
        Self {
            ok: true,
            data: Some(data),
            error: None,
        }
    }

    /// Create an error response.
    pub fn err(error: impl Into<String>) -> Self {
        Self {
            ok: false,
            data: None,
            error: Some(error.into()),
        }
    }
}
