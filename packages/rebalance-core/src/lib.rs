//! Rebalance Core - Fixed-schedule portfolio rebalancing backtest.
//!
//! This crate simulates a portfolio that is reset to a target allocation
//! every N trading days over historical daily prices, then reduces the
//! resulting value and return series into summary risk metrics:
//!
//! - **Data loading**: one `date,open,high,low,close` CSV per ticker
//! - **Valuation and rebalancing**: fractional holdings, full overwrite
//! - **Simulation**: lockstep day loop with periodic rebalancing
//! - **Metrics**: volatility, max drawdown, Sharpe ratio
//!
//! # Example
//!
//! ```rust,no_run
//! use rebalance_core::{data::load_universe, Simulation, SimulationConfig};
//!
//! let config = SimulationConfig::default();
//! let universe = load_universe(&config.data_dir, &config.tickers)?;
//!
//! let trace = Simulation::new(&config, &universe)?.run()?;
//! let report = rebalance_core::report::summarize(&config, &universe, &trace)?;
//! println!("{}", report.render_text());
//! # Ok::<(), rebalance_core::Error>(())
//! ```

use std::path::PathBuf;

pub mod config;
pub mod data;
pub mod metrics;
pub mod portfolio;
pub mod report;
pub mod simulation;
pub mod types;

// Re-export commonly used types
pub use types::{
    Allocation, ApiResponse, DailySnapshot, Holdings, PriceRecord, PriceSeries, SimulationReport,
    SimulationTrace,
};

// Re-export main functionality
pub use config::SimulationConfig;
pub use data::{load_series, load_universe, parse_series, PriceUniverse};
pub use metrics::{max_drawdown, sharpe_ratio, volatility};
pub use portfolio::{rebalance, value, RebalanceSchedule};
pub use simulation::{Simulation, SimulationState};

/// Error types for rebalance-core operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Cannot read {}", path.display())]
    FileAccess {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Cannot read CSV records for {ticker}")]
    Csv {
        ticker: String,
        #[source]
        source: csv::Error,
    },

    #[error("Parse error in {ticker} at line {line}, field '{field}': cannot parse {value:?}")]
    Parse {
        ticker: String,
        line: u64,
        field: &'static str,
        value: String,
    },

    #[error("No price records for ticker {0}")]
    EmptySeries(String),

    #[error("Series for {ticker} has no record for day {day} (expected {expected_days} days)")]
    RunAlignment {
        ticker: String,
        day: usize,
        expected_days: usize,
    },

    #[error("No price for {0} in the current snapshot")]
    MissingPrice(String),

    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Invalid TOML configuration")]
    Toml(#[from] toml::de::Error),

    #[error("JSON serialization failed")]
    Json(#[from] serde_json::Error),
}

/// Result type for rebalance-core operations.
pub type Result<T> = std::result::Result<T, Error>;
