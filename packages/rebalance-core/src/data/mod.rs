//! Price data loading.
//!
//! Reads one headerless `date,open,high,low,close` file per ticker and
//! groups the series into a universe that the simulation walks in lockstep.

mod loader;
mod universe;

pub use loader::{load_series, parse_series, series_path, FIELD_NAMES};
pub use universe::{load_universe, PriceUniverse};
