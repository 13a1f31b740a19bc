//! Mark-to-market valuation of holdings.

use crate::types::{DailySnapshot, Holdings};
use crate::Result;

/// Total value of `holdings` at the snapshot's closing prices.
///
/// Fails with `MissingPrice` if a held ticker has no record in the
/// snapshot. Within a simulation that means an internal invariant broke.
pub fn value(holdings: &Holdings, snapshot: &DailySnapshot) -> Result<f64> {
    holdings.iter().try_fold(0.0, |total, (ticker, quantity)| {
        Ok(total + quantity * snapshot.close(ticker)?)
    })
}
