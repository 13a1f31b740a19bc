//! Resetting holdings to a target allocation.

use crate::types::{Allocation, DailySnapshot, Holdings};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};

/// Overwrite holdings so each allocated ticker is worth
/// `weight * total_value` at the snapshot's close.
///
/// This is a full reset, not a trade list: tickers outside the allocation
/// are left untouched and no costs are charged. A zero close produces an
/// infinite or NaN quantity.
///
/// All prices are looked up before anything is written, so a
/// `MissingPrice` error leaves `holdings` unchanged.
pub fn rebalance(
    holdings: &mut Holdings,
    allocation: &Allocation,
    total_value: f64,
    snapshot: &DailySnapshot,
) -> Result<()> {
    let targets = allocation
        .iter()
        .map(|(ticker, weight)| Ok((ticker, weight * total_value / snapshot.close(ticker)?)))
        .collect::<Result<Vec<_>>>()?;

    for (ticker, quantity) in targets {
        holdings.set(ticker, quantity);
    }
    Ok(())
}

/// Fixed-period rebalancing trigger.
///
/// Due on day 0 and every `period` days after.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct RebalanceSchedule {
    period: usize,
}

impl RebalanceSchedule {
    /// Rebalance every `period` trading days. The period must be at least 1.
    pub fn every(period: usize) -> Result<Self> {
        if period == 0 {
            return Err(Error::Config(
                "Rebalance period must be at least 1 day".to_string(),
            ));
        }
        Ok(Self { period })
    }

    pub fn period(&self) -> usize {
        self.period
    }

    /// Whether holdings are reset after valuing `day`.
    pub fn is_due(&self, day: usize) -> bool {
        day % self.period == 0
    }
}

impl Default for RebalanceSchedule {
    fn default() -> Self {
        Self { period: 20 }
    }
}
