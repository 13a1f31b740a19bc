//! Portfolio valuation and rebalancing.
//!
//! Holdings are valued at each day's close and periodically reset to the
//! target allocation.

mod rebalance;
mod valuation;

pub use rebalance::{rebalance, RebalanceSchedule};
pub use valuation::value;
