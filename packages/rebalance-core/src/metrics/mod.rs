//! Reductions of a simulation trace into summary metrics.
//!
//! Provides volatility, max drawdown and Sharpe ratio over the daily
//! series, plus simple return summaries.

mod performance;
mod risk;

pub use performance::{holding_period_return, time_weighted_return};
pub use risk::{max_drawdown, mean, sharpe_ratio, volatility};
