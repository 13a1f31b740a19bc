//! Simulation state machine.

use crate::config::SimulationConfig;
use crate::data::PriceUniverse;
use crate::portfolio::{rebalance, value, RebalanceSchedule};
use crate::types::{Allocation, Holdings, SimulationTrace};
use crate::{Error, Result};
use tracing::{debug, info};

/// Mutable state carried from one simulated day to the next.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationState {
    /// Current holdings, reset on rebalance days
    pub holdings: Holdings,
    /// Portfolio value at the previous close; the initial investment before day 0
    pub previous_value: f64,
    /// Next day offset to simulate
    pub next_day: usize,
    /// Values, returns and rebalance days recorded so far
    pub trace: SimulationTrace,
}

/// A single run over a price universe.
#[derive(Debug)]
pub struct Simulation<'a> {
    universe: &'a PriceUniverse,
    allocation: Allocation,
    schedule: RebalanceSchedule,
    days: usize,
    state: SimulationState,
}

impl<'a> Simulation<'a> {
    /// Prepare a run from a validated configuration.
    pub fn new(config: &SimulationConfig, universe: &'a PriceUniverse) -> Result<Self> {
        config.validate()?;
        Self::with_allocation(
            universe,
            config.allocation(),
            config.schedule()?,
            config.initial_investment,
        )
    }

    /// Prepare a run from explicit parts.
    ///
    /// Rejects misaligned series before day 0, then invests
    /// `initial_investment` at day 0's closes according to `allocation`.
    pub fn with_allocation(
        universe: &'a PriceUniverse,
        allocation: Allocation,
        schedule: RebalanceSchedule,
        initial_investment: f64,
    ) -> Result<Self> {
        for ticker in allocation.tickers() {
            if universe.series(ticker).is_none() {
                return Err(Error::Config(format!(
                    "Allocation includes {ticker}, which has no price series"
                )));
            }
        }

        let days = universe.check_alignment()?;

        let initial_prices = universe.snapshot(0)?;
        let mut holdings = Holdings::zeroed(&universe.tickers());
        rebalance(&mut holdings, &allocation, initial_investment, &initial_prices)?;

        Ok(Self {
            universe,
            allocation,
            schedule,
            days,
            state: SimulationState {
                holdings,
                previous_value: initial_investment,
                next_day: 0,
                trace: SimulationTrace::with_capacity(days),
            },
        })
    }

    /// Number of days the run will simulate.
    pub fn days(&self) -> usize {
        self.days
    }

    pub fn state(&self) -> &SimulationState {
        &self.state
    }

    /// Whether every day has been simulated.
    pub fn is_finished(&self) -> bool {
        self.state.next_day >= self.days
    }

    /// Simulate the next day and return its closing portfolio value.
    ///
    /// Returns `None` once the last day has been simulated.
    pub fn step(&mut self) -> Result<Option<f64>> {
        if self.is_finished() {
            return Ok(None);
        }

        let day = self.state.next_day;
        let snapshot = self.universe.snapshot(day)?;

        let portfolio_value = value(&self.state.holdings, &snapshot)?;
        let previous = self.state.previous_value;
        self.state.trace.values.push(portfolio_value);
        self.state
            .trace
            .returns
            .push((portfolio_value - previous) / previous);

        if self.schedule.is_due(day) {
            rebalance(
                &mut self.state.holdings,
                &self.allocation,
                portfolio_value,
                &snapshot,
            )?;
            self.state.trace.rebalance_days.push(day);
            debug!("Rebalanced on day {} at value {:.2}", day, portfolio_value);
        }

        self.state.previous_value = portfolio_value;
        self.state.next_day += 1;
        Ok(Some(portfolio_value))
    }

    /// Simulate every remaining day and return the trace.
    pub fn run(mut self) -> Result<SimulationTrace> {
        info!(
            "Simulating {} days across {} instruments, rebalancing every {} days",
            self.days,
            self.universe.len(),
            self.schedule.period()
        );

        while self.step()?.is_some() {}

        info!(
            "Simulation finished with {} rebalances",
            self.state.trace.rebalance_days.len()
        );
        Ok(self.state.trace)
    }
}
