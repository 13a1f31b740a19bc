//! Run summaries and their text/JSON rendering.

use crate::config::SimulationConfig;
use crate::data::{load_universe, PriceUniverse};
use crate::metrics::{
    holding_period_return, max_drawdown, sharpe_ratio, time_weighted_return, volatility,
};
use crate::simulation::Simulation;
use crate::types::{ApiResponse, PriceRecord, SimulationReport, SimulationTrace};
use crate::{Error, Result};
use tracing::info;

/// Load prices, simulate, and summarize a run described by `config`.
pub fn generate(config: &SimulationConfig) -> Result<SimulationReport> {
    config.validate()?;
    let universe = load_universe(&config.data_dir, &config.tickers)?;
    let trace = Simulation::new(config, &universe)?.run()?;
    summarize(config, &universe, &trace)
}

/// Reduce a finished trace to the summary metrics.
pub fn summarize(
    config: &SimulationConfig,
    universe: &PriceUniverse,
    trace: &SimulationTrace,
) -> Result<SimulationReport> {
    let final_value = trace
        .final_value()
        .ok_or_else(|| Error::InsufficientData("Simulation produced no values".to_string()))?;

    let report = SimulationReport {
        tickers: universe.tickers(),
        start_date: universe.iter().next().and_then(|s| format_date(s.first())),
        end_date: universe.iter().next().and_then(|s| format_date(s.last())),
        trading_days: trace.len(),
        rebalance_count: trace.rebalance_days.len(),
        initial_investment: config.initial_investment,
        final_value,
        total_return_percent: holding_period_return(config.initial_investment, final_value),
        time_weighted_return_percent: time_weighted_return(&trace.values),
        volatility: volatility(&trace.returns)?,
        max_drawdown: max_drawdown(&trace.values)?,
        sharpe_ratio: sharpe_ratio(&trace.returns, config.risk_free_rate)?,
        risk_free_rate: config.risk_free_rate,
    };

    info!(
        "Final value {:.2} ({:+.2}%) over {} days",
        report.final_value, report.total_return_percent, report.trading_days
    );
    Ok(report)
}

fn format_date(record: &PriceRecord) -> Option<String> {
    record
        .calendar_date()
        .map(|d| d.format("%Y-%m-%d").to_string())
}

impl SimulationReport {
    /// The four-line plain text report.
    pub fn render_text(&self) -> String {
        format!(
            "Final Portfolio Value: ${:.2}\n\
             Volatility: {:.6}\n\
             Max Drawdown: {:.6}\n\
             Sharpe Ratio: {:.6}",
            self.final_value, self.volatility, self.max_drawdown, self.sharpe_ratio
        )
    }

    /// Pretty JSON wrapped in an `ApiResponse`.
    ///
    /// Non-finite metrics (for example the Sharpe ratio of a flat market)
    /// serialize as `null`.
    pub fn render_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&ApiResponse::ok(self))?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PriceSeries;
    use approx::assert_relative_eq;

    fn flat_market() -> (SimulationConfig, PriceUniverse) {
        let series = vec![
            PriceSeries::from_closes("A", &[100.0, 100.0, 100.0]).unwrap(),
            PriceSeries::from_closes("B", &[100.0, 100.0, 100.0]).unwrap(),
        ];
        let config = SimulationConfig {
            tickers: vec!["A".to_string(), "B".to_string()],
            ..Default::default()
        };
        (config, PriceUniverse::new(series).unwrap())
    }

    fn report_for(config: &SimulationConfig, universe: &PriceUniverse) -> SimulationReport {
        let trace = Simulation::new(config, universe).unwrap().run().unwrap();
        summarize(config, universe, &trace).unwrap()
    }

    #[test]
    fn test_summarize_flat_market() {
        let (config, universe) = flat_market();
        let report = report_for(&config, &universe);

        assert_eq!(report.tickers, vec!["A", "B"]);
        assert_eq!(report.trading_days, 3);
        assert_eq!(report.rebalance_count, 1);
        assert_relative_eq!(report.final_value, 1_000_000.0);
        assert_eq!(report.total_return_percent, 0.0);
        assert_eq!(report.volatility, 0.0);
        assert_eq!(report.max_drawdown, 0.0);
        assert!(report.sharpe_ratio.is_infinite() && report.sharpe_ratio < 0.0);
    }

    #[test]
    fn test_render_text() {
        let (config, universe) = flat_market();
        let text = report_for(&config, &universe).render_text();

        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(
            lines,
            vec![
                "Final Portfolio Value: $1000000.00",
                "Volatility: 0.000000",
                "Max Drawdown: 0.000000",
                "Sharpe Ratio: -inf",
            ]
        );
    }

    #[test]
    fn test_render_json() {
        let (config, universe) = flat_market();
        let json = report_for(&config, &universe).render_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["ok"], true);
        assert_eq!(value["data"]["trading_days"], 3);
        assert_eq!(value["data"]["final_value"], 1_000_000.0);
        assert!(value["data"]["sharpe_ratio"].is_null());
        // Closes were dated 1, 2, 3 seconds after the epoch
        assert_eq!(value["data"]["start_date"], "1970-01-01");
    }

    #[test]
    fn test_summarize_empty_trace() {
        let (config, universe) = flat_market();
        let err = summarize(&config, &universe, &SimulationTrace::default()).unwrap_err();
        assert!(matches!(err, Error::InsufficientData(_)));
    }
}
