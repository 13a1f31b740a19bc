//! Simulation configuration.
//!
//! Every parameter of a run lives here. Values can be loaded from a TOML
//! file; anything the file omits falls back to the reference run: ten
//! large-cap tickers, equal weight, $1,000,000, rebalanced every 20 days.

use crate::portfolio::RebalanceSchedule;
use crate::types::Allocation;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Environment variable naming a config file to load when none is given.
pub const CONFIG_ENV_VAR: &str = "REBALANCE_CONFIG";

/// Tolerance when checking that weights sum to 1.0.
const WEIGHT_SUM_TOLERANCE: f64 = 1e-6;

/// Parameters of one simulation run.
///
/// ```toml
/// tickers = ["AAPL", "MSFT"]
/// initial_investment = 500000.0
/// rebalance_period = 5
/// risk_free_rate = 0.0
/// data_dir = "prices"
///
/// [weights]
/// AAPL = 0.7
/// MSFT = 0.3
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SimulationConfig {
    /// Instruments to simulate, one `<TICKER>.csv` each
    #[serde(default = "default_tickers")]
    pub tickers: Vec<String>,
    /// Cash invested before day 0
    #[serde(default = "default_initial_investment")]
    pub initial_investment: f64,
    /// Trading days between rebalances
    #[serde(default = "default_rebalance_period")]
    pub rebalance_period: usize,
    /// Per-period risk-free rate for the Sharpe ratio (not annualized)
    #[serde(default = "default_risk_free_rate")]
    pub risk_free_rate: f64,
    /// Directory holding the price files
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    /// Target weights; equal weight when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weights: Option<BTreeMap<String, f64>>,
}

fn default_tickers() -> Vec<String> {
    ["AAPL", "MSFT", "GOOGL", "AMZN", "META", "TSLA", "NVDA", "NFLX", "ADBE", "PYPL"]
        .iter()
        .map(|t| t.to_string())
        .collect()
}
fn default_initial_investment() -> f64 { 1_000_000.0 }
fn default_rebalance_period() -> usize { 20 }
fn default_risk_free_rate() -> f64 { 0.01 }
fn default_data_dir() -> PathBuf { PathBuf::from(".") }

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            tickers: default_tickers(),
            initial_investment: default_initial_investment(),
            rebalance_period: default_rebalance_period(),
            risk_free_rate: default_risk_free_rate(),
            data_dir: default_data_dir(),
            weights: None,
        }
    }
}

impl SimulationConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        info!("Loading configuration from: {}", path.display());

        let content = fs::read_to_string(path).map_err(|source| Error::FileAccess {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    /// Parse configuration from TOML text.
    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Load from `path` if given, else from `$REBALANCE_CONFIG`, else defaults.
    pub fn resolve(path: Option<&Path>) -> Result<Self> {
        if let Some(path) = path {
            return Self::load(path);
        }

        match env::var(CONFIG_ENV_VAR) {
            Ok(path) if !path.is_empty() => Self::load(path),
            _ => Ok(Self::default()),
        }
    }

    /// Serialize to TOML text.
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| Error::Config(e.to_string()))
    }

    /// Check the configuration is usable for a run.
    pub fn validate(&self) -> Result<()> {
        if self.tickers.is_empty() {
            return Err(Error::Config("At least one ticker is required".to_string()));
        }

        let mut seen = HashSet::new();
        for ticker in &self.tickers {
            if ticker.trim().is_empty() {
                return Err(Error::Config("Ticker symbols cannot be blank".to_string()));
            }
            if !seen.insert(ticker.as_str()) {
                return Err(Error::Config(format!("Duplicate ticker: {ticker}")));
            }
        }

        if !self.initial_investment.is_finite() || self.initial_investment <= 0.0 {
            return Err(Error::Config(format!(
                "Initial investment must be a positive amount, got {}",
                self.initial_investment
            )));
        }

        if !self.risk_free_rate.is_finite() {
            return Err(Error::Config(format!(
                "Risk-free rate must be finite, got {}",
                self.risk_free_rate
            )));
        }

        self.schedule()?;

        if let Some(weights) = &self.weights {
            for ticker in weights.keys() {
                if !seen.contains(ticker.as_str()) {
                    return Err(Error::Config(format!(
                        "Weight given for {ticker}, which is not in the ticker list"
                    )));
                }
            }
            for ticker in &self.tickers {
                if !weights.contains_key(ticker) {
                    return Err(Error::Config(format!("No weight given for {ticker}")));
                }
            }
        }

        Ok(())
    }

    /// Target allocation: the configured weights, or equal weight.
    ///
    /// Weights that do not sum to 1.0 are used as given, with a warning.
    pub fn allocation(&self) -> Allocation {
        let allocation = match &self.weights {
            Some(weights) => weights.iter().map(|(t, &w)| (t.clone(), w)).collect::<Allocation>(),
            None => Allocation::equal_weight(&self.tickers),
        };

        let total = allocation.total_weight();
        if (total - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
            warn!("Target weights sum to {:.6}, not 1.0", total);
        }

        allocation
    }

    /// Rebalancing trigger for the configured period.
    pub fn schedule(&self) -> Result<RebalanceSchedule> {
        RebalanceSchedule::every(self.rebalance_period)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults_match_reference_run() {
        let config = SimulationConfig::default();
        assert_eq!(config.tickers.len(), 10);
        assert_eq!(config.tickers[0], "AAPL");
        assert_eq!(config.tickers[9], "PYPL");
        assert_eq!(config.initial_investment, 1_000_000.0);
        assert_eq!(config.rebalance_period, 20);
        assert_eq!(config.risk_free_rate, 0.01);
        assert_eq!(config.data_dir, PathBuf::from("."));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config = SimulationConfig::from_toml("rebalance_period = 5\n").unwrap();
        assert_eq!(config.rebalance_period, 5);
        assert_eq!(config.initial_investment, 1_000_000.0);
        assert_eq!(config.tickers.len(), 10);
    }

    #[test]
    fn test_load_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
tickers = ["AAPL", "MSFT"]
initial_investment = 500000.0
data_dir = "prices"

[weights]
AAPL = 0.7
MSFT = 0.3
"#
        )
        .unwrap();

        let config = SimulationConfig::load(file.path()).unwrap();
        assert_eq!(config.tickers, vec!["AAPL", "MSFT"]);
        assert_eq!(config.data_dir, PathBuf::from("prices"));
        assert!(config.validate().is_ok());

        let allocation = config.allocation();
        assert_eq!(allocation.weight("AAPL"), Some(0.7));
        assert_eq!(allocation.weight("MSFT"), Some(0.3));
    }

    #[test]
    fn test_resolve_explicit_path_wins() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "risk_free_rate = 0.0").unwrap();

        let config = SimulationConfig::resolve(Some(file.path())).unwrap();
        assert_eq!(config.risk_free_rate, 0.0);
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = SimulationConfig::load(dir.path().join("missing.toml")).unwrap_err();
        assert!(matches!(err, Error::FileAccess { .. }));
    }

    #[test]
    fn test_invalid_toml() {
        let err = SimulationConfig::from_toml("rebalance_period = \"often\"").unwrap_err();
        assert!(matches!(err, Error::Toml(_)));
    }

    #[test]
    fn test_toml_roundtrip() {
        let config = SimulationConfig {
            tickers: vec!["AAPL".to_string()],
            ..Default::default()
        };
        let parsed = SimulationConfig::from_toml(&config.to_toml().unwrap()).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let cases = [
            SimulationConfig {
                tickers: Vec::new(),
                ..Default::default()
            },
            SimulationConfig {
                tickers: vec!["AAPL".to_string(), "AAPL".to_string()],
                ..Default::default()
            },
            SimulationConfig {
                initial_investment: 0.0,
                ..Default::default()
            },
            SimulationConfig {
                initial_investment: f64::NAN,
                ..Default::default()
            },
            SimulationConfig {
                rebalance_period: 0,
                ..Default::default()
            },
            SimulationConfig {
                risk_free_rate: f64::INFINITY,
                ..Default::default()
            },
        ];

        for config in cases {
            assert!(
                matches!(config.validate(), Err(Error::Config(_))),
                "expected rejection: {config:?}"
            );
        }
    }

    #[test]
    fn test_validate_weights_cover_universe() {
        let mut config = SimulationConfig {
            tickers: vec!["AAPL".to_string(), "MSFT".to_string()],
            weights: Some(BTreeMap::from([("AAPL".to_string(), 1.0)])),
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(Error::Config(_))));

        config.weights = Some(BTreeMap::from([
            ("AAPL".to_string(), 0.5),
            ("MSFT".to_string(), 0.25),
            ("TSLA".to_string(), 0.25),
        ]));
        assert!(matches!(config.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn test_unnormalized_weights_are_kept() {
        let config = SimulationConfig {
            tickers: vec!["AAPL".to_string(), "MSFT".to_string()],
            weights: Some(BTreeMap::from([
                ("AAPL".to_string(), 0.6),
                ("MSFT".to_string(), 0.6),
            ])),
            ..Default::default()
        };

        assert!(config.validate().is_ok());
        assert!((config.allocation().total_weight() - 1.2).abs() < 1e-12);
    }
}
