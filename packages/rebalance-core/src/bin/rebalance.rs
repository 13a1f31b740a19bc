//! Rebalance CLI - run a fixed-schedule rebalancing backtest.
//!
//! Prints the four-line report by default, or a JSON envelope with the
//! full summary. Any load or alignment failure exits non-zero before a
//! metric is printed.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use rebalance_core::{report, ApiResponse, SimulationConfig};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(name = "rebalance")]
#[command(about = "Fixed-schedule portfolio rebalancing backtest")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    #[command(flatten)]
    settings: Settings,

    /// Output format for the report
    #[arg(long, value_enum, default_value_t = OutputFormat::Text, global = true)]
    format: OutputFormat,

    /// Log progress to stderr (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the simulation and print the report (default)
    Run,
    /// Print the effective configuration as TOML
    Config,
}

/// Overrides applied on top of the configuration file.
#[derive(Args)]
struct Settings {
    /// TOML configuration file (falls back to $REBALANCE_CONFIG)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Directory containing <TICKER>.csv price files
    #[arg(short, long, global = true)]
    data_dir: Option<PathBuf>,

    /// Tickers to simulate (comma-separated)
    #[arg(short, long, value_delimiter = ',', global = true)]
    tickers: Option<Vec<String>>,

    /// Cash invested before the first day
    #[arg(long, global = true)]
    initial_investment: Option<f64>,

    /// Trading days between rebalances
    #[arg(long, global = true)]
    rebalance_period: Option<usize>,

    /// Per-period risk-free rate used by the Sharpe ratio
    #[arg(long, global = true)]
    risk_free_rate: Option<f64>,
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

impl Settings {
    fn resolve(self) -> Result<SimulationConfig> {
        let mut config = SimulationConfig::resolve(self.config.as_deref())
            .context("failed to load configuration")?;

        if let Some(dir) = self.data_dir {
            config.data_dir = dir;
        }
        if let Some(tickers) = self.tickers {
            config.tickers = tickers.iter().map(|t| t.trim().to_string()).collect();
        }
        if let Some(amount) = self.initial_investment {
            config.initial_investment = amount;
        }
        if let Some(period) = self.rebalance_period {
            config.rebalance_period = period;
        }
        if let Some(rate) = self.risk_free_rate {
            config.risk_free_rate = rate;
        }

        config.validate().context("invalid configuration")?;
        Ok(config)
    }
}

fn main() {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "info" } else { "warn" };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let format = cli.format;
    match execute(cli) {
        Ok(output) => println!("{}", output),
        Err(e) => {
            tracing::error!("{:#}", e);
            if let OutputFormat::Json = format {
                if let Ok(body) =
                    serde_json::to_string_pretty(&ApiResponse::<()>::err(format!("{:#}", e)))
                {
                    println!("{}", body);
                }
            }
            std::process::exit(1);
        }
    }
}

fn execute(cli: Cli) -> Result<String> {
    let config = cli.settings.resolve()?;

    match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => {
            tracing::info!("Starting backtest over {} tickers", config.tickers.len());
            let summary = report::generate(&config).context("backtest failed")?;
            match cli.format {
                OutputFormat::Text => Ok(summary.render_text()),
                OutputFormat::Json => Ok(summary.render_json()?),
            }
        }
        Commands::Config => Ok(config.to_toml()?),
    }
}
