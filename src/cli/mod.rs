//! Command-line parsing for the economic indicator dashboard backend.
//!
//! The goal of this module is to keep **argument parsing** and **command dispatch**
//! separate from the fetch/forecast code.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::domain::{DEFAULT_BASE_URL, DEFAULT_HORIZON, Indicator};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "econ", version, about = "World Bank indicator fetcher and ARIMA forecaster")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Fetch indicators for a set of countries and save the wide CSV table.
    Fetch(FetchArgs),
    /// Forecast one indicator for one country from a saved table.
    Forecast(ForecastArgs),
    /// List the countries present in a saved table.
    Countries(DataArgs),
    /// Print all rows of one country from a saved table.
    Show(ShowArgs),
}

/// Options for `econ fetch`.
#[derive(Debug, Parser, Clone)]
pub struct FetchArgs {
    /// ISO3 country codes, comma-separated. Defaults to a fixed set of 20 major economies.
    #[arg(long, value_delimiter = ',')]
    pub countries: Vec<String>,

    /// Indicators to fetch, comma-separated.
    #[arg(long, value_enum, value_delimiter = ',', default_values_t = Indicator::ALL)]
    pub indicators: Vec<Indicator>,

    /// Output CSV path.
    #[arg(long, env = "ECON_DATA", default_value = "economic_data.csv")]
    pub out: PathBuf,

    /// API base URL.
    #[arg(long, env = "WORLDBANK_BASE_URL", default_value = DEFAULT_BASE_URL)]
    pub base_url: String,

    /// Retries after the first attempt for 500/502/503/504 responses.
    #[arg(long, default_value_t = 3)]
    pub retries: u32,

    /// Base backoff delay in milliseconds (doubles per retry).
    #[arg(long, default_value_t = 300)]
    pub backoff_ms: u64,

    /// Upper bound for a single backoff delay in milliseconds.
    #[arg(long, default_value_t = 10_000)]
    pub max_backoff_ms: u64,

    /// Per-request timeout in seconds.
    #[arg(long, default_value_t = 30)]
    pub timeout_secs: u64,
}

/// Location of a saved table.
#[derive(Debug, Args, Clone)]
pub struct DataArgs {
    /// CSV produced by `econ fetch`.
    #[arg(long, env = "ECON_DATA", default_value = "economic_data.csv")]
    pub data: PathBuf,
}

/// Options for `econ forecast`.
#[derive(Debug, Parser, Clone)]
pub struct ForecastArgs {
    #[command(flatten)]
    pub data: DataArgs,

    /// Country display name or ISO3 code (case-insensitive).
    #[arg(short = 'c', long)]
    pub country: String,

    /// Indicator to forecast.
    #[arg(short = 'i', long, value_enum, default_value_t = Indicator::Gdp)]
    pub indicator: Indicator,

    /// Number of future years.
    #[arg(long, default_value_t = DEFAULT_HORIZON)]
    pub horizon: usize,

    /// How many historical years to print.
    #[arg(long, default_value_t = 10)]
    pub history: usize,

    /// Export history + forecast to JSON.
    #[arg(long)]
    pub export: Option<PathBuf>,
}

/// Options for `econ show`.
#[derive(Debug, Parser, Clone)]
pub struct ShowArgs {
    #[command(flatten)]
    pub data: DataArgs,

    /// Country display name or ISO3 code (case-insensitive).
    #[arg(short = 'c', long)]
    pub country: String,
}
