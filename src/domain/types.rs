//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - accumulated in-memory during a fetch run
//! - persisted to the wide CSV table
//! - exported to JSON (forecasts)

use std::path::PathBuf;
use std::time::Duration;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Default World Bank API base (no trailing slash).
pub const DEFAULT_BASE_URL: &str = "https://api.worldbank.org/v2";

/// Countries fetched when `--countries` is not given.
pub const DEFAULT_COUNTRIES: [&str; 20] = [
    "USA", "CAN", "GBR", "FRA", "DEU", "JPN", "CHN", "IND", "BRA", "AUS", "MEX", "RUS", "ITA", "ESP",
    "KOR", "IDN", "ZAF", "NGA", "EGY", "ARG",
];

/// Minimum number of observed annual points before a forecast is attempted.
pub const MIN_FORECAST_POINTS: usize = 5;

/// Default number of future years to project.
pub const DEFAULT_HORIZON: usize = 5;

/// Largest number of future years a single forecast may project.
pub const MAX_HORIZON: usize = 100;

/// A macroeconomic indicator published by the API under a fixed code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Indicator {
    Gdp,
    Inflation,
    Unemployment,
}

impl Indicator {
    pub const ALL: [Indicator; 3] = [Indicator::Gdp, Indicator::Inflation, Indicator::Unemployment];

    /// Series code used in the API path.
    pub fn code(self) -> &'static str {
        match self {
            Indicator::Gdp => "NY.GDP.MKTP.CD",
            Indicator::Inflation => "FP.CPI.TOTL.ZG",
            Indicator::Unemployment => "SL.UEM.TOTL.ZS",
        }
    }

    /// Column name in the persisted table.
    pub fn column(self) -> &'static str {
        match self {
            Indicator::Gdp => "GDP (USD)",
            Indicator::Inflation => "Inflation (%)",
            Indicator::Unemployment => "Unemployment (%)",
        }
    }

    /// Human-readable label for terminal output.
    pub fn display_name(self) -> &'static str {
        match self {
            Indicator::Gdp => "GDP",
            Indicator::Inflation => "Inflation",
            Indicator::Unemployment => "Unemployment",
        }
    }
}

/// One (country, year, indicator) measurement with a present value.
#[derive(Debug, Clone, PartialEq)]
pub struct Observation {
    pub country_name: String,
    pub country_code: String,
    pub year: i32,
    pub indicator: Indicator,
    pub value: f64,
}

/// One row of the wide table: a (country, year) with one column per indicator.
///
/// Field names map to the stable CSV header shared with the display layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorRow {
    #[serde(rename = "Country")]
    pub country_name: String,
    #[serde(rename = "Country Code")]
    pub country_code: String,
    #[serde(rename = "Year")]
    pub year: i32,
    #[serde(rename = "GDP (USD)")]
    pub gdp: Option<f64>,
    #[serde(rename = "Inflation (%)")]
    pub inflation: Option<f64>,
    #[serde(rename = "Unemployment (%)")]
    pub unemployment: Option<f64>,
}

impl IndicatorRow {
    pub fn new(country_name: impl Into<String>, country_code: impl Into<String>, year: i32) -> Self {
        Self {
            country_name: country_name.into(),
            country_code: country_code.into(),
            year,
            gdp: None,
            inflation: None,
            unemployment: None,
        }
    }

    pub fn get(&self, indicator: Indicator) -> Option<f64> {
        match indicator {
            Indicator::Gdp => self.gdp,
            Indicator::Inflation => self.inflation,
            Indicator::Unemployment => self.unemployment,
        }
    }

    fn slot_mut(&mut self, indicator: Indicator) -> &mut Option<f64> {
        match indicator {
            Indicator::Gdp => &mut self.gdp,
            Indicator::Inflation => &mut self.inflation,
            Indicator::Unemployment => &mut self.unemployment,
        }
    }

    /// Set an indicator only if it has no value yet (first value wins).
    ///
    /// Returns `false` when an earlier value was kept.
    pub fn set_first(&mut self, indicator: Indicator, value: f64) -> bool {
        let slot = self.slot_mut(indicator);
        if slot.is_some() {
            return false;
        }
        *slot = Some(value);
        true
    }
}

/// A single `(year, value)` point of a historical or projected series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct YearValue {
    pub year: i32,
    pub value: f64,
}

impl YearValue {
    pub fn new(year: i32, value: f64) -> Self {
        Self { year, value }
    }
}

/// Future years and point estimates produced by the forecast adapter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Forecast {
    pub years: Vec<i32>,
    pub values: Vec<f64>,
}

impl Forecast {
    pub fn points(&self) -> Vec<YearValue> {
        self.years
            .iter()
            .zip(&self.values)
            .map(|(&year, &value)| YearValue::new(year, value))
            .collect()
    }
}

/// A forecast together with the history it was derived from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastResult {
    pub country_name: String,
    pub indicator: Indicator,
    /// Sorted ascending by year.
    pub historical: Vec<YearValue>,
    /// Exactly `horizon` points immediately following the last historical year.
    pub forecast: Vec<YearValue>,
}

/// Retry/backoff settings for the fetch client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt.
    pub max_retries: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl RetryPolicy {
    pub const RETRY_STATUSES: [u16; 4] = [500, 502, 503, 504];

    /// Delay before retry number `attempt` (0-based): `base * 2^attempt`, capped.
    pub fn backoff(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt);
        self.base_delay
            .checked_mul(factor)
            .unwrap_or(self.max_delay)
            .min(self.max_delay)
    }

    pub fn is_retryable(status: u16) -> bool {
        Self::RETRY_STATUSES.contains(&status)
    }

    /// No waiting between attempts.
    pub fn immediate(max_retries: u32) -> Self {
        Self {
            max_retries,
            base_delay: Duration::ZERO,
            max_delay: Duration::ZERO,
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay: Duration::from_millis(300),
            max_delay: Duration::from_secs(10),
        }
    }
}

/// A full fetch run's configuration as understood by the pipeline.
///
/// This is derived from CLI flags (plus defaults).
#[derive(Debug, Clone)]
pub struct FetchConfig {
    pub base_url: String,
    pub countries: Vec<String>,
    pub indicators: Vec<Indicator>,
    pub out_path: PathBuf,
    pub retry: RetryPolicy,
    pub timeout: Duration,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backoff_doubles_and_caps() {
        let policy = RetryPolicy {
            max_retries: 3,
            base_delay: Duration::from_millis(300),
            max_delay: Duration::from_millis(1000),
        };
        assert_eq!(policy.backoff(0), Duration::from_millis(300));
        assert_eq!(policy.backoff(1), Duration::from_millis(600));
        assert_eq!(policy.backoff(2), Duration::from_millis(1000));
        assert_eq!(policy.backoff(40), Duration::from_millis(1000));
    }

    #[test]
    fn only_gateway_style_statuses_retry() {
        for status in [500, 502, 503, 504] {
            assert!(RetryPolicy::is_retryable(status));
        }
        for status in [200, 400, 404, 429, 501] {
            assert!(!RetryPolicy::is_retryable(status));
        }
    }

    #[test]
    fn set_first_keeps_earlier_value() {
        let mut row = IndicatorRow::new("United States", "USA", 2020);
        assert!(row.set_first(Indicator::Gdp, 100.0));
        assert!(!row.set_first(Indicator::Gdp, 200.0));
        assert_eq!(row.get(Indicator::Gdp), Some(100.0));
        assert_eq!(row.get(Indicator::Inflation), None);
    }
}
