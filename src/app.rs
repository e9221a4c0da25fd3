//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments
//! - runs the fetch pipeline and persists the table
//! - loads a saved table and forecasts / lists / shows from it

use std::time::Duration;

use clap::Parser;
use tracing::{info, warn};

use crate::cli::{Command, DataArgs, FetchArgs, ForecastArgs, ShowArgs};
use crate::domain::{DEFAULT_COUNTRIES, FetchConfig, MAX_HORIZON, RetryPolicy};
use crate::error::AppError;
use crate::table::Dataset;

pub mod pipeline;

/// Entry point for the `econ` binary.
pub fn run() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    let cli = crate::cli::Cli::parse();

    match cli.command {
        Command::Fetch(args) => handle_fetch(args),
        Command::Forecast(args) => handle_forecast(args),
        Command::Countries(args) => handle_countries(args),
        Command::Show(args) => handle_show(args),
    }
}

fn handle_fetch(args: FetchArgs) -> Result<(), AppError> {
    let config = fetch_config_from_args(&args)?;
    info!(
        countries = config.countries.len(),
        indicators = config.indicators.len(),
        base_url = %config.base_url,
        "starting fetch"
    );

    let run = pipeline::run_fetch(&config)?;
    if run.rows.is_empty() {
        return Err(AppError::new(3, "No data received from the API; nothing was saved."));
    }

    crate::io::write_table_csv(&config.out_path, &run.rows)?;
    info!(rows = run.rows.len(), path = %config.out_path.display(), "table saved");

    println!("{}", crate::report::format_fetch_summary(&run, &config.out_path));
    Ok(())
}

fn handle_forecast(args: ForecastArgs) -> Result<(), AppError> {
    check_horizon(args.horizon)?;
    let dataset = load_dataset(&args.data)?;
    let country = resolve_country(&dataset, &args.country)?;

    match crate::forecast::forecast_indicator(&dataset, country, args.indicator, args.horizon) {
        Ok(result) => {
            println!("{}", crate::report::format_forecast(&result, args.history));
            if let Some(path) = &args.export {
                crate::io::write_forecast_json(path, &result)?;
            }
        }
        Err(err) => {
            // The user sees one plain message; the cause goes to the log.
            warn!(country, indicator = args.indicator.code(), error = %err, "forecast unavailable");
            print!(
                "{}",
                crate::report::format_forecast_unavailable(country, args.indicator, &err)
            );
        }
    }

    Ok(())
}

fn handle_countries(args: DataArgs) -> Result<(), AppError> {
    let dataset = load_dataset(&args)?;
    print!("{}", crate::report::format_country_list(&dataset.countries()));
    Ok(())
}

fn handle_show(args: ShowArgs) -> Result<(), AppError> {
    let dataset = load_dataset(&args.data)?;
    let country = resolve_country(&dataset, &args.country)?;
    let rows = dataset.country_rows(country);
    print!("{}", crate::report::format_country_table(country, &rows));
    Ok(())
}

fn load_dataset(args: &DataArgs) -> Result<Dataset, AppError> {
    let dataset = crate::io::read_table_csv(&args.data)?;
    if dataset.is_empty() {
        return Err(AppError::new(
            3,
            format!("Table '{}' has no rows; run `econ fetch` first.", args.data.display()),
        ));
    }
    Ok(dataset)
}

fn resolve_country<'a>(dataset: &'a Dataset, query: &str) -> Result<&'a str, AppError> {
    dataset
        .resolve_country(query)
        .ok_or_else(|| AppError::new(3, format!("Country '{query}' not found in the table.")))
}

pub fn fetch_config_from_args(args: &FetchArgs) -> Result<FetchConfig, AppError> {
    let countries: Vec<String> = if args.countries.is_empty() {
        DEFAULT_COUNTRIES.iter().map(|c| c.to_string()).collect()
    } else {
        args.countries
            .iter()
            .map(|c| c.trim().to_ascii_uppercase())
            .filter(|c| !c.is_empty())
            .collect()
    };
    if countries.is_empty() {
        return Err(AppError::new(2, "No countries given."));
    }
    if args.indicators.is_empty() {
        return Err(AppError::new(2, "No indicators given."));
    }
    check_base_url(&args.base_url)?;

    Ok(FetchConfig {
        base_url: args.base_url.trim_end_matches('/').to_string(),
        countries,
        indicators: args.indicators.clone(),
        out_path: args.out.clone(),
        retry: RetryPolicy {
            max_retries: args.retries,
            base_delay: Duration::from_millis(args.backoff_ms),
            max_delay: Duration::from_millis(args.max_backoff_ms.max(args.backoff_ms)),
        },
        timeout: Duration::from_secs(args.timeout_secs.max(1)),
    })
}

fn check_horizon(horizon: usize) -> Result<(), AppError> {
    if (1..=MAX_HORIZON).contains(&horizon) {
        Ok(())
    } else {
        Err(AppError::new(2, format!("Horizon must be between 1 and {MAX_HORIZON} years.")))
    }
}

fn check_base_url(url: &str) -> Result<(), AppError> {
    if url.starts_with("http://") || url.starts_with("https://") {
        Ok(())
    } else {
        Err(AppError::new(2, format!("Invalid API base URL '{url}'.")))
    }
}
