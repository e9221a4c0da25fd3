//! Formatted terminal output.
//!
//! We keep formatting code in one place so:
//! - the fetch/forecast code stays free of presentation concerns
//! - output changes are localized (important for snapshot-style tests)

use std::path::Path;

use crate::app::pipeline::FetchRun;
use crate::domain::{ForecastResult, Indicator, IndicatorRow};
use crate::error::ForecastError;
use crate::table::CountryEntry;

/// Summary printed after `econ fetch`.
pub fn format_fetch_summary(run: &FetchRun, out_path: &Path) -> String {
    let mut out = String::new();

    out.push_str("=== econ - indicator fetch ===\n");
    out.push_str(&format!(
        "Observations: {} | rows: {} | conflicts: {} | duplicate rows: {}\n",
        run.build.observations,
        run.rows.len(),
        run.build.conflicts,
        run.build.duplicate_rows
    ));

    let partial: Vec<_> = run.pairs.iter().filter(|p| p.stop.is_some()).collect();
    if partial.is_empty() {
        out.push_str("All series fetched completely.\n");
    } else {
        out.push_str(&format!("\nIncomplete series ({}):\n", partial.len()));
        for p in partial {
            if let Some(stop) = &p.stop {
                out.push_str(&format!(
                    "- {} {:<12} page {}: {}\n",
                    p.country_code,
                    p.indicator.display_name(),
                    stop.page,
                    stop.error
                ));
            }
        }
    }

    let skipped: usize = run.pairs.iter().map(|p| p.invalid_entries).sum();
    if skipped > 0 {
        out.push_str(&format!("Skipped {skipped} unparseable entries.\n"));
    }

    out.push_str(&format!("\nSaved {} rows to {}\n", run.rows.len(), out_path.display()));
    out
}

/// One line per country: `CODE  Name`.
pub fn format_country_list(countries: &[CountryEntry]) -> String {
    let mut out = String::new();
    for c in countries {
        out.push_str(&format!("{:<4} {}\n", c.code, c.name));
    }
    out
}

/// A country's rows, one per year.
pub fn format_country_table(country_name: &str, rows: &[&IndicatorRow]) -> String {
    let mut out = String::new();
    out.push_str(&format!("{country_name}\n"));

    let mut header = format!("{:<6}", "Year");
    for indicator in Indicator::ALL {
        header.push_str(&format!(" {:>18}", indicator.column()));
    }
    out.push_str(&header);
    out.push('\n');
    out.push_str(&format!("{:-<6}{}\n", "", " ------------------".repeat(Indicator::ALL.len())));

    for row in rows {
        let mut line = format!("{:<6}", row.year);
        for indicator in Indicator::ALL {
            let cell = row.get(indicator).map(|v| fmt_value(indicator, v)).unwrap_or_else(|| "-".to_string());
            line.push_str(&format!(" {cell:>18}"));
        }
        out.push_str(line.trim_end());
        out.push('\n');
    }

    out
}

/// History tail plus projected points.
pub fn format_forecast(result: &ForecastResult, history_rows: usize) -> String {
    let mut out = String::new();
    let indicator = result.indicator;

    out.push_str(&format!(
        "=== {} forecast for {} (ARIMA(1,1,1)) ===\n",
        indicator.display_name(),
        result.country_name
    ));

    let skip = result.historical.len().saturating_sub(history_rows);
    out.push_str("History:\n");
    for p in result.historical.iter().skip(skip) {
        out.push_str(&format!("  {}  {:>18}\n", p.year, fmt_value(indicator, p.value)));
    }

    out.push_str("Forecast:\n");
    for p in &result.forecast {
        out.push_str(&format!("  {}  {:>18}\n", p.year, fmt_value(indicator, p.value)));
    }

    out
}

/// Plain-language notice shown instead of a forecast.
pub fn format_forecast_unavailable(country_name: &str, indicator: Indicator, err: &ForecastError) -> String {
    format!(
        "{} ({} for {})\n",
        err.user_message(),
        indicator.display_name(),
        country_name
    )
}

fn fmt_value(indicator: Indicator, v: f64) -> String {
    match indicator {
        Indicator::Gdp => fmt_usd(v),
        Indicator::Inflation | Indicator::Unemployment => format!("{v:.2}%"),
    }
}

fn fmt_usd(v: f64) -> String {
    let abs = v.abs();
    let (scaled, suffix) = if abs >= 1e12 {
        (v / 1e12, "T")
    } else if abs >= 1e9 {
        (v / 1e9, "B")
    } else if abs >= 1e6 {
        (v / 1e6, "M")
    } else {
        (v, "")
    };
    format!("${scaled:.2}{suffix}")
}
