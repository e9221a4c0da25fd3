//! The fetch pipeline.
//!
//! countries -> indicators -> pages, one request at a time:
//! page walk -> normalize -> accumulate -> pivot/dedup
//!
//! A failing page, or a bad entry, only shrinks the result. Nothing inside the
//! loop aborts the run; each (country, indicator) pair gets a `PairReport`
//! describing what happened.

use tracing::{info, info_span, warn};

use crate::data::{FetchClient, HttpTransport, ReqwestTransport, SeriesRequest, WalkStop, normalize, walk};
use crate::domain::{FetchConfig, Indicator, IndicatorRow, Observation};
use crate::error::AppError;
use crate::table::{BuildStats, build_table};

/// What happened while fetching one (country, indicator) pair.
#[derive(Debug, Clone, PartialEq)]
pub struct PairReport {
    pub country_code: String,
    pub indicator: Indicator,
    pub pages_visited: u32,
    pub total_pages: Option<u32>,
    pub observations: usize,
    pub missing_values: usize,
    /// Entries dropped for bad shape, year or value.
    pub invalid_entries: usize,
    pub stop: Option<WalkStop>,
}

/// All outputs of a single `econ fetch` run.
#[derive(Debug, Clone)]
pub struct FetchRun {
    pub rows: Vec<IndicatorRow>,
    pub build: BuildStats,
    pub pairs: Vec<PairReport>,
}

/// Execute the full fetch pipeline against the live API.
pub fn run_fetch(config: &FetchConfig) -> Result<FetchRun, AppError> {
    let transport = ReqwestTransport::new(config.timeout)?;
    let client = FetchClient::new(transport, config.retry.clone());
    Ok(run_fetch_with_client(&client, config))
}

/// Execute the fetch pipeline with a caller-supplied client.
pub fn run_fetch_with_client<T: HttpTransport>(client: &FetchClient<T>, config: &FetchConfig) -> FetchRun {
    let (observations, pairs) = fetch_observations(client, &config.base_url, &config.countries, &config.indicators);
    let (rows, build) = build_table(&observations);

    info!(
        observations = build.observations,
        rows = rows.len(),
        conflicts = build.conflicts,
        duplicate_rows = build.duplicate_rows,
        "table built"
    );

    FetchRun { rows, build, pairs }
}

/// Walk every (country, indicator) pair and collect normalized observations.
pub fn fetch_observations<T: HttpTransport>(
    client: &FetchClient<T>,
    base_url: &str,
    countries: &[String],
    indicators: &[Indicator],
) -> (Vec<Observation>, Vec<PairReport>) {
    let mut observations = Vec::new();
    let mut pairs = Vec::with_capacity(countries.len() * indicators.len());

    for country in countries {
        for &indicator in indicators {
            let _span = info_span!("series", country = %country, indicator = indicator.code()).entered();
            let report = fetch_pair(client, base_url, country, indicator, &mut observations);

            if let Some(stop) = &report.stop {
                warn!(page = stop.page, error = %stop.error, "walk stopped early; remaining pages treated as empty");
            }
            info!(
                pages = report.pages_visited,
                total_pages = report.total_pages.unwrap_or(0),
                observations = report.observations,
                missing = report.missing_values,
                invalid = report.invalid_entries,
                "series fetched"
            );
            pairs.push(report);
        }
    }

    (observations, pairs)
}

fn fetch_pair<T: HttpTransport>(
    client: &FetchClient<T>,
    base_url: &str,
    country_code: &str,
    indicator: Indicator,
    out: &mut Vec<Observation>,
) -> PairReport {
    let request = SeriesRequest {
        country_code,
        indicator,
    };
    let mut report = PairReport {
        country_code: country_code.to_string(),
        indicator,
        pages_visited: 0,
        total_pages: None,
        observations: 0,
        missing_values: 0,
        invalid_entries: 0,
        stop: None,
    };

    let mut pages = walk(client, base_url, country_code, indicator.code());
    for entry in pages.by_ref() {
        match normalize(&entry, request) {
            Ok(Some(obs)) => {
                out.push(obs);
                report.observations += 1;
            }
            Ok(None) => report.missing_values += 1,
            Err(_) => report.invalid_entries += 1,
        }
    }

    report.pages_visited = pages.pages_visited();
    report.total_pages = pages.total_pages();
    report.invalid_entries += pages.malformed_entries();
    report.stop = pages.stop().cloned();
    report
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;
    use std::time::Duration;

    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;
    use crate::data::client::testing::ScriptedTransport;
    use crate::data::series_url;
    use crate::domain::RetryPolicy;
    use crate::error::FetchError;

    const BASE: &str = "https://api.test/v2";
    const GDP: &str = "NY.GDP.MKTP.CD";

    fn config(countries: &[&str], indicators: &[Indicator]) -> FetchConfig {
        FetchConfig {
            base_url: BASE.to_string(),
            countries: countries.iter().map(|c| c.to_string()).collect(),
            indicators: indicators.to_vec(),
            out_path: PathBuf::from("unused.csv"),
            retry: RetryPolicy::immediate(3),
            timeout: Duration::from_secs(1),
        }
    }

    fn body(pages: u32, name: &str, entries: &[(&str, serde_json::Value)]) -> String {
        let entries: Vec<serde_json::Value> = entries
            .iter()
            .map(|(date, value)| json!({"country": {"id": "XX", "value": name}, "date": date, "value": value}))
            .collect();
        json!([{"page": 1, "pages": pages}, entries]).to_string()
    }

    #[test]
    fn two_pages_become_two_rows() {
        let transport = ScriptedTransport::default();
        transport.push(&series_url(BASE, "USA", GDP, 1), 200, &body(2, "United States", &[("2020", json!(100))]));
        transport.push(&series_url(BASE, "USA", GDP, 2), 200, &body(2, "United States", &[("2021", json!(110))]));

        let client = FetchClient::new(&transport, RetryPolicy::immediate(3));
        let run = run_fetch_with_client(&client, &config(&["USA"], &[Indicator::Gdp]));

        assert_eq!(
            run.rows,
            vec![
                IndicatorRow {
                    gdp: Some(100.0),
                    ..IndicatorRow::new("United States", "USA", 2020)
                },
                IndicatorRow {
                    gdp: Some(110.0),
                    ..IndicatorRow::new("United States", "USA", 2021)
                },
            ]
        );
        assert_eq!(run.pairs[0].pages_visited, 2);
        assert_eq!(run.pairs[0].stop, None);
    }

    #[test]
    fn null_values_produce_no_rows() {
        let transport = ScriptedTransport::default();
        transport.push(&series_url(BASE, "USA", GDP, 1), 200, &body(1, "United States", &[("2020", json!(null))]));

        let client = FetchClient::new(&transport, RetryPolicy::immediate(3));
        let run = run_fetch_with_client(&client, &config(&["USA"], &[Indicator::Gdp]));

        assert!(run.rows.is_empty());
        assert_eq!(run.pairs[0].missing_values, 1);
        assert_eq!(run.pairs[0].observations, 0);
    }

    #[test]
    fn exhausted_retries_skip_only_the_failing_pair() {
        let transport = ScriptedTransport::default();
        for _ in 0..4 {
            transport.push(&series_url(BASE, "USA", GDP, 1), 503, "");
        }
        transport.push(&series_url(BASE, "CAN", GDP, 1), 200, &body(1, "Canada", &[("2020", json!(1.7e12))]));

        let client = FetchClient::new(&transport, RetryPolicy::immediate(3));
        let run = run_fetch_with_client(&client, &config(&["USA", "CAN"], &[Indicator::Gdp]));

        assert_eq!(run.rows.len(), 1);
        assert_eq!(run.rows[0].country_code, "CAN");
        assert_eq!(
            run.pairs[0].stop,
            Some(WalkStop {
                page: 1,
                error: FetchError::Transient { status: 503, attempts: 4 },
            })
        );
        assert_eq!(transport.request_count(), 5);
    }

    #[test]
    fn indicators_pivot_into_shared_rows() {
        let transport = ScriptedTransport::default();
        let inflation = Indicator::Inflation.code();
        transport.push(&series_url(BASE, "FRA", GDP, 1), 200, &body(1, "France", &[("2020", json!(2.6e12))]));
        transport.push(
            &series_url(BASE, "FRA", inflation, 1),
            200,
            &body(1, "France", &[("2020", json!(0.5)), ("2019", json!("bad"))]),
        );

        let client = FetchClient::new(&transport, RetryPolicy::immediate(3));
        let run = run_fetch_with_client(&client, &config(&["FRA"], &[Indicator::Gdp, Indicator::Inflation]));

        assert_eq!(run.rows.len(), 1);
        assert_eq!(run.rows[0].gdp, Some(2.6e12));
        assert_eq!(run.rows[0].inflation, Some(0.5));
        assert_eq!(run.pairs[1].invalid_entries, 1);
    }
}
