//! Forecast adapter.
//!
//! Turns one country's history for one indicator into `horizon` projected
//! annual points, or a `ForecastError` when that is not possible:
//!
//! - reindex onto an annual calendar (`annual`)
//! - gate on the number of observed years
//! - fit ARIMA(1,1,1) and project (`arima`)
//!
//! Every failure is reported as a `ForecastError`; callers only need to know
//! whether a forecast is available.

pub mod annual;
pub mod arima;

pub use annual::AnnualSeries;
pub use arima::Arima111;

use crate::domain::{Forecast, ForecastResult, Indicator, MAX_HORIZON, MIN_FORECAST_POINTS, YearValue};
use crate::error::ForecastError;
use crate::table::Dataset;

/// Forecast `horizon` years past the last observed year of `series`.
///
/// `series` need not be sorted. Fewer than `MIN_FORECAST_POINTS` observed
/// years fails without fitting.
pub fn forecast(series: &[YearValue], horizon: usize) -> Result<Forecast, ForecastError> {
    if horizon > MAX_HORIZON {
        return Err(ForecastError::ModelFit(format!(
            "horizon {horizon} exceeds {MAX_HORIZON} years"
        )));
    }

    let annual = AnnualSeries::from_points(series)?;
    let observed = annual.observed_len();
    if observed < MIN_FORECAST_POINTS {
        return Err(ForecastError::InsufficientHistory {
            required: MIN_FORECAST_POINTS,
            actual: observed,
        });
    }

    let years = future_years(annual.last_year(), horizon)
        .ok_or_else(|| ForecastError::ModelFit("forecast years run past the calendar".to_string()))?;

    let model = Arima111::fit(&annual.interpolated())?;
    let values = model.forecast(horizon)?;

    Ok(Forecast { years, values })
}

/// `last_year + 1 ..= last_year + horizon`, or `None` on overflow.
fn future_years(last_year: i32, horizon: usize) -> Option<Vec<i32>> {
    (1..=horizon)
        .map(|k| i32::try_from(k).ok().and_then(|k| last_year.checked_add(k)))
        .collect()
}

/// Forecast one indicator for one country of the dataset.
///
/// `country_name` must be the name as stored in the table (see
/// `Dataset::resolve_country`).
pub fn forecast_indicator(
    dataset: &Dataset,
    country_name: &str,
    indicator: Indicator,
    horizon: usize,
) -> Result<ForecastResult, ForecastError> {
    let historical = dataset.series(country_name, indicator);
    let projected = forecast(&historical, horizon)?;

    Ok(ForecastResult {
        country_name: country_name.to_string(),
        indicator,
        historical,
        forecast: projected.points(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::IndicatorRow;

    fn series(start: i32, values: &[f64]) -> Vec<YearValue> {
        values
            .iter()
            .enumerate()
            .map(|(i, &v)| YearValue::new(start + i as i32, v))
            .collect()
    }

    #[test]
    fn four_years_is_insufficient() {
        let err = forecast(&series(2018, &[1.0, 2.0, 3.0, 4.0]), 5).unwrap_err();
        assert_eq!(err, ForecastError::InsufficientHistory { required: 5, actual: 4 });
    }

    #[test]
    fn empty_series_is_insufficient() {
        assert!(matches!(
            forecast(&[], 5),
            Err(ForecastError::InsufficientHistory { actual: 0, .. })
        ));
    }

    #[test]
    fn gaps_do_not_count_toward_minimum() {
        // Six calendar years but only four observations.
        let points = vec![
            YearValue::new(2000, 1.0),
            YearValue::new(2002, 3.0),
            YearValue::new(2004, 5.0),
            YearValue::new(2005, 6.0),
        ];
        assert!(matches!(
            forecast(&points, 5),
            Err(ForecastError::InsufficientHistory { actual: 4, .. })
        ));
    }

    #[test]
    fn labels_follow_last_observed_year() {
        let points = series(2015, &[2.1, 2.4, 1.9, 2.8, 3.5, 3.1, 2.7]);
        let f = forecast(&points, 5).unwrap();
        assert_eq!(f.years, vec![2022, 2023, 2024, 2025, 2026]);
        assert_eq!(f.values.len(), 5);
        assert!(f.values.iter().all(|v| v.is_finite()));
    }

    #[test]
    fn unsorted_input_with_gap_is_reindexed() {
        let points = vec![
            YearValue::new(2006, 6.0),
            YearValue::new(2000, 0.0),
            YearValue::new(2001, 1.0),
            YearValue::new(2003, 3.0),
            YearValue::new(2004, 4.0),
            YearValue::new(2005, 5.0),
        ];
        let f = forecast(&points, 2).unwrap();
        assert_eq!(f.years, vec![2007, 2008]);
    }

    #[test]
    fn fit_failure_is_reported_as_forecast_error() {
        let points = series(2000, &[1e200, -1e200, 1e200, -1e200, 1e200]);
        let err = forecast(&points, 5).unwrap_err();
        assert!(matches!(err, ForecastError::ModelFit(_)));
        assert_eq!(
            err.user_message(),
            ForecastError::InsufficientHistory { required: 5, actual: 0 }.user_message()
        );
    }

    #[test]
    fn years_at_the_end_of_the_integer_range_do_not_panic() {
        let points = series(i32::MAX - 4, &[1.0, 2.0, 3.0, 4.0, 5.0]);
        let outcome = std::panic::catch_unwind(|| forecast(&points, 5));
        assert!(matches!(outcome, Ok(Err(ForecastError::InsufficientHistory { .. }))));
    }

    #[test]
    fn future_years_overflow_is_none() {
        assert_eq!(future_years(2020, 3), Some(vec![2021, 2022, 2023]));
        assert_eq!(future_years(i32::MAX - 1, 2), None);
        assert_eq!(future_years(2020, 0), Some(vec![]));
    }

    #[test]
    fn horizon_is_bounded() {
        let points = series(2000, &[1.0, 2.0, 3.0, 4.0, 5.0]);
        assert!(matches!(forecast(&points, MAX_HORIZON + 1), Err(ForecastError::ModelFit(_))));
        assert_eq!(forecast(&points, MAX_HORIZON).unwrap().years.len(), MAX_HORIZON);
    }

    #[test]
    fn far_apart_years_fail_without_allocating_the_gap() {
        let mut points = series(2000, &[1.0, 2.0, 3.0, 4.0, 5.0]);
        points.push(YearValue::new(200_000, 6.0));
        assert!(matches!(forecast(&points, 5), Err(ForecastError::ModelFit(_))));
    }

    #[test]
    fn forecast_indicator_reads_sorted_history() {
        let rows = (0..6)
            .rev()
            .map(|i| IndicatorRow {
                inflation: Some(2.0 + i as f64 * 0.1),
                ..IndicatorRow::new("Mexico", "MEX", 2010 + i)
            })
            .collect();
        let dataset = Dataset::new(rows);

        let result = forecast_indicator(&dataset, "Mexico", Indicator::Inflation, 3).unwrap();
        assert_eq!(result.historical.first().map(|p| p.year), Some(2010));
        assert_eq!(result.historical.last().map(|p| p.year), Some(2015));
        let years: Vec<i32> = result.forecast.iter().map(|p| p.year).collect();
        assert_eq!(years, vec![2016, 2017, 2018]);

        assert!(forecast_indicator(&dataset, "Mexico", Indicator::Gdp, 3).is_err());
    }
}
