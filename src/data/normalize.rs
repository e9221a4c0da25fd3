//! Raw entry -> `Observation`.
//!
//! Missing values are skipped, not zero-filled. A year or value that does not
//! parse is an error for that entry alone.

use serde_json::Value;

use crate::data::pages::RawEntry;
use crate::domain::{Indicator, Observation};
use crate::error::NormalizeError;

/// The (country, indicator) request an entry came from.
///
/// The country code in the output table is the one we asked for, not whatever
/// code the API echoes back.
#[derive(Debug, Clone, Copy)]
pub struct SeriesRequest<'a> {
    pub country_code: &'a str,
    pub indicator: Indicator,
}

/// Normalize one entry. `Ok(None)` means the entry carried no value.
pub fn normalize(entry: &RawEntry, request: SeriesRequest<'_>) -> Result<Option<Observation>, NormalizeError> {
    let value = match &entry.value {
        Value::Null => return Ok(None),
        Value::Number(n) => n
            .as_f64()
            .filter(|v| v.is_finite())
            .ok_or_else(|| NormalizeError::InvalidValue(n.to_string()))?,
        Value::String(s) => parse_float(s)?,
        other => return Err(NormalizeError::InvalidValue(other.to_string())),
    };

    let year = parse_year(&entry.date)?;

    Ok(Some(Observation {
        country_name: entry.country.value.trim().to_string(),
        country_code: request.country_code.to_string(),
        year,
        indicator: request.indicator,
        value,
    }))
}

fn parse_float(raw: &str) -> Result<f64, NormalizeError> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| NormalizeError::InvalidValue(raw.to_string()))
}

fn parse_year(date: &Value) -> Result<i32, NormalizeError> {
    match date {
        Value::String(s) => s
            .trim()
            .parse::<i32>()
            .map_err(|_| NormalizeError::InvalidYear(s.clone())),
        Value::Number(n) => n
            .as_i64()
            .and_then(|y| i32::try_from(y).ok())
            .ok_or_else(|| NormalizeError::InvalidYear(n.to_string())),
        other => Err(NormalizeError::InvalidYear(other.to_string())),
    }
}
