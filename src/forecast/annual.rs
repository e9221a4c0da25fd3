//! Annual reindexing.
//!
//! The model assumes one observation per period, so a country's history is
//! laid onto a calendar with one slot per year (anchored at 1 January) from the
//! first to the last observed year. Years inside that range with no
//! observation become gaps.

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};

use crate::domain::{MIN_FORECAST_POINTS, YearValue};
use crate::error::ForecastError;

/// Widest calendar, in years, a single history may cover.
pub const MAX_SPAN_YEARS: usize = 500;

#[derive(Debug, Clone, PartialEq)]
pub struct AnnualSeries {
    end: NaiveDate,
    slots: Vec<Option<f64>>,
}

fn anchor(year: i32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year, 1, 1)
}

impl AnnualSeries {
    /// Reindex `points` onto an annual calendar.
    ///
    /// Non-finite values, and years outside the calendar's range, count as
    /// missing. If a year occurs twice, the first value is kept.
    pub fn from_points(points: &[YearValue]) -> Result<Self, ForecastError> {
        let mut by_anchor: BTreeMap<NaiveDate, f64> = BTreeMap::new();
        for p in points.iter().filter(|p| p.value.is_finite()) {
            if let Some(date) = anchor(p.year) {
                by_anchor.entry(date).or_insert(p.value);
            }
        }

        let (Some((&start, _)), Some((&end, _))) = (by_anchor.first_key_value(), by_anchor.last_key_value()) else {
            return Err(ForecastError::InsufficientHistory {
                required: MIN_FORECAST_POINTS,
                actual: 0,
            });
        };

        // Both years are inside the calendar range, so this cannot overflow.
        let span = (end.year() - start.year()) as usize + 1;
        if span > MAX_SPAN_YEARS {
            return Err(ForecastError::ModelFit(format!(
                "history spans {span} years; at most {MAX_SPAN_YEARS} are supported"
            )));
        }

        let slots = (start.year()..=end.year())
            .map(|y| anchor(y).and_then(|d| by_anchor.get(&d).copied()))
            .collect();
        Ok(Self { end, slots })
    }

    /// Last slot year; always an observed year.
    pub fn last_year(&self) -> i32 {
        self.end.year()
    }

    /// Number of calendar slots, gaps included.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Number of slots holding an observation.
    pub fn observed_len(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    /// Slot values with gaps filled by linear interpolation between the
    /// neighbouring observed years.
    pub fn interpolated(&self) -> Vec<f64> {
        let mut out = Vec::with_capacity(self.slots.len());
        let mut prev: Option<(usize, f64)> = None;

        // Gap slots are filled when the next observation arrives; the last
        // slot is always observed.
        for (i, slot) in self.slots.iter().enumerate() {
            let Some(v) = *slot else { continue };
            if let Some((pi, pv)) = prev {
                let span = (i - pi) as f64;
                for k in (pi + 1)..i {
                    let u = (k - pi) as f64 / span;
                    out.push(pv + u * (v - pv));
                }
            }
            out.push(v);
            prev = Some((i, v));
        }

        out
    }
}
