//! Immutable view over the persisted wide table.
//!
//! Loaded once and passed by reference to the query/report code.

use std::collections::BTreeSet;

use crate::domain::{Indicator, IndicatorRow, YearValue};

#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    rows: Vec<IndicatorRow>,
}

/// A country as listed in the dataset.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct CountryEntry {
    pub name: String,
    pub code: String,
}

impl Dataset {
    pub fn new(rows: Vec<IndicatorRow>) -> Self {
        Self { rows }
    }

    pub fn rows(&self) -> &[IndicatorRow] {
        &self.rows
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Unique countries, sorted by name.
    pub fn countries(&self) -> Vec<CountryEntry> {
        let set: BTreeSet<CountryEntry> = self
            .rows
            .iter()
            .map(|r| CountryEntry {
                name: r.country_name.clone(),
                code: r.country_code.clone(),
            })
            .collect();
        set.into_iter().collect()
    }

    /// Resolve a display name or ISO3 code (case-insensitive) to the
    /// country name used in the table.
    pub fn resolve_country(&self, query: &str) -> Option<&str> {
        let query = query.trim();
        self.rows
            .iter()
            .find(|r| r.country_name.eq_ignore_ascii_case(query))
            .or_else(|| self.rows.iter().find(|r| r.country_code.eq_ignore_ascii_case(query)))
            .map(|r| r.country_name.as_str())
    }

    /// All rows for a country, sorted by year.
    pub fn country_rows(&self, country_name: &str) -> Vec<&IndicatorRow> {
        let mut rows: Vec<&IndicatorRow> = self
            .rows
            .iter()
            .filter(|r| r.country_name == country_name)
            .collect();
        rows.sort_by_key(|r| r.year);
        rows
    }

    /// Present values of one indicator for a country, sorted by year.
    pub fn series(&self, country_name: &str, indicator: Indicator) -> Vec<YearValue> {
        self.country_rows(country_name)
            .into_iter()
            .filter_map(|r| r.get(indicator).map(|v| YearValue::new(r.year, v)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(name: &str, code: &str, year: i32, gdp: Option<f64>) -> IndicatorRow {
        IndicatorRow {
            gdp,
            ..IndicatorRow::new(name, code, year)
        }
    }

    fn sample() -> Dataset {
        Dataset::new(vec![
            row("United States", "USA", 2021, Some(110.0)),
            row("Canada", "CAN", 2020, Some(50.0)),
            row("United States", "USA", 2019, None),
            row("United States", "USA", 2020, Some(100.0)),
        ])
    }

    #[test]
    fn countries_are_unique_and_sorted() {
        let names: Vec<String> = sample().countries().into_iter().map(|c| c.name).collect();
        assert_eq!(names, vec!["Canada", "United States"]);
    }

    #[test]
    fn resolve_by_name_or_code() {
        let ds = sample();
        assert_eq!(ds.resolve_country("usa"), Some("United States"));
        assert_eq!(ds.resolve_country("united states"), Some("United States"));
        assert_eq!(ds.resolve_country("Mars"), None);
    }

    #[test]
    fn series_is_sorted_and_skips_gaps() {
        let series = sample().series("United States", Indicator::Gdp);
        assert_eq!(series, vec![YearValue::new(2020, 100.0), YearValue::new(2021, 110.0)]);
    }
}
