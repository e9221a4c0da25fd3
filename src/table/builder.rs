//! Pivot long-format observations into the wide (country, year) table.
//!
//! Conflict policy is first-wins: if the same (country, year, indicator) shows
//! up twice, the value seen first is kept. The API should not emit duplicates
//! within one walk, so this mostly matters for revised figures spread across
//! pages, where first-wins may keep the older number.

use std::collections::{BTreeMap, HashSet};

use crate::domain::{IndicatorRow, Observation};

/// Counts from a table build, for the fetch summary.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BuildStats {
    pub observations: usize,
    /// Values dropped because an earlier one already filled the cell.
    pub conflicts: usize,
    /// Rows removed by the (country, year) dedup after the pivot.
    pub duplicate_rows: usize,
}

/// Pivot observations into one row per (country, year).
///
/// Output order is by (country name, country code, year), so the same input
/// always yields the same table.
pub fn build_table(observations: &[Observation]) -> (Vec<IndicatorRow>, BuildStats) {
    let mut stats = BuildStats {
        observations: observations.len(),
        ..BuildStats::default()
    };

    let mut groups: BTreeMap<(&str, &str, i32), IndicatorRow> = BTreeMap::new();
    for obs in observations {
        let key = (obs.country_name.as_str(), obs.country_code.as_str(), obs.year);
        let row = groups
            .entry(key)
            .or_insert_with(|| IndicatorRow::new(&obs.country_name, &obs.country_code, obs.year));
        if !row.set_first(obs.indicator, obs.value) {
            stats.conflicts += 1;
        }
    }

    // The same country name may arrive under two codes (e.g. a renamed ISO
    // code); keep the first row per (country, year).
    let mut seen: HashSet<(String, i32)> = HashSet::new();
    let mut rows = Vec::with_capacity(groups.len());
    for row in groups.into_values() {
        if seen.insert((row.country_name.clone(), row.year)) {
            rows.push(row);
        } else {
            stats.duplicate_rows += 1;
        }
    }

    (rows, stats)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::domain::Indicator;

    fn obs(name: &str, code: &str, year: i32, indicator: Indicator, value: f64) -> Observation {
        Observation {
            country_name: name.to_string(),
            country_code: code.to_string(),
            year,
            indicator,
            value,
        }
    }

    #[test]
    fn pivots_indicators_into_one_row() {
        let input = vec![
            obs("United States", "USA", 2020, Indicator::Gdp, 100.0),
            obs("United States", "USA", 2020, Indicator::Inflation, 1.2),
            obs("United States", "USA", 2021, Indicator::Gdp, 110.0),
            obs("United States", "USA", 2020, Indicator::Unemployment, 8.1),
        ];

        let (rows, stats) = build_table(&input);
        assert_eq!(
            rows,
            vec![
                IndicatorRow {
                    country_name: "United States".to_string(),
                    country_code: "USA".to_string(),
                    year: 2020,
                    gdp: Some(100.0),
                    inflation: Some(1.2),
                    unemployment: Some(8.1),
                },
                IndicatorRow {
                    country_name: "United States".to_string(),
                    country_code: "USA".to_string(),
                    year: 2021,
                    gdp: Some(110.0),
                    inflation: None,
                    unemployment: None,
                },
            ]
        );
        assert_eq!(stats, BuildStats { observations: 4, conflicts: 0, duplicate_rows: 0 });
    }

    #[test]
    fn first_value_wins() {
        let input = vec![
            obs("Canada", "CAN", 2019, Indicator::Gdp, 1.0),
            obs("Canada", "CAN", 2019, Indicator::Gdp, 2.0),
        ];
        let (rows, stats) = build_table(&input);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].gdp, Some(1.0));
        assert_eq!(stats.conflicts, 1);
    }

    #[test]
    fn no_two_rows_share_country_and_year() {
        let input = vec![
            obs("Germany", "DEU", 2020, Indicator::Gdp, 1.0),
            obs("Germany", "DE", 2020, Indicator::Inflation, 0.5),
            obs("Germany", "DEU", 2021, Indicator::Gdp, 2.0),
            obs("France", "FRA", 2020, Indicator::Gdp, 3.0),
        ];
        let (rows, stats) = build_table(&input);

        let mut keys: Vec<(&str, i32)> = rows.iter().map(|r| (r.country_name.as_str(), r.year)).collect();
        let before = keys.len();
        keys.sort();
        keys.dedup();
        assert_eq!(keys.len(), before);
        assert_eq!(rows.len(), 3);
        assert_eq!(stats.duplicate_rows, 1);
    }

    #[test]
    fn rebuilding_is_deterministic() {
        let input = vec![
            obs("Japan", "JPN", 2001, Indicator::Unemployment, 5.0),
            obs("Brazil", "BRA", 2000, Indicator::Gdp, 7.0),
            obs("Japan", "JPN", 2000, Indicator::Gdp, 9.0),
        ];
        let (a, _) = build_table(&input);
        let (b, _) = build_table(&input);
        assert_eq!(a[0].country_name, "Brazil");

        let mut first = Vec::new();
        let mut second = Vec::new();
        crate::io::write_table(&mut first, &a).unwrap();
        crate::io::write_table(&mut second, &b).unwrap();
        assert!(!first.is_empty());
        assert_eq!(first, second);
    }

    #[test]
    fn empty_input_builds_empty_table() {
        let (rows, stats) = build_table(&[]);
        assert!(rows.is_empty());
        assert_eq!(stats, BuildStats::default());
    }
}
