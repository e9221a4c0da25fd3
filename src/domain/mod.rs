//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - the indicator catalogue (`Indicator`)
//! - long-format observations (`Observation`) and wide rows (`IndicatorRow`)
//! - forecast outputs (`Forecast`, `ForecastResult`)
//! - run configuration (`FetchConfig`, `RetryPolicy`)

pub mod types;

pub use types::*;
