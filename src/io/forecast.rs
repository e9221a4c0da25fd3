//! Read/write forecast JSON files.
//!
//! A forecast file is the portable form of one `forecast` run: history,
//! projected points and the run metadata needed to plot them later.

use std::fs::File;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::ForecastResult;
use crate::error::AppError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForecastFile {
    pub tool: String,
    pub generated_at: DateTime<Utc>,
    pub model: String,
    #[serde(flatten)]
    pub result: ForecastResult,
}

impl ForecastFile {
    pub fn new(result: ForecastResult) -> Self {
        Self {
            tool: "econ".to_string(),
            generated_at: Utc::now(),
            model: "ARIMA(1,1,1)".to_string(),
            result,
        }
    }
}

/// Write a forecast JSON file.
pub fn write_forecast_json(path: &Path, result: &ForecastResult) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create forecast JSON '{}': {e}", path.display())))?;

    serde_json::to_writer_pretty(file, &ForecastFile::new(result.clone()))
        .map_err(|e| AppError::new(2, format!("Failed to write forecast JSON: {e}")))?;

    Ok(())
}
