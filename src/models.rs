//! Data models for forecast records loaded from the store.

use chrono::NaiveDate;
use serde::Serialize;

use crate::analysis::{AnalysisError, Result};

// ---

/// Furthest horizon in a forecast batch (today+6).
pub const MAX_HORIZON: usize = 6;

/// Number of horizons in a batch, today+0 through today+6.
pub const HORIZON_COUNT: usize = MAX_HORIZON + 1;

/// Column label used for a horizon in the horizon and accuracy tables.
pub fn horizon_label(horizon: usize) -> String {
    format!("today+{horizon}")
}

/// Forecast row as stored, with dates still in their textual form.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct RawForecastRow {
    // ---
    pub date: String,
    pub forecast: i32,
    pub temp_max: Option<f64>,
    pub issue: String,
    pub extended_text: Option<String>,
}

/// One forecast for one target date, validated and ready for analysis.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForecastRecord {
    // ---
    pub date: NaiveDate,
    pub forecast: usize,
    /// Predicted maximum temperature in degrees Celsius; `None` if the store has no value.
    pub temp_max: Option<f64>,
    /// Calendar day the forecast batch was issued.
    pub issue: NaiveDate,
    pub extended_text: Option<String>,
}

impl RawForecastRow {
    // ---
    pub fn to_record(&self) -> Result<ForecastRecord> {
        // ---
        let date = parse_day(&self.date)?;
        let issue = parse_day(&self.issue)?;

        let forecast = usize::try_from(self.forecast)
            .ok()
            .filter(|h| *h <= MAX_HORIZON)
            .ok_or(AnalysisError::InvalidHorizon {
                issue,
                horizon: self.forecast,
            })?;

        Ok(ForecastRecord {
            date,
            forecast,
            temp_max: self.temp_max,
            issue,
            extended_text: self.extended_text.clone(),
        })
    }
}

/// Reduce an ISO date or timestamp string to its calendar day.
fn parse_day(text: &str) -> Result<NaiveDate> {
    // ---
    let trimmed = text.trim();
    let day = trimmed.get(..10).unwrap_or(trimmed);
    NaiveDate::parse_from_str(day, "%Y-%m-%d")
        .map_err(|e| AnalysisError::InvalidRecord(format!("bad date '{text}': {e}")))
}
