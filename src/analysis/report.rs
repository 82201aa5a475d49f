//! One full pass of the accuracy pipeline over a loaded record set.

use chrono::NaiveDate;
use serde::Serialize;

use super::{
    align, compare, persistence, persistence_rmse, persistence_table, pivot, summarize,
    AnalysisError, Frame, Result,
};
use crate::models::ForecastRecord;

// ---

/// Overview of the loaded records.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DataSummary {
    pub record_count: usize,
    pub first_issue: NaiveDate,
    pub last_issue: NaiveDate,
    /// Same-day forecast text from the most recent issue, if the store has one.
    pub todays_forecast: Option<String>,
}

impl DataSummary {
    pub fn from_records(records: &[ForecastRecord]) -> Result<Self> {
        // ---
        let first_issue = records.iter().map(|r| r.issue).min().ok_or(AnalysisError::NoRecords)?;
        let last_issue = records.iter().map(|r| r.issue).max().ok_or(AnalysisError::NoRecords)?;
        let todays_forecast = records
            .iter()
            .find(|r| r.issue == last_issue && r.forecast == 0)
            .and_then(|r| r.extended_text.clone());

        Ok(DataSummary {
            record_count: records.len(),
            first_issue,
            last_issue,
            todays_forecast,
        })
    }
}

/// Every derived table, ready to render.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AccuracyReport {
    pub summary: DataSummary,
    pub horizons: Frame,
    pub errors: Frame,
    pub accuracy: Frame,
    pub persistence: Frame,
    pub persistence_rmse: f64,
    pub persistence_table: Frame,
    pub persistence_vs: Frame,
}

impl AccuracyReport {
    /// Run pivot, align and the metrics once over `records`.
    ///
    /// Any failure aborts the whole report; there are no partial results.
    pub fn build(records: &[ForecastRecord]) -> Result<Self> {
        // ---
        let summary = DataSummary::from_records(records)?;

        let tf = pivot(records)?;
        let fac = align(&tf)?;
        let accuracy = summarize(&fac)?;
        let pmodel = persistence(&tf)?;
        let pmodel_rmse = persistence_rmse(&pmodel, &fac)?;
        let persistence_vs = compare(&accuracy, pmodel_rmse);

        tracing::info!(
            "Built accuracy report: {} issue dates, 1 day RMSE {:.3}, persistence RMSE {:.3}",
            tf.len(),
            accuracy.rmse[0],
            pmodel_rmse
        );

        Ok(AccuracyReport {
            summary,
            horizons: tf.to_frame(),
            errors: fac.to_frame(),
            accuracy: accuracy.to_frame(),
            persistence_table: persistence_table(&pmodel, &fac)?,
            persistence: pmodel.to_frame(),
            persistence_rmse: pmodel_rmse,
            persistence_vs: persistence_vs.to_frame(),
        })
    }
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;
    use crate::models::HORIZON_COUNT;
    use chrono::Duration;

    fn records(days: i64) -> Vec<ForecastRecord> {
        // ---
        let start = NaiveDate::from_ymd_opt(2020, 10, 1).unwrap();
        (0..days)
            .flat_map(|i| {
                let issue = start + Duration::days(i);
                (0..HORIZON_COUNT).map(move |h| ForecastRecord {
                    date: issue + Duration::days(h as i64),
                    forecast: h,
                    // forecasts run one degree warm per day of lead time
                    temp_max: Some(18.0 + (i % 3) as f64 + h as f64 + 0.6),
                    issue,
                    extended_text: Some(format!("Issue {i} horizon {h}")),
                })
            })
            .collect()
    }

    #[test]
    fn test_report_end_to_end() {
        // ---
        let report = AccuracyReport::build(&records(9)).unwrap();

        assert_eq!(report.summary.record_count, 63);
        assert_eq!(report.summary.first_issue.to_string(), "2020-10-01");
        assert_eq!(report.summary.last_issue.to_string(), "2020-10-09");
        assert_eq!(report.summary.todays_forecast.as_deref(), Some("Issue 8 horizon 0"));

        assert_eq!(report.horizons.index.len(), 9);
        assert_eq!(report.errors.index.len(), 9);
        assert_eq!(report.persistence.index.len(), 8);
        assert_eq!(report.persistence_table.index.len(), 8);

        for h in 1..=6 {
            let label = format!("{h} Day Forecast");
            let rmse = report.accuracy.cell("Average Daily Forecast Error", &label).unwrap();
            let vs = report
                .persistence_vs
                .cell("BOM Error vs Persistence Error", &format!("{h} Day Error"))
                .unwrap();
            assert_eq!(vs, rmse - report.persistence_rmse);
        }
    }

    #[test]
    fn test_report_fails_on_incomplete_batch() {
        // ---
        let mut recs = records(8);
        recs.retain(|r| !(r.issue.to_string() == "2020-10-04" && r.forecast == 3));

        let err = AccuracyReport::build(&recs).unwrap_err();
        assert!(matches!(err, AnalysisError::IncompleteIssue { .. }));
        assert_eq!(err.kind(), super::super::error::ErrorKind::LookupFailure);
    }

    #[test]
    fn test_report_without_records() {
        // ---
        assert_eq!(AccuracyReport::build(&[]).unwrap_err(), AnalysisError::NoRecords);
    }
}
