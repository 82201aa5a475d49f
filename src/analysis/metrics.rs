//! Metric aggregation: per-horizon RMSE and the persistence baseline.

use chrono::{Duration, NaiveDate};
use serde::Serialize;

use super::{AccuracyTable, AnalysisError, Frame, HorizonTable, Result};
use crate::models::MAX_HORIZON;

// ---

/// Root mean squared error between two paired series.
///
/// Fails with `InvalidOperation` when the series are empty or of different
/// lengths, since the mean is undefined.
pub fn rmse(actual: &[f64], predicted: &[f64]) -> Result<f64> {
    // ---
    if actual.is_empty() {
        return Err(AnalysisError::InvalidOperation(
            "RMSE of an empty series".to_string(),
        ));
    }
    if actual.len() != predicted.len() {
        return Err(AnalysisError::InvalidOperation(format!(
            "RMSE of series with lengths {} and {}",
            actual.len(),
            predicted.len()
        )));
    }

    let n = actual.len() as f64;
    let mse = actual
        .iter()
        .zip(predicted)
        .map(|(a, p)| (a - p).powi(2))
        .sum::<f64>()
        / n;
    Ok(mse.sqrt())
}

/// RMSE of each forecast horizon 1..=6, one value per horizon.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AccuracySummary {
    /// `rmse[h - 1]` is the error of the `h` day forecast.
    pub rmse: [f64; MAX_HORIZON],
}

impl AccuracySummary {
    pub fn to_frame(&self) -> Frame {
        Frame::single_row(
            "Average Daily Forecast Error",
            (1..=MAX_HORIZON).map(|h| format!("{h} Day Forecast")).collect(),
            self.rmse.to_vec(),
        )
    }
}

/// Reduce the accuracy table to one RMSE per horizon.
///
/// Each horizon's defined errors are paired with the leading entries of the
/// `today+0` error column (all zero), so this is the RMSE of the errors
/// themselves. A horizon without any defined error fails the whole summary.
pub fn summarize(fac: &AccuracyTable) -> Result<AccuracySummary> {
    // ---
    let today0 = fac.defined(0);
    let mut rmse_by_horizon = [0.0; MAX_HORIZON];

    for (slot, horizon) in rmse_by_horizon.iter_mut().zip(1..=MAX_HORIZON) {
        let errors = fac.defined(horizon);
        let truth = today0.get(..errors.len()).ok_or_else(|| {
            AnalysisError::InvalidOperation(format!(
                "horizon {horizon} has more errors than today+0"
            ))
        })?;
        *slot = rmse(truth, &errors).map_err(|e| match e {
            AnalysisError::InvalidOperation(msg) => {
                AnalysisError::InvalidOperation(format!("horizon {horizon}: {msg}"))
            }
            other => other,
        })?;
    }

    Ok(AccuracySummary {
        rmse: rmse_by_horizon,
    })
}

/// Day-over-day change in the `today+0` temperature.
///
/// This is the error a "tomorrow equals today" forecast would make. One
/// value per issue date except the earliest.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PersistenceSeries {
    pub dates: Vec<NaiveDate>,
    pub deltas: Vec<f64>,
}

impl PersistenceSeries {
    pub fn len(&self) -> usize {
        self.deltas.len()
    }

    pub fn to_frame(&self) -> Frame {
        Frame {
            index: self.dates.iter().map(|d| d.to_string()).collect(),
            columns: vec!["Persistence Accuracy".to_string()],
            data: self.deltas.iter().map(|d| vec![Some(*d)]).collect(),
        }
    }
}

/// `today+0(d) - today+0(d - 1 day)` for every issue date but the earliest.
pub fn persistence(tf: &HorizonTable) -> Result<PersistenceSeries> {
    // ---
    let mut dates = Vec::with_capacity(tf.len().saturating_sub(1));
    let mut deltas = Vec::with_capacity(tf.len().saturating_sub(1));

    for &date in tf.dates().iter().skip(1) {
        let today = tf.get(date, 0)?;
        let yesterday = tf.get(date - Duration::days(1), 0)?;
        dates.push(date);
        deltas.push(today - yesterday);
    }

    Ok(PersistenceSeries { dates, deltas })
}

/// RMSE of the persistence deltas against the leading `today+0` errors.
pub fn persistence_rmse(pmodel: &PersistenceSeries, fac: &AccuracyTable) -> Result<f64> {
    // ---
    let today0 = fac.defined(0);
    let truth = today0.get(..pmodel.len()).ok_or_else(|| {
        AnalysisError::InvalidOperation("persistence series longer than today+0".to_string())
    })?;
    rmse(truth, &pmodel.deltas)
}

/// Forecast RMSE minus persistence RMSE per horizon 1..=6.
///
/// A positive value means the naive persistence model beat the forecast at
/// that horizon.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PersistenceComparison {
    pub difference: [f64; MAX_HORIZON],
}

impl PersistenceComparison {
    pub fn to_frame(&self) -> Frame {
        Frame::single_row(
            "BOM Error vs Persistence Error",
            (1..=MAX_HORIZON).map(|h| format!("{h} Day Error")).collect(),
            self.difference.to_vec(),
        )
    }
}

pub fn compare(summary: &AccuracySummary, persistence_rmse: f64) -> PersistenceComparison {
    PersistenceComparison {
        difference: summary.rmse.map(|r| r - persistence_rmse),
    }
}

/// Persistence delta next to the forecast errors of the same issue date.
///
/// Rows follow the persistence series; columns are `Persistence Accuracy`
/// then `1 Day Forecast` .. `6 Day Forecast`.
pub fn persistence_table(pmodel: &PersistenceSeries, fac: &AccuracyTable) -> Result<Frame> {
    // ---
    let mut columns = vec!["Persistence Accuracy".to_string()];
    columns.extend((1..=MAX_HORIZON).map(|h| format!("{h} Day Forecast")));

    let mut data = Vec::with_capacity(pmodel.len());
    for (&date, &delta) in pmodel.dates.iter().zip(&pmodel.deltas) {
        let errors = fac
            .row(date)
            .ok_or(AnalysisError::Lookup { date, horizon: 0 })?;
        let mut row = vec![Some(delta)];
        row.extend(errors.iter().skip(1).map(|e| e.map(|e| e as f64)));
        data.push(row);
    }

    Ok(Frame {
        index: pmodel.dates.iter().map(|d| d.to_string()).collect(),
        columns,
        data,
    })
}

#[cfg(test)]
impl AccuracySummary {
    fn horizon(&self, horizon: usize) -> Option<f64> {
        horizon.checked_sub(1).and_then(|i| self.rmse.get(i)).copied()
    }
}

#[cfg(test)]
impl PersistenceComparison {
    fn horizon(&self, horizon: usize) -> Option<f64> {
        horizon.checked_sub(1).and_then(|i| self.difference.get(i)).copied()
    }
}
