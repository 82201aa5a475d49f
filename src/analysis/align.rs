//! Accuracy aligner.
//!
//! Lines each forecast up with the `today+0` value recorded on the day it
//! targeted and keeps the signed difference. Cell `(d, h)` of the result is
//! `today+0(d + h) - today+h(d)`; the last `h` dates of column `h` have no
//! target yet and stay absent.

use chrono::{Duration, NaiveDate};

use super::{AnalysisError, Frame, HorizonTable, Result};
use crate::models::{horizon_label, HORIZON_COUNT, MAX_HORIZON};

// ---

/// Signed forecast error per issue date and horizon, in whole degrees.
#[derive(Debug, Clone, PartialEq)]
pub struct AccuracyTable {
    dates: Vec<NaiveDate>,
    columns: Vec<Vec<Option<i64>>>,
}

impl AccuracyTable {
    // ---
    /// Errors for one horizon in issue-date order, `None` where undefined.
    pub fn column(&self, horizon: usize) -> &[Option<i64>] {
        self.columns.get(horizon).map(Vec::as_slice).unwrap_or(&[])
    }

    /// The defined errors of one horizon, oldest first.
    pub fn defined(&self, horizon: usize) -> Vec<f64> {
        self.column(horizon)
            .iter()
            .flatten()
            .map(|e| *e as f64)
            .collect()
    }

    pub fn row(&self, date: NaiveDate) -> Option<Vec<Option<i64>>> {
        let r = self.dates.binary_search(&date).ok()?;
        Some(self.columns.iter().map(|col| col[r]).collect())
    }

    pub fn to_frame(&self) -> Frame {
        // ---
        Frame {
            index: self.dates.iter().map(|d| d.to_string()).collect(),
            columns: (0..HORIZON_COUNT).map(horizon_label).collect(),
            data: (0..self.dates.len())
                .map(|r| {
                    self.columns
                        .iter()
                        .map(|col| col[r].map(|e| e as f64))
                        .collect()
                })
                .collect(),
        }
    }
}

/// Temperatures are compared in whole degrees, truncated toward zero.
///
/// Sub-degree precision is dropped on purpose so results match the
/// published dashboard figures; `-0.5` becomes `0`, not `-1`.
pub fn truncate_degrees(celsius: f64) -> i64 {
    celsius.trunc() as i64
}

/// Compute the [`AccuracyTable`] for a chronologically sorted horizon table.
///
/// Walks backwards from the newest date with two cursors `window` days
/// apart, comparing the newest `today+0` against the `today+window`
/// forecast issued `window` days earlier. The index must be a run of
/// consecutive days; any gap fails with `Lookup`.
pub fn align(table: &HorizonTable) -> Result<AccuracyTable> {
    // ---
    let dates = table.dates();
    let (Some(&oldest), Some(&newest)) = (dates.first(), dates.last()) else {
        return Err(AnalysisError::NoRecords);
    };

    let mut columns = vec![vec![None; dates.len()]; HORIZON_COUNT];
    let widest = (dates.len() - 1).min(MAX_HORIZON);

    for window in 0..=widest {
        let mut errors = Vec::with_capacity(dates.len());
        let mut actual_date = newest;
        let mut window_date = newest - Duration::days(window as i64);

        while window_date >= oldest {
            let true_temp = truncate_degrees(table.get(actual_date, 0)?);
            let predicted_temp = truncate_degrees(table.get(window_date, window)?);
            errors.push(true_temp - predicted_temp);

            actual_date -= Duration::days(1);
            window_date -= Duration::days(1);
        }

        errors.reverse();
        for (cell, error) in columns[window].iter_mut().zip(errors) {
            *cell = Some(error);
        }
    }

    tracing::debug!(
        "Aligned {} issue dates across horizons 0..={}",
        dates.len(),
        widest
    );
    Ok(AccuracyTable {
        dates: dates.to_vec(),
        columns,
    })
}
