//! Horizon pivot: flat forecast records to one row per issue date.

use std::collections::BTreeMap;

use chrono::NaiveDate;

use super::{AnalysisError, Frame, Result};
use crate::models::{horizon_label, ForecastRecord, HORIZON_COUNT};

// ---

/// Predicted maximum temperature per issue date (rows) and horizon (columns).
///
/// Rows are sorted ascending by issue date and every row carries all seven
/// horizons. The `today+0` cell of a row stands in for the temperature
/// actually reached on that day; there is no separately observed feed, so
/// accuracy measures how forecasts converge on the same-day forecast.
#[derive(Debug, Clone, PartialEq)]
pub struct HorizonTable {
    dates: Vec<NaiveDate>,
    rows: Vec<[f64; HORIZON_COUNT]>,
}

impl HorizonTable {
    // ---
    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn len(&self) -> usize {
        self.dates.len()
    }

    /// Temperature forecast on issue `date` for `horizon` days ahead.
    pub fn get(&self, date: NaiveDate, horizon: usize) -> Result<f64> {
        // ---
        let row = self
            .dates
            .binary_search(&date)
            .map_err(|_| AnalysisError::Lookup { date, horizon })?;
        self.rows[row]
            .get(horizon)
            .copied()
            .ok_or(AnalysisError::Lookup { date, horizon })
    }

    pub fn to_frame(&self) -> Frame {
        // ---
        Frame {
            index: self.dates.iter().map(|d| d.to_string()).collect(),
            columns: (0..HORIZON_COUNT).map(horizon_label).collect(),
            data: self
                .rows
                .iter()
                .map(|row| row.iter().copied().map(Some).collect())
                .collect(),
        }
    }
}

/// Pivot forecast records into a [`HorizonTable`].
///
/// Every issue date must carry exactly one record with a temperature for
/// each horizon 0..=6. An incomplete batch fails with `IncompleteIssue`
/// instead of shifting later values into the wrong column.
pub fn pivot(records: &[ForecastRecord]) -> Result<HorizonTable> {
    // ---
    if records.is_empty() {
        return Err(AnalysisError::NoRecords);
    }

    // Outer Option: a record was seen. Inner Option: it had a temperature.
    let mut batches: BTreeMap<NaiveDate, [Option<Option<f64>>; HORIZON_COUNT]> = BTreeMap::new();

    for record in records {
        let slots = batches.entry(record.issue).or_insert([None; HORIZON_COUNT]);
        let slot = slots
            .get_mut(record.forecast)
            .ok_or(AnalysisError::InvalidHorizon {
                issue: record.issue,
                horizon: record.forecast as i32,
            })?;
        if slot.is_some() {
            return Err(AnalysisError::DuplicateHorizon {
                issue: record.issue,
                horizon: record.forecast,
            });
        }
        *slot = Some(record.temp_max);
    }

    let mut dates = Vec::with_capacity(batches.len());
    let mut rows = Vec::with_capacity(batches.len());

    for (issue, slots) in batches {
        let mut row = [0.0; HORIZON_COUNT];
        let mut missing = Vec::new();
        for (horizon, (cell, slot)) in row.iter_mut().zip(slots).enumerate() {
            match slot.flatten() {
                Some(temp) => *cell = temp,
                None => missing.push(horizon),
            }
        }
        if !missing.is_empty() {
            return Err(AnalysisError::IncompleteIssue { issue, missing });
        }

        dates.push(issue);
        rows.push(row);
    }

    tracing::debug!("Pivoted {} records into {} issue dates", records.len(), dates.len());
    Ok(HorizonTable { dates, rows })
}

#[cfg(test)]
impl HorizonTable {
    // ---
    /// Build a table from consecutive `(issue date, temperatures)` rows.
    pub fn from_rows(mut rows: Vec<(NaiveDate, [f64; HORIZON_COUNT])>) -> Self {
        rows.sort_by_key(|(date, _)| *date);
        let (dates, rows) = rows.into_iter().unzip();
        HorizonTable { dates, rows }
    }

    /// All values of one horizon in issue-date order.
    pub fn column(&self, horizon: usize) -> Vec<f64> {
        self.rows.iter().filter_map(|row| row.get(horizon).copied()).collect()
    }
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2023, 1, d).unwrap()
    }

    fn batch(issue: NaiveDate, base: f64) -> Vec<ForecastRecord> {
        // ---
        (0..HORIZON_COUNT)
            .map(|h| ForecastRecord {
                date: issue + chrono::Duration::days(h as i64),
                forecast: h,
                temp_max: Some(base + h as f64),
                issue,
                extended_text: None,
            })
            .collect()
    }

    #[test]
    fn test_pivot_sorts_issue_dates() {
        // ---
        let mut records = batch(day(3), 30.0);
        records.extend(batch(day(1), 10.0));
        records.extend(batch(day(2), 20.0));

        let table = pivot(&records).unwrap();

        assert_eq!(table.dates(), &[day(1), day(2), day(3)]);
        assert_eq!(table.column(0), vec![10.0, 20.0, 30.0]);
        assert_eq!(table.column(6), vec![16.0, 26.0, 36.0]);
        assert_eq!(table.get(day(2), 3).unwrap(), 23.0);
    }

    #[test]
    fn test_missing_horizon_fails() {
        // ---
        let mut records = batch(day(1), 10.0);
        let mut partial = batch(day(2), 20.0);
        partial.retain(|r| r.forecast != 4);
        records.extend(partial);

        let err = pivot(&records).unwrap_err();
        assert_eq!(
            err,
            AnalysisError::IncompleteIssue {
                issue: day(2),
                missing: vec![4]
            }
        );
    }

    #[test]
    fn test_null_temperature_is_not_zero() {
        // ---
        let mut records = batch(day(1), 10.0);
        records[2].temp_max = None;

        let err = pivot(&records).unwrap_err();
        assert!(matches!(err, AnalysisError::IncompleteIssue { missing, .. } if missing == vec![2]));
    }

    #[test]
    fn test_every_missing_horizon_reported() {
        // ---
        let mut records = batch(day(1), 10.0);
        records[0].temp_max = None;
        records.retain(|r| r.forecast != 5);

        let err = pivot(&records).unwrap_err();
        assert_eq!(
            err,
            AnalysisError::IncompleteIssue {
                issue: day(1),
                missing: vec![0, 5]
            }
        );
    }

    #[test]
    fn test_duplicate_horizon_fails() {
        // ---
        let mut records = batch(day(1), 10.0);
        records.push(records[1].clone());

        let err = pivot(&records).unwrap_err();
        assert_eq!(
            err,
            AnalysisError::DuplicateHorizon {
                issue: day(1),
                horizon: 1
            }
        );
    }

    #[test]
    fn test_empty_records() {
        // ---
        assert_eq!(pivot(&[]).unwrap_err(), AnalysisError::NoRecords);
    }

    #[test]
    fn test_lookup_miss() {
        // ---
        let table = pivot(&batch(day(1), 10.0)).unwrap();
        let err = table.get(day(5), 0).unwrap_err();
        assert_eq!(err, AnalysisError::Lookup { date: day(5), horizon: 0 });
        assert!(table.get(day(1), 7).is_err());
    }

    #[test]
    fn test_frame_labels() {
        // ---
        let frame = pivot(&batch(day(1), 10.0)).unwrap().to_frame();

        assert_eq!(frame.index, vec!["2023-01-01".to_string()]);
        assert_eq!(frame.columns[0], "today+0");
        assert_eq!(frame.columns[6], "today+6");
        assert_eq!(frame.cell("2023-01-01", "today+5"), Some(15.0));
    }
}
