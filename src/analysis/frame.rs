//! Row/column labeled numeric tables handed to the presentation layer.

use serde::Serialize;

/// A labeled table in "split" orientation.
///
/// `data[row][col]` is the cell for `index[row]` and `columns[col]`.
/// Absent cells are `None` and serialize as `null`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Frame {
    pub index: Vec<String>,
    pub columns: Vec<String>,
    pub data: Vec<Vec<Option<f64>>>,
}

impl Frame {
    /// A single-row frame, used for summary rows.
    pub fn single_row(label: &str, columns: Vec<String>, values: Vec<f64>) -> Self {
        Frame {
            index: vec![label.to_string()],
            columns,
            data: vec![values.into_iter().map(Some).collect()],
        }
    }
}

#[cfg(test)]
impl Frame {
    pub fn cell(&self, row: &str, column: &str) -> Option<f64> {
        let r = self.index.iter().position(|i| i == row)?;
        let c = self.columns.iter().position(|l| l == column)?;
        self.data[r][c]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absent_cells_serialize_as_null() {
        let frame = Frame {
            index: vec!["2023-01-01".to_string()],
            columns: vec!["today+0".to_string(), "today+1".to_string()],
            data: vec![vec![Some(0.0), None]],
        };

        let json = serde_json::to_value(&frame).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "index": ["2023-01-01"],
                "columns": ["today+0", "today+1"],
                "data": [[0.0, null]],
            })
        );
    }

    #[test]
    fn test_single_row_lookup() {
        let frame = Frame::single_row(
            "Average Daily Forecast Error",
            vec!["1 Day Forecast".to_string()],
            vec![1.5],
        );
        assert_eq!(frame.cell("Average Daily Forecast Error", "1 Day Forecast"), Some(1.5));
        assert_eq!(frame.cell("Average Daily Forecast Error", "2 Day Forecast"), None);
    }
}
