//! Forecast accuracy analysis.
//!
//! A pure pipeline from loaded records to renderable tables:
//! `pivot` -> `align` -> `summarize`, plus the persistence baseline.
//! Every function takes its input explicitly and nothing is cached here.

mod align;
mod error;
mod frame;
mod metrics;
mod pivot;
mod report;

pub use align::{align, AccuracyTable};
pub use error::{AnalysisError, Result};
pub use frame::Frame;
pub use metrics::{compare, persistence, persistence_rmse, persistence_table, summarize};
pub use pivot::{pivot, HorizonTable};
pub use report::AccuracyReport;
