//! Export functionality for simulation results.
//!
//! Provides CSV time-series export and JSON summary export.

mod csv_export;
mod json_export;

pub use csv_export::{export_trajectory_csv, CsvExporter, TimeSeriesRecord};
pub use json_export::{export_run_json, export_run_json_to, RunExport, EXPORT_VERSION};
