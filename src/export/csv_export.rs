//! CSV time-series export of simulated trajectories.

use std::fs::File;
use std::path::{Path, PathBuf};

use anyhow::Result;
use chrono::Local;
use serde::Serialize;

use crate::metrics::ClinicalSample;
use crate::state::{Trajectory, TrajectorySample};

/// Record for CSV time-series export
#[derive(Debug, Clone, Serialize)]
pub struct TimeSeriesRecord {
    /// Simulation time (hours)
    pub time_hours: f64,
    /// Blood glucose (mg/dL)
    pub glucose_mg_dL: f64,
    /// Stored glucose (mg/dL equivalent)
    pub stored_glucose_mg_dL: f64,
    /// Insulin (pmol/L)
    pub insulin_pmol_L: f64,
    /// Glucagon (pg/mL)
    pub glucagon_pg_mL: f64,
    /// GLP-1 (pmol/L)
    pub glp1_pmol_L: f64,
    pub beta_cells: f64,
    pub alpha_cells: f64,
    pub glut2: f64,
    pub glut4: f64,
    pub tnf_alpha: f64,
    pub oleic_acid: f64,
    pub palmitic_acid: f64,
}

impl From<&ClinicalSample> for TimeSeriesRecord {
    fn from(c: &ClinicalSample) -> Self {
        Self {
            time_hours: c.time_hours,
            glucose_mg_dL: c.glucose_mg_dL,
            stored_glucose_mg_dL: c.stored_glucose_mg_dL,
            insulin_pmol_L: c.insulin_pmol_L,
            glucagon_pg_mL: c.glucagon_pg_mL,
            glp1_pmol_L: c.glp1_pmol_L,
            beta_cells: c.beta_cells,
            alpha_cells: c.alpha_cells,
            glut2: c.glut2,
            glut4: c.glut4,
            tnf_alpha: c.tnf_alpha,
            oleic_acid: c.oleic_acid,
            palmitic_acid: c.palmitic_acid,
        }
    }
}

impl From<&TrajectorySample> for TimeSeriesRecord {
    fn from(s: &TrajectorySample) -> Self {
        Self::from(&ClinicalSample::from_state(s.time_hours, &s.state))
    }
}

/// CSV exporter for trajectory samples
pub struct CsvExporter {
    writer: csv::Writer<File>,
    rows: usize,
    /// Path to output file
    path: PathBuf,
}

impl CsvExporter {
    /// Create an exporter writing to `exports/trajectory_<timestamp>.csv`
    ///
    /// Creates the exports directory if it doesn't exist.
    pub fn new() -> Result<Self> {
        let dir = PathBuf::from("exports");
        std::fs::create_dir_all(&dir)?;

        let timestamp = Local::now().format("%Y%m%d_%H%M%S");
        Self::create(dir.join(format!("trajectory_{}.csv", timestamp)))
    }

    /// Create an exporter writing to `path`
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = File::create(&path)?;
        let writer = csv::Writer::from_writer(file);

        log::info!("CSV export started: {}", path.display());

        Ok(Self { writer, rows: 0, path })
    }

    /// Append one sample
    pub fn record(&mut self, sample: &TrajectorySample) -> Result<()> {
        self.writer.serialize(TimeSeriesRecord::from(sample))?;
        self.rows += 1;
        Ok(())
    }

    /// Finish writing and return the output path
    pub fn finish(mut self) -> Result<PathBuf> {
        self.writer.flush()?;
        log::info!("CSV export completed: {} ({} rows)", self.path.display(), self.rows);
        Ok(self.path)
    }

    /// Get the output path
    pub fn path(&self) -> &PathBuf {
        &self.path
    }
}

/// Write every sample of `trajectory` to `path`
pub fn export_trajectory_csv<P: AsRef<Path>>(trajectory: &Trajectory, path: P) -> Result<PathBuf> {
    let mut exporter = CsvExporter::create(path)?;
    for sample in trajectory.samples() {
        exporter.record(sample)?;
    }
    exporter.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{StateVector, Variable};

    #[test]
    fn test_record_in_clinical_units() {
        let mut state = StateVector::zeros();
        state[Variable::Glucose] = 1.2e-3;
        let record = TimeSeriesRecord::from(&TrajectorySample { time_hours: 0.5, state });
        assert!((record.glucose_mg_dL - 120.0).abs() < 1e-9);
        assert_eq!(record.time_hours, 0.5);
    }

    #[test]
    fn test_export_writes_header_and_rows() {
        let dir = tempfile::tempdir().unwrap();
        let samples = (0..3)
            .map(|i| TrajectorySample {
                time_hours: i as f64,
                state: StateVector::zeros(),
            })
            .collect();
        let trajectory = Trajectory::from_samples(1, samples);

        let path = export_trajectory_csv(&trajectory, dir.path().join("run.csv")).unwrap();
        let contents = std::fs::read_to_string(path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 4);
        assert!(lines[0].starts_with("time_hours,glucose_mg_dL,"));
        assert!(lines[0].ends_with("palmitic_acid"));
    }
}
