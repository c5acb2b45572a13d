//! JSON export of run summaries.

use std::path::{Path, PathBuf};

use anyhow::Result;
use chrono::Local;
use serde::Serialize;

use crate::metrics::{ClinicalNotes, SimulationSummary};
use crate::patient::{HealthMetrics, PatientProfile, ScenarioParams};

/// Export format version
pub const EXPORT_VERSION: &str = "1.0.0";

/// Summary export structure
#[derive(Debug, Clone, Serialize)]
pub struct RunExport<'a> {
    /// Export timestamp
    pub exported_at: String,
    /// Export version for compatibility
    pub version: &'static str,
    pub profile: &'a PatientProfile,
    /// Metrics derived from the profile alone
    pub health: HealthMetrics,
    pub scenario: &'a ScenarioParams,
    pub summary: &'a SimulationSummary,
    pub notes: ClinicalNotes,
}

impl<'a> RunExport<'a> {
    pub fn new(profile: &'a PatientProfile, scenario: &'a ScenarioParams, summary: &'a SimulationSummary) -> Self {
        Self {
            exported_at: Local::now().to_rfc3339(),
            version: EXPORT_VERSION,
            profile,
            health: profile.health_metrics(),
            scenario,
            summary,
            notes: ClinicalNotes::for_run(profile, summary),
        }
    }
}

/// Export a run summary to JSON
///
/// Creates the exports directory if it doesn't exist.
/// Filename is auto-generated with timestamp: `summary_YYYYMMDD_HHMMSS.json`
///
/// Returns the path to the saved JSON file.
pub fn export_run_json(
    profile: &PatientProfile,
    scenario: &ScenarioParams,
    summary: &SimulationSummary,
) -> Result<PathBuf> {
    let dir = PathBuf::from("exports");
    std::fs::create_dir_all(&dir)?;

    let filename = format!("summary_{}.json", Local::now().format("%Y%m%d_%H%M%S"));
    let path = dir.join(filename);
    export_run_json_to(profile, scenario, summary, &path)?;
    Ok(path)
}

/// Export a run summary to a specific file
pub fn export_run_json_to<P: AsRef<Path>>(
    profile: &PatientProfile,
    scenario: &ScenarioParams,
    summary: &SimulationSummary,
    path: P,
) -> Result<()> {
    let export = RunExport::new(profile, scenario, summary);

    let file = std::fs::File::create(path.as_ref())?;
    serde_json::to_writer_pretty(file, &export)?;

    log::info!("JSON summary exported: {}", path.as_ref().display());
    Ok(())
}
