//! Integration tests for CSV and JSON export of completed runs.

use t2d_simulator::export::{export_run_json_to, export_trajectory_csv, EXPORT_VERSION};
use t2d_simulator::{simulate, DiabetesStage, PatientProfile, ScenarioParams, Sex};

fn run_fixture() -> (PatientProfile, ScenarioParams, t2d_simulator::SimulationRun) {
    let profile = PatientProfile::with_bmi(52.0, 31.0, 168.0, Sex::Female, DiabetesStage::Prediabetic)
        .with_medication("metformin");
    let scenario = ScenarioParams::default().with_duration(6.0);
    let run = simulate(&profile, &scenario).unwrap();
    (profile, scenario, run)
}

// ============================================================================
// CSV Export
// ============================================================================

/// One row per trajectory sample, in clinical units
#[test]
fn test_trajectory_csv() {
    let dir = tempfile::tempdir().unwrap();
    let (_, _, run) = run_fixture();

    let path = export_trajectory_csv(&run.trajectory, dir.path().join("trajectory.csv")).unwrap();
    let mut reader = csv::Reader::from_path(&path).unwrap();
    let headers = reader.headers().unwrap().clone();
    assert_eq!(headers.len(), 13);
    assert_eq!(&headers[1], "glucose_mg_dL");

    let rows: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
    assert_eq!(rows.len(), run.trajectory.len());

    let first_glucose: f64 = rows[0][1].parse().unwrap();
    assert!((first_glucose - 115.0).abs() < 1e-6, "first glucose {}", first_glucose);
    let last_time: f64 = rows[rows.len() - 1][0].parse().unwrap();
    assert!((last_time - 6.0).abs() < 1e-9);
}

// ============================================================================
// JSON Export
// ============================================================================

/// The summary export carries inputs, metrics and notes
#[test]
fn test_run_json() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("summary.json");
    let (profile, scenario, run) = run_fixture();

    export_run_json_to(&profile, &scenario, &run.summary, &path).unwrap();

    let value: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(value["version"], EXPORT_VERSION);
    assert!(value["exported_at"].as_str().is_some());
    assert_eq!(value["profile"]["stage"], "prediabetic");
    assert_eq!(value["profile"]["medications"][0], "metformin");
    assert_eq!(value["scenario"]["duration_hours"], 6.0);
    assert_eq!(value["summary"]["a1c_estimate"], run.summary.a1c_estimate);
    assert_eq!(value["summary"]["sample_count"], run.trajectory.len());
    assert!(value["summary"]["fasting_homa_ir"].as_f64().unwrap() > 0.0);
    assert!(value["summary"]["fasting_homa_b"].as_f64().unwrap() > 0.0);
    assert_eq!(value["health"]["ideal_weight_range_kg"].as_array().map(|r| r.len()), Some(2));
    assert!(value["health"]["daily_calories_kcal"].as_f64().unwrap() > value["health"]["bmr_kcal"].as_f64().unwrap());
    assert!(value["notes"]["status"].as_array().map(|s| !s.is_empty()).unwrap_or(false));
}
