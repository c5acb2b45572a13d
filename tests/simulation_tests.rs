//! Integration tests for full simulation runs.
//!
//! Tests verify clinically expected behavior of calibrated patients: fasting
//! stability, severity ordering across obesity tiers, drug efficacy and the
//! engine's run-level guarantees (determinism, non-negativity, budgets).

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use t2d_simulator::metrics::{a1c_from_mean_glucose, mean_glucose_from_a1c, GLUCOSE_TO_MG_DL};
use t2d_simulator::{
    simulate, ActivityLevel, DiabetesStage, Diagnosis, EngineSettings, ModelParameters, PatientProfile,
    ScenarioParams, Sex, SimulationError, Simulator, Variable,
};

fn prediabetic_male() -> PatientProfile {
    PatientProfile::with_bmi(45.0, 30.0, 175.0, Sex::Male, DiabetesStage::Prediabetic)
}

// ============================================================================
// Clinical Scenarios
// ============================================================================

/// Obese prediabetic patient on the default diet is not classified normal
#[test]
fn test_prediabetic_patient_default_day() {
    let run = simulate(&prediabetic_male(), &ScenarioParams::default()).unwrap();
    let s = &run.summary;

    println!("Prediabetic 45M BMI 30, 24 h:");
    println!("  Mean glucose: {:.1} mg/dL", s.mean_glucose_mg_dL);
    println!("  A1C: {:.1}%  TIR: {:.1}%", s.a1c_estimate, s.time_in_range_percent);

    assert_ne!(s.diagnosis, Diagnosis::Normal);
    assert!(s.mean_glucose_mg_dL > 100.0, "mean {:.1} mg/dL", s.mean_glucose_mg_dL);
    assert_eq!(run.trajectory.len(), 24 * 12 + 1);
}

/// A positive drug dose lowers the A1C estimate of the same patient
#[test]
fn test_drug_lowers_a1c() {
    let baseline = simulate(&prediabetic_male(), &ScenarioParams::default()).unwrap();
    let treated = simulate(&prediabetic_male(), &ScenarioParams::default().with_drug(1.5, None)).unwrap();

    println!(
        "A1C untreated {:.2}%, dose 1.5 {:.2}%",
        baseline.summary.a1c_percent, treated.summary.a1c_percent
    );
    assert!(treated.summary.a1c_percent < baseline.summary.a1c_percent);
    assert!(treated.summary.a1c_estimate <= baseline.summary.a1c_estimate);
}

/// Increasing doses never raise mean glucose above the untreated run
#[test]
fn test_drug_efficacy_direction() {
    let profile = prediabetic_male();
    let untreated = simulate(&profile, &ScenarioParams::default()).unwrap().summary;
    for dose in [0.5, 1.0, 1.5] {
        let treated = simulate(&profile, &ScenarioParams::default().with_drug(dose, None))
            .unwrap()
            .summary;
        assert!(
            treated.mean_glucose_mg_dL <= untreated.mean_glucose_mg_dL,
            "dose {} raised mean glucose: {:.2} > {:.2}",
            dose,
            treated.mean_glucose_mg_dL,
            untreated.mean_glucose_mg_dL
        );
    }
}

/// A healthy adult with no meal in the window stays near fasting glucose
#[test]
fn test_healthy_fasting_window_is_stable() {
    let profile = PatientProfile::with_bmi(30.0, 22.0, 170.0, Sex::Female, DiabetesStage::Normal);
    let scenario = ScenarioParams::default()
        .with_duration(6.0)
        .with_meal_times([8.0, 12.0, 18.0, 21.0]);
    let run = simulate(&profile, &scenario).unwrap();

    let glucose = run.trajectory.series(Variable::Glucose);
    let initial = glucose[0];
    println!("Fasting glucose start {:.1} mg/dL", initial * GLUCOSE_TO_MG_DL);
    for (t, g) in run.trajectory.times().iter().zip(&glucose) {
        assert!(
            (g - initial).abs() <= 0.1 * initial,
            "glucose {:.1} mg/dL at {:.2} h drifted from {:.1}",
            g * GLUCOSE_TO_MG_DL,
            t,
            initial * GLUCOSE_TO_MG_DL
        );
    }
}

/// Healthy adults on the default diet are classified normal
#[test]
fn test_healthy_default_day_is_normal() {
    let profile = PatientProfile::with_bmi(30.0, 22.0, 170.0, Sex::Female, DiabetesStage::Normal);
    let run = simulate(&profile, &ScenarioParams::default()).unwrap();
    assert_eq!(run.summary.diagnosis, Diagnosis::Normal);
    assert_eq!(run.summary.time_below_range_percent, 0.0);
}

/// Daily means of a lean healthy patient settle into a repeating cycle
#[test]
fn test_daily_cycle_is_periodic() {
    let profile = PatientProfile::with_bmi(30.0, 22.0, 175.0, Sex::Female, DiabetesStage::Normal);
    let run = simulate(&profile, &ScenarioParams::default().with_duration(168.0)).unwrap();

    let glucose = run.trajectory.series(Variable::Glucose);
    let per_day = 24 * run.trajectory.samples_per_hour();
    let daily_means: Vec<f64> = (0..7)
        .map(|day| {
            let window = &glucose[day * per_day..=(day + 1) * per_day];
            window.iter().sum::<f64>() / window.len() as f64 * GLUCOSE_TO_MG_DL
        })
        .collect();
    println!("Daily means (mg/dL): {:.1?}", daily_means);

    let (first, last) = (daily_means[0], daily_means[6]);
    assert!((last - first).abs() <= 0.05 * first, "day 1 {:.1} vs day 7 {:.1}", first, last);
    assert_eq!(run.summary.diagnosis, Diagnosis::Normal);

    let three_days = simulate(&profile, &ScenarioParams::default().with_duration(72.0)).unwrap();
    assert_eq!(three_days.summary.diagnosis, Diagnosis::Normal);
}

/// An older diabetic patient is classified diabetic
#[test]
fn test_diabetic_patient_is_diabetic() {
    let profile = PatientProfile::with_bmi(60.0, 28.0, 165.0, Sex::Female, DiabetesStage::Diabetic);
    let run = simulate(&profile, &ScenarioParams::default()).unwrap();
    println!("Diabetic 60F BMI 28: A1C {:.1}%", run.summary.a1c_estimate);
    assert_eq!(run.summary.diagnosis, Diagnosis::Diabetic);
}

// ============================================================================
// Severity Ordering
// ============================================================================

/// Higher obesity tiers never lower the A1C estimate
#[test]
fn test_obesity_tiers_monotonic() {
    let mut previous = f64::NEG_INFINITY;
    for bmi in [22.0, 27.0, 32.0, 37.0] {
        let profile = PatientProfile::with_bmi(45.0, bmi, 175.0, Sex::Male, DiabetesStage::Prediabetic);
        let a1c = simulate(&profile, &ScenarioParams::default()).unwrap().summary.a1c_percent;
        println!("BMI {:.0}: A1C {:.2}%", bmi, a1c);
        assert!(a1c >= previous, "A1C fell from {:.2} to {:.2} at BMI {}", previous, a1c, bmi);
        previous = a1c;
    }
}

/// Stages are ordered by A1C for an otherwise identical patient
#[test]
fn test_stages_ordered() {
    let a1c = |stage| {
        let profile = PatientProfile::with_bmi(50.0, 27.0, 170.0, Sex::Male, stage);
        simulate(&profile, &ScenarioParams::default()).unwrap().summary.a1c_percent
    };
    let normal = a1c(DiabetesStage::Normal);
    let prediabetic = a1c(DiabetesStage::Prediabetic);
    let diabetic = a1c(DiabetesStage::Diabetic);
    assert!(normal <= prediabetic && prediabetic <= diabetic);
}

// ============================================================================
// Engine Guarantees
// ============================================================================

/// Identical inputs give bit-identical runs
#[test]
fn test_determinism() {
    let scenario = ScenarioParams::default().with_drug(0.5, None);
    let first = simulate(&prediabetic_male(), &scenario).unwrap();
    let second = simulate(&prediabetic_male(), &scenario).unwrap();
    assert_eq!(first, second);
}

/// No state component goes negative for randomized valid inputs
#[test]
fn test_non_negativity_random_profiles() {
    let mut rng = StdRng::seed_from_u64(42);
    let stages = [DiabetesStage::Normal, DiabetesStage::Prediabetic, DiabetesStage::Diabetic];
    let activities = [
        ActivityLevel::Sedentary,
        ActivityLevel::Light,
        ActivityLevel::Moderate,
        ActivityLevel::Active,
    ];

    for _ in 0..8 {
        let profile = PatientProfile::with_bmi(
            rng.gen_range(20.0..80.0),
            rng.gen_range(18.0..45.0),
            rng.gen_range(150.0..195.0),
            if rng.gen_bool(0.5) { Sex::Male } else { Sex::Female },
            stages[rng.gen_range(0..stages.len())],
        )
        .with_activity(activities[rng.gen_range(0..activities.len())]);
        let scenario = ScenarioParams::default()
            .with_duration(rng.gen_range(6.0..48.0))
            .with_diet(rng.gen_range(0.5..2.0), rng.gen_range(0.5..2.5))
            .with_drug(rng.gen_range(0.0..2.0), None);

        let run = simulate(&profile, &scenario).unwrap();
        let min = run.trajectory.min_component();
        assert!(min >= -1e-12, "negative component {:e} for {:?}", min, profile);
    }
}

/// A full week completes within the default budget without glucose run-up
#[test]
fn test_week_long_run() {
    let run = simulate(&prediabetic_male(), &ScenarioParams::default().with_duration(168.0)).unwrap();
    let final_glucose = run.trajectory.last().unwrap().state.glucose() * GLUCOSE_TO_MG_DL;
    println!(
        "168 h: {} steps, {} rejected, A1C {:.1}%, final glucose {:.1} mg/dL",
        run.stats.accepted_steps, run.stats.rejected_steps, run.summary.a1c_estimate, final_glucose
    );
    assert_eq!(run.trajectory.len(), 168 * 12 + 1);
    assert!(run.summary.dawn_phenomenon_mg_dL.is_some());
    assert_eq!(run.summary.diagnosis, Diagnosis::Prediabetic);
    assert!(final_glucose < 150.0, "final glucose {:.1} mg/dL", final_glucose);
}

/// An exhausted time budget surfaces as Timeout
#[test]
fn test_timeout_from_settings() {
    let settings = EngineSettings {
        timeout_secs: 1e-9,
        ..EngineSettings::default()
    };
    let sim = Simulator::new(ModelParameters::default(), settings);
    let err = sim.simulate(&prediabetic_male(), &ScenarioParams::default()).unwrap_err();
    assert!(matches!(err, SimulationError::Timeout { .. }), "{}", err);
    assert!(!err.is_client_error());
}

/// Out-of-range inputs are rejected as client errors
#[test]
fn test_invalid_profile_rejected() {
    let mut profile = prediabetic_male();
    profile.height_cm = 10.0;
    let err = simulate(&profile, &ScenarioParams::default()).unwrap_err();
    assert!(matches!(err, SimulationError::InvalidProfile(_)));

    let scenario = ScenarioParams::default().with_meal_times([7.0, 12.0, 24.0, 21.0]);
    let err = simulate(&prediabetic_male(), &scenario).unwrap_err();
    assert!(err.is_client_error());
}

// ============================================================================
// Clinical Conversions
// ============================================================================

/// Mean glucose survives the trip through the A1C formula
#[test]
fn test_a1c_round_trip() {
    for mean in (40..=400).map(|m| m as f64 + 0.37) {
        let recovered = mean_glucose_from_a1c(a1c_from_mean_glucose(mean));
        assert!((recovered - mean).abs() < 1e-9, "{} -> {}", mean, recovered);
    }
}
