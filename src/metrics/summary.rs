//! Clinical summary of a completed trajectory.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::units::{
    a1c_from_mean_glucose, glucose_management_indicator, homa_b, homa_ir, round_a1c, GLUCOSE_TO_MG_DL,
    INSULIN_TO_PMOL_L,
};
use crate::patient::PatientProfile;
use crate::physiology::DAY_HOURS;
use crate::state::{Trajectory, Variable};

/// Lower bound of the target glucose range (mg/dL)
pub const RANGE_LOW_MG_DL: f64 = 70.0;
/// Upper bound of the target glucose range (mg/dL)
pub const RANGE_HIGH_MG_DL: f64 = 180.0;
/// Upper bound of the tight range (mg/dL)
pub const TIGHT_RANGE_HIGH_MG_DL: f64 = 140.0;

/// A1C below which glycemia is normal (%)
pub const PREDIABETES_A1C: f64 = 5.7;
/// A1C at or above which glycemia is diabetic (%)
pub const DIABETES_A1C: f64 = 6.5;

/// Diagnosis class from the estimated A1C
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Diagnosis {
    Normal,
    Prediabetic,
    Diabetic,
}

impl Diagnosis {
    /// ADA thresholds; equality goes to the more severe class
    pub fn from_a1c(a1c_percent: f64) -> Self {
        if a1c_percent < PREDIABETES_A1C {
            Diagnosis::Normal
        } else if a1c_percent < DIABETES_A1C {
            Diagnosis::Prediabetic
        } else {
            Diagnosis::Diabetic
        }
    }
}

impl fmt::Display for Diagnosis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnosis::Normal => f.write_str("Normal"),
            Diagnosis::Prediabetic => f.write_str("Prediabetic"),
            Diagnosis::Diabetic => f.write_str("Diabetic"),
        }
    }
}

/// Status of a value relative to its normal range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum RangeStatus {
    /// Within range
    #[default]
    Normal,
    /// Within 20% of the range width outside it
    Warning,
    /// Further outside
    Critical,
}

impl RangeStatus {
    /// Determine status based on value and normal range
    pub fn from_value(value: f64, normal_min: f64, normal_max: f64) -> Self {
        // 20% margin for warning zone
        let margin = (normal_max - normal_min) * 0.2;

        if value < normal_min - margin || value > normal_max + margin {
            RangeStatus::Critical
        } else if value < normal_min || value > normal_max {
            RangeStatus::Warning
        } else {
            RangeStatus::Normal
        }
    }
}

/// Summary metrics of one run, computed once from its trajectory
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationSummary {
    /// Covered horizon (hours)
    pub duration_hours: f64,
    pub sample_count: usize,

    // === Glucose statistics (mg/dL) ===
    pub mean_glucose_mg_dL: f64,
    pub min_glucose_mg_dL: f64,
    pub max_glucose_mg_dL: f64,
    /// Population standard deviation
    pub glucose_std_mg_dL: f64,
    /// Standard deviation over mean (%)
    pub coefficient_of_variation: f64,

    // === Time in range (% of samples) ===
    /// 70-180 mg/dL
    pub time_in_range_percent: f64,
    /// 70-140 mg/dL
    pub time_in_tight_range_percent: f64,
    /// Above 180 mg/dL
    pub time_above_range_percent: f64,
    /// Below 70 mg/dL
    pub time_below_range_percent: f64,

    // === Derived clinical indices ===
    /// Estimated A1C (%), unrounded; the diagnosis is taken from this
    pub a1c_percent: f64,
    /// Estimated A1C (%) as reported, one decimal
    pub a1c_estimate: f64,
    /// Glucose management indicator (%)
    pub gmi_percent: f64,
    pub diagnosis: Diagnosis,
    /// HOMA-IR at the fasting initial state
    pub fasting_homa_ir: f64,
    /// HOMA-B (%) at the fasting initial state
    pub fasting_homa_b: f64,
    /// Mean glucose 4-8 AM minus 0-4 AM (mg/dL), only past 24 hours
    pub dawn_phenomenon_mg_dL: Option<f64>,

    // === Patient context ===
    pub bmi: f64,
    /// Reported A1C estimate minus the patient's A1C, when one was given
    pub reported_a1c_delta: Option<f64>,
}

fn in_target_range(g: f64) -> bool {
    (RANGE_LOW_MG_DL..=RANGE_HIGH_MG_DL).contains(&g)
}

fn in_tight_range(g: f64) -> bool {
    (RANGE_LOW_MG_DL..=TIGHT_RANGE_HIGH_MG_DL).contains(&g)
}

fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

fn percent_where(values: &[f64], pred: impl Fn(f64) -> bool) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    100.0 * values.iter().filter(|&&v| pred(v)).count() as f64 / values.len() as f64
}

/// Mean glucose over hours-of-day [4, 8) minus [0, 4)
fn dawn_phenomenon(times: &[f64], glucose: &[f64]) -> Option<f64> {
    let window = |lo: f64, hi: f64| -> Vec<f64> {
        times
            .iter()
            .zip(glucose)
            .filter(|(&t, _)| {
                let hour = t.rem_euclid(DAY_HOURS);
                hour >= lo && hour < hi
            })
            .map(|(_, &g)| g)
            .collect()
    };
    let early_morning = mean(&window(4.0, 8.0))?;
    let night = mean(&window(0.0, 4.0))?;
    Some(early_morning - night)
}

/// Derive the clinical summary of a trajectory
pub fn summarize(trajectory: &Trajectory, patient: &PatientProfile) -> SimulationSummary {
    let glucose: Vec<f64> = trajectory
        .series(Variable::Glucose)
        .into_iter()
        .map(|g| g * GLUCOSE_TO_MG_DL)
        .collect();
    let times = trajectory.times();

    let mean_glucose = mean(&glucose).unwrap_or(0.0);
    let variance = if glucose.is_empty() {
        0.0
    } else {
        glucose.iter().map(|g| (g - mean_glucose).powi(2)).sum::<f64>() / glucose.len() as f64
    };
    let std = variance.sqrt();
    let min_glucose = glucose.iter().copied().fold(f64::INFINITY, f64::min);
    let max_glucose = glucose.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    let a1c = a1c_from_mean_glucose(mean_glucose);
    let duration = trajectory.duration_hours();

    let (fasting_glucose, fasting_insulin) = trajectory
        .first()
        .map(|s| (s.state.glucose() * GLUCOSE_TO_MG_DL, s.state.insulin() * INSULIN_TO_PMOL_L))
        .unwrap_or((0.0, 0.0));

    SimulationSummary {
        duration_hours: duration,
        sample_count: glucose.len(),
        mean_glucose_mg_dL: mean_glucose,
        min_glucose_mg_dL: if glucose.is_empty() { 0.0 } else { min_glucose },
        max_glucose_mg_dL: if glucose.is_empty() { 0.0 } else { max_glucose },
        glucose_std_mg_dL: std,
        coefficient_of_variation: if mean_glucose > 0.0 { 100.0 * std / mean_glucose } else { 0.0 },
        time_in_range_percent: percent_where(&glucose, in_target_range),
        time_in_tight_range_percent: percent_where(&glucose, in_tight_range),
        time_above_range_percent: percent_where(&glucose, |g| g > RANGE_HIGH_MG_DL),
        time_below_range_percent: percent_where(&glucose, |g| g < RANGE_LOW_MG_DL),
        a1c_percent: a1c,
        a1c_estimate: round_a1c(a1c),
        gmi_percent: glucose_management_indicator(mean_glucose),
        diagnosis: Diagnosis::from_a1c(a1c),
        fasting_homa_ir: homa_ir(fasting_glucose, fasting_insulin),
        fasting_homa_b: homa_b(fasting_glucose, fasting_insulin),
        dawn_phenomenon_mg_dL: if duration > DAY_HOURS {
            dawn_phenomenon(&times, &glucose)
        } else {
            None
        },
        bmi: patient.bmi(),
        reported_a1c_delta: patient.a1c_percent.map(|reported| round_a1c(a1c) - reported),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::patient::{DiabetesStage, Sex};
    use crate::state::{StateVector, TrajectorySample};

    fn trajectory_from_mg_dL(samples_per_hour: usize, glucose: &[f64]) -> Trajectory {
        let samples = glucose
            .iter()
            .enumerate()
            .map(|(i, &g)| {
                let mut state = StateVector::zeros();
                state[Variable::Glucose] = g / GLUCOSE_TO_MG_DL;
                TrajectorySample {
                    time_hours: i as f64 / samples_per_hour as f64,
                    state,
                }
            })
            .collect();
        Trajectory::from_samples(samples_per_hour, samples)
    }

    fn patient() -> PatientProfile {
        PatientProfile::new(40.0, 70.0, 175.0, Sex::Female, DiabetesStage::Normal)
    }

    #[test]
    fn test_diagnosis_thresholds() {
        assert_eq!(Diagnosis::from_a1c(5.6), Diagnosis::Normal);
        assert_eq!(Diagnosis::from_a1c(5.7), Diagnosis::Prediabetic);
        assert_eq!(Diagnosis::from_a1c(6.4), Diagnosis::Prediabetic);
        assert_eq!(Diagnosis::from_a1c(6.5), Diagnosis::Diabetic);
        assert_eq!(Diagnosis::Prediabetic.to_string(), "Prediabetic");
    }

    #[test]
    fn test_range_status() {
        assert_eq!(RangeStatus::from_value(100.0, 70.0, 140.0), RangeStatus::Normal);
        assert_eq!(RangeStatus::from_value(150.0, 70.0, 140.0), RangeStatus::Warning);
        assert_eq!(RangeStatus::from_value(200.0, 70.0, 140.0), RangeStatus::Critical);
    }

    #[test]
    fn test_statistics() {
        let t = trajectory_from_mg_dL(1, &[60.0, 100.0, 150.0, 190.0]);
        let s = summarize(&t, &patient());
        assert_eq!(s.sample_count, 4);
        assert!((s.mean_glucose_mg_dL - 125.0).abs() < 1e-9);
        assert!((s.min_glucose_mg_dL - 60.0).abs() < 1e-9);
        assert!((s.max_glucose_mg_dL - 190.0).abs() < 1e-9);
        let expected_std = ((65.0f64.powi(2) + 25.0f64.powi(2) + 25.0f64.powi(2) + 65.0f64.powi(2)) / 4.0).sqrt();
        assert!((s.glucose_std_mg_dL - expected_std).abs() < 1e-9);
        assert_eq!(s.time_in_range_percent, 50.0);
        assert_eq!(s.time_in_tight_range_percent, 25.0);
        assert_eq!(s.time_above_range_percent, 25.0);
        assert_eq!(s.time_below_range_percent, 25.0);
        assert_eq!(s.a1c_estimate, 6.0);
        assert!((s.a1c_percent - 171.7 / 28.7).abs() < 1e-12);
        assert_eq!(s.diagnosis, Diagnosis::Prediabetic);
        assert_eq!(s.dawn_phenomenon_mg_dL, None);
    }

    #[test]
    fn test_diagnosis_uses_unrounded_a1c() {
        // 5.66% is reported as 5.7 but is still below the prediabetes cut-off
        let t = trajectory_from_mg_dL(1, &[115.75; 5]);
        let s = summarize(&t, &patient());
        assert_eq!(s.a1c_estimate, 5.7);
        assert!(s.a1c_percent < PREDIABETES_A1C);
        assert_eq!(s.diagnosis, Diagnosis::Normal);

        let t = trajectory_from_mg_dL(1, &[116.9; 5]);
        assert_eq!(summarize(&t, &patient()).diagnosis, Diagnosis::Prediabetic);
    }

    #[test]
    fn test_fasting_homa_from_first_sample() {
        let mut samples = trajectory_from_mg_dL(1, &[90.0, 200.0, 200.0]).samples().to_vec();
        samples[0].state[Variable::Insulin] = 62.5 / INSULIN_TO_PMOL_L;
        let s = summarize(&Trajectory::from_samples(1, samples), &patient());
        assert!((s.fasting_homa_ir - 2.0).abs() < 1e-9);
        assert!((s.fasting_homa_b - 20.0 * 9.0 / 27.0).abs() < 1e-9);
    }

    #[test]
    fn test_range_bounds_are_inclusive() {
        assert!(in_target_range(70.0) && in_target_range(180.0));
        assert!(!in_target_range(180.01) && !in_target_range(69.99));
        assert!(in_tight_range(140.0));
        assert!(!in_tight_range(140.01));
    }

    #[test]
    fn test_dawn_phenomenon_needs_more_than_a_day() {
        // 1 sample per hour over 48 h: 0-4 AM at 100, 4-8 AM at 130, else 110
        let glucose: Vec<f64> = (0..=48)
            .map(|h| match h % 24 {
                0..=3 => 100.0,
                4..=7 => 130.0,
                _ => 110.0,
            })
            .collect();
        let s = summarize(&trajectory_from_mg_dL(1, &glucose), &patient());
        let dawn = s.dawn_phenomenon_mg_dL.unwrap();
        assert!((dawn - 30.0).abs() < 1e-9);

        let day: Vec<f64> = glucose[..25].to_vec();
        let s = summarize(&trajectory_from_mg_dL(1, &day), &patient());
        assert_eq!(s.dawn_phenomenon_mg_dL, None);
    }

    #[test]
    fn test_reported_a1c_delta() {
        let mut p = patient();
        p.a1c_percent = Some(6.0);
        let t = trajectory_from_mg_dL(1, &[154.0, 154.0]);
        let s = summarize(&t, &p);
        assert!((s.reported_a1c_delta.unwrap() - 1.0).abs() < 1e-9);
    }
}
