//! Clinical notes derived from a profile and its run summary.

use serde::{Deserialize, Serialize};

use super::summary::{Diagnosis, RangeStatus, SimulationSummary, RANGE_LOW_MG_DL, TIGHT_RANGE_HIGH_MG_DL};
use crate::patient::{ActivityLevel, BmiCategory, PatientProfile, RiskCategory, SmokingStatus};

/// Consensus glycemic targets
/// Reference: Battelino T et al. Diabetes Care. 2019;42:1593-1603
const MAX_TIME_BELOW_RANGE_PERCENT: f64 = 4.0;
const MAX_TIME_ABOVE_RANGE_PERCENT: f64 = 25.0;
const MAX_COEFFICIENT_OF_VARIATION: f64 = 36.0;

/// Status lines, warnings and recommendations for one run
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClinicalNotes {
    /// Named values worth reporting
    pub metrics: Vec<(String, f64)>,
    /// Status messages
    pub status: Vec<String>,
    /// Warning messages
    pub warnings: Vec<String>,
    /// Lifestyle and treatment suggestions
    pub recommendations: Vec<String>,
}

impl ClinicalNotes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a metric
    pub fn add_metric(&mut self, name: &str, value: f64) {
        self.metrics.push((name.to_string(), value));
    }

    /// Add a status message
    pub fn add_status(&mut self, msg: &str) {
        self.status.push(msg.to_string());
    }

    /// Add a warning
    pub fn add_warning(&mut self, msg: &str) {
        self.warnings.push(msg.to_string());
    }

    pub fn add_recommendation(&mut self, msg: &str) {
        self.recommendations.push(msg.to_string());
    }

    /// Notes for a completed run
    pub fn for_run(profile: &PatientProfile, summary: &SimulationSummary) -> Self {
        let mut notes = Self::new();

        notes.add_metric("BMI", profile.bmi());
        notes.add_metric("Risk score", profile.risk_score() as f64);
        notes.add_metric("A1C estimate (%)", summary.a1c_estimate);
        notes.add_metric("GMI (%)", summary.gmi_percent);
        notes.add_metric("Time in range (%)", summary.time_in_range_percent);
        notes.add_metric("HOMA-IR (fasting)", summary.fasting_homa_ir);
        notes.add_metric("HOMA-B (fasting, %)", summary.fasting_homa_b);
        notes.add_metric("Metabolic age (years)", profile.metabolic_age());
        notes.add_metric("Daily calorie needs (kcal)", profile.daily_calorie_needs());
        if let Some(dawn) = summary.dawn_phenomenon_mg_dL {
            notes.add_metric("Dawn phenomenon (mg/dL)", dawn);
        }

        notes.add_status(&format!("Diagnosis: {}", summary.diagnosis));
        notes.add_status(&format!("BMI category: {:?}", profile.bmi_category()));
        notes.add_status(&format!("Diabetes risk: {:?}", profile.risk_category()));
        notes.add_status(&format!("Cardiovascular risk: {:?}", profile.cardiovascular_risk()));
        match RangeStatus::from_value(summary.mean_glucose_mg_dL, RANGE_LOW_MG_DL, TIGHT_RANGE_HIGH_MG_DL) {
            RangeStatus::Normal => notes.add_status("Mean glucose within tight range"),
            RangeStatus::Warning => notes.add_status("Mean glucose slightly outside tight range"),
            RangeStatus::Critical => notes.add_warning("Mean glucose far outside tight range"),
        }
        for factor in profile.risk_factors() {
            notes.add_status(&format!("Risk factor: {}", factor));
        }

        if summary.time_below_range_percent > MAX_TIME_BELOW_RANGE_PERCENT {
            notes.add_warning(&format!(
                "Time below 70 mg/dL is {:.1}% (target < {}%)",
                summary.time_below_range_percent, MAX_TIME_BELOW_RANGE_PERCENT
            ));
        }
        if summary.time_above_range_percent > MAX_TIME_ABOVE_RANGE_PERCENT {
            notes.add_warning(&format!(
                "Time above 180 mg/dL is {:.1}% (target < {}%)",
                summary.time_above_range_percent, MAX_TIME_ABOVE_RANGE_PERCENT
            ));
        }
        if summary.coefficient_of_variation > MAX_COEFFICIENT_OF_VARIATION {
            notes.add_warning(&format!(
                "Glucose variability {:.1}% exceeds {}%",
                summary.coefficient_of_variation, MAX_COEFFICIENT_OF_VARIATION
            ));
        }
        if let Some(delta) = summary.reported_a1c_delta {
            if delta.abs() >= 0.5 {
                notes.add_warning(&format!(
                    "Estimated A1C differs from reported value by {:+.1} points",
                    delta
                ));
            }
        }

        if summary.diagnosis != Diagnosis::Normal {
            notes.add_recommendation("Discuss glucose-lowering therapy and monitoring with a clinician");
        }
        if matches!(profile.bmi_category(), BmiCategory::Overweight | BmiCategory::Obese) {
            notes.add_recommendation("A 5-10% weight reduction improves insulin sensitivity");
        }
        if matches!(profile.activity, ActivityLevel::Sedentary | ActivityLevel::Light) {
            notes.add_recommendation("Aim for 150 minutes of moderate activity per week");
        }
        if profile.smoking == SmokingStatus::Smoker {
            notes.add_recommendation("Smoking cessation reduces inflammation and insulin resistance");
        }
        if summary.time_above_range_percent > MAX_TIME_ABOVE_RANGE_PERCENT {
            notes.add_recommendation("Spread carbohydrate intake over smaller, more frequent meals");
        }
        if profile.risk_category() == RiskCategory::High && summary.diagnosis == Diagnosis::Normal {
            notes.add_recommendation("Screen A1C yearly given the elevated risk score");
        }

        notes
    }

    /// Print a formatted summary
    pub fn print_summary(&self) {
        if !self.metrics.is_empty() {
            println!("Metrics:");
            for (name, value) in &self.metrics {
                if *value != 0.0 && value.abs() < 0.01 {
                    println!("  {}: {:.3e}", name, value);
                } else {
                    println!("  {}: {:.2}", name, value);
                }
            }
            println!();
        }

        for (title, lines) in [
            ("Status", &self.status),
            ("Warnings", &self.warnings),
            ("Recommendations", &self.recommendations),
        ] {
            if !lines.is_empty() {
                println!("{}:", title);
                for msg in lines {
                    println!("  {}", msg);
                }
                println!();
            }
        }
    }
}
