//! Derived health metrics of a patient profile.
//!
//! References:
//! - Roza AM, Shizgal HM. Am J Clin Nutr. 1984;40:168-182 (revised Harris-Benedict)
//! - WHO. Obesity: preventing and managing the global epidemic. 2000 (BMI 18.5-24.9)

use serde::{Deserialize, Serialize};

use super::profile::{ActivityLevel, DiabetesStage, PatientProfile, RiskCategory, Sex, SmokingStatus};

/// BMI bounds of the healthy weight range
pub const HEALTHY_BMI_RANGE: (f64, f64) = (18.5, 24.9);

/// Weekly exercise target when activity is low (minutes)
const LOW_ACTIVITY_EXERCISE_MINUTES: u32 = 150;
/// Weekly exercise target otherwise (minutes)
const EXERCISE_MINUTES: u32 = 75;

impl ActivityLevel {
    /// Energy expenditure over basal metabolic rate
    pub fn calorie_multiplier(&self) -> f64 {
        match self {
            ActivityLevel::Sedentary => 1.2,
            ActivityLevel::Light => 1.375,
            ActivityLevel::Moderate => 1.55,
            ActivityLevel::Active => 1.725,
        }
    }
}

/// Health metrics derived from the profile alone
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthMetrics {
    /// Weights at the healthy BMI bounds for this height (kg)
    pub ideal_weight_range_kg: (f64, f64),
    /// Basal metabolic rate (kcal/day)
    pub bmr_kcal: f64,
    /// BMR scaled by activity (kcal/day)
    pub daily_calories_kcal: f64,
    /// Weekly exercise target (minutes)
    pub recommended_exercise_minutes: u32,
    pub cardiovascular_risk: RiskCategory,
    /// Age adjusted for excess BMI and activity (years)
    pub metabolic_age_years: f64,
}

impl PatientProfile {
    /// Weights bounding the healthy BMI range at this height (kg)
    pub fn ideal_weight_range_kg(&self) -> (f64, f64) {
        let height_m = self.height_cm / 100.0;
        let area = height_m * height_m;
        (HEALTHY_BMI_RANGE.0 * area, HEALTHY_BMI_RANGE.1 * area)
    }

    /// Harris-Benedict basal metabolic rate (kcal/day)
    pub fn basal_metabolic_rate(&self) -> f64 {
        match self.sex {
            Sex::Male => 88.362 + 13.397 * self.weight_kg + 4.799 * self.height_cm - 5.677 * self.age_years,
            Sex::Female => 447.593 + 9.247 * self.weight_kg + 3.098 * self.height_cm - 4.330 * self.age_years,
        }
    }

    pub fn daily_calorie_needs(&self) -> f64 {
        self.basal_metabolic_rate() * self.activity.calorie_multiplier()
    }

    /// Points score: age over 45 (1), BMI over 30 (2), smoker (2), family history (1), diabetic (2)
    pub fn cardiovascular_score(&self) -> u32 {
        let mut score = 0;
        if self.age_years > 45.0 {
            score += 1;
        }
        if self.bmi() > 30.0 {
            score += 2;
        }
        if self.smoking == SmokingStatus::Smoker {
            score += 2;
        }
        if self.family_history {
            score += 1;
        }
        if self.stage == DiabetesStage::Diabetic {
            score += 2;
        }
        score
    }

    pub fn cardiovascular_risk(&self) -> RiskCategory {
        match self.cardiovascular_score() {
            s if s >= 5 => RiskCategory::High,
            s if s >= 3 => RiskCategory::Moderate,
            _ => RiskCategory::Low,
        }
    }

    /// Half a year per BMI point over 25, five years off for active, five on for sedentary
    pub fn metabolic_age(&self) -> f64 {
        let mut age = self.age_years;
        let bmi = self.bmi();
        if bmi > 25.0 {
            age += (bmi - 25.0) * 0.5;
        }
        match self.activity {
            ActivityLevel::Active => age - 5.0,
            ActivityLevel::Sedentary => age + 5.0,
            _ => age,
        }
    }

    pub fn health_metrics(&self) -> HealthMetrics {
        HealthMetrics {
            ideal_weight_range_kg: self.ideal_weight_range_kg(),
            bmr_kcal: self.basal_metabolic_rate(),
            daily_calories_kcal: self.daily_calorie_needs(),
            recommended_exercise_minutes: match self.activity {
                ActivityLevel::Sedentary | ActivityLevel::Light => LOW_ACTIVITY_EXERCISE_MINUTES,
                _ => EXERCISE_MINUTES,
            },
            cardiovascular_risk: self.cardiovascular_risk(),
            metabolic_age_years: self.metabolic_age(),
        }
    }
}
