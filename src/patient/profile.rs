//! Patient profile and derived clinical quantities.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SimulationError};

/// Biological sex
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Sex {
    #[default]
    Male,
    Female,
}

/// Diabetes stage reported for the patient
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DiabetesStage {
    #[default]
    Normal,
    Prediabetic,
    Diabetic,
}

/// Habitual physical activity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ActivityLevel {
    Sedentary,
    Light,
    #[default]
    Moderate,
    Active,
}

/// Smoking history
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SmokingStatus {
    #[default]
    NonSmoker,
    FormerSmoker,
    Smoker,
}

macro_rules! impl_str_enum {
    ($ty:ident { $($variant:ident => $name:literal),+ $(,)? }) => {
        impl $ty {
            /// Canonical lowercase name
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($ty::$variant => $name),+
                }
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $ty {
            type Err = String;

            fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
                let normalized = s.trim().to_lowercase().replace(['-', ' '], "_");
                match normalized.as_str() {
                    $($name => Ok($ty::$variant),)+
                    _ => Err(format!(
                        "unknown {} '{}', expected one of: {}",
                        stringify!($ty),
                        s,
                        [$($name),+].join(", ")
                    )),
                }
            }
        }
    };
}

impl_str_enum!(Sex { Male => "male", Female => "female" });
impl_str_enum!(DiabetesStage {
    Normal => "normal",
    Prediabetic => "prediabetic",
    Diabetic => "diabetic",
});
impl_str_enum!(ActivityLevel {
    Sedentary => "sedentary",
    Light => "light",
    Moderate => "moderate",
    Active => "active",
});
impl_str_enum!(SmokingStatus {
    NonSmoker => "non_smoker",
    FormerSmoker => "former_smoker",
    Smoker => "smoker",
});

/// WHO adult BMI category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BmiCategory {
    Underweight,
    Normal,
    Overweight,
    Obese,
}

impl BmiCategory {
    pub fn from_bmi(bmi: f64) -> Self {
        if bmi < 18.5 {
            BmiCategory::Underweight
        } else if bmi < 25.0 {
            BmiCategory::Normal
        } else if bmi < 30.0 {
            BmiCategory::Overweight
        } else {
            BmiCategory::Obese
        }
    }
}

/// Adiposity tier driving the inflammatory insulin-resistance calibration
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ObesityTier {
    /// BMI < 25
    Normal,
    /// 25 ≤ BMI < 30
    Overweight,
    /// 30 ≤ BMI < 35
    Obese,
    /// BMI ≥ 35
    SeverelyObese,
}

impl ObesityTier {
    pub fn from_bmi(bmi: f64) -> Self {
        if bmi < 25.0 {
            ObesityTier::Normal
        } else if bmi < 30.0 {
            ObesityTier::Overweight
        } else if bmi < 35.0 {
            ObesityTier::Obese
        } else {
            ObesityTier::SeverelyObese
        }
    }
}

/// Qualitative diabetes risk from the points score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiskCategory {
    Low,
    Moderate,
    High,
}

/// Immutable description of one patient.
///
/// Ranges are enforced by [`PatientProfile::validate`]; calibration assumes a
/// validated profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatientProfile {
    /// Age (years, 1-120)
    pub age_years: f64,
    /// Body weight (kg, 20-500)
    pub weight_kg: f64,
    /// Height (cm, 30-250)
    pub height_cm: f64,
    #[serde(default)]
    pub sex: Sex,
    #[serde(default)]
    pub stage: DiabetesStage,
    #[serde(default)]
    pub activity: ActivityLevel,
    #[serde(default)]
    pub smoking: SmokingStatus,
    #[serde(default)]
    pub family_history: bool,
    /// Current medications, free-text names
    #[serde(default)]
    pub medications: Vec<String>,
    /// Reported fasting glucose (mg/dL)
    #[serde(default)]
    pub fasting_glucose_mg_dL: Option<f64>,
    /// Reported A1C (%)
    #[serde(default)]
    pub a1c_percent: Option<f64>,
}

impl PatientProfile {
    /// Profile with moderate activity, no smoking, no history and no medications
    pub fn new(age_years: f64, weight_kg: f64, height_cm: f64, sex: Sex, stage: DiabetesStage) -> Self {
        Self {
            age_years,
            weight_kg,
            height_cm,
            sex,
            stage,
            activity: ActivityLevel::default(),
            smoking: SmokingStatus::default(),
            family_history: false,
            medications: Vec::new(),
            fasting_glucose_mg_dL: None,
            a1c_percent: None,
        }
    }

    /// Profile whose weight is chosen to hit `bmi` at the given height
    pub fn with_bmi(age_years: f64, bmi: f64, height_cm: f64, sex: Sex, stage: DiabetesStage) -> Self {
        let height_m = height_cm / 100.0;
        Self::new(age_years, bmi * height_m * height_m, height_cm, sex, stage)
    }

    pub fn with_activity(mut self, activity: ActivityLevel) -> Self {
        self.activity = activity;
        self
    }

    pub fn with_smoking(mut self, smoking: SmokingStatus) -> Self {
        self.smoking = smoking;
        self
    }

    pub fn with_family_history(mut self, family_history: bool) -> Self {
        self.family_history = family_history;
        self
    }

    pub fn with_medication(mut self, name: &str) -> Self {
        self.medications.push(name.to_string());
        self
    }

    /// Body-mass index (kg/m²)
    pub fn bmi(&self) -> f64 {
        let height_m = self.height_cm / 100.0;
        self.weight_kg / (height_m * height_m)
    }

    pub fn bmi_category(&self) -> BmiCategory {
        BmiCategory::from_bmi(self.bmi())
    }

    pub fn obesity_tier(&self) -> ObesityTier {
        ObesityTier::from_bmi(self.bmi())
    }

    /// Human-readable risk factors present in the profile
    pub fn risk_factors(&self) -> Vec<&'static str> {
        let mut factors = Vec::new();
        if self.age_years > 45.0 {
            factors.push("Age over 45");
        }
        if self.bmi() >= 25.0 {
            factors.push("Overweight or obese");
        }
        if self.family_history {
            factors.push("Family history of diabetes");
        }
        if self.activity == ActivityLevel::Sedentary {
            factors.push("Sedentary lifestyle");
        }
        if self.smoking == SmokingStatus::Smoker {
            factors.push("Current smoker");
        }
        factors
    }

    /// Points-based type-2 diabetes risk score
    ///
    /// Reference: American Diabetes Association Risk Test (Bang H et al.,
    /// Ann Intern Med. 2009;151:775-783), extended with a smoking point.
    pub fn risk_score(&self) -> u32 {
        let mut score = match self.age_years {
            a if a >= 60.0 => 3,
            a if a >= 50.0 => 2,
            a if a >= 40.0 => 1,
            _ => 0,
        };
        if self.sex == Sex::Male {
            score += 1;
        }
        if self.family_history {
            score += 1;
        }
        score += match self.bmi() {
            b if b >= 40.0 => 3,
            b if b >= 30.0 => 2,
            b if b >= 25.0 => 1,
            _ => 0,
        };
        if self.activity == ActivityLevel::Sedentary {
            score += 1;
        }
        if self.smoking == SmokingStatus::Smoker {
            score += 1;
        }
        score
    }

    pub fn risk_category(&self) -> RiskCategory {
        match self.risk_score() {
            s if s >= 5 => RiskCategory::High,
            s if s >= 3 => RiskCategory::Moderate,
            _ => RiskCategory::Low,
        }
    }

    /// Check ranges; the first violation is reported
    pub fn validate(&self) -> Result<()> {
        check_range("age_years", self.age_years, 1.0, 120.0)?;
        check_range("weight_kg", self.weight_kg, 20.0, 500.0)?;
        check_range("height_cm", self.height_cm, 30.0, 250.0)?;
        if let Some(glucose) = self.fasting_glucose_mg_dL {
            check_range("fasting_glucose_mg_dL", glucose, 20.0, 600.0)?;
        }
        if let Some(a1c) = self.a1c_percent {
            check_range("a1c_percent", a1c, 3.0, 20.0)?;
        }
        let bmi = self.bmi();
        if !bmi.is_finite() || bmi <= 0.0 {
            return Err(SimulationError::InvalidProfile(format!("BMI is not usable: {}", bmi)));
        }
        Ok(())
    }
}

pub(crate) fn check_range(name: &str, value: f64, min: f64, max: f64) -> Result<()> {
    if value.is_finite() && value >= min && value <= max {
        Ok(())
    } else {
        Err(SimulationError::InvalidProfile(format!(
            "{} = {} outside [{}, {}]",
            name, value, min, max
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reference_patient() -> PatientProfile {
        PatientProfile::new(45.0, 92.0, 175.0, Sex::Male, DiabetesStage::Prediabetic)
    }

    #[test]
    fn test_bmi_and_category() {
        let p = reference_patient();
        assert!((p.bmi() - 30.04).abs() < 0.01);
        assert_eq!(p.bmi_category(), BmiCategory::Obese);
        assert_eq!(p.obesity_tier(), ObesityTier::Obese);

        let lean = PatientProfile::with_bmi(30.0, 22.0, 175.0, Sex::Female, DiabetesStage::Normal);
        assert!((lean.bmi() - 22.0).abs() < 1e-9);
        assert_eq!(lean.bmi_category(), BmiCategory::Normal);
        assert_eq!(BmiCategory::from_bmi(17.0), BmiCategory::Underweight);
    }

    #[test]
    fn test_tier_boundaries() {
        assert_eq!(ObesityTier::from_bmi(24.99), ObesityTier::Normal);
        assert_eq!(ObesityTier::from_bmi(25.0), ObesityTier::Overweight);
        assert_eq!(ObesityTier::from_bmi(30.0), ObesityTier::Obese);
        assert_eq!(ObesityTier::from_bmi(35.0), ObesityTier::SeverelyObese);
        assert!(ObesityTier::Normal < ObesityTier::SeverelyObese);
    }

    #[test]
    fn test_risk_factors_and_score() {
        let p = reference_patient()
            .with_activity(ActivityLevel::Sedentary)
            .with_family_history(true);
        let factors = p.risk_factors();
        assert!(!factors.contains(&"Age over 45"));
        assert!(factors.contains(&"Overweight or obese"));
        assert!(factors.contains(&"Sedentary lifestyle"));
        // age 1 + male 1 + history 1 + bmi 2 + sedentary 1
        assert_eq!(p.risk_score(), 6);
        assert_eq!(p.risk_category(), RiskCategory::High);

        let young = PatientProfile::with_bmi(25.0, 21.0, 165.0, Sex::Female, DiabetesStage::Normal);
        assert_eq!(young.risk_score(), 0);
        assert_eq!(young.risk_category(), RiskCategory::Low);
    }

    #[test]
    fn test_validation_rejects_out_of_range() {
        assert!(reference_patient().validate().is_ok());

        let mut p = reference_patient();
        p.age_years = 0.0;
        assert!(matches!(p.validate(), Err(SimulationError::InvalidProfile(_))));

        let mut p = reference_patient();
        p.weight_kg = f64::NAN;
        assert!(p.validate().is_err());

        let mut p = reference_patient();
        p.height_cm = 300.0;
        assert!(p.validate().is_err());
    }

    #[test]
    fn test_enum_parsing() {
        assert_eq!("Former-Smoker".parse::<SmokingStatus>(), Ok(SmokingStatus::FormerSmoker));
        assert_eq!("prediabetic".parse::<DiabetesStage>(), Ok(DiabetesStage::Prediabetic));
        assert_eq!(ActivityLevel::Sedentary.to_string(), "sedentary");
        assert!("athletic".parse::<ActivityLevel>().is_err());
    }

    #[test]
    fn test_deserialize_minimal_profile() {
        let json = r#"{"age_years": 50, "weight_kg": 80, "height_cm": 170, "stage": "diabetic"}"#;
        let p: PatientProfile = serde_json::from_str(json).unwrap();
        assert_eq!(p.stage, DiabetesStage::Diabetic);
        assert_eq!(p.activity, ActivityLevel::Moderate);
        assert!(p.medications.is_empty());
    }
}
