//! Per-request inputs: the patient profile and the scenario.

mod health;
mod profile;
mod scenario;

pub use health::{HealthMetrics, HEALTHY_BMI_RANGE};
pub use profile::{
    ActivityLevel, BmiCategory, DiabetesStage, ObesityTier, PatientProfile, RiskCategory, Sex,
    SmokingStatus,
};
pub use scenario::{
    DrugClass, Meal, ScenarioParams, INTERACTIVE_DURATION_HOURS, MAX_DRUG_DOSE, MAX_DURATION_HOURS,
    MEAL_NAMES,
};
