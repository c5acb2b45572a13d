//! T2D Simulator - obesity-induced type-2 diabetes simulation engine
//!
//! This library calibrates a twelve-variable physiological model to a patient
//! profile, integrates it under meal and drug forcing, and reduces the result
//! to clinical metrics (time in range, estimated A1C, diagnosis).

// Allow non-snake-case for unit suffixes in field names (mg_dL, pmol_L, etc.)
// This follows the project convention of including units in names.
#![allow(non_snake_case)]

pub mod comparison;
pub mod config;
pub mod error;
pub mod export;
pub mod metrics;
pub mod patient;
pub mod physiology;
pub mod simulation;
pub mod state;

pub use comparison::{
    compare, drug_sweep_variants, meal_pattern_variants, obesity_progression_variants, Comparison,
    ScenarioVariant, VariantFailure, VariantResult,
};
pub use config::{EngineSettings, ModelParameters};
pub use error::{Result, SimulationError};
pub use metrics::{ClinicalNotes, Diagnosis, SimulationSummary};
pub use patient::{
    ActivityLevel, DiabetesStage, DrugClass, HealthMetrics, Meal, PatientProfile, ScenarioParams, Sex,
    SmokingStatus,
};
pub use physiology::{calibrate, PatientCalibrator, RunBudget};
pub use simulation::{simulate, SimulationRun, Simulator};
pub use state::{StateVector, Trajectory, Variable};
