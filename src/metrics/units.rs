//! Conversion from native model units to clinical units.

use serde::{Deserialize, Serialize};

use crate::state::{StateVector, Variable};

/// g/cm³ → mg/dL
pub const GLUCOSE_TO_MG_DL: f64 = 1e5;
/// g/cm³ → pmol/L
pub const INSULIN_TO_PMOL_L: f64 = 1.8e11;
/// g/cm³ → pg/mL
pub const GLUCAGON_TO_PG_ML: f64 = 1e12;
/// g/cm³ → pmol/L
pub const GLP1_TO_PMOL_L: f64 = 1.8e11;
/// Display scale for β/α-cell mass
pub const CELL_MASS_SCALE: f64 = 1e3;
/// Display scale for transporter densities
pub const TRANSPORTER_SCALE: f64 = 1e6;
/// Display scale for fatty acids
pub const FATTY_ACID_SCALE: f64 = 1e6;
/// Display scale for TNF-α
pub const TNF_SCALE: f64 = 1e12;

impl Variable {
    /// Multiplier from native units to the clinical/display unit
    pub fn clinical_scale(self) -> f64 {
        match self {
            Variable::BetaCells | Variable::AlphaCells => CELL_MASS_SCALE,
            Variable::Glp1 => GLP1_TO_PMOL_L,
            Variable::Insulin => INSULIN_TO_PMOL_L,
            Variable::Glut2 | Variable::Glut4 => TRANSPORTER_SCALE,
            Variable::Glucagon => GLUCAGON_TO_PG_ML,
            Variable::Glucose | Variable::StoredGlucose => GLUCOSE_TO_MG_DL,
            Variable::TnfAlpha => TNF_SCALE,
            Variable::OleicAcid | Variable::PalmiticAcid => FATTY_ACID_SCALE,
        }
    }

    /// Unit label of [`Variable::clinical_scale`]
    pub fn clinical_unit(self) -> &'static str {
        match self {
            Variable::Glucose | Variable::StoredGlucose => "mg/dL",
            Variable::Insulin | Variable::Glp1 => "pmol/L",
            Variable::Glucagon => "pg/mL",
            Variable::BetaCells | Variable::AlphaCells => "mg/cm³",
            Variable::Glut2 | Variable::Glut4 | Variable::OleicAcid | Variable::PalmiticAcid => "μg/cm³",
            Variable::TnfAlpha => "pg/cm³",
        }
    }
}

/// One trajectory sample in clinical units
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClinicalSample {
    pub time_hours: f64,
    pub glucose_mg_dL: f64,
    pub stored_glucose_mg_dL: f64,
    pub insulin_pmol_L: f64,
    pub glucagon_pg_mL: f64,
    pub glp1_pmol_L: f64,
    pub beta_cells: f64,
    pub alpha_cells: f64,
    pub glut2: f64,
    pub glut4: f64,
    pub tnf_alpha: f64,
    pub oleic_acid: f64,
    pub palmitic_acid: f64,
}

impl ClinicalSample {
    pub fn from_state(time_hours: f64, s: &StateVector) -> Self {
        let c = |var: Variable| s[var] * var.clinical_scale();
        Self {
            time_hours,
            glucose_mg_dL: c(Variable::Glucose),
            stored_glucose_mg_dL: c(Variable::StoredGlucose),
            insulin_pmol_L: c(Variable::Insulin),
            glucagon_pg_mL: c(Variable::Glucagon),
            glp1_pmol_L: c(Variable::Glp1),
            beta_cells: c(Variable::BetaCells),
            alpha_cells: c(Variable::AlphaCells),
            glut2: c(Variable::Glut2),
            glut4: c(Variable::Glut4),
            tnf_alpha: c(Variable::TnfAlpha),
            oleic_acid: c(Variable::OleicAcid),
            palmitic_acid: c(Variable::PalmiticAcid),
        }
    }
}

/// Estimated A1C (%) from mean glucose, unrounded
///
/// Reference: Nathan DM et al. Diabetes Care. 2008;31:1473-1478 (ADAG)
pub fn a1c_from_mean_glucose(mean_mg_dL: f64) -> f64 {
    (mean_mg_dL + 46.7) / 28.7
}

/// Mean glucose (mg/dL) implied by an A1C (%)
pub fn mean_glucose_from_a1c(a1c_percent: f64) -> f64 {
    a1c_percent * 28.7 - 46.7
}

/// A1C as reported: one decimal
pub fn round_a1c(a1c_percent: f64) -> f64 {
    (a1c_percent * 10.0).round() / 10.0
}

/// pmol/L → μU/mL for insulin
pub const INSULIN_PMOL_L_TO_UU_ML: f64 = 0.144;

/// HOMA insulin-resistance index from fasting glucose and insulin
///
/// Reference: Matthews DR et al. Diabetologia. 1985;28:412-419
pub fn homa_ir(glucose_mg_dL: f64, insulin_pmol_L: f64) -> f64 {
    glucose_mg_dL * insulin_pmol_L * INSULIN_PMOL_L_TO_UU_ML / 405.0
}

/// HOMA β-cell function (%); zero at or below 63 mg/dL
pub fn homa_b(glucose_mg_dL: f64, insulin_pmol_L: f64) -> f64 {
    if glucose_mg_dL > 63.0 {
        20.0 * insulin_pmol_L * INSULIN_PMOL_L_TO_UU_ML / (glucose_mg_dL - 63.0)
    } else {
        0.0
    }
}

/// Glucose management indicator (%)
///
/// Reference: Bergenstal RM et al. Diabetes Care. 2018;41:2275-2280
pub fn glucose_management_indicator(mean_mg_dL: f64) -> f64 {
    3.31 + 0.02392 * mean_mg_dL
}
