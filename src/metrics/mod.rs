//! Clinical metrics derived from simulated trajectories.
//!
//! Native concentrations are rescaled to clinical units, then summarized into
//! glucose statistics, time-in-range, an A1C estimate, fasting HOMA indices and
//! a diagnosis class.

mod notes;
mod summary;
mod units;

pub use notes::ClinicalNotes;
pub use summary::{
    summarize, Diagnosis, RangeStatus, SimulationSummary, DIABETES_A1C, PREDIABETES_A1C, RANGE_HIGH_MG_DL,
    RANGE_LOW_MG_DL, TIGHT_RANGE_HIGH_MG_DL,
};
pub use units::{
    a1c_from_mean_glucose, glucose_management_indicator, homa_b, homa_ir, mean_glucose_from_a1c, round_a1c,
    ClinicalSample, CELL_MASS_SCALE, FATTY_ACID_SCALE, GLUCAGON_TO_PG_ML, GLUCOSE_TO_MG_DL, GLP1_TO_PMOL_L,
    INSULIN_PMOL_L_TO_UU_ML, INSULIN_TO_PMOL_L, TNF_SCALE, TRANSPORTER_SCALE,
};
