//! Patient-specific calibration of the parameter bank.
//!
//! Adjustments are independent multipliers, each a pure function of one
//! profile attribute, applied in a fixed order:
//!
//! 1. Obesity tier: TNF-α inhibition of GLUT-4 and palmitic intake
//! 2. Age: β-cell activation and insulin secretion decline
//! 3. Diabetes stage: β-cell function loss, baseline inflammation, hepatic
//!    glucose output
//! 4. Activity level: insulin sensitivity and inflammation
//! 5. Sex: insulin sensitivity and fat clearance
//! 6. Smoking: insulin sensitivity and inflammation
//! 7. Medications: named drug classes
//!
//! The initial state is the fasting quasi-steady state of the stage-adjusted
//! bank, with palmitic acid, TNF-α and GLUT-4 shifted by the obesity tier.
//!
//! References:
//! - Hotamisligil GS et al. Science. 1993;259:87-91 (TNF-α and insulin resistance)
//! - Szoke E et al. Diabetes Care. 2008;31:539-543 (age and β-cell function)
//! - Facchini FS et al. Lancet. 1992;339:1128-1130 (smoking and insulin resistance)

use serde::{Deserialize, Serialize};

use crate::config::ModelParameters;
use crate::error::{Result, SimulationError};
use crate::patient::{ActivityLevel, DiabetesStage, ObesityTier, PatientProfile, Sex, SmokingStatus};
use crate::state::{StateVector, Variable};

/// Age at which β-cell decline starts (years)
const AGE_DECLINE_ONSET_YEARS: f64 = 25.0;
/// Fractional β-cell function lost per year past onset
const AGE_DECLINE_PER_YEAR: f64 = 0.01;
/// Lowest age factor (reached at 65)
const AGE_FACTOR_FLOOR: f64 = 0.6;

/// Fasting GLP-1 (g/cm³)
const FASTING_GLP1: f64 = 4.5e-15;
/// Fasting oleic acid (g/cm³)
const FASTING_OLEIC: f64 = 6.78e-7;
/// Fasting palmitic acid at normal weight (g/cm³)
const FASTING_PALMITIC: f64 = 1.22e-6;

/// Obesity-tier multipliers
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TierAdjustment {
    /// On `eta_T`, TNF-α inhibition of GLUT-4 production
    pub tnf_inhibition: f64,
    /// On `gam_P`, palmitic acid intake
    pub palmitic_production: f64,
    /// On the initial palmitic acid
    pub initial_palmitic: f64,
    /// On the initial TNF-α
    pub initial_tnf: f64,
    /// On the initial GLUT-4
    pub initial_glut4: f64,
}

impl ObesityTier {
    pub fn adjustment(&self) -> TierAdjustment {
        let (tnf_inhibition, palmitic_production, initial_palmitic, initial_tnf, initial_glut4) = match self {
            ObesityTier::Normal => (1.0, 1.0, 1.0, 1.0, 1.0),
            ObesityTier::Overweight => (10.0, 2.0, 1.5, 1.3, 0.85),
            ObesityTier::Obese => (100.0, 3.0, 2.0, 1.6, 0.7),
            ObesityTier::SeverelyObese => (1000.0, 4.0, 2.5, 2.0, 0.55),
        };
        TierAdjustment {
            tnf_inhibition,
            palmitic_production,
            initial_palmitic,
            initial_tnf,
            initial_glut4,
        }
    }
}

/// Stage-specific anchors of the fasting state
#[derive(Debug, Clone, Copy, PartialEq)]
struct StageAnchor {
    beta_cells: f64,
    alpha_cells: f64,
    glucose: f64,
}

impl DiabetesStage {
    /// Multipliers on (lam_B, lam_IB, lam_T)
    fn multipliers(&self) -> (f64, f64, f64) {
        match self {
            DiabetesStage::Normal => (1.0, 1.0, 1.0),
            DiabetesStage::Prediabetic => (0.8, 0.85, 1.25),
            DiabetesStage::Diabetic => (0.55, 0.6, 1.6),
        }
    }

    /// Multiplier on `lam_G0` so production balances utilization at the anchor
    fn hepatic_output(&self) -> f64 {
        self.anchor().glucose / DiabetesStage::Normal.anchor().glucose
    }

    fn anchor(&self) -> StageAnchor {
        match self {
            // fasting glucose 95 mg/dL
            DiabetesStage::Normal => StageAnchor {
                beta_cells: 0.013,
                alpha_cells: 0.005,
                glucose: 0.95e-3,
            },
            // 115 mg/dL
            DiabetesStage::Prediabetic => StageAnchor {
                beta_cells: 0.0115,
                alpha_cells: 0.0055,
                glucose: 1.15e-3,
            },
            // 180 mg/dL
            DiabetesStage::Diabetic => StageAnchor {
                beta_cells: 0.009,
                alpha_cells: 0.0065,
                glucose: 1.8e-3,
            },
        }
    }
}

impl ActivityLevel {
    /// Multipliers on (lam_U4I, lam_T)
    fn multipliers(&self) -> (f64, f64) {
        match self {
            ActivityLevel::Sedentary => (0.8, 1.2),
            ActivityLevel::Light => (0.9, 1.1),
            ActivityLevel::Moderate => (1.0, 1.0),
            ActivityLevel::Active => (1.15, 0.85),
        }
    }
}

impl SmokingStatus {
    /// Multipliers on (lam_U4I, lam_T)
    fn multipliers(&self) -> (f64, f64) {
        match self {
            SmokingStatus::NonSmoker => (1.0, 1.0),
            SmokingStatus::FormerSmoker => (0.95, 1.1),
            SmokingStatus::Smoker => (0.85, 1.3),
        }
    }
}

/// Recognized medication classes
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum MedicationClass {
    Biguanide,
    Insulin,
    Glp1Agonist,
    Sulfonylurea,
    Dpp4Inhibitor,
}

impl MedicationClass {
    const KEYWORDS: [(MedicationClass, &'static [&'static str]); 5] = [
        (MedicationClass::Biguanide, &["metformin", "biguanide", "glucophage"]),
        (
            MedicationClass::Glp1Agonist,
            &[
                "semaglutide", "liraglutide", "dulaglutide", "exenatide", "tirzepatide", "ozempic", "wegovy",
                "victoza", "trulicity", "mounjaro", "glp-1", "glp1",
            ],
        ),
        (
            MedicationClass::Sulfonylurea,
            &["glipizide", "glimepiride", "glyburide", "gliclazide", "sulfonylurea"],
        ),
        (
            MedicationClass::Dpp4Inhibitor,
            &["sitagliptin", "saxagliptin", "linagliptin", "alogliptin", "januvia", "dpp-4", "dpp4"],
        ),
        (
            MedicationClass::Insulin,
            &["insulin", "glargine", "lispro", "aspart", "detemir", "degludec", "lantus", "humalog"],
        ),
    ];

    /// Class of a free-text medication name, matched case-insensitively
    pub fn recognize(name: &str) -> Option<Self> {
        let name = name.to_lowercase();
        Self::KEYWORDS
            .iter()
            .find(|(_, words)| words.iter().any(|w| name.contains(w)))
            .map(|(class, _)| *class)
    }

    fn apply(&self, p: &mut ModelParameters) {
        match self {
            MedicationClass::Biguanide => {
                p.lam_U4I *= 1.2;
                // lower hepatic glucose output
                p.lam_GsU2 *= 0.85;
                p.lam_G0 *= 0.9;
            }
            MedicationClass::Insulin => p.lam_IB *= 1.5,
            MedicationClass::Glp1Agonist => {
                p.gam_L *= 1.5;
                p.mu_LB *= 0.7;
                p.mu_LA *= 0.7;
            }
            MedicationClass::Sulfonylurea => p.lam_IB *= 1.25,
            MedicationClass::Dpp4Inhibitor => {
                p.mu_LB *= 0.8;
                p.mu_LA *= 0.8;
            }
        }
    }
}

/// β-cell age factor: 1 until 25, linear decline, floor 0.6 from 65
pub fn age_factor(age_years: f64) -> f64 {
    (1.0 - AGE_DECLINE_PER_YEAR * (age_years - AGE_DECLINE_ONSET_YEARS)).clamp(AGE_FACTOR_FLOOR, 1.0)
}

/// Calibrates a parameter bank to individual patients
#[derive(Debug, Clone, Default)]
pub struct PatientCalibrator {
    bank: ModelParameters,
}

impl PatientCalibrator {
    pub fn new(bank: ModelParameters) -> Self {
        Self { bank }
    }

    pub fn bank(&self) -> &ModelParameters {
        &self.bank
    }

    /// Calibrated parameters and the matching initial state
    pub fn calibrate(&self, profile: &PatientProfile) -> Result<(ModelParameters, StateVector)> {
        let bmi = profile.bmi();
        if !bmi.is_finite() || bmi <= 0.0 {
            return Err(SimulationError::InvalidProfile(format!("BMI is not usable: {}", bmi)));
        }
        let tier = ObesityTier::from_bmi(bmi);
        let p = self.calibrated_parameters(profile, tier);
        if let Some(name) = p.first_invalid() {
            return Err(SimulationError::InvalidProfile(format!(
                "calibrated parameter {} is non-finite or negative",
                name
            )));
        }

        let initial = self.initial_state(profile.stage, tier);
        if let Some(var) = initial.first_invalid() {
            return Err(SimulationError::InvalidProfile(format!(
                "initial {} ({}) is non-finite or negative",
                var.symbol(),
                initial[var]
            )));
        }

        log::debug!(
            "Calibrated profile: BMI {:.1} ({:?}), stage {}, age factor {:.2}",
            bmi,
            tier,
            profile.stage,
            age_factor(profile.age_years)
        );
        Ok((p, initial))
    }

    fn calibrated_parameters(&self, profile: &PatientProfile, tier: ObesityTier) -> ModelParameters {
        let mut p = self.bank.clone();

        let obesity = tier.adjustment();
        p.eta_T *= obesity.tnf_inhibition;
        p.gam_P *= obesity.palmitic_production;

        let age = age_factor(profile.age_years);
        p.lam_B *= age;
        p.lam_IB *= age;

        let (beta, secretion, inflammation) = profile.stage.multipliers();
        p.lam_B *= beta;
        p.lam_IB *= secretion;
        p.lam_T *= inflammation;
        p.lam_G0 *= profile.stage.hepatic_output();

        let (sensitivity, inflammation) = profile.activity.multipliers();
        p.lam_U4I *= sensitivity;
        p.lam_T *= inflammation;

        if profile.sex == Sex::Female {
            p.lam_U4I *= 1.05;
            p.mu_P *= 1.05;
        }

        let (sensitivity, inflammation) = profile.smoking.multipliers();
        p.lam_U4I *= sensitivity;
        p.lam_T *= inflammation;

        let mut classes = Vec::new();
        for name in &profile.medications {
            match MedicationClass::recognize(name) {
                Some(class) => classes.push(class),
                None => log::debug!("Medication '{}' has no modeled effect", name),
            }
        }
        classes.sort();
        classes.dedup();
        for class in classes {
            class.apply(&mut p);
        }

        p
    }

    /// Fasting state of the stage-adjusted bank, shifted by obesity tier
    pub fn initial_state(&self, stage: DiabetesStage, tier: ObesityTier) -> StateVector {
        let mut p = self.bank.clone();
        let (beta, secretion, inflammation) = stage.multipliers();
        p.lam_B *= beta;
        p.lam_IB *= secretion;
        p.lam_T *= inflammation;

        let anchor = stage.anchor();
        let g = anchor.glucose;
        let b = anchor.beta_cells;
        let a = anchor.alpha_cells;
        let l = FASTING_GLP1;
        let o = FASTING_OLEIC;
        let pa = FASTING_PALMITIC;

        // dI = 0, dTα = 0, dC = 0, dU2 = 0, dU4 = 0, then G* balancing the exchange
        let insulin = p.lam_IB * b / (p.mu_I + p.mu_IG * g);
        let tnf = (p.lam_T + p.lam_TP * pa / (1.0 + o / p.K_hat_O)) / p.mu_T;
        let suppression = if g > p.xi_hi { 1.0 + p.gam_1 * l } else { 1.0 };
        let enhancement = if g < p.xi_lo { 1.0 + p.gam_2 * l } else { 1.0 };
        let glucagon = p.lam_CA * a * enhancement / suppression / p.mu_C;
        let glut2 = p.lam_U2C * glucagon / p.mu_U2;
        let glut4 = p.lam_U4I * insulin / (1.0 + p.eta_T * tnf) / p.mu_U4;
        let u2 = glut2 / (p.K_U2 + glut2);
        let u4 = glut4 / (p.K_U4 + glut4);
        let stored = if u2 > 0.0 { g * p.lam_GU4 * u4 / (p.lam_GsU2 * u2) } else { 0.0 };

        let shift = tier.adjustment();
        let mut state = StateVector::zeros();
        state[Variable::BetaCells] = b;
        state[Variable::AlphaCells] = a;
        state[Variable::Glp1] = l;
        state[Variable::Insulin] = insulin;
        state[Variable::Glut2] = glut2;
        state[Variable::Glut4] = glut4 * shift.initial_glut4;
        state[Variable::Glucagon] = glucagon;
        state[Variable::Glucose] = g;
        state[Variable::StoredGlucose] = stored;
        state[Variable::TnfAlpha] = tnf * shift.initial_tnf;
        state[Variable::OleicAcid] = o;
        state[Variable::PalmiticAcid] = pa * shift.initial_palmitic;
        state
    }
}

/// Calibrate against the default parameter bank
pub fn calibrate(profile: &PatientProfile) -> Result<(ModelParameters, StateVector)> {
    PatientCalibrator::default().calibrate(profile)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn patient(bmi: f64, stage: DiabetesStage) -> PatientProfile {
        PatientProfile::with_bmi(45.0, bmi, 175.0, Sex::Male, stage)
    }

    #[test]
    fn test_age_factor() {
        assert_eq!(age_factor(20.0), 1.0);
        assert_eq!(age_factor(25.0), 1.0);
        assert!((age_factor(45.0) - 0.8).abs() < 1e-12);
        assert!((age_factor(65.0) - 0.6).abs() < 1e-12);
        assert_eq!(age_factor(90.0), 0.6);
    }

    #[test]
    fn test_obesity_tier_scales_inflammation() {
        let bank = ModelParameters::default();
        let (lean, _) = calibrate(&patient(22.0, DiabetesStage::Normal)).unwrap();
        let (obese, _) = calibrate(&patient(36.0, DiabetesStage::Normal)).unwrap();
        assert_eq!(lean.eta_T, bank.eta_T);
        assert!((obese.eta_T / bank.eta_T - 1000.0).abs() < 1e-9);
        assert!((obese.gam_P / bank.gam_P - 4.0).abs() < 1e-12);
    }

    #[test]
    fn test_stage_severity_ordering() {
        let (normal, _) = calibrate(&patient(22.0, DiabetesStage::Normal)).unwrap();
        let (pre, _) = calibrate(&patient(22.0, DiabetesStage::Prediabetic)).unwrap();
        let (diab, _) = calibrate(&patient(22.0, DiabetesStage::Diabetic)).unwrap();
        assert!(normal.lam_B > pre.lam_B && pre.lam_B > diab.lam_B);
        assert!(normal.lam_IB > pre.lam_IB && pre.lam_IB > diab.lam_IB);
        assert!(normal.lam_T < pre.lam_T && pre.lam_T < diab.lam_T);
        assert!(normal.lam_G0 < pre.lam_G0 && pre.lam_G0 < diab.lam_G0);
    }

    #[test]
    fn test_production_balances_utilization_at_anchor() {
        for stage in [DiabetesStage::Normal, DiabetesStage::Prediabetic, DiabetesStage::Diabetic] {
            let (p, s) = calibrate(&patient(22.0, stage)).unwrap();
            let net = p.lam_G0 - p.mu_G * s.glucose();
            assert!(net.abs() < 1e-15, "{}: net production {:e}", stage, net);
        }
    }

    #[test]
    fn test_lifestyle_adjustments() {
        let base = patient(27.0, DiabetesStage::Prediabetic);
        let (moderate, _) = calibrate(&base).unwrap();
        let (active, _) = calibrate(&base.clone().with_activity(ActivityLevel::Active)).unwrap();
        let (smoker, _) = calibrate(&base.clone().with_smoking(SmokingStatus::Smoker)).unwrap();
        let (former, _) = calibrate(&base.clone().with_smoking(SmokingStatus::FormerSmoker)).unwrap();

        assert!(active.lam_U4I > moderate.lam_U4I);
        assert!(active.lam_T < moderate.lam_T);
        assert!(smoker.lam_U4I < former.lam_U4I && former.lam_U4I < moderate.lam_U4I);
        assert!(smoker.lam_T > former.lam_T && former.lam_T > moderate.lam_T);

        let mut female = base.clone();
        female.sex = Sex::Female;
        let (f, _) = calibrate(&female).unwrap();
        assert!(f.lam_U4I > moderate.lam_U4I);
        assert!(f.mu_P > moderate.mu_P);
    }

    #[test]
    fn test_medication_recognition() {
        assert_eq!(MedicationClass::recognize("Metformin 500mg"), Some(MedicationClass::Biguanide));
        assert_eq!(MedicationClass::recognize("insulin glargine"), Some(MedicationClass::Insulin));
        assert_eq!(MedicationClass::recognize("Ozempic"), Some(MedicationClass::Glp1Agonist));
        assert_eq!(MedicationClass::recognize("glipizide"), Some(MedicationClass::Sulfonylurea));
        assert_eq!(MedicationClass::recognize("Januvia"), Some(MedicationClass::Dpp4Inhibitor));
        assert_eq!(MedicationClass::recognize("lisinopril"), None);
    }

    #[test]
    fn test_medications_apply_once() {
        let base = patient(27.0, DiabetesStage::Diabetic);
        let (plain, _) = calibrate(&base).unwrap();
        let (metformin, _) = calibrate(&base.clone().with_medication("metformin")).unwrap();
        let (twice, _) = calibrate(&base.clone().with_medication("metformin").with_medication("Glucophage")).unwrap();
        let (unknown, _) = calibrate(&base.clone().with_medication("aspirin")).unwrap();

        assert!((metformin.lam_U4I / plain.lam_U4I - 1.2).abs() < 1e-12);
        assert!(metformin.lam_GsU2 < plain.lam_GsU2);
        assert!(metformin.lam_G0 < plain.lam_G0);
        assert_eq!(twice, metformin);
        assert_eq!(unknown, plain);

        let (glp1, _) = calibrate(&base.clone().with_medication("semaglutide")).unwrap();
        assert!(glp1.gam_L > plain.gam_L && glp1.mu_LB < plain.mu_LB);
    }

    #[test]
    fn test_initial_state_by_stage_and_tier() {
        let (_, normal) = calibrate(&patient(22.0, DiabetesStage::Normal)).unwrap();
        let (_, diabetic) = calibrate(&patient(22.0, DiabetesStage::Diabetic)).unwrap();
        assert!((normal.glucose() * 1e5 - 95.0).abs() < 1e-9);
        assert!((diabetic.glucose() * 1e5 - 180.0).abs() < 1e-9);
        assert!(diabetic.insulin() < normal.insulin());
        assert!(diabetic.beta_cells() < normal.beta_cells());

        let (_, obese) = calibrate(&patient(32.0, DiabetesStage::Normal)).unwrap();
        assert!((obese.palmitic_acid() / normal.palmitic_acid() - 2.0).abs() < 1e-12);
        assert!((obese.tnf_alpha() / normal.tnf_alpha() - 1.6).abs() < 1e-12);
        assert!((obese.glut4() / normal.glut4() - 0.7).abs() < 1e-12);
        assert_eq!(obese.glucose(), normal.glucose());
    }

    #[test]
    fn test_initial_state_matches_reference_fasting_values() {
        let (_, s) = calibrate(&patient(22.0, DiabetesStage::Normal)).unwrap();
        let rel = |a: f64, b: f64| ((a - b) / b).abs();
        assert!(rel(s.insulin(), 9.6987e-14) < 1e-3);
        assert!(rel(s.glut2(), 7.0904e-6) < 1e-3);
        assert!(rel(s.glut4(), 2.0372e-6) < 1e-3);
        assert!(rel(s.stored_glucose(), 3.124e-4) < 1e-3);
        assert!(rel(s.tnf_alpha(), 7.3136e-12) < 1e-3);
    }

    #[test]
    fn test_invalid_bank_is_rejected() {
        let calibrator = PatientCalibrator::new(ModelParameters {
            lam_T: -1.0,
            ..Default::default()
        });
        let result = calibrator.calibrate(&patient(22.0, DiabetesStage::Normal));
        assert!(matches!(result, Err(SimulationError::InvalidProfile(_))));

        let mut p = patient(22.0, DiabetesStage::Normal);
        p.height_cm = 0.0;
        assert!(calibrate(&p).is_err());
    }
}
