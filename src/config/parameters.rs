//! Model parameter bank with citation metadata.
//!
//! Rate constants are per day, concentrations are g/cm³ (cell masses are
//! expressed as densities in the same unit). The dynamics divide every rate
//! by [`HOURS_PER_DAY`] because simulation time runs in hours.
//!
//! Base source: Siewe N, Friedman A. A mathematical model of obesity-induced
//! type 2 diabetes and efficacy of anti-diabetic weight reducing drug.
//! J Theor Biol. 2024. doi:10.1016/j.jtbi.2024.111756
//!
//! Cell-turnover rates, the glucotoxicity coefficient and the two hormone
//! thresholds (`insulin_deficit_threshold`, `glp1_threshold`) are retuned so
//! that each diabetes stage starts from a fasting quasi-steady state.
//!
//! Endogenous production `lam_G0` and insulin-independent utilization `mu_G`
//! close the glucose balance: without them blood plus stored glucose only
//! grows with each meal. `lam_G0 = mu_G × 95 mg/dL` holds fasting glucose at
//! its normal anchor.

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Simulation time unit conversion
pub const HOURS_PER_DAY: f64 = 24.0;

/// Named rate and half-saturation constants of the twelve-variable model.
///
/// Field names follow the paper's symbols: `lam_*` production/activation,
/// `mu_*` decay/clearance, `gam_*` influx, `K_*` half-saturation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelParameters {
    // === Half-saturation constants ===
    /// GLP-1 half-saturation for β-cell activation (g/cm³)
    pub K_L: f64,
    /// GLP-1 inhibition constant for α-cell activation (g/cm³)
    pub K_hat_L: f64,
    /// GLUT-2 half-saturation for hepatic glucose release (g/cm³)
    pub K_U2: f64,
    /// GLUT-4 half-saturation for peripheral uptake (g/cm³)
    pub K_U4: f64,
    /// Insulin-deficit half-saturation for α-cell activation (g/cm³)
    pub K_I: f64,
    /// Oleic-acid inhibition of palmitic-driven TNF-α secretion (g/cm³)
    pub K_hat_O: f64,
    /// Drug dose half-saturation for the GLP-1 enhancer (dose units)
    pub K_D: f64,
    /// Drug dose inhibition constant for glucose influx (dose units)
    pub K_hat_D: f64,

    // === Production and activation (per day) ===
    /// α-cell activation by insulin deficit
    pub lam_A: f64,
    /// β-cell activation by GLP-1
    pub lam_B: f64,
    /// GLP-1 secretion during meals (g/cm³/day)
    /// Source: Siewe & Friedman 2024, Table 2
    pub gam_L: f64,
    /// Insulin secretion per unit β-cell mass
    /// Source: Siewe & Friedman 2024, Table 2
    pub lam_IB: f64,
    /// GLUT-4 production by insulin
    pub lam_U4I: f64,
    /// GLUT-2 production by glucagon
    pub lam_U2C: f64,
    /// Glucagon secretion per unit α-cell mass
    pub lam_CA: f64,
    /// Meal glucose influx (g/cm³/day)
    pub gam_G: f64,
    /// Early post-meal glucose elimination into storage
    pub gam_Gs: f64,
    /// Meal oleic-acid influx (g/cm³/day)
    pub gam_O: f64,
    /// Meal palmitic-acid influx (g/cm³/day)
    pub gam_P: f64,
    /// GLUT-4 mediated glucose uptake into storage
    /// Source: Siewe & Friedman 2024, Table 2
    pub lam_GU4: f64,
    /// GLUT-2 mediated release from storage
    /// Source: Siewe & Friedman 2024, Table 2
    pub lam_GsU2: f64,
    /// Endogenous (hepatic) glucose production into blood (g/cm³/day)
    pub lam_G0: f64,
    /// Baseline TNF-α secretion (g/cm³/day)
    pub lam_T: f64,
    /// TNF-α secretion driven by palmitic acid
    pub lam_TP: f64,

    // === Decay and clearance (per day) ===
    /// α-cell deactivation
    pub mu_A: f64,
    /// β-cell deactivation
    pub mu_B: f64,
    /// GLP-1 degradation per unit β-cell mass (cm³/g/day)
    pub mu_LB: f64,
    /// GLP-1 degradation per unit α-cell mass (cm³/g/day)
    pub mu_LA: f64,
    /// Insulin clearance
    /// Source: Siewe & Friedman 2024, Table 2
    pub mu_I: f64,
    /// GLUT-4 turnover
    pub mu_U4: f64,
    /// GLUT-2 turnover
    pub mu_U2: f64,
    /// Glucagon clearance
    pub mu_C: f64,
    /// TNF-α clearance
    pub mu_T: f64,
    /// Oleic-acid clearance
    pub mu_O: f64,
    /// Palmitic-acid clearance
    pub mu_P: f64,
    /// Glucose-dependent insulin clearance (cm³/g/day)
    pub mu_IG: f64,
    /// Insulin-independent glucose utilization (brain, red cells)
    pub mu_G: f64,

    // === Switches and sensitivities ===
    /// GLP-1 suppression of glucagon at high glucose (cm³/g)
    pub gam_1: f64,
    /// GLP-1 enhancement of glucagon at low glucose (cm³/g)
    pub gam_2: f64,
    /// Glucotoxic β-cell deactivation (cm³/g)
    pub xi_1: f64,
    /// Lipotoxic β-cell deactivation (cm³/g)
    pub xi_2: f64,
    /// Glucose level below which glucagon is enhanced (g/cm³)
    pub xi_lo: f64,
    /// Glucose level above which glucagon is suppressed (g/cm³)
    pub xi_hi: f64,
    /// TNF-α inhibition of insulin-driven GLUT-4 production (cm³/g)
    pub eta_T: f64,
    /// Insulin level below which α-cells are activated (g/cm³)
    pub insulin_deficit_threshold: f64,
    /// GLP-1 level above which β-cells are activated (g/cm³)
    pub glp1_threshold: f64,
}

impl ModelParameters {
    /// Load from JSON file or return defaults
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Self {
        match std::fs::read_to_string(path.as_ref()) {
            Ok(contents) => match serde_json::from_str(&contents) {
                Ok(params) => {
                    log::info!("Loaded model parameters from {:?}", path.as_ref());
                    params
                }
                Err(e) => {
                    log::warn!("Failed to parse model parameters: {}, using defaults", e);
                    Self::default()
                }
            },
            Err(_) => {
                log::info!("Model parameters file not found, using defaults");
                Self::default()
            }
        }
    }

    /// Every constant with its field name, in declaration order
    pub fn named_values(&self) -> Vec<(&'static str, f64)> {
        vec![
            ("K_L", self.K_L),
            ("K_hat_L", self.K_hat_L),
            ("K_U2", self.K_U2),
            ("K_U4", self.K_U4),
            ("K_I", self.K_I),
            ("K_hat_O", self.K_hat_O),
            ("K_D", self.K_D),
            ("K_hat_D", self.K_hat_D),
            ("lam_A", self.lam_A),
            ("lam_B", self.lam_B),
            ("gam_L", self.gam_L),
            ("lam_IB", self.lam_IB),
            ("lam_U4I", self.lam_U4I),
            ("lam_U2C", self.lam_U2C),
            ("lam_CA", self.lam_CA),
            ("gam_G", self.gam_G),
            ("gam_Gs", self.gam_Gs),
            ("gam_O", self.gam_O),
            ("gam_P", self.gam_P),
            ("lam_GU4", self.lam_GU4),
            ("lam_GsU2", self.lam_GsU2),
            ("lam_G0", self.lam_G0),
            ("lam_T", self.lam_T),
            ("lam_TP", self.lam_TP),
            ("mu_A", self.mu_A),
            ("mu_B", self.mu_B),
            ("mu_LB", self.mu_LB),
            ("mu_LA", self.mu_LA),
            ("mu_I", self.mu_I),
            ("mu_U4", self.mu_U4),
            ("mu_U2", self.mu_U2),
            ("mu_C", self.mu_C),
            ("mu_T", self.mu_T),
            ("mu_O", self.mu_O),
            ("mu_P", self.mu_P),
            ("mu_IG", self.mu_IG),
            ("mu_G", self.mu_G),
            ("gam_1", self.gam_1),
            ("gam_2", self.gam_2),
            ("xi_1", self.xi_1),
            ("xi_2", self.xi_2),
            ("xi_lo", self.xi_lo),
            ("xi_hi", self.xi_hi),
            ("eta_T", self.eta_T),
            ("insulin_deficit_threshold", self.insulin_deficit_threshold),
            ("glp1_threshold", self.glp1_threshold),
        ]
    }

    /// Name of the first constant that is non-finite or negative, if any
    pub fn first_invalid(&self) -> Option<&'static str> {
        self.named_values()
            .into_iter()
            .find(|(_, v)| !v.is_finite() || *v < 0.0)
            .map(|(name, _)| name)
    }
}

impl Default for ModelParameters {
    fn default() -> Self {
        Self {
            // Siewe & Friedman 2024, Table 2
            K_L: 1.5e-14,
            K_hat_L: 1.5e-14,
            K_U2: 9.45e-6,
            K_U4: 2.78e-6,
            K_I: 2e-13,
            K_hat_O: 1.36e-6,
            K_D: 1.0,
            K_hat_D: 2.0,

            // Slow cell turnover (retuned)
            lam_A: 0.0126,
            lam_B: 0.0457,
            gam_L: 1.98e-13,
            lam_IB: 5.73e-9,
            lam_U4I: 4.17e7,
            lam_U2C: 6.6e10,
            lam_CA: 1.65e-11,
            gam_G: 0.004,
            gam_Gs: 3.0,
            gam_O: 5.6e-5,
            gam_P: 8.8e-5,
            lam_GU4: 1.548,
            lam_GsU2: 4.644,
            // mu_G × normal fasting glucose
            lam_G0: 5.7e-3,
            lam_T: 1.19e-9,
            lam_TP: 3.26e-4,

            mu_A: 0.2,
            mu_B: 0.2,
            mu_LB: 251.0,
            mu_LA: 251.0,
            mu_I: 198.04,
            mu_U4: 1.85,
            mu_U2: 4.62,
            mu_C: 166.22,
            mu_T: 199.0,
            mu_O: 13.68,
            mu_P: 12.0,
            mu_IG: 6e5,
            mu_G: 6.0,

            gam_1: 1e14,
            gam_2: 1.2e14,
            xi_1: 500.0,
            xi_2: 1e5,
            xi_lo: 0.7e-3,
            xi_hi: 1.0e-3,
            eta_T: 1e10,
            insulin_deficit_threshold: 1.2e-13,
            glp1_threshold: 3e-15,
        }
    }
}
