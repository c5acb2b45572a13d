//! Right-hand side of the twelve-variable obesity/T2D model.
//!
//! Every equation is production minus first-order loss. Loss terms are
//! proportional to their own variable, so trajectories stay non-negative in
//! exact arithmetic; the integrator clamps round-off below zero.
//!
//! Rates in [`ModelParameters`] are per day and the result is per hour.
//!
//! Blood glucose has one source besides meals, endogenous production, and
//! one sink, insulin-independent utilization. Every other glucose term moves
//! mass between blood and storage.
//!
//! Coupling pathway:
//!   meal → GLP-1 → β-cells → insulin → GLUT-4 → glucose uptake
//!   meal → palmitic acid → TNF-α ─┤ GLUT-4   (insulin resistance)
//!   glucose, palmitic acid ─┤ β-cells        (gluco/lipotoxicity)
//!
//! Reference: Siewe N, Friedman A. J Theor Biol. 2024 (doi:10.1016/j.jtbi.2024.111756)

use crate::config::{ModelParameters, HOURS_PER_DAY};
use crate::state::{StateVector, Variable, STATE_DIM};

use super::forcing::{ForcingState, MealForcing};
use super::integrator::OdeSystem;

/// Saturating activation x / (k + x)
#[inline]
fn saturating(x: f64, k: f64) -> f64 {
    if x <= 0.0 {
        0.0
    } else {
        x / (k + x)
    }
}

/// Derivatives (per hour) for a given forcing state
pub fn derivatives(y: &[f64; STATE_DIM], p: &ModelParameters, f: &ForcingState) -> [f64; STATE_DIM] {
    let b = y[Variable::BetaCells.index()];
    let a = y[Variable::AlphaCells.index()];
    let l = y[Variable::Glp1.index()];
    let i = y[Variable::Insulin.index()];
    let u2 = y[Variable::Glut2.index()];
    let u4 = y[Variable::Glut4.index()];
    let c = y[Variable::Glucagon.index()];
    let g = y[Variable::Glucose.index()];
    let gs = y[Variable::StoredGlucose.index()];
    let t = y[Variable::TnfAlpha.index()];
    let o = y[Variable::OleicAcid.index()];
    let pa = y[Variable::PalmiticAcid.index()];

    // GLP-1: meal secretion boosted by the drug, degraded by islet cells
    let d_l = p.gam_L * f.meal * f.drug_enhancer - (p.mu_LB * b + p.mu_LA * a) * l;

    // α-cells: insulin deficit activates, GLP-1 inhibits
    let deficit = saturating(p.insulin_deficit_threshold - i, p.K_I);
    let d_a = p.lam_A * deficit / (1.0 + l / p.K_hat_L) - p.mu_A * a;

    // β-cells: GLP-1 above threshold activates, glucose and palmitic acid deactivate
    let incretin = saturating(l - p.glp1_threshold, p.K_L);
    let d_b = p.lam_B * incretin - p.mu_B * b * (1.0 + p.xi_1 * g + p.xi_2 * pa);

    let d_i = p.lam_IB * b - p.mu_I * i - p.mu_IG * g * i;

    let d_u2 = p.lam_U2C * c - p.mu_U2 * u2;
    // TNF-α blocks insulin-driven GLUT-4 production
    let d_u4 = p.lam_U4I * i / (1.0 + p.eta_T * t) - p.mu_U4 * u4;

    // Glucagon: suppressed by GLP-1 at high glucose, enhanced at low glucose
    let suppression = if g > p.xi_hi { 1.0 + p.gam_1 * l } else { 1.0 };
    let enhancement = if g < p.xi_lo { 1.0 + p.gam_2 * l } else { 1.0 };
    let d_c = p.lam_CA * a * enhancement / suppression - p.mu_C * c;

    // Glucose exchange between blood and storage
    let release = p.lam_GsU2 * gs * saturating(u2, p.K_U2);
    let uptake = p.lam_GU4 * g * saturating(u4, p.K_U4);
    let eliminated = p.gam_Gs * f.elimination * g;
    let utilized = p.mu_G * g;
    let d_g = p.gam_G * f.meal * f.drug_inhibitor + p.lam_G0 + release - uptake - eliminated - utilized;
    let d_gs = uptake + eliminated - release;

    let d_t = p.lam_T + p.lam_TP * pa / (1.0 + o / p.K_hat_O) - p.mu_T * t;
    let d_o = p.gam_O * f.meal - p.mu_O * o;
    let d_p = p.gam_P * f.palmitic - p.mu_P * pa;

    let mut dydt = [0.0; STATE_DIM];
    dydt[Variable::BetaCells.index()] = d_b;
    dydt[Variable::AlphaCells.index()] = d_a;
    dydt[Variable::Glp1.index()] = d_l;
    dydt[Variable::Insulin.index()] = d_i;
    dydt[Variable::Glut2.index()] = d_u2;
    dydt[Variable::Glut4.index()] = d_u4;
    dydt[Variable::Glucagon.index()] = d_c;
    dydt[Variable::Glucose.index()] = d_g;
    dydt[Variable::StoredGlucose.index()] = d_gs;
    dydt[Variable::TnfAlpha.index()] = d_t;
    dydt[Variable::OleicAcid.index()] = d_o;
    dydt[Variable::PalmiticAcid.index()] = d_p;

    for d in dydt.iter_mut() {
        *d /= HOURS_PER_DAY;
    }
    dydt
}

/// Instantaneous derivative at time `t` (hours)
pub fn rhs(t: f64, state: &StateVector, params: &ModelParameters, forcing: &MealForcing) -> StateVector {
    StateVector(derivatives(&state.0, params, &forcing.at(t)))
}

/// Calibrated model bound to one scenario's forcing
pub struct T2dSystem<'a> {
    pub params: &'a ModelParameters,
    pub forcing: &'a MealForcing,
}

impl<'a> T2dSystem<'a> {
    pub fn new(params: &'a ModelParameters, forcing: &'a MealForcing) -> Self {
        Self { params, forcing }
    }
}

impl OdeSystem for T2dSystem<'_> {
    fn dimension(&self) -> usize {
        STATE_DIM
    }

    fn derivatives(&self, t: f64, y: &[f64], dydt: &mut [f64]) {
        let mut state = [0.0; STATE_DIM];
        state.copy_from_slice(y);
        dydt.copy_from_slice(&derivatives(&state, self.params, &self.forcing.at(t)));
    }

    fn breakpoints(&self, t0: f64, t1: f64) -> Vec<f64> {
        self.forcing.breakpoints(t0, t1)
    }
}
