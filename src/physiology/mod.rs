//! Physiology module for the obesity-induced type-2 diabetes model.
//!
//! Twelve coupled variables link adiposity to glucose control:
//! - Islet cells (β, α) and their hormones (insulin, glucagon, GLP-1)
//! - Glucose transporters (GLUT-2 hepatic, GLUT-4 peripheral)
//! - Blood and stored glucose
//! - Dietary fatty acids (oleic, palmitic) and the inflammatory marker TNF-α
//!
//! A run calibrates the bank to a patient, builds the meal/drug forcing for
//! the scenario and integrates the system onto a fixed output grid.
//!
//! Reference: Siewe N, Friedman A. J Theor Biol. 2024 (doi:10.1016/j.jtbi.2024.111756)

pub mod calibration;
pub mod dynamics;
pub mod forcing;
pub mod integrator;

pub use calibration::{age_factor, calibrate, MedicationClass, PatientCalibrator, TierAdjustment};
pub use dynamics::{rhs, T2dSystem};
pub use forcing::{
    drug_effect, ForcingState, MealForcing, DAY_HOURS, ELIMINATION_WINDOW_HOURS, MEAL_WINDOW_HOURS,
};
pub use integrator::{DormandPrince45, IntegrationStats, IntegratorConfig, OdeSystem, RunBudget};

use crate::config::ModelParameters;
use crate::error::{Result, SimulationError};
use crate::state::{StateVector, Trajectory, TrajectorySample, STATE_DIM};

/// Integrate the model over `t_span` (hours) and sample it `samples_per_hour`
/// times per hour, t = start included.
pub fn integrate(
    params: &ModelParameters,
    forcing: &MealForcing,
    initial: StateVector,
    t_span: (f64, f64),
    samples_per_hour: usize,
    config: IntegratorConfig,
    budget: &RunBudget,
) -> Result<(Trajectory, IntegrationStats)> {
    let system = T2dSystem::new(params, forcing);
    let mut integrator = DormandPrince45::new(STATE_DIM, config);

    let expected = ((t_span.1 - t_span.0).max(0.0) * samples_per_hour as f64).ceil() as usize + 1;
    let mut samples = Vec::with_capacity(expected);
    let mut malformed = false;
    let stats = integrator.integrate(
        &system,
        initial.as_slice(),
        t_span.0,
        t_span.1,
        samples_per_hour,
        budget,
        |t, y| match StateVector::from_slice(y) {
            Some(state) => samples.push(TrajectorySample { time_hours: t, state }),
            None => malformed = true,
        },
    )?;
    if malformed {
        return Err(SimulationError::IntegrationDivergence(
            "integrator produced a state of the wrong dimension".into(),
        ));
    }

    Ok((Trajectory::from_samples(samples_per_hour, samples), stats))
}
