//! Single-run simulation: calibrate, force, integrate, summarize.

use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::config::{EngineSettings, ModelParameters};
use crate::error::Result;
use crate::metrics::{summarize, SimulationSummary};
use crate::patient::{PatientProfile, ScenarioParams};
use crate::physiology::{integrate, IntegrationStats, MealForcing, PatientCalibrator, RunBudget};
use crate::state::Trajectory;

/// Result of one run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationRun {
    pub trajectory: Trajectory,
    pub summary: SimulationSummary,
    /// Integrator work counters
    pub stats: IntegrationStats,
}

impl SimulationRun {
    pub fn into_parts(self) -> (Trajectory, SimulationSummary) {
        (self.trajectory, self.summary)
    }
}

/// Configured simulation engine
///
/// Holds the parameter bank and engine settings; each call to
/// [`Simulator::simulate`] is independent and shares nothing mutable.
#[derive(Debug, Clone, Default)]
pub struct Simulator {
    calibrator: PatientCalibrator,
    settings: EngineSettings,
    cancel: Option<Arc<AtomicBool>>,
}

impl Simulator {
    pub fn new(bank: ModelParameters, settings: EngineSettings) -> Self {
        Self {
            calibrator: PatientCalibrator::new(bank),
            settings,
            cancel: None,
        }
    }

    /// Abort every run of this engine once `flag` is set
    pub fn with_cancel_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel = Some(flag);
        self
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    pub fn bank(&self) -> &ModelParameters {
        self.calibrator.bank()
    }

    /// Budget for a run starting now
    fn budget(&self) -> RunBudget {
        let budget = RunBudget::with_timeout(self.settings.timeout());
        match &self.cancel {
            Some(flag) => budget.with_cancel_flag(Arc::clone(flag)),
            None => budget,
        }
    }

    /// Run one scenario for one patient under the engine's time budget
    pub fn simulate(&self, profile: &PatientProfile, scenario: &ScenarioParams) -> Result<SimulationRun> {
        self.simulate_with_budget(profile, scenario, &self.budget())
    }

    /// Run one scenario under an explicit budget
    pub fn simulate_with_budget(
        &self,
        profile: &PatientProfile,
        scenario: &ScenarioParams,
        budget: &RunBudget,
    ) -> Result<SimulationRun> {
        profile.validate()?;
        scenario.validate()?;

        log::info!(
            "Simulating {:.0} h: age {:.0}, BMI {:.1}, stage {}, dose {}",
            scenario.duration_hours,
            profile.age_years,
            profile.bmi(),
            profile.stage,
            scenario.drug_dose
        );

        let (params, initial) = self.calibrator.calibrate(profile)?;
        let forcing = MealForcing::new(scenario, &params);

        let (trajectory, stats) = integrate(
            &params,
            &forcing,
            initial,
            (0.0, scenario.duration_hours),
            self.settings.samples_per_hour,
            self.settings.integrator_config(),
            budget,
        )?;

        let summary = summarize(&trajectory, profile);
        log::info!(
            "Run complete in {} ms: {} samples, {} steps ({} rejected), mean glucose {:.1} mg/dL, A1C {:.1}%",
            budget.elapsed().as_millis(),
            trajectory.len(),
            stats.accepted_steps,
            stats.rejected_steps,
            summary.mean_glucose_mg_dL,
            summary.a1c_estimate
        );

        Ok(SimulationRun {
            trajectory,
            summary,
            stats,
        })
    }
}

/// Run one scenario with the default bank and settings
pub fn simulate(profile: &PatientProfile, scenario: &ScenarioParams) -> Result<SimulationRun> {
    Simulator::default().simulate(profile, scenario)
}
