//! Engine settings: output grid, solver tolerances and run budget.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::physiology::IntegratorConfig;

/// Runtime settings shared by every run of a [`crate::Simulator`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineSettings {
    /// Output samples per simulated hour
    pub samples_per_hour: usize,
    /// Relative tolerance of the adaptive integrator
    pub rtol: f64,
    /// Absolute tolerance, scaled per component by the initial magnitude
    pub atol: f64,
    /// Step budget before a run is declared divergent
    pub max_steps: u64,
    /// Wall-clock budget per run (seconds)
    pub timeout_secs: f64,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            samples_per_hour: 12, // 5 minute grid
            rtol: 1e-8,
            atol: 1e-10,
            max_steps: 2_000_000,
            timeout_secs: 30.0,
        }
    }
}

impl EngineSettings {
    /// Load from JSON file or return defaults
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Self {
        match std::fs::read_to_string(path.as_ref()) {
            Ok(contents) => match serde_json::from_str(&contents) {
                Ok(settings) => {
                    log::info!("Loaded engine settings from {:?}", path.as_ref());
                    settings
                }
                Err(e) => {
                    log::warn!("Failed to parse engine settings: {}, using defaults", e);
                    Self::default()
                }
            },
            Err(_) => {
                log::info!("Engine settings file not found, using defaults");
                Self::default()
            }
        }
    }

    /// Integrator configuration derived from these settings
    pub fn integrator_config(&self) -> IntegratorConfig {
        IntegratorConfig {
            rtol: self.rtol,
            atol: self.atol,
            max_steps: self.max_steps,
            initial_step_hours: 1.0 / self.samples_per_hour.max(1) as f64,
            ..IntegratorConfig::default()
        }
    }

    /// Wall-clock budget as a duration; non-positive values disable the limit
    pub fn timeout(&self) -> Option<Duration> {
        if self.timeout_secs.is_finite() && self.timeout_secs > 0.0 {
            Some(Duration::from_secs_f64(self.timeout_secs))
        } else {
            None
        }
    }
}
