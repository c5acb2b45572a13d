//! Fixed-resolution trajectory produced by one simulation run.

use serde::{Deserialize, Serialize};

use super::vector::{StateVector, Variable};

/// One output sample
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrajectorySample {
    /// Simulation time (hours from start)
    pub time_hours: f64,
    pub state: StateVector,
}

/// Ordered samples on a fixed output grid.
///
/// Immutable once built; each run owns its own trajectory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trajectory {
    samples_per_hour: usize,
    samples: Vec<TrajectorySample>,
}

impl Trajectory {
    pub fn from_samples(samples_per_hour: usize, samples: Vec<TrajectorySample>) -> Self {
        Self { samples_per_hour, samples }
    }

    pub fn samples_per_hour(&self) -> usize {
        self.samples_per_hour
    }

    pub fn samples(&self) -> &[TrajectorySample] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn first(&self) -> Option<&TrajectorySample> {
        self.samples.first()
    }

    pub fn last(&self) -> Option<&TrajectorySample> {
        self.samples.last()
    }

    /// Time covered from first to last sample (hours)
    pub fn duration_hours(&self) -> f64 {
        match (self.samples.first(), self.samples.last()) {
            (Some(a), Some(b)) => b.time_hours - a.time_hours,
            _ => 0.0,
        }
    }

    pub fn times(&self) -> Vec<f64> {
        self.samples.iter().map(|s| s.time_hours).collect()
    }

    /// Native-unit series of one variable
    pub fn series(&self, var: Variable) -> Vec<f64> {
        self.samples.iter().map(|s| s.state[var]).collect()
    }

    /// Smallest component over every sample
    pub fn min_component(&self) -> f64 {
        self.samples
            .iter()
            .map(|s| s.state.min_component())
            .fold(f64::INFINITY, f64::min)
    }
}
