//! Error types for the simulation engine

use thiserror::Error;

/// Errors that can occur while calibrating, integrating or comparing runs
#[derive(Debug, Error)]
pub enum SimulationError {
    #[error("Invalid profile: {0}")]
    InvalidProfile(String),

    #[error("Integration diverged: {0}")]
    IntegrationDivergence(String),

    #[error("Run exceeded its time budget after {elapsed_ms} ms")]
    Timeout { elapsed_ms: u128 },

    #[error("All {0} comparison variants failed")]
    AllVariantsFailed(usize),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

impl SimulationError {
    /// True for errors caused by the caller's input rather than by the computation
    pub fn is_client_error(&self) -> bool {
        matches!(self, SimulationError::InvalidProfile(_) | SimulationError::Json(_))
    }
}

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, SimulationError>;
