//! Configuration module for the parameter bank and engine settings.
//!
//! Both load from JSON and fall back to literal defaults.

mod parameters;
mod settings;

pub use parameters::{ModelParameters, HOURS_PER_DAY};
pub use settings::EngineSettings;
