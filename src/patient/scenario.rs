//! Scenario parameters: meals, dietary multipliers and drug regimen.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::profile::check_range;
use crate::error::{Result, SimulationError};

/// Longest horizon accepted by [`ScenarioParams::validate`] (one week)
pub const MAX_DURATION_HOURS: f64 = 168.0;

/// Horizon above which interactive callers should expect multi-second runs
pub const INTERACTIVE_DURATION_HOURS: f64 = 72.0;

/// Highest accepted drug dose (normalized units)
pub const MAX_DRUG_DOSE: f64 = 5.0;

/// Display names of the four daily meal slots
pub const MEAL_NAMES: [&str; 4] = ["breakfast", "lunch", "dinner", "snack"];

/// GLP-1 receptor agonist class of the weight-reducing drug
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DrugClass {
    /// Semaglutide, GLP-1 agonist
    Ozempic,
    /// Tirzepatide, dual GIP/GLP-1 agonist
    Mounjaro,
}

impl DrugClass {
    /// Gain on the GLP-1 production enhancer
    pub fn enhancer_gain(&self) -> f64 {
        match self {
            DrugClass::Ozempic => 1.0,
            DrugClass::Mounjaro => 1.25,
        }
    }

    /// Gain on the glucose-influx inhibitor
    pub fn inhibitor_gain(&self) -> f64 {
        match self {
            DrugClass::Ozempic => 1.0,
            DrugClass::Mounjaro => 1.2,
        }
    }
}

impl fmt::Display for DrugClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DrugClass::Ozempic => f.write_str("ozempic"),
            DrugClass::Mounjaro => f.write_str("mounjaro"),
        }
    }
}

impl FromStr for DrugClass {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "ozempic" | "semaglutide" => Ok(DrugClass::Ozempic),
            "mounjaro" | "tirzepatide" => Ok(DrugClass::Mounjaro),
            _ => Err(format!("unknown drug class '{}', expected ozempic or mounjaro", s)),
        }
    }
}

/// One daily meal: start hour-of-day and intensity
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Meal {
    /// Start time (hour of day, 0-24)
    pub hour: f64,
    /// Intensity factor (1.0 = reference meal)
    pub factor: f64,
}

impl Meal {
    pub const fn new(hour: f64, factor: f64) -> Self {
        Self { hour, factor }
    }
}

/// Immutable per-run scenario
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScenarioParams {
    /// Simulation horizon (hours, 1-168)
    pub duration_hours: f64,
    /// Breakfast, lunch, dinner and snack
    pub meals: [Meal; 4],
    /// Global food-intake multiplier
    pub food_multiplier: f64,
    /// Saturated-fat (palmitic acid) intake multiplier
    pub palmitic_multiplier: f64,
    /// Drug dose (normalized units, 0-5)
    pub drug_dose: f64,
    pub drug_class: Option<DrugClass>,
}

impl Default for ScenarioParams {
    fn default() -> Self {
        Self {
            duration_hours: 24.0,
            meals: [
                Meal::new(0.0, 1.0),
                Meal::new(6.0, 1.0),
                Meal::new(12.0, 2.0),
                Meal::new(18.0, 0.0),
            ],
            food_multiplier: 1.0,
            palmitic_multiplier: 1.0,
            drug_dose: 0.0,
            drug_class: None,
        }
    }
}

impl ScenarioParams {
    pub fn with_duration(mut self, hours: f64) -> Self {
        self.duration_hours = hours;
        self
    }

    pub fn with_meal_times(mut self, hours: [f64; 4]) -> Self {
        for (meal, hour) in self.meals.iter_mut().zip(hours) {
            meal.hour = hour;
        }
        self
    }

    pub fn with_meal_factors(mut self, factors: [f64; 4]) -> Self {
        for (meal, factor) in self.meals.iter_mut().zip(factors) {
            meal.factor = factor;
        }
        self
    }

    pub fn with_diet(mut self, food_multiplier: f64, palmitic_multiplier: f64) -> Self {
        self.food_multiplier = food_multiplier;
        self.palmitic_multiplier = palmitic_multiplier;
        self
    }

    pub fn with_drug(mut self, dose: f64, class: Option<DrugClass>) -> Self {
        self.drug_dose = dose;
        self.drug_class = class;
        self
    }

    /// Meal factors in slot order
    pub fn meal_factors(&self) -> [f64; 4] {
        self.meals.map(|m| m.factor)
    }

    /// Check ranges; the first violation is reported
    pub fn validate(&self) -> Result<()> {
        check_range("duration_hours", self.duration_hours, 1.0, MAX_DURATION_HOURS)?;
        for (meal, name) in self.meals.iter().zip(MEAL_NAMES) {
            if !(meal.hour.is_finite() && (0.0..24.0).contains(&meal.hour)) {
                return Err(SimulationError::InvalidProfile(format!(
                    "{} hour = {} outside [0, 24)",
                    name, meal.hour
                )));
            }
            check_non_negative(name, meal.factor)?;
        }
        check_non_negative("food_multiplier", self.food_multiplier)?;
        check_non_negative("palmitic_multiplier", self.palmitic_multiplier)?;
        check_range("drug_dose", self.drug_dose, 0.0, MAX_DRUG_DOSE)?;
        Ok(())
    }
}

fn check_non_negative(name: &str, value: f64) -> Result<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(SimulationError::InvalidProfile(format!("{} = {} must be finite and >= 0", name, value)))
    }
}
