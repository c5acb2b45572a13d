//! Time-dependent meal and drug inputs.
//!
//! Meals repeat every 24 hours. A meal is active for [`MEAL_WINDOW_HOURS`]
//! after its start; early hepatic elimination runs from 1 to 3 hours after the
//! start of any meal actually eaten. Windows are half-open intervals, so the
//! result never depends on how close an integrator step lands to a boundary.
//!
//! The drug is constant over a run: a saturating enhancer on GLP-1 production
//! and a saturating inhibitor on meal glucose influx.

use crate::config::ModelParameters;
use crate::patient::{DrugClass, Meal, ScenarioParams};

/// Meal absorption window (hours)
pub const MEAL_WINDOW_HOURS: f64 = 1.0;

/// Early elimination window, hours after meal start
pub const ELIMINATION_WINDOW_HOURS: (f64, f64) = (1.0, 3.0);

/// Period of the meal pattern (hours)
pub const DAY_HOURS: f64 = 24.0;

/// Forcing values at one instant
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ForcingState {
    /// Meal activity: intensity × food multiplier, zero outside meal windows
    pub meal: f64,
    /// Fatty-acid channel for palmitic acid (meal × palmitic multiplier)
    pub palmitic: f64,
    /// Early elimination switch (0 or 1)
    pub elimination: f64,
    /// Multiplier on GLP-1 production (≥ 1)
    pub drug_enhancer: f64,
    /// Multiplier on meal glucose influx (≤ 1)
    pub drug_inhibitor: f64,
}

/// Drug enhancer and inhibitor for a dose.
///
/// Zero dose has no effect. Otherwise Michaelis–Menten saturation in the dose
/// with half-saturation `K_D` for the enhancer and inhibition constant
/// `K_hat_D` for influx, each scaled by the drug-class gain.
pub fn drug_effect(dose: f64, class: Option<DrugClass>, params: &ModelParameters) -> (f64, f64) {
    if dose <= 0.0 {
        return (1.0, 1.0);
    }
    let (enhancer_gain, inhibitor_gain) = class
        .map(|c| (c.enhancer_gain(), c.inhibitor_gain()))
        .unwrap_or((1.0, 1.0));
    let enhancer = 1.0 + enhancer_gain * dose / (params.K_D + dose);
    let inhibitor = 1.0 / (1.0 + inhibitor_gain * dose / params.K_hat_D);
    (enhancer, inhibitor)
}

/// Meal and drug forcing for one scenario
#[derive(Debug, Clone)]
pub struct MealForcing {
    meals: [Meal; 4],
    food_multiplier: f64,
    palmitic_multiplier: f64,
    drug_enhancer: f64,
    drug_inhibitor: f64,
}

impl MealForcing {
    pub fn new(scenario: &ScenarioParams, params: &ModelParameters) -> Self {
        let (drug_enhancer, drug_inhibitor) = drug_effect(scenario.drug_dose, scenario.drug_class, params);
        Self {
            meals: scenario.meals,
            food_multiplier: scenario.food_multiplier,
            palmitic_multiplier: scenario.palmitic_multiplier,
            drug_enhancer,
            drug_inhibitor,
        }
    }

    /// Forcing at absolute time `t` (hours)
    pub fn at(&self, t: f64) -> ForcingState {
        let t_mod = t.rem_euclid(DAY_HOURS);

        // The most recently started meal wins where windows overlap
        let mut active: Option<(f64, f64)> = None;
        let mut elimination = 0.0;
        for meal in &self.meals {
            let elapsed = (t_mod - meal.hour).rem_euclid(DAY_HOURS);
            let intensity = meal.factor * self.food_multiplier;
            if elapsed < MEAL_WINDOW_HOURS && active.map_or(true, |(e, _)| elapsed <= e) {
                active = Some((elapsed, intensity));
            }
            if intensity > 0.0
                && elapsed >= ELIMINATION_WINDOW_HOURS.0
                && elapsed < ELIMINATION_WINDOW_HOURS.1
            {
                elimination = 1.0;
            }
        }
        let meal = active.map_or(0.0, |(_, intensity)| intensity);

        ForcingState {
            meal,
            palmitic: meal * self.palmitic_multiplier,
            elimination,
            drug_enhancer: self.drug_enhancer,
            drug_inhibitor: self.drug_inhibitor,
        }
    }

    /// Window boundaries strictly inside (t0, t1), sorted and de-duplicated
    pub fn breakpoints(&self, t0: f64, t1: f64) -> Vec<f64> {
        if !(t1 > t0) {
            return Vec::new();
        }
        let offsets = [
            0.0,
            MEAL_WINDOW_HOURS,
            ELIMINATION_WINDOW_HOURS.0,
            ELIMINATION_WINDOW_HOURS.1,
        ];
        // Start one day early: windows of late meals spill into the next day
        let first_day = (t0 / DAY_HOURS).floor() as i64 - 1;
        let last_day = (t1 / DAY_HOURS).ceil() as i64;

        let mut points = Vec::new();
        for day in first_day..=last_day {
            let day_start = day as f64 * DAY_HOURS;
            for meal in &self.meals {
                for offset in offsets {
                    let b = day_start + meal.hour + offset;
                    if b > t0 && b < t1 {
                        points.push(b);
                    }
                }
            }
        }
        points.sort_by(f64::total_cmp);
        points.dedup();
        points
    }
}
