//! Scenario comparison: run labelled variants concurrently and rank them.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SimulationError};
use crate::patient::{DrugClass, PatientProfile, ScenarioParams};
use crate::simulation::{SimulationRun, Simulator};

/// Drug doses of the default sweep
pub const DEFAULT_DRUG_DOSES: [f64; 4] = [0.0, 0.5, 1.0, 1.5];
/// Horizon of the obesity progression preset (hours)
pub const OBESITY_PROGRESSION_HOURS: f64 = 72.0;
/// Horizon of the drug sweep preset (hours)
pub const DRUG_SWEEP_HOURS: f64 = 168.0;

/// A named scenario to compare
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioVariant {
    pub label: String,
    pub scenario: ScenarioParams,
}

impl ScenarioVariant {
    pub fn new(label: impl Into<String>, scenario: ScenarioParams) -> Self {
        Self {
            label: label.into(),
            scenario,
        }
    }
}

/// A successful variant with its change against the baseline
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VariantResult {
    pub label: String,
    pub run: SimulationRun,
    /// Unrounded A1C minus the baseline's (points)
    pub a1c_change: f64,
    /// Mean glucose minus the baseline's (mg/dL)
    pub mean_glucose_change: f64,
}

/// A variant that did not complete
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariantFailure {
    pub label: String,
    pub error: String,
    pub timed_out: bool,
}

/// Outcome of a comparison, in variant order
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comparison {
    pub results: Vec<VariantResult>,
    pub failures: Vec<VariantFailure>,
    /// Variant the changes are measured against
    pub baseline_label: String,
    /// Success with the lowest unrounded A1C; the earliest wins ties
    pub best_label: String,
}

impl Comparison {
    pub fn result(&self, label: &str) -> Option<&VariantResult> {
        self.results.iter().find(|r| r.label == label)
    }

    pub fn best(&self) -> Option<&VariantResult> {
        self.result(&self.best_label)
    }

    /// Print a table of the successful variants and the failures
    pub fn print_table(&self) {
        println!(
            "{:<18} {:>10} {:>8} {:>8} {:>10} {:>8}",
            "Variant", "Mean", "A1C", "TIR", "ΔMean", "ΔA1C"
        );
        for r in &self.results {
            let s = &r.run.summary;
            let marker = if r.label == self.best_label { " *" } else { "" };
            println!(
                "{:<18} {:>10.1} {:>8.1} {:>7.1}% {:>+10.1} {:>+8.2}{}",
                r.label,
                s.mean_glucose_mg_dL,
                s.a1c_estimate,
                s.time_in_range_percent,
                r.mean_glucose_change,
                r.a1c_change,
                marker
            );
        }
        for f in &self.failures {
            println!("{:<18} failed: {}", f.label, f.error);
        }
        println!("Baseline: {}  Best: {}", self.baseline_label, self.best_label);
    }
}

impl Simulator {
    /// Run every variant for `profile` in parallel.
    ///
    /// A failed variant is recorded and the others still run; only when all
    /// of them fail does the comparison itself fail.
    pub fn compare(&self, profile: &PatientProfile, variants: &[ScenarioVariant]) -> Result<Comparison> {
        log::info!("Comparing {} scenario variants", variants.len());

        let outcomes: Vec<(String, Result<SimulationRun>)> = variants
            .par_iter()
            .map(|v| (v.label.clone(), self.simulate(profile, &v.scenario)))
            .collect();

        let baseline_label = variants.first().map(|v| v.label.clone());
        let mut successes = Vec::new();
        let mut failures = Vec::new();
        for (label, outcome) in outcomes {
            match outcome {
                Ok(run) => successes.push((label, run)),
                Err(e) => {
                    log::warn!("Variant '{}' failed: {}", label, e);
                    failures.push(VariantFailure {
                        label,
                        timed_out: matches!(e, SimulationError::Timeout { .. }),
                        error: e.to_string(),
                    });
                }
            }
        }

        if successes.is_empty() {
            return Err(SimulationError::AllVariantsFailed(variants.len()));
        }

        let baseline_idx = baseline_label
            .and_then(|label| successes.iter().position(|(l, _)| *l == label))
            .unwrap_or(0);
        let baseline_a1c = successes[baseline_idx].1.summary.a1c_percent;
        let baseline_mean = successes[baseline_idx].1.summary.mean_glucose_mg_dL;
        let baseline_label = successes[baseline_idx].0.clone();

        let mut best_idx = 0;
        for (i, (_, run)) in successes.iter().enumerate() {
            if run.summary.a1c_percent < successes[best_idx].1.summary.a1c_percent {
                best_idx = i;
            }
        }
        let best_label = successes[best_idx].0.clone();

        let results = successes
            .into_iter()
            .map(|(label, run)| VariantResult {
                a1c_change: run.summary.a1c_percent - baseline_a1c,
                mean_glucose_change: run.summary.mean_glucose_mg_dL - baseline_mean,
                label,
                run,
            })
            .collect();

        Ok(Comparison {
            results,
            failures,
            baseline_label,
            best_label,
        })
    }
}

/// Compare variants with the default bank and settings
pub fn compare(profile: &PatientProfile, variants: &[ScenarioVariant]) -> Result<Comparison> {
    Simulator::default().compare(profile, variants)
}

/// Four ways of distributing the same daily intake
pub fn meal_pattern_variants(base: &ScenarioParams) -> Vec<ScenarioVariant> {
    [
        ("Balanced", [1.0, 1.0, 1.0, 0.0]),
        ("Light-Heavy", [0.5, 1.0, 2.0, 0.0]),
        ("Heavy-Light", [2.0, 1.0, 0.5, 0.0]),
        ("Small-Frequent", [0.8, 0.8, 0.8, 0.6]),
    ]
    .into_iter()
    .map(|(label, factors)| ScenarioVariant::new(label, base.clone().with_meal_factors(factors)))
    .collect()
}

/// Increasing food and saturated-fat intake over three days
pub fn obesity_progression_variants(base: &ScenarioParams) -> Vec<ScenarioVariant> {
    [
        ("Normal", 1.0, 1.0),
        ("Overweight", 1.5, 1.5),
        ("Obese", 2.0, 2.5),
        ("Severely Obese", 3.0, 3.5),
    ]
    .into_iter()
    .map(|(label, food, palmitic)| {
        ScenarioVariant::new(
            label,
            base.clone()
                .with_duration(OBESITY_PROGRESSION_HOURS)
                .with_diet(food, palmitic),
        )
    })
    .collect()
}

/// One week at each dose; the class of `base` is kept, defaulting to Ozempic
pub fn drug_sweep_variants(base: &ScenarioParams, doses: &[f64]) -> Vec<ScenarioVariant> {
    let class = base.drug_class.or(Some(DrugClass::Ozempic));
    doses
        .iter()
        .map(|&dose| {
            ScenarioVariant::new(
                format!("Dose {}", dose),
                base.clone().with_duration(DRUG_SWEEP_HOURS).with_drug(dose, class),
            )
        })
        .collect()
}
