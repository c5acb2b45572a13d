//! T2D Simulator - Entry point
//!
//! Command-line front end for the obesity-induced type-2 diabetes model.
//!
//! CLI Usage:
//!   cargo run -- simulate --age 45 --bmi 30 --stage prediabetic
//!   cargo run -- simulate --profile patient.json --hours 72 --csv run.csv
//!   cargo run -- compare meals --age 60 --bmi 33
//!   cargo run -- compare drug --stage diabetic --drug mounjaro
//!   cargo run -- params > bank.json

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};

use t2d_simulator::{
    comparison::{
        drug_sweep_variants, meal_pattern_variants, obesity_progression_variants, ScenarioVariant,
        DEFAULT_DRUG_DOSES,
    },
    config::{EngineSettings, ModelParameters},
    export::{export_run_json, export_run_json_to, export_trajectory_csv, CsvExporter},
    metrics::ClinicalNotes,
    patient::{
        ActivityLevel, DiabetesStage, DrugClass, PatientProfile, ScenarioParams, Sex, SmokingStatus,
        INTERACTIVE_DURATION_HOURS,
    },
    state::Variable,
    Simulator,
};

/// Obesity-induced type-2 diabetes simulator
#[derive(Parser)]
#[command(name = "t2d-simulator")]
#[command(version)]
#[command(about = "Simulate glucose control for a calibrated virtual patient", long_about = None)]
struct Cli {
    /// Parameter bank JSON (defaults when absent)
    #[arg(long, global = true, default_value = "config/parameters.json")]
    params: PathBuf,

    /// Engine settings JSON (defaults when absent)
    #[arg(long, global = true, default_value = "config/settings.json")]
    settings: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one scenario and print its clinical summary
    Simulate {
        #[command(flatten)]
        patient: PatientArgs,

        #[command(flatten)]
        scenario: ScenarioArgs,

        /// Write the trajectory as CSV (use "auto" for exports/)
        #[arg(long)]
        csv: Option<PathBuf>,

        /// Write the summary as JSON (use "auto" for exports/)
        #[arg(long)]
        json: Option<PathBuf>,
    },

    /// Run a preset comparison
    Compare {
        #[command(subcommand)]
        preset: Preset,
    },

    /// Print the parameter bank as JSON
    Params,
}

#[derive(Subcommand)]
enum Preset {
    /// Four distributions of the same daily intake
    Meals {
        #[command(flatten)]
        patient: PatientArgs,

        #[command(flatten)]
        scenario: ScenarioArgs,
    },
    /// Increasing food and saturated-fat intake over three days
    Obesity {
        #[command(flatten)]
        patient: PatientArgs,

        #[command(flatten)]
        scenario: ScenarioArgs,
    },
    /// One week at each drug dose
    Drug {
        #[command(flatten)]
        patient: PatientArgs,

        #[command(flatten)]
        scenario: ScenarioArgs,

        /// Doses to sweep
        #[arg(long, value_delimiter = ',')]
        doses: Option<Vec<f64>>,
    },
}

#[derive(Args)]
struct PatientArgs {
    /// Patient profile JSON; the flags below override its fields
    #[arg(long)]
    profile: Option<PathBuf>,

    /// Age (years)
    #[arg(long)]
    age: Option<f64>,

    /// Weight (kg)
    #[arg(long, conflicts_with = "bmi")]
    weight: Option<f64>,

    /// Body-mass index; weight is derived from height
    #[arg(long)]
    bmi: Option<f64>,

    /// Height (cm)
    #[arg(long)]
    height: Option<f64>,

    /// male or female
    #[arg(long)]
    sex: Option<Sex>,

    /// normal, prediabetic or diabetic
    #[arg(long)]
    stage: Option<DiabetesStage>,

    /// sedentary, light, moderate or active
    #[arg(long)]
    activity: Option<ActivityLevel>,

    /// non_smoker, former_smoker or smoker
    #[arg(long)]
    smoking: Option<SmokingStatus>,

    /// Diabetes in a first-degree relative
    #[arg(long)]
    family_history: bool,

    /// Current medication (repeatable)
    #[arg(long = "medication")]
    medications: Vec<String>,

    /// Reported A1C (%)
    #[arg(long)]
    a1c: Option<f64>,
}

impl PatientArgs {
    fn profile(&self) -> Result<PatientProfile> {
        let mut profile = match &self.profile {
            Some(path) => read_json(path)?,
            None => PatientProfile::new(45.0, 70.0, 170.0, Sex::Male, DiabetesStage::Normal),
        };

        if let Some(age) = self.age {
            profile.age_years = age;
        }
        if let Some(height) = self.height {
            profile.height_cm = height;
        }
        if let Some(weight) = self.weight {
            profile.weight_kg = weight;
        }
        if let Some(bmi) = self.bmi {
            let height_m = profile.height_cm / 100.0;
            profile.weight_kg = bmi * height_m * height_m;
        }
        if let Some(sex) = self.sex {
            profile.sex = sex;
        }
        if let Some(stage) = self.stage {
            profile.stage = stage;
        }
        if let Some(activity) = self.activity {
            profile.activity = activity;
        }
        if let Some(smoking) = self.smoking {
            profile.smoking = smoking;
        }
        if self.family_history {
            profile.family_history = true;
        }
        profile.medications.extend(self.medications.iter().cloned());
        if self.a1c.is_some() {
            profile.a1c_percent = self.a1c;
        }
        Ok(profile)
    }
}

#[derive(Args)]
struct ScenarioArgs {
    /// Scenario JSON; the flags below override its fields
    #[arg(long)]
    scenario: Option<PathBuf>,

    /// Horizon (hours)
    #[arg(long)]
    hours: Option<f64>,

    /// Breakfast, lunch, dinner and snack hours, comma separated
    #[arg(long, value_delimiter = ',')]
    meal_times: Option<Vec<f64>>,

    /// Meal intensities in the same order
    #[arg(long, value_delimiter = ',')]
    meal_factors: Option<Vec<f64>>,

    /// Food-intake multiplier
    #[arg(long)]
    food: Option<f64>,

    /// Saturated-fat multiplier
    #[arg(long)]
    palmitic: Option<f64>,

    /// Drug dose (0-5)
    #[arg(long)]
    dose: Option<f64>,

    /// ozempic or mounjaro
    #[arg(long)]
    drug: Option<DrugClass>,
}

impl ScenarioArgs {
    fn scenario(&self) -> Result<ScenarioParams> {
        let mut scenario: ScenarioParams = match &self.scenario {
            Some(path) => read_json(path)?,
            None => ScenarioParams::default(),
        };

        if let Some(hours) = self.hours {
            scenario = scenario.with_duration(hours);
        }
        if let Some(times) = &self.meal_times {
            scenario = scenario.with_meal_times(four(times, "meal-times")?);
        }
        if let Some(factors) = &self.meal_factors {
            scenario = scenario.with_meal_factors(four(factors, "meal-factors")?);
        }
        if let Some(food) = self.food {
            scenario.food_multiplier = food;
        }
        if let Some(palmitic) = self.palmitic {
            scenario.palmitic_multiplier = palmitic;
        }
        if let Some(dose) = self.dose {
            scenario.drug_dose = dose;
        }
        if self.drug.is_some() {
            scenario.drug_class = self.drug;
        }
        Ok(scenario)
    }
}

fn four(values: &[f64], name: &str) -> Result<[f64; 4]> {
    <[f64; 4]>::try_from(values).map_err(|_| anyhow::anyhow!("--{} expects 4 values, got {}", name, values.len()))
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let contents = std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&contents).with_context(|| format!("parsing {}", path.display()))
}

fn is_auto(path: &Path) -> bool {
    path.as_os_str() == "auto"
}

/// Run one scenario and print its report
fn run_simulation(
    sim: &Simulator,
    profile: &PatientProfile,
    scenario: &ScenarioParams,
    csv: Option<PathBuf>,
    json: Option<PathBuf>,
) -> Result<()> {
    println!("=== T2D Simulator - Single Run ===\n");
    println!(
        "Patient: {:.0} y {}, BMI {:.1} ({:?}), stage {}",
        profile.age_years,
        profile.sex,
        profile.bmi(),
        profile.bmi_category(),
        profile.stage
    );
    let health = profile.health_metrics();
    println!(
        "Ideal weight {:.1} - {:.1} kg, {:.0} kcal/day, {} min exercise/week",
        health.ideal_weight_range_kg.0,
        health.ideal_weight_range_kg.1,
        health.daily_calories_kcal,
        health.recommended_exercise_minutes
    );
    println!(
        "Scenario: {:.0} h, meals {:?} x {:?}, dose {}\n",
        scenario.duration_hours,
        scenario.meals.map(|m| m.hour),
        scenario.meal_factors(),
        scenario.drug_dose
    );

    let run = sim.simulate(profile, scenario)?;
    let s = &run.summary;

    println!("--- Glucose ---");
    println!("Mean:  {:.1} mg/dL (range {:.1} - {:.1})", s.mean_glucose_mg_dL, s.min_glucose_mg_dL, s.max_glucose_mg_dL);
    println!("SD:    {:.1} mg/dL (CV {:.1}%)", s.glucose_std_mg_dL, s.coefficient_of_variation);
    println!(
        "TIR:   {:.1}%  (tight {:.1}%, above {:.1}%, below {:.1}%)",
        s.time_in_range_percent, s.time_in_tight_range_percent, s.time_above_range_percent, s.time_below_range_percent
    );
    println!("A1C:   {:.1}%  GMI {:.2}%  -> {}", s.a1c_estimate, s.gmi_percent, s.diagnosis);

    if let Some(last) = run.trajectory.last() {
        println!("\n--- Final state ({:.1} h) ---", last.time_hours);
        for var in Variable::ALL {
            println!(
                "{:<4} {:>12.4} {}",
                var.symbol(),
                last.state[var] * var.clinical_scale(),
                var.clinical_unit()
            );
        }
    }
    println!(
        "\nIntegrator: {} steps, {} rejected, {} RHS evaluations\n",
        run.stats.accepted_steps, run.stats.rejected_steps, run.stats.rhs_evaluations
    );

    ClinicalNotes::for_run(profile, s).print_summary();

    if let Some(path) = csv {
        let written = if is_auto(&path) {
            let mut exporter = CsvExporter::new()?;
            for sample in run.trajectory.samples() {
                exporter.record(sample)?;
            }
            exporter.finish()?
        } else {
            export_trajectory_csv(&run.trajectory, &path)?
        };
        println!("Trajectory written to {}", written.display());
    }
    if let Some(path) = json {
        if is_auto(&path) {
            let written = export_run_json(profile, scenario, s)?;
            println!("Summary written to {}", written.display());
        } else {
            export_run_json_to(profile, scenario, s, &path)?;
            println!("Summary written to {}", path.display());
        }
    }
    Ok(())
}

fn run_comparison(sim: &Simulator, profile: &PatientProfile, title: &str, variants: Vec<ScenarioVariant>) -> Result<()> {
    println!("=== T2D Simulator - {} ===\n", title);
    let comparison = sim.compare(profile, &variants)?;
    comparison.print_table();
    Ok(())
}

fn warn_long_horizon(scenario: &ScenarioParams) {
    if scenario.duration_hours > INTERACTIVE_DURATION_HOURS {
        log::warn!(
            "Horizon of {:.0} h exceeds {:.0} h; expect a longer run",
            scenario.duration_hours,
            INTERACTIVE_DURATION_HOURS
        );
    }
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let bank = ModelParameters::load_or_default(&cli.params);
    let settings = EngineSettings::load_or_default(&cli.settings);

    match cli.command {
        Commands::Params => {
            println!("{}", serde_json::to_string_pretty(&bank)?);
        }
        Commands::Simulate {
            patient,
            scenario,
            csv,
            json,
        } => {
            let sim = Simulator::new(bank, settings);
            let profile = patient.profile()?;
            let scenario = scenario.scenario()?;
            warn_long_horizon(&scenario);
            run_simulation(&sim, &profile, &scenario, csv, json)?;
        }
        Commands::Compare { preset } => {
            let sim = Simulator::new(bank, settings);
            match preset {
                Preset::Meals { patient, scenario } => {
                    let variants = meal_pattern_variants(&scenario.scenario()?);
                    run_comparison(&sim, &patient.profile()?, "Meal Patterns", variants)?;
                }
                Preset::Obesity { patient, scenario } => {
                    let variants = obesity_progression_variants(&scenario.scenario()?);
                    run_comparison(&sim, &patient.profile()?, "Obesity Progression", variants)?;
                }
                Preset::Drug {
                    patient,
                    scenario,
                    doses,
                } => {
                    let doses = doses.unwrap_or_else(|| DEFAULT_DRUG_DOSES.to_vec());
                    let variants = drug_sweep_variants(&scenario.scenario()?, &doses);
                    run_comparison(&sim, &patient.profile()?, "Drug Dose Sweep", variants)?;
                }
            }
        }
    }

    Ok(())
}
