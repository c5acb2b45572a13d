//! Simulation benchmarks

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use t2d_simulator::patient::{DiabetesStage, PatientProfile, ScenarioParams, Sex};
use t2d_simulator::physiology::{calibrate, rhs, MealForcing};
use t2d_simulator::simulate;

fn patient() -> PatientProfile {
    PatientProfile::with_bmi(45.0, 30.0, 175.0, Sex::Male, DiabetesStage::Prediabetic)
}

fn bench_calibration(c: &mut Criterion) {
    let profile = patient();

    c.bench_function("calibrate", |b| b.iter(|| calibrate(black_box(&profile))));
}

fn bench_rhs(c: &mut Criterion) {
    let Ok((params, initial)) = calibrate(&patient()) else {
        return;
    };
    let forcing = MealForcing::new(&ScenarioParams::default(), &params);

    c.bench_function("rhs_evaluation", |b| {
        b.iter(|| rhs(black_box(6.5), black_box(&initial), &params, &forcing))
    });
}

fn bench_simulate_day(c: &mut Criterion) {
    let profile = patient();
    let scenario = ScenarioParams::default();

    let mut group = c.benchmark_group("simulate");
    group.sample_size(20);
    group.bench_function("24h", |b| b.iter(|| simulate(black_box(&profile), black_box(&scenario))));
    group.finish();
}

criterion_group!(benches, bench_calibration, bench_rhs, bench_simulate_day);
criterion_main!(benches);
