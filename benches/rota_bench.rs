//! Criterion benchmarks for model construction and solving.
//!
//! Uses seeded random availability so runs are comparable.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use u_rota::cp::{BranchAndBoundSolver, CpSolver};
use u_rota::rota::{
    AvailabilityMatrix, FairnessStrategy, Person, Preference, RotaConfig, RotaCpBuilder,
    RotaProblem,
};

fn random_problem(people: usize, config: &RotaConfig, seed: u64) -> RotaProblem {
    let mut rng = StdRng::seed_from_u64(seed);
    let slots = config.slot_count();
    let rows = (0..people)
        .map(|_| {
            (0..slots)
                .map(|_| match rng.random_range(0..10) {
                    0..=5 => Preference::Yes,
                    6 => Preference::Best,
                    7 => Preference::Maybe,
                    _ => Preference::No,
                })
                .collect()
        })
        .collect();
    let matrix = AvailabilityMatrix::from_rows(config.days.len(), config.periods.len(), rows);
    let people = (0..people)
        .map(|i| Person::new(format!("P{i}"), "", "", config.days.len() as u32))
        .collect();
    RotaProblem::new(people, matrix).expect("non-empty roster")
}

fn bench_build_week(c: &mut Criterion) {
    let config = RotaConfig::default();
    let mut group = c.benchmark_group("build_week");
    for people in [20, 40] {
        let problem = random_problem(people, &config, 7);
        group.bench_with_input(BenchmarkId::new("variance", people), &problem, |b, p| {
            b.iter(|| RotaCpBuilder::new(black_box(p), &config).build())
        });
    }
    group.finish();
}

fn bench_solve_small(c: &mut Criterion) {
    let mut group = c.benchmark_group("solve_small");
    group.sample_size(10);
    for strategy in [FairnessStrategy::Bottleneck, FairnessStrategy::Variance] {
        let config = RotaConfig::default()
            .with_days(&["Mon", "Tue", "Wed"])
            .with_staffing(2, 1)
            .with_fairness(strategy)
            .with_max_time_seconds(2);
        let problem = random_problem(8, &config, 11);
        let built = RotaCpBuilder::new(&problem, &config)
            .build()
            .expect("valid model");
        let solver_config = config.solver_config();
        group.bench_function(BenchmarkId::new("bnb", strategy), |b| {
            b.iter(|| BranchAndBoundSolver::new().solve(black_box(&built.model), &solver_config))
        });
    }
    group.finish();
}

criterion_group!(benches, bench_build_week, bench_solve_small);
criterion_main!(benches);
