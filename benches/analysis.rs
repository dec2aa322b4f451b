use std::hint::black_box;

use criterion::{criterion_group, criterion_main, Criterion};
use ecostability::prelude::*;
use rand::{rngs::StdRng, SeedableRng};

/// A producer feeding two consumers, one of which is eaten by a top predator.
fn food_web() -> FoodWeb {
    FoodWeb::builder()
        .attack_rates(vec![
            vec![0.0, 0.0, 0.0, 0.0],
            vec![1.0, 0.0, 0.0, 0.0],
            vec![0.8, 0.0, 0.0, 0.0],
            vec![0.0, 0.6, 0.0, 0.0],
        ])
        .functional_response(FunctionalResponse::Classic {
            handling_time: 0.3,
            hill_exponent: 1.2,
        })
        .build()
        .expect("Failed to build food web")
}

fn equilibrium(web: &FoodWeb, simulator: &OdeSimulator) -> Vec<f64> {
    simulator
        .simulate(web, &[1.0; 4], 1000.0)
        .expect("Failed to simulate food web")
        .final_state()
        .to_vec()
}

fn benchmark_analysis(c: &mut Criterion) {
    let web = food_web();
    let setup = SimulationSetupBuilder::default()
        .dt(0.5)
        .build()
        .expect("Failed to build simulation setup");
    let simulator = OdeSimulator::new(setup).expect("Failed to create simulator");
    let biomass = equilibrium(&web, &simulator);

    c.bench_function("jacobian", |b| {
        b.iter(|| {
            let _ = black_box(jacobian_at(black_box(&web), black_box(&biomass)));
        });
    });

    c.bench_function("stability_report", |b| {
        b.iter(|| {
            let _ = black_box(StabilityReport::compute(
                black_box(&web),
                black_box(&biomass),
            ));
        });
    });

    c.bench_function("robustness", |b| {
        b.iter(|| {
            let _ = black_box(
                robustness()
                    .model(&web)
                    .simulator(&simulator)
                    .rng(&mut StdRng::seed_from_u64(0))
                    .n_rep(10)
                    .t_end(200.0)
                    .call(),
            );
        });
    });
}

criterion_group!(benches, benchmark_analysis);
criterion_main!(benches);
