use criterion::{black_box, criterion_group, criterion_main, Criterion};
use verity_core::ParameterSnapshot;
use verity_eval::{DegradationEvaluator, Evaluator, PhaseFieldEvaluator};

fn phase_field_bench(c: &mut Criterion) {
    let snapshot = ParameterSnapshot::builder("bench")
        .scalar("grid_nx", 32.0, "cells")
        .scalar("grid_ny", 64.0, "cells")
        .scalar("steps", 500.0, "")
        .scalar("stiffness", 20.0, "GPa")
        .build()
        .unwrap();
    let evaluator = PhaseFieldEvaluator::default();
    c.bench_function("phase_field_32x64_500", |b| {
        b.iter(|| black_box(evaluator.evaluate(&snapshot).unwrap()));
    });
}

fn degradation_bench(c: &mut Criterion) {
    let snapshot = ParameterSnapshot::builder("bench")
        .scalar("cycles", 2000.0, "cycles")
        .scalar("kt", 7.0, "")
        .scalar("k_constraint", 0.0, "GPa")
        .scalar("seed", 42.0, "")
        .build()
        .unwrap();
    let evaluator = DegradationEvaluator::default();
    c.bench_function("degradation_2000_cycles", |b| {
        b.iter(|| black_box(evaluator.evaluate(&snapshot).unwrap()));
    });
}

criterion_group!(benches, phase_field_bench, degradation_bench);
criterion_main!(benches);
