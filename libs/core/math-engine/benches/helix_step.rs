// [libs/core/math-engine/benches/helix_step.rs]
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use crucible_core_math::prelude::{HelixParams, HelixState};

fn helix_step_benchmark(c: &mut Criterion) {
    let params = HelixParams::default();
    let mut state = HelixState::fresh(&params);

    c.bench_function("helix_step", |b| {
        b.iter(|| {
            state.step(black_box(&params));
            black_box(state.r)
        });
    });
}

criterion_group!(benches, helix_step_benchmark);
criterion_main!(benches);
