// [libs/domain/engine/benches/resonance_rebuild.rs]
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use crucible_domain_engine::config::EngineConfig;
use crucible_domain_engine::resonance::rebuild_resonance_field;
use crucible_domain_models::prelude::{Glyph, GlyphKind, Season, ThermodynamicState};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::VecDeque;

fn seeded_population(n: u64, rng: &mut StdRng) -> Vec<Glyph> {
    (0..n)
        .map(|id| Glyph {
            id,
            tags: vec!["wild".to_string()],
            ancestry: vec![],
            generation: 0,
            kind: GlyphKind::Organic,
            attractor: None,
            season_born: Season::Exploration,
            entropy_history: VecDeque::from(vec![rng.gen_range(0.0..8000.0)]),
            thermodynamic_state: Some(ThermodynamicState {
                h: rng.gen_range(0.0..8000.0),
                dh_dt: rng.gen_range(-50.0..50.0),
                tau_coherence: rng.gen_range(0.1..5.0),
                phi_phase: rng.gen_range(0.0..1.0),
                gen: 0,
            }),
            x: rng.gen_range(0.0..1200.0),
            y: rng.gen_range(0.0..600.0),
            vx: 0.0,
            vy: 0.0,
            pulse_phase: 0.0,
            last_collision_gen: None,
            stagnant_count: 0,
            birth_time: 0,
            influence_score: 0.0,
            priority: 0.0,
            mutation_rate: 0.1,
            stability: 0.0,
            entrained: false,
            entrainment_gen: None,
        })
        .collect()
}

fn resonance_rebuild_benchmark(c: &mut Criterion) {
    let config = EngineConfig::default();
    let mut seed_rng = StdRng::seed_from_u64(7);
    let population = seeded_population(400, &mut seed_rng);
    let refs: Vec<&Glyph> = population.iter().collect();
    let mut rng = StdRng::seed_from_u64(11);

    c.bench_function("resonance_rebuild_400", |b| {
        b.iter(|| {
            let edges = rebuild_resonance_field(black_box(&refs), black_box(0.45), &config, &mut rng);
            black_box(edges.len())
        });
    });
}

criterion_group!(benches, resonance_rebuild_benchmark);
criterion_main!(benches);
