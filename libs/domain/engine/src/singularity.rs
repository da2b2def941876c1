// [libs/domain/engine/src/singularity.rs]
/*!
 * =================================================================
 * APARATO: ESCANER DE SINGULARIDAD
 * RESPONSABILIDAD: CULL POR DUPLICADO EXACTO Y CASI-CLON (SIGN-LSH)
 * =================================================================
 */

use crate::arena::GlyphArena;
use crate::config::{EngineConfig, CANVAS_HEIGHT, CANVAS_WIDTH};
use crucible_core_probabilistic::prelude::{
    cosine_similarity, exact_hash_clusters, signature_buckets, SignatureTable,
};
use crucible_domain_models::prelude::GlyphId;
use rand::seq::SliceRandom;
use rand::Rng;

/// Dimensionality of the feature vector fed to both cull passes (§4.9).
pub const FEATURE_DIMS: usize = 8;

const NEAR_CLONE_COSINE_FLOOR: f64 = 0.999;
const MAX_SAMPLED_BUCKETS: usize = 50;
const MAX_PER_BUCKET: usize = 20;
const MIN_POPULATION: usize = 20;

fn feature_vector(glyph: &crucible_domain_models::prelude::Glyph) -> Option<Vec<f64>> {
    let thermo = glyph.thermodynamic_state?;
    Some(vec![
        thermo.h / 8000.0,
        thermo.dh_dt / 50.0,
        thermo.tau_coherence.min(10.0) / 10.0,
        thermo.phi_phase,
        glyph.entropy() / 8000.0,
        glyph.tags.len() as f64 / 10.0,
        glyph.x / CANVAS_WIDTH,
        glyph.y / CANVAS_HEIGHT,
    ])
}

/// Outcome of one singularity scan.
#[derive(Debug, Default)]
pub struct SingularityOutcome {
    /// Ids culled by the exact-duplicate pass.
    pub exact_culled: Vec<GlyphId>,
    /// Ids culled by the near-clone pass.
    pub near_clone_culled: Vec<GlyphId>,
}

/// Runs one singularity scan (§4.9): an exact-hash cull followed by a
/// near-clone sign-LSH cull, skipping concepts/attractors/reflexes in both
/// passes. No-op below [`MIN_POPULATION`] thermo-bearing glyphs.
pub fn run_singularity_scan(
    arena: &mut GlyphArena,
    config: &EngineConfig,
    rng: &mut impl Rng,
) -> SingularityOutcome {
    let mut outcome = SingularityOutcome::default();

    let mut ids: Vec<GlyphId> = Vec::new();
    let mut vectors: Vec<Vec<f64>> = Vec::new();
    for glyph in arena.iter() {
        if let Some(vector) = feature_vector(glyph) {
            ids.push(glyph.id);
            vectors.push(vector);
        }
    }

    if ids.len() < MIN_POPULATION {
        return outcome;
    }

    for cluster in exact_hash_clusters(&vectors) {
        if cluster.len() < 3 {
            continue;
        }
        let mut ranked: Vec<(GlyphId, f64)> = cluster
            .iter()
            .filter_map(|&index| arena.get(ids[index]).map(|g| (ids[index], g.entropy())))
            .collect();
        ranked.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));

        for &(id, _) in ranked.iter().skip(2) {
            let culled = arena
                .get(id)
                .map(|g| !g.is_cull_immune() && g.reflex_type().is_none())
                .unwrap_or(false);
            if culled {
                arena.remove(id);
                outcome.exact_culled.push(id);
            }
        }
    }

    let mut ids: Vec<GlyphId> = Vec::new();
    let mut vectors: Vec<Vec<f64>> = Vec::new();
    for glyph in arena.iter() {
        if let Some(vector) = feature_vector(glyph) {
            ids.push(glyph.id);
            vectors.push(vector);
        }
    }
    if ids.len() < MIN_POPULATION {
        return outcome;
    }

    let table = SignatureTable::new(config.singularity_lcg_seed, FEATURE_DIMS);
    let mut buckets = signature_buckets(&table, &vectors);
    buckets.shuffle(rng);
    buckets.truncate(MAX_SAMPLED_BUCKETS);

    for bucket in &buckets {
        let capped = &bucket[..bucket.len().min(MAX_PER_BUCKET)];
        for i in 0..capped.len() {
            for j in (i + 1)..capped.len() {
                let (idx_a, idx_b) = (capped[i], capped[j]);
                if cosine_similarity(&vectors[idx_a], &vectors[idx_b]) < NEAR_CLONE_COSINE_FLOOR {
                    continue;
                }
                let (id_a, id_b) = (ids[idx_a], ids[idx_b]);
                let entropies = (arena.get(id_a).map(|g| g.entropy()), arena.get(id_b).map(|g| g.entropy()));
                let (Some(ha), Some(hb)) = entropies else { continue };
                let loser = if ha <= hb { id_a } else { id_b };
                let protected = arena
                    .get(loser)
                    .map(|g| g.is_cull_immune() || g.reflex_type().is_some())
                    .unwrap_or(true);
                if !protected {
                    arena.remove(loser);
                    outcome.near_clone_culled.push(loser);
                }
            }
        }
    }

    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use crucible_domain_models::prelude::{Glyph, GlyphKind, Season, ThermodynamicState};
    use rand::SeedableRng;
    use std::collections::VecDeque;

    fn glyph_with_thermo(id: GlyphId, h: f64) -> Glyph {
        Glyph {
            id,
            tags: vec!["a".into()],
            ancestry: vec![],
            generation: 0,
            kind: GlyphKind::Organic,
            attractor: None,
            season_born: Season::Exploration,
            entropy_history: VecDeque::from(vec![h]),
            thermodynamic_state: Some(ThermodynamicState {
                h,
                dh_dt: 0.0,
                tau_coherence: 1.0,
                phi_phase: 0.5,
                gen: 0,
            }),
            x: 10.0,
            y: 10.0,
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
        }
    }

    #[test]
    fn below_min_population_is_a_no_op() {
        let mut arena = GlyphArena::new();
        let config = EngineConfig::default();
        let mut rng = rand::rngs::StdRng::seed_from_u64(1);
        let outcome = run_singularity_scan(&mut arena, &config, &mut rng);
        assert!(outcome.exact_culled.is_empty());
        assert!(outcome.near_clone_culled.is_empty());
    }

    #[test]
    fn exact_duplicate_cluster_culls_down_to_two() {
        let mut arena = GlyphArena::new();
        let config = EngineConfig::default();
        for _ in 0..20 {
            let id = arena.reserve_id();
            arena.store(glyph_with_thermo(id, 500.0), &config);
        }
        let mut rng = rand::rngs::StdRng::seed_from_u64(1);
        let outcome = run_singularity_scan(&mut arena, &config, &mut rng);
        assert!(!outcome.exact_culled.is_empty());
        assert!(arena.len() < 20);
    }

    #[test]
    fn concept_survives_exact_cull() {
        let mut arena = GlyphArena::new();
        let config = EngineConfig::default();
        for i in 0..19 {
            let id = arena.reserve_id();
            arena.store(glyph_with_thermo(id, 500.0), &config);
            let _ = i;
        }
        let concept_id = arena.reserve_id();
        let mut concept = glyph_with_thermo(concept_id, 500.0);
        concept.kind = GlyphKind::Concept(crucible_domain_models::prelude::ConceptData {
            technical: "x".into(),
            confidence: 0.9,
            keywords: vec![],
        });
        arena.store(concept, &config);

        let mut rng = rand::rngs::StdRng::seed_from_u64(1);
        run_singularity_scan(&mut arena, &config, &mut rng);
        assert!(arena.get(concept_id).is_some());
    }
}
