// [libs/domain/engine/src/resonance.rs]
/*!
 * =================================================================
 * APARATO: RESONANCE FIELD
 * RESPONSABILIDAD: SCORING POR PARES, GRILLA ESPACIAL, MUESTREO ESTOCASTICO
 * =================================================================
 *
 * Pairwise resonance is the engine's O(N^2) hot path (§2). Two passes
 * make it tractable: a 120px spatial grid catches local structure cheaply,
 * and a bounded stochastic sample catches long-range pairs a grid alone
 * would miss.
 */

use crate::config::EngineConfig;
use crucible_domain_models::prelude::{Glyph, GlyphId};
use rand::Rng;
use std::collections::{HashMap, HashSet};
use std::f64::consts::PI;

/// Side length of the spatial grid's square cells (§4.4).
pub const GRID_CELL_SIZE: f64 = 120.0;

/// A scored edge in the resonance matrix.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResonanceEdge {
    /// Lower-valued endpoint id in the pair (for stable pair-key dedup).
    pub a: GlyphId,
    /// Higher-valued endpoint id in the pair.
    pub b: GlyphId,
    /// The resonance score, in `[0, 1]`.
    pub score: f64,
}

/// `resonanceWith` (§4.4): the pairwise score between two glyphs with
/// thermo state present. Returns `None` if either lacks thermo state.
#[must_use]
pub fn resonance_with(a: &Glyph, b: &Glyph) -> Option<f64> {
    let ta = a.thermodynamic_state?;
    let tb = b.thermodynamic_state?;

    let rho_h = 1.0 / (1.0 + (ta.h - tb.h).abs() / 600.0);
    let rho_v = (-(ta.dh_dt * tb.dh_dt) / 5000.0).clamp(0.0, 1.0);
    let rho_phi = (PI * (ta.phi_phase - tb.phi_phase).abs()).cos();
    let rho_tau = ta.tau_coherence.min(tb.tau_coherence) / ta.tau_coherence.max(tb.tau_coherence);

    let mut score = 0.35 * rho_h + 0.30 * rho_v + 0.20 * rho_phi + 0.15 * rho_tau;

    let both_concept = a.kind.is_concept() && b.kind.is_concept();
    let one_concept = a.kind.is_concept() != b.kind.is_concept();
    let either_attractor = a.attractor.is_some() || b.attractor.is_some();
    let reflex_mix = a.kind.is_reflex() != b.kind.is_reflex();

    if both_concept {
        score *= 1.15;
    } else if one_concept {
        score *= 1.08;
    }
    if either_attractor {
        score *= 1.12;
    }
    if reflex_mix {
        score *= 1.05;
    }

    Some(score.clamp(0.0, 1.0))
}

fn pair_key(a: GlyphId, b: GlyphId) -> (GlyphId, GlyphId) {
    if a < b {
        (a, b)
    } else {
        (b, a)
    }
}

fn grid_cell(x: f64, y: f64) -> (i64, i64) {
    (
        (x / GRID_CELL_SIZE).floor() as i64,
        (y / GRID_CELL_SIZE).floor() as i64,
    )
}

/// Rebuilds the resonance matrix from scratch (§4.4): a local pass
/// over each grid cell's 3x3 neighborhood, then a bounded stochastic global
/// pass, capped at [`EngineConfig::resonance_matrix_cap`] by highest score.
pub fn rebuild_resonance_field(
    glyphs: &[&Glyph],
    threshold: f64,
    config: &EngineConfig,
    rng: &mut impl Rng,
) -> Vec<ResonanceEdge> {
    let mut seen: HashSet<(GlyphId, GlyphId)> = HashSet::new();
    let mut edges: Vec<ResonanceEdge> = Vec::new();

    let mut grid: HashMap<(i64, i64), Vec<usize>> = HashMap::new();
    for (index, glyph) in glyphs.iter().enumerate() {
        grid.entry(grid_cell(glyph.x, glyph.y)).or_default().push(index);
    }

    for (&(cx, cy), members) in &grid {
        let mut neighborhood: Vec<usize> = Vec::new();
        for dx in -1..=1 {
            for dy in -1..=1 {
                if let Some(cell) = grid.get(&(cx + dx, cy + dy)) {
                    neighborhood.extend(cell.iter().copied());
                }
            }
        }
        for &i in members {
            for &j in &neighborhood {
                try_score_pair(glyphs, i, j, threshold, &mut seen, &mut edges);
            }
        }
    }

    let n = glyphs.len();
    if n >= 2 {
        let sample_budget = config.resonance_sample_size.min(n * (n - 1) / 2);
        for _ in 0..sample_budget {
            let i = rng.gen_range(0..n);
            let j = rng.gen_range(0..n);
            try_score_pair(glyphs, i, j, threshold, &mut seen, &mut edges);
        }
    }

    edges.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
    edges.truncate(config.resonance_matrix_cap);
    edges
}

fn try_score_pair(
    glyphs: &[&Glyph],
    i: usize,
    j: usize,
    threshold: f64,
    seen: &mut HashSet<(GlyphId, GlyphId)>,
    edges: &mut Vec<ResonanceEdge>,
) {
    if i == j {
        return;
    }
    let (a, b) = (glyphs[i], glyphs[j]);
    if a.id == b.id {
        return;
    }
    let key = pair_key(a.id, b.id);
    if !seen.insert(key) {
        return;
    }
    if let Some(score) = resonance_with(a, b) {
        if score > threshold {
            edges.push(ResonanceEdge {
                a: key.0,
                b: key.1,
                score,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crucible_domain_models::prelude::{GlyphKind, Season, ThermodynamicState};
    use rand::SeedableRng;
    use std::collections::VecDeque;

    fn glyph_with_thermo(id: GlyphId, h: f64, x: f64, y: f64) -> Glyph {
        Glyph {
            id,
            tags: vec![],
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
            x,
            y,
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
    fn identical_thermo_state_resonates_near_maximum() {
        let a = glyph_with_thermo(0, 1000.0, 0.0, 0.0);
        let b = glyph_with_thermo(1, 1000.0, 0.0, 0.0);
        let score = resonance_with(&a, &b).unwrap();
        assert!(score > 0.9);
    }

    #[test]
    fn missing_thermo_state_returns_none() {
        let mut a = glyph_with_thermo(0, 1000.0, 0.0, 0.0);
        a.thermodynamic_state = None;
        let b = glyph_with_thermo(1, 1000.0, 0.0, 0.0);
        assert!(resonance_with(&a, &b).is_none());
    }

    #[test]
    fn rebuild_caps_matrix_size() {
        let config = EngineConfig::with_config(|c| c.resonance_matrix_cap = 3);
        let owned: Vec<Glyph> = (0..10)
            .map(|i| glyph_with_thermo(i, 1000.0, 0.0, 0.0))
            .collect();
        let refs: Vec<&Glyph> = owned.iter().collect();
        let mut rng = rand::rngs::StdRng::seed_from_u64(1);
        let edges = rebuild_resonance_field(&refs, 0.0, &config, &mut rng);
        assert!(edges.len() <= 3);
    }

    use proptest::prelude::*;

    proptest! {
        /// P4: every stored edge's endpoints are distinct and its score
        /// equals `resonance_with` recomputed directly from the same pair.
        #[test]
        fn rebuilt_edges_match_recomputed_scores(
            h in -2000.0f64..10000.0,
            dh_dt in -500.0f64..500.0,
            seed in any::<u64>(),
        ) {
            let a = glyph_with_thermo(0, h, 0.0, 0.0);
            let mut b = glyph_with_thermo(1, h + dh_dt, 10.0, 10.0);
            if let Some(state) = &mut b.thermodynamic_state {
                state.dh_dt = dh_dt;
            }
            let refs = vec![&a, &b];
            let config = EngineConfig::default();
            let mut rng = rand::rngs::StdRng::seed_from_u64(seed);
            let edges = rebuild_resonance_field(&refs, 0.0, &config, &mut rng);
            for edge in &edges {
                prop_assert_ne!(edge.a, edge.b);
                let recomputed = resonance_with(&a, &b).unwrap();
                prop_assert!((edge.score - recomputed).abs() < 1e-9);
            }
        }

        /// `resonance_with` is symmetric and its result always clamps to [0, 1].
        #[test]
        fn resonance_with_is_symmetric_and_bounded(
            ha in -2000.0f64..10000.0,
            hb in -2000.0f64..10000.0,
        ) {
            let a = glyph_with_thermo(0, ha, 0.0, 0.0);
            let b = glyph_with_thermo(1, hb, 0.0, 0.0);
            let forward = resonance_with(&a, &b).unwrap();
            let backward = resonance_with(&b, &a).unwrap();
            prop_assert!((forward - backward).abs() < 1e-9);
            prop_assert!((0.0..=1.0).contains(&forward));
        }
    }
}
