// [libs/domain/engine/src/entrainment.rs]
/*!
 * =================================================================
 * APARATO: ENTRAINMENT PROPAGATOR
 * RESPONSABILIDAD: TRANSFERENCIA DE TAGS/ENTROPIA CUESTA ABAJO
 * =================================================================
 */

use crate::arena::GlyphArena;
use crate::config::EngineConfig;
use crate::resonance::ResonanceEdge;
use crate::tag_operator::compress;
use crucible_domain_models::prelude::GlyphId;
use std::collections::HashMap;
use std::f64::consts::PI;

struct Candidate {
    source: GlyphId,
    strength: f64,
}

/// Runs one entrainment cycle (§4.6): requires at least 3 resonance
/// entries. Mutates the arena directly; returns the ids of glyphs actually
/// entrained this cycle.
pub fn run_entrainment_cycle(
    arena: &mut GlyphArena,
    resonance_matrix: &[ResonanceEdge],
    gen: u64,
    config: &EngineConfig,
) -> Vec<GlyphId> {
    if resonance_matrix.len() < 3 {
        return Vec::new();
    }

    let mut by_target: HashMap<GlyphId, Vec<Candidate>> = HashMap::new();

    for edge in resonance_matrix {
        let (source_id, target_id, h_src, h_tgt, phase_term) = {
            let a = match arena.get(edge.a) {
                Some(g) => g,
                None => continue,
            };
            let b = match arena.get(edge.b) {
                Some(g) => g,
                None => continue,
            };
            let (source, target) = if a.entropy() >= b.entropy() { (a, b) } else { (b, a) };
            let phase_term = match (source.thermodynamic_state, target.thermodynamic_state) {
                (Some(ts), Some(tt)) => (PI * (ts.phi_phase - tt.phi_phase).abs()).cos().max(0.0),
                _ => 0.5,
            };
            (source.id, target.id, source.entropy(), target.entropy(), phase_term)
        };

        let strength = edge.score * ((h_src - h_tgt) / 8000.0).max(0.0) * phase_term;
        if strength < 0.05 {
            continue;
        }
        if let Some(target) = arena.get(target_id) {
            if target.kind.is_concept() {
                continue;
            }
        }
        by_target.entry(target_id).or_default().push(Candidate {
            source: source_id,
            strength,
        });
    }

    let mut entrained: Vec<GlyphId> = Vec::new();

    for (target_id, candidates) in &by_target {
        if candidates.is_empty() {
            continue;
        }
        let total_strength: f64 = candidates.iter().map(|c| c.strength).sum();
        let transfer_budget = (total_strength * 3.0).ceil() as usize;

        let mut novel_tags: Vec<String> = Vec::new();
        let target_tags = arena.get(*target_id).map(|g| g.tags.clone()).unwrap_or_default();
        for candidate in candidates {
            if novel_tags.len() >= transfer_budget.min(4) {
                break;
            }
            if let Some(source) = arena.get(candidate.source) {
                for tag in &source.tags {
                    if novel_tags.len() >= transfer_budget.min(4) {
                        break;
                    }
                    if !target_tags.contains(tag) && !novel_tags.contains(tag) {
                        novel_tags.push(tag.clone());
                    }
                }
            }
        }

        let avg_source_entropy: f64 = candidates
            .iter()
            .filter_map(|c| arena.get(c.source).map(|g| g.entropy()))
            .sum::<f64>()
            / candidates.len() as f64;

        let mut priority_bump = 0.0_f64;
        if let Some(target) = arena.get(*target_id) {
            if let Some(thermo) = target.thermodynamic_state {
                if thermo.tau_coherence > 2.0 {
                    priority_bump += 0.8 * total_strength;
                }
                if thermo.dh_dt < -5.0 {
                    priority_bump += 0.5 * total_strength;
                }
                if thermo.phi_phase > 0.7 && thermo.tau_coherence > 1.5 {
                    priority_bump += 0.6 * total_strength;
                }
            }
        }

        let is_attractor_descendant = arena
            .get(*target_id)
            .map(|g| g.attractor.is_some())
            .unwrap_or(false);

        if let Some(target) = arena.get_mut(*target_id) {
            let mut merged = target.tags.clone();
            merged.extend(novel_tags);
            target.tags = compress(&merged, config.compress_sim_threshold, config.max_tags_per_glyph);
            target.push_entropy_sample(target.entropy() + avg_source_entropy * total_strength * 0.12);
            if is_attractor_descendant {
                target.mutation_rate = (target.mutation_rate + total_strength * 0.1).min(0.6);
            }
            target.priority += priority_bump;
            target.entrained = true;
            target.entrainment_gen = Some(gen);
            entrained.push(*target_id);
        }
    }

    for glyph in arena_glyph_ids(arena) {
        if let Some(g) = arena.get_mut(glyph) {
            g.priority *= 0.95;
            g.mutation_rate = 0.1 + (g.mutation_rate - 0.1) * 0.98;
        }
    }

    entrained
}

fn arena_glyph_ids(arena: &GlyphArena) -> Vec<GlyphId> {
    arena.iter().map(|g| g.id).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crucible_domain_models::prelude::{Glyph, GlyphKind, Season, ThermodynamicState};
    use std::collections::VecDeque;

    fn glyph(id: GlyphId, h: f64, tags: Vec<&str>) -> Glyph {
        Glyph {
            id,
            tags: tags.into_iter().map(String::from).collect(),
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
            x: 0.0,
            y: 0.0,
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
    fn too_few_resonance_entries_skips_cycle() {
        let mut arena = GlyphArena::new();
        let config = EngineConfig::default();
        let matrix = vec![];
        let result = run_entrainment_cycle(&mut arena, &matrix, 10, &config);
        assert!(result.is_empty());
    }

    #[test]
    fn high_entropy_source_entrains_low_entropy_target() {
        let mut arena = GlyphArena::new();
        let config = EngineConfig::default();
        let source_id = arena.reserve_id();
        arena.store(glyph(source_id, 7000.0, vec!["ghost", "fractal"]), &config);
        let target_id = arena.reserve_id();
        arena.store(glyph(target_id, 100.0, vec!["stable"]), &config);

        let matrix = vec![
            ResonanceEdge { a: source_id, b: target_id, score: 0.9 },
            ResonanceEdge { a: source_id, b: target_id, score: 0.9 },
            ResonanceEdge { a: source_id, b: target_id, score: 0.9 },
        ];

        run_entrainment_cycle(&mut arena, &matrix, 10, &config);
        let target = arena.get(target_id).unwrap();
        assert!(target.entrained);
        assert_eq!(target.entrainment_gen, Some(10));
    }
}
