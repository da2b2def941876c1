// [libs/domain/engine/src/influence.rs]
/*!
 * =================================================================
 * APARATO: INFLUENCE & ATTRACTOR DETECTOR
 * RESPONSABILIDAD: INDICE PADRE->HIJOS, SCORING, PROMOCION A ATRACTOR
 * =================================================================
 */

use crate::arena::GlyphArena;
use crucible_domain_models::prelude::{AttractorStatus, GlyphId};
use std::collections::HashMap;

const CASCADE_DEPTH_CUTOFF: u32 = 4;
/// Number of ancestry hits required to promote a still-living parent.
const ATTRACTOR_THRESHOLD: u32 = 3;
/// Number of ancestry hits required to promote a proxy for a culled parent.
const PROXY_THRESHOLD: u32 = 4;

/// Outcome of one influence & attractor pass.
#[derive(Debug, Default)]
pub struct InfluenceOutcome {
    /// Ids newly promoted to attractor status this cycle (direct, living parents).
    pub promoted: Vec<GlyphId>,
    /// Ids newly promoted as proxy attractors for a culled progenitor.
    pub proxies_promoted: Vec<(GlyphId, GlyphId)>,
    /// Ids rediscovered: already attractors, hit the threshold again.
    pub rediscovered: Vec<GlyphId>,
}

fn parent_child_index(arena: &GlyphArena) -> HashMap<GlyphId, Vec<GlyphId>> {
    let mut index: HashMap<GlyphId, Vec<GlyphId>> = HashMap::new();
    for glyph in arena.iter() {
        for &parent in &glyph.ancestry {
            index.entry(parent).or_default().push(glyph.id);
        }
    }
    index
}

/// `cascadeDepth` (§4.8): recursive max depth over descendants, cut off
/// at [`CASCADE_DEPTH_CUTOFF`]. The `visited` set is shared across sibling
/// recursive branches, matching the source's behavior flagged in §9 —
/// this under-reports depth when ancestry forms a DAG, preserved here for
/// behavioral parity rather than fixed.
fn cascade_depth(
    id: GlyphId,
    index: &HashMap<GlyphId, Vec<GlyphId>>,
    visited: &mut std::collections::HashSet<GlyphId>,
    depth: u32,
) -> u32 {
    if depth >= CASCADE_DEPTH_CUTOFF {
        return depth;
    }
    if !visited.insert(id) {
        return depth;
    }
    match index.get(&id) {
        Some(children) if !children.is_empty() => children
            .iter()
            .map(|&child| cascade_depth(child, index, visited, depth + 1))
            .max()
            .unwrap_or(depth),
        _ => depth,
    }
}

fn tag_diversity(arena: &GlyphArena, children: &[GlyphId]) -> f64 {
    let mut unique = std::collections::HashSet::new();
    for &child in children {
        if let Some(glyph) = arena.get(child) {
            unique.extend(glyph.tags.iter().cloned());
        }
    }
    unique.len() as f64
}

fn influence_score(
    arena: &GlyphArena,
    parent_id: GlyphId,
    children: &[GlyphId],
    index: &HashMap<GlyphId, Vec<GlyphId>>,
) -> f64 {
    let total = arena.len().max(1) as f64;
    let total_children = children.len().max(1) as f64;

    let cross_type_children = children
        .iter()
        .filter_map(|&child| {
            let glyph = arena.get(child)?;
            let parent = arena.get(parent_id)?;
            Some(glyph.kind.is_concept() != parent.kind.is_concept())
        })
        .filter(|&mismatch| mismatch)
        .count() as f64;

    let avg_child_h: f64 = children
        .iter()
        .filter_map(|&child| arena.get(child).map(|g| g.entropy()))
        .sum::<f64>()
        / children.len().max(1) as f64;

    let mut visited = std::collections::HashSet::new();
    let depth = cascade_depth(parent_id, index, &mut visited, 0);

    0.35 * (children.len() as f64 / total)
        + 0.25 * (tag_diversity(arena, children) / 10.0)
        + 0.15 * (depth as f64 / f64::from(CASCADE_DEPTH_CUTOFF))
        + 0.15 * (avg_child_h / 8000.0)
        + 0.10 * (cross_type_children / total_children)
}

/// Runs one influence & attractor pass (§4.8): builds the parent-child
/// index, scores every parent with children, tallies ancestry hits, and
/// promotes attractors (direct or proxy) into `attractors`.
pub fn run_influence_cycle(
    arena: &mut GlyphArena,
    attractors: &mut HashMap<GlyphId, AttractorStatus>,
    gen: u64,
) -> InfluenceOutcome {
    let index = parent_child_index(arena);
    let mut outcome = InfluenceOutcome::default();

    let mut scores: HashMap<GlyphId, f64> = HashMap::new();
    for (&parent_id, children) in &index {
        scores.insert(parent_id, influence_score(arena, parent_id, children, &index));
    }

    let mut hit_counts: HashMap<GlyphId, u32> = HashMap::new();
    for glyph in arena.iter() {
        for &parent in &glyph.ancestry {
            *hit_counts.entry(parent).or_insert(0) += 1;
        }
    }

    for (&id, &influence) in &scores {
        if let Some(glyph) = arena.get_mut(id) {
            glyph.influence_score = influence;
        }
    }

    for (&candidate_id, &hits) in &hit_counts {
        let still_alive = arena.get(candidate_id).is_some();

        if still_alive && hits >= ATTRACTOR_THRESHOLD {
            let already = attractors.contains_key(&candidate_id);
            let entry = attractors.entry(candidate_id).or_insert(AttractorStatus {
                discovered: gen,
                episodes: 0,
                proxy_for: None,
            });
            entry.episodes += 1;
            if let Some(glyph) = arena.get_mut(candidate_id) {
                glyph.promote_to_attractor(entry.discovered, None);
            }
            if already {
                outcome.rediscovered.push(candidate_id);
            } else {
                outcome.promoted.push(candidate_id);
            }
            continue;
        }

        if !still_alive && hits >= PROXY_THRESHOLD && !attractors.contains_key(&candidate_id) {
            let best_descendant = index
                .get(&candidate_id)
                .into_iter()
                .flatten()
                .filter_map(|&child| arena.get(child).map(|g| (child, g.influence_score)))
                .max_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal));

            if let Some((descendant_id, _)) = best_descendant {
                attractors.insert(
                    candidate_id,
                    AttractorStatus {
                        discovered: gen,
                        episodes: 1,
                        proxy_for: Some(candidate_id),
                    },
                );
                if let Some(glyph) = arena.get_mut(descendant_id) {
                    glyph.promote_to_attractor(gen, Some(candidate_id));
                }
                outcome.proxies_promoted.push((candidate_id, descendant_id));
            }
        }
    }

    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use crucible_domain_models::prelude::{Glyph, GlyphKind, Season};
    use std::collections::VecDeque;

    fn glyph(id: GlyphId, ancestry: Vec<GlyphId>) -> Glyph {
        Glyph {
            id,
            tags: vec!["a".into()],
            ancestry,
            generation: 0,
            kind: GlyphKind::Organic,
            attractor: None,
            season_born: Season::Exploration,
            entropy_history: VecDeque::from(vec![500.0]),
            thermodynamic_state: None,
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
    fn parent_with_three_children_is_promoted() {
        let mut arena = GlyphArena::new();
        let config = EngineConfig::default();
        let parent_id = arena.reserve_id();
        arena.store(glyph(parent_id, vec![]), &config);
        for _ in 0..3 {
            let child_id = arena.reserve_id();
            arena.store(glyph(child_id, vec![parent_id]), &config);
        }

        let mut attractors = HashMap::new();
        let outcome = run_influence_cycle(&mut arena, &mut attractors, 50);

        assert_eq!(outcome.promoted, vec![parent_id]);
        assert!(arena.get(parent_id).unwrap().attractor.is_some());
        assert_eq!(attractors.get(&parent_id).unwrap().discovered, 50);
    }

    #[test]
    fn culled_progenitor_promotes_proxy() {
        let mut arena = GlyphArena::new();
        let config = EngineConfig::default();
        let culled_id = 999;
        let mut descendant_ids = Vec::new();
        for _ in 0..4 {
            let child_id = arena.reserve_id();
            arena.store(glyph(child_id, vec![culled_id]), &config);
            descendant_ids.push(child_id);
        }

        let mut attractors = HashMap::new();
        let outcome = run_influence_cycle(&mut arena, &mut attractors, 50);

        assert_eq!(outcome.proxies_promoted.len(), 1);
        let (original, proxy) = outcome.proxies_promoted[0];
        assert_eq!(original, culled_id);
        assert!(descendant_ids.contains(&proxy));
        assert!(arena.get(proxy).unwrap().attractor.is_some());
    }

    #[test]
    fn two_children_do_not_promote() {
        let mut arena = GlyphArena::new();
        let config = EngineConfig::default();
        let parent_id = arena.reserve_id();
        arena.store(glyph(parent_id, vec![]), &config);
        for _ in 0..2 {
            let child_id = arena.reserve_id();
            arena.store(glyph(child_id, vec![parent_id]), &config);
        }

        let mut attractors = HashMap::new();
        let outcome = run_influence_cycle(&mut arena, &mut attractors, 50);
        assert!(outcome.promoted.is_empty());
    }
}
