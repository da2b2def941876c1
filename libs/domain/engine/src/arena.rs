// [libs/domain/engine/src/arena.rs]
/*!
 * =================================================================
 * APARATO: GLYPH ARENA
 * RESPONSABILIDAD: PROPIEDAD EXCLUSIVA DE GLIFOS, DEDUP POR FIRMA, CULL
 * =================================================================
 *
 * The arena is the sole authority permitted to mutate glyphs (§5).
 * Every other component holds glyphs only by id and resolves them through
 * `arena.get(id)`; there are no back-references, so a culled progenitor
 * still referenced by a descendant's ancestry just resolves to `None`
 * (§9).
 */

use crate::config::EngineConfig;
use crucible_domain_models::prelude::{Glyph, GlyphId};
use std::collections::{HashMap, HashSet};

/// Owns every live glyph, the next-id counter, and the tag-signature dedup
/// index (§4.1).
#[derive(Debug, Clone)]
pub struct GlyphArena {
    glyphs: HashMap<GlyphId, Glyph>,
    /// Insertion order, used for the public read-only iterator and for the
    /// pressure event's "last N glyphs" window.
    order: Vec<GlyphId>,
    tag_signatures: HashSet<String>,
    next_id: GlyphId,
}

/// The sorted-joined tag set used as a dedup key (§3): order is
/// irrelevant for glyph identity, so signatures normalize it away.
#[must_use]
pub fn tag_signature(tags: &[String]) -> String {
    let mut sorted: Vec<&str> = tags.iter().map(String::as_str).collect();
    sorted.sort_unstable();
    sorted.join("|")
}

impl Default for GlyphArena {
    fn default() -> Self {
        Self::new()
    }
}

impl GlyphArena {
    /// An empty arena, `next_id` starting at 0.
    #[must_use]
    pub fn new() -> Self {
        Self {
            glyphs: HashMap::new(),
            order: Vec::new(),
            tag_signatures: HashSet::new(),
            next_id: 0,
        }
    }

    /// Clears every glyph and resets the id counter (used by `reset`).
    pub fn clear(&mut self) {
        self.glyphs.clear();
        self.order.clear();
        self.tag_signatures.clear();
        self.next_id = 0;
    }

    /// Reserves the next id without storing a glyph. Callers finish
    /// constructing the glyph with this id, then call [`Self::store`].
    pub fn reserve_id(&mut self) -> GlyphId {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Assigns `glyph` its slot, enforcing the [`EngineConfig::max_glyphs`]
    /// cap via [`Self::cull_if_over_capacity`]. Returns the ids of any
    /// glyphs culled to make room.
    ///
    /// Deduplicates by tag-signature: if `glyph.tags`' signature already
    /// exists, callers are expected to have retried `new_glyph` with a
    /// mutated tag set before reaching here (§4.1) — this method only
    /// records the signature, it does not itself retry.
    pub fn store(&mut self, glyph: Glyph, config: &EngineConfig) -> Vec<GlyphId> {
        self.tag_signatures.insert(tag_signature(&glyph.tags));
        let id = glyph.id;
        self.glyphs.insert(id, glyph);
        self.order.push(id);
        self.cull_if_over_capacity(config)
    }

    /// Whether `tags`' signature is already present in the dedup index.
    #[must_use]
    pub fn has_signature(&self, tags: &[String]) -> bool {
        self.tag_signatures.contains(&tag_signature(tags))
    }

    /// Looks up a glyph by id. Returns `None` for a culled or never-existing
    /// id — callers (the influence detector especially) must tolerate this.
    #[must_use]
    pub fn get(&self, id: GlyphId) -> Option<&Glyph> {
        self.glyphs.get(&id)
    }

    /// Mutable lookup by id.
    pub fn get_mut(&mut self, id: GlyphId) -> Option<&mut Glyph> {
        self.glyphs.get_mut(&id)
    }

    /// Removes a glyph outright. Used by the singularity scanner's cull
    /// passes and by capacity eviction.
    pub fn remove(&mut self, id: GlyphId) -> Option<Glyph> {
        let removed = self.glyphs.remove(&id);
        self.order.retain(|&existing| existing != id);
        removed
    }

    /// Inserts a glyph verbatim, without dedup bookkeeping or capacity
    /// eviction, and advances `next_id` past it if needed. Used only by
    /// snapshot restore (§4.15), which has already validated the
    /// glyph set as a whole and owns the id-uniqueness check itself.
    pub fn restore_glyph(&mut self, glyph: Glyph) {
        self.tag_signatures.insert(tag_signature(&glyph.tags));
        self.next_id = self.next_id.max(glyph.id + 1);
        let id = glyph.id;
        self.glyphs.insert(id, glyph);
        self.order.push(id);
    }

    /// The ids of the most recently stored `n` still-live glyphs, oldest
    /// first within the window. Backs the pressure check's mass window and
    /// the anchor glyph's tag union (§4.14).
    #[must_use]
    pub fn tail_ids(&self, n: usize) -> Vec<GlyphId> {
        let start = self.order.len().saturating_sub(n);
        self.order[start..].to_vec()
    }

    /// Overrides the next-id counter directly. Used only by snapshot
    /// restore, after every glyph has been replayed through
    /// [`Self::restore_glyph`], to reinstate the persisted counter even if
    /// it runs ahead of every id actually present (ids of culled glyphs are
    /// never reused, §3).
    pub fn set_next_id(&mut self, next_id: GlyphId) {
        self.next_id = self.next_id.max(next_id);
    }

    /// Read-only iteration in insertion order (§6's "read-only
    /// iterators" contract).
    pub fn iter(&self) -> impl Iterator<Item = &Glyph> {
        self.order.iter().filter_map(move |id| self.glyphs.get(id))
    }

    /// Current live population.
    #[must_use]
    pub fn len(&self) -> usize {
        self.glyphs.len()
    }

    /// Whether the arena holds no glyphs.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.glyphs.is_empty()
    }

    /// Number of children each glyph has, computed in one pass over every
    /// live glyph's ancestry (§4.1's "children count is pre-computed").
    #[must_use]
    pub fn children_counts(&self) -> HashMap<GlyphId, u32> {
        let mut counts: HashMap<GlyphId, u32> = HashMap::new();
        for glyph in self.iter() {
            for &parent in &glyph.ancestry {
                *counts.entry(parent).or_insert(0) += 1;
            }
        }
        counts
    }

    /// Evicts `min(excess + 5, 25)` glyphs when over [`EngineConfig::max_glyphs`],
    /// chosen as the lowest-scoring per §4.1's formula, skipping
    /// concepts/attractors/reflexes. Returns the evicted ids.
    pub fn cull_if_over_capacity(&mut self, config: &EngineConfig) -> Vec<GlyphId> {
        if self.len() <= config.max_glyphs {
            return Vec::new();
        }
        let excess = self.len() - config.max_glyphs;
        let to_remove = (excess + 5).min(25);

        let children = self.children_counts();
        let mut candidates: Vec<(GlyphId, f64)> = self
            .iter()
            .filter(|glyph| !glyph.is_cull_immune() && glyph.reflex_type().is_none())
            .map(|glyph| {
                let child_count = *children.get(&glyph.id).unwrap_or(&0) as f64;
                let stagnant_term = (60.0 - glyph.stagnant_count.min(60) as f64) * 20.0;
                let score =
                    glyph.entropy() * 0.3 + stagnant_term + child_count * 500.0 + glyph.stability * 1000.0;
                (glyph.id, score)
            })
            .collect();

        candidates.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal));
        candidates.truncate(to_remove);

        let evicted: Vec<GlyphId> = candidates.into_iter().map(|(id, _)| id).collect();
        for &id in &evicted {
            self.remove(id);
        }
        evicted
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crucible_domain_models::prelude::{GlyphKind, Season};
    use std::collections::VecDeque;

    fn test_glyph(id: GlyphId, tags: Vec<String>) -> Glyph {
        Glyph {
            id,
            tags,
            ancestry: vec![],
            generation: 0,
            kind: GlyphKind::Organic,
            attractor: None,
            season_born: Season::Exploration,
            entropy_history: VecDeque::from(vec![100.0]),
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
    fn tag_signature_ignores_order() {
        let a = tag_signature(&["wild".into(), "ghost".into()]);
        let b = tag_signature(&["ghost".into(), "wild".into()]);
        assert_eq!(a, b);
    }

    #[test]
    fn store_and_get_round_trips() {
        let mut arena = GlyphArena::new();
        let config = EngineConfig::default();
        let glyph = test_glyph(arena.reserve_id(), vec!["wild".into()]);
        let id = glyph.id;
        arena.store(glyph, &config);
        assert!(arena.get(id).is_some());
        assert!(arena.has_signature(&["wild".into()]));
    }

    #[test]
    fn cull_evicts_down_toward_capacity() {
        let mut arena = GlyphArena::new();
        let config = EngineConfig::with_config(|c| c.max_glyphs = 10);
        for _ in 0..20 {
            let id = arena.reserve_id();
            let glyph = test_glyph(id, vec![format!("tag-{id}")]);
            arena.store(glyph, &config);
        }
        assert!(arena.len() < 20);
    }

    #[test]
    fn removed_id_resolves_to_none() {
        let mut arena = GlyphArena::new();
        let config = EngineConfig::default();
        let id = arena.reserve_id();
        arena.store(test_glyph(id, vec!["a".into()]), &config);
        arena.remove(id);
        assert!(arena.get(id).is_none());
    }
}
