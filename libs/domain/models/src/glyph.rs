// [libs/domain/models/src/glyph.rs]
//! The sole populated entity (§3). A `Glyph` is pure data: every field
//! here is mutated only by the step orchestrator's sub-phases, never by an
//! external caller directly (§5's resource policy).

use crate::concept::ConceptData;
use crate::ids::GlyphId;
use crate::reflex::ReflexType;
use crate::role::{AttractorStatus, GlyphKind};
use crate::season::Season;
use crate::thermo::ThermodynamicState;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Bound on `entropy_history` (§5, §8).
pub const MAX_ENTROPY_HISTORY: usize = 50;
/// Bound on `tags` after compression (§6 `MAX_TAGS_PER_GLYPH`).
pub const MAX_TAGS_PER_GLYPH: usize = 8;
/// Bound on `ancestry` (§3).
pub const MAX_ANCESTRY: usize = 2;

/// Protected cognitive tags, never dropped by compression (§3).
/// Tags matching `gen:*` or `c#*` are checked separately since they carry a
/// payload rather than being fixed strings.
pub const PROTECTED_TAGS: &[&str] = &[
    "origin",
    "self",
    "purpose",
    "memory",
    "mirror",
    "beacon",
    "synthesis",
    "semantic-fusion",
];

/// Whether `tag` is one of the protected cognitive markers that compression
/// must never drop (§3).
#[must_use]
pub fn is_protected_tag(tag: &str) -> bool {
    PROTECTED_TAGS.contains(&tag) || tag.starts_with("c#") || tag.starts_with("gen:")
}

/// The sole populated entity in the simulation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Glyph {
    /// Monotonic id, assigned at birth, never reused.
    pub id: GlyphId,
    /// Ordered tag sequence; order is display-only, identity is set-based.
    pub tags: Vec<String>,
    /// Parent ids, 0 (random birth or concept injection), 1 (reflex
    /// mutation), or 2 (collision offspring) entries.
    pub ancestry: Vec<GlyphId>,
    /// Generation (tick) at which this glyph was created.
    pub generation: u64,
    /// What kind of glyph this is, and the attractor status layered on top.
    pub kind: GlyphKind,
    /// `Some` once promoted by the influence detector; permanent.
    pub attractor: Option<AttractorStatus>,
    /// Season active at creation.
    pub season_born: Season,
    /// Bounded ring of entropy samples, newest last; current `entropy` is
    /// the last entry, or `0.0` before the first thermo pass.
    pub entropy_history: VecDeque<f64>,
    /// Derived thermodynamic state, `None` until the first thermo pass.
    pub thermodynamic_state: Option<ThermodynamicState>,
    /// X position on the fixed 1200x600 logical canvas.
    pub x: f64,
    /// Y position on the fixed 1200x600 logical canvas.
    pub y: f64,
    /// X velocity.
    pub vx: f64,
    /// Y velocity.
    pub vy: f64,
    /// Phase of the per-glyph render pulse; owned by the core so snapshots
    /// round-trip exactly, even though only the renderer reads it.
    pub pulse_phase: f64,
    /// Generation of this glyph's most recent collision, if any.
    pub last_collision_gen: Option<u64>,
    /// Ticks since this glyph last collided or was entrained.
    pub stagnant_count: u32,
    /// Wall-clock-independent birth marker (the generation it was created).
    pub birth_time: u64,
    /// Influence score from the most recent influence & attractor pass.
    pub influence_score: f64,
    /// Priority, decayed toward 0 after each entrainment cycle.
    pub priority: f64,
    /// Mutation rate, default `0.1`, asymptotically decays toward baseline.
    pub mutation_rate: f64,
    /// Stability score used by the arena's cull-priority formula.
    pub stability: f64,
    /// Whether this glyph was entrained in the current cycle.
    pub entrained: bool,
    /// Generation of this glyph's most recent entrainment, if any.
    pub entrainment_gen: Option<u64>,
}

impl Glyph {
    /// Current entropy: the last history sample, or `0.0` before the first
    /// thermo pass.
    #[must_use]
    pub fn entropy(&self) -> f64 {
        self.entropy_history.back().copied().unwrap_or(0.0)
    }

    /// Appends an entropy sample, trimming the history to
    /// [`MAX_ENTROPY_HISTORY`] entries.
    pub fn push_entropy_sample(&mut self, sample: f64) {
        self.entropy_history.push_back(sample);
        while self.entropy_history.len() > MAX_ENTROPY_HISTORY {
            self.entropy_history.pop_front();
        }
    }

    /// Whether this glyph carries a cognitive tag, used by the coordinator's
    /// mass formula (§4.5).
    #[must_use]
    pub fn has_cognitive_tag(&self) -> bool {
        self.tags.iter().any(|tag| is_protected_tag(tag))
    }

    /// Whether this glyph is immune to cull and near-clone replacement:
    /// concepts and attractors.
    #[must_use]
    pub fn is_cull_immune(&self) -> bool {
        self.kind.is_concept() || self.attractor.is_some()
    }

    /// This glyph's reflex type, if it is a reflex glyph.
    #[must_use]
    pub fn reflex_type(&self) -> Option<ReflexType> {
        match &self.kind {
            GlyphKind::Reflex(reflex_type) => Some(*reflex_type),
            _ => None,
        }
    }

    /// This glyph's concept payload, if it is a concept glyph.
    #[must_use]
    pub fn concept_data(&self) -> Option<&ConceptData> {
        match &self.kind {
            GlyphKind::Concept(data) => Some(data),
            _ => None,
        }
    }

    /// Promotes this glyph to attractor status. A no-op if already promoted
    /// (attractor status is permanent) — callers should still append an
    /// episode via [`AttractorStatus::episodes`] on rediscovery themselves.
    pub fn promote_to_attractor(&mut self, discovered_at: u64, proxy_for: Option<GlyphId>) {
        if self.attractor.is_none() {
            self.attractor = Some(AttractorStatus {
                discovered: discovered_at,
                episodes: 1,
                proxy_for,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bare_glyph(id: GlyphId) -> Glyph {
        Glyph {
            id,
            tags: vec![],
            ancestry: vec![],
            generation: 0,
            kind: GlyphKind::Organic,
            attractor: None,
            season_born: Season::Exploration,
            entropy_history: VecDeque::new(),
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
    fn entropy_is_zero_before_first_sample() {
        let glyph = bare_glyph(1);
        assert_eq!(glyph.entropy(), 0.0);
    }

    #[test]
    fn entropy_history_stays_bounded() {
        let mut glyph = bare_glyph(1);
        for i in 0..(MAX_ENTROPY_HISTORY * 2) {
            glyph.push_entropy_sample(i as f64);
        }
        assert_eq!(glyph.entropy_history.len(), MAX_ENTROPY_HISTORY);
        assert_eq!(glyph.entropy(), (MAX_ENTROPY_HISTORY * 2 - 1) as f64);
    }

    #[test]
    fn protected_tags_are_recognized() {
        assert!(is_protected_tag("origin"));
        assert!(is_protected_tag("c#42"));
        assert!(is_protected_tag("gen:7"));
        assert!(!is_protected_tag("wild"));
    }

    #[test]
    fn attractor_promotion_is_idempotent() {
        let mut glyph = bare_glyph(1);
        glyph.promote_to_attractor(10, None);
        glyph.promote_to_attractor(20, None);
        assert_eq!(glyph.attractor.unwrap().discovered, 10);
    }
}
