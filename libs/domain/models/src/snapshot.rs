// [libs/domain/models/src/snapshot.rs]
//! The stable serialization schema (§4.15). `GlyphSnapshot` and
//! `EngineSnapshot` are deliberately narrower than the live `Glyph`/engine
//! state: only the fields named as persisted make the cut, so a format
//! change in a cache (resonance matrix, pools) never breaks round-tripping.

use crate::concept::ConceptData;
use crate::ids::GlyphId;
use crate::reflex::ReflexType;
use crate::role::AttractorStatus;
use crate::season::Season;
use serde::{Deserialize, Serialize};

/// Per-glyph persisted fields (§4.15).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GlyphSnapshot {
    /// See [`crate::glyph::Glyph::id`].
    pub id: GlyphId,
    /// See [`crate::glyph::Glyph::tags`].
    pub tags: Vec<String>,
    /// See [`crate::glyph::Glyph::ancestry`].
    pub ancestry: Vec<GlyphId>,
    /// See [`crate::glyph::Glyph::generation`].
    pub generation: u64,
    /// Last 20 entropy samples, newest last (a trailing window of the live
    /// glyph's full history).
    pub entropy_history_tail: Vec<f64>,
    /// See [`crate::glyph::Glyph::x`].
    pub x: f64,
    /// See [`crate::glyph::Glyph::y`].
    pub y: f64,
    /// See [`crate::glyph::Glyph::vx`].
    pub vx: f64,
    /// See [`crate::glyph::Glyph::vy`].
    pub vy: f64,
    /// See [`crate::glyph::Glyph::last_collision_gen`].
    pub last_collision_gen: Option<u64>,
    /// Whether the live glyph's kind was `Concept`.
    pub is_concept: bool,
    /// Whether the live glyph's kind was `Reflex`.
    pub is_reflex: bool,
    /// The live glyph's reflex type, if any.
    pub reflex_type: Option<ReflexType>,
    /// Whether the live glyph had been promoted to attractor.
    pub is_attractor: bool,
    /// See [`crate::glyph::Glyph::season_born`].
    pub season_born: Season,
    /// See [`crate::glyph::Glyph::stagnant_count`].
    pub stagnant_count: u32,
    /// See [`crate::glyph::Glyph::influence_score`].
    pub influence_score: f64,
    /// See [`crate::glyph::Glyph::priority`].
    pub priority: f64,
    /// See [`crate::glyph::Glyph::mutation_rate`].
    pub mutation_rate: f64,
    /// See [`crate::glyph::Glyph::stability`].
    pub stability: f64,
    /// The live glyph's concept payload, if any.
    pub concept_data: Option<ConceptData>,
}

/// Persisted helix block: scalar state plus bounded sample histories
/// (§4.15).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct HelixSnapshot {
    /// Current time parameter `t`.
    pub t: f64,
    /// Current `R`.
    pub r: f64,
    /// Previous `R`.
    pub r_prev: f64,
    /// Current smoothed amplitude `A`.
    pub a: f64,
    /// Current phase `theta`.
    pub theta: f64,
    /// Previous phase `theta_prev`.
    pub theta_prev: f64,
    /// Derived `z`.
    pub z: f64,
    /// Consecutive stable steps.
    pub stable_for: u64,
    /// Last 100 `R` samples.
    pub r_history: Vec<f64>,
    /// Last 100 `A` samples.
    pub a_history: Vec<f64>,
    /// Last 100 `theta mod 2*pi` samples.
    pub phase_history: Vec<f64>,
}

/// One entry in the persisted attractor map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttractorEntry {
    /// The attractor glyph's id (or proxy id).
    pub id: GlyphId,
    /// The attractor's status block.
    pub status: AttractorStatus,
}

/// Full engine snapshot (§4.15). Restoring replays a thermo and
/// resonance pass to reconstitute derived state that is intentionally not
/// persisted (§4.15 "On restore").
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineSnapshot {
    /// Every live glyph, in arena order.
    pub glyphs: Vec<GlyphSnapshot>,
    /// Next id to be assigned.
    pub next_id: GlyphId,
    /// Current generation.
    pub generation: u64,
    /// Last 50 collision log entries, newest last.
    pub collision_log_tail: Vec<String>,
    /// Last 30 event log entries, newest first (per §3's engine state).
    pub event_log_tail: Vec<String>,
    /// Lifetime concept-injection count.
    pub concept_count: u64,
    /// Last 100 evolved tags.
    pub evolved_tags_tail: Vec<String>,
    /// Last 500 tag signatures (sorted-joined tag sets), rolling window.
    pub tag_signatures_tail: Vec<String>,
    /// Current season.
    pub season: Season,
    /// Ticks elapsed in the current season.
    pub season_counter: u64,
    /// Promoted attractors, keyed by id in the vector above.
    pub attractors: Vec<AttractorEntry>,
    /// Persisted helix block.
    pub helix: HelixSnapshot,
}
