// [libs/domain/models/src/role.rs]
//! Glyph role, encoded as a tagged sum rather than the three independent
//! booleans the original design used (§9's redesign note): attractor
//! status is kept separate since it is orthogonal — a concept or reflex
//! glyph can *become* an attractor without changing kind.

use crate::concept::ConceptData;
use crate::ids::GlyphId;
use crate::reflex::ReflexType;
use serde::{Deserialize, Serialize};

/// What a glyph fundamentally is. Exactly one variant applies at any time;
/// attractor status is tracked alongside this in [`AttractorStatus`], not as
/// a fourth variant here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "data")]
pub enum GlyphKind {
    /// An ordinary glyph born from the random-birth or collision paths.
    Organic,
    /// Injected by the external concept pipeline, or born from two concept
    /// parents (§4.5).
    Concept(ConceptData),
    /// Spawned by the reflex spawner in response to stagnation (§4.7).
    Reflex(ReflexType),
}

impl GlyphKind {
    /// Whether this glyph counts as a concept for resonance multipliers and
    /// collision-offspring inheritance rules.
    #[must_use]
    pub fn is_concept(&self) -> bool {
        matches!(self, GlyphKind::Concept(_))
    }

    /// Whether this glyph counts as a reflex for resonance multipliers and
    /// entrainment eligibility.
    #[must_use]
    pub fn is_reflex(&self) -> bool {
        matches!(self, GlyphKind::Reflex(_))
    }
}

/// Attractor status is permanent once awarded: once `Some`, a glyph's
/// status never reverts to `None`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AttractorStatus {
    /// Generation at which this glyph was first promoted.
    pub discovered: u64,
    /// Number of times this lineage has been rediscovered since promotion.
    pub episodes: u32,
    /// If this glyph stands in for a culled progenitor, that progenitor's id
    /// (§4.8's proxy-attractor path).
    pub proxy_for: Option<GlyphId>,
}
