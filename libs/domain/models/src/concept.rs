// [libs/domain/models/src/concept.rs]
//! Concept injection: the one-way contract with the external LLM extraction
//! pipeline (§1). `ConceptInput` is the wire-level request; `ConceptData`
//! is what survives on the resulting glyph.

use serde::{Deserialize, Serialize};

/// Payload carried by a concept glyph, opaque to every component except the
/// renderer and the public API's read-only iterators.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConceptData {
    /// Technical description supplied at injection.
    pub technical: String,
    /// Confidence in `[0, 1]`, clamped at injection time (§7).
    pub confidence: f64,
    /// Keyword tags that seeded this concept, beyond `concept`/`c#{id}`.
    pub keywords: Vec<String>,
}

/// The `inject_concept` request shape (§6).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConceptInput {
    /// External id, used to form the `c#{id}` protected tag.
    pub id: u64,
    /// Technical description, stored verbatim in [`ConceptData`].
    pub technical: String,
    /// Human-readable gloss; not stored, present for parity with the
    /// external pipeline's request shape.
    pub plain: String,
    /// Confidence in `[0, 1]`; out-of-range values are clamped rather than
    /// rejected (§7 — injection never fails).
    pub confidence: f64,
    /// Seed keywords; a missing list is treated as empty.
    pub keywords: Vec<String>,
}

impl ConceptInput {
    /// Confidence clamped into `[0, 1]`, per §7's injection precondition.
    #[must_use]
    pub fn clamped_confidence(&self) -> f64 {
        self.confidence.clamp(0.0, 1.0)
    }
}
