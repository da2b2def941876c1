// [libs/domain/models/src/lib.rs]
#![deny(missing_docs)]

//! Shared vocabulary for the simulation core: glyphs, roles, thermodynamic
//! state, seasons, concept payloads, and the stable snapshot schema. This
//! crate is pure data — no stepping logic lives here, only the types the
//! domain engine mutates and the renderer/persistence layers read.

/// Concept injection payload and the wire-level request shape.
pub mod concept;
/// The glyph entity and its invariants.
pub mod glyph;
/// Stable glyph identifiers.
pub mod ids;
/// Typed reflex variants.
pub mod reflex;
/// Glyph kind (role) and attractor status.
pub mod role;
/// The four-phase seasonal cycle and its modifiers.
pub mod season;
/// Aggregate counters and macroscopic observables.
pub mod stats;
/// The stable serialization schema.
pub mod snapshot;
/// Derived per-glyph thermodynamic state.
pub mod thermo;

/// Convenience re-export of this crate's public surface.
pub mod prelude {
    pub use crate::concept::{ConceptData, ConceptInput};
    pub use crate::glyph::{
        is_protected_tag, Glyph, MAX_ANCESTRY, MAX_ENTROPY_HISTORY, MAX_TAGS_PER_GLYPH,
        PROTECTED_TAGS,
    };
    pub use crate::ids::GlyphId;
    pub use crate::reflex::ReflexType;
    pub use crate::role::{AttractorStatus, GlyphKind};
    pub use crate::season::{Season, SeasonModifiers};
    pub use crate::snapshot::{AttractorEntry, EngineSnapshot, GlyphSnapshot, HelixSnapshot};
    pub use crate::stats::{DeepAnalysisSnapshot, EngineStats, Observables};
    pub use crate::thermo::ThermodynamicState;
}
