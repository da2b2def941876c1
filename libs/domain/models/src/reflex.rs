// [libs/domain/models/src/reflex.rs]
//! Typed reflex variants spawned by the reflex spawner (§4.7).

use serde::{Deserialize, Serialize};

/// The five reflex archetypes a non-reflex glyph can be turned into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReflexType {
    /// Triggered by a low ratio and a small tag set; adds `preserve, stable`.
    Defensive,
    /// Triggered during the Exploration season; adds `seek, novel, <random>`.
    Exploratory,
    /// Triggered by a large tag set and high ratio; bridges to a distant glyph.
    Collaborative,
    /// Triggered on an attractor; adds `strengthen, anchor`.
    Consolidative,
    /// The catch-all default; rewrites the tag set to `[a<=>b, reflex, transform, evolve]`.
    Metamorphic,
}
