// [libs/domain/models/src/stats.rs]
//! Aggregate counters and observables exposed by `get_stats` (§4.13,
//! §6). These are read-only views; nothing outside the engine constructs
//! them directly.

use crate::season::Season;
use crate::snapshot::HelixSnapshot;
use serde::{Deserialize, Serialize};

/// Macroscopic observables, recomputed every thermo pass (§4.13).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct Observables {
    /// Mean entropy across live glyphs with thermo state.
    pub mean_entropy: f64,
    /// Standard deviation of entropy.
    pub entropy_stddev: f64,
    /// Order parameter, the mean resonance score over the current matrix.
    pub psi: f64,
    /// Mean absolute rate of entropy change.
    pub mean_velocity: f64,
    /// Entropy current summed over resonance-matrix edges.
    pub current_j_h: f64,
    /// Count of glyphs with missing or non-finite thermo state.
    pub singularity_count: u64,
    /// Singularity fraction, `singularity_count / population`.
    pub singularity_fraction: f64,
    /// Free energy, `mean_entropy - (entropy_stddev/100)*(ln(vocab)+ln(n))`.
    pub free_energy: f64,
}

/// A point-in-time summary captured every [`crate::glyph::Glyph`]
/// `deep_analysis_interval` ticks (§4.13), distinct from the
/// continuously-refreshed [`Observables`] block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeepAnalysisSnapshot {
    /// Generation the snapshot was taken at.
    pub generation: u64,
    /// Live population at that generation.
    pub population: u64,
    /// Mean entropy across live glyphs with thermo state.
    pub mean_entropy: f64,
    /// Current season.
    pub season: Season,
    /// Number of glyphs currently promoted to attractor.
    pub attractor_count: u64,
    /// Singularity fraction at the time of the snapshot.
    pub singularity_fraction: f64,
}

/// Aggregate engine counters and the most recent deep-analysis snapshot,
/// returned by `get_stats` (§6).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct EngineStats {
    /// Current generation.
    pub generation: u64,
    /// Current live population.
    pub population: u64,
    /// Lifetime concept-injection count.
    pub concept_count: u64,
    /// Lifetime phase-transition count (resonance crossed ρc*).
    pub phase_transitions: u64,
    /// Lifetime critical-event count (resonance crossed ρc**).
    pub critical_events: u64,
    /// Number of glyphs currently promoted to attractor.
    pub attractor_count: u64,
    /// Number of currently active pool shortcuts.
    pub active_shortcut_count: u64,
    /// Most recent observables snapshot.
    pub observables: Observables,
    /// Current helix block (§4.12).
    pub helix: HelixSnapshot,
    /// Most recent deep-analysis snapshot, if one has run yet.
    pub last_deep_analysis: Option<DeepAnalysisSnapshot>,
}
