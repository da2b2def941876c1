// [libs/domain/models/src/thermo.rs]
//! Derived thermodynamic state (§4.3): a glyph's entropy history gets
//! folded into `(H, dH/dt, tau_coherence, phi_phase)` once per thermo pass.

use serde::{Deserialize, Serialize};

/// Derived thermodynamic state for one glyph, recomputed every thermo pass.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ThermodynamicState {
    /// Current entropy, i.e. the latest sample in the glyph's history.
    pub h: f64,
    /// Rate of entropy change over the trailing window.
    pub dh_dt: f64,
    /// Coherence time, `1 / (stddev(recent deltas) + epsilon)`.
    pub tau_coherence: f64,
    /// Normalized phase position within the last 10 samples' range, `[0, 1]`.
    pub phi_phase: f64,
    /// Generation at which this state was derived.
    pub gen: u64,
}

impl ThermodynamicState {
    /// Whether every scalar field is finite. A glyph whose thermo state
    /// fails this check is counted toward the singularity fraction
    /// (§4.13, §7) rather than treated as a hard error.
    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.h.is_finite()
            && self.dh_dt.is_finite()
            && self.tau_coherence.is_finite()
            && self.phi_phase.is_finite()
    }
}
