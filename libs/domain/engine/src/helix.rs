// [libs/domain/engine/src/helix.rs]
/*!
 * =================================================================
 * APARATO: HELIX FEEDBACK WIRING
 * RESPONSABILIDAD: HISTORIAL ACOTADO, DETECCION DE TRANSICION, MODULACION
 * =================================================================
 *
 * Wraps the stateless oscillator in `crucible-core-math::helix` with the
 * engine-level concerns §4.12 assigns to it: bounded R/A/phase
 * histories, throttled stable/unstable transition logging, and the
 * feedback values (`breathScale`, the modulated resonance threshold, the
 * HRV tangential kick) the step orchestrator applies after each step.
 */

use crucible_core_math::prelude::{HelixParams, HelixState, StabilityWindow};
use crucible_domain_models::prelude::HelixSnapshot;
use std::collections::VecDeque;
use std::f64::consts::PI;
use tracing::info;

/// Per-tick feedback the helix step hands back to the orchestrator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HelixModulation {
    /// Multiplies every glyph's velocity this tick.
    pub breath_scale: f64,
    /// The resonance threshold to write for the *next* tick's thermo pass
    /// (§9: read by the previous tick's coordinate, written here).
    pub resonance_threshold: f64,
    /// Scales the tangential kick applied around the canvas center.
    pub hrv_kick: f64,
}

/// Owns the oscillator's scalar state, its bounded sample histories, and
/// stability-transition throttling.
#[derive(Debug, Clone)]
pub struct HelixEngine {
    params: HelixParams,
    state: HelixState,
    stability: StabilityWindow,
    r_history: VecDeque<f64>,
    a_history: VecDeque<f64>,
    phase_history: VecDeque<f64>,
    history_cap: usize,
    stable_for: u64,
    was_stable: bool,
    last_transition_gen: Option<u64>,
}

fn push_capped(history: &mut VecDeque<f64>, value: f64, cap: usize) {
    history.push_back(value);
    while history.len() > cap {
        history.pop_front();
    }
}

impl HelixEngine {
    /// A fresh oscillator at rest (§4.12's initial state block).
    #[must_use]
    pub fn new(params: HelixParams, history_cap: usize) -> Self {
        Self {
            state: HelixState::fresh(&params),
            params,
            stability: StabilityWindow::default(),
            r_history: VecDeque::new(),
            a_history: VecDeque::new(),
            phase_history: VecDeque::new(),
            history_cap,
            stable_for: 0,
            was_stable: false,
            last_transition_gen: None,
        }
    }

    /// Advances the oscillator one `dt`, appends to the bounded histories,
    /// and returns this tick's feedback modulation. `base_threshold` is the
    /// engine's configured `RESONANCE_THRESHOLD` before the `-0.08*A` term.
    pub fn step(&mut self, gen: u64, base_threshold: f64) -> HelixModulation {
        self.state.step(&self.params);

        push_capped(&mut self.r_history, self.state.r, self.history_cap);
        push_capped(&mut self.a_history, self.state.a, self.history_cap);
        let phase = self.state.theta.rem_euclid(2.0 * PI);
        push_capped(&mut self.phase_history, phase, self.history_cap);

        let r_vec: Vec<f64> = self.r_history.iter().copied().collect();
        let a_vec: Vec<f64> = self.a_history.iter().copied().collect();
        let stable = self.stability.is_stable(&r_vec, &a_vec);
        self.stable_for = if stable { self.stable_for + 1 } else { 0 };

        if stable != self.was_stable {
            let may_log = self
                .last_transition_gen
                .is_none_or(|last| gen.saturating_sub(last) >= 10);
            if may_log {
                info!(gen, stable, "helix stability transition");
                self.last_transition_gen = Some(gen);
            }
        }
        self.was_stable = stable;

        HelixModulation {
            breath_scale: 1.0 + 0.1 * self.state.r,
            resonance_threshold: base_threshold - 0.08 * self.state.a,
            hrv_kick: self.state.hrv * 0.15,
        }
    }

    /// Current `R`, for callers that want the raw scalar (tests, tangential
    /// kick direction) without a full snapshot.
    #[must_use]
    pub fn r(&self) -> f64 {
        self.state.r
    }

    /// Persisted view of this oscillator's state (§4.15).
    #[must_use]
    pub fn snapshot(&self) -> HelixSnapshot {
        HelixSnapshot {
            t: self.state.t,
            r: self.state.r,
            r_prev: self.state.r_prev,
            a: self.state.a,
            theta: self.state.theta,
            theta_prev: self.state.theta_prev,
            z: self.state.z,
            stable_for: self.stable_for,
            r_history: self.r_history.iter().copied().collect(),
            a_history: self.a_history.iter().copied().collect(),
            phase_history: self.phase_history.iter().copied().collect(),
        }
    }

    /// Rebuilds a [`HelixEngine`] from a persisted snapshot. `hrv` and `r²`
    /// are not persisted (§4.15 lists only the scalars above); both
    /// are re-derived or reset at restore since the very next `step()`
    /// overwrites them before they are read.
    #[must_use]
    pub fn restore(snapshot: &HelixSnapshot, params: HelixParams, history_cap: usize) -> Self {
        let state = HelixState {
            t: snapshot.t,
            r: snapshot.r,
            r_prev: snapshot.r_prev,
            a: snapshot.a,
            theta: snapshot.theta,
            theta_prev: snapshot.theta_prev,
            z: snapshot.z,
            hrv: 0.0,
            r_squared: snapshot.r * snapshot.r + snapshot.r_prev * snapshot.r_prev,
        };
        let r_history: VecDeque<f64> = snapshot.r_history.iter().copied().collect();
        let a_history: VecDeque<f64> = snapshot.a_history.iter().copied().collect();
        let stability = StabilityWindow::default();
        let r_vec: Vec<f64> = r_history.iter().copied().collect();
        let a_vec: Vec<f64> = a_history.iter().copied().collect();
        let was_stable = stability.is_stable(&r_vec, &a_vec);
        Self {
            state,
            params,
            stability,
            r_history,
            a_history,
            phase_history: snapshot.phase_history.iter().copied().collect(),
            history_cap,
            stable_for: snapshot.stable_for,
            was_stable,
            last_transition_gen: None,
        }
    }
}
