// [libs/core/math-engine/src/helix.rs]
/*!
 * =================================================================
 * APARATO: HELIX SELF-COUPLED OSCILLATOR
 * CLASIFICACIÓN: CORE MATH (ESTRATO L1)
 * RESPONSABILIDAD: INTEGRACION DE LA ODE Y DETECCION DE ESTABILIDAD
 *
 * A damped, self-referential oscillator (§4.12): its own previous
 * output `R_prev` feeds back into the phase of the next raw amplitude,
 * and the smoothed amplitude `A` shrinks as `R^2 + R_prev^2` grows. The
 * engine reads `R` and `A` once per tick to modulate glyph velocities and
 * the resonance threshold; this module only owns the scalar math, not the
 * feedback wiring (that lives in `crucible-domain-engine::helix`).
 * =================================================================
 */

use std::f64::consts::PI;

/// Tunable constants of the oscillator, matching the fixed values of §4.12.
/// Exposed as a struct (rather than bare consts) so tests can probe
/// alternate parameterizations without touching the integration logic.
#[derive(Debug, Clone, Copy)]
pub struct HelixParams {
    pub alpha: f64,
    pub beta: f64,
    pub phi: f64,
    pub omega: f64,
    pub dt: f64,
    pub gamma0: f64,
    pub epsilon: f64,
    pub lambda: f64,
    pub eta: f64,
    pub a0: f64,
}

impl Default for HelixParams {
    fn default() -> Self {
        Self {
            alpha: 1.0,
            beta: 0.824,
            phi: 1.618,
            omega: 141.0,
            dt: 0.01,
            gamma0: 0.5,
            epsilon: 0.1,
            lambda: 0.5,
            eta: 0.02,
            a0: 1.0,
        }
    }
}

/// Mutable scalar state of the oscillator between steps.
#[derive(Debug, Clone, Copy, Default)]
pub struct HelixState {
    pub t: f64,
    pub r: f64,
    pub r_prev: f64,
    pub a: f64,
    pub theta: f64,
    pub theta_prev: f64,
    pub z: f64,
    pub hrv: f64,
    pub r_squared: f64,
}

impl HelixState {
    /// Fresh state at `t = 0`, `A = A0`, everything else at rest.
    #[must_use]
    pub fn fresh(params: &HelixParams) -> Self {
        Self {
            a: params.a0,
            ..Default::default()
        }
    }

    /// Advances the oscillator by exactly one `dt`, per §4.12. Returns
    /// the gradient used internally (useful for diagnostics/tests); the
    /// state is updated in place.
    pub fn step(&mut self, params: &HelixParams) -> f64 {
        self.t += params.dt;

        self.hrv = 0.5 * (2.0 * PI * 0.2 * self.t).sin() + 0.3 * (2.0 * PI * 0.05 * self.t).sin();
        let gamma = params.gamma0 + params.epsilon * self.hrv;

        let raw_r = params.alpha * (params.beta * self.t / params.phi).exp()
            * (params.omega * self.t + gamma * self.r_prev).cos();

        self.r_squared = self.r * self.r + self.r_prev * self.r_prev;
        self.a = params.a0 / (1.0 + params.lambda * self.r_squared);

        self.r_prev = self.r;
        self.r = self.a * raw_r.tanh();

        let d_theta = params.omega * params.dt;
        let grad = self.r - self.r_prev;
        self.theta_prev = self.theta;
        self.theta += d_theta - params.eta * grad;

        let accel = (self.theta - 2.0 * self.theta_prev + (self.theta_prev - d_theta)).abs();
        self.z = self.theta / (1.0 + 10.0 * accel);

        grad
    }
}

/// Rolling stability detector over the last 20 `R` samples and last 10 `A`
/// samples, per §4.12: stable iff the average absolute step-to-step
/// change in `R` is below 0.15 AND the spread of `A` over the last 10
/// samples is below 0.05.
#[derive(Debug, Clone, Copy)]
pub struct StabilityWindow {
    pub r_delta_threshold: f64,
    pub a_spread_threshold: f64,
}

impl Default for StabilityWindow {
    fn default() -> Self {
        Self {
            r_delta_threshold: 0.15,
            a_spread_threshold: 0.05,
        }
    }
}

impl StabilityWindow {
    /// `r_history` and `a_history` are the most recent samples, oldest
    /// first; only the trailing 20 (`r`) / 10 (`a`) are examined, the
    /// fixed window sizes for stability detection.
    #[must_use]
    pub fn is_stable(&self, r_history: &[f64], a_history: &[f64]) -> bool {
        let r_window = tail(r_history, 20);
        let a_window = tail(a_history, 10);

        if r_window.len() < 2 || a_window.is_empty() {
            return false;
        }

        let mean_abs_delta: f64 = r_window
            .windows(2)
            .map(|pair| (pair[1] - pair[0]).abs())
            .sum::<f64>()
            / (r_window.len() - 1) as f64;

        let a_spread = a_window
            .first()
            .zip(a_window.last())
            .map(|(first, last)| (first - last).abs())
            .unwrap_or(f64::MAX);

        mean_abs_delta < self.r_delta_threshold && a_spread < self.a_spread_threshold
    }
}

fn tail(values: &[f64], n: usize) -> &[f64] {
    let start = values.len().saturating_sub(n);
    &values[start..]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn step_keeps_amplitude_bounded() {
        let params = HelixParams::default();
        let mut state = HelixState::fresh(&params);
        for _ in 0..500 {
            state.step(&params);
            assert!(state.r.abs() <= 1.0 + 1e-9, "R must stay in [-1, 1]");
            assert!(state.a > 0.0 && state.a <= params.a0 + 1e-9);
            assert!(state.r_squared >= 0.0);
        }
    }

    #[test]
    fn stability_window_needs_enough_history() {
        let window = StabilityWindow::default();
        assert!(!window.is_stable(&[0.0], &[0.0]));
    }

    #[test]
    fn stability_window_detects_flat_signal() {
        let window = StabilityWindow::default();
        let r = vec![0.1; 25];
        let a = vec![0.5; 12];
        assert!(window.is_stable(&r, &a));
    }

    #[test]
    fn stability_window_rejects_noisy_signal() {
        let window = StabilityWindow::default();
        let r: Vec<f64> = (0..25)
            .map(|i| if i % 2 == 0 { 0.9 } else { -0.9 })
            .collect();
        let a = vec![0.5; 12];
        assert!(!window.is_stable(&r, &a));
    }

    use proptest::prelude::*;

    proptest! {
        /// P10: `|R| <= 1`, `A` in `(0, 1]`, and `r_squared >= 0` hold after
        /// any number of steps, starting from any lambda/epsilon/eta in a
        /// physically sane range.
        #[test]
        fn step_output_stays_bounded(
            steps in 1usize..300,
            lambda in 0.0f64..5.0,
            epsilon in 0.0f64..1.0,
            eta in 0.0f64..1.0,
        ) {
            let params = HelixParams {
                lambda,
                epsilon,
                eta,
                ..HelixParams::default()
            };
            let mut state = HelixState::fresh(&params);
            for _ in 0..steps {
                state.step(&params);
                prop_assert!(state.r.abs() <= 1.0 + 1e-9);
                prop_assert!(state.a > 0.0 && state.a <= params.a0 + 1e-9);
                prop_assert!(state.r_squared >= 0.0);
            }
        }
    }
}
