// [libs/domain/engine/src/thermo.rs]
/*!
 * =================================================================
 * APARATO: ENTROPY & THERMO CALCULATOR
 * RESPONSABILIDAD: MUESTREO DE ENTROPIA Y ESTADO TERMODINAMICO DERIVADO
 * =================================================================
 */

use crate::tag_operator::composite_operator;
use crucible_core_math::prelude::EPSILON;
use crucible_domain_models::prelude::{Glyph, GlyphKind, Season, ThermodynamicState};
use rand::Rng;

/// Clamp applied to organic entropy samples (§4.3).
const ORGANIC_CLAMP: f64 = 8000.0;
/// Clamp applied to renaissance-born samples before the organic re-clamp.
const RENAISSANCE_BOOST: f64 = 1.1;
/// Clamp applied to concept entropy samples.
const CONCEPT_CLAMP: f64 = 10000.0;

/// `calcEntropy` (§4.3): a fresh entropy sample for `glyph`, given the
/// season active when it is sampled and whether it was born during a
/// renaissance wake (which gets an extra boost before re-clamping).
pub fn calc_entropy(
    glyph: &Glyph,
    season: Season,
    born_in_renaissance: bool,
    rng: &mut impl Rng,
) -> f64 {
    let uniform: f64 = rng.gen_range(0..58) as f64;
    let base = glyph.tags.len() as f64 * 42.0 + uniform + glyph.generation.min(100) as f64 * 10.0;
    let season_mod = season.modifiers().entropy_mod;
    let operator_product = composite_operator(&glyph.tags);
    let sample = base * season_mod * operator_product;

    match &glyph.kind {
        GlyphKind::Concept(data) => (sample + data.confidence * 500.0).min(CONCEPT_CLAMP),
        _ if born_in_renaissance => (sample * RENAISSANCE_BOOST).min(ORGANIC_CLAMP),
        _ => sample.min(ORGANIC_CLAMP),
    }
}

/// `updateThermodynamics` (§4.3): derives `(H, dH/dt, tau, phi)` from
/// `history`, the glyph's entropy samples after the newest has already been
/// appended and trimmed by the caller.
#[must_use]
pub fn derive_thermodynamic_state(history: &[f64], gen: u64) -> ThermodynamicState {
    let h = *history.last().unwrap_or(&0.0);

    let window = history.len().min(10);
    let dh_dt = if window > 0 {
        let reference = history[history.len() - window];
        (h - reference) / window as f64
    } else {
        0.0
    };

    let tau_coherence = coherence_time(history);
    let phi_phase = phase_position(history);

    ThermodynamicState {
        h,
        dh_dt,
        tau_coherence,
        phi_phase,
        gen,
    }
}

/// `1 / (stddev(recent pair-differences) + epsilon)` over up to 20 recent
/// samples; falls back to `1.0` with fewer than 6 samples (§4.3).
fn coherence_time(history: &[f64]) -> f64 {
    let window = tail(history, 21);
    if window.len() < 6 {
        return 1.0;
    }
    let deltas: Vec<f64> = window.windows(2).map(|pair| pair[1] - pair[0]).collect();
    let mean = deltas.iter().sum::<f64>() / deltas.len() as f64;
    let variance =
        deltas.iter().map(|d| (d - mean).powi(2)).sum::<f64>() / deltas.len() as f64;
    1.0 / (variance.sqrt() + EPSILON)
}

/// Normalized position of the last sample within the min-max range of the
/// last 10 samples; falls back to `0.5` with fewer than 2 samples in range
/// (§4.3).
fn phase_position(history: &[f64]) -> f64 {
    let window = tail(history, 10);
    if window.len() < 2 {
        return 0.5;
    }
    let min = window.iter().cloned().fold(f64::INFINITY, f64::min);
    let max = window.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    let span = max - min;
    if span <= EPSILON {
        0.5
    } else {
        ((*window.last().unwrap() - min) / span).clamp(0.0, 1.0)
    }
}

fn tail(values: &[f64], n: usize) -> &[f64] {
    let start = values.len().saturating_sub(n);
    &values[start..]
}
