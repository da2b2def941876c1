// [libs/domain/engine/src/observables.rs]
/*!
 * =================================================================
 * APARATO: OBSERVABLES
 * RESPONSABILIDAD: AGREGADOS MACROSCOPICOS SOBRE LA POBLACION VIVA
 * =================================================================
 *
 * Pure aggregation over the current population and resonance matrix
 * (§4.13). Called once per thermo pass; never mutates anything.
 */

use crate::resonance::ResonanceEdge;
use crucible_domain_models::prelude::{Glyph, Observables};
use std::collections::{HashMap, HashSet};

/// Computes the macroscopic observables block for the current tick.
#[must_use]
pub fn compute_observables(glyphs: &[&Glyph], resonance_matrix: &[ResonanceEdge]) -> Observables {
    let thermo_bearing: Vec<&&Glyph> = glyphs
        .iter()
        .filter(|g| g.thermodynamic_state.is_some())
        .collect();
    let n = thermo_bearing.len();

    let mean_entropy = if n == 0 {
        0.0
    } else {
        thermo_bearing.iter().map(|g| g.entropy()).sum::<f64>() / n as f64
    };

    let entropy_stddev = if n == 0 {
        0.0
    } else {
        let variance = thermo_bearing
            .iter()
            .map(|g| (g.entropy() - mean_entropy).powi(2))
            .sum::<f64>()
            / n as f64;
        variance.sqrt()
    };

    let psi = if resonance_matrix.is_empty() {
        0.0
    } else {
        resonance_matrix.iter().map(|e| e.score).sum::<f64>() / resonance_matrix.len() as f64
    };

    let mean_velocity = if n == 0 {
        0.0
    } else {
        thermo_bearing
            .iter()
            .map(|g| g.thermodynamic_state.expect("filtered above").dh_dt.abs())
            .sum::<f64>()
            / n as f64
    };

    let by_id: HashMap<u64, &Glyph> = glyphs.iter().map(|g| (g.id, *g)).collect();
    let current_j_h: f64 = resonance_matrix
        .iter()
        .filter_map(|edge| {
            let a = by_id.get(&edge.a)?;
            let b = by_id.get(&edge.b)?;
            let ta = a.thermodynamic_state?;
            let tb = b.thermodynamic_state?;
            let dist = ((a.x - b.x).powi(2) + (a.y - b.y).powi(2)).sqrt().max(1e-6);
            Some((ta.h - tb.h).abs() / dist)
        })
        .sum();

    let population = glyphs.len();
    let singularity_count = glyphs
        .iter()
        .filter(|g| g.thermodynamic_state.is_none() || !g.entropy().is_finite())
        .count() as u64;
    let singularity_fraction = if population == 0 {
        0.0
    } else {
        singularity_count as f64 / population as f64
    };

    let vocab: HashSet<&str> = glyphs
        .iter()
        .flat_map(|g| g.tags.iter().map(String::as_str))
        .collect();
    let vocab_term = (vocab.len().max(1) as f64).ln();
    let population_term = (population.max(1) as f64).ln();
    let free_energy = mean_entropy - (entropy_stddev / 100.0) * (vocab_term + population_term);

    Observables {
        mean_entropy,
        entropy_stddev,
        psi,
        mean_velocity,
        current_j_h,
        singularity_count,
        singularity_fraction,
        free_energy,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crucible_domain_models::prelude::{Glyph, GlyphKind, Season};
    use std::collections::VecDeque;

    fn bare_glyph(id: u64, x: f64, y: f64) -> Glyph {
        Glyph {
            id,
            tags: vec!["wild".to_string()],
            ancestry: vec![],
            generation: 0,
            kind: GlyphKind::Organic,
            attractor: None,
            season_born: Season::Exploration,
            entropy_history: VecDeque::new(),
            thermodynamic_state: None,
            x,
            y,
            vx: 0.0,
            vy: 0.0,
            pulse_phase: 0.0,
            last_collision_gen: None,
            stagnant_count: 0,
            birth_time: 0,
            influence_score: 0.0,
            priority: 0.0,
            mutation_rate: 0.1,
            stability: 0.0,
            entrained: false,
            entrainment_gen: None,
        }
    }

    #[test]
    fn empty_population_yields_zeroed_observables() {
        let glyphs: Vec<&Glyph> = vec![];
        let observed = compute_observables(&glyphs, &[]);
        assert_eq!(observed.mean_entropy, 0.0);
        assert_eq!(observed.singularity_fraction, 0.0);
    }

    #[test]
    fn glyphs_without_thermo_state_count_as_singularities() {
        let a = bare_glyph(1, 0.0, 0.0);
        let b = bare_glyph(2, 10.0, 10.0);
        let glyphs = vec![&a, &b];
        let observed = compute_observables(&glyphs, &[]);
        assert_eq!(observed.singularity_count, 2);
        assert_eq!(observed.singularity_fraction, 1.0);
    }
}
