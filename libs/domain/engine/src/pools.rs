// [libs/domain/engine/src/pools.rs]
/*!
 * =================================================================
 * APARATO: POOL / SHORTCUT SYSTEM
 * RESPONSABILIDAD: CLUSTERING ESPACIAL, ACTIVACION POR NO-CONMUTACION, GRAVEDAD
 * =================================================================
 */

use crate::config::EngineConfig;
use crate::resonance::resonance_with;
use crucible_core_math::prelude::{CommutatorTest, Matrix2};
use crucible_domain_models::prelude::{Glyph, GlyphId};
use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::HashSet;

const POOL_RADIUS: f64 = 120.0;
const MAX_POOL_MEMBERS: usize = 5;
const MIN_POOL_MEMBERS: usize = 3;
const MAX_POOLS_PER_CYCLE: usize = 6;
const SAMPLE_CAP: usize = 200;
const MIN_POPULATION: usize = 15;
const MIN_GEN: u64 = 50;

/// A spatial cluster of resonant glyphs detected this cycle.
#[derive(Debug, Clone)]
pub struct Pool {
    /// Member glyph ids, 3 to 5.
    pub members: Vec<GlyphId>,
    /// Whether the commutator test activated this pool into shortcuts.
    pub activated: bool,
}

/// A permanent undirected gravitational edge between two glyph ids.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Shortcut {
    pub a: GlyphId,
    pub b: GlyphId,
    /// Frobenius norm of the activating pool's commutator, captured at
    /// creation and reused by every subsequent gravity pull (§4.10) so
    /// the pull strength doesn't require re-deriving thermo state from two
    /// glyphs that may since have drifted or been culled.
    pub commutator_norm: f64,
}

fn distance(a: &Glyph, b: &Glyph) -> f64 {
    ((a.x - b.x).powi(2) + (a.y - b.y).powi(2)).sqrt()
}

/// Greedily clusters glyphs within [`POOL_RADIUS`] and actual resonance above
/// `threshold`, up to [`MAX_POOL_MEMBERS`] per pool and [`MAX_POOLS_PER_CYCLE`]
/// pools total (§4.10). No-op below [`MIN_POPULATION`] thermo-bearing
/// glyphs or before [`MIN_GEN`].
pub fn detect_pools(
    glyphs: &[&Glyph],
    threshold: f64,
    gen: u64,
    rng: &mut impl Rng,
) -> Vec<Pool> {
    if gen < MIN_GEN {
        return Vec::new();
    }
    let thermo_bearing: Vec<&Glyph> = glyphs
        .iter()
        .filter(|g| g.thermodynamic_state.is_some())
        .copied()
        .collect();
    if thermo_bearing.len() < MIN_POPULATION {
        return Vec::new();
    }

    let mut sample: Vec<&Glyph> = thermo_bearing.clone();
    sample.shuffle(rng);
    sample.truncate(SAMPLE_CAP);

    let mut used: HashSet<GlyphId> = HashSet::new();
    let mut pools: Vec<Pool> = Vec::new();

    for &seed in &sample {
        if pools.len() >= MAX_POOLS_PER_CYCLE {
            break;
        }
        if used.contains(&seed.id) {
            continue;
        }

        let mut members = vec![seed.id];
        used.insert(seed.id);

        for &candidate in &sample {
            if members.len() >= MAX_POOL_MEMBERS {
                break;
            }
            if used.contains(&candidate.id) {
                continue;
            }
            if distance(seed, candidate) > POOL_RADIUS {
                continue;
            }
            let resonates = resonance_with(seed, candidate).is_some_and(|score| score > threshold);
            if !resonates {
                continue;
            }
            members.push(candidate.id);
            used.insert(candidate.id);
        }

        if members.len() >= MIN_POOL_MEMBERS {
            pools.push(Pool {
                members,
                activated: false,
            });
        }
    }

    pools
}

/// Evaluates the commutator-activation test for a pool's two highest-entropy
/// members (§4.10) and returns the shortcut edges it should emit, if any.
#[must_use]
pub fn activate_pool(pool: &Pool, glyphs: &[&Glyph], config: &EngineConfig) -> Vec<Shortcut> {
    let mut ranked: Vec<&Glyph> = pool
        .members
        .iter()
        .filter_map(|&id| glyphs.iter().find(|g| g.id == id).copied())
        .collect();
    ranked.sort_by(|a, b| b.entropy().partial_cmp(&a.entropy()).unwrap_or(std::cmp::Ordering::Equal));

    let (Some(hi), Some(lo)) = (ranked.first(), ranked.get(1)) else {
        return Vec::new();
    };
    let (Some(ta), Some(tb)) = (hi.thermodynamic_state, lo.thermodynamic_state) else {
        return Vec::new();
    };

    let g = Matrix2::new(
        ta.phi_phase * ta.tau_coherence,
        ta.phi_phase * tb.tau_coherence,
        tb.phi_phase * ta.tau_coherence,
        tb.phi_phase * tb.tau_coherence,
    );
    let g_prime = Matrix2::new(
        ta.h / 8000.0 + ta.dh_dt.abs() / 50.0,
        (ta.h - tb.h) / 16000.0,
        (tb.h - ta.h) / 16000.0,
        tb.h / 8000.0 + tb.dh_dt.abs() / 50.0,
    );

    let test = CommutatorTest::evaluate(&g, &g_prime);
    if !test.activates(0.001, config.hbar_over_2) {
        return Vec::new();
    }

    let mut edges = Vec::new();
    for i in 0..pool.members.len() {
        for j in (i + 1)..pool.members.len() {
            edges.push(Shortcut {
                a: pool.members[i],
                b: pool.members[j],
                commutator_norm: test.commutator_norm,
            });
        }
    }
    edges
}

/// Symmetric gravity pull applied along a live shortcut's connecting line
/// (§4.10): `min(0.3, 0.8 * ||commutator|| / dist)` toward each other.
#[must_use]
pub fn shortcut_gravity(commutator_norm: f64, dx: f64, dy: f64) -> (f64, f64) {
    let dist = (dx * dx + dy * dy).sqrt().max(1e-6);
    let pull = (0.8 * commutator_norm / dist).min(0.3);
    (pull * dx / dist, pull * dy / dist)
}
