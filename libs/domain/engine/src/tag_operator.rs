// [libs/domain/engine/src/tag_operator.rs]
/*!
 * =================================================================
 * APARATO: TAG OPERATOR TABLE
 * RESPONSABILIDAD: EIGENVALORES FIJOS, CONTEO DE EVOLUCIONADOS, COMPRESION
 * =================================================================
 */

use crucible_core_probabilistic::prelude::compress_tags;
use crucible_domain_models::prelude::is_protected_tag;

/// Fixed `tag -> eigenvalue` table (§4.2).
const EIGENVALUES: &[(&str, f64)] = &[
    ("wild", 2.1),
    ("ghost", 7.0),
    ("beacon", 1.4),
    ("fractal", 1.8),
    ("mirror", 1.3),
    ("flex", 1.2),
    ("resonant", 1.5),
    ("unknown", 1.0),
    ("stable", 0.85),
    ("phase", 0.95),
    ("origin", 0.90),
];

/// Clamp applied to the composite operator (§4.2).
pub const OPERATOR_CLAMP: f64 = 12.0;

/// The 11 base vocabulary tags (the [`EIGENVALUES`] table's keys), used by
/// the bootstrap/random-birth tag sampler alongside the 3 current seasonal
/// tags (§6, §9: "11 base + 3 seasonal" bootstrap vocabulary).
pub const BASE_TAGS: [&str; 11] = [
    "wild", "ghost", "beacon", "fractal", "mirror", "flex", "resonant", "unknown", "stable",
    "phase", "origin",
];

/// Tags stripped from operator computation entirely (§3): generation
/// markers and mutation markers, neither of which names a real concept.
fn is_administrative(tag: &str) -> bool {
    tag.starts_with("gen:") || tag.starts_with('\u{3bc}')
}

/// The composite tag operator: product of known eigenvalues, scaled by the
/// evolved-tag count, clamped at [`OPERATOR_CLAMP`] (§4.2).
#[must_use]
pub fn composite_operator(tags: &[String]) -> f64 {
    let mut product = 1.0_f64;
    let mut evolved_count: u32 = 0;

    for tag in tags {
        if is_administrative(tag) {
            continue;
        }
        match EIGENVALUES.iter().find(|(name, _)| *name == tag) {
            Some((_, eigenvalue)) => product *= eigenvalue,
            None => evolved_count += 1,
        }
    }

    let scaled = product * (1.0 + 0.2 * (1.0 + f64::from(evolved_count)).ln());
    scaled.min(OPERATOR_CLAMP)
}

/// Compresses a tag set per §4.2: hashed trigram/bigram/unigram
/// cosine-dedup above [`crate::config::EngineConfig::compress_sim_threshold`],
/// always preserving protected/cognitive tokens, capped at `cap`.
#[must_use]
pub fn compress(tags: &[String], similarity_floor: f64, cap: usize) -> Vec<String> {
    compress_tags(tags, similarity_floor, cap, is_protected_tag)
}
