// [libs/domain/engine/src/coordinator.rs]
/*!
 * =================================================================
 * APARATO: COORDINATOR (COLLIDE)
 * RESPONSABILIDAD: SELECCION DE PARES, FILTRO DE ELEGIBILIDAD, SINTESIS
 * =================================================================
 */

use crate::arena::GlyphArena;
use crate::config::EngineConfig;
use crate::resonance::ResonanceEdge;
use crate::tag_operator::compress;
use crucible_domain_models::prelude::{ConceptData, Glyph, GlyphId, GlyphKind};
use rand::Rng;
use std::collections::HashMap;

/// Open collision pipes: an unordered pair that collided within the last
/// few generations may not collide again until its entry expires
/// (§4.5). Keyed by the sorted pair, valued by expiry generation.
pub type OpenPipes = HashMap<(GlyphId, GlyphId), u64>;

/// Result of one coordinator pass.
#[derive(Debug, Default)]
pub struct CoordinateOutcome {
    /// Newly synthesized offspring, not yet stored in the arena.
    pub offspring: Vec<Glyph>,
    /// Human-readable log lines for the collision log.
    pub log_lines: Vec<String>,
    /// Increment to lifetime `phaseTransitions` (resonance > ρc*).
    pub phase_transitions: u64,
    /// Increment to lifetime `criticalEvents` (resonance > ρc**).
    pub critical_events: u64,
}

/// Mass-weighted priority input (§4.5): also reused by the pressure
/// check (§4.14) to sum mass over the arena's most recent window.
pub(crate) fn mass(glyph: &Glyph) -> f64 {
    let ancestry_depth = glyph.ancestry.len() as f64;
    let cognitive_factor = if glyph.has_cognitive_tag() { 1.6 } else { 1.0 };
    (glyph.entropy() + 300.0) * (1.0 + (1.0 + ancestry_depth).ln()) * cognitive_factor
}

fn is_eligible(a: &Glyph, b: &Glyph, open_pipes: &OpenPipes, gen: u64) -> bool {
    if a.id == b.id {
        return false;
    }
    if a.ancestry.contains(&b.id) || b.ancestry.contains(&a.id) {
        return false;
    }
    let key = if a.id < b.id { (a.id, b.id) } else { (b.id, a.id) };
    if open_pipes.contains_key(&key) {
        return false;
    }
    let recent = |glyph: &Glyph| {
        glyph
            .last_collision_gen
            .is_some_and(|last| gen.saturating_sub(last) < 10)
    };
    if recent(a) || recent(b) {
        return false;
    }
    true
}

fn clean_tags<'a>(tags: &'a [String]) -> impl Iterator<Item = &'a str> {
    tags.iter()
        .map(String::as_str)
        .filter(|tag| !tag.starts_with("gen:") && !tag.starts_with('\u{3bc}'))
}

fn sample_tag<'a>(tags: &[&'a str], rng: &mut impl Rng) -> &'a str {
    if tags.is_empty() {
        "glyph"
    } else {
        tags[rng.gen_range(0..tags.len())]
    }
}

/// Synthesizes offspring tags per §4.5: union of cleaned parent tags,
/// a season-shaped mutant, an optional second mutant, and a cross-type/
/// same-type marker.
fn synthesize_tags(
    parent_a: &Glyph,
    parent_b: &Glyph,
    season: crucible_domain_models::prelude::Season,
    eff_mutation_rate: f64,
    rng: &mut impl Rng,
) -> Vec<String> {
    use crucible_domain_models::prelude::Season;

    let cleaned_a: Vec<&str> = clean_tags(&parent_a.tags).collect();
    let cleaned_b: Vec<&str> = clean_tags(&parent_b.tags).collect();

    let mut union: Vec<String> = cleaned_a
        .iter()
        .chain(cleaned_b.iter())
        .map(|tag| (*tag).to_string())
        .collect();
    union.dedup();

    let a_sample = sample_tag(&cleaned_a, rng);
    let b_sample = sample_tag(&cleaned_b, rng);

    let mutant = match season {
        Season::Exploration => format!("{a_sample}\u{2192}{b_sample}"),
        Season::Consolidation => format!("{a_sample}\u{2227}{b_sample}"),
        _ => format!("{a_sample}\u{d7}{b_sample}"),
    };
    union.push(mutant);

    if rng.gen_bool((eff_mutation_rate - 0.1).clamp(0.0, 1.0)) {
        union.push(format!("{b_sample}\u{2295}{a_sample}"));
    }

    let cross_type = parent_a.kind.is_concept() != parent_b.kind.is_concept()
        || parent_a.kind.is_reflex() != parent_b.kind.is_reflex();
    if cross_type {
        union.push("synthesis".to_string());
    }
    if parent_a.kind.is_concept() && parent_b.kind.is_concept() {
        union.push("semantic-fusion".to_string());
    }

    union
}

/// Runs one coordinator pass: selects up to 5 eligible pairs from
/// `resonance_matrix` by mass-weighted priority, synthesizes offspring for
/// each, and records the new open pipes / collision bookkeeping directly on
/// the arena's glyphs.
#[allow(clippy::too_many_arguments)]
pub fn coordinate(
    arena: &mut GlyphArena,
    resonance_matrix: &[ResonanceEdge],
    open_pipes: &mut OpenPipes,
    season: crucible_domain_models::prelude::Season,
    gen: u64,
    config: &EngineConfig,
    rng: &mut impl Rng,
) -> CoordinateOutcome {
    let mut outcome = CoordinateOutcome::default();

    let mut scored: Vec<(ResonanceEdge, f64)> = resonance_matrix
        .iter()
        .filter_map(|edge| {
            let a = arena.get(edge.a)?;
            let b = arena.get(edge.b)?;
            if !is_eligible(a, b, open_pipes, gen) {
                return None;
            }
            let priority = edge.score * ((mass(a) + mass(b)) / 2000.0).sqrt();
            Some((*edge, priority))
        })
        .collect();

    scored.sort_by(|lhs, rhs| rhs.1.partial_cmp(&lhs.1).unwrap_or(std::cmp::Ordering::Equal));
    scored.truncate(5);

    for (edge, _) in scored {
        let key = if edge.a < edge.b {
            (edge.a, edge.b)
        } else {
            (edge.b, edge.a)
        };
        open_pipes.insert(key, gen + 5);

        let (eff_mutation_rate, offspring) = {
            let parent_a = arena.get(edge.a).expect("edge endpoint resolved above");
            let parent_b = arena.get(edge.b).expect("edge endpoint resolved above");

            let eff_mutation_rate = (parent_a.mutation_rate + parent_b.mutation_rate) / 2.0;
            let tags = synthesize_tags(parent_a, parent_b, season, eff_mutation_rate, rng);
            let tags = compress(&tags, config.compress_sim_threshold, config.max_tags_per_glyph);

            let both_concept = parent_a.kind.is_concept() && parent_b.kind.is_concept();
            let kind = if both_concept {
                GlyphKind::Concept(ConceptData {
                    technical: String::new(),
                    confidence: 0.5,
                    keywords: Vec::new(),
                })
            } else {
                GlyphKind::Organic
            };

            let x = (parent_a.x + parent_b.x) / 2.0 + rng.gen_range(-10.0..10.0);
            let y = (parent_a.y + parent_b.y) / 2.0 + rng.gen_range(-10.0..10.0);

            let mutation_rate = 0.1 + (eff_mutation_rate - 0.1) * 0.7;
            let priority = (parent_a.priority + parent_b.priority) * 0.3;

            let mut offspring = Glyph {
                id: 0,
                tags,
                ancestry: vec![parent_a.id, parent_b.id],
                generation: gen,
                kind,
                attractor: None,
                season_born: season,
                entropy_history: std::collections::VecDeque::new(),
                thermodynamic_state: None,
                x,
                y,
                vx: 0.0,
                vy: 0.0,
                pulse_phase: 0.0,
                last_collision_gen: None,
                stagnant_count: 0,
                birth_time: gen,
                influence_score: 0.0,
                priority,
                mutation_rate,
                stability: 0.0,
                entrained: false,
                entrainment_gen: None,
            };

            if edge.score > config.resonance_threshold {
                let avg_entropy = (parent_a.entropy() + parent_b.entropy()) / 2.0;
                let amplified =
                    avg_entropy * (1.0 + 0.28 * (edge.score - config.resonance_threshold));
                offspring.entropy_history.push_back(amplified.min(10000.0));
            }

            (eff_mutation_rate, offspring)
        };
        let _ = eff_mutation_rate;

        if let Some(parent_a) = arena.get_mut(edge.a) {
            parent_a.last_collision_gen = Some(gen);
            parent_a.stagnant_count = 0;
        }
        if let Some(parent_b) = arena.get_mut(edge.b) {
            parent_b.last_collision_gen = Some(gen);
            parent_b.stagnant_count = 0;
        }

        outcome.log_lines.push(format!(
            "collide {} x {} -> offspring (score {:.3})",
            edge.a, edge.b, edge.score
        ));
        if edge.score > config.phase_transition_threshold {
            outcome.phase_transitions += 1;
        }
        if edge.score > config.critical_point_threshold {
            outcome.critical_events += 1;
        }
        outcome.offspring.push(offspring);
    }

    outcome
}
