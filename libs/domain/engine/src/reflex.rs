// [libs/domain/engine/src/reflex.rs]
/*!
 * =================================================================
 * APARATO: REFLEX SPAWNER
 * RESPONSABILIDAD: RESPUESTAS TIPADAS A ESTANCAMIENTO/BAJA ENTROPIA
 * =================================================================
 */

use crate::arena::GlyphArena;
use crate::tag_operator::compress;
use crucible_domain_models::prelude::{Glyph, GlyphId, GlyphKind, ReflexType, Season};
use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::VecDeque;

const STAGNANT_THRESHOLD: u32 = 40;
const MAX_PER_CYCLE: usize = 3;
const DISTANT_SAMPLE_SIZE: usize = 30;

fn should_trigger(glyph: &crucible_domain_models::prelude::Glyph, mean_entropy: f64) -> bool {
    if glyph.kind.is_reflex() || glyph.kind.is_concept() {
        return false;
    }
    glyph.stagnant_count > STAGNANT_THRESHOLD
        || glyph.entropy() < 0.6 * mean_entropy
        || glyph.tags.iter().any(|t| t == "unknown")
}

fn pick_reflex_type(
    glyph: &crucible_domain_models::prelude::Glyph,
    mean_entropy: f64,
    season: Season,
) -> ReflexType {
    let ratio = if mean_entropy > 0.0 {
        glyph.entropy() / mean_entropy
    } else {
        1.0
    };
    if ratio < 0.5 && glyph.tags.len() < 3 {
        ReflexType::Defensive
    } else if glyph.tags.len() > 4 && ratio > 1.2 {
        ReflexType::Collaborative
    } else if glyph.attractor.is_some() {
        ReflexType::Consolidative
    } else if season == Season::Exploration {
        ReflexType::Exploratory
    } else {
        ReflexType::Metamorphic
    }
}

fn tag_overlap(a: &[String], b: &[String]) -> usize {
    a.iter().filter(|tag| b.contains(tag)).count()
}

fn find_distant_glyph<'a>(
    arena: &'a GlyphArena,
    from: GlyphId,
    from_tags: &[String],
    rng: &mut impl Rng,
) -> Option<&'a crucible_domain_models::prelude::Glyph> {
    let mut sample: Vec<&crucible_domain_models::prelude::Glyph> =
        arena.iter().filter(|g| g.id != from).collect();
    sample.shuffle(rng);
    sample.truncate(DISTANT_SAMPLE_SIZE);
    sample.into_iter().min_by_key(|g| tag_overlap(from_tags, &g.tags))
}

fn recipe_tags(
    reflex_type: ReflexType,
    glyph_tags: &[String],
    distant_tags: Option<&[String]>,
    rng: &mut impl Rng,
) -> Vec<String> {
    let mut tags: Vec<String> = glyph_tags.to_vec();
    tags.push("reflex".to_string());

    match reflex_type {
        ReflexType::Defensive => {
            tags.push("preserve".to_string());
            tags.push("stable".to_string());
        }
        ReflexType::Exploratory => {
            tags.push("seek".to_string());
            tags.push("novel".to_string());
            tags.push(format!("spark-{}", rng.gen_range(0..1000)));
        }
        ReflexType::Collaborative => {
            if let Some(distant) = distant_tags {
                for tag in distant.iter().take(2) {
                    tags.push(tag.clone());
                }
            }
            tags.push("bridge".to_string());
        }
        ReflexType::Consolidative => {
            tags.push("strengthen".to_string());
            tags.push("anchor".to_string());
        }
        ReflexType::Metamorphic => {
            let a = glyph_tags.first().cloned().unwrap_or_else(|| "a".to_string());
            let b = glyph_tags.get(1).cloned().unwrap_or_else(|| "b".to_string());
            return vec![
                format!("{a}\u{21cc}{b}"),
                "reflex".to_string(),
                "transform".to_string(),
                "evolve".to_string(),
            ];
        }
    }

    tags
}

/// A newly spawned reflex glyph plus the id of the organic glyph whose
/// stagnation/low-entropy/unknown-tag condition triggered it.
#[derive(Debug, Clone)]
pub struct ReflexSpawn {
    /// The triggering glyph's id, recorded as the spawn's sole ancestor.
    pub trigger: GlyphId,
    /// The new reflex glyph, with a placeholder `id: 0` for the caller to
    /// assign via [`GlyphArena::reserve_id`] before storing.
    pub glyph: Glyph,
}

/// Runs one reflex-spawner cycle (§4.7): at most [`MAX_PER_CYCLE`]
/// triggering glyphs each spawn a fresh reflex glyph (§3 "created by ...
/// reflex spawn") with `ancestry = [trigger]`; the triggering glyph itself
/// is left untouched.
pub fn run_reflex_cycle(
    arena: &GlyphArena,
    mean_entropy: f64,
    season: Season,
    gen: u64,
    similarity_floor: f64,
    cap: usize,
    rng: &mut impl Rng,
) -> Vec<ReflexSpawn> {
    let candidates: Vec<GlyphId> = arena
        .iter()
        .filter(|g| should_trigger(g, mean_entropy))
        .map(|g| g.id)
        .take(MAX_PER_CYCLE)
        .collect();

    let mut spawned = Vec::new();
    for id in candidates {
        let Some(trigger) = arena.get(id) else { continue };
        let reflex_type = pick_reflex_type(trigger, mean_entropy, season);
        let distant_tags = if reflex_type == ReflexType::Collaborative {
            find_distant_glyph(arena, id, &trigger.tags, rng).map(|g| g.tags.clone())
        } else {
            None
        };
        let recipe = recipe_tags(reflex_type, &trigger.tags, distant_tags.as_deref(), rng);
        let tags = compress(&recipe, similarity_floor, cap);

        let glyph = Glyph {
            id: 0,
            tags,
            ancestry: vec![id],
            generation: gen,
            kind: GlyphKind::Reflex(reflex_type),
            attractor: None,
            season_born: season,
            entropy_history: VecDeque::new(),
            thermodynamic_state: None,
            x: trigger.x,
            y: trigger.y,
            vx: 0.0,
            vy: 0.0,
            pulse_phase: 0.0,
            last_collision_gen: None,
            stagnant_count: 0,
            birth_time: gen,
            influence_score: 0.0,
            priority: 0.0,
            mutation_rate: 0.1,
            stability: 0.0,
            entrained: false,
            entrainment_gen: None,
        };
        spawned.push(ReflexSpawn { trigger: id, glyph });
    }

    spawned
}
