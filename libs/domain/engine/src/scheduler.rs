// [libs/domain/engine/src/scheduler.rs]
/*!
 * =================================================================
 * APARATO: PLANIFICADOR ESTACIONAL
 * RESPONSABILIDAD: AVANCE DE TEMPORADA, DORMANCIA, RENACIMIENTO
 * =================================================================
 */

use crate::arena::GlyphArena;
use crate::config::EngineConfig;
use crate::thermo::calc_entropy;
use crucible_domain_models::prelude::Season;
use rand::Rng;

/// Entropy ceiling below which a stagnant glyph qualifies for dormancy
/// (§4.11). Kept exactly as specified even though it reads low relative to
/// v3-operator-boosted entropies, producing fewer dormant glyphs than the
/// design probably intended: flagged rather than silently corrected (§9).
const DORMANCY_ENTROPY_FLOOR: f64 = 2000.0;
const DORMANCY_STAGNANT_FLOOR: u32 = 80;
const RENAISSANCE_WAKE_PROBABILITY: f64 = 0.3;

/// Outcome of one season-advance check.
#[derive(Debug, Default)]
pub struct SeasonAdvanceOutcome {
    /// `Some(new_season)` if a transition fired this tick.
    pub transitioned_to: Option<Season>,
    /// Number of glyphs newly tagged `dormant` (entering Dormancy only).
    pub dormant_count: usize,
    /// Number of glyphs that woke from dormancy (entering Renaissance only).
    pub woken_count: usize,
}

/// Advances the season if `season_counter` has reached
/// [`EngineConfig::season_duration`], applying the dormancy sweep on entry to
/// `Dormancy` and the renaissance wake sweep on entry to `Renaissance`
/// (§4.11). Returns the new `season_counter` alongside the outcome.
pub fn advance_season(
    arena: &mut GlyphArena,
    season: Season,
    season_counter: u64,
    config: &EngineConfig,
    rng: &mut impl Rng,
) -> (Season, u64, SeasonAdvanceOutcome) {
    let mut outcome = SeasonAdvanceOutcome::default();
    if season_counter < config.season_duration {
        return (season, season_counter + 1, outcome);
    }

    let next = season.next();
    outcome.transitioned_to = Some(next);

    match next {
        Season::Dormancy => {
            for glyph in arena.iter().map(|g| g.id).collect::<Vec<_>>() {
                let Some(glyph) = arena.get_mut(glyph) else { continue };
                if glyph.kind.is_concept() || glyph.attractor.is_some() {
                    continue;
                }
                if glyph.stagnant_count > DORMANCY_STAGNANT_FLOOR
                    && glyph.entropy() < DORMANCY_ENTROPY_FLOOR
                    && !glyph.tags.iter().any(|t| t == "dormant")
                {
                    glyph.tags.push("dormant".to_string());
                    outcome.dormant_count += 1;
                }
            }
        }
        Season::Renaissance => {
            for id in arena.iter().map(|g| g.id).collect::<Vec<_>>() {
                let is_dormant = arena.get(id).is_some_and(|g| g.tags.iter().any(|t| t == "dormant"));
                if !is_dormant || !rng.gen_bool(RENAISSANCE_WAKE_PROBABILITY) {
                    continue;
                }
                let resampled = {
                    let glyph = arena.get(id).expect("id resolved above");
                    calc_entropy(glyph, next, true, rng)
                };
                if let Some(glyph) = arena.get_mut(id) {
                    glyph.tags.retain(|t| t != "dormant");
                    glyph.tags.push("renaissance".to_string());
                    glyph.stagnant_count = 0;
                    glyph.push_entropy_sample(resampled);
                    outcome.woken_count += 1;
                }
            }
        }
        Season::Exploration | Season::Consolidation => {}
    }

    (next, 0, outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crucible_domain_models::prelude::{Glyph, GlyphKind};
    use rand::SeedableRng;
    use std::collections::VecDeque;

    fn glyph(id: u64, entropy: f64, stagnant: u32) -> Glyph {
        Glyph {
            id,
            tags: vec![],
            ancestry: vec![],
            generation: 0,
            kind: GlyphKind::Organic,
            attractor: None,
            season_born: Season::Exploration,
            entropy_history: VecDeque::from(vec![entropy]),
            thermodynamic_state: None,
            x: 0.0,
            y: 0.0,
            vx: 0.0,
            vy: 0.0,
            pulse_phase: 0.0,
            last_collision_gen: None,
            stagnant_count: stagnant,
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
    fn counter_increments_without_transition() {
        let mut arena = GlyphArena::new();
        let config = EngineConfig::default();
        let mut rng = rand::rngs::StdRng::seed_from_u64(1);
        let (season, counter, outcome) =
            advance_season(&mut arena, Season::Exploration, 5, &config, &mut rng);
        assert_eq!(season, Season::Exploration);
        assert_eq!(counter, 6);
        assert!(outcome.transitioned_to.is_none());
    }

    #[test]
    fn entering_dormancy_tags_stagnant_low_entropy_glyphs() {
        let mut arena = GlyphArena::new();
        let config = EngineConfig::default();
        let id = arena.reserve_id();
        arena.store(glyph(id, 100.0, 100), &config);
        let mut rng = rand::rngs::StdRng::seed_from_u64(1);
        let (season, counter, outcome) = advance_season(
            &mut arena,
            Season::Consolidation,
            config.season_duration,
            &config,
            &mut rng,
        );
        assert_eq!(season, Season::Dormancy);
        assert_eq!(counter, 0);
        assert_eq!(outcome.dormant_count, 1);
        assert!(arena.get(id).unwrap().tags.contains(&"dormant".to_string()));
    }
}
