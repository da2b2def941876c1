// [libs/domain/models/src/season.rs]
//! The four-phase seasonal cycle (§4.11) and its fixed per-phase
//! modifiers (§6).

use serde::{Deserialize, Serialize};

/// One phase of the `Exploration -> Consolidation -> Dormancy -> Renaissance`
/// cycle. Advancing past `Renaissance` wraps back to `Exploration`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Season {
    /// High entropy mod, resonance threshold relaxed.
    Exploration,
    /// Entropy mod below baseline, resonance threshold tightened slightly.
    Consolidation,
    /// Lowest entropy mod; candidates for the `dormant` tag accumulate.
    Dormancy,
    /// Highest entropy mod; dormant glyphs may wake with `renaissance`.
    Renaissance,
}

/// Per-season `(entropy_mod, resonance_threshold_delta, color)`, per §6.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SeasonModifiers {
    /// Multiplier applied to freshly sampled entropy.
    pub entropy_mod: f64,
    /// Added to the base resonance threshold while this season is active.
    pub resonance_threshold_delta: f64,
    /// Hex color used for this season's transition shockwave.
    pub color: &'static str,
}

impl Season {
    /// The season that follows this one in the fixed cycle.
    #[must_use]
    pub fn next(self) -> Season {
        match self {
            Season::Exploration => Season::Consolidation,
            Season::Consolidation => Season::Dormancy,
            Season::Dormancy => Season::Renaissance,
            Season::Renaissance => Season::Exploration,
        }
    }

    /// This season's fixed modifiers.
    #[must_use]
    pub fn modifiers(self) -> SeasonModifiers {
        match self {
            Season::Exploration => SeasonModifiers {
                entropy_mod: 1.2,
                resonance_threshold_delta: -0.05,
                color: "#16C0FF",
            },
            Season::Consolidation => SeasonModifiers {
                entropy_mod: 0.8,
                resonance_threshold_delta: 0.03,
                color: "#00FF96",
            },
            Season::Dormancy => SeasonModifiers {
                entropy_mod: 0.6,
                resonance_threshold_delta: 0.06,
                color: "#8F7FFF",
            },
            Season::Renaissance => SeasonModifiers {
                entropy_mod: 1.5,
                resonance_threshold_delta: -0.08,
                color: "#FF6B6B",
            },
        }
    }

    /// The three seasonal tags injected while this season is active, on top
    /// of the 11 base tags (§8 scenario 1: 11 base + 3 Exploration
    /// seasonal = 14-word vocabulary at bootstrap).
    #[must_use]
    pub fn seasonal_tags(self) -> [&'static str; 3] {
        match self {
            Season::Exploration => ["seek", "novel", "drift"],
            Season::Consolidation => ["anchor", "bind", "settle"],
            Season::Dormancy => ["still", "fade", "hollow"],
            Season::Renaissance => ["bloom", "wake", "surge"],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cycle_wraps_after_renaissance() {
        assert_eq!(Season::Exploration.next(), Season::Consolidation);
        assert_eq!(Season::Consolidation.next(), Season::Dormancy);
        assert_eq!(Season::Dormancy.next(), Season::Renaissance);
        assert_eq!(Season::Renaissance.next(), Season::Exploration);
    }

    #[test]
    fn modifiers_match_spec_table() {
        let exploration = Season::Exploration.modifiers();
        assert_eq!(exploration.entropy_mod, 1.2);
        assert_eq!(exploration.resonance_threshold_delta, -0.05);
        assert_eq!(exploration.color, "#16C0FF");
    }
}
