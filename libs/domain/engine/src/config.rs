// [libs/domain/engine/src/config.rs]
//! Constants that must match exactly for behavioral compatibility
//! (§6). Bundled into a struct, rather than bare consts, so a test harness
//! can construct an engine with a shrunk population cap or interval without
//! touching the step logic — every sub-phase reads its cadence from here.

use crucible_core_math::prelude::HelixParams;

/// Canvas width, logical units (§6).
pub const CANVAS_WIDTH: f64 = 1200.0;
/// Canvas height, logical units (§6).
pub const CANVAS_HEIGHT: f64 = 600.0;

/// All tunable engine parameters, defaulted to the §6 table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EngineConfig {
    /// Base resonance threshold before season/helix modulation.
    pub resonance_threshold: f64,
    /// ρc*, the phase-transition threshold.
    pub phase_transition_threshold: f64,
    /// ρc**, the critical-point threshold.
    pub critical_point_threshold: f64,
    /// Thermo/resonance/observables cadence, in generations.
    pub beacon_update_interval: u64,
    /// Reflex spawner cadence.
    pub reflex_interval: u64,
    /// Influence & attractor detector cadence.
    pub influence_interval: u64,
    /// Deep-analysis snapshot cadence.
    pub deep_analysis_interval: u64,
    /// Pool detection cadence.
    pub pool_scan_interval: u64,
    /// Singularity scan cadence.
    pub singularity_scan_interval: u64,
    /// Entrainment cycle cadence.
    pub entrainment_interval: u64,
    /// Pressure-check cadence.
    pub pressure_interval: u64,
    /// Pressure-check mass threshold.
    pub pressure_mass_threshold: f64,
    /// Hit count required to promote a living parent to attractor.
    pub attractor_threshold: u32,
    /// Hit count required to promote a proxy for a culled progenitor.
    pub attractor_proxy_threshold: u32,
    /// The "half-hbar" commutator trace floor for pool activation.
    pub hbar_over_2: f64,
    /// Ticks per season.
    pub season_duration: u64,
    /// Max tags per glyph after compression.
    pub max_tags_per_glyph: usize,
    /// Cosine-similarity floor for tag-compression dedup.
    pub compress_sim_threshold: f64,
    /// Stochastic resonance sample budget per rebuild.
    pub resonance_sample_size: usize,
    /// Resonance matrix capacity.
    pub resonance_matrix_cap: usize,
    /// Arena population cap.
    pub max_glyphs: usize,
    /// Collision log capacity.
    pub collision_log_cap: usize,
    /// Event log capacity.
    pub event_log_cap: usize,
    /// Evolved-tags ring capacity.
    pub evolved_tags_cap: usize,
    /// Tag-signature index rolling capacity (on snapshot).
    pub tag_signature_cap: usize,
    /// Active-shortcut list capacity.
    pub shortcut_cap: usize,
    /// Helix sample-history capacity (R, A, phase).
    pub helix_history_cap: usize,
    /// LCG seed for the singularity scanner's projection table.
    pub singularity_lcg_seed: u64,
    /// Parameters fed to the helix ODE integrator.
    pub helix_params: HelixParams,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            resonance_threshold: 0.45,
            phase_transition_threshold: 0.93,
            critical_point_threshold: 0.997,
            beacon_update_interval: 8,
            reflex_interval: 25,
            influence_interval: 50,
            deep_analysis_interval: 100,
            pool_scan_interval: 20,
            singularity_scan_interval: 40,
            entrainment_interval: 10,
            pressure_interval: 30,
            pressure_mass_threshold: 1.5e6,
            attractor_threshold: 3,
            attractor_proxy_threshold: 4,
            hbar_over_2: 0.527,
            season_duration: 200,
            max_tags_per_glyph: 8,
            compress_sim_threshold: 0.82,
            resonance_sample_size: 3000,
            resonance_matrix_cap: 200,
            max_glyphs: 1000,
            collision_log_cap: 500,
            event_log_cap: 50,
            evolved_tags_cap: 500,
            tag_signature_cap: 500,
            shortcut_cap: 80,
            helix_history_cap: 200,
            singularity_lcg_seed: 47,
            helix_params: HelixParams::default(),
        }
    }
}

impl EngineConfig {
    /// Builds a config, starting from [`EngineConfig::default`] and letting
    /// the caller override fields via a closure — the common pattern for
    /// tests that shrink a cap or cadence without restating the whole table.
    #[must_use]
    pub fn with_config(mutate: impl FnOnce(&mut EngineConfig)) -> Self {
        let mut config = Self::default();
        mutate(&mut config);
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_spec_table() {
        let config = EngineConfig::default();
        assert_eq!(config.resonance_threshold, 0.45);
        assert_eq!(config.max_glyphs, 1000);
        assert_eq!(config.season_duration, 200);
        assert_eq!(config.singularity_lcg_seed, 47);
    }

    #[test]
    fn with_config_overrides_only_requested_fields() {
        let config = EngineConfig::with_config(|c| c.max_glyphs = 50);
        assert_eq!(config.max_glyphs, 50);
        assert_eq!(config.season_duration, 200);
    }
}
