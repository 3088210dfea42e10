//! Turn-phase state machine configuration

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct PhaseConfig {
    /// |edge| that starts a turn (rad) (default: 0.15)
    pub carve_threshold: f32,
    /// A turn releases below carve_threshold * release_ratio (default: 0.8)
    pub release_ratio: f32,
    /// Running peak estimate never drops below this (rad) (default: 0.8)
    pub nominal_peak_edge: f32,
    /// Below this speed the machine stays Neutral (m/s) (default: 0.5)
    pub min_speed: f32,

    // === Dwell times (s) ===
    pub min_initiation_time: f32,
    pub min_loading_time: f32,
    pub min_apex_time: f32,

    // === Peak fractions ===
    /// Initiation -> Loading once |edge| >= estimate * this (default: 0.5)
    pub loading_fraction: f32,
    /// Loading -> Apex once |edge| >= estimate * this (default: 0.85)
    pub apex_threshold: f32,
    /// Apex -> Unloading once |edge| < peak * this (default: 0.7)
    pub unload_threshold: f32,
    /// Edge growth below this counts as a plateau (rad/s) (default: 0.15)
    pub plateau_rate: f32,

    /// Expected duration of each phase, used only for progress (s) (default: 0.25)
    pub nominal_phase_duration: f32,
}

impl Default for PhaseConfig {
    fn default() -> Self {
        Self {
            carve_threshold: 0.15,
            release_ratio: 0.8,
            nominal_peak_edge: 0.8,
            min_speed: 0.5,

            min_initiation_time: 0.15,
            min_loading_time: 0.1,
            min_apex_time: 0.1,

            loading_fraction: 0.5,
            apex_threshold: 0.85,
            unload_threshold: 0.7,
            plateau_rate: 0.15,

            nominal_phase_duration: 0.25,
        }
    }
}

impl PhaseConfig {
    /// Threshold below which an active turn releases.
    #[inline]
    pub fn release_threshold(&self) -> f32 {
        self.carve_threshold * self.release_ratio
    }
}
