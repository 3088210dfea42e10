//! Carve quality analyzer configuration

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Perfection score weights. Must sum to 1.0.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct QualityWeights {
    pub initiation: f32,
    pub loading: f32,
    pub apex: f32,
    pub unloading: f32,
    pub symmetry: f32,
}

impl Default for QualityWeights {
    fn default() -> Self {
        Self { initiation: 0.15, loading: 0.20, apex: 0.30, unloading: 0.15, symmetry: 0.20 }
    }
}

impl QualityWeights {
    pub fn sum(&self) -> f32 {
        self.initiation + self.loading + self.apex + self.unloading + self.symmetry
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct QualityConfig {
    /// Rolling window length per phase (samples) (default: 60)
    pub window_size: usize,

    // === Initiation ===
    /// Ideal engagement rate range (rad/s) (default: 0.5 - 2.0)
    pub ideal_engagement_min: f32,
    pub ideal_engagement_max: f32,
    /// Second-derivative scale for smoothness (rad/s²) (default: 20)
    pub jerk_scale: f32,
    /// Samples used for the jerk estimate (default: 5)
    pub jerk_samples: usize,
    /// Engagement vs smoothness blend (default: 0.6)
    pub initiation_engagement_weight: f32,

    // === Loading ===
    /// Delta tolerated as "non-decreasing" (rad) (default: 0.02)
    pub loading_tolerance: f32,
    /// Variance penalty scale (default: 1000)
    pub loading_variance_scale: f32,
    /// Progression vs consistency blend (default: 0.6)
    pub loading_progress_weight: f32,

    // === Apex ===
    /// G-force that scores full marks (default: 2.0)
    pub target_g: f32,
    /// Hold vs g-force blend (default: 0.6)
    pub apex_hold_weight: f32,

    // === Unloading ===
    /// Release rate band considered controlled (rad/s) (default: 0.05 - 3.0)
    pub unload_min_rate: f32,
    pub unload_max_rate: f32,

    // === Symmetry ===
    /// Mean mirrored difference at which similarity reaches 0 (rad) (default: 0.5)
    pub symmetry_tolerance: f32,

    // === Overall ===
    pub weights: QualityWeights,
    /// Bonus at max edge depth (default: 0.05)
    pub depth_bonus: f32,
    /// Bonus at peak G >= bonus_g_ref (default: 0.05)
    pub g_bonus: f32,
    pub bonus_g_ref: f32,
    /// Perfection that counts as a perfect carve (default: 0.85)
    pub perfect_threshold: f32,

    // === Style ===
    /// Edge and speed normalizers for intensity (default: 0.9 rad, 20 m/s)
    pub style_edge_ref: f32,
    pub style_speed_ref: f32,
    /// Intensity above which a turn is aggressive (default: 0.75)
    pub aggressive_intensity: f32,
    /// Loading quality and symmetry above which a turn is technical (default: 0.7)
    pub technical_threshold: f32,
    /// Moderate edge target used for smooth-style intensity (rad) (default: 0.5)
    pub moderate_edge: f32,

    // === Records ===
    /// Turn records kept (default: 20)
    pub history_capacity: usize,
    /// Path samples stored per turn (default: 240)
    pub max_path_samples: usize,
}

impl Default for QualityConfig {
    fn default() -> Self {
        Self {
            window_size: 60,

            ideal_engagement_min: 0.5,
            ideal_engagement_max: 2.0,
            jerk_scale: 20.0,
            jerk_samples: 5,
            initiation_engagement_weight: 0.6,

            loading_tolerance: 0.02,
            loading_variance_scale: 1000.0,
            loading_progress_weight: 0.6,

            target_g: 2.0,
            apex_hold_weight: 0.6,

            unload_min_rate: 0.05,
            unload_max_rate: 3.0,

            symmetry_tolerance: 0.5,

            weights: QualityWeights::default(),
            depth_bonus: 0.05,
            g_bonus: 0.05,
            bonus_g_ref: 3.0,
            perfect_threshold: 0.85,

            style_edge_ref: 0.9,
            style_speed_ref: 20.0,
            aggressive_intensity: 0.75,
            technical_threshold: 0.7,
            moderate_edge: 0.5,

            history_capacity: 20,
            max_path_samples: 240,
        }
    }
}
