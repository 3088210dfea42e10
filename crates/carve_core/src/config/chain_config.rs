//! Transition timing & carve chain configuration

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct ChainConfig {
    // === Transition timing (s) ===
    /// Reversals faster than this are panicked (default: 0.3)
    pub panic_threshold: f32,
    pub panic_multiplier: f32,
    /// Reversals slower than this lost momentum (default: 1.8)
    pub lost_momentum_threshold: f32,
    pub lost_momentum_multiplier: f32,
    /// Sweet spot center and half-width (default: 0.8 ± 0.4)
    pub ideal_interval: f32,
    pub sweet_spot_half_width: f32,
    /// Bonus at the exact center (default: 0.175)
    pub max_timing_bonus: f32,

    // === Clean turn ===
    /// Peak |edge| a clean turn must exceed (rad) (default: 0.5)
    pub clean_edge_threshold: f32,
    /// Time at or above clean_edge_threshold (s) (default: 0.25)
    pub min_hold_time: f32,
    pub max_chain: u8,

    // === Energy ===
    pub energy_gain: f32,
    pub energy_drain: f32,

    // === Arc shape (degrees of heading change) ===
    pub j_turn_degrees: f32,
    pub c_turn_degrees: f32,
    pub wiggle_multiplier: f32,
    pub j_turn_multiplier: f32,
    pub c_turn_multiplier: f32,

    // === Flow ===
    pub flow_gain: f32,
    pub flow_loss: f32,
    /// Continuous decay (per s)
    pub flow_decay: f32,
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            panic_threshold: 0.3,
            panic_multiplier: 0.4,
            lost_momentum_threshold: 1.8,
            lost_momentum_multiplier: 0.5,
            ideal_interval: 0.8,
            sweet_spot_half_width: 0.4,
            max_timing_bonus: 0.175,

            clean_edge_threshold: 0.5,
            min_hold_time: 0.25,
            max_chain: 10,

            energy_gain: 0.15,
            energy_drain: 0.25,

            j_turn_degrees: 30.0,
            c_turn_degrees: 60.0,
            wiggle_multiplier: 0.5,
            j_turn_multiplier: 1.0,
            c_turn_multiplier: 1.3,

            flow_gain: 0.2,
            flow_loss: 0.3,
            flow_decay: 0.05,
        }
    }
}

impl ChainConfig {
    /// Arcade: wider sweet spot, gentler penalties
    pub fn arcade() -> Self {
        Self {
            sweet_spot_half_width: 0.5,
            panic_multiplier: 0.6,
            lost_momentum_multiplier: 0.7,
            min_hold_time: 0.2,
            ..Self::default()
        }
    }

    /// Simulation: narrow sweet spot
    pub fn simulation() -> Self {
        Self { sweet_spot_half_width: 0.3, clean_edge_threshold: 0.6, ..Self::default() }
    }
}
