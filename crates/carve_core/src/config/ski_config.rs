//! Dual-edge (ski) variant configuration

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct SkiConfig {
    /// Edge angle per ski at full wedge input (rad) (default: 0.35)
    pub wedge_max_edge: f32,
    /// Edges within this difference count as parallel (rad) (default: 0.1)
    pub parallel_tolerance: f32,
    /// Outside-ski pressure shift at full steer (default: 0.3)
    pub pressure_shift: f32,
    /// Grip bonus when both skis carve on the same side (default: 0.1)
    pub parallel_grip_bonus: f32,
    /// Deceleration at full wedge (m/s²) (default: 4.0)
    pub wedge_brake_decel: f32,
    /// Lateral stability gain per rad of wedge (default: 1.5)
    pub wedge_stability_gain: f32,
    /// Wedge input above which a wedge turn is reported (default: 0.1)
    pub wedge_input_threshold: f32,
}

impl Default for SkiConfig {
    fn default() -> Self {
        Self {
            wedge_max_edge: 0.35,
            parallel_tolerance: 0.1,
            pressure_shift: 0.3,
            parallel_grip_bonus: 0.1,
            wedge_brake_decel: 4.0,
            wedge_stability_gain: 1.5,
            wedge_input_threshold: 0.1,
        }
    }
}
