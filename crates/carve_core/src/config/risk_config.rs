//! Risk / failure detector configuration

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct RiskConfig {
    // === Wash-out ===
    /// Wash-out needs at least this speed (m/s) (default: 12)
    pub washout_speed: f32,
    /// Grip deficit tolerated before wash-out (default: 0.1)
    pub washout_deficit_tolerance: f32,
    /// Deficit at which wash-out intensity saturates (default: 1.0)
    pub washout_full_deficit: f32,

    // === Edge-catch ===
    /// Edge reversal rate that catches an edge (rad/s) (default: 6.0)
    pub catch_rate_threshold: f32,
    /// Minimum speed for an edge-catch (m/s) (default: 5.0)
    pub catch_min_speed: f32,
    /// Speed at which severity is fully scaled (m/s) (default: 20)
    pub catch_speed_ref: f32,

    // === Risk level ===
    /// Risk added per unit deficit per second (default: 1.5)
    pub deficit_gain: f32,
    /// Risk added per second at reference jerk (default: 0.8)
    pub jerk_gain: f32,
    /// Edge jerk normalizer (rad/s²) (default: 50)
    pub jerk_ref: f32,
    /// Jerk below this is ignored (rad/s²) (default: 5)
    pub jerk_deadband: f32,
    /// Decay while nothing pushes risk up (per s) (default: 0.4)
    pub decay_rate: f32,

    // === Recovery hysteresis ===
    pub high_threshold: f32,
    pub low_threshold: f32,
    /// Time below low_threshold before recovery clears (s) (default: 1.0)
    pub recovery_cooldown: f32,
}

impl Default for RiskConfig {
    fn default() -> Self {
        Self {
            washout_speed: 12.0,
            washout_deficit_tolerance: 0.1,
            washout_full_deficit: 1.0,

            catch_rate_threshold: 6.0,
            catch_min_speed: 5.0,
            catch_speed_ref: 20.0,

            deficit_gain: 1.5,
            jerk_gain: 0.8,
            jerk_ref: 50.0,
            jerk_deadband: 5.0,
            decay_rate: 0.4,

            high_threshold: 0.8,
            low_threshold: 0.3,
            recovery_cooldown: 1.0,
        }
    }
}
