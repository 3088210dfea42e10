//! Edge dynamics configuration (spring-damper + rail commitment)

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Spring-damper parameters for one edge (board, or a single ski).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct EdgeConfig {
    // === Limits ===
    /// Maximum physical edge angle (rad) (default: 1.2)
    pub max_edge_angle: f32,
    /// Largest timestep accepted by one update (s) (default: 0.1)
    pub max_dt: f32,

    // === Input mapping ===
    /// Fraction of max edge reached at full steer (default: 0.85)
    pub steer_edge_scale: f32,
    /// Extra edge fraction from full forward lean (default: 0.15)
    pub lean_edge_bonus: f32,

    // === Spring-damper ===
    /// Spring stiffness toward the target angle (default: 80)
    pub spring_constant: f32,
    /// Base angular damping (default: 10)
    pub base_damping: f32,
    /// Extra damping at full rail strength (default: 6)
    pub rail_damping_bonus: f32,

    // === Rail commitment ===
    /// |edge| above which rail strength builds (rad) (default: 0.35)
    pub rail_threshold: f32,
    /// Rail build rate (per s) (default: 1.5)
    pub rail_build_rate: f32,
    /// Rail decay rate (per s) (default: 3.0)
    pub rail_decay_rate: f32,
    /// Low-pass rate of the smoothed strength (per s) (default: 8.0)
    pub rail_smoothing_rate: f32,
}

impl Default for EdgeConfig {
    fn default() -> Self {
        Self {
            max_edge_angle: 1.2,
            max_dt: 0.1,

            steer_edge_scale: 0.85,
            lean_edge_bonus: 0.15,

            spring_constant: 80.0,
            base_damping: 10.0,
            rail_damping_bonus: 6.0,

            rail_threshold: 0.35,
            rail_build_rate: 1.5,
            rail_decay_rate: 3.0,
            rail_smoothing_rate: 8.0,
        }
    }
}

impl EdgeConfig {
    /// Ski edges: stiffer spring, lighter rail damping.
    pub fn ski() -> Self {
        Self {
            spring_constant: 140.0,
            base_damping: 14.0,
            rail_damping_bonus: 4.0,
            ..Self::default()
        }
    }

    /// Arcade: snappier edges, rails commit faster
    pub fn arcade() -> Self {
        Self {
            spring_constant: 110.0,
            rail_build_rate: 2.2,
            rail_decay_rate: 2.5,
            ..Self::default()
        }
    }
}
