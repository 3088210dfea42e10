//! Grip / skid resolver configuration

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Centripetal force-balance parameters.
///
/// `carve_buffer` and the engagement curve are tuned for feel, not derived
/// from snow mechanics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct GripConfig {
    /// Rider + equipment mass (kg) (default: 75)
    pub rider_mass: f32,

    // === Grip coefficient ===
    /// Base grip coefficient at full engagement (default: 2.6)
    pub base_grip: f32,
    /// Hard cap on the grip coefficient (default: 3.0)
    pub max_grip: f32,
    /// Engagement at a flat base (default: 0.3)
    pub min_engagement: f32,
    /// Edge angle of full engagement (rad) (default: 0.9)
    pub optimal_edge: f32,
    /// Engagement lost between optimal and max edge (default: 0.15)
    pub over_edge_falloff: f32,
    /// Grip multiplier while riding switch (default: 0.9)
    pub switch_penalty: f32,

    // === Carve decision ===
    /// Forgiveness before slip: carve iff required <= available * buffer (default: 1.15)
    pub carve_buffer: f32,

    // === Turn radius ===
    /// Floor for sin(|edge|) (default: 0.01)
    pub sin_floor: f32,
    /// Minimum physical turn radius (m) (default: 3.0)
    pub min_turn_radius: f32,
    /// Radius tightening per unit flex*pressure (default: 0.2)
    pub flex_radius_factor: f32,

    // === Speed handling ===
    /// Longest step integrated per call (s); must cover the rider step (default: 0.1)
    pub max_dt: f32,
    /// Below this speed the resolver is bypassed (m/s) (default: 0.5)
    pub min_speed: f32,
    /// Turn-rate decay toward zero while bypassed (per s) (default: 4.0)
    pub turn_rate_decay: f32,

    // === Skid ===
    /// Slip angle at infinite deficit (rad) (default: 0.6)
    pub max_slip_angle: f32,
    /// Turn-rate loss at max slip (default: 0.6)
    pub skid_turn_reduction: f32,
    /// Speed scrub coefficient (m/s² per rad·rad) (default: 12.0)
    pub skid_scrub_rate: f32,

    // === Carve quality accumulator ===
    /// Gain while carving (per s) (default: 0.5)
    pub carve_gain_rate: f32,
    /// Loss while skidding (per s) (default: 1.2)
    pub skid_decay_rate: f32,
}

impl Default for GripConfig {
    fn default() -> Self {
        Self {
            rider_mass: 75.0,

            base_grip: 2.6,
            max_grip: 3.0,
            min_engagement: 0.3,
            optimal_edge: 0.9,
            over_edge_falloff: 0.15,
            switch_penalty: 0.9,

            carve_buffer: 1.15,

            sin_floor: 0.01,
            min_turn_radius: 3.0,
            flex_radius_factor: 0.2,

            max_dt: 0.1,
            min_speed: 0.5,
            turn_rate_decay: 4.0,

            max_slip_angle: 0.6,
            skid_turn_reduction: 0.6,
            skid_scrub_rate: 12.0,

            carve_gain_rate: 0.5,
            skid_decay_rate: 1.2,
        }
    }
}

impl GripConfig {
    /// Skis: shorter sidecut, tighter minimum radius.
    pub fn ski() -> Self {
        Self { min_turn_radius: 1.5, ..Self::default() }
    }

    /// Arcade: more forgiving buffer, more grip
    pub fn arcade() -> Self {
        Self { carve_buffer: 1.2, base_grip: 2.9, skid_scrub_rate: 9.0, ..Self::default() }
    }

    /// Simulation: less grip, stricter buffer
    pub fn simulation() -> Self {
        Self { carve_buffer: 1.05, base_grip: 2.3, skid_scrub_rate: 15.0, ..Self::default() }
    }
}
