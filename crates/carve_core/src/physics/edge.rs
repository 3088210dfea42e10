//! Edge Dynamics
//!
//! Spring-damper model turning steer/lean input into a physical edge angle,
//! plus the rail commitment that feeds extra damping back into it.
//!
//! ```ignore
//! let target = calculate_target_edge(input.steer, input.lean, riding_switch, &cfg.edge);
//! let rail = update_rail(rail, edge.angle, dt, &cfg.edge);
//! let edge = update_edge(edge, target, rail.strength, dt, &cfg.edge);
//! ```

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::config::EdgeConfig;
use crate::sanitize::{axis, clamp01, clamp_symmetric, delta_time, finite_or_zero};

/// Physical edge state. `angle` is signed: positive tilts onto the
/// right-turning edge, negative onto the left-turning one.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct EdgeState {
    /// Current edge angle (rad), |angle| <= max_edge_angle
    pub angle: f32,
    /// Last target the spring pulled toward (rad)
    pub target_angle: f32,
    /// Angular velocity (rad/s)
    pub angular_velocity: f32,
}

impl EdgeState {
    pub fn new(angle: f32, max_edge: f32) -> Self {
        let angle = clamp_symmetric(angle, max_edge);
        Self { angle, target_angle: angle, angular_velocity: 0.0 }
    }

    /// -1, 0 or +1
    pub fn side(&self) -> f32 {
        if self.angle > 0.0 {
            1.0
        } else if self.angle < 0.0 {
            -1.0
        } else {
            0.0
        }
    }
}

/// Commitment to a held edge.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct RailState {
    /// 0..1
    pub strength: f32,
    /// Time spent building since the last decay (s)
    pub hold_time: f32,
    /// Low-pass of `strength`
    pub smoothed_strength: f32,
}

/// Steer/lean → target edge angle.
///
/// Forward lean only adds depth, it never steers on its own. Riding switch
/// mirrors the whole result.
pub fn calculate_target_edge(steer: f32, lean: f32, riding_switch: bool, cfg: &EdgeConfig) -> f32 {
    let max_edge = finite_or_zero(cfg.max_edge_angle).abs();
    let steer = axis(steer);
    let forward_lean = axis(lean).max(0.0);

    let depth = cfg.steer_edge_scale + forward_lean * cfg.lean_edge_bonus;
    let target = clamp_symmetric(steer * max_edge * depth, max_edge);

    if riding_switch {
        -target
    } else {
        target
    }
}

/// One spring-damper step.
///
/// Velocity integrates first, then angle with the new velocity. Crossing the
/// edge limit clamps the angle and halves the velocity instead of zeroing it.
pub fn update_edge(
    state: EdgeState,
    target_angle: f32,
    rail_strength: f32,
    dt: f32,
    cfg: &EdgeConfig,
) -> EdgeState {
    let max_edge = finite_or_zero(cfg.max_edge_angle).abs();
    let dt = delta_time(dt, cfg.max_dt);
    let target = clamp_symmetric(target_angle, max_edge);
    let rail = clamp01(rail_strength);

    let angle = clamp_symmetric(state.angle, max_edge);
    let velocity = finite_or_zero(state.angular_velocity);

    let spring = (target - angle) * cfg.spring_constant;
    let damping = -velocity * (cfg.base_damping + rail * cfg.rail_damping_bonus);

    let mut velocity = velocity + (spring + damping) * dt;
    let mut angle = angle + velocity * dt;

    if angle.abs() > max_edge {
        angle = max_edge.copysign(angle);
        velocity *= 0.5;
    }

    EdgeState { angle, target_angle: target, angular_velocity: velocity }
}

/// Rail builds while |edge| is above the rail threshold and decays otherwise.
/// `hold_time` resets the moment decay starts.
pub fn update_rail(state: RailState, edge_angle: f32, dt: f32, cfg: &EdgeConfig) -> RailState {
    let dt = delta_time(dt, cfg.max_dt);
    let edge = finite_or_zero(edge_angle).abs();

    let (strength, hold_time) = if edge > cfg.rail_threshold {
        ((state.strength + cfg.rail_build_rate * dt).min(1.0), state.hold_time + dt)
    } else {
        ((state.strength - cfg.rail_decay_rate * dt).max(0.0), 0.0)
    };

    let blend = (cfg.rail_smoothing_rate * dt).clamp(0.0, 1.0);
    let smoothed = state.smoothed_strength + (strength - state.smoothed_strength) * blend;

    RailState { strength, hold_time, smoothed_strength: clamp01(smoothed) }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DT: f32 = 1.0 / 60.0;

    #[test]
    fn test_target_scales_with_steer() {
        let cfg = EdgeConfig::default();
        let half = calculate_target_edge(0.5, 0.0, false, &cfg);
        let full = calculate_target_edge(1.0, 0.0, false, &cfg);
        assert!((full - cfg.max_edge_angle * cfg.steer_edge_scale).abs() < 1e-5);
        assert!((full - 2.0 * half).abs() < 1e-5);
    }

    #[test]
    fn test_forward_lean_adds_depth() {
        let cfg = EdgeConfig::default();
        let upright = calculate_target_edge(0.6, 0.0, false, &cfg);
        let leaning = calculate_target_edge(0.6, 1.0, false, &cfg);
        let back = calculate_target_edge(0.6, -1.0, false, &cfg);
        assert!(leaning > upright);
        assert_eq!(back, upright);
        assert_eq!(calculate_target_edge(0.0, 1.0, false, &cfg), 0.0);
    }

    #[test]
    fn test_switch_mirrors_target() {
        let cfg = EdgeConfig::default();
        let regular = calculate_target_edge(0.7, 0.4, false, &cfg);
        let switch = calculate_target_edge(0.7, 0.4, true, &cfg);
        assert_eq!(switch, -regular);
    }

    #[test]
    fn test_non_finite_input_is_zero() {
        let cfg = EdgeConfig::default();
        assert_eq!(calculate_target_edge(f32::NAN, 0.0, false, &cfg), 0.0);
        let state = update_edge(EdgeState::default(), f32::NAN, 0.0, DT, &cfg);
        assert_eq!(state.angle, 0.0);
        assert_eq!(state.target_angle, 0.0);
    }

    #[test]
    fn test_spring_converges_to_target() {
        let cfg = EdgeConfig::default();
        let mut state = EdgeState::default();
        for _ in 0..240 {
            state = update_edge(state, 0.6, 0.0, DT, &cfg);
        }
        assert!((state.angle - 0.6).abs() < 0.01, "angle {}", state.angle);
        assert!(state.angular_velocity.abs() < 0.05);
    }

    #[test]
    fn test_rail_reduces_overshoot() {
        let cfg = EdgeConfig::default();
        let peak = |rail: f32| {
            let mut state = EdgeState::default();
            let mut peak = 0.0f32;
            for _ in 0..120 {
                state = update_edge(state, 0.8, rail, DT, &cfg);
                peak = peak.max(state.angle);
            }
            peak
        };
        assert!(peak(1.0) <= peak(0.0));
    }

    #[test]
    fn test_clamp_halves_velocity() {
        let cfg = EdgeConfig::default();
        let state = EdgeState { angle: 1.19, target_angle: 1.2, angular_velocity: 6.0 };
        let next = update_edge(state, 1.2, 0.0, DT, &cfg);
        assert_eq!(next.angle, cfg.max_edge_angle);
        assert!(next.angular_velocity > 0.0);
        // The unclamped velocity would be ~5.x; halving keeps it well under that.
        assert!(next.angular_velocity < 3.5);
    }

    #[test]
    fn test_large_dt_is_capped() {
        let cfg = EdgeConfig::default();
        let a = update_edge(EdgeState::default(), 0.5, 0.0, 5.0, &cfg);
        let b = update_edge(EdgeState::default(), 0.5, 0.0, cfg.max_dt, &cfg);
        assert_eq!(a, b);
    }

    #[test]
    fn test_rail_builds_and_decays() {
        let cfg = EdgeConfig::default();
        let mut rail = RailState::default();
        for _ in 0..30 {
            rail = update_rail(rail, 0.7, DT, &cfg);
        }
        assert!((rail.strength - 0.75).abs() < 0.01);
        assert!((rail.hold_time - 0.5).abs() < 1e-3);
        assert!(rail.smoothed_strength > 0.0 && rail.smoothed_strength <= rail.strength);

        let decayed = update_rail(rail, 0.1, DT, &cfg);
        assert!(decayed.strength < rail.strength);
        assert_eq!(decayed.hold_time, 0.0);
    }

    #[test]
    fn test_rail_strength_bounded() {
        let cfg = EdgeConfig::default();
        let mut rail = RailState::default();
        for _ in 0..600 {
            rail = update_rail(rail, 1.0, DT, &cfg);
        }
        assert_eq!(rail.strength, 1.0);
        for _ in 0..600 {
            rail = update_rail(rail, 0.0, DT, &cfg);
        }
        assert_eq!(rail.strength, 0.0);
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            /// Property: the edge never leaves [-max, +max], whatever the input
            #[test]
            fn prop_edge_clamped(
                angle in -3.0f32..3.0,
                velocity in -50.0f32..50.0,
                target in -5.0f32..5.0,
                rail in -1.0f32..2.0,
                dt in 0.0f32..0.5,
                max_edge in 0.1f32..1.5,
            ) {
                let cfg = EdgeConfig { max_edge_angle: max_edge, ..EdgeConfig::default() };
                let state = EdgeState { angle, target_angle: 0.0, angular_velocity: velocity };
                let next = update_edge(state, target, rail, dt, &cfg);
                prop_assert!(next.angle.abs() <= max_edge);
                prop_assert!(next.angular_velocity.is_finite());
            }

            /// Property: switch stance exactly mirrors the target edge
            #[test]
            fn prop_switch_inversion(
                steer in -1.5f32..1.5,
                lean in -1.5f32..1.5,
                max_edge in 0.05f32..1.5,
            ) {
                let cfg = EdgeConfig { max_edge_angle: max_edge, ..EdgeConfig::default() };
                let regular = calculate_target_edge(steer, lean, false, &cfg);
                let switch = calculate_target_edge(steer, lean, true, &cfg);
                prop_assert_eq!(switch, -regular);
            }
        }
    }
}
