//! Dual-edge (ski) variant.
//!
//! Two independent edges, one per ski, each driven by the same spring-damper
//! as the board (`update_edge`) with the ski's stiffer tuning. A parallel turn
//! gives both skis the same target; wedge input pushes them to opposite sides.
//! The pair is resolved through the shared grip resolver once, with radius
//! and grip combined by pressure weight.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::config::{EdgeConfig, GripConfig, SkiConfig};
use crate::physics::edge::{calculate_target_edge, update_edge, EdgeState};
use crate::physics::grip::{resolve_geometry, ContactGeometry, GripState};
use crate::physics::snow::SnowCondition;
use crate::sanitize::{axis, clamp01, delta_time, non_negative};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum SkiTurnType {
    #[default]
    Neutral,
    Parallel,
    Wedge,
}

/// One ski.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct SkiState {
    pub edge: EdgeState,
    /// Share of the rider's weight, the pair sums to 1
    pub pressure: f32,
}

impl Default for SkiState {
    fn default() -> Self {
        Self { edge: EdgeState::default(), pressure: 0.5 }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct SkiPairState {
    pub left: SkiState,
    pub right: SkiState,
    /// Half the opening between the skis (rad), 0 when parallel
    pub wedge_angle: f32,
    pub is_parallel: bool,
    pub turn_type: SkiTurnType,
}

/// Controller input for the pair.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SkiInput {
    pub steer: f32,
    pub lean: f32,
    /// 0 = parallel, 1 = full snowplow
    pub wedge: f32,
    pub riding_switch: bool,
}

/// Per-ski edge targets `(left, right)`.
pub fn ski_targets(input: &SkiInput, edge_cfg: &EdgeConfig, ski_cfg: &SkiConfig) -> (f32, f32) {
    let base = calculate_target_edge(input.steer, input.lean, input.riding_switch, edge_cfg);
    let spread = clamp01(input.wedge) * ski_cfg.wedge_max_edge;
    (base + spread, base - spread)
}

/// Weight shifts to the outside ski: turning right loads the left ski.
pub fn ski_pressures(steer: f32, riding_switch: bool, ski_cfg: &SkiConfig) -> (f32, f32) {
    let steer = if riding_switch { -axis(steer) } else { axis(steer) };
    let left = (0.5 + ski_cfg.pressure_shift * steer).clamp(0.0, 1.0);
    let right = (1.0 - left).clamp(0.0, 1.0);
    let total = left + right;
    (left / total, right / total)
}

/// Advance both skis one step.
pub fn update_ski_pair(
    state: SkiPairState,
    input: &SkiInput,
    rail_strength: f32,
    dt: f32,
    edge_cfg: &EdgeConfig,
    ski_cfg: &SkiConfig,
) -> SkiPairState {
    let dt = delta_time(dt, edge_cfg.max_dt);
    let (left_target, right_target) = ski_targets(input, edge_cfg, ski_cfg);
    let (left_pressure, right_pressure) = ski_pressures(input.steer, input.riding_switch, ski_cfg);

    let left = SkiState {
        edge: update_edge(state.left.edge, left_target, rail_strength, dt, edge_cfg),
        pressure: left_pressure,
    };
    let right = SkiState {
        edge: update_edge(state.right.edge, right_target, rail_strength, dt, edge_cfg),
        pressure: right_pressure,
    };

    let spread = left.edge.angle - right.edge.angle;
    let wedge_angle = (spread * 0.5).max(0.0);
    let is_parallel = spread.abs() < ski_cfg.parallel_tolerance;

    let turn_type = if clamp01(input.wedge) > ski_cfg.wedge_input_threshold {
        SkiTurnType::Wedge
    } else if left.edge.angle.abs().max(right.edge.angle.abs()) > ski_cfg.parallel_tolerance {
        SkiTurnType::Parallel
    } else {
        SkiTurnType::Neutral
    };

    SkiPairState { left, right, wedge_angle, is_parallel, turn_type }
}

impl SkiPairState {
    /// Pressure-weighted signed edge, what the phase machine sees.
    pub fn effective_edge(&self) -> f32 {
        self.left.edge.angle * self.left.pressure + self.right.edge.angle * self.right.pressure
    }

    /// Both skis on the same side within tolerance.
    pub fn edges_matched(&self) -> bool {
        self.is_parallel && self.left.edge.side() == self.right.edge.side()
    }

    /// Lateral stability multiplier from the wedge.
    pub fn stability(&self, ski_cfg: &SkiConfig) -> f32 {
        1.0 + ski_cfg.wedge_stability_gain * self.wedge_angle
    }
}

/// Per-ski geometry combined by pressure weight.
pub fn ski_pair_geometry(
    pair: &SkiPairState,
    sidecut_radius: f32,
    snow_grip: f32,
    riding_switch: bool,
    grip_cfg: &GripConfig,
    ski_cfg: &SkiConfig,
) -> ContactGeometry {
    let per_ski = |ski: &SkiState| {
        ContactGeometry::from_edge(ski.edge.angle, sidecut_radius, snow_grip, riding_switch, grip_cfg)
    };
    let left = per_ski(&pair.left);
    let right = per_ski(&pair.right);
    let (wl, wr) = (pair.left.pressure, pair.right.pressure);

    let mut grip = left.grip_coefficient * wl + right.grip_coefficient * wr;
    if pair.edges_matched() {
        grip *= 1.0 + ski_cfg.parallel_grip_bonus;
    }
    grip *= pair.stability(ski_cfg);

    ContactGeometry {
        curvature: left.curvature * wl + right.curvature * wr,
        grip_coefficient: grip,
        edge_depth: left.edge_depth * wl + right.edge_depth * wr,
    }
}

/// Speed lost to the wedge this step (m/s).
pub fn wedge_braking(speed: f32, wedge_angle: f32, dt: f32, ski_cfg: &SkiConfig) -> f32 {
    let share = (non_negative(wedge_angle) / ski_cfg.wedge_max_edge.max(1e-6)).min(1.0);
    (ski_cfg.wedge_brake_decel * share * non_negative(dt)).min(non_negative(speed))
}

/// Grip resolution for the pair, wedge braking included in `speed_scrub`.
#[allow(clippy::too_many_arguments)]
pub fn resolve_ski_grip(
    prev: &GripState,
    pair: &SkiPairState,
    speed: f32,
    normal_y: f32,
    snow: &SnowCondition,
    sidecut_radius: f32,
    riding_switch: bool,
    dt: f32,
    grip_cfg: &GripConfig,
    ski_cfg: &SkiConfig,
) -> GripState {
    let snow = snow.sanitized();
    let geometry =
        ski_pair_geometry(pair, sidecut_radius, snow.grip_multiplier, riding_switch, grip_cfg, ski_cfg);
    let mut state = resolve_geometry(prev, &geometry, speed, normal_y, &snow, dt, grip_cfg);

    let dt = delta_time(dt, grip_cfg.max_dt);
    let brake = wedge_braking(state.speed, pair.wedge_angle, dt, ski_cfg);
    state.speed -= brake;
    state.speed_scrub += brake;
    state
}

#[cfg(test)]
mod tests {
    use super::*;

    const DT: f32 = 1.0 / 60.0;

    fn settle(input: SkiInput) -> SkiPairState {
        let edge_cfg = EdgeConfig::ski();
        let ski_cfg = SkiConfig::default();
        let mut pair = SkiPairState::default();
        for _ in 0..180 {
            pair = update_ski_pair(pair, &input, 0.0, DT, &edge_cfg, &ski_cfg);
        }
        pair
    }

    #[test]
    fn test_parallel_input_matches_edges() {
        let pair = settle(SkiInput { steer: 0.6, ..SkiInput::default() });
        assert!(pair.is_parallel);
        assert!(pair.edges_matched());
        assert_eq!(pair.turn_type, SkiTurnType::Parallel);
        assert!(pair.wedge_angle < 0.01);
        assert!((pair.left.edge.angle - pair.right.edge.angle).abs() < 1e-4);
    }

    #[test]
    fn test_wedge_input_opposes_edges() {
        let pair = settle(SkiInput { wedge: 1.0, ..SkiInput::default() });
        assert_eq!(pair.turn_type, SkiTurnType::Wedge);
        assert!(pair.left.edge.angle > 0.0);
        assert!(pair.right.edge.angle < 0.0);
        assert!(!pair.is_parallel);
        assert!((pair.wedge_angle - 0.35).abs() < 0.01);
        // Opposite edges cancel: a straight snowplow.
        assert!(pair.effective_edge().abs() < 0.01);
    }

    #[test]
    fn test_no_input_is_neutral() {
        let pair = settle(SkiInput::default());
        assert_eq!(pair.turn_type, SkiTurnType::Neutral);
        assert_eq!(pair.left.pressure, 0.5);
    }

    #[test]
    fn test_outside_ski_gets_pressure() {
        let cfg = SkiConfig::default();
        let (left, right) = ski_pressures(1.0, false, &cfg);
        assert!((left - 0.8).abs() < 1e-6);
        assert!((left + right - 1.0).abs() < 1e-6);
        let (left, _) = ski_pressures(-1.0, false, &cfg);
        assert!((left - 0.2).abs() < 1e-6);
        let (left, _) = ski_pressures(1.0, true, &cfg);
        assert!((left - 0.2).abs() < 1e-6);
    }

    #[test]
    fn test_skis_respond_faster_than_board() {
        let board = EdgeConfig::default();
        let ski = EdgeConfig::ski();
        let mut b = EdgeState::default();
        let mut s = EdgeState::default();
        for _ in 0..6 {
            b = update_edge(b, 0.6, 0.0, DT, &board);
            s = update_edge(s, 0.6, 0.0, DT, &ski);
        }
        assert!(s.angle > b.angle);
    }

    #[test]
    fn test_matched_edges_earn_grip_bonus() {
        let grip_cfg = GripConfig::ski();
        let ski_cfg = SkiConfig::default();
        let matched = settle(SkiInput { steer: 0.6, ..SkiInput::default() });
        let mut mismatched = matched;
        mismatched.right.edge.angle *= 0.5;
        mismatched.is_parallel = false;

        let g_matched = ski_pair_geometry(&matched, 14.0, 1.0, false, &grip_cfg, &ski_cfg);
        let g_mismatched = ski_pair_geometry(&mismatched, 14.0, 1.0, false, &grip_cfg, &ski_cfg);
        assert!(g_matched.grip_coefficient > g_mismatched.grip_coefficient);
    }

    #[test]
    fn test_wedge_brakes() {
        let grip_cfg = GripConfig::ski();
        let ski_cfg = SkiConfig::default();
        let pair = settle(SkiInput { wedge: 1.0, ..SkiInput::default() });
        let snow = SnowCondition::groomed();
        let state = resolve_ski_grip(
            &GripState::default(), &pair, 8.0, 1.0, &snow, 14.0, false, DT, &grip_cfg, &ski_cfg,
        );
        assert!(state.speed < 8.0);
        assert!(state.speed_scrub > 0.0);
        assert!(state.turn_rate.abs() < 0.1);
    }

    #[test]
    fn test_parallel_carve_turns() {
        let grip_cfg = GripConfig::ski();
        let ski_cfg = SkiConfig::default();
        let pair = settle(SkiInput { steer: 0.6, ..SkiInput::default() });
        let state = resolve_ski_grip(
            &GripState::default(), &pair, 10.0, 1.0, &SnowCondition::groomed(), 14.0, false, DT,
            &grip_cfg, &ski_cfg,
        );
        assert!(state.is_carving);
        assert!(state.turn_rate > 0.0);
        assert_eq!(state.speed, 10.0);
    }
}
