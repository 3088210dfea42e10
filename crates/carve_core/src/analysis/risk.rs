//! Risk / failure detector: wash-out, edge-catch and the running risk level.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::config::RiskConfig;
use crate::physics::constants::guard;
use crate::sanitize::{clamp01, finite_or_zero, non_negative, sign_with_deadband};

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct WashOut {
    pub is_washing_out: bool,
    /// 0..1
    pub intensity: f32,
    /// Follows the edge side, 0 when not washing out
    pub direction: i8,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct EdgeCatch {
    pub is_catching: bool,
    /// 0..1
    pub severity: f32,
    /// Side of the edge that caught
    pub direction: i8,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct RiskState {
    /// 0..1
    pub risk_level: f32,
    pub is_recovering: bool,
    /// Time spent below the low threshold while recovering (s)
    pub cooldown_timer: f32,
    pub prev_edge: f32,
    pub prev_edge_rate: f32,
}

fn side(edge: f32) -> i8 {
    sign_with_deadband(edge, 0.0)
}

/// Wash-out once fast enough and short of grip beyond the tolerance.
pub fn check_wash_out(speed: f32, grip_deficit: f32, edge_angle: f32, cfg: &RiskConfig) -> WashOut {
    let speed = non_negative(speed);
    let deficit = non_negative(grip_deficit);
    if speed <= cfg.washout_speed || deficit <= cfg.washout_deficit_tolerance {
        return WashOut::default();
    }
    WashOut {
        is_washing_out: true,
        intensity: clamp01(deficit / cfg.washout_full_deficit.max(guard::DIV_EPSILON)),
        direction: side(finite_or_zero(edge_angle)),
    }
}

/// Edge-catch on a fast sign reversal at speed.
pub fn check_edge_catch(
    prev_edge: f32,
    edge_angle: f32,
    dt: f32,
    speed: f32,
    cfg: &RiskConfig,
) -> EdgeCatch {
    let prev = finite_or_zero(prev_edge);
    let edge = finite_or_zero(edge_angle);
    let dt = non_negative(dt);
    let speed = non_negative(speed);

    let reversed = side(prev) * side(edge) < 0;
    if !reversed || dt <= guard::DIV_EPSILON || speed < cfg.catch_min_speed {
        return EdgeCatch::default();
    }
    let rate = (edge - prev).abs() / dt;
    if rate <= cfg.catch_rate_threshold {
        return EdgeCatch::default();
    }
    let aggressiveness = rate / cfg.catch_rate_threshold.max(guard::DIV_EPSILON);
    let speed_factor = speed / cfg.catch_speed_ref.max(guard::DIV_EPSILON);
    EdgeCatch { is_catching: true, severity: clamp01(aggressiveness * speed_factor), direction: side(edge) }
}

/// Integrate the risk level and run the recovery hysteresis.
pub fn update_risk(
    state: RiskState,
    edge_angle: f32,
    grip_deficit: f32,
    dt: f32,
    cfg: &RiskConfig,
) -> RiskState {
    let edge = finite_or_zero(edge_angle);
    let dt = non_negative(dt);
    if dt <= guard::DIV_EPSILON {
        return RiskState { prev_edge: edge, ..state };
    }

    let edge_rate = (edge - state.prev_edge) / dt;
    let jerk = (edge_rate - state.prev_edge_rate).abs() / dt;
    let jerk_push = cfg.jerk_gain * (jerk - cfg.jerk_deadband).max(0.0) / cfg.jerk_ref.max(guard::DIV_EPSILON);
    let rise = cfg.deficit_gain * non_negative(grip_deficit) + jerk_push;

    let risk_level = if rise > 0.0 {
        clamp01(state.risk_level + rise * dt)
    } else {
        clamp01(state.risk_level - cfg.decay_rate * dt)
    };

    let (is_recovering, cooldown_timer) = if !state.is_recovering {
        (risk_level >= cfg.high_threshold, 0.0)
    } else if risk_level < cfg.low_threshold {
        let timer = state.cooldown_timer + dt;
        (timer < cfg.recovery_cooldown, timer)
    } else {
        (true, 0.0)
    };

    RiskState {
        risk_level,
        is_recovering,
        cooldown_timer: if is_recovering { cooldown_timer } else { 0.0 },
        prev_edge: edge,
        prev_edge_rate: edge_rate,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DT: f32 = 1.0 / 60.0;

    #[test]
    fn test_wash_out_needs_speed_and_deficit() {
        let cfg = RiskConfig::default();
        assert!(!check_wash_out(10.0, 1.0, 0.8, &cfg).is_washing_out);
        assert!(!check_wash_out(30.0, 0.05, 0.8, &cfg).is_washing_out);

        let w = check_wash_out(30.0, 0.5, -0.8, &cfg);
        assert!(w.is_washing_out);
        assert!((w.intensity - 0.5).abs() < 1e-6);
        assert_eq!(w.direction, -1);
        assert_eq!(check_wash_out(30.0, 4.0, 0.8, &cfg).intensity, 1.0);
    }

    #[test]
    fn test_edge_catch_on_fast_reversal() {
        let cfg = RiskConfig::default();
        // 0.3 rad in one tick = 18 rad/s
        let c = check_edge_catch(0.15, -0.15, DT, 15.0, &cfg);
        assert!(c.is_catching);
        assert_eq!(c.direction, -1);
        assert!(c.severity > 0.0 && c.severity <= 1.0);
    }

    #[test]
    fn test_no_edge_catch_when_slow_or_same_side() {
        let cfg = RiskConfig::default();
        assert!(!check_edge_catch(0.15, -0.15, DT, 2.0, &cfg).is_catching);
        assert!(!check_edge_catch(0.1, 0.6, DT, 15.0, &cfg).is_catching);
        // 0.02 rad per tick = 1.2 rad/s
        assert!(!check_edge_catch(0.01, -0.01, DT, 15.0, &cfg).is_catching);
    }

    #[test]
    fn test_risk_rises_with_deficit_and_decays() {
        let cfg = RiskConfig::default();
        let mut state = RiskState::default();
        for _ in 0..30 {
            state = update_risk(state, 0.0, 0.5, DT, &cfg);
        }
        assert!((state.risk_level - 0.375).abs() < 1e-3);

        let before = state.risk_level;
        for _ in 0..30 {
            state = update_risk(state, 0.0, 0.0, DT, &cfg);
        }
        assert!((before - state.risk_level - 0.2).abs() < 1e-3);
    }

    #[test]
    fn test_jerk_below_deadband_ignored() {
        let cfg = RiskConfig::default();
        let mut state = RiskState { risk_level: 0.5, ..RiskState::default() };
        // Constant edge rate: zero jerk after the first step.
        state = update_risk(state, 0.01, 0.0, DT, &cfg);
        let level = state.risk_level;
        state = update_risk(state, 0.02, 0.0, DT, &cfg);
        assert!(state.risk_level < level);
    }

    #[test]
    fn test_recovery_hysteresis() {
        let cfg = RiskConfig::default();
        let mut state = RiskState::default();
        while !state.is_recovering {
            state = update_risk(state, 0.0, 2.0, DT, &cfg);
        }
        assert!(state.risk_level >= cfg.high_threshold);

        // Falls from ~0.8 to below 0.3 in ~1.25 s, then needs 1 s of cooldown.
        let mut elapsed = 0.0;
        while state.is_recovering {
            state = update_risk(state, 0.0, 0.0, DT, &cfg);
            elapsed += DT;
            assert!(elapsed < 5.0);
        }
        assert!(elapsed > 2.0);
        assert!(state.risk_level < cfg.low_threshold);
        assert_eq!(state.cooldown_timer, 0.0);
    }

    #[test]
    fn test_recovery_timer_resets_on_spike() {
        let cfg = RiskConfig::default();
        let state = RiskState { risk_level: 0.1, is_recovering: true, cooldown_timer: 0.9, ..RiskState::default() };
        let spiked = update_risk(state, 0.0, 20.0, DT, &cfg);
        assert!(spiked.is_recovering);
        assert_eq!(spiked.cooldown_timer, 0.0);
    }
}
