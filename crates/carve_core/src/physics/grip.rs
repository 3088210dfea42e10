//! Grip / Skid Resolver
//!
//! Centripetal force balance between what the turn demands and what the edge
//! can hold:
//!
//! ```text
//! radius     = sidecut / max(sin|edge|, sin_floor)      (>= min_turn_radius)
//! required   = mass * v² / radius
//! available  = mu(|edge|) * N,  mu = base * engagement * snow * switch  (<= max_grip)
//! carving   <=> required <= available * carve_buffer
//! ```
//!
//! On a skid the deficit ratio becomes a slip angle that cuts the turn rate
//! and scrubs forward speed (slip * edge * friction). That scrub is the main
//! way a skid slows the rider; a clean carve loses nothing here.
//!
//! `resolve_grip` is the board entry point. The ski variant builds its own
//! [`ContactGeometry`] per ski and calls [`resolve_geometry`] once with the
//! combined result.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use tracing::trace;

use crate::config::GripConfig;
use crate::physics::constants::{contact::MIN_NORMAL_Y, guard, GRAVITY};
use crate::physics::snow::SnowCondition;
use crate::sanitize::{clamp01, delta_time, finite_or_zero, non_negative};

// ============================================================
// Geometry
// ============================================================

/// Effective turn radius for a sidecut at an edge angle.
///
/// Infinite on a flat base; otherwise non-increasing in |edge| and never
/// below `min_turn_radius`.
pub fn calculate_turn_radius(sidecut_radius: f32, edge_angle: f32, cfg: &GripConfig) -> f32 {
    let edge = finite_or_zero(edge_angle).abs().min(std::f32::consts::FRAC_PI_2);
    if edge <= guard::FLAT_EDGE {
        return f32::INFINITY;
    }
    let sidecut = non_negative(sidecut_radius);
    let sin_edge = edge.sin().max(cfg.sin_floor);
    (sidecut / sin_edge).max(cfg.min_turn_radius)
}

/// Sidecut shortened by flex under pressure. A soft board bends into a
/// tighter arc when loaded.
pub fn flexed_sidecut(sidecut_radius: f32, board_flex: f32, pressure: f32, cfg: &GripConfig) -> f32 {
    let bend = cfg.flex_radius_factor * clamp01(board_flex) * non_negative(pressure).min(2.0);
    non_negative(sidecut_radius) * (1.0 - bend).max(0.5)
}

/// Centripetal acceleration in g. Zero for an infinite or degenerate radius.
pub fn calculate_g_force(speed: f32, radius: f32) -> f32 {
    let speed = non_negative(speed);
    if !radius.is_finite() || radius <= guard::DIV_EPSILON {
        return 0.0;
    }
    speed * speed / (radius * GRAVITY)
}

/// Gravity plus centripetal, in g.
pub fn total_g_force(lateral_g: f32) -> f32 {
    (1.0 + lateral_g * lateral_g).sqrt()
}

/// m * v² / r, zero for an infinite radius.
pub fn required_centripetal_force(mass: f32, speed: f32, radius: f32) -> f32 {
    calculate_g_force(speed, radius) * GRAVITY * non_negative(mass)
}

// ============================================================
// Grip
// ============================================================

/// 0..1 engagement of the edge. Smoothstep up to the optimal edge, then a
/// mild linear falloff toward 90°.
pub fn edge_engagement(edge_angle: f32, cfg: &GripConfig) -> f32 {
    let edge = finite_or_zero(edge_angle).abs();
    let optimal = cfg.optimal_edge.max(guard::DIV_EPSILON);

    if edge <= optimal {
        let t = edge / optimal;
        let s = t * t * (3.0 - 2.0 * t);
        cfg.min_engagement + (1.0 - cfg.min_engagement) * s
    } else {
        let span = (std::f32::consts::FRAC_PI_2 - optimal).max(guard::DIV_EPSILON);
        let over = ((edge - optimal) / span).clamp(0.0, 1.0);
        1.0 - cfg.over_edge_falloff * over
    }
}

/// Grip coefficient, capped at `max_grip`.
pub fn grip_coefficient(
    edge_angle: f32,
    snow_grip: f32,
    riding_switch: bool,
    cfg: &GripConfig,
) -> f32 {
    let switch = if riding_switch { cfg.switch_penalty } else { 1.0 };
    let mu = cfg.base_grip * edge_engagement(edge_angle, cfg) * non_negative(snow_grip) * switch;
    mu.clamp(0.0, cfg.max_grip)
}

/// Slope-normal force on the rider (N).
pub fn normal_force(mass: f32, normal_y: f32) -> f32 {
    let ny = finite_or_zero(normal_y);
    let ny = if ny <= 0.0 { 1.0 } else { ny.clamp(MIN_NORMAL_Y, 1.0) };
    non_negative(mass) * GRAVITY * ny
}

// ============================================================
// Resolver
// ============================================================

/// One contact (board, ski, or the pressure-weighted pair).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContactGeometry {
    /// Signed 1/m; sign follows the edge side, 0 when flat
    pub curvature: f32,
    pub grip_coefficient: f32,
    /// |edge| used for scrub (rad)
    pub edge_depth: f32,
}

impl ContactGeometry {
    pub fn from_edge(
        edge_angle: f32,
        sidecut_radius: f32,
        snow_grip: f32,
        riding_switch: bool,
        cfg: &GripConfig,
    ) -> Self {
        let edge = finite_or_zero(edge_angle);
        let radius = calculate_turn_radius(sidecut_radius, edge, cfg);
        let curvature = if radius.is_finite() { edge.signum() / radius } else { 0.0 };
        Self {
            curvature,
            grip_coefficient: grip_coefficient(edge, snow_grip, riding_switch, cfg),
            edge_depth: edge.abs(),
        }
    }

    pub fn radius(&self) -> f32 {
        if self.curvature.abs() <= guard::DIV_EPSILON {
            f32::INFINITY
        } else {
            1.0 / self.curvature.abs()
        }
    }
}

/// Board contact input for one tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GripInput {
    /// Signed edge angle (rad)
    pub edge_angle: f32,
    /// Forward speed (m/s)
    pub speed: f32,
    pub sidecut_radius: f32,
    /// 0 = stiff, 1 = soft
    pub board_flex: f32,
    /// Load on the edge, 1.0 = body weight
    pub pressure: f32,
    /// Y component of the slope normal
    pub normal_y: f32,
    pub riding_switch: bool,
    pub snow: SnowCondition,
}

impl Default for GripInput {
    fn default() -> Self {
        Self {
            edge_angle: 0.0,
            speed: 0.0,
            sidecut_radius: 7.0,
            board_flex: 0.0,
            pressure: 1.0,
            normal_y: 1.0,
            riding_switch: false,
            snow: SnowCondition::groomed(),
        }
    }
}

/// Result of one grip resolution.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GripState {
    /// Effective turn radius (m); infinite when straight
    #[serde(with = "infinite_as_none")]
    pub turn_radius: f32,
    /// Centripetal g
    pub g_force: f32,
    /// Gravity + centripetal g
    pub total_g: f32,
    pub required_force: f32,
    pub available_force: f32,
    pub grip_coefficient: f32,
    /// How far required exceeds buffered available, as a fraction (0 while carving)
    pub grip_deficit: f32,
    pub is_carving: bool,
    pub is_skidding: bool,
    pub slip_angle: f32,
    /// Signed heading rate (rad/s)
    pub turn_rate: f32,
    /// Forward speed after scrub (m/s)
    pub speed: f32,
    /// Speed removed this tick (m/s)
    pub speed_scrub: f32,
    /// Accumulated carve quality, 0..1
    pub carve_quality: f32,
}

impl Default for GripState {
    fn default() -> Self {
        Self {
            turn_radius: f32::INFINITY,
            g_force: 0.0,
            total_g: 1.0,
            required_force: 0.0,
            available_force: 0.0,
            grip_coefficient: 0.0,
            grip_deficit: 0.0,
            is_carving: false,
            is_skidding: false,
            slip_angle: 0.0,
            turn_rate: 0.0,
            speed: 0.0,
            speed_scrub: 0.0,
            carve_quality: 0.0,
        }
    }
}

/// Board entry point.
pub fn resolve_grip(prev: &GripState, input: &GripInput, dt: f32, cfg: &GripConfig) -> GripState {
    let snow = input.snow.sanitized();
    let sidecut = flexed_sidecut(input.sidecut_radius, input.board_flex, input.pressure, cfg);
    let geometry = ContactGeometry::from_edge(
        input.edge_angle,
        sidecut,
        snow.grip_multiplier,
        input.riding_switch,
        cfg,
    );
    resolve_geometry(prev, &geometry, input.speed, input.normal_y, &snow, dt, cfg)
}

/// Shared force balance for any contact geometry.
pub fn resolve_geometry(
    prev: &GripState,
    geometry: &ContactGeometry,
    speed: f32,
    normal_y: f32,
    snow: &SnowCondition,
    dt: f32,
    cfg: &GripConfig,
) -> GripState {
    let dt = delta_time(dt, cfg.max_dt);
    let speed = non_negative(speed);
    let mu = geometry.grip_coefficient.clamp(0.0, cfg.max_grip);
    let available = mu * normal_force(cfg.rider_mass, normal_y);

    // Standing still: no turn to resolve, let the heading rate bleed off.
    if speed < cfg.min_speed {
        let decay = (1.0 - cfg.turn_rate_decay * dt).max(0.0);
        return GripState {
            grip_coefficient: mu,
            available_force: available,
            turn_rate: prev.turn_rate * decay,
            speed,
            carve_quality: prev.carve_quality,
            ..GripState::default()
        };
    }

    let radius = geometry.radius();
    if !radius.is_finite() {
        return GripState {
            grip_coefficient: mu,
            available_force: available,
            speed,
            carve_quality: prev.carve_quality,
            ..GripState::default()
        };
    }

    let g_force = calculate_g_force(speed, radius);
    let required = required_centripetal_force(cfg.rider_mass, speed, radius);
    let budget = (available * cfg.carve_buffer).max(guard::DIV_EPSILON);
    let is_carving = required <= budget;

    let carve_rate = speed * geometry.curvature;
    let (grip_deficit, slip_angle, turn_rate, speed_scrub) = if is_carving {
        (0.0, 0.0, carve_rate, 0.0)
    } else {
        let ratio = required / budget;
        let slip = cfg.max_slip_angle * (1.0 - 1.0 / ratio);
        let slip_share = slip / cfg.max_slip_angle.max(guard::DIV_EPSILON);
        let turn_rate = carve_rate * (1.0 - cfg.skid_turn_reduction * slip_share).max(0.0);
        let decel = cfg.skid_scrub_rate * slip * geometry.edge_depth * snow.drag_multiplier;
        (ratio - 1.0, slip, turn_rate, (decel * dt).min(speed))
    };

    let carve_quality = if is_carving {
        prev.carve_quality + cfg.carve_gain_rate * dt
    } else {
        prev.carve_quality - cfg.skid_decay_rate * dt
    };

    trace!(
        radius,
        required,
        available,
        is_carving,
        slip_angle,
        "grip resolved"
    );

    GripState {
        turn_radius: radius,
        g_force,
        total_g: total_g_force(g_force),
        required_force: required,
        available_force: available,
        grip_coefficient: mu,
        grip_deficit,
        is_carving,
        is_skidding: !is_carving,
        slip_angle,
        turn_rate,
        speed: speed - speed_scrub,
        speed_scrub,
        carve_quality: clamp01(carve_quality),
    }
}

/// Infinite radius is written as `null` so JSON round-trips.
mod infinite_as_none {
    use super::*;

    pub fn serialize<S: Serializer>(value: &f32, serializer: S) -> Result<S::Ok, S::Error> {
        if value.is_finite() {
            serializer.serialize_some(value)
        } else {
            serializer.serialize_none()
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f32, D::Error> {
        Ok(Option::<f32>::deserialize(deserializer)?.unwrap_or(f32::INFINITY))
    }
}
