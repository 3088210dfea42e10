//! Read-only per-tick output for animation, audio, UI and scoring.

use serde::{Deserialize, Serialize};

use crate::analysis::{CarveStyle, EdgeCatch, PhaseScores, TurnPhase, WashOut};
use crate::physics::{SkiPairState, SkiTurnType};
use crate::rider::Equipment;

/// Per-ski view for the ski variant.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SkiSnapshot {
    pub left_edge: f32,
    pub left_pressure: f32,
    pub right_edge: f32,
    pub right_pressure: f32,
    pub wedge_angle: f32,
    pub is_parallel: bool,
    pub turn_type: SkiTurnType,
}

impl From<&SkiPairState> for SkiSnapshot {
    fn from(pair: &SkiPairState) -> Self {
        Self {
            left_edge: pair.left.edge.angle,
            left_pressure: pair.left.pressure,
            right_edge: pair.right.edge.angle,
            right_pressure: pair.right.pressure,
            wedge_angle: pair.wedge_angle,
            is_parallel: pair.is_parallel,
            turn_type: pair.turn_type,
        }
    }
}

/// Riding time split.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionStats {
    pub ride_time: f32,
    pub carving_time: f32,
    pub skidding_time: f32,
    /// Metres travelled while grounded
    pub distance: f32,
}

impl SessionStats {
    /// Carving share of the time spent on an edge.
    pub fn carve_ratio(&self) -> f32 {
        let on_edge = self.carving_time + self.skidding_time;
        if on_edge > 0.0 {
            self.carving_time / on_edge
        } else {
            0.0
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CarveSnapshot {
    pub tick: u64,
    pub time: f32,
    pub equipment: Equipment,
    pub riding_switch: bool,

    // Edge
    pub edge_angle: f32,
    pub target_edge_angle: f32,
    pub rail_strength: f32,

    // Grip
    /// `None` while running straight
    pub turn_radius: Option<f32>,
    pub g_force: f32,
    pub total_g: f32,
    pub is_carving: bool,
    pub is_skidding: bool,
    pub slip_angle: f32,
    pub grip_deficit: f32,
    pub carve_quality: f32,

    // Motion handed back to the integrator
    pub speed: f32,
    pub speed_scrub: f32,
    pub turn_rate: f32,
    pub next_heading: f32,
    pub speed_multiplier: f32,

    // Turn
    pub phase: TurnPhase,
    pub phase_progress: f32,
    pub phase_scores: PhaseScores,
    /// Last completed turn
    pub perfection: f32,
    pub style: Option<CarveStyle>,
    pub is_perfect: bool,
    pub best_perfection: f32,
    pub total_turns: u64,

    // Risk
    pub risk_level: f32,
    pub is_recovering: bool,
    pub wash_out: WashOut,
    pub edge_catch: EdgeCatch,

    // Chain
    pub chain_count: u8,
    pub chain_multiplier: f32,
    pub chain_energy: f32,
    pub flow: f32,
    pub average_timing: f32,

    pub skis: Option<SkiSnapshot>,
    pub session: SessionStats,
}

impl CarveSnapshot {
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_carve_ratio() {
        let stats = SessionStats { ride_time: 10.0, carving_time: 3.0, skidding_time: 1.0, distance: 80.0 };
        assert!((stats.carve_ratio() - 0.75).abs() < 1e-6);
        assert_eq!(SessionStats::default().carve_ratio(), 0.0);
    }
}
