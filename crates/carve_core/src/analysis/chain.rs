//! Transition timing and the carve chain.
//!
//! Timing curve over the interval between edge reversals:
//!
//! | interval                 | multiplier                           |
//! |--------------------------|--------------------------------------|
//! | < panic (0.3 s)          | 0.4                                  |
//! | > lost momentum (1.8 s)  | 0.5                                  |
//! | ideal ± half-width       | 1 + bonus · (1 − distance/half-width) |
//! | anything else            | 1.0                                  |

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::config::ChainConfig;
use crate::sanitize::{clamp01, non_negative};

/// Turn shape by total heading change.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ArcType {
    #[default]
    Wiggle,
    JTurn,
    CTurn,
}

impl ArcType {
    pub fn multiplier(self, cfg: &ChainConfig) -> f32 {
        match self {
            Self::Wiggle => cfg.wiggle_multiplier,
            Self::JTurn => cfg.j_turn_multiplier,
            Self::CTurn => cfg.c_turn_multiplier,
        }
    }
}

/// Lower bounds are inclusive: exactly 30° is a J-turn, exactly 60° a C-turn.
pub fn classify_arc(heading_change_deg: f32, cfg: &ChainConfig) -> ArcType {
    let deg = non_negative(heading_change_deg.abs());
    if deg >= cfg.c_turn_degrees {
        ArcType::CTurn
    } else if deg >= cfg.j_turn_degrees {
        ArcType::JTurn
    } else {
        ArcType::Wiggle
    }
}

pub fn transition_timing_multiplier(interval: f32, cfg: &ChainConfig) -> f32 {
    let interval = non_negative(interval);
    if interval < cfg.panic_threshold {
        return cfg.panic_multiplier;
    }
    if interval > cfg.lost_momentum_threshold {
        return cfg.lost_momentum_multiplier;
    }
    let distance = (interval - cfg.ideal_interval).abs();
    if cfg.sweet_spot_half_width > 0.0 && distance <= cfg.sweet_spot_half_width {
        1.0 + cfg.max_timing_bonus * (1.0 - distance / cfg.sweet_spot_half_width)
    } else {
        1.0
    }
}

pub fn is_clean_turn(peak_edge: f32, hold_time: f32, cfg: &ChainConfig) -> bool {
    peak_edge > cfg.clean_edge_threshold && hold_time > cfg.min_hold_time
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct CarveChainState {
    /// 0..=max_chain
    pub chain_count: u8,
    /// 0..1
    pub energy: f32,
    /// 0..1
    pub flow: f32,
    /// Session time of the last edge reversal (s)
    pub last_reversal_time: Option<f32>,
    pub last_timing: f32,
    pub timing_sum: f32,
    pub timing_count: u32,
}

impl CarveChainState {
    /// 1 + 0.1 per chained turn.
    pub fn multiplier(&self) -> f32 {
        1.0 + 0.1 * f32::from(self.chain_count)
    }

    /// Mean timing multiplier over every timed reversal; 1.0 before the first.
    pub fn average_timing(&self) -> f32 {
        if self.timing_count == 0 {
            1.0
        } else {
            self.timing_sum / self.timing_count as f32
        }
    }
}

/// Record an edge reversal at session `time`. Returns the new state and the
/// timing multiplier for the turn it opens (1.0 for the first reversal).
pub fn on_reversal(state: CarveChainState, time: f32, cfg: &ChainConfig) -> (CarveChainState, f32) {
    let time = non_negative(time);
    let mut next = CarveChainState { last_reversal_time: Some(time), ..state };

    let Some(previous) = state.last_reversal_time else {
        next.last_timing = 1.0;
        return (next, 1.0);
    };

    let timing = transition_timing_multiplier(time - previous, cfg);
    next.last_timing = timing;
    next.timing_sum += timing;
    next.timing_count += 1;
    (next, timing)
}

/// Apply one completed turn to the chain.
pub fn register_turn(
    state: CarveChainState,
    is_clean: bool,
    arc: ArcType,
    timing_multiplier: f32,
    cfg: &ChainConfig,
) -> CarveChainState {
    let mut next = state;
    if is_clean {
        next.chain_count = state.chain_count.saturating_add(1).min(cfg.max_chain);
        next.energy = clamp01(state.energy + cfg.energy_gain * arc.multiplier(cfg));
        next.flow = clamp01(state.flow + cfg.flow_gain * non_negative(timing_multiplier));
    } else {
        next.chain_count = state.chain_count.saturating_sub(1);
        next.energy = clamp01(state.energy - cfg.energy_drain);
        next.flow = clamp01(state.flow - cfg.flow_loss);
    }
    next
}

/// Continuous flow decay.
pub fn decay_flow(state: CarveChainState, dt: f32, cfg: &ChainConfig) -> CarveChainState {
    CarveChainState { flow: clamp01(state.flow - cfg.flow_decay * non_negative(dt)), ..state }
}
