//! Carve quality analyzer.
//!
//! Each phase is scored from the |edge| samples taken while that phase was
//! active (a bounded rolling window, cleared on every phase change). The last
//! live score of each phase is what the completed turn keeps.
//!
//! ```text
//! perfection = Σ weight·score + depth bonus + g bonus, × rhythm, clamped to 1
//! ```

use std::collections::VecDeque;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::analysis::chain::{classify_arc, is_clean_turn};
use crate::analysis::phase::{CompletedTurn, TurnPhase};
use crate::analysis::turn::{CarveStyle, PathSample, TurnRecord};
use crate::config::{ChainConfig, QualityConfig};
use crate::physics::constants::guard;
use crate::sanitize::{clamp01, finite_or_zero, non_negative};

/// Per-phase sub-scores, each 0..1.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct PhaseScores {
    pub initiation: f32,
    pub loading: f32,
    pub apex: f32,
    pub unloading: f32,
}

// ============================================================
// Sub-scores
// ============================================================

/// 1.0 inside the ideal band, falling off linearly on either side.
pub fn engagement_rate_score(rate: f32, cfg: &QualityConfig) -> f32 {
    let rate = finite_or_zero(rate);
    if rate < cfg.ideal_engagement_min {
        clamp01(rate / cfg.ideal_engagement_min.max(guard::DIV_EPSILON))
    } else if rate > cfg.ideal_engagement_max {
        let over = (rate - cfg.ideal_engagement_max) / cfg.ideal_engagement_max.max(guard::DIV_EPSILON);
        clamp01(1.0 - over)
    } else {
        1.0
    }
}

/// Engagement speed blended with smoothness over the last `jerk_samples`.
/// `None` until two samples exist.
pub fn initiation_quality(samples: &[f32], dt: f32, cfg: &QualityConfig) -> Option<f32> {
    let dt = non_negative(dt);
    if samples.len() < 2 || dt <= guard::DIV_EPSILON {
        return None;
    }
    let recent = &samples[samples.len().saturating_sub(cfg.jerk_samples.max(2))..];
    let n = recent.len();
    let rate = (recent[n - 1] - recent[0]) / ((n - 1) as f32 * dt);
    let engagement = engagement_rate_score(rate, cfg);

    let smoothness = if n >= 3 {
        let jerk: f32 = recent
            .windows(3)
            .map(|w| (w[2] - 2.0 * w[1] + w[0]).abs() / (dt * dt))
            .sum::<f32>()
            / (n - 2) as f32;
        1.0 / (1.0 + jerk / cfg.jerk_scale.max(guard::DIV_EPSILON))
    } else {
        1.0
    };

    let w = cfg.initiation_engagement_weight;
    Some(clamp01(w * engagement + (1.0 - w) * smoothness))
}

/// Share of non-decreasing steps blended with inverse step variance.
pub fn loading_quality(samples: &[f32], cfg: &QualityConfig) -> Option<f32> {
    if samples.len() < 2 {
        return None;
    }
    let deltas: Vec<f32> = samples.windows(2).map(|w| w[1] - w[0]).collect();
    let n = deltas.len() as f32;

    let progressive = deltas.iter().filter(|d| **d >= -cfg.loading_tolerance).count() as f32 / n;
    let mean = deltas.iter().sum::<f32>() / n;
    let variance = deltas.iter().map(|d| (d - mean) * (d - mean)).sum::<f32>() / n;
    let consistency = 1.0 / (1.0 + variance * cfg.loading_variance_scale);

    let w = cfg.loading_progress_weight;
    Some(clamp01(w * progressive + (1.0 - w) * consistency))
}

/// Holding near the peak under load.
pub fn apex_quality(current_edge: f32, peak_edge: f32, g_force: f32, cfg: &QualityConfig) -> f32 {
    let peak = non_negative(peak_edge);
    let hold = if peak > guard::DIV_EPSILON { clamp01(current_edge.abs() / peak) } else { 0.0 };
    let load = clamp01(non_negative(g_force) / cfg.target_g.max(guard::DIV_EPSILON));
    let w = cfg.apex_hold_weight;
    clamp01(w * hold + (1.0 - w) * load)
}

/// Share of steps releasing at a controlled rate.
pub fn unloading_quality(samples: &[f32], dt: f32, cfg: &QualityConfig) -> Option<f32> {
    let dt = non_negative(dt);
    if samples.len() < 2 || dt <= guard::DIV_EPSILON {
        return None;
    }
    let total = samples.len() - 1;
    let controlled = samples
        .windows(2)
        .map(|w| (w[1] - w[0]) / dt)
        .filter(|rate| *rate <= -cfg.unload_min_rate && *rate >= -cfg.unload_max_rate)
        .count();
    Some(controlled as f32 / total as f32)
}

/// Mirror the |edge| trace about its midpoint. Fewer than four samples is
/// not enough shape to judge, so it scores neutral.
pub fn arc_symmetry(trace: &[f32], cfg: &QualityConfig) -> f32 {
    let n = trace.len();
    if n < 4 {
        return 0.5;
    }
    let half = n / 2;
    let diff: f32 =
        (0..half).map(|i| (trace[i].abs() - trace[n - 1 - i].abs()).abs()).sum::<f32>() / half as f32;
    clamp01(1.0 - diff / cfg.symmetry_tolerance.max(guard::DIV_EPSILON))
}

pub fn perfection(
    scores: &PhaseScores,
    symmetry: f32,
    peak_edge: f32,
    peak_g: f32,
    rhythm: f32,
    cfg: &QualityConfig,
) -> f32 {
    let w = &cfg.weights;
    let weighted = w.initiation * scores.initiation
        + w.loading * scores.loading
        + w.apex * scores.apex
        + w.unloading * scores.unloading
        + w.symmetry * symmetry;
    let depth = cfg.depth_bonus * clamp01(peak_edge / cfg.style_edge_ref.max(guard::DIV_EPSILON));
    let load = cfg.g_bonus * clamp01(peak_g / cfg.bonus_g_ref.max(guard::DIV_EPSILON));
    clamp01((weighted + depth + load) * non_negative(rhythm))
}

/// Style tag and its intensity (0..1).
pub fn classify_style(
    peak_edge: f32,
    mean_speed: f32,
    loading: f32,
    symmetry: f32,
    cfg: &QualityConfig,
) -> (CarveStyle, f32) {
    let edge_part = clamp01(peak_edge / cfg.style_edge_ref.max(guard::DIV_EPSILON));
    let speed_part = clamp01(mean_speed / cfg.style_speed_ref.max(guard::DIV_EPSILON));
    let intensity = 0.5 * (edge_part + speed_part);

    if intensity > cfg.aggressive_intensity {
        (CarveStyle::Aggressive, intensity)
    } else if loading > cfg.technical_threshold && symmetry > cfg.technical_threshold {
        (CarveStyle::Technical, clamp01(0.5 * (loading + symmetry)))
    } else {
        let moderate = cfg.moderate_edge.max(guard::DIV_EPSILON);
        (CarveStyle::Smooth, clamp01(1.0 - (peak_edge - moderate).abs() / moderate))
    }
}

// ============================================================
// Per-turn tracker
// ============================================================

/// One tick of data for the analyzer.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TurnSample {
    pub edge_angle: f32,
    pub speed: f32,
    pub g_force: f32,
    /// Signed heading rate (rad/s)
    pub turn_rate: f32,
    pub x: f32,
    pub z: f32,
    pub dt: f32,
}

/// Accumulates the active turn and scores it live.
#[derive(Debug, Clone)]
pub struct CarveAnalyzer {
    window: VecDeque<f32>,
    window_phase: TurnPhase,
    scores: PhaseScores,
    path: Vec<PathSample>,
    path_stride: u32,
    path_tick: u32,
    turn_time: f32,
    peak_edge: f32,
    peak_g: f32,
    hold_time: f32,
    heading_change: f32,
    speed_sum: f32,
    sample_count: u32,
    timing_multiplier: f32,
}

impl Default for CarveAnalyzer {
    fn default() -> Self {
        Self {
            window: VecDeque::new(),
            window_phase: TurnPhase::Neutral,
            scores: PhaseScores::default(),
            path: Vec::new(),
            path_stride: 1,
            path_tick: 0,
            turn_time: 0.0,
            peak_edge: 0.0,
            peak_g: 0.0,
            hold_time: 0.0,
            heading_change: 0.0,
            speed_sum: 0.0,
            sample_count: 0,
            timing_multiplier: 1.0,
        }
    }
}

impl CarveAnalyzer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Live scores of the active turn.
    pub fn scores(&self) -> PhaseScores {
        self.scores
    }

    pub fn hold_time(&self) -> f32 {
        self.hold_time
    }

    pub fn path(&self) -> &[PathSample] {
        &self.path
    }

    /// Start accumulating a new turn.
    pub fn begin_turn(&mut self, timing_multiplier: f32) {
        *self = Self { timing_multiplier, window: std::mem::take(&mut self.window), ..Self::default() };
        self.window.clear();
    }

    /// Drop the active turn without producing a record.
    pub fn reset_turn(&mut self) {
        self.begin_turn(1.0);
    }

    /// Feed one tick while `phase` is current.
    pub fn sample(
        &mut self,
        phase: TurnPhase,
        sample: &TurnSample,
        cfg: &QualityConfig,
        chain_cfg: &ChainConfig,
    ) {
        if !phase.is_active() {
            return;
        }
        let edge = finite_or_zero(sample.edge_angle);
        let abs_edge = edge.abs();
        let dt = non_negative(sample.dt);

        if phase != self.window_phase {
            self.window.clear();
            self.window_phase = phase;
        }
        if self.window.len() >= cfg.window_size.max(2) {
            self.window.pop_front();
        }
        self.window.push_back(abs_edge);

        self.turn_time += dt;
        self.peak_edge = self.peak_edge.max(abs_edge);
        self.peak_g = self.peak_g.max(non_negative(sample.g_force));
        if abs_edge >= chain_cfg.clean_edge_threshold {
            self.hold_time += dt;
        }
        self.heading_change += finite_or_zero(sample.turn_rate) * dt;
        self.speed_sum += non_negative(sample.speed);
        self.sample_count += 1;

        self.record_path(edge, sample, cfg.max_path_samples);
        self.score_phase(phase, abs_edge, sample.g_force, dt, cfg);
    }

    /// Close the active turn into a record.
    pub fn finish_turn(
        &mut self,
        completed: &CompletedTurn,
        index: u64,
        rhythm: f32,
        cfg: &QualityConfig,
        chain_cfg: &ChainConfig,
    ) -> TurnRecord {
        let trace: Vec<f32> = self.path.iter().map(|p| p.edge_angle).collect();
        let symmetry = arc_symmetry(&trace, cfg);
        let peak_edge = completed.peak_edge.max(self.peak_edge);
        let perfection =
            perfection(&self.scores, symmetry, peak_edge, self.peak_g, rhythm, cfg);

        let mean_speed =
            if self.sample_count > 0 { self.speed_sum / self.sample_count as f32 } else { 0.0 };
        let (style, style_intensity) =
            classify_style(peak_edge, mean_speed, self.scores.loading, symmetry, cfg);

        let heading_change_deg = self.heading_change.abs().to_degrees();
        let record = TurnRecord {
            index,
            direction: completed.direction,
            duration: completed.duration,
            peak_edge,
            peak_g: self.peak_g,
            path: std::mem::take(&mut self.path),
            phase_scores: self.scores,
            symmetry,
            perfection,
            style,
            style_intensity,
            heading_change_deg,
            arc_type: classify_arc(heading_change_deg, chain_cfg),
            timing_multiplier: self.timing_multiplier,
            hold_time: self.hold_time,
            is_clean: is_clean_turn(peak_edge, self.hold_time, chain_cfg),
            is_perfect: perfection >= cfg.perfect_threshold,
        };
        self.reset_turn();
        record
    }

    fn record_path(&mut self, edge: f32, sample: &TurnSample, capacity: usize) {
        let due = self.path_tick % self.path_stride == 0;
        self.path_tick = self.path_tick.wrapping_add(1);
        if !due {
            return;
        }
        if self.path.len() >= capacity.max(4) {
            // Keep every other sample and halve the sampling rate.
            let mut i = 0;
            self.path.retain(|_| {
                i += 1;
                i % 2 == 1
            });
            self.path_stride = self.path_stride.saturating_mul(2);
        }
        self.path.push(PathSample {
            x: finite_or_zero(sample.x),
            z: finite_or_zero(sample.z),
            time: self.turn_time,
            edge_angle: edge,
            speed: non_negative(sample.speed),
        });
    }

    fn score_phase(&mut self, phase: TurnPhase, abs_edge: f32, g_force: f32, dt: f32, cfg: &QualityConfig) {
        let window = self.window.make_contiguous();
        match phase {
            TurnPhase::Initiation => {
                if let Some(score) = initiation_quality(window, dt, cfg) {
                    self.scores.initiation = score;
                }
            }
            TurnPhase::Loading => {
                if let Some(score) = loading_quality(window, cfg) {
                    self.scores.loading = score;
                }
            }
            TurnPhase::Apex => {
                self.scores.apex = apex_quality(abs_edge, self.peak_edge, g_force, cfg);
            }
            TurnPhase::Unloading => {
                if let Some(score) = unloading_quality(window, dt, cfg) {
                    self.scores.unloading = score;
                }
            }
            TurnPhase::Neutral => {}
        }
    }
}
