//! Turn-phase state machine.
//!
//! ```text
//! Neutral ──|edge| > carve──▶ Initiation ──dwell or 50% of peak──▶ Loading
//!    ▲                                                               │
//!    │ release / lost contact / slow          85% of peak (or plateau)
//!    │                                                               ▼
//!    └──────────── Unloading ◀──below 70% of peak after dwell──── Apex
//! ```
//!
//! The peak is tracked online, so "50% of peak" is measured against a running
//! estimate that never drops below `nominal_peak_edge`. Entering the turn
//! uses `carve_threshold`; leaving it uses the lower `release_threshold` so
//! the machine does not chatter around the boundary.
//!
//! A sign reversal above the carve threshold while a turn is active closes
//! that turn and immediately opens the next one in Initiation.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::PhaseConfig;
use crate::events::{CarveEvent, EventLog};
use crate::physics::constants::guard;
use crate::sanitize::{finite_or_zero, non_negative};

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum TurnPhase {
    #[default]
    Neutral,
    Initiation,
    Loading,
    Apex,
    Unloading,
}

impl TurnPhase {
    /// Inside a turn.
    pub fn is_active(self) -> bool {
        !matches!(self, Self::Neutral)
    }

    /// Position in the turn, Initiation = 0.
    pub fn ordinal(self) -> Option<u8> {
        match self {
            Self::Neutral => None,
            Self::Initiation => Some(0),
            Self::Loading => Some(1),
            Self::Apex => Some(2),
            Self::Unloading => Some(3),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Neutral => "neutral",
            Self::Initiation => "initiation",
            Self::Loading => "loading",
            Self::Apex => "apex",
            Self::Unloading => "unloading",
        }
    }
}

/// A turn that the machine has just closed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompletedTurn {
    /// +1 right, -1 left
    pub direction: i8,
    pub duration: f32,
    pub peak_edge: f32,
    /// Last phase the turn reached
    pub final_phase: TurnPhase,
}

/// What happened to the turn this tick.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PhaseStep {
    pub completed: Option<CompletedTurn>,
    /// A new turn opened (from Neutral or by reversal)
    pub started: Option<i8>,
    /// Released during Initiation, too short to count
    pub discarded: bool,
    /// Contact or speed lost mid-turn
    pub aborted: bool,
}

#[derive(Debug, Clone, Default)]
pub struct TurnPhaseMachine {
    phase: TurnPhase,
    phase_time: f32,
    turn_time: f32,
    direction: i8,
    last_direction: i8,
    peak_edge: f32,
    prev_edge: f32,
    edge_rate: f32,
}

impl TurnPhaseMachine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> TurnPhase {
        self.phase
    }

    pub fn phase_time(&self) -> f32 {
        self.phase_time
    }

    pub fn turn_time(&self) -> f32 {
        self.turn_time
    }

    /// Direction of the active turn, 0 when Neutral.
    pub fn direction(&self) -> i8 {
        self.direction
    }

    /// Direction of the last turn that completed.
    pub fn last_direction(&self) -> i8 {
        self.last_direction
    }

    pub fn peak_edge(&self) -> f32 {
        self.peak_edge
    }

    /// d|edge|/dt from the last update (rad/s).
    pub fn edge_rate(&self) -> f32 {
        self.edge_rate
    }

    /// 0..1 through the turn: a quarter per phase, filled by phase time.
    pub fn progress(&self, cfg: &PhaseConfig) -> f32 {
        match self.phase.ordinal() {
            None => 0.0,
            Some(i) => {
                let nominal = cfg.nominal_phase_duration.max(guard::DIV_EPSILON);
                let within = (self.phase_time / nominal).min(1.0);
                (f32::from(i) + within) * 0.25
            }
        }
    }

    /// Advance one tick.
    pub fn update(
        &mut self,
        edge_angle: f32,
        speed: f32,
        is_grounded: bool,
        dt: f32,
        cfg: &PhaseConfig,
        events: &mut EventLog,
    ) -> PhaseStep {
        let edge = finite_or_zero(edge_angle);
        let abs_edge = edge.abs();
        let dt = non_negative(dt);
        let mut step = PhaseStep::default();

        self.edge_rate =
            if dt > guard::DIV_EPSILON { (abs_edge - self.prev_edge) / dt } else { 0.0 };
        self.prev_edge = abs_edge;

        if !is_grounded || non_negative(speed) < cfg.min_speed {
            if self.phase.is_active() {
                step.aborted = true;
                self.transition(TurnPhase::Neutral, events);
                self.clear_turn();
            }
            return step;
        }

        self.phase_time += dt;
        if self.phase.is_active() {
            self.turn_time += dt;
        }

        let side = if abs_edge > cfg.carve_threshold { edge.signum() as i8 } else { 0 };

        if self.phase == TurnPhase::Neutral {
            if side != 0 {
                self.open_turn(side, abs_edge, events);
                step.started = Some(side);
            }
            return step;
        }

        if side != 0 && side != self.direction {
            step.completed = Some(self.close_turn());
            self.open_turn(side, abs_edge, events);
            step.started = Some(side);
            return step;
        }

        if abs_edge < cfg.release_threshold() {
            if self.phase == TurnPhase::Initiation {
                step.discarded = true;
            } else {
                step.completed = Some(self.close_turn());
            }
            self.transition(TurnPhase::Neutral, events);
            self.clear_turn();
            return step;
        }

        self.peak_edge = self.peak_edge.max(abs_edge);
        let estimate = self.peak_edge.max(cfg.nominal_peak_edge);

        let next = match self.phase {
            TurnPhase::Initiation => (self.phase_time >= cfg.min_initiation_time
                || abs_edge >= estimate * cfg.loading_fraction)
                .then_some(TurnPhase::Loading),
            TurnPhase::Loading => {
                let deep = abs_edge >= estimate * cfg.apex_threshold;
                let plateau = self.edge_rate <= cfg.plateau_rate
                    && abs_edge >= self.peak_edge * cfg.apex_threshold;
                (self.phase_time >= cfg.min_loading_time && (deep || plateau))
                    .then_some(TurnPhase::Apex)
            }
            TurnPhase::Apex => (self.phase_time >= cfg.min_apex_time
                && abs_edge < self.peak_edge * cfg.unload_threshold)
                .then_some(TurnPhase::Unloading),
            TurnPhase::Unloading | TurnPhase::Neutral => None,
        };
        if let Some(next) = next {
            self.transition(next, events);
        }

        step
    }

    /// Force back to Neutral without recording anything. An active turn
    /// still reports its phase change.
    pub fn reset(&mut self, events: &mut EventLog) {
        if self.phase.is_active() {
            self.transition(TurnPhase::Neutral, events);
        }
        *self = Self { last_direction: self.last_direction, ..Self::default() };
    }

    fn open_turn(&mut self, direction: i8, abs_edge: f32, events: &mut EventLog) {
        self.direction = direction;
        self.peak_edge = abs_edge;
        self.turn_time = 0.0;
        self.transition(TurnPhase::Initiation, events);
    }

    fn close_turn(&mut self) -> CompletedTurn {
        self.last_direction = self.direction;
        CompletedTurn {
            direction: self.direction,
            duration: self.turn_time,
            peak_edge: self.peak_edge,
            final_phase: self.phase,
        }
    }

    fn clear_turn(&mut self) {
        self.direction = 0;
        self.peak_edge = 0.0;
        self.turn_time = 0.0;
    }

    fn transition(&mut self, next: TurnPhase, events: &mut EventLog) {
        let previous = self.phase;
        self.phase = next;
        self.phase_time = 0.0;
        debug!(phase = next.as_str(), previous = previous.as_str(), "turn phase changed");
        events.push(CarveEvent::PhaseChange { phase: next, previous });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DT: f32 = 1.0 / 60.0;

    struct Driver {
        machine: TurnPhaseMachine,
        events: EventLog,
        cfg: PhaseConfig,
    }

    impl Driver {
        fn new() -> Self {
            Self { machine: TurnPhaseMachine::new(), events: EventLog::new(), cfg: PhaseConfig::default() }
        }

        fn step(&mut self, edge: f32) -> PhaseStep {
            self.machine.update(edge, 15.0, true, DT, &self.cfg, &mut self.events)
        }

        fn phases(&mut self) -> Vec<TurnPhase> {
            self.events
                .drain()
                .into_iter()
                .filter_map(|e| match e {
                    CarveEvent::PhaseChange { phase, .. } => Some(phase),
                    _ => None,
                })
                .collect()
        }
    }

    #[test]
    fn test_stays_neutral_below_threshold() {
        let mut d = Driver::new();
        for _ in 0..30 {
            d.step(0.1);
        }
        assert_eq!(d.machine.phase(), TurnPhase::Neutral);
        assert!(d.events.is_empty());
    }

    #[test]
    fn test_full_turn_sequence() {
        let mut d = Driver::new();
        let mut completed = None;
        // Ramp to 0.8 over 0.3 s, hold 0.5 s, ease out over 0.4 s.
        for i in 0..=18 {
            d.step(0.8 * i as f32 / 18.0);
        }
        for _ in 0..30 {
            d.step(0.8);
        }
        for i in 0..=24 {
            let step = d.step(0.8 * (1.0 - i as f32 / 24.0));
            if step.completed.is_some() {
                completed = step.completed;
            }
        }

        assert_eq!(
            d.phases(),
            vec![
                TurnPhase::Initiation,
                TurnPhase::Loading,
                TurnPhase::Apex,
                TurnPhase::Unloading,
                TurnPhase::Neutral
            ]
        );
        let turn = completed.expect("turn should complete");
        assert_eq!(turn.direction, 1);
        assert!((turn.peak_edge - 0.8).abs() < 1e-5);
        assert!(turn.duration > 0.8);
        assert_eq!(d.machine.last_direction(), 1);
    }

    #[test]
    fn test_reversal_completes_and_restarts() {
        let mut d = Driver::new();
        for _ in 0..30 {
            d.step(0.6);
        }
        let step = d.step(-0.6);
        assert!(step.completed.is_some());
        assert_eq!(step.started, Some(-1));
        assert_eq!(d.machine.phase(), TurnPhase::Initiation);
        assert_eq!(d.machine.direction(), -1);
    }

    #[test]
    fn test_release_during_initiation_discards() {
        let mut d = Driver::new();
        d.step(0.2);
        assert_eq!(d.machine.phase(), TurnPhase::Initiation);
        let step = d.step(0.05);
        assert!(step.discarded);
        assert!(step.completed.is_none());
        assert_eq!(d.machine.phase(), TurnPhase::Neutral);
    }

    #[test]
    fn test_hysteresis_between_thresholds() {
        let mut d = Driver::new();
        for _ in 0..20 {
            d.step(0.5);
        }
        // Between release (0.12) and carve (0.15): the turn stays open.
        let step = d.step(0.13);
        assert!(step.completed.is_none());
        assert!(d.machine.phase().is_active());
    }

    #[test]
    fn test_lost_contact_aborts() {
        let mut d = Driver::new();
        for _ in 0..20 {
            d.step(0.6);
        }
        let step = d.machine.update(0.6, 15.0, false, DT, &d.cfg, &mut d.events);
        assert!(step.aborted);
        assert!(step.completed.is_none());
        assert_eq!(d.machine.phase(), TurnPhase::Neutral);
    }

    #[test]
    fn test_low_speed_keeps_neutral() {
        let mut d = Driver::new();
        let step = d.machine.update(0.8, 0.1, true, DT, &d.cfg, &mut d.events);
        assert_eq!(step, PhaseStep::default());
        assert_eq!(d.machine.phase(), TurnPhase::Neutral);
    }

    #[test]
    fn test_plateau_reaches_apex_on_shallow_turn() {
        let mut d = Driver::new();
        for _ in 0..40 {
            d.step(0.4);
        }
        assert_eq!(d.machine.phase(), TurnPhase::Apex);
    }

    #[test]
    fn test_progress_bounds() {
        let mut d = Driver::new();
        assert_eq!(d.machine.progress(&d.cfg), 0.0);
        d.step(0.3);
        d.step(0.3);
        let p = d.machine.progress(&d.cfg);
        assert!(p > 0.0 && p < 0.25);
        for _ in 0..200 {
            d.step(0.3);
        }
        assert!(d.machine.progress(&d.cfg) <= 1.0);
    }
}
