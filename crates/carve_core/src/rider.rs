//! Per-rider controller.
//!
//! Owns every subsystem state for one rider and threads a tick through them
//! in data-dependency order:
//!
//! 1. edge dynamics (rail, then spring-damper; per ski for the ski variant)
//! 2. grip / skid resolver
//! 3. turn-phase machine
//! 4. quality analyzer, chain and risk detector
//!
//! Events raised along the way are queued and handed out by
//! [`Rider::drain_events`].

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::analysis::chain::{decay_flow, on_reversal, register_turn, CarveChainState};
use crate::analysis::phase::{PhaseStep, TurnPhaseMachine};
use crate::analysis::quality::{CarveAnalyzer, TurnSample};
use crate::analysis::risk::{
    check_edge_catch, check_wash_out, update_risk, EdgeCatch, RiskState, WashOut,
};
use crate::analysis::turn::TurnHistory;
use crate::config::CarveConfig;
use crate::events::{CarveEvent, EventLog};
use crate::physics::edge::{calculate_target_edge, update_edge, update_rail, EdgeState, RailState};
use crate::physics::grip::{resolve_grip, GripInput, GripState};
use crate::physics::ski::{resolve_ski_grip, update_ski_pair, SkiInput, SkiPairState};
use crate::physics::snow::TerrainSample;
use crate::sanitize::{axis, clamp01, delta_time, finite_or_zero, non_negative};
use crate::snapshot::{CarveSnapshot, SessionStats, SkiSnapshot};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum Equipment {
    #[default]
    Snowboard,
    Skis,
}

/// Controller input for one tick.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RiderInput {
    /// -1 (left) ..= 1 (right)
    pub steer: f32,
    /// -1 (back) ..= 1 (forward)
    pub lean: f32,
    /// Held switch button; each press toggles stance
    pub switch_stance: bool,
    /// Snowplow amount, skis only
    pub wedge: f32,
}

/// Ground contact from the external physics engine.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContactState {
    pub is_grounded: bool,
    /// m/s
    pub speed: f32,
    pub x: f32,
    pub z: f32,
    /// rad
    pub heading: f32,
    /// Y of the slope normal
    pub normal_y: f32,
}

impl Default for ContactState {
    fn default() -> Self {
        Self { is_grounded: true, speed: 0.0, x: 0.0, z: 0.0, heading: 0.0, normal_y: 1.0 }
    }
}

/// Board pressure from forward lean: 1.0 upright, 1.25 fully forward.
fn board_pressure(lean: f32) -> f32 {
    1.0 + 0.25 * axis(lean).max(0.0)
}

#[derive(Debug, Clone)]
pub struct Rider {
    equipment: Equipment,
    config: CarveConfig,

    edge: EdgeState,
    rail: RailState,
    skis: SkiPairState,
    grip: GripState,

    phase: TurnPhaseMachine,
    analyzer: CarveAnalyzer,
    history: TurnHistory,
    chain: CarveChainState,
    risk: RiskState,
    wash_out: WashOut,
    edge_catch: EdgeCatch,

    riding_switch: bool,
    switch_held: bool,
    last_started_direction: i8,

    events: EventLog,
    tick: u64,
    time: f32,
    session: SessionStats,
}

impl Rider {
    pub fn new(equipment: Equipment, config: CarveConfig) -> Self {
        let history = TurnHistory::new(config.quality.history_capacity);
        Self {
            equipment,
            config,
            edge: EdgeState::default(),
            rail: RailState::default(),
            skis: SkiPairState::default(),
            grip: GripState::default(),
            phase: TurnPhaseMachine::new(),
            analyzer: CarveAnalyzer::new(),
            history,
            chain: CarveChainState::default(),
            risk: RiskState::default(),
            wash_out: WashOut::default(),
            edge_catch: EdgeCatch::default(),
            riding_switch: false,
            switch_held: false,
            last_started_direction: 0,
            events: EventLog::new(),
            tick: 0,
            time: 0.0,
            session: SessionStats::default(),
        }
    }

    pub fn snowboard(config: CarveConfig) -> Self {
        Self::new(Equipment::Snowboard, config)
    }

    pub fn skis(config: CarveConfig) -> Self {
        Self::new(Equipment::Skis, config)
    }

    pub fn equipment(&self) -> Equipment {
        self.equipment
    }

    pub fn config(&self) -> &CarveConfig {
        &self.config
    }

    pub fn edge(&self) -> &EdgeState {
        &self.edge
    }

    pub fn rail(&self) -> &RailState {
        &self.rail
    }

    pub fn ski_pair(&self) -> &SkiPairState {
        &self.skis
    }

    pub fn grip(&self) -> &GripState {
        &self.grip
    }

    pub fn phase(&self) -> &TurnPhaseMachine {
        &self.phase
    }

    pub fn history(&self) -> &TurnHistory {
        &self.history
    }

    pub fn chain(&self) -> &CarveChainState {
        &self.chain
    }

    pub fn risk(&self) -> &RiskState {
        &self.risk
    }

    pub fn session(&self) -> &SessionStats {
        &self.session
    }

    pub fn is_riding_switch(&self) -> bool {
        self.riding_switch
    }

    /// Events raised since the last drain, oldest first.
    pub fn drain_events(&mut self) -> Vec<CarveEvent> {
        self.events.drain()
    }

    /// Advance one tick.
    pub fn tick(
        &mut self,
        input: &RiderInput,
        contact: &ContactState,
        terrain: &TerrainSample,
        dt: f32,
    ) -> CarveSnapshot {
        let dt = delta_time(dt, self.config.edge.max_dt);
        let speed = non_negative(contact.speed);
        let snow = terrain.snow.sanitized();
        let prev_edge = self.edge.angle;

        if input.switch_stance && !self.switch_held {
            self.riding_switch = !self.riding_switch;
            debug!(riding_switch = self.riding_switch, "stance toggled");
        }
        self.switch_held = input.switch_stance;

        self.tick += 1;
        self.time += dt;

        // 1. Edge
        match self.equipment {
            Equipment::Snowboard => {
                let cfg = &self.config.edge;
                self.rail = update_rail(self.rail, self.edge.angle, dt, cfg);
                let target =
                    calculate_target_edge(input.steer, input.lean, self.riding_switch, cfg);
                self.edge = update_edge(self.edge, target, self.rail.strength, dt, cfg);
            }
            Equipment::Skis => {
                let cfg = &self.config.ski_edge;
                self.rail = update_rail(self.rail, self.edge.angle, dt, cfg);
                let ski_input = SkiInput {
                    steer: input.steer,
                    lean: input.lean,
                    wedge: input.wedge,
                    riding_switch: self.riding_switch,
                };
                self.skis = update_ski_pair(
                    self.skis,
                    &ski_input,
                    self.rail.strength,
                    dt,
                    cfg,
                    &self.config.ski,
                );
                let (l, r) = (&self.skis.left, &self.skis.right);
                self.edge = EdgeState {
                    angle: self.skis.effective_edge(),
                    target_angle: l.edge.target_angle * l.pressure + r.edge.target_angle * r.pressure,
                    angular_velocity: l.edge.angular_velocity * l.pressure
                        + r.edge.angular_velocity * r.pressure,
                };
            }
        }
        let edge_angle = self.edge.angle;

        // 2. Grip
        self.grip = if contact.is_grounded {
            match self.equipment {
                Equipment::Snowboard => {
                    let grip_input = GripInput {
                        edge_angle,
                        speed,
                        sidecut_radius: self.config.rider.board_sidecut_radius,
                        board_flex: self.config.rider.board_flex,
                        pressure: board_pressure(input.lean),
                        normal_y: contact.normal_y,
                        riding_switch: self.riding_switch,
                        snow,
                    };
                    resolve_grip(&self.grip, &grip_input, dt, &self.config.grip)
                }
                Equipment::Skis => resolve_ski_grip(
                    &self.grip,
                    &self.skis,
                    speed,
                    contact.normal_y,
                    &snow,
                    self.config.rider.ski_sidecut_radius,
                    self.riding_switch,
                    dt,
                    &self.config.ski_grip,
                    &self.config.ski,
                ),
            }
        } else {
            GripState { speed, carve_quality: self.grip.carve_quality, ..GripState::default() }
        };

        // 3. Phase
        let step = self.phase.update(
            edge_angle,
            speed,
            contact.is_grounded,
            dt,
            &self.config.phase,
            &mut self.events,
        );
        self.apply_phase_step(step, terrain.rhythm_multiplier());

        // 4. Quality, chain, risk
        let sample = TurnSample {
            edge_angle,
            speed,
            g_force: self.grip.g_force,
            turn_rate: self.grip.turn_rate,
            x: contact.x,
            z: contact.z,
            dt,
        };
        self.analyzer.sample(self.phase.phase(), &sample, &self.config.quality, &self.config.chain);
        self.chain = decay_flow(self.chain, dt, &self.config.chain);
        self.detect_risk(prev_edge, edge_angle, speed, dt);

        self.session.ride_time += dt;
        if contact.is_grounded {
            self.session.distance += speed * dt;
        }
        if self.grip.is_carving {
            self.session.carving_time += dt;
        } else if self.grip.is_skidding {
            self.session.skidding_time += dt;
        }

        self.snapshot(contact.heading, dt, snow.speed_multiplier)
    }

    /// Drop the turn in progress. History, chain and session stats stay.
    pub fn reset_turn(&mut self) {
        self.phase.reset(&mut self.events);
        self.analyzer.reset_turn();
    }

    /// Back to a fresh rider with the same equipment and config.
    pub fn reset(&mut self) {
        *self = Self::new(self.equipment, self.config.clone());
    }

    fn apply_phase_step(&mut self, step: PhaseStep, rhythm: f32) {
        if let Some(done) = step.completed {
            let index = self.history.total_turns() + 1;
            let record = self.analyzer.finish_turn(
                &done,
                index,
                rhythm,
                &self.config.quality,
                &self.config.chain,
            );
            self.chain = register_turn(
                self.chain,
                record.is_clean,
                record.arc_type,
                record.timing_multiplier,
                &self.config.chain,
            );
            info!(
                index,
                direction = record.direction,
                perfection = record.perfection,
                style = record.style.as_str(),
                clean = record.is_clean,
                chain = self.chain.chain_count,
                "turn complete"
            );
            self.events.push(CarveEvent::TurnComplete(record.clone()));
            if record.is_perfect {
                info!(index, perfection = record.perfection, "perfect carve");
                self.events.push(CarveEvent::PerfectCarve(record.clone()));
            }
            self.history.push(record);
        }

        if step.discarded || step.aborted {
            self.analyzer.reset_turn();
        }

        if let Some(direction) = step.started {
            let timing = if direction != self.last_started_direction {
                let (chain, timing) = on_reversal(self.chain, self.time, &self.config.chain);
                self.chain = chain;
                timing
            } else {
                1.0
            };
            self.last_started_direction = direction;
            self.analyzer.begin_turn(timing);
        }
    }

    fn detect_risk(&mut self, prev_edge: f32, edge_angle: f32, speed: f32, dt: f32) {
        let cfg = &self.config.risk;
        let was_recovering = self.risk.is_recovering;
        self.risk = update_risk(self.risk, edge_angle, self.grip.grip_deficit, dt, cfg);

        if self.risk.is_recovering && !was_recovering {
            debug!(risk = self.risk.risk_level, "recovery started");
            self.events.push(CarveEvent::RecoveryStarted { risk_level: self.risk.risk_level });
        } else if was_recovering && !self.risk.is_recovering {
            debug!("recovery cleared");
            self.events.push(CarveEvent::RecoveryCleared);
        }

        let wash_out = check_wash_out(speed, self.grip.grip_deficit, edge_angle, cfg);
        if wash_out.is_washing_out && !self.wash_out.is_washing_out {
            warn!(intensity = wash_out.intensity, direction = wash_out.direction, "wash-out");
            self.events.push(CarveEvent::WashOut {
                intensity: wash_out.intensity,
                direction: wash_out.direction,
            });
        }
        self.wash_out = wash_out;

        let edge_catch = check_edge_catch(prev_edge, edge_angle, dt, speed, cfg);
        if edge_catch.is_catching && !self.edge_catch.is_catching {
            warn!(severity = edge_catch.severity, direction = edge_catch.direction, "edge caught");
            self.events.push(CarveEvent::EdgeCatch {
                severity: edge_catch.severity,
                direction: edge_catch.direction,
            });
        }
        self.edge_catch = edge_catch;
    }

    fn snapshot(&self, heading: f32, dt: f32, speed_multiplier: f32) -> CarveSnapshot {
        let latest = self.history.latest();
        CarveSnapshot {
            tick: self.tick,
            time: self.time,
            equipment: self.equipment,
            riding_switch: self.riding_switch,

            edge_angle: self.edge.angle,
            target_edge_angle: self.edge.target_angle,
            rail_strength: self.rail.strength,

            turn_radius: self.grip.turn_radius.is_finite().then_some(self.grip.turn_radius),
            g_force: self.grip.g_force,
            total_g: self.grip.total_g,
            is_carving: self.grip.is_carving,
            is_skidding: self.grip.is_skidding,
            slip_angle: self.grip.slip_angle,
            grip_deficit: self.grip.grip_deficit,
            carve_quality: clamp01(self.grip.carve_quality),

            speed: self.grip.speed,
            speed_scrub: self.grip.speed_scrub,
            turn_rate: self.grip.turn_rate,
            next_heading: finite_or_zero(heading) + self.grip.turn_rate * dt,
            speed_multiplier,

            phase: self.phase.phase(),
            phase_progress: self.phase.progress(&self.config.phase),
            phase_scores: self.analyzer.scores(),
            perfection: latest.map_or(0.0, |r| r.perfection),
            style: latest.map(|r| r.style),
            is_perfect: latest.map_or(false, |r| r.is_perfect),
            best_perfection: self.history.best().map_or(0.0, |r| r.perfection),
            total_turns: self.history.total_turns(),

            risk_level: self.risk.risk_level,
            is_recovering: self.risk.is_recovering,
            wash_out: self.wash_out,
            edge_catch: self.edge_catch,

            chain_count: self.chain.chain_count,
            chain_multiplier: self.chain.multiplier(),
            chain_energy: self.chain.energy,
            flow: self.chain.flow,
            average_timing: self.chain.average_timing(),

            skis: matches!(self.equipment, Equipment::Skis).then(|| SkiSnapshot::from(&self.skis)),
            session: self.session,
        }
    }
}
