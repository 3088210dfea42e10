//! Events emitted during a tick.
//!
//! The rider appends to an [`EventLog`] while it updates; the caller drains it
//! after `tick` returns. Nothing is invoked re-entrantly.

use serde::{Deserialize, Serialize};

use crate::analysis::phase::TurnPhase;
use crate::analysis::turn::TurnRecord;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CarveEvent {
    PhaseChange { phase: TurnPhase, previous: TurnPhase },
    TurnComplete(TurnRecord),
    PerfectCarve(TurnRecord),
    WashOut { intensity: f32, direction: i8 },
    EdgeCatch { severity: f32, direction: i8 },
    RecoveryStarted { risk_level: f32 },
    RecoveryCleared,
}

impl CarveEvent {
    pub fn name(&self) -> &'static str {
        match self {
            Self::PhaseChange { .. } => "phase_change",
            Self::TurnComplete(_) => "turn_complete",
            Self::PerfectCarve(_) => "perfect_carve",
            Self::WashOut { .. } => "wash_out",
            Self::EdgeCatch { .. } => "edge_catch",
            Self::RecoveryStarted { .. } => "recovery_started",
            Self::RecoveryCleared => "recovery_cleared",
        }
    }
}

/// Append-only buffer drained once per tick by the owner.
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    events: Vec<CarveEvent>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, event: CarveEvent) {
        self.events.push(event);
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &CarveEvent> {
        self.events.iter()
    }

    /// Take everything, leaving the log empty.
    pub fn drain(&mut self) -> Vec<CarveEvent> {
        std::mem::take(&mut self.events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drain_empties_log() {
        let mut log = EventLog::new();
        log.push(CarveEvent::RecoveryCleared);
        log.push(CarveEvent::PhaseChange { phase: TurnPhase::Initiation, previous: TurnPhase::Neutral });
        assert_eq!(log.len(), 2);

        let drained = log.drain();
        assert_eq!(drained.len(), 2);
        assert!(log.is_empty());
        assert_eq!(drained[1].name(), "phase_change");
    }

    #[test]
    fn test_event_json_is_tagged() {
        let event = CarveEvent::WashOut { intensity: 0.5, direction: -1 };
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("\"type\":\"wash_out\""));

        let phase = CarveEvent::PhaseChange { phase: TurnPhase::Apex, previous: TurnPhase::Loading };
        let json = serde_json::to_string(&phase).unwrap();
        assert!(json.contains("\"phase\":\"apex\""));
    }
}
