//! Turn analysis: phases, quality scoring, records, chain and risk.

pub mod chain;
pub mod phase;
pub mod quality;
pub mod risk;
pub mod turn;

pub use chain::{classify_arc, transition_timing_multiplier, ArcType, CarveChainState};
pub use phase::{CompletedTurn, PhaseStep, TurnPhase, TurnPhaseMachine};
pub use quality::{CarveAnalyzer, PhaseScores, TurnSample};
pub use risk::{check_edge_catch, check_wash_out, update_risk, EdgeCatch, RiskState, WashOut};
pub use turn::{CarveStyle, PathSample, StyleCounts, TurnHistory, TurnRecord};
