//! # carve_core - Carving Physics and Turn Analysis Engine
//!
//! Real-time edge, grip and turn analysis for a snow-sport simulation. Given
//! rider input and ground contact each tick, it works out the edge angle,
//! whether the board or skis carve or skid, which phase of the turn the rider
//! is in, how well the turn was carved, and whether the rider is about to
//! wash out or catch an edge.
//!
//! ## Features
//! - Deterministic: same inputs, same outputs; no clocks, no threads
//! - Pure `(state, input) -> state` functions for every physics step
//! - Snowboard and dual-ski variants sharing one grip resolver
//! - Events drained by the caller instead of callbacks
//! - Tuning in [`config::CarveConfig`], loadable from JSON or YAML
//!
//! ## Example
//! ```
//! use carve_core::{CarveConfig, ContactState, Rider, RiderInput, TerrainSample};
//!
//! let mut rider = Rider::snowboard(CarveConfig::default());
//! let input = RiderInput { steer: 0.6, ..RiderInput::default() };
//! let contact = ContactState { speed: 12.0, ..ContactState::default() };
//!
//! for _ in 0..60 {
//!     let snapshot = rider.tick(&input, &contact, &TerrainSample::default(), 1.0 / 60.0);
//!     assert!(snapshot.edge_angle.abs() <= rider.config().edge.max_edge_angle);
//! }
//! for event in rider.drain_events() {
//!     println!("{}", event.name());
//! }
//! ```

pub mod analysis;
pub mod config;
pub mod error;
pub mod events;
pub mod physics;
pub mod rider;
pub mod sanitize;
pub mod snapshot;

pub use analysis::{
    ArcType, CarveChainState, CarveStyle, PhaseScores, RiskState, TurnHistory, TurnPhase,
    TurnRecord,
};
pub use config::CarveConfig;
pub use error::{ConfigError, Result};
pub use events::CarveEvent;
pub use physics::{EdgeState, GripState, RailState, SkiPairState, SnowCondition, TerrainSample};
pub use rider::{ContactState, Equipment, Rider, RiderInput};
pub use snapshot::{CarveSnapshot, SessionStats};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
