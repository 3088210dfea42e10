//! Edge, grip and snow physics.

pub mod constants;
pub mod edge;
pub mod grip;
pub mod ski;
pub mod snow;

pub use edge::{calculate_target_edge, update_edge, update_rail, EdgeState, RailState};
pub use grip::{
    calculate_g_force, calculate_turn_radius, edge_engagement, grip_coefficient, resolve_grip,
    total_g_force, GripInput, GripState,
};
pub use ski::{update_ski_pair, SkiInput, SkiPairState, SkiState, SkiTurnType};
pub use snow::{SnowCondition, TerrainSample};
