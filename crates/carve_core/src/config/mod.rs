//! # Carve Configuration
//!
//! Every tuning constant of the engine lives here, grouped per subsystem.
//! The values are tuned for game feel; changing them changes how the game
//! rides, not whether it is correct.
//!
//! ## Usage
//! ```rust
//! use carve_core::config::CarveConfig;
//!
//! let config = CarveConfig::default();
//! let arcade = CarveConfig::arcade();
//! let from_env = CarveConfig::from_env_or_default();
//! assert!(config.validate().is_ok());
//! ```
//!
//! ## Environment Variables
//!
//! - `CARVE_PROFILE`: Select preset (arcade, simulation, default)

mod chain_config;
mod edge_config;
mod grip_config;
mod phase_config;
mod quality_config;
mod risk_config;
mod ski_config;

pub use chain_config::ChainConfig;
pub use edge_config::EdgeConfig;
pub use grip_config::GripConfig;
pub use phase_config::PhaseConfig;
pub use quality_config::{QualityConfig, QualityWeights};
pub use risk_config::RiskConfig;
pub use ski_config::SkiConfig;

use std::env;
use std::path::Path;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{ConfigError, Result};

pub const PROFILE_ENV_VAR: &str = "CARVE_PROFILE";

/// Equipment geometry defaults for a rider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct RiderConfig {
    /// Board sidecut radius (m) (default: 7.0)
    pub board_sidecut_radius: f32,
    /// Ski sidecut radius (m) (default: 14.0)
    pub ski_sidecut_radius: f32,
    /// Board flex, 0 = stiff, 1 = noodle (default: 0.5)
    pub board_flex: f32,
}

impl Default for RiderConfig {
    fn default() -> Self {
        Self { board_sidecut_radius: 7.0, ski_sidecut_radius: 14.0, board_flex: 0.5 }
    }
}

/// Full engine configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct CarveConfig {
    pub edge: EdgeConfig,
    pub ski_edge: EdgeConfig,
    pub grip: GripConfig,
    pub ski_grip: GripConfig,
    pub phase: PhaseConfig,
    pub quality: QualityConfig,
    pub chain: ChainConfig,
    pub ski: SkiConfig,
    pub risk: RiskConfig,
    pub rider: RiderConfig,
}

impl Default for CarveConfig {
    fn default() -> Self {
        Self {
            edge: EdgeConfig::default(),
            ski_edge: EdgeConfig::ski(),
            grip: GripConfig::default(),
            ski_grip: GripConfig::ski(),
            phase: PhaseConfig::default(),
            quality: QualityConfig::default(),
            chain: ChainConfig::default(),
            ski: SkiConfig::default(),
            risk: RiskConfig::default(),
            rider: RiderConfig::default(),
        }
    }
}

impl CarveConfig {
    /// Realistic feel (default)
    pub fn realistic() -> Self {
        Self::default()
    }

    /// Arcade: forgiving grip, snappy edges, wide timing window
    pub fn arcade() -> Self {
        Self {
            edge: EdgeConfig::arcade(),
            grip: GripConfig::arcade(),
            ski_grip: GripConfig { min_turn_radius: 1.5, ..GripConfig::arcade() },
            chain: ChainConfig::arcade(),
            risk: RiskConfig { washout_speed: 16.0, ..RiskConfig::default() },
            ..Self::default()
        }
    }

    /// Simulation: tighter grip budget and timing
    pub fn simulation() -> Self {
        Self {
            grip: GripConfig::simulation(),
            ski_grip: GripConfig { min_turn_radius: 1.5, ..GripConfig::simulation() },
            chain: ChainConfig::simulation(),
            ..Self::default()
        }
    }

    /// Test baseline. Same numbers as `default()`; kept separate so tests
    /// keep their expectations if the shipped default is retuned.
    pub fn deterministic() -> Self {
        Self::default()
    }

    /// Load from environment variable CARVE_PROFILE or use default
    pub fn from_env_or_default() -> Self {
        let profile = env::var(PROFILE_ENV_VAR).unwrap_or_default().to_lowercase();
        match profile.as_str() {
            "arcade" => {
                info!(profile = "arcade", "carve config preset selected");
                Self::arcade()
            }
            "simulation" => {
                info!(profile = "simulation", "carve config preset selected");
                Self::simulation()
            }
            "" | "default" | "realistic" => Self::default(),
            other => {
                warn!(profile = other, "unknown {} value, using default config", PROFILE_ENV_VAR);
                Self::default()
            }
        }
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        let cfg: Self = serde_json::from_str(json)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let cfg: Self = serde_yaml::from_str(yaml)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Load a `.json`, `.yaml` or `.yml` file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let extension =
            path.extension().and_then(|e| e.to_str()).unwrap_or_default().to_lowercase();
        let text = std::fs::read_to_string(path)?;
        let cfg = match extension.as_str() {
            "json" => Self::from_json_str(&text)?,
            "yaml" | "yml" => Self::from_yaml_str(&text)?,
            _ => return Err(ConfigError::UnsupportedFormat { extension }),
        };
        info!(path = %path.display(), "carve config loaded");
        Ok(cfg)
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// JSON schema of the config file format.
    pub fn json_schema() -> schemars::schema::RootSchema {
        schemars::schema_for!(CarveConfig)
    }

    /// Range and consistency checks.
    pub fn validate(&self) -> Result<()> {
        for (prefix, edge) in [("edge", &self.edge), ("ski_edge", &self.ski_edge)] {
            check_range(prefix, "max_edge_angle", edge.max_edge_angle, 0.01, std::f32::consts::FRAC_PI_2)?;
            check_range(prefix, "max_dt", edge.max_dt, 0.001, 1.0)?;
            check_range(prefix, "spring_constant", edge.spring_constant, 0.0, 10_000.0)?;
            check_range(prefix, "base_damping", edge.base_damping, 0.0, 1_000.0)?;
            check_range(prefix, "rail_damping_bonus", edge.rail_damping_bonus, 0.0, 1_000.0)?;
        }

        for (prefix, grip) in [("grip", &self.grip), ("ski_grip", &self.ski_grip)] {
            check_range(prefix, "rider_mass", grip.rider_mass, 1.0, 500.0)?;
            check_range(prefix, "max_dt", grip.max_dt, 0.001, 1.0)?;
            let step = self.edge.max_dt.max(self.ski_edge.max_dt);
            if grip.max_dt < step {
                return Err(ConfigError::Inconsistent {
                    reason: format!(
                        "{prefix}.max_dt ({}) must be >= the edge step cap ({step})",
                        grip.max_dt
                    ),
                });
            }
            check_range(prefix, "carve_buffer", grip.carve_buffer, 1.0, 3.0)?;
            check_range(prefix, "sin_floor", grip.sin_floor, 1e-6, 0.5)?;
            check_range(prefix, "min_turn_radius", grip.min_turn_radius, 0.1, 100.0)?;
            check_range(prefix, "min_engagement", grip.min_engagement, 0.0, 1.0)?;
            check_range(prefix, "optimal_edge", grip.optimal_edge, 0.01, std::f32::consts::FRAC_PI_2)?;
            if grip.base_grip <= 0.0 || grip.base_grip > grip.max_grip {
                return Err(ConfigError::Inconsistent {
                    reason: format!(
                        "{prefix}.base_grip ({}) must be in (0, max_grip ({})]",
                        grip.base_grip, grip.max_grip
                    ),
                });
            }
        }

        let phase = &self.phase;
        check_range("phase", "carve_threshold", phase.carve_threshold, 0.0, 1.0)?;
        check_range("phase", "release_ratio", phase.release_ratio, 0.0, 1.0)?;
        if phase.unload_threshold >= phase.apex_threshold {
            return Err(ConfigError::Inconsistent {
                reason: "phase.unload_threshold must be below phase.apex_threshold".to_string(),
            });
        }

        let weight_sum = self.quality.weights.sum();
        if (weight_sum - 1.0).abs() > 1e-3 {
            return Err(ConfigError::Inconsistent {
                reason: format!("quality.weights sum to {weight_sum:.4}, expected 1.0"),
            });
        }
        if self.quality.window_size < 3 || self.quality.history_capacity == 0 {
            return Err(ConfigError::Inconsistent {
                reason: "quality.window_size must be >= 3 and history_capacity >= 1".to_string(),
            });
        }

        let chain = &self.chain;
        if chain.panic_threshold >= chain.lost_momentum_threshold {
            return Err(ConfigError::Inconsistent {
                reason: "chain.panic_threshold must be below chain.lost_momentum_threshold".to_string(),
            });
        }
        if chain.j_turn_degrees >= chain.c_turn_degrees {
            return Err(ConfigError::Inconsistent {
                reason: "chain.j_turn_degrees must be below chain.c_turn_degrees".to_string(),
            });
        }

        let risk = &self.risk;
        check_range("risk", "high_threshold", risk.high_threshold, 0.0, 1.0)?;
        check_range("risk", "low_threshold", risk.low_threshold, 0.0, 1.0)?;
        if risk.low_threshold >= risk.high_threshold {
            return Err(ConfigError::Inconsistent {
                reason: "risk.low_threshold must be below risk.high_threshold".to_string(),
            });
        }

        check_range("rider", "board_flex", self.rider.board_flex, 0.0, 1.0)?;
        check_range("rider", "board_sidecut_radius", self.rider.board_sidecut_radius, 0.5, 100.0)?;
        check_range("rider", "ski_sidecut_radius", self.rider.ski_sidecut_radius, 0.5, 100.0)?;
        Ok(())
    }
}

fn check_range(prefix: &str, name: &str, value: f32, min: f32, max: f32) -> Result<()> {
    if value.is_finite() && value >= min && value <= max {
        return Ok(());
    }
    Err(ConfigError::OutOfRange { field: format!("{prefix}.{name}"), value, min, max })
}
