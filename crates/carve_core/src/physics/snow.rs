//! Snow conditions and the per-tick terrain sample.
//!
//! Terrain geometry is sampled elsewhere; the engine only sees these
//! multipliers for the rider's current position.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Surface multipliers at the rider's position.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct SnowCondition {
    /// Scales available grip
    pub grip_multiplier: f32,
    /// Reported to the integrator for glide speed
    pub speed_multiplier: f32,
    /// Scales skid friction (speed scrub)
    pub drag_multiplier: f32,
}

impl Default for SnowCondition {
    fn default() -> Self {
        Self::groomed()
    }
}

impl SnowCondition {
    pub fn groomed() -> Self {
        Self { grip_multiplier: 1.0, speed_multiplier: 1.0, drag_multiplier: 1.0 }
    }

    pub fn packed() -> Self {
        Self { grip_multiplier: 0.95, speed_multiplier: 1.05, drag_multiplier: 0.9 }
    }

    pub fn powder() -> Self {
        Self { grip_multiplier: 0.8, speed_multiplier: 0.85, drag_multiplier: 1.4 }
    }

    pub fn ice() -> Self {
        Self { grip_multiplier: 0.45, speed_multiplier: 1.15, drag_multiplier: 0.6 }
    }

    pub fn slush() -> Self {
        Self { grip_multiplier: 0.85, speed_multiplier: 0.8, drag_multiplier: 1.6 }
    }

    /// Non-finite → neutral 1.0, negative → 0, capped at 3.
    pub fn sanitized(self) -> Self {
        fn multiplier(v: f32) -> f32 {
            if v.is_finite() {
                v.clamp(0.0, 3.0)
            } else {
                1.0
            }
        }
        Self {
            grip_multiplier: multiplier(self.grip_multiplier),
            speed_multiplier: multiplier(self.speed_multiplier),
            drag_multiplier: multiplier(self.drag_multiplier),
        }
    }
}

/// Everything the terrain collaborator hands in for one tick.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct TerrainSample {
    pub snow: SnowCondition,
    /// Feature/rhythm multiplier applied to turn perfection only (1.0 = none)
    pub rhythm: f32,
}

impl Default for TerrainSample {
    fn default() -> Self {
        Self { snow: SnowCondition::groomed(), rhythm: 1.0 }
    }
}

impl TerrainSample {
    /// Rhythm clamped to [0.5, 1.5]; non-finite → 1.0.
    pub fn rhythm_multiplier(&self) -> f32 {
        if self.rhythm.is_finite() {
            self.rhythm.clamp(0.5, 1.5)
        } else {
            1.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ice_has_least_grip() {
        let presets = [
            SnowCondition::groomed(),
            SnowCondition::packed(),
            SnowCondition::powder(),
            SnowCondition::slush(),
        ];
        for p in presets {
            assert!(SnowCondition::ice().grip_multiplier < p.grip_multiplier);
        }
    }

    #[test]
    fn test_sanitized_replaces_nan() {
        let snow = SnowCondition { grip_multiplier: f32::NAN, speed_multiplier: -2.0, drag_multiplier: 9.0 };
        let clean = snow.sanitized();
        assert_eq!(clean.grip_multiplier, 1.0);
        assert_eq!(clean.speed_multiplier, 0.0);
        assert_eq!(clean.drag_multiplier, 3.0);
    }

    #[test]
    fn test_rhythm_multiplier_clamped() {
        let mut t = TerrainSample::default();
        assert_eq!(t.rhythm_multiplier(), 1.0);
        t.rhythm = 4.0;
        assert_eq!(t.rhythm_multiplier(), 1.5);
        t.rhythm = f32::NAN;
        assert_eq!(t.rhythm_multiplier(), 1.0);
        t.rhythm = f32::NEG_INFINITY;
        assert_eq!(t.rhythm_multiplier(), 1.0);
    }

    #[test]
    fn test_zero_rhythm_clamps_to_floor() {
        let t = TerrainSample { rhythm: 0.0, ..TerrainSample::default() };
        assert_eq!(t.rhythm_multiplier(), 0.5);
    }
}
