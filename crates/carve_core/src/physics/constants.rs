//! Physical constants and numeric guards shared by the physics modules.
//!
//! Tunable values belong in `config`; these are the ones that never change.

/// Standard gravity (m/s²)
pub const GRAVITY: f32 = 9.81;

// ============================================================
// Numeric guards
// ============================================================
pub mod guard {
    /// |edge| at or below this is a flat base: turn radius is infinite.
    pub const FLAT_EDGE: f32 = 1e-6;

    /// Denominators (dt, force) are floored here before dividing.
    pub const DIV_EPSILON: f32 = 1e-6;
}

// ============================================================
// Normal force
// ============================================================
pub mod contact {
    /// Minimum normal-y of the slope before the contact is treated as a wall.
    /// Keeps available grip non-zero on steep faces.
    pub const MIN_NORMAL_Y: f32 = 0.2;
}
