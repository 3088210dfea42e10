//! Input sanitization at the update boundary.
//!
//! Every external scalar passes through one of these before it reaches the
//! physics. Inside a tick values are assumed finite and in range.

/// Non-finite values (NaN, ±inf) become 0.
#[inline]
pub fn finite_or_zero(v: f32) -> f32 {
    if v.is_finite() {
        v
    } else {
        0.0
    }
}

/// Clamp a normalized quantity to [0, 1]. Non-finite → 0.
#[inline]
pub fn clamp01(v: f32) -> f32 {
    finite_or_zero(v).clamp(0.0, 1.0)
}

/// Clamp to [-limit, +limit]. Non-finite → 0.
#[inline]
pub fn clamp_symmetric(v: f32, limit: f32) -> f32 {
    let limit = finite_or_zero(limit).abs();
    finite_or_zero(v).clamp(-limit, limit)
}

/// Clamp a stick/axis input to [-1, 1].
#[inline]
pub fn axis(v: f32) -> f32 {
    clamp_symmetric(v, 1.0)
}

/// Non-negative finite value (speeds, radii). Non-finite or negative → 0.
#[inline]
pub fn non_negative(v: f32) -> f32 {
    finite_or_zero(v).max(0.0)
}

/// Timestep guard: non-finite/negative → 0, capped at `max_dt`.
#[inline]
pub fn delta_time(dt: f32, max_dt: f32) -> f32 {
    non_negative(dt).min(max_dt)
}

/// Sign as -1/0/+1 with a dead band around zero.
#[inline]
pub fn sign_with_deadband(v: f32, deadband: f32) -> i8 {
    if v > deadband {
        1
    } else if v < -deadband {
        -1
    } else {
        0
    }
}
