//! Mathematical primitives for planar pose tracking.
//!
//! Functions for canonical angle wrapping and wrap-safe angular arithmetic.
//! Headings are kept in the canonical range [0, 2π).

use std::f32::consts::{PI, TAU};

/// Wrap an angle into the canonical range [0, 2π).
///
/// Exactly 2π maps to 0. The input may be positive or negative and may lie
/// multiple turns outside the output range.
///
/// # Example
/// ```
/// use drishti_track::core::math::wrap_angle;
/// use std::f32::consts::TAU;
///
/// assert!((wrap_angle(TAU + 0.1) - 0.1).abs() < 1e-5);
/// assert!((wrap_angle(-0.1) - (TAU - 0.1)).abs() < 1e-5);
/// assert_eq!(wrap_angle(TAU), 0.0);
/// ```
#[inline]
pub fn wrap_angle(angle: f32) -> f32 {
    let wrapped = if angle >= TAU {
        angle - TAU * (angle / TAU).floor()
    } else if angle < 0.0 {
        angle + TAU * ((-angle / TAU).floor() + 1.0)
    } else {
        angle
    };
    // Rounding at the seam can land exactly on 2π.
    if wrapped >= TAU { 0.0 } else { wrapped }
}

/// Unsigned minimal angular distance between two angles, in [0, π].
///
/// Symmetric: `angle_difference(a, b) == angle_difference(b, a)`.
#[inline]
pub fn angle_difference(a: f32, b: f32) -> f32 {
    let diff = wrap_angle(a - b);
    if diff > PI { TAU - diff } else { diff }
}

/// Signed shortest rotation carrying `from` onto `to`, in [-π, π].
///
/// Adding the result to `from` (and wrapping) reaches `to` along the
/// shorter arc.
#[inline]
pub fn signed_angle_difference(from: f32, to: f32) -> f32 {
    let diff = wrap_angle(to - from);
    if diff > PI { diff - TAU } else { diff }
}

/// Step a value towards a target by at most `step`.
///
/// Returns `target` when it is within `step` of `current`.
#[inline]
pub fn step_towards(current: f32, target: f32, step: f32) -> f32 {
    if (current - target).abs() <= step {
        target
    } else if target < current {
        current - step
    } else {
        current + step
    }
}

/// Step an angle towards a target angle along the shorter rotational
/// direction, by at most `step` radians.
///
/// Both inputs are wrapped first. When the step would complete by crossing
/// the 0/2π seam it does so in a single move. Never overshoots the target,
/// and always returns a canonical angle in [0, 2π).
pub fn step_towards_circular(current: f32, target: f32, step: f32) -> f32 {
    let current = wrap_angle(current);
    let target = wrap_angle(target);
    let direction = (target - current).signum();
    let difference = (current - target).abs();

    if difference <= step {
        target
    } else if difference > PI {
        // The short way goes across the seam.
        if current + TAU - target < step || target + TAU - current < step {
            target
        } else {
            wrap_angle(current - direction * step)
        }
    } else {
        current + direction * step
    }
}

/// Interpolate between two angles along the shorter arc.
///
/// `t` should be in [0, 1] where 0 returns `a` and 1 returns `b`. The
/// result is canonical.
#[inline]
pub fn angle_lerp(a: f32, b: f32, t: f32) -> f32 {
    wrap_angle(a + signed_angle_difference(a, b) * t)
}
