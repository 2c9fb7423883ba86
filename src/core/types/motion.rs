//! Drivetrain motion types.

use serde::{Deserialize, Serialize};

/// Incremental robot-frame motion for one control cycle.
///
/// dx points along the robot's forward axis, dy along its left axis,
/// dtheta counter-clockwise.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Twist2D {
    /// Forward motion in meters
    pub dx: f32,
    /// Leftward motion in meters
    pub dy: f32,
    /// Rotation in radians
    pub dtheta: f32,
}

impl Twist2D {
    #[inline]
    pub fn new(dx: f32, dy: f32, dtheta: f32) -> Self {
        Self { dx, dy, dtheta }
    }
}

/// Per-wheel state snapshot supplied by the drivetrain each cycle.
///
/// `distance_m` is the cumulative distance the wheel has rolled;
/// `azimuth_rad` is the wheel's steering angle in the robot frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ModuleState {
    /// Cumulative wheel travel in meters
    pub distance_m: f32,
    /// Wheel azimuth in radians, robot frame
    pub azimuth_rad: f32,
}

impl ModuleState {
    #[inline]
    pub fn new(distance_m: f32, azimuth_rad: f32) -> Self {
        Self {
            distance_m,
            azimuth_rad,
        }
    }
}
