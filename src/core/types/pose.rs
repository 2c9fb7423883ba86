//! Pose types for planar tracking.

use serde::{Deserialize, Serialize};

use crate::core::math::wrap_angle;

/// Robot pose in the field frame.
///
/// Position (x, y) in meters and heading in radians, kept in the canonical
/// range [0, 2π).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pose2D {
    /// X position in meters
    pub x: f32,
    /// Y position in meters
    pub y: f32,
    /// Heading in radians, canonical [0, 2π)
    pub heading: f32,
}

impl Pose2D {
    /// Create a new pose with the heading wrapped into [0, 2π).
    #[inline]
    pub fn new(x: f32, y: f32, heading: f32) -> Self {
        Self {
            x,
            y,
            heading: wrap_angle(heading),
        }
    }

    /// Pose at the field origin with zero heading.
    #[inline]
    pub fn origin() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            heading: 0.0,
        }
    }

    /// Planar distance to another pose.
    #[inline]
    pub fn distance_to(&self, other: &Pose2D) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }
}

impl Default for Pose2D {
    fn default() -> Self {
        Self::origin()
    }
}

/// A full six-degree-of-freedom pose as reported by a vision source.
///
/// Translation in meters, rotation in radians. The fusion core only consumes
/// the planar projection; the remaining components are carried so sources
/// can report what they actually measured.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pose3D {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub roll: f32,
    pub pitch: f32,
    pub yaw: f32,
}

impl Pose3D {
    #[inline]
    pub fn new(x: f32, y: f32, z: f32, roll: f32, pitch: f32, yaw: f32) -> Self {
        Self {
            x,
            y,
            z,
            roll,
            pitch,
            yaw,
        }
    }

    /// Build from a `[x, y, z, roll, pitch, yaw]` array, the wire shape
    /// vision coprocessors report.
    #[inline]
    pub fn from_array(values: [f64; 6]) -> Self {
        Self {
            x: values[0] as f32,
            y: values[1] as f32,
            z: values[2] as f32,
            roll: values[3] as f32,
            pitch: values[4] as f32,
            yaw: values[5] as f32,
        }
    }

    /// Project onto the field plane: (x, y, yaw) with the yaw wrapped.
    #[inline]
    pub fn to_pose2d(&self) -> Pose2D {
        Pose2D::new(self.x, self.y, self.yaw)
    }
}

impl Default for Pose3D {
    fn default() -> Self {
        Self::new(0.0, 0.0, 0.0, 0.0, 0.0, 0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f32::consts::TAU;

    #[test]
    fn test_pose2d_new_wraps_heading() {
        let pose = Pose2D::new(1.0, 2.0, TAU + 0.5);
        assert_relative_eq!(pose.heading, 0.5, epsilon = 1e-5);

        let pose = Pose2D::new(0.0, 0.0, -0.5);
        assert_relative_eq!(pose.heading, TAU - 0.5, epsilon = 1e-5);
    }

    #[test]
    fn test_pose2d_distance() {
        let a = Pose2D::new(0.0, 0.0, 0.0);
        let b = Pose2D::new(3.0, 4.0, 1.0);
        assert_relative_eq!(a.distance_to(&b), 5.0);
    }

    #[test]
    fn test_pose3d_planar_projection() {
        let p = Pose3D::from_array([1.0, 2.0, 0.3, 0.01, 0.02, -0.5]);
        let flat = p.to_pose2d();
        assert_relative_eq!(flat.x, 1.0);
        assert_relative_eq!(flat.y, 2.0);
        assert_relative_eq!(flat.heading, TAU - 0.5, epsilon = 1e-5);
    }
}
