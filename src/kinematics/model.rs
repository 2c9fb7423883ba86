//! Swerve drivetrain kinematics.
//!
//! Maps per-module wheel motion onto a single robot-frame twist. The module
//! offsets are fixed at construction, so the least-squares normal matrix for
//! the rigid-body fit is inverted once up front and each conversion is a
//! single 3×3 multiply.

use crate::core::types::{ModuleState, Twist2D};

/// Fixed geometric mapping from swerve module motion to robot motion.
///
/// Each module at offset `(rx, ry)` from the robot center observes the
/// displacement `(dx - ry·dθ, dy + rx·dθ)` for a robot twist `(dx, dy, dθ)`.
/// With more than three scalar observations the system is overdetermined;
/// the twist is recovered as the least-squares solution.
#[derive(Debug, Clone)]
pub struct SwerveKinematics {
    /// Module offsets from the robot center, meters, robot frame.
    offsets: Vec<(f32, f32)>,
    /// Inverse of the (constant) normal matrix of the fit.
    inverse: [[f32; 3]; 3],
}

impl SwerveKinematics {
    /// Build a kinematics model for the given module offsets.
    ///
    /// # Panics
    ///
    /// Panics when no modules are given or the layout is degenerate (all
    /// modules at the robot center), since rotation is unobservable then.
    pub fn new(offsets: &[(f32, f32)]) -> Self {
        assert!(!offsets.is_empty(), "at least one swerve module is required");

        let n = offsets.len() as f32;
        let sx: f32 = offsets.iter().map(|o| o.0).sum();
        let sy: f32 = offsets.iter().map(|o| o.1).sum();
        let q: f32 = offsets.iter().map(|o| o.0 * o.0 + o.1 * o.1).sum();

        // Normal matrix A = MᵀM for rows [1, 0, -ry; 0, 1, rx]:
        //   [ n    0   -sy ]
        //   [ 0    n    sx ]
        //   [ -sy  sx   q  ]
        let det = n * (n * q - sx * sx - sy * sy);
        assert!(
            det.abs() > 1e-9,
            "degenerate swerve module layout: rotation is unobservable"
        );

        let adj00 = n * q - sx * sx;
        let adj01 = -sx * sy;
        let adj02 = n * sy;
        let adj11 = n * q - sy * sy;
        let adj12 = -n * sx;
        let adj22 = n * n;

        let inverse = [
            [adj00 / det, adj01 / det, adj02 / det],
            [adj01 / det, adj11 / det, adj12 / det],
            [adj02 / det, adj12 / det, adj22 / det],
        ];

        Self {
            offsets: offsets.to_vec(),
            inverse,
        }
    }

    /// Number of modules in the fixed geometry.
    #[inline]
    pub fn module_count(&self) -> usize {
        self.offsets.len()
    }

    /// Convert module state deltas between two snapshots into a robot-frame
    /// twist.
    ///
    /// Each wheel's travel delta is projected along its current azimuth.
    ///
    /// # Panics
    ///
    /// Panics when either slice length differs from the module count; the
    /// module set is fixed for the model's lifetime and a mismatch is a
    /// contract violation, not a recoverable condition.
    pub fn twist(&self, previous: &[ModuleState], current: &[ModuleState]) -> Twist2D {
        assert_eq!(
            previous.len(),
            self.module_count(),
            "module state count does not match the kinematics model"
        );
        assert_eq!(
            current.len(),
            self.module_count(),
            "module state count does not match the kinematics model"
        );

        // b = Mᵀd accumulated over the module displacement observations.
        let mut b = [0.0f32; 3];
        for ((prev, cur), &(rx, ry)) in previous.iter().zip(current).zip(&self.offsets) {
            let travel = cur.distance_m - prev.distance_m;
            let (sin_a, cos_a) = cur.azimuth_rad.sin_cos();
            let dx = travel * cos_a;
            let dy = travel * sin_a;
            b[0] += dx;
            b[1] += dy;
            b[2] += rx * dy - ry * dx;
        }

        let m = &self.inverse;
        Twist2D::new(
            m[0][0] * b[0] + m[0][1] * b[1] + m[0][2] * b[2],
            m[1][0] * b[0] + m[1][1] * b[1] + m[1][2] * b[2],
            m[2][0] * b[0] + m[2][1] * b[1] + m[2][2] * b[2],
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f32::consts::FRAC_PI_2;

    /// Square module layout, half-width 0.3 m.
    fn square_layout() -> SwerveKinematics {
        SwerveKinematics::new(&[(0.3, 0.3), (0.3, -0.3), (-0.3, -0.3), (-0.3, 0.3)])
    }

    fn states(values: &[(f32, f32)]) -> Vec<ModuleState> {
        values
            .iter()
            .map(|&(d, a)| ModuleState::new(d, a))
            .collect()
    }

    #[test]
    fn test_pure_translation_forward() {
        let kinematics = square_layout();
        let prev = states(&[(0.0, 0.0); 4]);
        let cur = states(&[(1.0, 0.0); 4]);

        let twist = kinematics.twist(&prev, &cur);
        assert_relative_eq!(twist.dx, 1.0, epsilon = 1e-6);
        assert_relative_eq!(twist.dy, 0.0, epsilon = 1e-6);
        assert_relative_eq!(twist.dtheta, 0.0, epsilon = 1e-6);
    }

    #[test]
    fn test_pure_strafe() {
        let kinematics = square_layout();
        let prev = states(&[(0.0, FRAC_PI_2); 4]);
        let cur = states(&[(0.5, FRAC_PI_2); 4]);

        let twist = kinematics.twist(&prev, &cur);
        assert_relative_eq!(twist.dx, 0.0, epsilon = 1e-6);
        assert_relative_eq!(twist.dy, 0.5, epsilon = 1e-6);
        assert_relative_eq!(twist.dtheta, 0.0, epsilon = 1e-6);
    }

    #[test]
    fn test_rotation_in_place() {
        let kinematics = square_layout();
        // Each wheel tangent to the circle through the module positions:
        // azimuth = atan2(rx, -ry), travel = dθ · |r|.
        let radius = (0.3f32 * 0.3 + 0.3 * 0.3).sqrt();
        let dtheta = 0.2f32;
        let travel = dtheta * radius;

        let azimuths: Vec<f32> = [(0.3f32, 0.3f32), (0.3, -0.3), (-0.3, -0.3), (-0.3, 0.3)]
            .iter()
            .map(|&(rx, ry)| (rx).atan2(-ry))
            .collect();

        let prev = states(&azimuths.iter().map(|&a| (0.0, a)).collect::<Vec<_>>());
        let cur = states(&azimuths.iter().map(|&a| (travel, a)).collect::<Vec<_>>());

        let twist = kinematics.twist(&prev, &cur);
        assert_relative_eq!(twist.dx, 0.0, epsilon = 1e-5);
        assert_relative_eq!(twist.dy, 0.0, epsilon = 1e-5);
        assert_relative_eq!(twist.dtheta, dtheta, epsilon = 1e-5);
    }

    #[test]
    #[should_panic(expected = "module state count")]
    fn test_module_count_mismatch_panics() {
        let kinematics = square_layout();
        let prev = states(&[(0.0, 0.0); 4]);
        let cur = states(&[(1.0, 0.0); 3]);
        kinematics.twist(&prev, &cur);
    }

    #[test]
    #[should_panic(expected = "degenerate")]
    fn test_degenerate_layout_rejected() {
        SwerveKinematics::new(&[(0.0, 0.0), (0.0, 0.0)]);
    }
}
