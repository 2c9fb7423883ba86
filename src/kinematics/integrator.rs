//! Gyro + wheel dead reckoning.

use crate::core::math::wrap_angle;
use crate::core::types::{ModuleState, Pose2D};

use super::SwerveKinematics;

/// Integrates per-cycle drivetrain state into a raw field-frame pose.
///
/// Heading is taken directly from the gyro rather than accumulated from
/// wheel rotation, so wheel slip never compounds into heading drift. A gyro
/// offset is latched on the first update so the initial pose heading is
/// honored regardless of where the gyro happens to read at startup.
///
/// Translation comes from per-module travel deltas solved through the
/// kinematics model and rotated into the field frame at the current heading.
/// Identical inputs always produce identical output.
#[derive(Debug, Clone)]
pub struct OdometryIntegrator {
    kinematics: SwerveKinematics,
    pose: Pose2D,
    /// Offset added to the raw gyro reading to produce the field heading.
    gyro_offset: f32,
    prev_modules: Vec<ModuleState>,
    /// Whether the first module/gyro snapshot has been latched.
    initialized: bool,
}

impl OdometryIntegrator {
    /// Create an integrator starting at `initial_pose`.
    pub fn new(kinematics: SwerveKinematics, initial_pose: Pose2D) -> Self {
        Self {
            kinematics,
            pose: initial_pose,
            gyro_offset: 0.0,
            prev_modules: Vec::new(),
            initialized: false,
        }
    }

    /// Integrate one cycle of drivetrain state and return the raw pose.
    ///
    /// `gyro_heading_rad` is the continuous (unbounded) gyro angle. The
    /// first call latches the reference snapshot and returns the initial
    /// pose unchanged.
    ///
    /// # Panics
    ///
    /// Panics when `modules` does not match the kinematics module count.
    pub fn update(&mut self, gyro_heading_rad: f32, modules: &[ModuleState]) -> Pose2D {
        assert_eq!(
            modules.len(),
            self.kinematics.module_count(),
            "module state count does not match the kinematics model"
        );

        if !self.initialized {
            self.gyro_offset = self.pose.heading - gyro_heading_rad;
            self.prev_modules = modules.to_vec();
            self.initialized = true;
            return self.pose;
        }

        let heading = wrap_angle(gyro_heading_rad + self.gyro_offset);
        let twist = self.kinematics.twist(&self.prev_modules, modules);

        let (sin_h, cos_h) = heading.sin_cos();
        self.pose = Pose2D::new(
            self.pose.x + twist.dx * cos_h - twist.dy * sin_h,
            self.pose.y + twist.dx * sin_h + twist.dy * cos_h,
            heading,
        );
        self.prev_modules.clear();
        self.prev_modules.extend_from_slice(modules);

        self.pose
    }

    /// Current raw (uncorrected) pose.
    #[inline]
    pub fn pose(&self) -> Pose2D {
        self.pose
    }

    /// Re-seed the integrator at a known pose.
    ///
    /// The gyro offset and module snapshot are re-latched on the next
    /// update.
    pub fn reset(&mut self, pose: Pose2D) {
        self.pose = pose;
        self.initialized = false;
    }

    /// The fixed kinematics model.
    #[inline]
    pub fn kinematics(&self) -> &SwerveKinematics {
        &self.kinematics
    }
}
