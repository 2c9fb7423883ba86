//! Time-synchronized odometry/vision fusion.

use serde::{Deserialize, Serialize};

use crate::core::math::signed_angle_difference;
use crate::core::types::{ModuleState, Pose2D, TrustVector, VisionMeasurement};
use crate::kinematics::{OdometryIntegrator, SwerveKinematics};

use super::PoseHistoryBuffer;

fn default_retention_secs() -> f32 {
    1.5
}

/// Fusion engine tuning.
///
/// Trust values are standard deviations: higher means trust less. The
/// defaults match the usual starting point for a swerve drivetrain with a
/// decent gyro, wheels trusted an order of magnitude more than vision.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FusionConfig {
    /// Trust of the wheel/gyro state estimate.
    pub wheel_trust: TrustVector,
    /// Default trust of vision measurements (per-measurement override wins).
    pub vision_trust: TrustVector,
    /// How long odometry history is kept for late measurements, seconds.
    #[serde(default = "default_retention_secs")]
    pub retention_secs: f32,
}

impl Default for FusionConfig {
    fn default() -> Self {
        Self {
            wheel_trust: TrustVector::uniform(0.1),
            vision_trust: TrustVector::planar(0.9, 0.9),
            retention_secs: default_retention_secs(),
        }
    }
}

/// Cumulative field-frame correction accumulated from vision measurements.
#[derive(Debug, Clone, Copy, Default)]
struct CorrectionOffset {
    dx: f32,
    dy: f32,
    dheading: f32,
}

/// Fuses continuous wheel/gyro odometry with delayed vision observations.
///
/// Every cycle [`update`](FusionEngine::update) integrates odometry and
/// appends the raw pose to a short history. A vision measurement is
/// reconciled against the interpolated historical pose at its own capture
/// time, and the trust-weighted residual is folded into a cumulative
/// correction that applies to current and future estimates only. History
/// is never rewritten, so each measurement costs a buffer lookup plus a
/// constant-time blend regardless of how stale it is.
#[derive(Debug, Clone)]
pub struct FusionEngine {
    integrator: OdometryIntegrator,
    history: PoseHistoryBuffer,
    correction: CorrectionOffset,
    wheel_trust: TrustVector,
    vision_trust: TrustVector,
    retention_us: u64,
}

impl FusionEngine {
    pub fn new(kinematics: SwerveKinematics, initial_pose: Pose2D, config: FusionConfig) -> Self {
        Self {
            integrator: OdometryIntegrator::new(kinematics, initial_pose),
            history: PoseHistoryBuffer::new(),
            correction: CorrectionOffset::default(),
            wheel_trust: config.wheel_trust,
            vision_trust: config.vision_trust,
            retention_us: (config.retention_secs * 1_000_000.0) as u64,
        }
    }

    /// Integrate one cycle of drivetrain state.
    ///
    /// Appends the raw odometry pose to the history at `timestamp_us`,
    /// prunes samples past the retention window, and returns the published
    /// estimate (raw pose plus cumulative correction).
    pub fn update(
        &mut self,
        gyro_heading_rad: f32,
        modules: &[ModuleState],
        timestamp_us: u64,
    ) -> Pose2D {
        let raw = self.integrator.update(gyro_heading_rad, modules);
        self.history.insert(timestamp_us, raw);
        self.history
            .prune_before(timestamp_us.saturating_sub(self.retention_us));
        self.estimate()
    }

    /// Absorb a delayed vision observation.
    ///
    /// The measurement is compared against what the estimator believed at
    /// the measurement's own capture time (the interpolated historical
    /// odometry pose with the current correction applied) and the residual
    /// is blended per axis with `wheel_sigma / (wheel_sigma + vision_sigma)`.
    /// Comparing against the corrected historical estimate (rather than raw
    /// odometry) makes repeated identical measurements converge on the
    /// vision pose instead of compounding.
    ///
    /// A measurement older than the retained history is dropped with a
    /// warning and leaves the estimate untouched.
    pub fn add_vision_measurement(&mut self, measurement: VisionMeasurement) {
        let oldest = match self.history.oldest_timestamp() {
            Some(t) => t,
            None => {
                log::warn!("dropping vision measurement: no odometry history yet");
                return;
            }
        };
        if measurement.timestamp_us < oldest {
            log::warn!(
                "dropping vision measurement at {}: older than retained history ({})",
                measurement.timestamp_us,
                oldest
            );
            return;
        }

        let odom_at = match self.history.interpolate_at(measurement.timestamp_us) {
            Some(pose) => pose,
            None => return,
        };
        let believed = self.apply_correction(odom_at);

        let trust = measurement.trust.unwrap_or(self.vision_trust);
        let wx = blend_weight(self.wheel_trust.sigma_x, trust.sigma_x);
        let wy = blend_weight(self.wheel_trust.sigma_y, trust.sigma_y);
        let wh = blend_weight(self.wheel_trust.sigma_heading, trust.sigma_heading);

        self.correction.dx += wx * (measurement.pose.x - believed.x);
        self.correction.dy += wy * (measurement.pose.y - believed.y);
        self.correction.dheading +=
            wh * signed_angle_difference(believed.heading, measurement.pose.heading);
    }

    /// Current best estimate: raw odometry plus cumulative correction.
    #[inline]
    pub fn estimate(&self) -> Pose2D {
        self.apply_correction(self.integrator.pose())
    }

    /// Replace the default vision trust.
    pub fn set_vision_trust(&mut self, trust: TrustVector) {
        self.vision_trust = trust;
    }

    /// Re-seed the estimator at a known pose, discarding history and any
    /// accumulated correction.
    pub fn reset_pose(&mut self, pose: Pose2D) {
        self.integrator.reset(pose);
        self.history.clear();
        self.correction = CorrectionOffset::default();
    }

    /// Number of retained history samples.
    #[inline]
    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    #[inline]
    fn apply_correction(&self, pose: Pose2D) -> Pose2D {
        Pose2D::new(
            pose.x + self.correction.dx,
            pose.y + self.correction.dy,
            pose.heading + self.correction.dheading,
        )
    }
}

/// Fraction of the residual absorbed for one axis.
///
/// `state_sigma / (state_sigma + measurement_sigma)`: a near-zero
/// measurement sigma (near-total confidence) pulls the weight to 1, a huge
/// one pushes it to 0. Both sigmas zero means the state already claims
/// perfect trust, so nothing is absorbed.
#[inline]
fn blend_weight(state_sigma: f32, measurement_sigma: f32) -> f32 {
    let sum = state_sigma + measurement_sigma;
    if sum <= f32::EPSILON {
        0.0
    } else {
        state_sigma / sum
    }
}
