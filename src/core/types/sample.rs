//! Timestamped measurement types.
//!
//! Timestamps are microseconds since the Unix epoch throughout the crate.

use serde::{Deserialize, Serialize};

use super::{Pose2D, TrustVector};

/// An odometry-only pose recorded at a point in time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PoseSample {
    /// Timestamp in microseconds since epoch
    pub timestamp_us: u64,
    /// The odometry pose at that instant
    pub pose: Pose2D,
}

impl PoseSample {
    #[inline]
    pub fn new(timestamp_us: u64, pose: Pose2D) -> Self {
        Self { timestamp_us, pose }
    }
}

/// A vision observation of the robot's field pose.
///
/// Carries the time the image was captured (not the time it arrived) so the
/// fusion engine can reconcile it against the odometry history. Transient:
/// consumed by the engine, never stored.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VisionMeasurement {
    /// Capture timestamp in microseconds since epoch
    pub timestamp_us: u64,
    /// Observed field pose
    pub pose: Pose2D,
    /// Per-measurement trust override; `None` uses the source default
    pub trust: Option<TrustVector>,
}

impl VisionMeasurement {
    #[inline]
    pub fn new(timestamp_us: u64, pose: Pose2D) -> Self {
        Self {
            timestamp_us,
            pose,
            trust: None,
        }
    }

    /// Attach a per-measurement trust override.
    #[inline]
    pub fn with_trust(mut self, trust: TrustVector) -> Self {
        self.trust = Some(trust);
        self
    }
}
