//! Vision pose sources.
//!
//! A camera is anything that can answer five questions: do you see a
//! target, where is the pose you derive from it, how stale is that answer,
//! how far away is the target, and which kind of pose do you produce. All
//! answers are empty/sentinel values when there is no data; a camera query
//! must never stall or fail the tracking cycle.

mod coprocessor;
mod fiducial;

pub use coprocessor::{CoprocessorCamera, PoseResolver};
pub use fiducial::{Fiducial, FieldLayout, FiducialCamera};

use crate::core::types::Pose3D;
use crate::error::{Result, TrackError};

/// What kind of pose a camera produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CameraMode {
    /// Field-frame robot pose, usable for odometry correction.
    Odometry,
    /// Robot-relative pose of some tracked object.
    Object,
}

/// Immutable camera configuration.
#[derive(Debug, Clone)]
pub struct CameraConfig {
    name: String,
    mode: CameraMode,
    cutoff_distance_m: f32,
    fov_deg: f32,
    mount: Pose3D,
}

impl CameraConfig {
    /// Default distance beyond which odometry measurements are ignored.
    pub const DEFAULT_CUTOFF_M: f32 = 3.0;

    /// Create a validated configuration.
    ///
    /// The name must be non-empty (it doubles as the camera's bus table
    /// name) and the cutoff distance positive.
    pub fn new(
        name: impl Into<String>,
        mode: CameraMode,
        cutoff_distance_m: f32,
        fov_deg: f32,
        mount: Pose3D,
    ) -> Result<Self> {
        let name = name.into();
        if name.is_empty() {
            return Err(TrackError::Config("camera name must not be empty".into()));
        }
        if !(cutoff_distance_m > 0.0) {
            return Err(TrackError::Config(format!(
                "camera '{}' cutoff distance must be positive, got {}",
                name, cutoff_distance_m
            )));
        }
        Ok(Self {
            name,
            mode,
            cutoff_distance_m,
            fov_deg,
            mount,
        })
    }

    /// Configuration with the default cutoff, no field of view, and an
    /// identity mount transform.
    pub fn basic(name: impl Into<String>, mode: CameraMode) -> Result<Self> {
        Self::new(name, mode, Self::DEFAULT_CUTOFF_M, -1.0, Pose3D::default())
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn mode(&self) -> CameraMode {
        self.mode
    }

    #[inline]
    pub fn cutoff_distance_m(&self) -> f32 {
        self.cutoff_distance_m
    }

    #[inline]
    pub fn fov_deg(&self) -> f32 {
        self.fov_deg
    }

    /// Camera mount transform relative to the robot center.
    #[inline]
    pub fn mount(&self) -> &Pose3D {
        &self.mount
    }
}

/// Distance sentinel reported when a camera has no target.
pub const NO_TARGET_DISTANCE: f32 = -1.0;

/// Capability set every vision pose source provides.
///
/// Implementations are queried from the tracking cycle thread and must
/// return promptly; "no data" is always an empty or sentinel value, never
/// an error.
pub trait CameraSource: Send {
    /// The camera's immutable configuration.
    fn config(&self) -> &CameraConfig;

    /// Whether the camera currently sees a target.
    fn has_target(&self) -> bool;

    /// The derived pose: field-frame in [`CameraMode::Odometry`],
    /// robot-relative in [`CameraMode::Object`]. `None` without a target.
    fn pose(&self) -> Option<Pose3D>;

    /// Total capture + processing latency in microseconds.
    fn latency_us(&self) -> u64;

    /// Distance to the current target in meters, or
    /// [`NO_TARGET_DISTANCE`] when there is none. Never NaN.
    fn distance_from_target(&self) -> f32;

    fn name(&self) -> &str {
        self.config().name()
    }

    fn mode(&self) -> CameraMode {
        self.config().mode()
    }
}
