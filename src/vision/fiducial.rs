//! Field-pose camera backed by onboard fiducial localization.

use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::bus::{BusTable, TelemetryBus};
use crate::core::types::Pose3D;
use crate::error::{Result, TrackError};

use super::{CameraConfig, CameraMode, CameraSource, NO_TARGET_DISTANCE};

/// One fiducial marker in the field layout.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Fiducial {
    pub id: u32,
    pub pose: Pose3D,
}

/// Immutable map of fiducial ids to their field poses.
///
/// Loaded once when a field-pose camera is constructed and never mutated
/// afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldLayout {
    fiducials: Vec<Fiducial>,
}

impl FieldLayout {
    pub fn from_fiducials(fiducials: Vec<Fiducial>) -> Self {
        Self { fiducials }
    }

    /// Load a layout from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| TrackError::Layout(format!("failed to read {}: {}", path.display(), e)))?;
        serde_json::from_str(&content)
            .map_err(|e| TrackError::Layout(format!("failed to parse {}: {}", path.display(), e)))
    }

    /// Field pose of a fiducial by id.
    pub fn fiducial_pose(&self, id: u32) -> Option<&Pose3D> {
        self.fiducials.iter().find(|f| f.id == id).map(|f| &f.pose)
    }

    /// Planar distance from `(x, y)` to the nearest fiducial, or `None` for
    /// an empty layout.
    pub fn nearest_distance(&self, x: f32, y: f32) -> Option<f32> {
        self.fiducials
            .iter()
            .map(|f| {
                let dx = f.pose.x - x;
                let dy = f.pose.y - y;
                (dx * dx + dy * dy).sqrt()
            })
            .min_by(|a, b| a.total_cmp(b))
    }

    pub fn len(&self) -> usize {
        self.fiducials.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fiducials.is_empty()
    }
}

/// A camera whose coprocessor localizes the robot against field fiducials
/// and reports the result on the camera's bus table.
///
/// Table entries consumed:
/// - `"tv"` (int): 1 when a target is visible
/// - `"botpose"` (float array): `[x, y, z, roll, pitch, yaw]` field pose
/// - `"tl"`, `"cl"` (float): pipeline and capture latency, milliseconds
///
/// The distance to the target is derived as the planar distance from the
/// reported pose to the nearest fiducial in the layout, which tracks actual
/// range and needs no extra wire data.
pub struct FiducialCamera {
    config: CameraConfig,
    table: Arc<BusTable>,
    layout: FieldLayout,
}

impl FiducialCamera {
    /// Create a field-pose camera.
    ///
    /// The configuration must be in [`CameraMode::Odometry`]; object
    /// tracking is the coprocessor variant's job.
    pub fn new(config: CameraConfig, bus: &TelemetryBus, layout: FieldLayout) -> Result<Self> {
        if config.mode() != CameraMode::Odometry {
            return Err(TrackError::Config(format!(
                "fiducial camera '{}' only supports odometry mode",
                config.name()
            )));
        }
        if layout.is_empty() {
            log::warn!(
                "fiducial camera '{}' has an empty field layout; distance filtering is disabled",
                config.name()
            );
        }
        let table = bus.table(config.name());
        Ok(Self {
            config,
            table,
            layout,
        })
    }

    /// The field layout this camera was constructed with.
    pub fn layout(&self) -> &FieldLayout {
        &self.layout
    }
}

impl CameraSource for FiducialCamera {
    fn config(&self) -> &CameraConfig {
        &self.config
    }

    fn has_target(&self) -> bool {
        self.table.get_i64("tv", 0) == 1
    }

    fn pose(&self) -> Option<Pose3D> {
        if !self.has_target() {
            return None;
        }
        let values = self.table.get_f64_array("botpose", &[]);
        if values.len() < 6 {
            log::warn!(
                "camera '{}' reported a malformed botpose ({} values)",
                self.config.name(),
                values.len()
            );
            return None;
        }
        Some(Pose3D::from_array([
            values[0], values[1], values[2], values[3], values[4], values[5],
        ]))
    }

    fn latency_us(&self) -> u64 {
        let total_ms = self.table.get_f64("tl", 0.0) + self.table.get_f64("cl", 0.0);
        (total_ms.max(0.0) * 1_000.0) as u64
    }

    fn distance_from_target(&self) -> f32 {
        let Some(pose) = self.pose() else {
            return NO_TARGET_DISTANCE;
        };
        self.layout
            .nearest_distance(pose.x, pose.y)
            .unwrap_or(NO_TARGET_DISTANCE)
    }
}
