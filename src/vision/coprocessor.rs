//! Object-tracking camera with named pose resolvers.

use std::sync::Arc;

use crate::bus::{BusTable, TelemetryBus};
use crate::core::types::Pose3D;
use crate::error::{Result, TrackError};

use super::{CameraConfig, CameraMode, CameraSource, NO_TARGET_DISTANCE};

/// Turns a camera's raw bus table into one named object's robot-relative
/// pose. Returns `None` when that object is not currently resolvable.
pub type PoseResolver = Box<dyn Fn(&BusTable) -> Option<Pose3D> + Send + Sync>;

/// A coprocessor camera tracking one or more named objects.
///
/// A single physical sensor can report several independent target poses;
/// each gets a named resolver over the camera's bus table. [`pose`]
/// (CameraSource::pose) answers with the selected resolver, so callers that
/// care which object they get should call
/// [`select`](CoprocessorCamera::select) first: with several resolvers
/// registered and none selected, the first registered one wins.
///
/// Table entries consumed directly:
/// - `"has_target"` (int): 1 when the sensor sees anything
/// - `"latency_ms"` (float): total capture + processing latency
/// - `"target_distance"` (float): range to the active target, meters
pub struct CoprocessorCamera {
    config: CameraConfig,
    table: Arc<BusTable>,
    resolvers: Vec<(String, PoseResolver)>,
    selected: Option<usize>,
}

impl CoprocessorCamera {
    /// Create an object-tracking camera.
    ///
    /// Odometry mode requires fiducial localization, which this variant
    /// does not perform, so constructing one in that mode is a
    /// configuration error.
    pub fn new(config: CameraConfig, bus: &TelemetryBus) -> Result<Self> {
        if config.mode() == CameraMode::Odometry {
            return Err(TrackError::Config(format!(
                "camera '{}' cannot be used for odometry: a field-pose source is required",
                config.name()
            )));
        }
        let table = bus.table(config.name());
        Ok(Self {
            config,
            table,
            resolvers: Vec::new(),
            selected: None,
        })
    }

    /// Register a named resolver. Registration order decides which resolver
    /// answers when none has been selected.
    pub fn register_resolver(&mut self, name: impl Into<String>, resolver: PoseResolver) {
        self.resolvers.push((name.into(), resolver));
    }

    /// Select which named object future [`pose`](CameraSource::pose) calls
    /// resolve.
    pub fn select(&mut self, name: &str) -> Result<()> {
        match self.resolvers.iter().position(|(n, _)| n == name) {
            Some(index) => {
                self.selected = Some(index);
                Ok(())
            }
            None => Err(TrackError::Config(format!(
                "camera '{}' has no resolver named '{}'",
                self.config.name(),
                name
            ))),
        }
    }

    /// Resolve one named object's pose, regardless of selection.
    pub fn object_pose(&self, name: &str) -> Option<Pose3D> {
        let Some((_, resolver)) = self.resolvers.iter().find(|(n, _)| n == name) else {
            log::warn!(
                "camera '{}' has no resolver named '{}'",
                self.config.name(),
                name
            );
            return None;
        };
        resolver(&self.table)
    }

    /// Names of the registered resolvers, in registration order.
    pub fn resolver_names(&self) -> Vec<&str> {
        self.resolvers.iter().map(|(n, _)| n.as_str()).collect()
    }
}

impl CameraSource for CoprocessorCamera {
    fn config(&self) -> &CameraConfig {
        &self.config
    }

    fn has_target(&self) -> bool {
        self.table.get_i64("has_target", 0) == 1
    }

    fn pose(&self) -> Option<Pose3D> {
        if !self.has_target() {
            return None;
        }
        let index = match self.selected {
            Some(index) => index,
            None => {
                if self.resolvers.len() > 1 {
                    log::debug!(
                        "camera '{}' has {} resolvers and no selection; using '{}'",
                        self.config.name(),
                        self.resolvers.len(),
                        self.resolvers[0].0
                    );
                }
                0
            }
        };
        let (_, resolver) = self.resolvers.get(index)?;
        resolver(&self.table)
    }

    fn latency_us(&self) -> u64 {
        (self.table.get_f64("latency_ms", 0.0).max(0.0) * 1_000.0) as u64
    }

    fn distance_from_target(&self) -> f32 {
        if !self.has_target() {
            return NO_TARGET_DISTANCE;
        }
        let distance = self.table.get_f64("target_distance", f64::from(NO_TARGET_DISTANCE));
        if distance.is_nan() {
            return NO_TARGET_DISTANCE;
        }
        distance as f32
    }
}
