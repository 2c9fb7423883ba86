//! Core value types.

mod motion;
mod pose;
mod sample;
mod trust;

pub use motion::{ModuleState, Twist2D};
pub use pose::{Pose2D, Pose3D};
pub use sample::{PoseSample, VisionMeasurement};
pub use trust::TrustVector;
