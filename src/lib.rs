//! DrishtiTrack - vision-aided pose tracking for swerve-drive robots.
//!
//! Fuses continuous wheel/gyro odometry with intermittent, delayed vision
//! observations into a single field-frame pose estimate, published at a
//! fixed rate from a background cycle.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │                    tracker/                         │  ← Orchestration
//! │        (periodic cycle, atomic pose cell)           │
//! └─────────────────────────────────────────────────────┘
//!                          │
//! ┌──────────────────────────┐ ┌──────────────────────┐
//! │         fusion/          │ │       vision/        │  ← Estimation / sources
//! │ (history buffer, engine) │ │  (camera variants)   │
//! └──────────────────────────┘ └──────────────────────┘
//!                          │
//! ┌─────────────────────────────────────────────────────┐
//! │              kinematics/        bus/                │  ← Drivetrain / config
//! │      (swerve model, integrator, key-value bus)      │
//! └─────────────────────────────────────────────────────┘
//!                          │
//! ┌─────────────────────────────────────────────────────┐
//! │                      core/                          │  ← Foundation
//! │                 (math, types)                       │
//! └─────────────────────────────────────────────────────┘
//! ```
//!
//! # Fusion model
//!
//! Odometry is integrated every cycle and appended to a short time-ordered
//! history. A vision measurement carries its own capture timestamp; the
//! engine interpolates the history at that instant, computes the residual
//! against what was believed then, and folds a trust-weighted fraction of
//! it into a cumulative correction applied to all future estimates. This
//! deliberately trades full covariance propagation for constant-time
//! corrections and bounded memory while still absorbing delayed,
//! out-of-order measurements correctly.

pub mod bus;
pub mod core;
pub mod error;
pub mod fusion;
pub mod kinematics;
pub mod tracker;
pub mod vision;

// Core types
pub use core::types::{ModuleState, Pose2D, Pose3D, PoseSample, Twist2D};
pub use core::types::{TrustVector, VisionMeasurement};

// Kinematics
pub use kinematics::{OdometryIntegrator, SwerveKinematics};

// Fusion
pub use fusion::{FusionConfig, FusionEngine, PoseHistoryBuffer};

// Vision
pub use vision::{
    CameraConfig, CameraMode, CameraSource, CoprocessorCamera, Fiducial, FieldLayout,
    FiducialCamera, PoseResolver, NO_TARGET_DISTANCE,
};

// Bus
pub use bus::{BusTable, BusValue, TelemetryBus, TuningStore};

// Tracker
pub use tracker::{DrivetrainSample, DrivetrainSource, Tracker};

// Errors
pub use error::{Result, TrackError};
