//! Odometry/vision fusion: pose history and the fusion engine.

mod engine;
mod history;

pub use engine::{FusionConfig, FusionEngine};
pub use history::PoseHistoryBuffer;
