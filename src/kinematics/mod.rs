//! Drivetrain kinematics and dead reckoning.

mod integrator;
mod model;

pub use integrator::OdometryIntegrator;
pub use model::SwerveKinematics;
