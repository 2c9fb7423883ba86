//! Fusion Scenario Tests
//!
//! Synthetic drivetrain/vision sequences to validate the fusion math
//! without hardware:
//! - Odometry-only dead reckoning across heading wraps
//! - Trust-weighted absorption of vision measurements
//! - Delayed-measurement reconciliation against the pose history
//! - Staleness and no-op edge cases
//!
//! Run with: `cargo test --test fusion_scenarios`

use approx::assert_relative_eq;
use drishti_track::{
    FusionConfig, FusionEngine, ModuleState, Pose2D, SwerveKinematics, TrustVector,
    VisionMeasurement,
};
use std::f32::consts::TAU;

const CYCLE_US: u64 = 20_000;

fn square_kinematics() -> SwerveKinematics {
    SwerveKinematics::new(&[(0.3, 0.3), (0.3, -0.3), (-0.3, -0.3), (-0.3, 0.3)])
}

fn engine_at_origin() -> FusionEngine {
    FusionEngine::new(square_kinematics(), Pose2D::origin(), FusionConfig::default())
}

/// Forward wheel travel split over `cycles` updates at fixed gyro heading.
fn drive_straight(
    engine: &mut FusionEngine,
    start_ts: u64,
    cycles: u64,
    total_distance: f32,
    gyro: f32,
    start_distance: f32,
) -> u64 {
    let mut ts = start_ts;
    for i in 1..=cycles {
        ts = start_ts + i * CYCLE_US;
        let distance = start_distance + total_distance * i as f32 / cycles as f32;
        engine.update(gyro, &[ModuleState::new(distance, 0.0); 4], ts);
    }
    ts
}

#[test]
fn stationary_robot_with_half_weight_vision_moves_halfway() {
    let mut engine = engine_at_origin();
    engine.update(0.0, &[ModuleState::new(0.0, 0.0); 4], 0);
    engine.update(0.0, &[ModuleState::new(0.0, 0.0); 4], CYCLE_US);

    let estimate = engine.estimate();
    assert_relative_eq!(estimate.x, 0.0);
    assert_relative_eq!(estimate.y, 0.0);
    assert_relative_eq!(estimate.heading, 0.0);

    // Measurement trust equal to wheel trust: a 50 % blend.
    engine.add_vision_measurement(
        VisionMeasurement::new(CYCLE_US, Pose2D::new(1.0, 0.0, 0.0))
            .with_trust(TrustVector::uniform(0.1)),
    );

    let estimate = engine.estimate();
    assert_relative_eq!(estimate.x, 0.5, epsilon = 1e-6);
    assert_relative_eq!(estimate.y, 0.0, epsilon = 1e-6);
    assert_relative_eq!(estimate.heading, 0.0, epsilon = 1e-6);
}

#[test]
fn correction_from_delayed_measurement_propagates_forward() {
    let mut engine = engine_at_origin();
    engine.update(0.0, &[ModuleState::new(0.0, 0.0); 4], 0);

    // Drive 1 m over 20 cycles, then keep driving another meter.
    let mid_ts = drive_straight(&mut engine, 0, 20, 1.0, 0.0, 0.0);
    let end_ts = drive_straight(&mut engine, mid_ts, 20, 1.0, 0.0, 1.0);
    assert_relative_eq!(engine.estimate().x, 2.0, epsilon = 1e-4);

    // A fully-trusted measurement captured back at the midpoint says the
    // robot was 0.25 m further along than odometry believed. The residual
    // must ride forward onto the current estimate unchanged.
    engine.add_vision_measurement(
        VisionMeasurement::new(mid_ts, Pose2D::new(1.25, 0.0, 0.0))
            .with_trust(TrustVector::uniform(0.0)),
    );
    assert_relative_eq!(engine.estimate().x, 2.25, epsilon = 1e-4);

    // Later odometry builds on the corrected estimate.
    drive_straight(&mut engine, end_ts, 10, 0.5, 0.0, 2.0);
    assert_relative_eq!(engine.estimate().x, 2.75, epsilon = 1e-4);
}

#[test]
fn repeated_confident_measurements_converge_without_overshoot() {
    let mut engine = engine_at_origin();
    engine.update(0.0, &[ModuleState::new(0.0, 0.0); 4], 0);

    let target = Pose2D::new(1.0, -0.5, 0.2);
    let mut previous_error = f32::INFINITY;
    for i in 1..=30u64 {
        let ts = i * CYCLE_US;
        engine.update(0.0, &[ModuleState::new(0.0, 0.0); 4], ts);
        engine.add_vision_measurement(
            VisionMeasurement::new(ts, target).with_trust(TrustVector::uniform(0.05)),
        );

        let estimate = engine.estimate();
        let error = estimate.distance_to(&target);
        assert!(
            error <= previous_error + 1e-6,
            "error grew from {} to {}",
            previous_error,
            error
        );
        previous_error = error;
    }
    assert!(previous_error < 1e-3, "residual error {}", previous_error);
}

#[test]
fn heading_correction_crosses_the_seam() {
    // Robot parked with its heading just below the wrap point.
    let mut engine = FusionEngine::new(
        square_kinematics(),
        Pose2D::new(0.0, 0.0, TAU - 0.05),
        FusionConfig::default(),
    );
    engine.update(TAU - 0.05, &[ModuleState::new(0.0, 0.0); 4], 0);
    engine.update(TAU - 0.05, &[ModuleState::new(0.0, 0.0); 4], CYCLE_US);
    assert_relative_eq!(engine.estimate().heading, TAU - 0.05, epsilon = 1e-5);

    // Vision says the true heading is just past the seam. The correction
    // must take the 0.1 rad short path, not sweep 2π − 0.1 backwards.
    engine.add_vision_measurement(
        VisionMeasurement::new(CYCLE_US, Pose2D::new(0.0, 0.0, 0.05))
            .with_trust(TrustVector::uniform(0.0)),
    );
    assert_relative_eq!(engine.estimate().heading, 0.05, epsilon = 1e-4);
}

#[test]
fn measurement_older_than_retention_is_ignored() {
    let mut engine = engine_at_origin();
    engine.update(0.0, &[ModuleState::new(0.0, 0.0); 4], 0);
    // Run for 4 s; the 1.5 s window prunes everything before ~2.5 s.
    let end_ts = drive_straight(&mut engine, 0, 200, 2.0, 0.0, 0.0);
    assert_eq!(end_ts, 200 * CYCLE_US);
    let before = engine.estimate();

    engine.add_vision_measurement(
        VisionMeasurement::new(1_000_000, Pose2D::new(9.0, 9.0, 1.0))
            .with_trust(TrustVector::uniform(0.0)),
    );

    let after = engine.estimate();
    assert_relative_eq!(before.x, after.x);
    assert_relative_eq!(before.y, after.y);
    assert_relative_eq!(before.heading, after.heading);
}

#[test]
fn ignored_vision_leaves_moving_estimate_on_odometry() {
    let mut engine = engine_at_origin();
    engine.update(0.0, &[ModuleState::new(0.0, 0.0); 4], 0);
    let ts = drive_straight(&mut engine, 0, 10, 1.0, 0.0, 0.0);

    // A worthless measurement must not perturb dead reckoning.
    engine.add_vision_measurement(
        VisionMeasurement::new(ts, Pose2D::new(7.0, 7.0, 3.0))
            .with_trust(TrustVector::uniform(1e12)),
    );

    let estimate = engine.estimate();
    assert_relative_eq!(estimate.x, 1.0, epsilon = 1e-4);
    assert_relative_eq!(estimate.y, 0.0, epsilon = 1e-4);
}

#[test]
fn translation_and_heading_are_weighted_independently() {
    let mut engine = engine_at_origin();
    engine.update(0.0, &[ModuleState::new(0.0, 0.0); 4], 0);
    engine.update(0.0, &[ModuleState::new(0.0, 0.0); 4], CYCLE_US);

    // Fully trusted translation, worthless heading.
    engine.add_vision_measurement(
        VisionMeasurement::new(CYCLE_US, Pose2D::new(1.0, 1.0, 1.0))
            .with_trust(TrustVector::planar(0.0, 1e12)),
    );

    let estimate = engine.estimate();
    assert_relative_eq!(estimate.x, 1.0, epsilon = 1e-6);
    assert_relative_eq!(estimate.y, 1.0, epsilon = 1e-6);
    assert_relative_eq!(estimate.heading, 0.0, epsilon = 1e-6);
}
