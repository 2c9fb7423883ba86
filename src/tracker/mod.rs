//! Tracking orchestration.
//!
//! The [`Tracker`] owns the periodic estimation cycle: it samples the
//! drivetrain, drives the fusion engine, filters and applies camera
//! measurements, and publishes the estimate. One tracker per process,
//! enforced by ownership rather than a global.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use crossbeam_channel::{bounded, Receiver};
use crossbeam_utils::atomic::AtomicCell;

use crate::bus::{BusTable, TelemetryBus, TuningStore};
use crate::core::types::{ModuleState, Pose2D, VisionMeasurement};
use crate::fusion::FusionEngine;
use crate::vision::{CameraMode, CameraSource};

/// Bus table the tracker publishes on.
const TRACKER_TABLE: &str = "Tracker";
/// Poll-rate tunable, milliseconds.
const POLL_RATE_KEY: &str = "tracker_poll_rate_ms";
const DEFAULT_POLL_RATE_MS: i64 = 20;
/// How long `stop` waits for the cycle thread to acknowledge.
const STOP_TIMEOUT: Duration = Duration::from_secs(1);

/// One cycle's worth of drivetrain state.
#[derive(Debug, Clone)]
pub struct DrivetrainSample {
    /// Continuous (unbounded) gyro heading in radians.
    pub gyro_heading_rad: f32,
    /// Per-module wheel states, fixed count matching the kinematics model.
    pub module_states: Vec<ModuleState>,
}

/// Supplies gyro and module state each cycle.
///
/// Implementations must return promptly; the whole cycle waits on this
/// call.
pub trait DrivetrainSource: Send {
    fn sample(&mut self) -> DrivetrainSample;
}

/// State shared between the cycle thread and readers.
struct TrackerShared {
    /// Last published estimate. One atomic assignment per cycle, so readers
    /// never observe a half-written pose.
    pose: AtomicCell<Pose2D>,
    running: AtomicBool,
}

/// Orchestrates the estimation cycle and publishes the fused pose.
///
/// Construct one, register cameras, then [`start`](Tracker::start). The
/// fusion engine, drivetrain source and cameras move into the cycle thread;
/// the tracker handle left behind answers [`pose`](Tracker::pose) reads and
/// controls the thread's lifetime. Dropping the tracker stops the cycle.
pub struct Tracker {
    shared: Arc<TrackerShared>,
    engine: Option<FusionEngine>,
    drivetrain: Option<Box<dyn DrivetrainSource>>,
    cameras: Vec<Box<dyn CameraSource>>,
    tuning: Arc<TuningStore>,
    table: Arc<BusTable>,
    handle: Option<JoinHandle<()>>,
    done_rx: Option<Receiver<()>>,
}

impl Tracker {
    pub fn new(
        engine: FusionEngine,
        drivetrain: Box<dyn DrivetrainSource>,
        bus: &TelemetryBus,
        tuning: Arc<TuningStore>,
    ) -> Self {
        let initial = engine.estimate();
        Self {
            shared: Arc::new(TrackerShared {
                pose: AtomicCell::new(initial),
                running: AtomicBool::new(false),
            }),
            engine: Some(engine),
            drivetrain: Some(drivetrain),
            cameras: Vec::new(),
            tuning,
            table: bus.table(TRACKER_TABLE),
            handle: None,
            done_rx: None,
        }
    }

    /// Register a camera. Setup-time only: once the cycle is running the
    /// camera is rejected with a warning.
    pub fn add_camera(&mut self, camera: Box<dyn CameraSource>) {
        if self.shared.running.load(Ordering::SeqCst) {
            log::warn!(
                "camera '{}' ignored: cameras must be added before start()",
                camera.name()
            );
            return;
        }
        self.cameras.push(camera);
    }

    /// Launch the periodic cycle. Idempotent: a second call warns and does
    /// nothing.
    pub fn start(&mut self) {
        if self.shared.running.swap(true, Ordering::SeqCst) {
            log::warn!("tracker is already running");
            return;
        }

        let (engine, drivetrain) = match (self.engine.take(), self.drivetrain.take()) {
            (Some(engine), Some(drivetrain)) => (engine, drivetrain),
            _ => {
                log::error!("tracker cannot be restarted after stop()");
                self.shared.running.store(false, Ordering::SeqCst);
                return;
            }
        };

        let poll_ms = self
            .tuning
            .get_i64(POLL_RATE_KEY, DEFAULT_POLL_RATE_MS)
            .max(1) as u64;
        let period = Duration::from_millis(poll_ms);

        let cameras = std::mem::take(&mut self.cameras);
        let shared = Arc::clone(&self.shared);
        let tuning = Arc::clone(&self.tuning);
        let table = Arc::clone(&self.table);
        let (done_tx, done_rx) = bounded(1);
        self.done_rx = Some(done_rx);

        let handle = thread::Builder::new()
            .name("drishti-tracker".to_string())
            .spawn(move || {
                log::info!(
                    "tracker cycle started at {} ms with {} camera(s)",
                    poll_ms,
                    cameras.len()
                );
                run_loop(engine, drivetrain, cameras, shared, tuning, table, period);
                let _ = done_tx.send(());
                log::info!("tracker cycle stopped");
            })
            .expect("failed to spawn tracker thread");
        self.handle = Some(handle);
    }

    /// Stop the cycle.
    ///
    /// Clears the running flag and waits up to a bounded timeout for the
    /// in-flight cycle to finish; logs and detaches the thread if the
    /// timeout is exceeded. Never blocks indefinitely.
    pub fn stop(&mut self) {
        if !self.shared.running.swap(false, Ordering::SeqCst) {
            return;
        }

        let acknowledged = match self.done_rx.take() {
            Some(done_rx) => done_rx.recv_timeout(STOP_TIMEOUT).is_ok(),
            None => false,
        };

        match self.handle.take() {
            Some(handle) if acknowledged => {
                if handle.join().is_err() {
                    log::error!("tracker thread terminated with a panic");
                }
            }
            Some(_) => {
                log::warn!(
                    "tracker cycle did not stop within {:?}; detaching",
                    STOP_TIMEOUT
                );
            }
            None => {}
        }
    }

    /// Last published estimate.
    pub fn pose(&self) -> Pose2D {
        self.shared.pose.load()
    }

    /// Whether the cycle is currently running.
    pub fn is_running(&self) -> bool {
        self.shared.running.load(Ordering::SeqCst)
    }
}

impl Drop for Tracker {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Microseconds since the Unix epoch.
fn epoch_micros() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_micros() as u64)
        .unwrap_or(0)
}

fn run_loop(
    mut engine: FusionEngine,
    mut drivetrain: Box<dyn DrivetrainSource>,
    cameras: Vec<Box<dyn CameraSource>>,
    shared: Arc<TrackerShared>,
    tuning: Arc<TuningStore>,
    table: Arc<BusTable>,
    period: Duration,
) {
    let mut next_deadline = Instant::now() + period;
    let mut overrun_count = 0u32;

    while shared.running.load(Ordering::Relaxed) {
        // A failure inside one cycle must not take the loop down: report it
        // loudly and keep scheduling.
        let outcome = catch_unwind(AssertUnwindSafe(|| {
            run_cycle(
                &mut engine,
                drivetrain.as_mut(),
                &cameras,
                &tuning,
                &table,
                &shared,
            );
        }));
        if outcome.is_err() {
            log::error!("tracker cycle panicked; keeping the loop alive");
        }

        // Fixed rate, not fixed delay: deadlines advance by whole periods.
        // When a cycle overruns, the missed iterations are skipped; the
        // next cycle never runs concurrently with a late one.
        next_deadline += period;
        let now = Instant::now();
        if next_deadline > now {
            thread::sleep(next_deadline - now);
        } else {
            overrun_count += 1;
            if overrun_count % 10 == 1 {
                log::warn!(
                    "tracker cycle overran its {:?} period ({} overruns)",
                    period,
                    overrun_count
                );
            }
            next_deadline = now;
        }
    }
}

fn run_cycle(
    engine: &mut FusionEngine,
    drivetrain: &mut dyn DrivetrainSource,
    cameras: &[Box<dyn CameraSource>],
    tuning: &TuningStore,
    table: &BusTable,
    shared: &TrackerShared,
) {
    let now_us = epoch_micros();

    let sample = drivetrain.sample();
    engine.update(sample.gyro_heading_rad, &sample.module_states, now_us);

    for camera in cameras {
        if camera.mode() != CameraMode::Odometry {
            continue;
        }
        let cutoff = tuning.get_f64(
            &format!("{}_odometry_cutoff_distance", camera.name()),
            f64::from(camera.config().cutoff_distance_m()),
        ) as f32;
        if camera.distance_from_target() >= cutoff {
            continue;
        }
        if let Some(pose) = camera.pose() {
            let timestamp_us = now_us.saturating_sub(camera.latency_us());
            engine.add_vision_measurement(VisionMeasurement::new(timestamp_us, pose.to_pose2d()));
            log::debug!("added vision measurement from '{}'", camera.name());
        }
    }

    let estimate = engine.estimate();
    shared.pose.store(estimate);
    table.set_f64_array(
        "Estimated Pose",
        &[f64::from(estimate.x), f64::from(estimate.y)],
    );
}
