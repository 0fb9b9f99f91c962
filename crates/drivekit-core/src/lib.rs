//! drivekit-core: real-time control core for a differential-drive robot
//!
//! A small control library for a two-gear differential drivetrain and a
//! closed-loop flywheel shooter. The library owns the signal processing and
//! control math; hardware wiring, command scheduling, and dashboards live
//! outside it and are reached through the traits in [`hardware`].
//!
//! # Modules
//!
//! - [`math`] - Scalar shaping helpers and digital filters
//! - [`stream`] - Per-tick scalar/boolean input streams and debouncing
//! - [`control`] - PID, feedforward, flywheel controller, and the tick scheduler
//! - [`drive`] - Drive mixing, stall detection, and the teleop drive subsystem
//! - [`shooter`] - Flywheel shooter subsystem (primary + feeder + hood)
//! - [`hardware`] - Actuator and operator-input traits, with mocks for tests
//! - [`tunable`] - Live-tunable named parameters
//!
//! # Architecture
//!
//! ```text
//! operator axes ──► stream (deadband → spow → low-pass) ──► drive::TeleopDrive
//!                                                                │
//!                                               gear shift + wheel outputs
//!
//! target RPM ──► control::Flywheel (feedforward + PID) ──► motor + followers
//! ```
//!
//! Everything is driven by one fixed-period caller (20 ms nominal); each
//! subsystem exposes a `periodic(dt)` entry point and owns all of its
//! cross-tick state, so no locking is needed inside the control path.

#![warn(unused_must_use)]

pub mod control;
pub mod drive;
pub mod hardware;
pub mod math;
pub mod shooter;
pub mod stream;
pub mod tunable;

// Re-exports for convenience
pub use control::{
    Feedforward, Flywheel, FlywheelConfig, LoopConfig, Pid, PidConfig, Scheduler, Subsystem,
};
pub use drive::{DriveMode, Gear, StallDetector, TeleopDrive, WheelSpeeds};
pub use hardware::{DriveTrain, MotorController, OperatorInput, Solenoid};
pub use math::{Filter, FilterChain, LowPassFilter};
pub use shooter::{Shooter, ShooterConfig};
pub use stream::{BoolStream, Debouncer, ScalarStream};
pub use tunable::{Tunable, TunableBool, TunableStore};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Error types for drivekit-core
///
/// Construction-time validation is the main error source: a control loop over
/// always-available scalar reads has nothing to recover from mid-tick, so bad
/// parameters are rejected before the first tick instead. A bad tick
/// self-heals on the next one.
#[derive(Debug, thiserror::Error)]
#[must_use = "errors must be handled or explicitly ignored with let _ = ..."]
#[non_exhaustive]
pub enum Error {
    /// Invalid configuration parameter.
    /// Handle by: validating gains/thresholds before constructing components.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Hardware-level error from an actuator or sensor handle.
    /// Handle by: checking the handle's status, ensuring a safe state before retry.
    #[error("Hardware error: {0}")]
    Hardware(String),

    /// Control loop timing or execution error.
    /// Handle by: reducing loop rate, profiling the tick callback.
    #[error("Control loop error: {0}")]
    ControlLoop(String),
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::Hardware(format!("I/O error: {}", e))
    }
}

/// Result type alias for drivekit-core operations
pub type Result<T> = std::result::Result<T, Error>;
