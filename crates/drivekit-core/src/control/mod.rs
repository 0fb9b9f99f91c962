//! Control systems: PID, feedforward, flywheel velocity control, and the
//! fixed-rate tick scheduler that drives every subsystem.

mod feedforward;
mod flywheel;
mod pid;
mod scheduler;

pub use feedforward::Feedforward;
pub use flywheel::{Flywheel, FlywheelConfig};
pub use pid::{Pid, PidConfig, PidState};
pub use scheduler::{LoopConfig, LoopHandle, LoopStats, Scheduler, Subsystem};
