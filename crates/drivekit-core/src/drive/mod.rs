//! Drivetrain control: command mixing, stall detection, mode selection, and
//! the teleop drive subsystem that ties them together.

mod mixing;
mod mode;
mod stall;
mod teleop;

pub use mixing::{arcade, curvature, WheelSpeeds};
pub use mode::{select_mode, DriveMode, Gear};
pub use stall::StallDetector;
pub use teleop::{TeleopConfig, TeleopDrive};
