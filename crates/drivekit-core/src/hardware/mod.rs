//! Hardware abstraction traits
//!
//! The control core never touches a bus or a port; it talks to actuators and
//! operator input through these traits so the same code runs against real
//! hardware or the mocks below.
//!
//! All reads are treated as instantaneous, side-effect-free snapshots taken
//! once per tick. Commanded outputs are normalized to `[-1, 1]` or an
//! equivalent voltage domain; implementations are expected to clamp.

use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::drive::{Gear, WheelSpeeds};

/// A single motor controller: commanded output plus velocity feedback
pub trait MotorController: Send + Sync {
    /// Command an output (normalized or voltage domain)
    fn set(&self, output: f64);

    /// Measured velocity in RPM
    fn velocity(&self) -> f64;
}

/// A binary actuator (solenoid): set-only, no feedback read
pub trait Solenoid: Send + Sync {
    /// Extend (`true`) or retract (`false`)
    fn set(&self, extended: bool);
}

/// The drivetrain collaborator: gear shift, wheel outputs, stall feedback
pub trait DriveTrain: Send + Sync {
    /// Select a mechanical reduction
    fn set_gear(&self, gear: Gear);

    /// Command the wheel outputs for this tick
    fn drive(&self, speeds: WheelSpeeds);

    /// Raw stall predicate (e.g. current draw high while barely moving);
    /// debouncing happens in the control core, not here
    fn is_stalling(&self) -> bool;
}

/// Operator input source: pure per-tick getters
pub trait OperatorInput: Send + Sync {
    /// Left trigger axis, `[0, 1]`
    fn left_trigger(&self) -> f64;

    /// Right trigger axis, `[0, 1]`
    fn right_trigger(&self) -> f64;

    /// Left stick X axis, `[-1, 1]`
    fn left_x(&self) -> f64;

    /// Left bumper held
    fn left_bumper(&self) -> bool;

    /// Right bumper held
    fn right_bumper(&self) -> bool;
}

/// A mock motor for tests: records the last commanded output and plays back a
/// configurable velocity
#[derive(Debug, Default)]
pub struct MockMotor {
    output: Mutex<f64>,
    velocity: Mutex<f64>,
}

impl MockMotor {
    /// Create a mock motor at rest
    pub fn new() -> Self {
        Self::default()
    }

    /// Last commanded output
    pub fn output(&self) -> f64 {
        *self.output.lock()
    }

    /// Set the velocity the sensor will report
    pub fn set_velocity(&self, rpm: f64) {
        *self.velocity.lock() = rpm;
    }
}

impl MotorController for MockMotor {
    fn set(&self, output: f64) {
        *self.output.lock() = output;
    }

    fn velocity(&self) -> f64 {
        *self.velocity.lock()
    }
}

/// A mock solenoid recording its last commanded state
#[derive(Debug, Default)]
pub struct MockSolenoid {
    extended: AtomicBool,
}

impl MockSolenoid {
    /// Create a retracted mock solenoid
    pub fn new() -> Self {
        Self::default()
    }

    /// Last commanded state
    pub fn extended(&self) -> bool {
        self.extended.load(Ordering::Relaxed)
    }
}

impl Solenoid for MockSolenoid {
    fn set(&self, extended: bool) {
        self.extended.store(extended, Ordering::Relaxed);
    }
}

/// A mock drivetrain recording gear and wheel commands
#[derive(Debug, Default)]
pub struct MockDriveTrain {
    gear: Mutex<Option<Gear>>,
    speeds: Mutex<Option<WheelSpeeds>>,
    gear_calls: Mutex<u32>,
    drive_calls: Mutex<u32>,
    stalling: AtomicBool,
}

impl MockDriveTrain {
    /// Create a mock drivetrain with no commands recorded
    pub fn new() -> Self {
        Self::default()
    }

    /// Last selected gear
    pub fn gear(&self) -> Option<Gear> {
        *self.gear.lock()
    }

    /// Last commanded wheel speeds
    pub fn speeds(&self) -> Option<WheelSpeeds> {
        *self.speeds.lock()
    }

    /// Number of gear selection calls
    pub fn gear_calls(&self) -> u32 {
        *self.gear_calls.lock()
    }

    /// Number of drive calls
    pub fn drive_calls(&self) -> u32 {
        *self.drive_calls.lock()
    }

    /// Force the raw stall predicate
    pub fn set_stalling(&self, stalling: bool) {
        self.stalling.store(stalling, Ordering::Relaxed);
    }
}

impl DriveTrain for MockDriveTrain {
    fn set_gear(&self, gear: Gear) {
        *self.gear.lock() = Some(gear);
        *self.gear_calls.lock() += 1;
    }

    fn drive(&self, speeds: WheelSpeeds) {
        *self.speeds.lock() = Some(speeds);
        *self.drive_calls.lock() += 1;
    }

    fn is_stalling(&self) -> bool {
        self.stalling.load(Ordering::Relaxed)
    }
}

/// A mock gamepad with settable axes and buttons
#[derive(Debug, Default)]
pub struct MockInput {
    state: Mutex<MockInputState>,
}

#[derive(Debug, Default, Clone, Copy)]
struct MockInputState {
    left_trigger: f64,
    right_trigger: f64,
    left_x: f64,
    left_bumper: bool,
    right_bumper: bool,
}

impl MockInput {
    /// Create a mock gamepad with everything released
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the trigger axes
    pub fn set_triggers(&self, left: f64, right: f64) {
        let mut s = self.state.lock();
        s.left_trigger = left;
        s.right_trigger = right;
    }

    /// Set the left stick X axis
    pub fn set_left_x(&self, x: f64) {
        self.state.lock().left_x = x;
    }

    /// Set the bumpers
    pub fn set_bumpers(&self, left: bool, right: bool) {
        let mut s = self.state.lock();
        s.left_bumper = left;
        s.right_bumper = right;
    }
}

impl OperatorInput for MockInput {
    fn left_trigger(&self) -> f64 {
        self.state.lock().left_trigger
    }

    fn right_trigger(&self) -> f64 {
        self.state.lock().right_trigger
    }

    fn left_x(&self) -> f64 {
        self.state.lock().left_x
    }

    fn left_bumper(&self) -> bool {
        self.state.lock().left_bumper
    }

    fn right_bumper(&self) -> bool {
        self.state.lock().right_bumper
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_motor_records_output() {
        let motor = MockMotor::new();
        motor.set(0.75);
        assert_eq!(motor.output(), 0.75);

        motor.set_velocity(3900.0);
        assert_eq!(motor.velocity(), 3900.0);
    }

    #[test]
    fn test_mock_drivetrain_counts_calls() {
        let dt = MockDriveTrain::new();
        dt.set_gear(Gear::Low);
        dt.drive(WheelSpeeds::new(0.5, 0.5));
        dt.drive(WheelSpeeds::new(0.2, 0.2));

        assert_eq!(dt.gear(), Some(Gear::Low));
        assert_eq!(dt.gear_calls(), 1);
        assert_eq!(dt.drive_calls(), 2);
    }

    #[test]
    fn test_mock_input_roundtrip() {
        let input = MockInput::new();
        input.set_triggers(0.25, 0.75);
        input.set_left_x(-0.5);
        input.set_bumpers(false, true);

        assert_eq!(input.right_trigger() - input.left_trigger(), 0.5);
        assert_eq!(input.left_x(), -0.5);
        assert!(!input.left_bumper());
        assert!(input.right_bumper());
    }
}
