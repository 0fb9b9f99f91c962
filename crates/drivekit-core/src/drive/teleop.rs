//! Teleop drive subsystem
//!
//! Conditions the two operator axes, watches for stalls, picks a drive mode,
//! and issues exactly one gear selection and one drive command per tick. It
//! never finishes on its own; it runs until externally superseded.

use std::sync::Arc;

use crate::drive::{arcade, curvature, select_mode, DriveMode};
use crate::hardware::{DriveTrain, OperatorInput};
use crate::math::{self, Filter, FilterChain};
use crate::stream::ScalarStream;
use crate::tunable::{Tunable, TunableStore};
use crate::{control::Subsystem, drive::StallDetector, Result};

/// Floor for the live-tunable shaping exponent; keeps `|x|^p` well defined
/// even if the dashboard writes zero.
const MIN_POWER: f64 = 1e-3;

/// Floor for the live-tunable smoothing gain; zero would freeze the filter.
const MIN_ALPHA: f64 = 1e-3;

/// Construction-time teleop parameters; the axis-shaping values here are
/// dashboard defaults, retunable live through the store
#[derive(Debug, Clone, Copy)]
pub struct TeleopConfig {
    /// Default low-pass smoothing gain for the speed axis
    pub speed_alpha: f64,
    /// Default low-pass smoothing gain for the turn axis
    pub angle_alpha: f64,
    /// Speed subtracted in the forced-offset low gear mode
    pub low_gear_offset: f64,
    /// Symmetric stall debounce time in seconds
    pub stall_debounce: f64,
}

impl Default for TeleopConfig {
    fn default() -> Self {
        Self {
            speed_alpha: 0.1,
            angle_alpha: 0.7,
            low_gear_offset: 0.1,
            stall_debounce: 0.25,
        }
    }
}

/// Deadband stage whose threshold is re-read from the tunable store each tick
struct TunableDeadband {
    threshold: Tunable,
    last: f64,
}

impl Filter for TunableDeadband {
    fn update(&mut self, value: f64) -> f64 {
        self.last = math::deadband(value, self.threshold.get().max(0.0));
        self.last
    }

    fn reset(&mut self) {
        self.last = 0.0;
    }

    fn value(&self) -> f64 {
        self.last
    }
}

/// Power-shaping stage whose exponent is re-read each tick
struct TunablePow {
    power: Tunable,
    last: f64,
}

impl Filter for TunablePow {
    fn update(&mut self, value: f64) -> f64 {
        self.last = math::spow(value, self.power.get().max(MIN_POWER));
        self.last
    }

    fn reset(&mut self) {
        self.last = 0.0;
    }

    fn value(&self) -> f64 {
        self.last
    }
}

/// Low-pass stage whose smoothing gain is re-read each tick
///
/// The gain is clamped into `(0, 1]` at use, so a bad dashboard write
/// degrades smoothing instead of producing a runaway filter.
struct TunableLowPass {
    alpha: Tunable,
    value: f64,
    initialized: bool,
}

impl Filter for TunableLowPass {
    fn update(&mut self, value: f64) -> f64 {
        if !self.initialized {
            self.value = value;
            self.initialized = true;
        } else {
            let alpha = self.alpha.get().clamp(MIN_ALPHA, 1.0);
            self.value += alpha * (value - self.value);
        }
        self.value
    }

    fn reset(&mut self) {
        self.value = 0.0;
        self.initialized = false;
    }

    fn value(&self) -> f64 {
        self.value
    }
}

/// The teleop drive subsystem
pub struct TeleopDrive {
    input: Arc<dyn OperatorInput>,
    drivetrain: Arc<dyn DriveTrain>,
    speed: ScalarStream,
    angle: ScalarStream,
    stall: StallDetector,
    base_turn_speed: Tunable,
    low_gear_offset: f64,
    last_mode: Option<DriveMode>,
}

impl std::fmt::Debug for TeleopDrive {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TeleopDrive")
            .field("last_mode", &self.last_mode)
            .field("stall", &self.stall)
            .finish()
    }
}

impl TeleopDrive {
    /// Wire up the teleop drive
    ///
    /// Speed is the trigger difference (right minus left), turn is the left
    /// stick X. Both run through deadband → signed power → low-pass, in that
    /// order. Every shaping parameter — deadbands, powers, and smoothing
    /// gains — is a live tunable re-read each tick.
    pub fn new(
        input: Arc<dyn OperatorInput>,
        drivetrain: Arc<dyn DriveTrain>,
        store: &TunableStore,
        config: TeleopConfig,
    ) -> Result<Self> {
        let speed_source = {
            let input = input.clone();
            move || input.right_trigger() - input.left_trigger()
        };
        let speed = ScalarStream::new(speed_source).filtered(
            FilterChain::new()
                .then(TunableDeadband {
                    threshold: store.number("Driver Settings/Speed Deadband", 0.05),
                    last: 0.0,
                })
                .then(TunablePow {
                    power: store.number("Driver Settings/Speed Power", 1.0),
                    last: 0.0,
                })
                .then(TunableLowPass {
                    alpha: store.number("Driver Settings/Speed Filtering", config.speed_alpha),
                    value: 0.0,
                    initialized: false,
                }),
        );

        let angle_source = {
            let input = input.clone();
            move || input.left_x()
        };
        let angle = ScalarStream::new(angle_source).filtered(
            FilterChain::new()
                .then(TunableDeadband {
                    threshold: store.number("Driver Settings/Turn Deadband", 0.05),
                    last: 0.0,
                })
                .then(TunablePow {
                    power: store.number("Driver Settings/Turn Power", 1.0),
                    last: 0.0,
                })
                .then(TunableLowPass {
                    alpha: store.number("Driver Settings/Turn Filtering", config.angle_alpha),
                    value: 0.0,
                    initialized: false,
                }),
        );

        let stall = {
            let drivetrain = drivetrain.clone();
            let enabled = store.boolean("Drivetrain/Stall Detection", true);
            StallDetector::new(
                move || enabled.get() && drivetrain.is_stalling(),
                config.stall_debounce,
                true,
            )?
        };

        Ok(Self {
            input,
            drivetrain,
            speed,
            angle,
            stall,
            base_turn_speed: store.number("Driver Settings/Base Turn Speed", 0.4),
            low_gear_offset: config.low_gear_offset,
            last_mode: None,
        })
    }

    /// This command runs until externally cancelled or superseded
    pub fn is_finished(&self) -> bool {
        false
    }

    /// Current debounced stall state
    pub fn is_stalling(&self) -> bool {
        self.stall.is_stalling()
    }
}

impl Subsystem for TeleopDrive {
    fn periodic(&mut self, dt: f64) {
        // One snapshot of every input at the top of the tick.
        let speed = self.speed.get();
        let angle = self.angle.get();
        let stalling = self.stall.update(dt);
        let force_offset = self.input.left_bumper();
        let force_low = self.input.right_bumper();

        let mode = select_mode(force_offset, force_low, stalling);
        if self.last_mode != Some(mode) {
            tracing::debug!(?mode, stalling, "drive mode change");
            self.last_mode = Some(mode);
        }

        let speeds = match mode {
            DriveMode::LowGearOffset => arcade(speed - self.low_gear_offset, angle),
            DriveMode::LowGear => arcade(speed, angle),
            DriveMode::HighGear => curvature(speed, angle, self.base_turn_speed.get()),
        };

        self.drivetrain.set_gear(mode.gear());
        self.drivetrain.drive(speeds);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::drive::Gear;
    use crate::hardware::{MockDriveTrain, MockInput};
    use approx::assert_relative_eq;

    const DT: f64 = 0.02;

    fn rig(config: TeleopConfig) -> (TeleopDrive, Arc<MockInput>, Arc<MockDriveTrain>, TunableStore)
    {
        let input = Arc::new(MockInput::new());
        let drivetrain = Arc::new(MockDriveTrain::new());
        let store = TunableStore::new();
        let drive = TeleopDrive::new(input.clone(), drivetrain.clone(), &store, config).unwrap();
        (drive, input, drivetrain, store)
    }

    #[test]
    fn test_end_to_end_high_gear_straight() {
        let (mut drive, input, drivetrain, _) = rig(TeleopConfig::default());
        input.set_triggers(0.0, 0.5);

        drive.periodic(DT);

        assert_eq!(drivetrain.gear(), Some(Gear::High));
        let speeds = drivetrain.speeds().unwrap();
        // Shaped speed: deadband rescale of 0.5 at threshold 0.05; the
        // low-pass initializes on its first sample so no lag on tick one.
        // |0.5| >= base turn speed 0.4, and turn is 0, so both sides match.
        let expected = (0.5 - 0.05) / (1.0 - 0.05);
        assert_relative_eq!(speeds.left, expected, epsilon = 1e-9);
        assert_relative_eq!(speeds.right, expected, epsilon = 1e-9);
    }

    #[test]
    fn test_offset_mode_always_low_gear() {
        let (mut drive, input, drivetrain, _) = rig(TeleopConfig::default());
        input.set_bumpers(true, false);
        drivetrain.set_stalling(true); // irrelevant: offset mode wins

        for _ in 0..20 {
            drive.periodic(DT);
            assert_eq!(drivetrain.gear(), Some(Gear::Low));
        }
    }

    #[test]
    fn test_offset_subtracted_before_mixing() {
        let (mut drive, input, drivetrain, store) = rig(TeleopConfig::default());
        // Zero out the conditioning so the offset is the only transform.
        store.set_number("Driver Settings/Speed Deadband", 0.0);
        input.set_triggers(0.0, 0.5);
        input.set_bumpers(true, false);

        drive.periodic(DT);

        let speeds = drivetrain.speeds().unwrap();
        assert_relative_eq!(speeds.left, 0.4, epsilon = 1e-9);
        assert_relative_eq!(speeds.right, 0.4, epsilon = 1e-9);
    }

    #[test]
    fn test_sustained_stall_forces_low_gear() {
        let (mut drive, _input, drivetrain, _) = rig(TeleopConfig::default());
        drivetrain.set_stalling(true);

        // Under the 250 ms debounce the gear stays high...
        for _ in 0..12 {
            drive.periodic(DT);
        }
        assert_eq!(drivetrain.gear(), Some(Gear::High));

        // ...and drops to low once the stall holds past it.
        for _ in 0..5 {
            drive.periodic(DT);
        }
        assert_eq!(drivetrain.gear(), Some(Gear::Low));
        assert!(drive.is_stalling());
    }

    #[test]
    fn test_stall_detection_can_be_disabled_live() {
        let (mut drive, _input, drivetrain, store) = rig(TeleopConfig::default());
        store.set_bool("Drivetrain/Stall Detection", false);
        drivetrain.set_stalling(true);

        for _ in 0..50 {
            drive.periodic(DT);
        }
        assert_eq!(drivetrain.gear(), Some(Gear::High));
    }

    #[test]
    fn test_one_gear_and_one_drive_call_per_tick() {
        let (mut drive, _input, drivetrain, _) = rig(TeleopConfig::default());
        for i in 1..=10u32 {
            drive.periodic(DT);
            assert_eq!(drivetrain.gear_calls(), i);
            assert_eq!(drivetrain.drive_calls(), i);
        }
    }

    #[test]
    fn test_live_deadband_change_applies_next_tick() {
        let (mut drive, input, drivetrain, store) = rig(TeleopConfig::default());
        input.set_triggers(0.0, 0.2);

        drive.periodic(DT);
        assert!(drivetrain.speeds().unwrap().left > 0.0);

        // Widen the deadband past the input; the next tick must see it.
        store.set_number("Driver Settings/Speed Deadband", 0.3);
        drive.periodic(DT);
        drive.periodic(DT);
        // Low-pass decays toward zero once the shaped input is zeroed.
        for _ in 0..200 {
            drive.periodic(DT);
        }
        assert_relative_eq!(drivetrain.speeds().unwrap().left, 0.0, epsilon = 1e-6);
    }

    #[test]
    fn test_live_filtering_change_applies_next_tick() {
        let (mut drive, input, drivetrain, store) = rig(TeleopConfig::default());
        store.set_number("Driver Settings/Speed Deadband", 0.0);
        input.set_triggers(0.0, 0.5);
        drive.periodic(DT);

        // With the default gain the release decays over many ticks...
        input.set_triggers(0.0, 0.0);
        drive.periodic(DT);
        assert!(drivetrain.speeds().unwrap().left > 0.1);

        // ...but a live write of unity gain makes the very next tick exact.
        store.set_number("Driver Settings/Speed Filtering", 1.0);
        drive.periodic(DT);
        assert_relative_eq!(drivetrain.speeds().unwrap().left, 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_never_finishes() {
        let (drive, _, _, _) = rig(TeleopConfig::default());
        assert!(!drive.is_finished());
    }
}
