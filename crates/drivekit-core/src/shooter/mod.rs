//! Flywheel shooter subsystem
//!
//! A primary flywheel (leader motor plus an inverted follower in the stock
//! wiring) and a feeder flywheel that tracks a live-tunable multiple of the
//! primary setpoint, plus a hood solenoid for the two shot angles. The hood
//! has no interaction with the velocity loops beyond living here.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::control::{Flywheel, Subsystem};
use crate::hardware::Solenoid;
use crate::tunable::{Tunable, TunableStore};

/// Shooter-level configuration
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ShooterConfig {
    /// Setpoints below this RPM stop both flywheels
    pub min_rpm: f64,
    /// Default preset for shots from the tarmac ring
    pub ring_rpm: f64,
    /// Default preset for shots against the fender
    pub fender_rpm: f64,
    /// Default feeder setpoint multiplier
    pub feeder_multiplier: f64,
}

impl Default for ShooterConfig {
    fn default() -> Self {
        Self {
            min_rpm: 100.0,
            ring_rpm: 3900.0,
            fender_rpm: 3000.0,
            feeder_multiplier: 1.0,
        }
    }
}

/// The shooter subsystem
pub struct Shooter {
    shooter: Flywheel,
    feeder: Flywheel,
    hood: Arc<dyn Solenoid>,
    target_rpm: Tunable,
    feeder_multiplier: Tunable,
    ring_rpm: Tunable,
    fender_rpm: Tunable,
    min_rpm: f64,
}

impl std::fmt::Debug for Shooter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Shooter")
            .field("shooter", &self.shooter)
            .field("feeder", &self.feeder)
            .finish()
    }
}

impl Shooter {
    /// Assemble the shooter from its two flywheel controllers and hood
    pub fn new(
        shooter: Flywheel,
        feeder: Flywheel,
        hood: Arc<dyn Solenoid>,
        store: &TunableStore,
        config: ShooterConfig,
    ) -> Self {
        Self {
            shooter,
            feeder,
            hood,
            target_rpm: store.number("Shooter/Target RPM", 0.0),
            feeder_multiplier: store.number("Shooter/Feeder Multiplier", config.feeder_multiplier),
            ring_rpm: store.number("Shooter/Ring RPM", config.ring_rpm),
            fender_rpm: store.number("Shooter/Fender RPM", config.fender_rpm),
            min_rpm: config.min_rpm,
        }
    }

    /// Set the target RPM directly
    pub fn set_target_rpm(&self, rpm: f64) {
        self.target_rpm.set(rpm);
    }

    /// Spin up to the ring-shot preset
    pub fn set_ring_shot(&self) {
        self.target_rpm.set(self.ring_rpm.get());
    }

    /// Spin up to the fender-shot preset
    pub fn set_fender_shot(&self) {
        self.target_rpm.set(self.fender_rpm.get());
    }

    /// Stop requesting a shot
    pub fn set_idle(&self) {
        self.target_rpm.set(0.0);
    }

    /// Extend the hood for the long shot angle
    pub fn extend_hood(&self) {
        self.hood.set(true);
    }

    /// Retract the hood
    pub fn retract_hood(&self) {
        self.hood.set(false);
    }

    /// Primary flywheel speed, direction-agnostic
    pub fn shooter_rpm(&self) -> f64 {
        self.shooter.velocity()
    }

    /// Feeder flywheel speed, direction-agnostic
    pub fn feeder_rpm(&self) -> f64 {
        self.feeder.velocity()
    }
}

impl Subsystem for Shooter {
    fn periodic(&mut self, dt: f64) {
        // Target and multiplier are read once per tick; both may have been
        // retuned since the last one.
        let setpoint = self.target_rpm.get();

        if setpoint < self.min_rpm {
            self.shooter.stop();
            self.feeder.stop();
        } else {
            self.shooter.periodic(setpoint, dt);
            self.feeder.periodic(setpoint * self.feeder_multiplier.get(), dt);
        }
    }
}
