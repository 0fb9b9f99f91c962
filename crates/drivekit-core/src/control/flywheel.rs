//! Closed-loop flywheel velocity controller
//!
//! One primary motor carries the velocity sensor; any number of followers
//! mirror its commanded output (optionally sign-inverted for motors mounted
//! facing the other way). Control is feedforward plus PID correction, with a
//! minimum-setpoint cutoff that also keeps the integrator from winding up
//! while stopped.

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::control::{Feedforward, Pid};
use crate::hardware::MotorController;
use crate::{Error, Result};

/// Flywheel controller configuration
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct FlywheelConfig {
    /// Setpoints below this RPM command zero output instead of running the loop
    pub min_rpm: f64,
    /// Symmetric output saturation (voltage domain); applied after ff + PID
    pub max_output: f64,
}

impl Default for FlywheelConfig {
    fn default() -> Self {
        Self {
            min_rpm: 100.0,
            max_output: 12.0,
        }
    }
}

impl FlywheelConfig {
    /// Create a config, rejecting a negative cutoff or non-positive limit
    pub fn new(min_rpm: f64, max_output: f64) -> Result<Self> {
        if !min_rpm.is_finite() || min_rpm < 0.0 {
            return Err(Error::Config(format!(
                "flywheel min_rpm must be finite and >= 0, got {}",
                min_rpm
            )));
        }
        if !max_output.is_finite() || max_output <= 0.0 {
            return Err(Error::Config(format!(
                "flywheel max_output must be finite and > 0, got {}",
                max_output
            )));
        }
        Ok(Self {
            min_rpm,
            max_output,
        })
    }
}

/// A follower motor mirroring the primary's commanded output
struct FollowerLink {
    motor: Arc<dyn MotorController>,
    inverted: bool,
}

/// Leader/follower flywheel velocity controller
pub struct Flywheel {
    primary: Arc<dyn MotorController>,
    followers: Vec<FollowerLink>,
    feedforward: Feedforward,
    pid: Pid,
    config: FlywheelConfig,
}

impl std::fmt::Debug for Flywheel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Flywheel")
            .field("followers", &self.followers.len())
            .field("feedforward", &self.feedforward)
            .field("config", &self.config)
            .finish()
    }
}

impl Flywheel {
    /// Create a flywheel controller around a primary motor
    pub fn new(
        primary: Arc<dyn MotorController>,
        feedforward: Feedforward,
        pid: Pid,
        config: FlywheelConfig,
    ) -> Self {
        Self {
            primary,
            followers: Vec::new(),
            feedforward,
            pid,
            config,
        }
    }

    /// Link a follower that mirrors the primary's output, negated if inverted
    pub fn add_follower(&mut self, motor: Arc<dyn MotorController>, inverted: bool) {
        self.followers.push(FollowerLink { motor, inverted });
    }

    /// Measured velocity of the primary motor, reported direction-agnostic
    pub fn velocity(&self) -> f64 {
        let v = self.primary.velocity();
        if v.is_finite() {
            v.abs()
        } else {
            tracing::warn!(velocity = v, "non-finite velocity feedback, reporting 0");
            0.0
        }
    }

    /// Command zero output everywhere and reset the integrator
    ///
    /// This is the only integrator-reset path; it fires whenever the setpoint
    /// drops below the cutoff, so the loop restarts clean when spun back up.
    pub fn stop(&mut self) {
        self.write_all(0.0);
        self.pid.reset();
    }

    /// Run one control tick toward `target_rpm`
    ///
    /// A non-finite target (possible when the setpoint comes from an
    /// externally writable tunable) is treated as a stop request.
    pub fn periodic(&mut self, target_rpm: f64, dt: f64) {
        if !target_rpm.is_finite() {
            tracing::warn!(target_rpm, "non-finite target, stopping flywheel");
            self.stop();
            return;
        }
        if target_rpm < self.config.min_rpm {
            self.stop();
            return;
        }

        let measured = {
            let v = self.primary.velocity();
            if v.is_finite() {
                v
            } else {
                tracing::warn!(velocity = v, "non-finite velocity feedback, using 0");
                0.0
            }
        };

        let correction = self.pid.update(target_rpm, measured, dt);
        let output = self.feedforward.calculate(target_rpm) + correction;
        self.write_all(output.clamp(-self.config.max_output, self.config.max_output));
    }

    fn write_all(&self, output: f64) {
        self.primary.set(output);
        for link in &self.followers {
            link.motor.set(if link.inverted { -output } else { output });
        }
    }
}
