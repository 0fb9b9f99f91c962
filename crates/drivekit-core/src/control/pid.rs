//! PID controller
//!
//! A velocity-loop oriented PID with integral windup protection, output
//! limits, and an optional setpoint-proportional feedforward gain (`kf`).

use serde::{Deserialize, Serialize};

/// PID controller configuration
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PidConfig {
    /// Proportional gain
    pub kp: f64,
    /// Integral gain
    pub ki: f64,
    /// Derivative gain
    pub kd: f64,
    /// Setpoint-proportional feedforward gain, applied by [`Pid::update`] only
    pub kf: f64,
    /// Output minimum limit
    pub output_min: f64,
    /// Output maximum limit
    pub output_max: f64,
    /// Integral windup limit (`f64::INFINITY` for no limit)
    pub integral_limit: f64,
}

impl Default for PidConfig {
    fn default() -> Self {
        Self {
            kp: 0.0,
            ki: 0.0,
            kd: 0.0,
            kf: 0.0,
            output_min: f64::NEG_INFINITY,
            output_max: f64::INFINITY,
            integral_limit: f64::INFINITY,
        }
    }
}

impl PidConfig {
    /// Create a new PID config with the given gains
    pub fn new(kp: f64, ki: f64, kd: f64) -> Self {
        Self {
            kp,
            ki,
            kd,
            ..Default::default()
        }
    }

    /// Create a P-only controller config
    pub fn p(kp: f64) -> Self {
        Self::new(kp, 0.0, 0.0)
    }

    /// Create a PI controller config
    pub fn pi(kp: f64, ki: f64) -> Self {
        Self::new(kp, ki, 0.0)
    }

    /// Create a PD controller config
    pub fn pd(kp: f64, kd: f64) -> Self {
        Self::new(kp, 0.0, kd)
    }

    /// Set the setpoint feedforward gain
    pub fn with_kf(mut self, kf: f64) -> Self {
        self.kf = kf;
        self
    }

    /// Set output limits
    pub fn with_limits(mut self, min: f64, max: f64) -> Self {
        self.output_min = min;
        self.output_max = max;
        self
    }

    /// Set the integral windup limit
    pub fn with_integral_limit(mut self, limit: f64) -> Self {
        self.integral_limit = limit;
        self
    }
}

/// PID controller internal state
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct PidState {
    /// Accumulated integral term
    pub integral: f64,
    /// Previous error for derivative calculation
    pub prev_error: f64,
    /// Previous output
    pub prev_output: f64,
}

/// PID controller
///
/// # Example
/// ```
/// use drivekit_core::control::{Pid, PidConfig};
///
/// let mut pid = Pid::new(PidConfig::pi(1.0, 0.1).with_limits(-12.0, 12.0));
///
/// // Once per 20 ms tick
/// let output = pid.update(3900.0, 3850.0, 0.02);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct Pid {
    config: PidConfig,
    state: PidState,
}

impl Pid {
    /// Create a new PID controller with the given configuration
    pub fn new(config: PidConfig) -> Self {
        Self {
            config,
            state: PidState::default(),
        }
    }

    /// Update with a setpoint and measurement, applying the `kf` term
    ///
    /// A non-finite measurement contributes zero error for this tick (the
    /// feedforward portion still applies); it is logged rather than allowed
    /// to push NaN into the actuation path.
    #[inline]
    pub fn update(&mut self, setpoint: f64, measurement: f64, dt: f64) -> f64 {
        let error = if measurement.is_finite() {
            setpoint - measurement
        } else {
            tracing::warn!(measurement, "non-finite measurement, holding zero error");
            0.0
        };
        let correction = self.update_error(error, dt);
        (self.config.kf * setpoint + correction)
            .clamp(self.config.output_min, self.config.output_max)
    }

    /// Update with a pre-computed error (no `kf` term)
    #[inline]
    pub fn update_error(&mut self, error: f64, dt: f64) -> f64 {
        debug_assert!(dt > 0.0);

        let p_term = self.config.kp * error;

        self.state.integral = (self.state.integral + error * dt)
            .clamp(-self.config.integral_limit, self.config.integral_limit);
        let i_term = self.config.ki * self.state.integral;

        let d_term = self.config.kd * (error - self.state.prev_error) / dt;

        let output =
            (p_term + i_term + d_term).clamp(self.config.output_min, self.config.output_max);

        self.state.prev_error = error;
        self.state.prev_output = output;

        output
    }

    /// Reset the controller state (integrator, derivative history)
    pub fn reset(&mut self) {
        self.state = PidState::default();
    }

    /// Get the current state
    pub fn state(&self) -> &PidState {
        &self.state
    }

    /// Get the configuration
    pub fn config(&self) -> &PidConfig {
        &self.config
    }

    /// Set the gains, leaving limits in place
    pub fn set_gains(&mut self, kp: f64, ki: f64, kd: f64) {
        self.config.kp = kp;
        self.config.ki = ki;
        self.config.kd = kd;
    }
}
