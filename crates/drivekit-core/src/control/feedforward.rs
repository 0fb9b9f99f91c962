//! Simple motor feedforward
//!
//! Open-loop output predicted from the desired velocity: a static-friction
//! term that follows the sign of motion, a velocity term, and an acceleration
//! term. Steady-state velocity control treats acceleration as zero.

use serde::{Deserialize, Serialize};

/// `kS` / `kV` / `kA` motor feedforward gains
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Feedforward {
    /// Static gain: output needed to overcome friction, signed with velocity
    pub ks: f64,
    /// Velocity gain: output per unit of target velocity
    pub kv: f64,
    /// Acceleration gain
    pub ka: f64,
}

impl Feedforward {
    /// Create a feedforward model from its gains
    pub fn new(ks: f64, kv: f64, ka: f64) -> Self {
        Self { ks, kv, ka }
    }

    /// Feedforward output for a target velocity at zero acceleration
    #[inline]
    pub fn calculate(&self, velocity: f64) -> f64 {
        self.calculate_with_accel(velocity, 0.0)
    }

    /// Feedforward output for a target velocity and acceleration
    #[inline]
    pub fn calculate_with_accel(&self, velocity: f64, accel: f64) -> f64 {
        let sign = if velocity == 0.0 { 0.0 } else { velocity.signum() };
        self.ks * sign + self.kv * velocity + self.ka * accel
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_static_term_signed() {
        let ff = Feedforward::new(0.1, 0.0, 0.0);
        assert_relative_eq!(ff.calculate(100.0), 0.1);
        assert_relative_eq!(ff.calculate(-100.0), -0.1);
        assert_relative_eq!(ff.calculate(0.0), 0.0);
    }

    #[test]
    fn test_velocity_term() {
        let ff = Feedforward::new(0.1, 0.002, 0.0);
        // Ring-shot operating point: 0.1 + 0.002 * 3900 = 7.9
        assert_relative_eq!(ff.calculate(3900.0), 7.9, epsilon = 1e-10);
    }

    #[test]
    fn test_accel_term_zero_in_steady_state() {
        let ff = Feedforward::new(0.0, 0.0, 5.0);
        assert_relative_eq!(ff.calculate(3900.0), 0.0);
        assert_relative_eq!(ff.calculate_with_accel(3900.0, 2.0), 10.0);
    }
}
