//! Differential drive command mixing
//!
//! Turns a (forward, turn) pair into left/right wheel outputs. Outputs are
//! normalized so that saturating one side scales both, preserving the
//! commanded curvature instead of clipping it away.

use serde::{Deserialize, Serialize};

/// Left/right wheel outputs, normalized to `[-1, 1]`
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct WheelSpeeds {
    /// Left side output
    pub left: f64,
    /// Right side output
    pub right: f64,
}

impl WheelSpeeds {
    /// Create a wheel speed pair
    pub fn new(left: f64, right: f64) -> Self {
        Self { left, right }
    }

    /// Scale both sides down so neither leaves `[-1, 1]`
    fn normalized(self) -> Self {
        let max = self.left.abs().max(self.right.abs());
        if max > 1.0 {
            Self {
                left: self.left / max,
                right: self.right / max,
            }
        } else {
            self
        }
    }
}

/// Arcade mixing: forward and turn combined linearly
///
/// `left = speed + rotation`, `right = speed - rotation`, then normalized.
pub fn arcade(speed: f64, rotation: f64) -> WheelSpeeds {
    WheelSpeeds::new(speed + rotation, speed - rotation).normalized()
}

/// Curvature mixing: turn authority scales with forward speed
///
/// Below `base_turn_speed` the command is treated as a quick turn and the
/// rotation passes through unscaled, allowing an in-place turn. At or above
/// it, the turn term is `|speed| * rotation`, so the turn radius stays
/// constant as speed changes.
pub fn curvature(speed: f64, rotation: f64, base_turn_speed: f64) -> WheelSpeeds {
    let turn = if speed.abs() < base_turn_speed {
        rotation
    } else {
        speed.abs() * rotation
    };
    WheelSpeeds::new(speed + turn, speed - turn).normalized()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_arcade_straight() {
        let s = arcade(0.5, 0.0);
        assert_relative_eq!(s.left, 0.5);
        assert_relative_eq!(s.right, 0.5);
    }

    #[test]
    fn test_arcade_turn_in_place() {
        let s = arcade(0.0, 0.5);
        assert_relative_eq!(s.left, 0.5);
        assert_relative_eq!(s.right, -0.5);
    }

    #[test]
    fn test_arcade_saturation_preserves_ratio() {
        let s = arcade(0.8, 0.6); // raw left = 1.4
        assert!(s.left <= 1.0 && s.right >= -1.0);
        assert_relative_eq!(s.left / s.right, 1.4 / 0.2, epsilon = 1e-9);
        assert_relative_eq!(s.left, 1.0);
    }

    #[test]
    fn test_curvature_quick_turn_below_threshold() {
        // Nearly stopped: rotation passes through unscaled.
        let s = curvature(0.1, 0.5, 0.4);
        assert_relative_eq!(s.left, 0.6);
        assert_relative_eq!(s.right, -0.4);
    }

    #[test]
    fn test_curvature_speed_scaled_above_threshold() {
        let s = curvature(0.8, 0.5, 0.4);
        // turn term = 0.8 * 0.5 = 0.4
        assert_relative_eq!(s.left, 1.0); // 1.2 normalized
        assert_relative_eq!(s.right, 0.4 / 1.2, epsilon = 1e-9);
    }

    #[test]
    fn test_curvature_straight_at_speed() {
        // Cruising straight above the quick-turn threshold: no turn term,
        // both sides carry the forward speed.
        let s = curvature(0.5, 0.0, 0.4);
        assert_relative_eq!(s.left, 0.5);
        assert_relative_eq!(s.right, 0.5);
    }

    #[test]
    fn test_curvature_reverse_uses_speed_magnitude() {
        let s = curvature(-0.8, 0.5, 0.4);
        // turn term = |-0.8| * 0.5 = 0.4
        assert_relative_eq!(s.left, -0.4 / 1.2, epsilon = 1e-9);
        assert_relative_eq!(s.right, -1.0);
    }
}
