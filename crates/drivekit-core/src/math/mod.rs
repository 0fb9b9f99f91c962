//! Math utilities for the control core: scalar shaping helpers and filters
//!
//! The free functions here are pure; range validation happens in the filter
//! constructors that wrap them, not in the helpers themselves.

mod filter;

pub use filter::{Deadband, Filter, FilterChain, LowPassFilter, SignedPow};

/// Apply a deadband with a continuous rescale beyond it
///
/// Inputs with `|x| < threshold` map to 0. Outside the band the remaining
/// range `[threshold, 1]` is rescaled linearly onto `[0, 1]`, preserving sign,
/// so the output has no jump at the band edge. A threshold of 1 or more zeroes
/// every in-range input.
#[inline]
pub fn deadband(x: f64, threshold: f64) -> f64 {
    if x.abs() < threshold {
        0.0
    } else if threshold >= 1.0 {
        0.0
    } else {
        x.signum() * (x.abs() - threshold) / (1.0 - threshold)
    }
}

/// Signed power: `sign(x) * |x|^p`
///
/// Preserves direction while shaping sensitivity. `p > 1` desensitizes the
/// region near zero, `p < 1` amplifies it, `p = 1` is the identity.
#[inline]
pub fn spow(x: f64, p: f64) -> f64 {
    x.signum() * x.abs().powf(p)
}

/// Linearly interpolate between two values
#[inline]
pub fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_deadband_inside_band() {
        assert_eq!(deadband(0.04, 0.05), 0.0);
        assert_eq!(deadband(-0.04, 0.05), 0.0);
        assert_eq!(deadband(0.0, 0.05), 0.0);
    }

    #[test]
    fn test_deadband_continuous_at_boundary() {
        // Just past the threshold the output should be near zero, not jump
        // to the raw input value.
        let y = deadband(0.0501, 0.05);
        assert!(y > 0.0 && y < 0.001);
        assert_relative_eq!(deadband(1.0, 0.05), 1.0, epsilon = 1e-12);
        assert_relative_eq!(deadband(-1.0, 0.05), -1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_deadband_sign_preserving() {
        assert!(deadband(0.5, 0.05) > 0.0);
        assert!(deadband(-0.5, 0.05) < 0.0);
    }

    #[test]
    fn test_deadband_full_threshold_zeroes_everything() {
        for x in [-1.0, -0.5, 0.0, 0.5, 1.0] {
            assert_eq!(deadband(x, 1.0), 0.0);
        }
    }

    #[test]
    fn test_spow_identity() {
        assert_relative_eq!(spow(0.5, 1.0), 0.5);
        assert_relative_eq!(spow(-0.5, 1.0), -0.5);
    }

    #[test]
    fn test_spow_preserves_sign() {
        for p in [0.5, 1.0, 2.0, 3.0] {
            assert!(spow(0.3, p) > 0.0);
            assert!(spow(-0.3, p) < 0.0);
        }
    }

    #[test]
    fn test_spow_shapes_sensitivity() {
        // p > 1 pushes small inputs towards zero
        assert!(spow(0.5, 2.0) < 0.5);
        // p < 1 pulls small inputs up
        assert!(spow(0.5, 0.5) > 0.5);
    }

    #[test]
    fn test_lerp() {
        assert_relative_eq!(lerp(0.0, 10.0, 0.5), 5.0);
        assert_relative_eq!(lerp(0.0, 10.0, 0.0), 0.0);
        assert_relative_eq!(lerp(0.0, 10.0, 1.0), 10.0);
    }
}
