//! Digital filters for operator-input conditioning
//!
//! The teleop drive runs each operator axis through a chain of these once per
//! tick: deadband first (so shaping sees a zeroed band), power shaping second,
//! low-pass smoothing last.

use serde::{Deserialize, Serialize};

use crate::{math, Error, Result};

/// Trait for per-tick scalar filters
pub trait Filter: Send + Sync {
    /// Update the filter with a new value and return the filtered output
    fn update(&mut self, value: f64) -> f64;

    /// Reset the filter state
    fn reset(&mut self);

    /// Get the current filtered value without updating
    fn value(&self) -> f64;
}

/// Deadband filter with a continuous rescale beyond the band
///
/// Stateless; see [`math::deadband`] for the transfer function.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Deadband {
    threshold: f64,
    last: f64,
}

impl Deadband {
    /// Create a deadband filter
    ///
    /// Rejects a negative threshold. A threshold of 1 or more is accepted and
    /// zeroes every in-range input.
    pub fn new(threshold: f64) -> Result<Self> {
        if !threshold.is_finite() || threshold < 0.0 {
            return Err(Error::Config(format!(
                "deadband threshold must be finite and >= 0, got {}",
                threshold
            )));
        }
        Ok(Self {
            threshold,
            last: 0.0,
        })
    }
}

impl Filter for Deadband {
    fn update(&mut self, value: f64) -> f64 {
        self.last = math::deadband(value, self.threshold);
        self.last
    }

    fn reset(&mut self) {
        self.last = 0.0;
    }

    fn value(&self) -> f64 {
        self.last
    }
}

/// Signed-power shaping filter
///
/// Stateless; `sign(x) * |x|^p`. `p > 1` softens the response near zero.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SignedPow {
    power: f64,
    last: f64,
}

impl SignedPow {
    /// Create a signed-power filter
    ///
    /// Rejects `p <= 0` to keep the exponentiation well defined.
    pub fn new(power: f64) -> Result<Self> {
        if !power.is_finite() || power <= 0.0 {
            return Err(Error::Config(format!(
                "signed power exponent must be finite and > 0, got {}",
                power
            )));
        }
        Ok(Self { power, last: 0.0 })
    }
}

impl Filter for SignedPow {
    fn update(&mut self, value: f64) -> f64 {
        self.last = math::spow(value, self.power);
        self.last
    }

    fn reset(&mut self) {
        self.last = 0.0;
    }

    fn value(&self) -> f64 {
        self.last
    }
}

/// First-order low-pass filter (exponential smoothing)
///
/// `y += alpha * (x - y)`. An alpha of 1 is passthrough; small alpha is heavy
/// smoothing. The first sample initializes the state, so a constant input
/// converges monotonically with no startup transient away from it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LowPassFilter {
    alpha: f64,
    value: f64,
    initialized: bool,
}

impl LowPassFilter {
    /// Create a low-pass filter with the given smoothing gain
    ///
    /// Rejects alpha outside `(0, 1]`.
    pub fn new(alpha: f64) -> Result<Self> {
        if !alpha.is_finite() || alpha <= 0.0 || alpha > 1.0 {
            return Err(Error::Config(format!(
                "low-pass alpha must be in (0, 1], got {}",
                alpha
            )));
        }
        Ok(Self {
            alpha,
            value: 0.0,
            initialized: false,
        })
    }

    /// Get the smoothing gain
    pub fn alpha(&self) -> f64 {
        self.alpha
    }
}

impl Filter for LowPassFilter {
    fn update(&mut self, value: f64) -> f64 {
        if !self.initialized {
            self.value = value;
            self.initialized = true;
        } else {
            self.value += self.alpha * (value - self.value);
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

/// An ordered chain of filters applied left to right each tick
///
/// Order matters for the drive conditioner: deadband must run before power
/// shaping, and the low-pass stage last so it smooths the already-shaped
/// signal.
#[derive(Default)]
pub struct FilterChain {
    stages: Vec<Box<dyn Filter>>,
}

impl std::fmt::Debug for FilterChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FilterChain")
            .field("stages", &self.stages.len())
            .field("value", &self.value())
            .finish()
    }
}

impl FilterChain {
    /// Create an empty chain (identity transform)
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a filter stage
    pub fn then<F: Filter + 'static>(mut self, filter: F) -> Self {
        self.stages.push(Box::new(filter));
        self
    }

    /// Append a boxed filter stage
    pub fn then_boxed(mut self, filter: Box<dyn Filter>) -> Self {
        self.stages.push(filter);
        self
    }

    /// Number of stages
    pub fn len(&self) -> usize {
        self.stages.len()
    }

    /// Whether the chain has no stages
    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }
}

impl Filter for FilterChain {
    fn update(&mut self, value: f64) -> f64 {
        self.stages.iter_mut().fold(value, |x, f| f.update(x))
    }

    fn reset(&mut self) {
        for f in &mut self.stages {
            f.reset();
        }
    }

    fn value(&self) -> f64 {
        self.stages.last().map(|f| f.value()).unwrap_or(0.0)
    }
}
