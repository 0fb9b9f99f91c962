//! Per-tick input streams
//!
//! Operator axes and boolean predicates enter the control core as streams: a
//! zero-argument source sampled exactly once per tick, optionally run through
//! a filter chain ([`ScalarStream`]) or a debouncer ([`BoolStream`],
//! [`Debouncer`]). Sources are treated as side-effect-free snapshots; nothing
//! in the core re-samples mid-computation.

use crate::math::{Filter, FilterChain};
use crate::{Error, Result};

/// A scalar input stream: a source function plus a filter chain
///
/// Sampled once per tick via [`ScalarStream::get`]. The stream owns its chain
/// state exclusively; it is not shared between components.
pub struct ScalarStream {
    source: Box<dyn FnMut() -> f64 + Send>,
    chain: FilterChain,
}

impl std::fmt::Debug for ScalarStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScalarStream")
            .field("chain", &self.chain)
            .finish()
    }
}

impl ScalarStream {
    /// Create a stream from a source with no filtering
    pub fn new<F: FnMut() -> f64 + Send + 'static>(source: F) -> Self {
        Self {
            source: Box::new(source),
            chain: FilterChain::new(),
        }
    }

    /// Attach a filter chain, applied left to right after the source read
    pub fn filtered(mut self, chain: FilterChain) -> Self {
        self.chain = chain;
        self
    }

    /// Sample the source once and run it through the chain
    pub fn get(&mut self) -> f64 {
        let raw = (self.source)();
        self.chain.update(raw)
    }

    /// Last filtered value without re-sampling
    pub fn value(&self) -> f64 {
        self.chain.value()
    }

    /// Reset all stateful filter stages
    pub fn reset(&mut self) {
        self.chain.reset();
    }
}

/// A boolean input stream with an optional static enable gate
///
/// A disabled stream reads constant `false` without invoking the predicate,
/// which fully disables downstream behavior while keeping the wiring in place.
pub struct BoolStream {
    source: Box<dyn FnMut() -> bool + Send>,
    enabled: bool,
}

impl std::fmt::Debug for BoolStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BoolStream")
            .field("enabled", &self.enabled)
            .finish()
    }
}

impl BoolStream {
    /// Create an enabled stream from a predicate
    pub fn new<F: FnMut() -> bool + Send + 'static>(source: F) -> Self {
        Self {
            source: Box::new(source),
            enabled: true,
        }
    }

    /// Gate the stream: when disabled it always reads `false`
    pub fn gated(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Sample the predicate (or `false` when gated off)
    pub fn get(&mut self) -> bool {
        self.enabled && (self.source)()
    }
}

/// RC-style boolean debouncer with independent rising and falling delays
///
/// The output flips to `true` only after the input has held `true`
/// continuously for the rising delay, and back to `false` only after holding
/// `false` for the falling delay. Time advances with the `dt` passed to
/// [`Debouncer::update`], so the tick boundary stays the only synchronization
/// point and tests can drive time deterministically.
#[derive(Debug, Clone)]
pub struct Debouncer {
    rise: f64,
    fall: f64,
    held: f64,
    output: bool,
}

impl Debouncer {
    /// Create a debouncer with independent rising and falling delays (seconds)
    ///
    /// Rejects negative delays.
    pub fn new(rise: f64, fall: f64) -> Result<Self> {
        if !rise.is_finite() || rise < 0.0 || !fall.is_finite() || fall < 0.0 {
            return Err(Error::Config(format!(
                "debounce delays must be finite and >= 0, got rise={} fall={}",
                rise, fall
            )));
        }
        Ok(Self {
            rise,
            fall,
            held: 0.0,
            output: false,
        })
    }

    /// Symmetric debouncer: the same delay on both edges
    pub fn both(delay: f64) -> Result<Self> {
        Self::new(delay, delay)
    }

    /// Advance the debouncer by one tick
    pub fn update(&mut self, raw: bool, dt: f64) -> bool {
        if raw == self.output {
            self.held = 0.0;
            return self.output;
        }

        self.held += dt;
        let delay = if raw { self.rise } else { self.fall };
        if self.held >= delay {
            tracing::debug!(from = self.output, to = raw, "debounce transition");
            self.output = raw;
            self.held = 0.0;
        }
        self.output
    }

    /// Current debounced output
    pub fn get(&self) -> bool {
        self.output
    }

    /// Reset to the initial (false) state
    pub fn reset(&mut self) {
        self.held = 0.0;
        self.output = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::{Deadband, LowPassFilter, SignedPow};
    use approx::assert_relative_eq;

    #[test]
    fn test_scalar_stream_samples_once() {
        use std::sync::atomic::{AtomicUsize, Ordering};
        use std::sync::Arc;

        let count = Arc::new(AtomicUsize::new(0));
        let c = count.clone();
        let mut stream = ScalarStream::new(move || {
            c.fetch_add(1, Ordering::Relaxed);
            0.5
        });

        stream.get();
        assert_eq!(count.load(Ordering::Relaxed), 1);
        stream.value(); // must not re-sample
        assert_eq!(count.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn test_scalar_stream_with_chain() {
        let mut stream = ScalarStream::new(|| 0.5).filtered(
            FilterChain::new()
                .then(Deadband::new(0.05).unwrap())
                .then(SignedPow::new(1.0).unwrap())
                .then(LowPassFilter::new(1.0).unwrap()),
        );
        let expected = (0.5 - 0.05) / (1.0 - 0.05);
        assert_relative_eq!(stream.get(), expected, epsilon = 1e-12);
    }

    #[test]
    fn test_bool_stream_gate_skips_predicate() {
        let mut stream = BoolStream::new(|| panic!("predicate must not run")).gated(false);
        assert!(!stream.get());
    }

    #[test]
    fn test_debouncer_rejects_negative_delay() {
        assert!(Debouncer::new(-0.1, 0.1).is_err());
        assert!(Debouncer::new(0.1, -0.1).is_err());
        assert!(Debouncer::both(0.0).is_ok());
    }

    #[test]
    fn test_debouncer_suppresses_short_pulse() {
        let mut d = Debouncer::both(0.1).unwrap();
        // True for 60ms (< 100ms delay), then false again: no transition.
        for _ in 0..3 {
            assert!(!d.update(true, 0.02));
        }
        assert!(!d.update(false, 0.02));
        assert!(!d.get());
    }

    #[test]
    fn test_debouncer_single_rising_transition() {
        let mut d = Debouncer::both(0.1).unwrap();
        let mut transitions = 0;
        let mut prev = d.get();
        for _ in 0..20 {
            let out = d.update(true, 0.02);
            if out != prev {
                transitions += 1;
            }
            prev = out;
        }
        assert!(d.get());
        assert_eq!(transitions, 1);
    }

    #[test]
    fn test_debouncer_falling_delay() {
        let mut d = Debouncer::both(0.1).unwrap();
        for _ in 0..6 {
            d.update(true, 0.02);
        }
        assert!(d.get());
        // Needs 100ms of continuous false before dropping.
        for _ in 0..4 {
            assert!(d.update(false, 0.02));
        }
        assert!(!d.update(false, 0.02));
    }

    #[test]
    fn test_debouncer_interrupted_hold_restarts() {
        let mut d = Debouncer::both(0.1).unwrap();
        for _ in 0..4 {
            d.update(true, 0.02);
        }
        d.update(false, 0.02); // hold broken, timer resets
        for _ in 0..4 {
            assert!(!d.update(true, 0.02));
        }
        assert!(d.update(true, 0.02));
    }

    #[test]
    fn test_debouncer_zero_delay_tracks_input() {
        let mut d = Debouncer::both(0.0).unwrap();
        assert!(d.update(true, 0.02));
        assert!(!d.update(false, 0.02));
    }
}
