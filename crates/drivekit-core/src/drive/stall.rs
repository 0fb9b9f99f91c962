//! Drivetrain stall detection
//!
//! The drivetrain supplies the raw predicate (it knows its current draw and
//! commanded motion); this wraps it in an enable gate and a symmetric
//! debounce so transient spikes don't flap the drive mode.

use crate::stream::{BoolStream, Debouncer};
use crate::Result;

/// Debounced, enable-gated stall signal
pub struct StallDetector {
    raw: BoolStream,
    debounce: Debouncer,
}

impl std::fmt::Debug for StallDetector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StallDetector")
            .field("stalling", &self.debounce.get())
            .finish()
    }
}

impl StallDetector {
    /// Wrap a raw stall predicate with a symmetric debounce
    ///
    /// When `enabled` is false the predicate is never consulted and the
    /// detector reads constant false, disabling stall-based mode switching
    /// without removing the wiring.
    pub fn new<F>(predicate: F, debounce_secs: f64, enabled: bool) -> Result<Self>
    where
        F: FnMut() -> bool + Send + 'static,
    {
        Ok(Self {
            raw: BoolStream::new(predicate).gated(enabled),
            debounce: Debouncer::both(debounce_secs)?,
        })
    }

    /// Advance by one tick and return the debounced stall state
    pub fn update(&mut self, dt: f64) -> bool {
        let raw = self.raw.get();
        self.debounce.update(raw, dt)
    }

    /// Current debounced stall state without re-sampling
    pub fn is_stalling(&self) -> bool {
        self.debounce.get()
    }
}
