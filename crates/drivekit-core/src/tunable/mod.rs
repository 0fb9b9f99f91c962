//! Live-tunable named parameters
//!
//! Gains, thresholds, and multipliers that an operator adjusts between ticks
//! without a restart. The store is a key-indexed map shared behind an `Arc`;
//! components hold typed handles and read them once per tick. Values live for
//! the process lifetime only, there is no persistence.

use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

#[derive(Default)]
struct Inner {
    numbers: RwLock<HashMap<String, f64>>,
    bools: RwLock<HashMap<String, bool>>,
}

/// Shared store of live-tunable values
///
/// Cloning is cheap; every clone reads and writes the same underlying map.
#[derive(Clone, Default)]
pub struct TunableStore {
    inner: Arc<Inner>,
}

impl std::fmt::Debug for TunableStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TunableStore")
            .field("numbers", &self.inner.numbers.read().len())
            .field("bools", &self.inner.bools.read().len())
            .finish()
    }
}

impl TunableStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a numeric handle, registering `default` if the key is new
    pub fn number(&self, name: &str, default: f64) -> Tunable {
        self.inner
            .numbers
            .write()
            .entry(name.to_string())
            .or_insert(default);
        Tunable {
            store: self.clone(),
            name: name.to_string(),
            default,
        }
    }

    /// Get a boolean handle, registering `default` if the key is new
    pub fn boolean(&self, name: &str, default: bool) -> TunableBool {
        self.inner
            .bools
            .write()
            .entry(name.to_string())
            .or_insert(default);
        TunableBool {
            store: self.clone(),
            name: name.to_string(),
            default,
        }
    }

    /// Write a numeric value by key (the dashboard side of the store)
    pub fn set_number(&self, name: &str, value: f64) {
        tracing::debug!(name, value, "tunable write");
        self.inner.numbers.write().insert(name.to_string(), value);
    }

    /// Write a boolean value by key
    pub fn set_bool(&self, name: &str, value: bool) {
        tracing::debug!(name, value, "tunable write");
        self.inner.bools.write().insert(name.to_string(), value);
    }

    fn get_number(&self, name: &str, default: f64) -> f64 {
        self.inner
            .numbers
            .read()
            .get(name)
            .copied()
            .unwrap_or(default)
    }

    fn get_bool(&self, name: &str, default: bool) -> bool {
        self.inner
            .bools
            .read()
            .get(name)
            .copied()
            .unwrap_or(default)
    }
}

/// Handle to one live-tunable number
#[derive(Debug, Clone)]
pub struct Tunable {
    store: TunableStore,
    name: String,
    default: f64,
}

impl Tunable {
    /// Current value; read once per tick by convention
    pub fn get(&self) -> f64 {
        self.store.get_number(&self.name, self.default)
    }

    /// Write a new value
    pub fn set(&self, value: f64) {
        self.store.set_number(&self.name, value);
    }

    /// The key this handle reads
    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Handle to one live-tunable boolean
#[derive(Debug, Clone)]
pub struct TunableBool {
    store: TunableStore,
    name: String,
    default: bool,
}

impl TunableBool {
    /// Current value
    pub fn get(&self) -> bool {
        self.store.get_bool(&self.name, self.default)
    }

    /// Write a new value
    pub fn set(&self, value: bool) {
        self.store.set_bool(&self.name, value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registers_default() {
        let store = TunableStore::new();
        let rpm = store.number("Shooter/Target RPM", 0.0);
        assert_eq!(rpm.get(), 0.0);
    }

    #[test]
    fn test_handle_sees_live_writes() {
        let store = TunableStore::new();
        let mult = store.number("Shooter/Feeder Multiplier", 1.0);
        store.set_number("Shooter/Feeder Multiplier", 0.9);
        assert_eq!(mult.get(), 0.9);
    }

    #[test]
    fn test_second_registration_keeps_value() {
        let store = TunableStore::new();
        let a = store.number("Driver Settings/Speed Deadband", 0.05);
        a.set(0.1);
        // Re-registering the same key must not stomp the tuned value.
        let b = store.number("Driver Settings/Speed Deadband", 0.05);
        assert_eq!(b.get(), 0.1);
    }

    #[test]
    fn test_bool_handles() {
        let store = TunableStore::new();
        let enabled = store.boolean("Drivetrain/Stall Detection", true);
        assert!(enabled.get());
        enabled.set(false);
        assert!(!enabled.get());
    }

    #[test]
    fn test_clones_share_state() {
        let store = TunableStore::new();
        let clone = store.clone();
        let t = store.number("x", 1.0);
        clone.set_number("x", 2.0);
        assert_eq!(t.get(), 2.0);
    }
}
