//! Fixed-rate tick scheduler
//!
//! One periodic caller drives every subsystem once per tick (20 ms nominal).
//! Components expose [`Subsystem::periodic`] and own their cross-tick state
//! exclusively, so the tick boundary is the only synchronization point.

use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crate::{Error, Result};

/// A component driven once per fixed-period tick
pub trait Subsystem: Send {
    /// Run one tick. `dt` is the measured time since the previous tick.
    fn periodic(&mut self, dt: f64);
}

/// Configuration for the tick loop
#[derive(Debug, Clone)]
pub struct LoopConfig {
    /// Target tick rate in Hz
    pub rate_hz: f64,
    /// Name for logging
    pub name: Arc<str>,
    /// Whether to warn on timing overruns
    pub warn_on_overrun: bool,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            rate_hz: 50.0, // 20 ms tick
            name: "tick".into(),
            warn_on_overrun: true,
        }
    }
}

impl LoopConfig {
    /// Create a config with the given rate
    ///
    /// Rejects a non-positive rate.
    pub fn new(rate_hz: f64) -> Result<Self> {
        if !rate_hz.is_finite() || rate_hz <= 0.0 {
            return Err(Error::Config(format!(
                "loop rate must be finite and > 0, got {}",
                rate_hz
            )));
        }
        Ok(Self {
            rate_hz,
            ..Default::default()
        })
    }

    /// Set the loop name
    pub fn with_name(mut self, name: impl Into<Arc<str>>) -> Self {
        self.name = name.into();
        self
    }

    /// Target tick period
    pub fn period(&self) -> Duration {
        Duration::from_secs_f64(1.0 / self.rate_hz)
    }
}

/// Timing statistics for a running loop
#[derive(Debug, Clone, Copy, Default)]
pub struct LoopStats {
    /// Number of ticks completed
    pub iterations: u64,
    /// Number of ticks that exceeded the target period
    pub overruns: u64,
    /// Total execution time across all ticks
    pub total_execution_time: Duration,
    /// Longest tick
    pub max_iteration_time: Duration,
    /// Shortest tick
    pub min_iteration_time: Duration,
    /// Most recent tick
    pub last_iteration_time: Duration,
}

impl LoopStats {
    fn update(&mut self, execution_time: Duration, target_period: Duration) {
        self.iterations += 1;
        self.total_execution_time += execution_time;
        self.last_iteration_time = execution_time;

        if self.iterations == 1 {
            self.min_iteration_time = execution_time;
            self.max_iteration_time = execution_time;
        } else {
            self.min_iteration_time = self.min_iteration_time.min(execution_time);
            self.max_iteration_time = self.max_iteration_time.max(execution_time);
        }

        if execution_time > target_period {
            self.overruns += 1;
        }
    }

    /// Average tick time
    pub fn avg_iteration_time(&self) -> Duration {
        if self.iterations == 0 {
            Duration::ZERO
        } else {
            self.total_execution_time.div_f64(self.iterations as f64)
        }
    }

    /// Fraction of ticks that overran the period
    pub fn overrun_ratio(&self) -> f64 {
        if self.iterations == 0 {
            0.0
        } else {
            self.overruns as f64 / self.iterations as f64
        }
    }
}

/// Handle to a spawned tick loop
pub struct LoopHandle {
    running: Arc<AtomicBool>,
    stats: Arc<Mutex<LoopStats>>,
    thread: Option<JoinHandle<Result<()>>>,
}

impl LoopHandle {
    /// Check if the loop is running
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Relaxed)
    }

    /// Snapshot of the current statistics
    pub fn stats(&self) -> LoopStats {
        *self.stats.lock()
    }

    /// Request the loop to stop
    pub fn stop(&self) {
        self.running.store(false, Ordering::Relaxed);
    }

    /// Stop and wait for the loop thread to finish
    pub fn join(mut self) -> Result<()> {
        self.stop();
        if let Some(handle) = self.thread.take() {
            handle
                .join()
                .map_err(|_| Error::ControlLoop("Thread panicked".into()))??;
        }
        Ok(())
    }
}

/// The fixed-rate scheduler
///
/// # Example
/// ```no_run
/// use drivekit_core::control::{LoopConfig, Scheduler};
///
/// let config = LoopConfig::new(50.0).unwrap().with_name("teleop");
/// let stats = Scheduler::run(config, |tick, dt| {
///     // drive.periodic(dt); shooter.periodic(dt);
///     tick < 1000
/// }).unwrap();
/// ```
pub struct Scheduler;

impl Scheduler {
    /// Run the tick loop on the current thread (blocking)
    ///
    /// The callback receives the tick count and measured delta time and
    /// returns `true` to continue.
    pub fn run<F>(config: LoopConfig, mut callback: F) -> Result<LoopStats>
    where
        F: FnMut(u64, f64) -> bool,
    {
        let period = config.period();
        let mut stats = LoopStats::default();
        let mut tick = 0u64;
        let mut last_time = Instant::now();

        loop {
            let tick_start = Instant::now();
            let dt = tick_start.duration_since(last_time).as_secs_f64();
            last_time = tick_start;

            let should_continue = callback(tick, dt);
            let execution_time = tick_start.elapsed();

            if !should_continue {
                break;
            }

            stats.update(execution_time, period);

            if let Some(sleep_time) = period.checked_sub(execution_time) {
                thread::sleep(sleep_time);
            } else if config.warn_on_overrun {
                tracing::warn!(
                    "{}: tick overrun by {:?}",
                    config.name,
                    execution_time - period
                );
            }

            tick += 1;
        }

        Ok(stats)
    }

    /// Spawn the tick loop in a new thread
    pub fn spawn<F>(config: LoopConfig, mut callback: F) -> LoopHandle
    where
        F: FnMut(u64, f64) -> bool + Send + 'static,
    {
        let running = Arc::new(AtomicBool::new(true));
        let stats = Arc::new(Mutex::new(LoopStats::default()));

        let running_clone = running.clone();
        let stats_clone = stats.clone();
        let period = config.period();

        let thread = thread::spawn(move || {
            let mut tick = 0u64;
            let mut last_time = Instant::now();

            while running_clone.load(Ordering::Relaxed) {
                let tick_start = Instant::now();
                let dt = tick_start.duration_since(last_time).as_secs_f64();
                last_time = tick_start;

                let should_continue = callback(tick, dt);
                let execution_time = tick_start.elapsed();

                if !should_continue {
                    running_clone.store(false, Ordering::Relaxed);
                    break;
                }

                stats_clone.lock().update(execution_time, period);

                if let Some(sleep_time) = period.checked_sub(execution_time) {
                    thread::sleep(sleep_time);
                } else if config.warn_on_overrun {
                    tracing::warn!(
                        "{}: tick overrun by {:?}",
                        config.name,
                        execution_time - period
                    );
                }

                tick += 1;
            }

            Ok(())
        });

        LoopHandle {
            running,
            stats,
            thread: Some(thread),
        }
    }

    /// Run every subsystem in order for each tick until the callback says stop
    pub fn run_subsystems<F>(
        config: LoopConfig,
        subsystems: &mut [&mut dyn Subsystem],
        mut keep_going: F,
    ) -> Result<LoopStats>
    where
        F: FnMut(u64) -> bool,
    {
        Self::run(config, |tick, dt| {
            for s in subsystems.iter_mut() {
                s.periodic(dt);
            }
            keep_going(tick)
        })
    }
}
