//! Opt-in wall-clock timing of continuation steps.
//!
//! Off unless `SP_TIMING` is set in the environment or [`enable_timing`] was
//! called. When off, [`Timer::stop`] returns `None` and nothing is recorded.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::{Duration, Instant};

static ENABLED: AtomicBool = AtomicBool::new(false);

pub fn enable_timing() {
    ENABLED.store(true, Ordering::Relaxed);
}

pub fn is_enabled() -> bool {
    ENABLED.load(Ordering::Relaxed) || std::env::var_os("SP_TIMING").is_some()
}

/// Stopwatch for one step; `None` inside when timing is off.
pub struct Timer {
    started: Option<Instant>,
}

impl Timer {
    pub fn start() -> Self {
        Self {
            started: is_enabled().then(Instant::now),
        }
    }

    /// Elapsed seconds, if timing was on when the timer started.
    pub fn stop(self) -> Option<f64> {
        self.started.map(|t| t.elapsed().as_secs_f64())
    }
}

/// Lock-free tally of step durations.
pub struct StepTimes {
    total_ns: AtomicU64,
    slowest_ns: AtomicU64,
    steps: AtomicU64,
}

impl Default for StepTimes {
    fn default() -> Self {
        Self::new()
    }
}

impl StepTimes {
    pub const fn new() -> Self {
        Self {
            total_ns: AtomicU64::new(0),
            slowest_ns: AtomicU64::new(0),
            steps: AtomicU64::new(0),
        }
    }

    pub fn record(&self, seconds: f64) {
        let ns = Duration::from_secs_f64(seconds.max(0.0)).as_nanos() as u64;
        self.total_ns.fetch_add(ns, Ordering::Relaxed);
        self.slowest_ns.fetch_max(ns, Ordering::Relaxed);
        self.steps.fetch_add(1, Ordering::Relaxed);
    }

    pub fn steps(&self) -> u64 {
        self.steps.load(Ordering::Relaxed)
    }

    pub fn total_seconds(&self) -> f64 {
        self.total_ns.load(Ordering::Relaxed) as f64 * 1e-9
    }

    pub fn slowest_seconds(&self) -> f64 {
        self.slowest_ns.load(Ordering::Relaxed) as f64 * 1e-9
    }

    pub fn mean_seconds(&self) -> f64 {
        match self.steps() {
            0 => 0.0,
            n => self.total_seconds() / n as f64,
        }
    }

    pub fn clear(&self) {
        self.total_ns.store(0, Ordering::Relaxed);
        self.slowest_ns.store(0, Ordering::Relaxed);
        self.steps.store(0, Ordering::Relaxed);
    }

    fn describe(&self, what: &str) -> Option<String> {
        let n = self.steps();
        (n > 0).then(|| {
            format!(
                "{what}: {n} steps, {:.3}s total, {:.4}s mean, {:.4}s slowest",
                self.total_seconds(),
                self.mean_seconds(),
                self.slowest_seconds()
            )
        })
    }
}

pub mod sequence_timing {
    use super::StepTimes;

    /// Accepted spin-down steps, bracketing and root finding included
    pub static SPIN_DOWN_STEPS: StepTimes = StepTimes::new();
    /// Models emitted by a Kepler sweep
    pub static SWEEP_STEPS: StepTimes = StepTimes::new();

    /// One line per sequence kind that recorded anything.
    pub fn summary() -> Option<String> {
        if !super::is_enabled() {
            return None;
        }
        let lines: Vec<String> = [
            SPIN_DOWN_STEPS.describe("spin-down"),
            SWEEP_STEPS.describe("kepler sweep"),
        ]
        .into_iter()
        .flatten()
        .collect();
        (!lines.is_empty()).then(|| lines.join("\n"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn step_times_track_mean_and_slowest() {
        let t = StepTimes::new();
        assert_eq!(t.mean_seconds(), 0.0);
        assert!(t.describe("x").is_none());
        t.record(0.5);
        t.record(1.5);
        assert_eq!(t.steps(), 2);
        assert!((t.mean_seconds() - 1.0).abs() < 1e-9);
        assert!((t.slowest_seconds() - 1.5).abs() < 1e-9);
        assert!(t.describe("x").unwrap().starts_with("x: 2 steps"));
        t.clear();
        assert_eq!(t.steps(), 0);
    }

    #[test]
    fn enabled_timer_measures() {
        enable_timing();
        let timer = Timer::start();
        assert!(timer.stop().is_some_and(|s| s >= 0.0));
    }
}
