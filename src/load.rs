//! Synthetic CPU load.
//!
//! The busy loop saturates the calling thread for a bounded number of seconds.
//! It never yields, so callers in async code must run it on the blocking pool.

use std::hint::black_box;
use std::time::{Duration, Instant};

use crate::config::MAX_STRESS_SECONDS;

/// Clamp a requested stress duration to the hard ceiling.
pub fn clamp_seconds(requested: u64) -> u64 {
    requested.min(MAX_STRESS_SECONDS)
}

/// Generator of synthetic load. Implementations block the calling thread.
pub trait LoadGenerator: Send + Sync {
    /// Run for `seconds` (already clamped) and return the measured wall-clock time.
    fn run(&self, seconds: u64) -> Duration;
}

/// Busy-spins on pure arithmetic until the deadline passes.
#[derive(Debug, Clone, Copy, Default)]
pub struct BusyLoop;

impl LoadGenerator for BusyLoop {
    fn run(&self, seconds: u64) -> Duration {
        let target = Duration::from_secs(seconds);
        let start = Instant::now();
        let mut acc: u64 = 234_234;
        while start.elapsed() < target {
            acc = black_box(acc.wrapping_mul(234_234).wrapping_add(1));
        }
        black_box(acc);
        start.elapsed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp_seconds() {
        assert_eq!(clamp_seconds(0), 0);
        assert_eq!(clamp_seconds(1), 1);
        assert_eq!(clamp_seconds(60), 60);
        assert_eq!(clamp_seconds(61), 60);
        assert_eq!(clamp_seconds(1000), 60);
        assert_eq!(clamp_seconds(u64::MAX), 60);
    }

    #[test]
    fn test_zero_seconds_returns_immediately() {
        let elapsed = BusyLoop.run(0);
        assert!(elapsed < Duration::from_millis(50));
    }

    #[test]
    fn test_runs_at_least_requested_duration() {
        let elapsed = BusyLoop.run(1);
        assert!(elapsed >= Duration::from_secs(1));
        assert!(elapsed < Duration::from_secs(3));
    }
}
