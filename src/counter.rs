//! Process-lifetime request counter.

use std::sync::atomic::{AtomicU64, Ordering};

/// Counts requests to the root route. Starts at zero on every process start.
#[derive(Debug, Default)]
pub struct RequestCounter(AtomicU64);

impl RequestCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Increment and return the new value. No two callers observe the same value.
    pub fn increment_and_get(&self) -> u64 {
        self.0.fetch_add(1, Ordering::Relaxed) + 1
    }

    #[cfg(test)]
    fn current(&self) -> u64 {
        self.0.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::Arc;

    #[test]
    fn test_sequential_values() {
        let counter = RequestCounter::new();
        assert_eq!(counter.current(), 0);
        assert_eq!(counter.increment_and_get(), 1);
        assert_eq!(counter.increment_and_get(), 2);
        assert_eq!(counter.increment_and_get(), 3);
        assert_eq!(counter.current(), 3);
    }

    #[test]
    fn test_concurrent_values_are_unique_and_gapless() {
        let counter = Arc::new(RequestCounter::new());
        let threads: Vec<_> = (0..8)
            .map(|_| {
                let counter = Arc::clone(&counter);
                std::thread::spawn(move || {
                    (0..1000)
                        .map(|_| counter.increment_and_get())
                        .collect::<Vec<_>>()
                })
            })
            .collect();

        let mut seen = HashSet::new();
        for handle in threads {
            for value in handle.join().unwrap() {
                assert!(seen.insert(value), "duplicate counter value {}", value);
            }
        }

        assert_eq!(seen.len(), 8000);
        assert_eq!(seen.iter().min(), Some(&1));
        assert_eq!(seen.iter().max(), Some(&8000));
    }
}
