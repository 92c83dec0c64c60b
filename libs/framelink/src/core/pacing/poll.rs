// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Bound on the fallback spin: at most `iterations` sleeps of `interval`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollBudget {
    pub iterations: u32,
    pub interval: Duration,
}

impl PollBudget {
    pub fn new(iterations: u32, interval: Duration) -> Self {
        Self {
            iterations,
            interval,
        }
    }

    /// Upper bound on the time a poll can block.
    pub fn max_wait(&self) -> Duration {
        self.interval.saturating_mul(self.iterations)
    }
}

impl Default for PollBudget {
    fn default() -> Self {
        Self::new(1000, Duration::from_millis(1))
    }
}

/// Spin until `delivered` differs from `last_observed`, sleeping `interval`
/// between checks, for at most `budget.iterations` checks.
///
/// Returns the new counter value, or `None` if the budget ran out.
pub fn poll_for_new_frame(
    delivered: &AtomicU64,
    last_observed: u64,
    budget: PollBudget,
) -> Option<u64> {
    for _ in 0..budget.iterations {
        let current = delivered.load(Ordering::Acquire);
        if current != last_observed {
            return Some(current);
        }
        std::thread::sleep(budget.interval);
    }

    let current = delivered.load(Ordering::Acquire);
    (current != last_observed).then_some(current)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;

    #[test]
    fn test_returns_immediately_when_already_advanced() {
        let delivered = AtomicU64::new(3);
        let budget = PollBudget::new(1, Duration::from_secs(10));
        assert_eq!(poll_for_new_frame(&delivered, 2, budget), Some(3));
    }

    #[test]
    fn test_exhausted_budget() {
        let delivered = AtomicU64::new(3);
        let budget = PollBudget::new(3, Duration::from_millis(1));
        assert_eq!(poll_for_new_frame(&delivered, 3, budget), None);
    }

    #[test]
    fn test_observes_concurrent_delivery() {
        let delivered = Arc::new(AtomicU64::new(0));
        let writer = {
            let delivered = delivered.clone();
            std::thread::spawn(move || {
                std::thread::sleep(Duration::from_millis(10));
                delivered.fetch_add(1, Ordering::Release);
            })
        };

        let budget = PollBudget::new(5000, Duration::from_millis(1));
        assert_eq!(poll_for_new_frame(&delivered, 0, budget), Some(1));
        writer.join().unwrap();
    }

    #[test]
    fn test_max_wait() {
        assert_eq!(PollBudget::default().max_wait(), Duration::from_secs(1));
    }
}
