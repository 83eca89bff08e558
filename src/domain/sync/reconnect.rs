//! Exponential backoff schedule for reconnecting the push connection.

use std::time::Duration;

/// Bounded exponential backoff.
///
/// The n-th consecutive unexpected close waits `base_delay * 2^(n-1)`;
/// once `max_attempts` retries have been scheduled no further attempt is
/// made.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconnectPolicy {
    /// Retries allowed before the connector gives up.
    ///
    /// Default: 5
    pub max_attempts: u32,

    /// Delay before the first retry.
    ///
    /// Default: 1 second
    pub base_delay: Duration,
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            base_delay: Duration::from_millis(1000),
        }
    }
}

impl ReconnectPolicy {
    /// Creates a policy with explicit bounds.
    pub fn new(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            max_attempts,
            base_delay,
        }
    }

    /// Delay scheduled for the given 1-based attempt number.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        if attempt == 0 {
            return Duration::ZERO;
        }
        let factor = 1u32.checked_shl(attempt - 1).unwrap_or(u32::MAX);
        self.base_delay.saturating_mul(factor)
    }

    /// Attempt number and delay of the next retry, or `None` once the
    /// budget is exhausted.
    pub fn next_attempt(&self, attempts_so_far: u32) -> Option<(u32, Duration)> {
        if attempts_so_far >= self.max_attempts {
            return None;
        }
        let attempt = attempts_so_far + 1;
        Some((attempt, self.delay_for(attempt)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_schedule_doubles_from_one_second() {
        let policy = ReconnectPolicy::default();
        let delays: Vec<u64> = (1..=5)
            .map(|n| policy.delay_for(n).as_millis() as u64)
            .collect();
        assert_eq!(delays, vec![1000, 2000, 4000, 8000, 16000]);
    }

    #[test]
    fn no_sixth_attempt_by_default() {
        let policy = ReconnectPolicy::default();
        assert_eq!(policy.next_attempt(4), Some((5, Duration::from_secs(16))));
        assert_eq!(policy.next_attempt(5), None);
    }

    #[test]
    fn first_attempt_uses_base_delay() {
        let policy = ReconnectPolicy::new(3, Duration::from_millis(250));
        assert_eq!(policy.next_attempt(0), Some((1, Duration::from_millis(250))));
    }

    #[test]
    fn attempt_zero_has_no_delay() {
        assert_eq!(ReconnectPolicy::default().delay_for(0), Duration::ZERO);
    }

    #[test]
    fn huge_attempt_numbers_saturate() {
        let policy = ReconnectPolicy::new(u32::MAX, Duration::from_secs(1));
        assert!(policy.delay_for(64) >= policy.delay_for(32));
    }
}
