//! Retry policy for remote lookups that are worth repeating
//!
//! Delays grow linearly with the attempt number: `base_delay * attempt`.

use std::time::Duration;

/// Configuration for bounded retry behavior
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first one
    pub max_attempts: u32,
    /// Delay unit between attempts
    pub base_delay: Duration,
}

impl RetryPolicy {
    /// Policy used for handle resolution: 3 attempts, 2s, 4s between them
    pub fn handle_resolution() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_secs(2),
        }
    }

    /// Same attempt budget without waiting (tests, dry runs)
    pub fn immediate(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            base_delay: Duration::ZERO,
        }
    }

    pub fn with_base_delay(mut self, base_delay: Duration) -> Self {
        self.base_delay = base_delay;
        self
    }

    /// Attempt budget, never below one
    pub fn attempts(&self) -> u32 {
        self.max_attempts.max(1)
    }

    /// Delay to wait after failed attempt number `attempt` (1-based)
    pub fn delay_after(&self, attempt: u32) -> Duration {
        self.base_delay.saturating_mul(attempt.max(1))
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::handle_resolution()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_handle_resolution_policy() {
        let policy = RetryPolicy::handle_resolution();
        assert_eq!(policy.max_attempts, 3);
        assert_eq!(policy.base_delay, Duration::from_secs(2));
    }

    #[test]
    fn test_delay_is_linear() {
        let policy = RetryPolicy::handle_resolution();
        assert_eq!(policy.delay_after(1), Duration::from_secs(2));
        assert_eq!(policy.delay_after(2), Duration::from_secs(4));
        assert_eq!(policy.delay_after(3), Duration::from_secs(6));
    }

    #[test]
    fn test_attempts_never_zero() {
        assert_eq!(RetryPolicy::immediate(0).attempts(), 1);
        assert_eq!(RetryPolicy::immediate(0).delay_after(1), Duration::ZERO);
    }

    #[test]
    fn test_with_base_delay() {
        let policy = RetryPolicy::handle_resolution().with_base_delay(Duration::from_millis(10));
        assert_eq!(policy.delay_after(2), Duration::from_millis(20));
    }
}
