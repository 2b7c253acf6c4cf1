use crate::types::{RECONNECTION_ATTEMPTS, RECONNECTION_DELAY};
use std::time::Duration;

/// Reconnection policy: a bounded number of attempts with a fixed delay
pub struct Timer {
    attempts: u32,
    max_attempts: u32,
    delay: Duration,
}

impl Timer {
    pub fn new(max_attempts: u32, delay: Duration) -> Self {
        Self {
            attempts: 0,
            max_attempts,
            delay,
        }
    }

    /// Delay before the next attempt, or `None` once attempts are exhausted
    pub fn next_delay(&mut self) -> Option<Duration> {
        if self.attempts >= self.max_attempts {
            return None;
        }
        self.attempts += 1;
        Some(self.delay)
    }

    /// Attempts used since the last reset
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    /// Reset the timer
    pub fn reset(&mut self) {
        self.attempts = 0;
    }
}

impl Default for Timer {
    fn default() -> Self {
        Self::new(
            RECONNECTION_ATTEMPTS,
            Duration::from_millis(RECONNECTION_DELAY),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounded_fixed_delays() {
        let mut timer = Timer::new(2, Duration::from_millis(50));

        assert_eq!(timer.next_delay(), Some(Duration::from_millis(50)));
        assert_eq!(timer.next_delay(), Some(Duration::from_millis(50)));
        assert_eq!(timer.next_delay(), None);
        assert_eq!(timer.attempts(), 2);

        timer.reset();
        assert_eq!(timer.next_delay(), Some(Duration::from_millis(50)));
    }

    #[test]
    fn test_default_policy() {
        let mut timer = Timer::default();
        let delays: Vec<_> = std::iter::from_fn(|| timer.next_delay()).collect();
        assert_eq!(delays, vec![Duration::from_millis(1_000); 5]);
    }
}
