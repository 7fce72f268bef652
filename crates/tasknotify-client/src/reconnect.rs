//! Fixed-delay reconnect policy.
//!
//! Pure state machine: the driver reports opens and closes, the policy
//! answers whether and when to retry. No IO and no timers live here.

use std::time::Duration;

/// Where the policy stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconnectPhase {
    /// No close has been counted since the last open.
    Idle,
    /// A retry has been granted.
    Retrying { attempt: u32 },
    /// The cap was reached.
    Exhausted,
}

/// Answer to a close event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconnectDecision {
    /// Wait `delay`, then reconnect. `attempt` counts from 1.
    Retry { attempt: u32, delay: Duration },
    /// Stop for good after `attempts` retries.
    GiveUp { attempts: u32 },
}

/// Retry counter with a cap and a flat delay.
#[derive(Debug, Clone)]
pub struct ReconnectPolicy {
    max_attempts: u32,
    delay: Duration,
    attempts: u32,
    phase: ReconnectPhase,
}

impl ReconnectPolicy {
    pub fn new(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts,
            delay,
            attempts: 0,
            phase: ReconnectPhase::Idle,
        }
    }

    /// A socket opened: the counter starts over.
    pub fn on_open(&mut self) {
        self.attempts = 0;
        self.phase = ReconnectPhase::Idle;
    }

    /// A socket closed (or failed to open).
    pub fn on_close(&mut self) -> ReconnectDecision {
        if self.attempts < self.max_attempts {
            self.attempts += 1;
            self.phase = ReconnectPhase::Retrying {
                attempt: self.attempts,
            };
            ReconnectDecision::Retry {
                attempt: self.attempts,
                delay: self.delay,
            }
        } else {
            self.phase = ReconnectPhase::Exhausted;
            ReconnectDecision::GiveUp {
                attempts: self.attempts,
            }
        }
    }

    /// Forget all history, as after an explicit disconnect.
    pub fn reset(&mut self) {
        self.on_open();
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub fn phase(&self) -> ReconnectPhase {
        self.phase
    }

    pub fn is_exhausted(&self) -> bool {
        self.phase == ReconnectPhase::Exhausted
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy() -> ReconnectPolicy {
        ReconnectPolicy::new(5, Duration::from_secs(3))
    }

    #[test]
    fn test_retries_up_to_cap() {
        let mut policy = policy();
        for expected in 1..=5 {
            assert_eq!(
                policy.on_close(),
                ReconnectDecision::Retry {
                    attempt: expected,
                    delay: Duration::from_secs(3)
                }
            );
        }
        assert_eq!(policy.on_close(), ReconnectDecision::GiveUp { attempts: 5 });
        assert!(policy.is_exhausted());
    }

    #[test]
    fn test_retries_equal_min_of_closes_and_cap() {
        for closes in 0..12u32 {
            let mut policy = policy();
            let retries = (0..closes)
                .filter(|_| matches!(policy.on_close(), ReconnectDecision::Retry { .. }))
                .count() as u32;
            assert_eq!(retries, closes.min(5));
        }
    }

    #[test]
    fn test_open_resets_counter() {
        let mut policy = policy();
        policy.on_close();
        policy.on_close();
        assert_eq!(policy.attempts(), 2);

        policy.on_open();
        assert_eq!(policy.attempts(), 0);
        assert_eq!(policy.phase(), ReconnectPhase::Idle);
        assert_eq!(
            policy.on_close(),
            ReconnectDecision::Retry {
                attempt: 1,
                delay: Duration::from_secs(3)
            }
        );
    }

    #[test]
    fn test_exhausted_stays_exhausted_without_open() {
        let mut policy = ReconnectPolicy::new(1, Duration::from_millis(10));
        assert!(matches!(policy.on_close(), ReconnectDecision::Retry { .. }));
        assert!(matches!(policy.on_close(), ReconnectDecision::GiveUp { .. }));
        assert!(matches!(policy.on_close(), ReconnectDecision::GiveUp { .. }));
    }

    #[test]
    fn test_zero_cap_never_retries() {
        let mut policy = ReconnectPolicy::new(0, Duration::from_secs(1));
        assert_eq!(policy.on_close(), ReconnectDecision::GiveUp { attempts: 0 });
    }

    #[test]
    fn test_delay_is_flat() {
        let mut policy = policy();
        let delays: Vec<Duration> = (0..5)
            .filter_map(|_| match policy.on_close() {
                ReconnectDecision::Retry { delay, .. } => Some(delay),
                ReconnectDecision::GiveUp { .. } => None,
            })
            .collect();
        assert!(delays.iter().all(|d| *d == Duration::from_secs(3)));
    }

    #[test]
    fn test_reset() {
        let mut policy = policy();
        for _ in 0..6 {
            policy.on_close();
        }
        policy.reset();
        assert!(!policy.is_exhausted());
        assert_eq!(policy.attempts(), 0);
    }
}
