//! Reconnect policy applied by the stream session after a disconnect.

use std::time::Duration;

/// Default first delay for [`ReconnectPolicy::Backoff`].
pub const DEFAULT_INITIAL_BACKOFF: Duration = Duration::from_secs(1);

/// Default delay cap for [`ReconnectPolicy::Backoff`].
pub const DEFAULT_MAX_BACKOFF: Duration = Duration::from_secs(10);

/// What the session does once its connection drops.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReconnectPolicy {
    /// Stay disconnected until the view is remounted.
    #[default]
    Never,
    /// Retry with doubling delays, capped at `max`.
    Backoff {
        initial: Duration,
        max: Duration,
        /// `None` retries forever.
        max_attempts: Option<u32>,
    },
}

impl ReconnectPolicy {
    /// Backoff with the default delays and no attempt bound.
    pub fn backoff() -> Self {
        ReconnectPolicy::Backoff {
            initial: DEFAULT_INITIAL_BACKOFF,
            max: DEFAULT_MAX_BACKOFF,
            max_attempts: None,
        }
    }

    /// Delay before reconnect attempt number `attempt` (0-based), or `None`
    /// when the policy gives up.
    pub fn delay_for(&self, attempt: u32) -> Option<Duration> {
        match *self {
            ReconnectPolicy::Never => None,
            ReconnectPolicy::Backoff {
                initial,
                max,
                max_attempts,
            } => {
                if max_attempts.is_some_and(|limit| attempt >= limit) {
                    return None;
                }
                let factor = 2u32.saturating_pow(attempt.min(31));
                Some(initial.saturating_mul(factor).min(max))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_never_gives_up_immediately() {
        assert_eq!(ReconnectPolicy::Never.delay_for(0), None);
        assert_eq!(ReconnectPolicy::default().delay_for(0), None);
    }

    #[test]
    fn test_backoff_doubles_until_cap() {
        let policy = ReconnectPolicy::backoff();
        let delays: Vec<u64> = (0..6)
            .map(|n| policy.delay_for(n).unwrap().as_secs())
            .collect();
        assert_eq!(delays, vec![1, 2, 4, 8, 10, 10]);
    }

    #[test]
    fn test_backoff_respects_attempt_bound() {
        let policy = ReconnectPolicy::Backoff {
            initial: Duration::from_millis(100),
            max: Duration::from_secs(5),
            max_attempts: Some(2),
        };
        assert_eq!(policy.delay_for(0), Some(Duration::from_millis(100)));
        assert_eq!(policy.delay_for(1), Some(Duration::from_millis(200)));
        assert_eq!(policy.delay_for(2), None);
    }

    #[test]
    fn test_backoff_large_attempt_does_not_overflow() {
        let policy = ReconnectPolicy::backoff();
        assert_eq!(policy.delay_for(u32::MAX), Some(DEFAULT_MAX_BACKOFF));
    }
}
