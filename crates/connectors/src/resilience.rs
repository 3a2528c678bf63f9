//! Reconnect policy for long-lived streams
//!
//! Exponential backoff with a cap, bounded by a maximum number of consecutive
//! attempts. A successful reconnect resets the attempt count on the caller's
//! side.

use std::time::Duration;

use tweetcast_config::ReconnectConfig;

/// Default maximum reconnect attempts
pub const DEFAULT_MAX_RETRIES: u32 = 5;

/// Default base delay before the first reconnect
pub const DEFAULT_BASE_DELAY: Duration = Duration::from_secs(1);

/// Default cap on the reconnect delay
pub const DEFAULT_MAX_DELAY: Duration = Duration::from_secs(60);

/// Backoff exponent cap (2^16 * base is far beyond any sane max_delay)
const MAX_EXPONENT: u32 = 16;

/// Reconnect policy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconnectPolicy {
    /// Consecutive attempts allowed before giving up
    pub max_retries: u32,
    /// Delay before attempt 0; doubles every attempt
    pub base_delay: Duration,
    /// Upper bound on any single delay
    pub max_delay: Duration,
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            base_delay: DEFAULT_BASE_DELAY,
            max_delay: DEFAULT_MAX_DELAY,
        }
    }
}

impl ReconnectPolicy {
    /// Never reconnect; the first mid-run failure is final
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            ..Self::default()
        }
    }

    /// Whether attempt number `attempt` (0-based) may run
    #[inline]
    pub fn allows(&self, attempt: u32) -> bool {
        attempt < self.max_retries
    }

    /// Delay before attempt number `attempt` (0-based)
    pub fn delay(&self, attempt: u32) -> Duration {
        let factor = 1u32 << attempt.min(MAX_EXPONENT);
        self.base_delay
            .checked_mul(factor)
            .unwrap_or(self.max_delay)
            .min(self.max_delay)
    }
}

impl From<&ReconnectConfig> for ReconnectPolicy {
    fn from(config: &ReconnectConfig) -> Self {
        Self {
            max_retries: config.max_retries,
            base_delay: config.base_delay,
            max_delay: config.max_delay,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exponential_delay() {
        let policy = ReconnectPolicy {
            max_retries: 10,
            base_delay: Duration::from_millis(100),
            max_delay: Duration::from_secs(10),
        };

        assert_eq!(policy.delay(0), Duration::from_millis(100));
        assert_eq!(policy.delay(1), Duration::from_millis(200));
        assert_eq!(policy.delay(2), Duration::from_millis(400));
        assert_eq!(policy.delay(5), Duration::from_millis(3200));
    }

    #[test]
    fn test_delay_capped() {
        let policy = ReconnectPolicy::default();
        assert_eq!(policy.delay(10), DEFAULT_MAX_DELAY);
        assert_eq!(policy.delay(u32::MAX), DEFAULT_MAX_DELAY);
    }

    #[test]
    fn test_allows() {
        let policy = ReconnectPolicy {
            max_retries: 2,
            ..Default::default()
        };
        assert!(policy.allows(0));
        assert!(policy.allows(1));
        assert!(!policy.allows(2));
    }

    #[test]
    fn test_none_never_allows() {
        assert!(!ReconnectPolicy::none().allows(0));
    }

    #[test]
    fn test_from_config() {
        let config = ReconnectConfig {
            max_retries: 3,
            base_delay: Duration::from_millis(250),
            max_delay: Duration::from_secs(2),
        };
        let policy = ReconnectPolicy::from(&config);
        assert_eq!(policy.max_retries, 3);
        assert_eq!(policy.delay(4), Duration::from_secs(2));
    }
}
