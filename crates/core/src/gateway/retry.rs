use std::time::Duration;

/// Retry behaviour for idempotent gateway requests.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Retries after the first attempt.
    pub limit: u32,
    pub status_codes: &'static [u16],
    pub timeout: Duration,
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            limit: 2,
            status_codes: &[408, 429, 500, 502, 503, 504],
            timeout: Duration::from_secs(10),
            base_delay: Duration::from_millis(300),
        }
    }
}

impl RetryPolicy {
    /// No retries, same timeout. Used for non-idempotent requests.
    pub fn once() -> Self {
        Self {
            limit: 0,
            ..Self::default()
        }
    }

    pub fn retries_status(&self, status: u16) -> bool {
        self.status_codes.contains(&status)
    }

    /// Backoff before retry number `attempt` (1-based): base × 2^(attempt−1).
    pub fn delay(&self, attempt: u32) -> Duration {
        self.base_delay * 2u32.saturating_pow(attempt.saturating_sub(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backoff_doubles() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.delay(1), Duration::from_millis(300));
        assert_eq!(policy.delay(2), Duration::from_millis(600));
        assert_eq!(policy.delay(3), Duration::from_millis(1200));
    }

    #[test]
    fn only_transient_statuses_retry() {
        let policy = RetryPolicy::default();
        assert!(policy.retries_status(503));
        assert!(policy.retries_status(429));
        assert!(!policy.retries_status(404));
        assert!(!policy.retries_status(401));
    }
}
