//! Retry policy and HTTP status classification.

use super::Classification;
use crate::types::RemoteConfig;
use reqwest::StatusCode;
use std::time::Duration;

/// Fixed attempt budget with linear backoff.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first. Always at least 1.
    pub max_attempts: u32,
    /// Wait after attempt `n` is `backoff_base * n`.
    pub backoff_base: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 2,
            backoff_base: Duration::from_millis(300),
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, backoff_base: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            backoff_base,
        }
    }

    pub fn from_config(config: &RemoteConfig) -> Self {
        Self::new(config.max_attempts, config.backoff_base)
    }

    /// Delay to wait after a failed `attempt` (1-based) before the next one.
    pub fn backoff(&self, attempt: u32) -> Duration {
        self.backoff_base.saturating_mul(attempt)
    }

    /// Whether another attempt is allowed after `attempt` failed.
    pub fn has_remaining(&self, attempt: u32) -> bool {
        attempt < self.max_attempts
    }
}

/// Classify a response status.
pub fn classify_status(status: StatusCode) -> Classification {
    match status.as_u16() {
        200..=299 => Classification::Success,
        401 | 403 => Classification::AuthFailure,
        429 => Classification::RateLimited,
        500..=599 => Classification::ServerError,
        _ => Classification::Rejected,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backoff_grows_linearly() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.backoff(1), Duration::from_millis(300));
        assert_eq!(policy.backoff(2), Duration::from_millis(600));
        assert_eq!(policy.backoff(2), policy.backoff(1) * 2);
    }

    #[test]
    fn test_budget() {
        let policy = RetryPolicy::new(2, Duration::from_millis(1));
        assert!(policy.has_remaining(1));
        assert!(!policy.has_remaining(2));
    }

    #[test]
    fn test_zero_attempts_clamped() {
        let policy = RetryPolicy::new(0, Duration::ZERO);
        assert_eq!(policy.max_attempts, 1);
    }

    #[test]
    fn test_classify_status() {
        assert_eq!(classify_status(StatusCode::OK), Classification::Success);
        assert_eq!(classify_status(StatusCode::CREATED), Classification::Success);
        assert_eq!(classify_status(StatusCode::UNAUTHORIZED), Classification::AuthFailure);
        assert_eq!(classify_status(StatusCode::FORBIDDEN), Classification::AuthFailure);
        assert_eq!(classify_status(StatusCode::TOO_MANY_REQUESTS), Classification::RateLimited);
        assert_eq!(classify_status(StatusCode::INTERNAL_SERVER_ERROR), Classification::ServerError);
        assert_eq!(classify_status(StatusCode::BAD_GATEWAY), Classification::ServerError);
        assert_eq!(classify_status(StatusCode::NOT_FOUND), Classification::Rejected);
        assert_eq!(classify_status(StatusCode::BAD_REQUEST), Classification::Rejected);
    }
}
