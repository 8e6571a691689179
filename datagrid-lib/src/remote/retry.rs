//! Retry policy for data-source and relation lookups.
//!
//! [`RemoteClient::get_json`](super::RemoteClient::get_json) asks
//! [`RetryConfig::should_retry`] after each failed GET and sleeps for
//! [`RetryConfig::delay_for`] before trying again. Page loads and relation
//! lookups share the policy of the client that sends them.

use std::time::Duration;

use crate::error::ApiError;

/// Which transient failures a table is willing to wait out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryOn {
    /// The data source answered 429.
    pub rate_limited: bool,
    /// The data source answered 500, 502, 503 or 504.
    pub server_errors: bool,
    /// The request never got an answer: connection failure or timeout.
    pub network: bool,
}

impl RetryOn {
    pub const ALL: RetryOn = RetryOn {
        rate_limited: true,
        server_errors: true,
        network: true,
    };

    pub const NONE: RetryOn = RetryOn {
        rate_limited: false,
        server_errors: false,
        network: false,
    };

    fn covers(&self, error: &ApiError) -> bool {
        match error {
            ApiError::Http { status: 429, .. } => self.rate_limited,
            ApiError::Http { .. } => self.server_errors,
            ApiError::Network(_) | ApiError::Timeout(_) => self.network,
            _ => false,
        }
    }
}

/// Exponential wait between attempts: `initial`, then doubled per attempt,
/// never more than `cap`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Backoff {
    pub initial: Duration,
    pub cap: Duration,
}

impl Backoff {
    pub fn new(initial: Duration, cap: Duration) -> Self {
        Self { initial, cap }
    }

    fn delay(&self, attempt: u32) -> Duration {
        self.initial
            .checked_mul(2u32.saturating_pow(attempt))
            .map_or(self.cap, |d| d.min(self.cap))
    }
}

/// How a [`RemoteClient`](super::RemoteClient) handles a failed page or
/// relation request.
///
/// A 404 from the relation endpoint is an answer, not a failure, and is
/// never retried. Neither are other 4xx responses or unparseable bodies.
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use datagrid_lib::remote::Backoff;
/// use datagrid_lib::remote::RetryConfig;
///
/// let retry = RetryConfig::default()
///     .with_max_retries(5)
///     .with_backoff(Backoff::new(Duration::from_millis(200), Duration::from_secs(5)));
/// assert_eq!(retry.delay_for(2), Duration::from_millis(800));
///
/// assert_eq!(RetryConfig::no_retry().max_retries, 0);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryConfig {
    /// Retries after the first attempt. Zero sends every request once.
    pub max_retries: u32,
    pub backoff: Backoff,
    pub retry_on: RetryOn,
}

impl Default for RetryConfig {
    /// Three retries, waiting 1s, 2s, 4s, on any transient failure.
    fn default() -> Self {
        Self {
            max_retries: 3,
            backoff: Backoff::new(Duration::from_secs(1), Duration::from_secs(30)),
            retry_on: RetryOn::ALL,
        }
    }
}

impl RetryConfig {
    /// Sends every request exactly once. Used by tables that would rather
    /// show an error state than stall a page load.
    pub fn no_retry() -> Self {
        Self {
            max_retries: 0,
            retry_on: RetryOn::NONE,
            ..Default::default()
        }
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn with_backoff(mut self, backoff: Backoff) -> Self {
        self.backoff = backoff;
        self
    }

    pub fn with_retry_on(mut self, retry_on: RetryOn) -> Self {
        self.retry_on = retry_on;
        self
    }

    /// Wait before retry number `attempt`, counting from 0.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        self.backoff.delay(attempt)
    }

    /// Whether a request that failed with `error`, after `attempt` retries,
    /// gets another try.
    pub fn should_retry(&self, error: &ApiError, attempt: u32) -> bool {
        attempt < self.max_retries && error.is_retryable() && self.retry_on.covers(error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backoff_doubles_up_to_cap() {
        let retry = RetryConfig::default()
            .with_backoff(Backoff::new(Duration::from_secs(1), Duration::from_secs(5)));
        let delays: Vec<u64> = [0, 1, 2, 3, 40]
            .into_iter()
            .map(|attempt| retry.delay_for(attempt).as_secs())
            .collect();
        assert_eq!(delays, [1, 2, 4, 5, 5]);
    }

    #[test]
    fn test_page_load_failures_retry_until_budget_spent() {
        let retry = RetryConfig::default().with_max_retries(2);
        let unavailable = ApiError::http(503, "Service Unavailable");
        assert!(retry.should_retry(&unavailable, 0));
        assert!(retry.should_retry(&unavailable, 1));
        assert!(!retry.should_retry(&unavailable, 2));
        assert!(retry.should_retry(&ApiError::http(429, "Too Many Requests"), 1));
        assert!(retry.should_retry(&ApiError::Timeout(Duration::from_secs(1)), 0));
    }

    #[test]
    fn test_relation_not_found_is_final() {
        let retry = RetryConfig::default();
        assert!(!retry.should_retry(&ApiError::http(404, "Not Found"), 0));
        assert!(!retry.should_retry(&ApiError::http(400, "Missing id parameter"), 0));
        assert!(!retry.should_retry(&ApiError::parse("bad"), 0));
    }

    #[test]
    fn test_retry_on_selects_failures() {
        let only_rate_limits = RetryOn {
            rate_limited: true,
            ..RetryOn::NONE
        };
        let retry = RetryConfig::default().with_retry_on(only_rate_limits);
        assert!(!retry.should_retry(&ApiError::http(500, "Internal Server Error"), 0));
        assert!(!retry.should_retry(&ApiError::Timeout(Duration::from_secs(1)), 0));
        assert!(retry.should_retry(&ApiError::http(429, "Too Many Requests"), 0));
        assert!(!RetryConfig::no_retry().should_retry(&ApiError::http(429, ""), 0));
    }
}
