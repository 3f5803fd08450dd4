//! Bounded retries on top of a [`ForecastProvider`].
//!
//! Retried: network failures and 5xx provider responses.
//! Not retried: malformed payloads (contract break) and 4xx responses.

use std::time::Duration;

use tracing::{debug, warn};

use crate::{
    error::FetchError,
    model::{Coordinate, ForecastDataset},
    provider::ForecastProvider,
};

pub const MAX_ATTEMPTS: u32 = 3;
pub const RETRY_DELAY: Duration = Duration::from_secs(5);

/// How often and how patiently a [`Fetcher`] retries transient failures.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Total attempts, including the first one.
    pub max_attempts: u32,
    /// Fixed delay between attempts.
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self { max_attempts: MAX_ATTEMPTS, delay: RETRY_DELAY }
    }
}

/// Turns a single-attempt provider into a dependable fetch call.
///
/// Stateless across calls; each [`Fetcher::fetch`] starts from a clean
/// slate.
#[derive(Debug)]
pub struct Fetcher<P> {
    provider: P,
    policy: RetryPolicy,
}

impl<P: ForecastProvider> Fetcher<P> {
    pub fn new(provider: P) -> Self {
        Self::with_policy(provider, RetryPolicy::default())
    }

    pub fn with_policy(provider: P, policy: RetryPolicy) -> Self {
        Self { provider, policy }
    }

    /// Fetch a dataset, retrying transient failures up to the policy limit.
    /// On exhaustion the last underlying error is surfaced to the caller.
    pub async fn fetch(
        &self,
        coordinate: &Coordinate,
        days: u8,
    ) -> Result<ForecastDataset, FetchError> {
        let attempts = self.policy.max_attempts.max(1);
        let mut attempt = 1;
        loop {
            match self.provider.forecast(coordinate, days).await {
                Ok(dataset) => {
                    if attempt > 1 {
                        debug!(attempt, "forecast fetch succeeded after retry");
                    }
                    return Ok(dataset);
                }
                Err(err) if err.is_transient() && attempt < attempts => {
                    warn!(
                        attempt,
                        max_attempts = attempts,
                        error = %err,
                        "forecast fetch failed, retrying in {:?}",
                        self.policy.delay
                    );
                    tokio::time::sleep(self.policy.delay).await;
                    attempt += 1;
                }
                Err(err) => return Err(err),
            }
        }
    }
}
