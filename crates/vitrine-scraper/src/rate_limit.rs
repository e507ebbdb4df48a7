//! Backoff for VTEX storefront calls.
//!
//! A 429 or a transport failure is retried; a 404, an unexpected status or
//! an unparsable body is returned from the first attempt.

use std::future::Future;
use std::time::Duration;

use crate::error::ScraperError;

/// How many extra attempts a VTEX call gets and how long to wait between them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct RetryPolicy {
    pub max_retries: u32,
    pub backoff_base_secs: u64,
}

impl RetryPolicy {
    /// Sleep before retry number `retry` (zero-based): `base * 2^retry`.
    fn delay(self, retry: u32) -> Duration {
        let factor = 2u64.saturating_pow(retry);
        Duration::from_secs(self.backoff_base_secs.saturating_mul(factor))
    }

    /// Runs `call` until it succeeds, fails permanently or the retries run
    /// out, in which case the last error is returned.
    pub(crate) async fn run<T, F, Fut>(self, mut call: F) -> Result<T, ScraperError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, ScraperError>>,
    {
        let mut retry = 0u32;
        loop {
            let err = match call().await {
                Ok(value) => return Ok(value),
                Err(err) => err,
            };
            let transient = matches!(
                err,
                ScraperError::RateLimited { .. } | ScraperError::Http(_)
            );
            if !transient || retry >= self.max_retries {
                return Err(err);
            }

            let delay = self.delay(retry);
            tracing::warn!(
                retry = retry + 1,
                max_retries = self.max_retries,
                delay_secs = delay.as_secs(),
                error = %err,
                "storefront call failed, backing off"
            );
            tokio::time::sleep(delay).await;
            retry += 1;
        }
    }
}
