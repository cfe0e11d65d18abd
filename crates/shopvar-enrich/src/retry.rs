//! Pacing and retry of model calls.
//!
//! Every attempt, first try or retry, waits for its turn on the shared
//! [`Pacer`], so retries never burst past the configured request spacing.
//! Between attempts the model's own `retryDelay` hint wins over the local
//! back-off schedule.

use std::future::Future;
use std::time::Duration;

use shopvar_core::AppConfig;
use tokio::sync::Mutex;
use tokio::time::Instant;

use crate::error::EnrichError;

/// Upper bound for any single wait between attempts.
const MAX_RETRY_DELAY: Duration = Duration::from_secs(30);

/// Spaces request starts at least `delay` apart.
#[derive(Debug)]
pub(crate) struct Pacer {
    delay: Duration,
    next_start: Mutex<Option<Instant>>,
}

impl Pacer {
    pub(crate) fn new(delay: Duration) -> Self {
        Self {
            delay,
            next_start: Mutex::new(None),
        }
    }

    pub(crate) fn unpaced() -> Self {
        Self::new(Duration::ZERO)
    }

    pub(crate) async fn wait_turn(&self) {
        if self.delay.is_zero() {
            return;
        }
        let mut next = self.next_start.lock().await;
        if let Some(at) = *next {
            tokio::time::sleep_until(at).await;
        }
        *next = Some(Instant::now() + self.delay);
    }
}

/// Returns `true` for failures a later attempt may not hit: timeouts,
/// connection failures, quota exhaustion (429) and 5xx.
pub(crate) fn is_retriable(err: &EnrichError) -> bool {
    match err {
        EnrichError::Http(e) => {
            e.is_timeout() || e.is_connect() || e.status().is_some_and(|s| s.is_server_error())
        }
        EnrichError::Api { status, .. } => *status == 429 || (500..600).contains(status),
        EnrichError::Deserialize { .. }
        | EnrichError::EmptyResponse
        | EnrichError::InvalidEndpoint { .. } => false,
    }
}

/// How often, and how patiently, a failed model call is repeated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Attempts after the first one.
    pub max_retries: u32,
    /// Wait before the first retry; doubles for each further retry.
    pub backoff_base: Duration,
}

impl RetryPolicy {
    #[must_use]
    pub fn new(max_retries: u32, backoff_base: Duration) -> Self {
        Self {
            max_retries,
            backoff_base,
        }
    }

    /// A single attempt, no retries.
    #[must_use]
    pub fn none() -> Self {
        Self::new(0, Duration::ZERO)
    }

    #[must_use]
    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(
            config.ai_max_retries,
            Duration::from_millis(config.ai_retry_backoff_ms),
        )
    }

    /// Wait before retry number `attempt` (1-based) after `err`.
    ///
    /// A server-provided retry delay is used as-is; otherwise
    /// `backoff_base × 2^(attempt-1)` with ±25 % jitter. Both are capped at
    /// 30 s.
    pub(crate) fn delay_for(&self, attempt: u32, err: &EnrichError) -> Duration {
        if let EnrichError::Api {
            retry_after: Some(hint),
            ..
        } = err
        {
            return (*hint).min(MAX_RETRY_DELAY);
        }
        let exponent = attempt.saturating_sub(1).min(10);
        let scheduled = self
            .backoff_base
            .saturating_mul(1 << exponent)
            .min(MAX_RETRY_DELAY);
        scheduled.mul_f64(rand::random::<f64>() * 0.5 + 0.75)
    }

    /// Runs `call` until it succeeds, fails with a non-retriable error, or
    /// the retry budget is spent. Each attempt first waits on `pacer`.
    pub(crate) async fn run<T, F, Fut>(&self, pacer: &Pacer, mut call: F) -> Result<T, EnrichError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, EnrichError>>,
    {
        let mut attempt = 0u32;
        loop {
            pacer.wait_turn().await;
            let err = match call().await {
                Ok(value) => return Ok(value),
                Err(err) => err,
            };
            if attempt >= self.max_retries || !is_retriable(&err) {
                return Err(err);
            }
            attempt += 1;
            let delay = self.delay_for(attempt, &err);
            tracing::warn!(
                attempt,
                max_retries = self.max_retries,
                delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                error = %err,
                "model call failed; retrying"
            );
            tokio::time::sleep(delay).await;
        }
    }
}
