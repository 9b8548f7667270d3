use crate::core::config::RetryPolicy;
use crate::core::errors::{CexioError, CexioResult};
use crate::core::kernel::transport::{HttpRequest, Transport};
use serde_json::Value;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;
use tokio_retry::Retry;
use tracing::{error, warn};

/// Delay schedule derived from a [`RetryPolicy`].
///
/// Yields `min(max_timeout, min_timeout * factor^(n - 1))` for
/// `n = 1..=retries`, then stops.
#[derive(Debug, Clone)]
pub struct Backoff {
    min: Duration,
    max: Duration,
    factor: f64,
    retries: u32,
    attempt: u32,
}

impl Backoff {
    pub fn new(policy: &RetryPolicy) -> Self {
        Self {
            min: policy.min_timeout,
            max: policy.max_timeout,
            factor: policy.factor,
            retries: policy.retries,
            attempt: 0,
        }
    }
}

impl Iterator for Backoff {
    type Item = Duration;

    fn next(&mut self) -> Option<Duration> {
        if self.attempt >= self.retries {
            return None;
        }

        let exponent = i32::try_from(self.attempt).unwrap_or(i32::MAX);
        let micros = self.min.as_micros() as f64 * self.factor.powi(exponent);
        self.attempt += 1;

        let delay = if micros.is_finite() && micros < self.max.as_micros() as f64 {
            Duration::from_micros(micros.max(0.0).round() as u64)
        } else {
            self.max
        };
        Some(delay)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.retries.saturating_sub(self.attempt) as usize;
        (remaining, Some(remaining))
    }
}

/// Wraps a [`Transport`] and re-executes failed exchanges with backoff.
///
/// The same [`HttpRequest`] is replayed on every attempt, so a signed body
/// keeps the nonce it was built with.
#[derive(Debug, Clone)]
pub struct RetryingTransport<T> {
    inner: T,
    policy: RetryPolicy,
}

impl<T: Transport> RetryingTransport<T> {
    pub fn new(inner: T, policy: RetryPolicy) -> Self {
        Self { inner, policy }
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    pub fn inner(&self) -> &T {
        &self.inner
    }

    /// Execute `request`, retrying transport failures per the policy.
    pub async fn send(&self, request: &HttpRequest) -> CexioResult<Value> {
        let attempts = AtomicU32::new(0);
        let retries = self.policy.retries;

        let action = || {
            let attempt = attempts.fetch_add(1, Ordering::Relaxed) + 1;
            async move {
                let result = self.inner.execute(request).await;
                if let Err(e) = &result {
                    if attempt <= retries {
                        warn!(attempt, url = %request.url, error = %e, "Request failed, retrying");
                    }
                }
                result
            }
        };

        Retry::start(Backoff::new(&self.policy), action)
            .await
            .map_err(|source| {
                let attempts = attempts.load(Ordering::Relaxed);
                error!(attempts, url = %request.url, error = %source, "Request failed");
                CexioError::Transport { attempts, source }
            })
    }
}
