//! Retry configuration, rate-limit backoff, and the retrying executor.
//!
//! [`execute`] runs one vendor invocation with bounded resilience:
//!
//! - rate-limit failures wait per [`RateLimitPolicy`] (or the server's
//!   `retry_after` hint), then retry;
//! - transient failures retry immediately;
//! - fatal failures propagate on first occurrence.
//!
//! Every attempt, whatever its cause, counts against
//! [`RetryConfig::max_attempts`]. Waits are `tokio::time::sleep`, so they
//! suspend only the calling task. Dropping the returned future abandons
//! any remaining attempts.

use std::future::Future;
use std::time::Duration;

use serde::Serialize;
use tracing::warn;

use crate::error::{ClientError, FailureClass};
use crate::telemetry;
use crate::{DispatchError, Result};

/// How long to wait after a rate-limit signal.
///
/// Waits never decrease with the attempt number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RateLimitPolicy {
    /// Same wait every time.
    Fixed { wait: Duration },
    /// `initial * 2^n`, capped at `max`.
    Exponential { initial: Duration, max: Duration },
}

impl Default for RateLimitPolicy {
    fn default() -> Self {
        RateLimitPolicy::Fixed {
            wait: Duration::from_secs(1),
        }
    }
}

impl RateLimitPolicy {
    /// Fixed wait between rate-limited attempts.
    pub fn fixed(wait: Duration) -> Self {
        RateLimitPolicy::Fixed { wait }
    }

    /// Exponential wait, capped at `max`.
    pub fn exponential(initial: Duration, max: Duration) -> Self {
        RateLimitPolicy::Exponential { initial, max }
    }

    /// Wait before the retry following rate-limited attempt `attempt` (0-indexed).
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        match *self {
            RateLimitPolicy::Fixed { wait } => wait,
            RateLimitPolicy::Exponential { initial, max } => initial
                .saturating_mul(2u32.saturating_pow(attempt))
                .min(max),
        }
    }

    /// Effective wait, respecting a server-provided `retry_after` hint.
    ///
    /// The hint takes precedence over the configured policy.
    pub fn effective_delay(&self, attempt: u32, retry_after: Option<Duration>) -> Duration {
        retry_after.unwrap_or_else(|| self.delay_for_attempt(attempt))
    }
}

/// Retry budget and rate-limit backoff.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RetryConfig {
    /// Total attempts allowed, including the first. 0 and 1 both mean a
    /// single attempt. Default: 3.
    pub max_attempts: u32,
    pub rate_limit: RateLimitPolicy,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            rate_limit: RateLimitPolicy::default(),
        }
    }
}

impl RetryConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// A config that makes exactly one attempt.
    pub fn disabled() -> Self {
        Self {
            max_attempts: 1,
            ..Self::default()
        }
    }

    pub fn max_attempts(mut self, n: u32) -> Self {
        self.max_attempts = n;
        self
    }

    pub fn rate_limit(mut self, policy: RateLimitPolicy) -> Self {
        self.rate_limit = policy;
        self
    }

    /// Attempts actually allowed: never fewer than one.
    pub fn attempt_budget(&self) -> u32 {
        self.max_attempts.max(1)
    }
}

/// Execute an async vendor call with retry logic.
///
/// `section` and `operation` only label logs and metrics. On budget
/// exhaustion the last retryable failure is wrapped in
/// [`DispatchError::RetriesExhausted`]; fatal failures become
/// [`DispatchError::FatalApi`] immediately.
pub async fn execute<F, Fut, T>(
    config: &RetryConfig,
    section: &str,
    operation: &str,
    f: F,
) -> Result<T>
where
    F: Fn() -> Fut,
    Fut: Future<Output = std::result::Result<T, ClientError>>,
{
    let budget = config.attempt_budget();
    let mut rate_limited: u32 = 0;
    let mut attempt: u32 = 0;
    loop {
        attempt += 1;
        let err = match f().await {
            Ok(value) => return Ok(value),
            Err(e) => e,
        };

        let class = err.class();
        if class == FailureClass::Fatal {
            return Err(DispatchError::FatalApi(err));
        }
        if attempt >= budget {
            return Err(DispatchError::RetriesExhausted {
                attempts: attempt,
                last: err,
            });
        }

        let (reason, delay) = match class {
            FailureClass::RateLimit => {
                let delay = config
                    .rate_limit
                    .effective_delay(rate_limited, err.retry_after());
                rate_limited += 1;
                ("rate_limit", delay)
            }
            _ => ("transient", Duration::ZERO),
        };

        metrics::counter!(telemetry::RETRIES_TOTAL,
            "section" => section.to_owned(),
            "reason" => reason,
        )
        .increment(1);
        warn!(
            section,
            operation,
            attempt,
            max_attempts = budget,
            delay_ms = delay.as_millis() as u64,
            error = %err,
            "retrying after {reason} failure"
        );

        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
    }
}
