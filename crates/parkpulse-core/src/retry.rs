//! Bounded retry around a single upstream GET.

use std::fmt::{Display, Formatter};
use std::str::FromStr;
use std::time::Duration;

use crate::http_client::{HttpClient, HttpRequest};
use crate::source::SourceError;

/// Delay strategy between attempts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Backoff {
    /// Same delay before every retry.
    Fixed {
        delay: Duration,
    },
    /// `base * factor^attempt`, capped at `max`, optionally scaled by a
    /// random factor in `[0.5, 1.5)`.
    Exponential {
        base: Duration,
        factor: f64,
        max: Duration,
        jitter: bool,
    },
}

impl Default for Backoff {
    fn default() -> Self {
        Self::Fixed {
            delay: Duration::from_secs(1),
        }
    }
}

impl Backoff {
    /// Doubling delays starting at `base`, capped at four times `base`, jittered.
    pub fn exponential(base: Duration) -> Self {
        Self::Exponential {
            base,
            factor: 2.0,
            max: base * 4,
            jitter: true,
        }
    }

    pub fn strategy(self) -> BackoffStrategy {
        match self {
            Self::Fixed { .. } => BackoffStrategy::Fixed,
            Self::Exponential { .. } => BackoffStrategy::Exponential,
        }
    }

    /// Delay before the first retry.
    pub fn base_delay(self) -> Duration {
        match self {
            Self::Fixed { delay } => delay,
            Self::Exponential { base, .. } => base,
        }
    }

    /// Delay before retry number `attempt` (0-based).
    pub fn delay(self, attempt: u32) -> Duration {
        match self {
            Self::Fixed { delay } => delay,
            Self::Exponential { jitter: false, .. } => self.step(attempt),
            Self::Exponential { jitter: true, .. } => {
                self.step(attempt).mul_f64(0.5 + fastrand::f64())
            }
        }
    }

    /// Upper bound on the delay for retry number `attempt`.
    pub fn max_delay(self, attempt: u32) -> Duration {
        match self {
            Self::Fixed { delay } => delay,
            Self::Exponential { jitter: false, .. } => self.step(attempt),
            Self::Exponential { jitter: true, .. } => self.step(attempt).mul_f64(1.5),
        }
    }

    // Exponential step before jitter, clamped to `max`.
    fn step(self, attempt: u32) -> Duration {
        match self {
            Self::Fixed { delay } => delay,
            Self::Exponential {
                base, factor, max, ..
            } => {
                let exponent = i32::try_from(attempt).unwrap_or(i32::MAX);
                let seconds = base.as_secs_f64() * factor.powi(exponent);
                Duration::from_secs_f64(seconds.min(max.as_secs_f64()).max(0.0))
            }
        }
    }
}

/// Which [`Backoff`] family to build from a base delay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BackoffStrategy {
    #[default]
    Fixed,
    Exponential,
}

impl BackoffStrategy {
    pub fn backoff(self, base: Duration) -> Backoff {
        match self {
            Self::Fixed => Backoff::Fixed { delay: base },
            Self::Exponential => Backoff::exponential(base),
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Fixed => "fixed",
            Self::Exponential => "exponential",
        }
    }
}

impl FromStr for BackoffStrategy {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "fixed" => Ok(Self::Fixed),
            "exponential" => Ok(Self::Exponential),
            other => Err(format!(
                "unknown backoff '{other}', expected 'fixed' or 'exponential'"
            )),
        }
    }
}

impl Display for BackoffStrategy {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Retry budget for one upstream source.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryConfig {
    /// Attempts beyond the first. Total attempts = `max_retries + 1`.
    pub max_retries: u32,
    pub backoff: Backoff,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 2,
            backoff: Backoff::default(),
        }
    }
}

impl RetryConfig {
    pub fn fixed(delay: Duration, max_retries: u32) -> Self {
        Self {
            max_retries,
            backoff: Backoff::Fixed { delay },
        }
    }

    pub fn exponential(base: Duration, max_retries: u32) -> Self {
        Self {
            max_retries,
            backoff: Backoff::exponential(base),
        }
    }

    pub fn with_strategy(strategy: BackoffStrategy, base: Duration, max_retries: u32) -> Self {
        Self {
            max_retries,
            backoff: strategy.backoff(base),
        }
    }

    pub fn no_retry() -> Self {
        Self {
            max_retries: 0,
            ..Self::default()
        }
    }

    /// Same backoff with a different retry budget.
    pub fn with_max_retries(&self, max_retries: u32) -> Self {
        Self {
            max_retries,
            backoff: self.backoff,
        }
    }

    /// Worst-case wall time for one request of `timeout` under this budget.
    pub fn worst_case(&self, timeout: Duration) -> Duration {
        let attempts = timeout * (self.max_retries + 1);
        let delays = (0..self.max_retries)
            .map(|attempt| self.backoff.max_delay(attempt))
            .sum::<Duration>();
        attempts + delays
    }
}

/// Issues `request` and hands each usable body to `accept`, retrying up to
/// `retries_remaining` more times.
///
/// A usable body is HTTP 200 and non-blank. Transport failures, timeouts,
/// other statuses and any retryable error returned by `accept` (an
/// unparseable body, say) each consume one retry. Non-retryable errors from
/// `accept` end the loop at once.
pub async fn fetch_with_retry<T, F>(
    client: &dyn HttpClient,
    request: &HttpRequest,
    retries_remaining: u32,
    backoff: Backoff,
    mut accept: F,
) -> Result<T, SourceError>
where
    F: FnMut(String) -> Result<T, SourceError>,
{
    let mut retries_remaining = retries_remaining;
    let mut attempt = 0;

    loop {
        let outcome = match fetch_once(client, request).await {
            Ok(body) => accept(body),
            Err(error) => Err(error),
        };

        match outcome {
            Ok(value) => return Ok(value),
            Err(error) if error.retryable() && retries_remaining > 0 => {
                let delay = backoff.delay(attempt);
                tracing::debug!(
                    url = %request.url,
                    retries_remaining,
                    delay_ms = delay.as_millis() as u64,
                    %error,
                    "upstream attempt failed, retrying"
                );
                tokio::time::sleep(delay).await;
                retries_remaining -= 1;
                attempt += 1;
            }
            Err(error) => return Err(error),
        }
    }
}

async fn fetch_once(client: &dyn HttpClient, request: &HttpRequest) -> Result<String, SourceError> {
    let response = tokio::time::timeout(request.timeout(), client.execute(request.clone()))
        .await
        .map_err(|_| {
            SourceError::unavailable(format!(
                "upstream timed out after {}ms",
                request.timeout_ms
            ))
        })??;

    if response.status != 200 {
        return Err(SourceError::unavailable(format!(
            "upstream returned status {}",
            response.status
        )));
    }
    if !response.is_usable() {
        return Err(SourceError::unavailable("upstream returned an empty body"));
    }

    Ok(response.body)
}
