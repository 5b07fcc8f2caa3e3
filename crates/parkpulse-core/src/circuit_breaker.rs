use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use serde::Serialize;

/// Runtime circuit state for a protected upstream operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CircuitState {
    Closed,
    Open,
    HalfOpen,
}

/// Circuit breaker thresholds and timers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CircuitBreakerConfig {
    /// Failure percentage (0-100) at or above which the circuit opens.
    pub error_threshold_percentage: u8,
    /// Length of the rolling evaluation window.
    pub rolling_window: Duration,
    /// Minimum calls inside the window before the percentage is evaluated.
    pub volume_threshold: u32,
    /// Cooldown before an open circuit admits a trial call.
    pub reset_timeout: Duration,
}

impl Default for CircuitBreakerConfig {
    fn default() -> Self {
        Self {
            error_threshold_percentage: 50,
            rolling_window: Duration::from_secs(10),
            volume_threshold: 4,
            reset_timeout: Duration::from_secs(30),
        }
    }
}

/// Counters and window contents exposed to the health surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CircuitSnapshot {
    pub state: CircuitState,
    pub successes: u64,
    pub failures: u64,
    pub rejections: u64,
    pub window_calls: u32,
    pub window_failures: u32,
}

#[derive(Debug)]
struct CircuitInner {
    state: CircuitState,
    window: VecDeque<(Instant, bool)>,
    opened_at: Option<Instant>,
    trial_started_at: Option<Instant>,
    successes: u64,
    failures: u64,
    rejections: u64,
}

impl Default for CircuitInner {
    fn default() -> Self {
        Self {
            state: CircuitState::Closed,
            window: VecDeque::new(),
            opened_at: None,
            trial_started_at: None,
            successes: 0,
            failures: 0,
            rejections: 0,
        }
    }
}

impl CircuitInner {
    fn prune(&mut self, now: Instant, window: Duration) {
        while let Some((at, _)) = self.window.front() {
            if now.duration_since(*at) > window {
                self.window.pop_front();
            } else {
                break;
            }
        }
    }

    fn window_failures(&self) -> u32 {
        self.window.iter().filter(|(_, failed)| *failed).count() as u32
    }

    fn trip(&mut self, now: Instant) {
        self.state = CircuitState::Open;
        self.opened_at = Some(now);
        self.trial_started_at = None;
        self.window.clear();
    }
}

/// Thread-safe circuit breaker shared by every request for one operation.
///
/// Every critical section is synchronous, so concurrent requests observe
/// consistent counters.
#[derive(Debug)]
pub struct CircuitBreaker {
    config: CircuitBreakerConfig,
    inner: Mutex<CircuitInner>,
}

impl Default for CircuitBreaker {
    fn default() -> Self {
        Self::new(CircuitBreakerConfig::default())
    }
}

impl CircuitBreaker {
    pub fn new(config: CircuitBreakerConfig) -> Self {
        Self {
            config,
            inner: Mutex::new(CircuitInner::default()),
        }
    }

    pub fn config(&self) -> CircuitBreakerConfig {
        self.config
    }

    fn lock(&self) -> MutexGuard<'_, CircuitInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Whether the caller may touch the network now.
    ///
    /// An open circuit moves to half-open once the cooldown has elapsed and
    /// admits exactly one trial; everything else is rejected and counted.
    pub fn allow_request(&self) -> bool {
        let mut inner = self.lock();
        let now = Instant::now();
        match inner.state {
            CircuitState::Closed => true,
            CircuitState::Open => {
                let cooled_down = inner
                    .opened_at
                    .map(|opened_at| now.duration_since(opened_at) >= self.config.reset_timeout)
                    .unwrap_or(true);

                if cooled_down {
                    inner.state = CircuitState::HalfOpen;
                    inner.opened_at = None;
                    inner.trial_started_at = Some(now);
                    tracing::info!("wait-time circuit half-open, admitting trial call");
                    true
                } else {
                    inner.rejections = inner.rejections.saturating_add(1);
                    false
                }
            }
            CircuitState::HalfOpen => {
                let trial_abandoned = inner
                    .trial_started_at
                    .map(|started| now.duration_since(started) >= self.config.reset_timeout)
                    .unwrap_or(true);

                if trial_abandoned {
                    inner.trial_started_at = Some(now);
                    true
                } else {
                    inner.rejections = inner.rejections.saturating_add(1);
                    false
                }
            }
        }
    }

    pub fn record_success(&self) {
        let mut inner = self.lock();
        let now = Instant::now();
        inner.successes = inner.successes.saturating_add(1);

        if inner.state == CircuitState::HalfOpen {
            tracing::info!("wait-time circuit closed after successful trial");
            inner.state = CircuitState::Closed;
            inner.trial_started_at = None;
            inner.window.clear();
        }

        inner.window.push_back((now, false));
        inner.prune(now, self.config.rolling_window);
    }

    pub fn record_failure(&self) {
        let mut inner = self.lock();
        let now = Instant::now();
        inner.failures = inner.failures.saturating_add(1);

        match inner.state {
            CircuitState::HalfOpen => {
                tracing::warn!("wait-time circuit re-opened after failed trial");
                inner.trip(now);
            }
            CircuitState::Open => {}
            CircuitState::Closed => {
                inner.window.push_back((now, true));
                inner.prune(now, self.config.rolling_window);

                let calls = inner.window.len() as u32;
                let failures = inner.window_failures();
                let threshold = u32::from(self.config.error_threshold_percentage);
                if calls >= self.config.volume_threshold.max(1)
                    && failures * 100 >= threshold * calls
                {
                    tracing::warn!(
                        calls,
                        failures,
                        "wait-time circuit opened, error rate crossed threshold"
                    );
                    inner.trip(now);
                }
            }
        }
    }

    pub fn state(&self) -> CircuitState {
        self.lock().state
    }

    pub fn snapshot(&self) -> CircuitSnapshot {
        let mut inner = self.lock();
        inner.prune(Instant::now(), self.config.rolling_window);
        CircuitSnapshot {
            state: inner.state,
            successes: inner.successes,
            failures: inner.failures,
            rejections: inner.rejections,
            window_calls: inner.window.len() as u32,
            window_failures: inner.window_failures(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(volume_threshold: u32, reset_timeout: Duration) -> CircuitBreakerConfig {
        CircuitBreakerConfig {
            error_threshold_percentage: 50,
            rolling_window: Duration::from_secs(10),
            volume_threshold,
            reset_timeout,
        }
    }

    #[test]
    fn opens_when_half_the_window_fails() {
        let breaker = CircuitBreaker::new(config(4, Duration::from_secs(30)));

        breaker.record_success();
        breaker.record_failure();
        breaker.record_success();
        assert_eq!(breaker.state(), CircuitState::Closed);

        breaker.record_failure();
        assert_eq!(breaker.state(), CircuitState::Open);
        assert!(!breaker.allow_request());
        assert_eq!(breaker.snapshot().rejections, 1);
    }

    #[test]
    fn stays_closed_below_threshold_or_volume() {
        let breaker = CircuitBreaker::new(config(4, Duration::from_secs(30)));

        breaker.record_failure();
        breaker.record_failure();
        assert_eq!(breaker.state(), CircuitState::Closed, "volume not reached");

        let breaker = CircuitBreaker::new(config(4, Duration::from_secs(30)));
        for _ in 0..3 {
            breaker.record_success();
        }
        breaker.record_failure();
        assert_eq!(breaker.state(), CircuitState::Closed, "25% is below 50%");
    }

    #[test]
    fn transitions_to_half_open_after_timeout_then_closes_on_success() {
        let breaker = CircuitBreaker::new(config(1, Duration::from_millis(5)));

        breaker.record_failure();
        assert_eq!(breaker.state(), CircuitState::Open);

        std::thread::sleep(Duration::from_millis(10));
        assert!(breaker.allow_request());
        assert_eq!(breaker.state(), CircuitState::HalfOpen);

        breaker.record_success();
        assert_eq!(breaker.state(), CircuitState::Closed);
        assert_eq!(breaker.snapshot().window_calls, 1);
    }

    #[test]
    fn failed_trial_reopens_circuit() {
        let breaker = CircuitBreaker::new(config(1, Duration::from_millis(5)));

        breaker.record_failure();
        std::thread::sleep(Duration::from_millis(10));
        assert!(breaker.allow_request());

        breaker.record_failure();
        assert_eq!(breaker.state(), CircuitState::Open);
        assert!(!breaker.allow_request());
    }

    #[test]
    fn half_open_admits_a_single_trial() {
        let breaker = CircuitBreaker::new(config(1, Duration::from_millis(50)));

        breaker.record_failure();
        std::thread::sleep(Duration::from_millis(60));

        assert!(breaker.allow_request());
        assert!(!breaker.allow_request(), "second caller waits for the trial");
        assert_eq!(breaker.snapshot().rejections, 1);
    }

    #[test]
    fn failures_older_than_the_window_stop_counting() {
        let breaker = CircuitBreaker::new(CircuitBreakerConfig {
            error_threshold_percentage: 50,
            rolling_window: Duration::from_millis(50),
            volume_threshold: 3,
            reset_timeout: Duration::from_secs(30),
        });

        breaker.record_failure();
        std::thread::sleep(Duration::from_millis(100));

        breaker.record_success();
        breaker.record_success();
        breaker.record_failure();

        // 1 of 3 in the window; counting the expired failure would be 2 of 4.
        assert_eq!(breaker.state(), CircuitState::Closed);
        let snapshot = breaker.snapshot();
        assert_eq!(snapshot.window_calls, 3);
        assert_eq!(snapshot.window_failures, 1);
        assert_eq!(snapshot.failures, 2);
    }
}
