//! Circuit-breaker protected wait-time acquisition.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use serde::Serialize;

use crate::acquisition::{elapsed_ms, FetchResult, SourceFetcher};
use crate::circuit_breaker::{CircuitBreaker, CircuitBreakerConfig, CircuitSnapshot};
use crate::envelope::{Envelope, EnvelopeMeta};
use crate::fallback;
use crate::freshness::DataState;
use crate::normalize::Normalized;
use crate::registry::SourceEndpoint;
use crate::retry::RetryConfig;
use crate::{AttractionStatus, DataDomain, ParkId};

/// Breaker counters plus how often static data was served.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct WaitTimesHealth {
    pub breaker: CircuitSnapshot,
    pub fallbacks_served: u64,
}

/// Wraps wait-time acquisition in the process-wide circuit breaker.
///
/// The wrapped operation walks the wait-time sources in priority order with
/// its own retry budget. When the breaker rejects the call or every source
/// fails, static data for the park is served instead; callers never see an
/// upstream error.
#[derive(Debug)]
pub struct WaitTimesController {
    breaker: CircuitBreaker,
    retry: RetryConfig,
    fallbacks_served: AtomicU64,
}

impl WaitTimesController {
    pub fn new(config: CircuitBreakerConfig, retry: RetryConfig) -> Self {
        Self {
            breaker: CircuitBreaker::new(config),
            retry,
            fallbacks_served: AtomicU64::new(0),
        }
    }

    pub fn breaker(&self) -> &CircuitBreaker {
        &self.breaker
    }

    pub fn health(&self) -> WaitTimesHealth {
        WaitTimesHealth {
            breaker: self.breaker.snapshot(),
            fallbacks_served: self.fallbacks_served.load(Ordering::Relaxed),
        }
    }

    pub async fn acquire(
        &self,
        fetcher: &SourceFetcher,
        endpoints: &[SourceEndpoint],
        park: ParkId,
        state: &DataState,
    ) -> Envelope<Vec<AttractionStatus>> {
        let started = Instant::now();

        if !self.breaker.allow_request() {
            tracing::info!(park = %park, "wait-time circuit open, serving fallback");
            return self.serve_fallback(
                park,
                Vec::new(),
                vec![String::from("wait-time circuit open; upstreams not contacted")],
                started,
            );
        }

        match fetch_live(fetcher, endpoints, &self.retry, state).await {
            Ok(success) => {
                self.breaker.record_success();
                success.into_envelope(started)
            }
            Err(failure) => {
                self.breaker.record_failure();
                tracing::info!(park = %park, "all wait-time sources failed, serving fallback");
                let warnings = failure.warnings();
                self.serve_fallback(park, failure.source_chain, warnings, started)
            }
        }
    }

    fn serve_fallback(
        &self,
        park: ParkId,
        source_chain: Vec<String>,
        warnings: Vec<String>,
        started: Instant,
    ) -> Envelope<Vec<AttractionStatus>> {
        self.fallbacks_served.fetch_add(1, Ordering::Relaxed);
        let meta = EnvelopeMeta::fallback(source_chain)
            .with_warnings(warnings)
            .with_latency_ms(elapsed_ms(started));
        Envelope::new(meta, fallback::wait_times(park))
    }
}

/// The breaker-wrapped operation. Freshness counters move only here.
async fn fetch_live(
    fetcher: &SourceFetcher,
    endpoints: &[SourceEndpoint],
    retry: &RetryConfig,
    state: &DataState,
) -> FetchResult<Vec<AttractionStatus>> {
    let result = fetcher
        .first_success(endpoints, retry, Normalized::into_attractions)
        .await;

    match &result {
        Ok(_) => state.record_success(DataDomain::WaitTimes),
        Err(_) => state.record_failure(DataDomain::WaitTimes),
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http_client::{HttpClient, HttpError, HttpFuture, HttpRequest, HttpResponse};
    use crate::normalize::FormatTag;
    use std::sync::atomic::AtomicUsize;
    use std::sync::Arc;
    use std::time::Duration;

    struct CountingHttpClient {
        response: Option<HttpResponse>,
        calls: AtomicUsize,
    }

    impl CountingHttpClient {
        fn failing() -> Self {
            Self {
                response: None,
                calls: AtomicUsize::new(0),
            }
        }

        fn serving(body: &str) -> Self {
            Self {
                response: Some(HttpResponse::ok(body)),
                calls: AtomicUsize::new(0),
            }
        }
    }

    impl HttpClient for CountingHttpClient {
        fn execute<'a>(&'a self, _request: HttpRequest) -> HttpFuture<'a> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let response = self
                .response
                .clone()
                .ok_or_else(|| HttpError::new("connection refused"));
            Box::pin(async move { response })
        }
    }

    fn endpoints() -> Vec<SourceEndpoint> {
        vec![SourceEndpoint {
            name: "queue_times",
            url: String::from("https://queue.test/parks/6/queue_times.json"),
            timeout_ms: 1_000,
            format: FormatTag::QueueTimesLands,
            priority: 1,
        }]
    }

    fn controller(volume_threshold: u32) -> WaitTimesController {
        WaitTimesController::new(
            CircuitBreakerConfig {
                error_threshold_percentage: 50,
                rolling_window: Duration::from_secs(10),
                volume_threshold,
                reset_timeout: Duration::from_secs(30),
            },
            RetryConfig::fixed(Duration::ZERO, 0),
        )
    }

    #[tokio::test]
    async fn failures_resolve_to_fallback_and_count_errors() {
        let client = Arc::new(CountingHttpClient::failing());
        let fetcher = SourceFetcher::new(client.clone());
        let state = DataState::new();
        let controller = controller(4);

        let envelope = controller
            .acquire(&fetcher, &endpoints(), ParkId::MagicKingdom, &state)
            .await;

        assert!(envelope.is_fallback());
        assert_eq!(envelope.meta.freshness_score, Some(0));
        assert!(!envelope.data.is_empty());
        assert_eq!(state.get(DataDomain::WaitTimes).consecutive_errors, 1);
        assert_eq!(controller.health().fallbacks_served, 1);
    }

    #[tokio::test]
    async fn open_circuit_skips_the_network_and_data_state() {
        let client = Arc::new(CountingHttpClient::failing());
        let fetcher = SourceFetcher::new(client.clone());
        let state = DataState::new();
        let controller = controller(1);

        controller
            .acquire(&fetcher, &endpoints(), ParkId::Epcot, &state)
            .await;
        assert_eq!(client.calls.load(Ordering::SeqCst), 1);

        let envelope = controller
            .acquire(&fetcher, &endpoints(), ParkId::Epcot, &state)
            .await;

        assert!(envelope.is_fallback());
        assert_eq!(client.calls.load(Ordering::SeqCst), 1);
        assert_eq!(state.get(DataDomain::WaitTimes).consecutive_errors, 1);
        assert_eq!(controller.health().breaker.rejections, 1);
    }

    #[tokio::test]
    async fn live_success_scores_full_freshness() {
        let client = Arc::new(CountingHttpClient::serving(
            r#"{"lands":[{"name":"Fantasyland","rides":[{"id":1,"name":"Dumbo","wait_time":15,"is_open":true}]}]}"#,
        ));
        let fetcher = SourceFetcher::new(client);
        let state = DataState::new();
        let controller = controller(4);

        let envelope = controller
            .acquire(&fetcher, &endpoints(), ParkId::MagicKingdom, &state)
            .await;

        assert_eq!(envelope.meta.source, "queue_times");
        assert_eq!(envelope.meta.freshness_score, Some(100));
        assert_eq!(envelope.data[0].wait_minutes, 15);
        assert!(state.get(DataDomain::WaitTimes).last_success.is_some());
    }
}
