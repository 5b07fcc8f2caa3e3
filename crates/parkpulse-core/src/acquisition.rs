//! Ordered fallback across a domain's sources.

use std::sync::Arc;
use std::time::Instant;

use crate::envelope::{Envelope, EnvelopeError, EnvelopeMeta};
use crate::http_client::{HttpClient, HttpRequest};
use crate::normalize::{normalize, NormalizeContext, Normalized};
use crate::registry::SourceEndpoint;
use crate::retry::{fetch_with_retry, RetryConfig};
use crate::source::SourceError;
use crate::UtcDateTime;

/// Freshness of a live result from the source at `position` (0-based).
///
/// The first source scores 100; every step down costs 10, floored at 50.
pub fn freshness_for_position(position: usize) -> u8 {
    let penalty = position.saturating_mul(10).min(50);
    100 - penalty as u8
}

/// First source that produced records.
#[derive(Debug, Clone)]
pub struct FetchSuccess<T> {
    pub records: T,
    pub source: &'static str,
    /// Index of `source` in the ordered endpoint list.
    pub position: usize,
    pub source_chain: Vec<String>,
    /// Sources that failed before `source` succeeded.
    pub errors: Vec<EnvelopeError>,
    pub fetched_at: UtcDateTime,
}

impl<T> FetchSuccess<T> {
    pub fn freshness_score(&self) -> u8 {
        freshness_for_position(self.position)
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> FetchSuccess<U> {
        FetchSuccess {
            records: f(self.records),
            source: self.source,
            position: self.position,
            source_chain: self.source_chain,
            errors: self.errors,
            fetched_at: self.fetched_at,
        }
    }

    pub fn into_envelope(self, started: Instant) -> Envelope<T> {
        let mut meta = EnvelopeMeta::new(self.source, self.source_chain, freshness_for_position(self.position))
            .with_latency_ms(elapsed_ms(started))
            .with_warnings(self.errors.iter().map(EnvelopeError::warning).collect());
        meta.last_updated = self.fetched_at;
        if !self.errors.is_empty() {
            meta.push_warning(format!(
                "source fallback succeeded with '{}' after {} failed attempt(s)",
                self.source,
                self.errors.len()
            ));
        }
        Envelope::with_errors(meta, self.records, self.errors)
    }
}

/// Every source was tried and none produced records.
#[derive(Debug, Clone, Default)]
pub struct FetchFailure {
    pub source_chain: Vec<String>,
    pub errors: Vec<EnvelopeError>,
    /// Whether any source failed in a way that means the upstream is unhealthy.
    pub upstream_failed: bool,
}

impl FetchFailure {
    /// Every source answered but none had recognizable records.
    pub fn only_empty(&self) -> bool {
        !self.upstream_failed && !self.errors.is_empty()
    }

    pub fn warnings(&self) -> Vec<String> {
        self.errors.iter().map(EnvelopeError::warning).collect()
    }
}

pub type FetchResult<T> = Result<FetchSuccess<T>, FetchFailure>;

/// Issues requests against ordered endpoints and normalizes the first usable body.
#[derive(Clone)]
pub struct SourceFetcher {
    client: Arc<dyn HttpClient>,
}

impl std::fmt::Debug for SourceFetcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SourceFetcher").finish_non_exhaustive()
    }
}

impl SourceFetcher {
    pub fn new(client: Arc<dyn HttpClient>) -> Self {
        Self { client }
    }

    /// Tries `endpoints` in order; the first one whose body normalizes to a
    /// non-empty record list wins.
    ///
    /// `extract` picks the expected variant out of the normalized output; a
    /// mismatch is an internal error for that source.
    pub async fn first_success<R, F>(
        &self,
        endpoints: &[SourceEndpoint],
        retry: &RetryConfig,
        extract: F,
    ) -> FetchResult<Vec<R>>
    where
        F: Fn(Normalized) -> Option<Vec<R>>,
    {
        let mut source_chain = Vec::with_capacity(endpoints.len());
        let mut errors = Vec::new();
        let mut upstream_failed = false;

        for (position, endpoint) in endpoints.iter().enumerate() {
            source_chain.push(endpoint.name.to_owned());

            match self.fetch_one(endpoint, retry, &extract).await {
                Ok((records, fetched_at)) => {
                    return Ok(FetchSuccess {
                        records,
                        source: endpoint.name,
                        position,
                        source_chain,
                        errors,
                        fetched_at,
                    });
                }
                Err(error) => {
                    tracing::warn!(
                        source = endpoint.name,
                        url = %endpoint.url,
                        code = error.code(),
                        error = error.message(),
                        "source failed, trying next"
                    );
                    upstream_failed |= error.counts_as_failure();
                    errors.push(EnvelopeError::from_source(endpoint.name, &error));
                }
            }
        }

        if errors.is_empty() {
            errors.push(EnvelopeError::new(
                "source.no_candidate",
                "no source candidates registered",
            ));
            upstream_failed = true;
        }

        Err(FetchFailure {
            source_chain,
            errors,
            upstream_failed,
        })
    }

    async fn fetch_one<R, F>(
        &self,
        endpoint: &SourceEndpoint,
        retry: &RetryConfig,
        extract: &F,
    ) -> Result<(Vec<R>, UtcDateTime), SourceError>
    where
        F: Fn(Normalized) -> Option<Vec<R>>,
    {
        let request = HttpRequest::get(endpoint.url.clone()).with_timeout_ms(endpoint.timeout_ms);
        // Parsing happens per attempt so a truncated body spends a retry.
        fetch_with_retry(
            self.client.as_ref(),
            &request,
            retry.max_retries,
            retry.backoff,
            |body| {
                let fetched_at = UtcDateTime::now();
                let normalized = normalize(
                    endpoint.format,
                    &body,
                    NormalizeContext::new(endpoint.name, fetched_at),
                )?;
                let records = extract(normalized).ok_or_else(|| {
                    SourceError::internal(format!(
                        "format '{}' does not produce the requested records",
                        endpoint.format
                    ))
                })?;

                if records.is_empty() {
                    return Err(SourceError::empty(format!(
                        "{} body contained no recognizable records",
                        endpoint.format
                    )));
                }

                Ok((records, fetched_at))
            },
        )
        .await
    }
}

pub(crate) fn elapsed_ms(started: Instant) -> u64 {
    started.elapsed().as_millis().min(u128::from(u64::MAX)) as u64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http_client::{HttpError, HttpFuture, HttpResponse};
    use crate::normalize::FormatTag;
    use crate::AttractionStatus;
    use std::collections::HashMap;
    use std::sync::Mutex;
    use std::time::Duration;

    #[derive(Default)]
    struct RecordingHttpClient {
        responses: HashMap<String, HttpResponse>,
        requests: Mutex<Vec<HttpRequest>>,
    }

    impl RecordingHttpClient {
        fn with(mut self, url: &str, response: HttpResponse) -> Self {
            self.responses.insert(url.to_owned(), response);
            self
        }

        fn urls(&self) -> Vec<String> {
            self.requests
                .lock()
                .expect("lock should not be poisoned")
                .iter()
                .map(|request| request.url.clone())
                .collect()
        }
    }

    impl HttpClient for RecordingHttpClient {
        fn execute<'a>(&'a self, request: HttpRequest) -> HttpFuture<'a> {
            let response = self
                .responses
                .get(&request.url)
                .cloned()
                .ok_or_else(|| HttpError::new("connection refused"));
            self.requests
                .lock()
                .expect("lock should not be poisoned")
                .push(request);
            Box::pin(async move { response })
        }
    }

    fn endpoint(name: &'static str, url: &str, format: FormatTag) -> SourceEndpoint {
        SourceEndpoint {
            name,
            url: url.to_owned(),
            timeout_ms: 1_000,
            format,
            priority: 1,
        }
    }

    fn no_retry() -> RetryConfig {
        RetryConfig::fixed(Duration::ZERO, 0)
    }

    #[test]
    fn freshness_steps_down_by_ten() {
        assert_eq!(freshness_for_position(0), 100);
        assert_eq!(freshness_for_position(1), 90);
        assert_eq!(freshness_for_position(9), 50);
    }

    #[tokio::test]
    async fn falls_through_to_second_source() {
        let client = Arc::new(
            RecordingHttpClient::default()
                .with("https://a.test/live", HttpResponse::ok("not json"))
                .with(
                    "https://b.test/live",
                    HttpResponse::ok(r#"{"liveData":[{"id":"x","name":"Dumbo","status":"OPERATING","waitTime":10}]}"#),
                ),
        );
        let fetcher = SourceFetcher::new(client.clone());
        let endpoints = [
            endpoint("primary", "https://a.test/live", FormatTag::QueueTimesLands),
            endpoint("secondary", "https://b.test/live", FormatTag::ThemeParksLive),
        ];

        let success = fetcher
            .first_success(&endpoints, &no_retry(), Normalized::into_attractions)
            .await
            .expect("second source has records");

        assert_eq!(success.source, "secondary");
        assert_eq!(success.position, 1);
        assert_eq!(success.freshness_score(), 90);
        assert_eq!(success.source_chain, vec!["primary", "secondary"]);
        assert_eq!(success.errors[0].code, "source.malformed");
        assert_eq!(success.records[0].name, "Dumbo");
        assert_eq!(client.urls().len(), 2);

        let envelope = success.into_envelope(Instant::now());
        assert_eq!(envelope.meta.source, "secondary");
        assert_eq!(envelope.meta.warnings.len(), 2);
    }

    #[tokio::test]
    async fn empty_bodies_are_not_upstream_failures() {
        let client = Arc::new(
            RecordingHttpClient::default().with("https://a.test/live", HttpResponse::ok(r#"{"lands":[]}"#)),
        );
        let fetcher = SourceFetcher::new(client);

        let failure = fetcher
            .first_success(
                &[endpoint("primary", "https://a.test/live", FormatTag::QueueTimesLands)],
                &no_retry(),
                Normalized::into_attractions,
            )
            .await
            .expect_err("no records");

        assert!(failure.only_empty());
        assert_eq!(failure.errors[0].code, "source.empty");
    }

    #[tokio::test]
    async fn mismatched_format_is_an_internal_error() {
        let client = Arc::new(
            RecordingHttpClient::default()
                .with("https://a.test/hours", HttpResponse::ok(r#"{"parkHours":[{"date":"2024-06-01","startTime":"9:00 AM","endTime":"9:00 PM"}]}"#)),
        );
        let fetcher = SourceFetcher::new(client);

        let failure = fetcher
            .first_success::<AttractionStatus, _>(
                &[endpoint("calendar", "https://a.test/hours", FormatTag::DisneyCalendar)],
                &no_retry(),
                Normalized::into_attractions,
            )
            .await
            .expect_err("hours are not attractions");

        assert!(failure.upstream_failed);
        assert_eq!(failure.errors[0].code, "source.internal");
    }

    #[tokio::test]
    async fn truncated_body_is_retried_within_the_source_budget() {
        struct SequencedHttpClient {
            bodies: Mutex<Vec<&'static str>>,
            calls: Mutex<u32>,
        }

        impl HttpClient for SequencedHttpClient {
            fn execute<'a>(&'a self, _request: HttpRequest) -> HttpFuture<'a> {
                *self.calls.lock().expect("lock should not be poisoned") += 1;
                let mut bodies = self.bodies.lock().expect("lock should not be poisoned");
                let response = if bodies.is_empty() {
                    Err(HttpError::new("script exhausted"))
                } else {
                    Ok(HttpResponse::ok(bodies.remove(0)))
                };
                Box::pin(async move { response })
            }
        }

        // Given a source that first sends a cut-off body, then a complete one
        let client = Arc::new(SequencedHttpClient {
            bodies: Mutex::new(vec![
                r#"{"lands": [trunc"#,
                r#"{"lands":[{"name":"Tomorrowland","rides":[{"id":1,"name":"Space Mountain","is_open":true,"wait_time":45}]}]}"#,
            ]),
            calls: Mutex::new(0),
        });
        let fetcher = SourceFetcher::new(client.clone());

        // When it is fetched with one retry
        let success = fetcher
            .first_success(
                &[endpoint("queue_times", "https://a.test/queue", FormatTag::QueueTimesLands)],
                &RetryConfig::fixed(Duration::ZERO, 1),
                Normalized::into_attractions,
            )
            .await
            .expect("retry receives the complete body");

        // Then the retry is spent on the same source and its records win
        assert_eq!(*client.calls.lock().expect("lock should not be poisoned"), 2);
        assert_eq!(success.source, "queue_times");
        assert_eq!(success.position, 0);
        assert!(success.errors.is_empty());
        assert_eq!(success.records[0].wait_minutes, 45);
    }

    #[tokio::test]
    async fn unrecognized_records_are_not_retried() {
        let client = Arc::new(
            RecordingHttpClient::default().with("https://a.test/live", HttpResponse::ok(r#"{"lands":[]}"#)),
        );
        let fetcher = SourceFetcher::new(client.clone());

        let failure = fetcher
            .first_success(
                &[endpoint("primary", "https://a.test/live", FormatTag::QueueTimesLands)],
                &RetryConfig::fixed(Duration::ZERO, 2),
                Normalized::into_attractions,
            )
            .await
            .expect_err("no records");

        assert_eq!(failure.errors[0].code, "source.empty");
        assert_eq!(client.urls().len(), 1);
    }
}
