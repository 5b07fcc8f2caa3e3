//! The acquisition facade shared by every consumer.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::Serialize;

use crate::acquisition::{FetchResult, SourceFetcher};
use crate::aggregator::{aggregate, fan_out, AcquisitionPath};
use crate::cache::{CacheStats, DomainCaches, DomainPayload};
use crate::config::CoreConfig;
use crate::envelope::{Envelope, EnvelopeMeta};
use crate::error::CoreError;
use crate::fallback;
use crate::freshness::{DataState, DomainState};
use crate::http_client::{HttpClient, ReqwestHttpClient};
use crate::normalize::Normalized;
use crate::registry::SourceRegistry;
use crate::resilience::{WaitTimesController, WaitTimesHealth};
use crate::retry::RetryConfig;
use crate::{
    AttractionStatus, CharacterMeet, DataDomain, EntertainmentBundle, ParkHoursEntry, ParkId,
    ScheduleItem, ValidationError,
};

/// Health introspection: breaker, freshness counters and cache statistics.
#[derive(Debug, Clone, Serialize)]
pub struct HealthReport {
    pub wait_times: WaitTimesHealth,
    pub data_state: BTreeMap<DataDomain, DomainState>,
    pub caches: BTreeMap<DataDomain, CacheStats>,
}

/// Process-wide acquisition context.
///
/// Construct once and share by reference (or `Arc`). Every `acquire_*`
/// method validates the park first; that is the only error it returns.
/// Upstream trouble always resolves to fallback data.
pub struct ParkDataService {
    config: CoreConfig,
    registry: SourceRegistry,
    fetcher: SourceFetcher,
    caches: DomainCaches,
    data_state: Arc<DataState>,
    wait_times: WaitTimesController,
}

impl std::fmt::Debug for ParkDataService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ParkDataService")
            .field("config", &self.config)
            .field("wait_times", &self.wait_times)
            .finish_non_exhaustive()
    }
}

impl ParkDataService {
    pub fn new(config: CoreConfig, client: Arc<dyn HttpClient>) -> Self {
        let wait_times = WaitTimesController::new(
            config.circuit_breaker,
            config.retry.with_max_retries(config.wait_times_retries),
        );
        Self {
            registry: SourceRegistry::new(config.upstreams.clone()),
            fetcher: SourceFetcher::new(client),
            caches: DomainCaches::new(config.cache_ttls),
            data_state: Arc::new(DataState::new()),
            wait_times,
            config,
        }
    }

    /// Production service over reqwest, configured from `PARKPULSE_*`.
    pub fn from_env() -> Result<Self, CoreError> {
        let config = CoreConfig::from_env()?;
        Ok(Self::new(config, Arc::new(ReqwestHttpClient::new())))
    }

    pub fn config(&self) -> &CoreConfig {
        &self.config
    }

    pub fn registry(&self) -> &SourceRegistry {
        &self.registry
    }

    pub fn data_state(&self) -> &DataState {
        &self.data_state
    }

    pub fn caches(&self) -> &DomainCaches {
        &self.caches
    }

    /// Retry budget applied to each source of `domain`.
    pub fn retry_for(&self, domain: DataDomain) -> RetryConfig {
        match domain {
            DataDomain::WaitTimes => self
                .config
                .retry
                .with_max_retries(self.config.wait_times_retries),
            _ => self.config.retry.clone(),
        }
    }

    /// Upper bound on one uncached acquisition of `domain`.
    pub fn worst_case_latency(&self, domain: DataDomain) -> Duration {
        let retry = self.retry_for(domain);
        self.registry
            .worst_case_latency(domain, retry.max_retries, retry.backoff)
    }

    /// Live wait times behind the circuit breaker, or static data.
    pub async fn acquire_wait_times(
        &self,
        park: &str,
    ) -> Result<Envelope<Vec<AttractionStatus>>, ValidationError> {
        let park = park.parse::<ParkId>()?;
        if let Some(hit) = self.cached::<Vec<AttractionStatus>>(park).await {
            return Ok(hit);
        }

        let endpoints = self.registry.endpoints_for(DataDomain::WaitTimes, park);
        let envelope = self
            .wait_times
            .acquire(&self.fetcher, &endpoints, park, &self.data_state)
            .await;

        self.put_in_cache(park, &envelope).await;
        Ok(envelope)
    }

    /// Park hours from the first usable source, or seven days of usual hours.
    pub async fn acquire_park_hours(
        &self,
        park: &str,
    ) -> Result<Envelope<Vec<ParkHoursEntry>>, ValidationError> {
        let park = park.parse::<ParkId>()?;
        if let Some(hit) = self.cached::<Vec<ParkHoursEntry>>(park).await {
            return Ok(hit);
        }

        let started = Instant::now();
        let envelope = match self.fetch_park_hours(park).await {
            Ok(success) => success.into_envelope(started),
            Err(failure) => {
                tracing::info!(park = %park, "no park hours source usable, serving fallback");
                let warnings = failure.warnings();
                let meta = EnvelopeMeta::fallback(failure.source_chain)
                    .with_warnings(warnings)
                    .with_latency_ms(crate::acquisition::elapsed_ms(started));
                Envelope::with_errors(meta, fallback::park_hours(park), failure.errors)
            }
        };

        self.put_in_cache(park, &envelope).await;
        Ok(envelope)
    }

    /// Entertainment schedule merged from every live path plus the curated
    /// baseline, with a character-meet-only view.
    pub async fn acquire_entertainment(
        &self,
        park: &str,
    ) -> Result<Envelope<EntertainmentBundle>, ValidationError> {
        let park = park.parse::<ParkId>()?;
        if let Some(hit) = self.cached::<EntertainmentBundle>(park).await {
            return Ok(hit);
        }

        let started = Instant::now();
        let paths = vec![
            AcquisitionPath::new("entertainment", self.fetch_entertainment(park)),
            AcquisitionPath::new("characters", async move {
                self.fetch_characters(park)
                    .await
                    .map(|success| success.map(into_schedule_items))
            }),
        ];
        let outcomes = fan_out(paths).await;
        let merged = aggregate(
            outcomes,
            fallback::entertainment_baseline(park),
            || fallback::entertainment(park),
            started,
        );

        let envelope = Envelope::with_errors(
            merged.meta,
            EntertainmentBundle::new(merged.data),
            merged.errors,
        );
        self.put_in_cache(park, &envelope).await;
        Ok(envelope)
    }

    /// Character meets from the schedule page merged with the curated
    /// baseline, which wins on identifier collisions.
    pub async fn acquire_characters(
        &self,
        park: &str,
    ) -> Result<Envelope<Vec<CharacterMeet>>, ValidationError> {
        let park = park.parse::<ParkId>()?;
        if let Some(hit) = self.cached::<Vec<CharacterMeet>>(park).await {
            return Ok(hit);
        }

        let started = Instant::now();
        let outcomes = fan_out(vec![AcquisitionPath::new(
            "characters",
            self.fetch_characters(park),
        )])
        .await;
        let envelope = aggregate(
            outcomes,
            fallback::character_meets(park),
            || fallback::character_meets(park),
            started,
        );

        self.put_in_cache(park, &envelope).await;
        Ok(envelope)
    }

    /// Cached envelope for `park`, if any. Absence is never an error.
    pub async fn get_from_cache<T: DomainPayload>(
        &self,
        park: &str,
    ) -> Result<Option<Envelope<T>>, ValidationError> {
        let park = park.parse::<ParkId>()?;
        Ok(self.caches.get::<T>(park).await)
    }

    /// Writes `envelope` back unless it carries no live data.
    ///
    /// Returns whether the envelope was stored.
    pub async fn put_in_cache<T: DomainPayload>(&self, park: ParkId, envelope: &Envelope<T>) -> bool {
        if !envelope.is_cacheable() {
            tracing::debug!(
                domain = %T::DOMAIN,
                park = %park,
                "not caching result without live data"
            );
            return false;
        }
        self.caches.set(park, envelope.clone()).await;
        true
    }

    pub async fn flush_cache(&self, domain: DataDomain) -> usize {
        self.caches.flush(domain).await
    }

    pub async fn health(&self) -> HealthReport {
        HealthReport {
            wait_times: self.wait_times.health(),
            data_state: self.data_state.snapshot(),
            caches: self.caches.stats_all().await,
        }
    }

    async fn cached<T: DomainPayload>(&self, park: ParkId) -> Option<Envelope<T>> {
        let started = Instant::now();
        self.caches
            .get::<T>(park)
            .await
            .map(|envelope| envelope.as_cache_hit(crate::acquisition::elapsed_ms(started)))
    }

    async fn fetch_park_hours(&self, park: ParkId) -> FetchResult<Vec<ParkHoursEntry>> {
        let endpoints = self.registry.endpoints_for(DataDomain::ParkHours, park);
        let result = self
            .fetcher
            .first_success(&endpoints, &self.config.retry, Normalized::into_hours)
            .await;
        self.record(DataDomain::ParkHours, &result);
        result
    }

    async fn fetch_entertainment(&self, park: ParkId) -> FetchResult<Vec<ScheduleItem>> {
        let endpoints = self.registry.endpoints_for(DataDomain::Entertainment, park);
        let result = self
            .fetcher
            .first_success(&endpoints, &self.config.retry, Normalized::into_schedule)
            .await;
        self.record(DataDomain::Entertainment, &result);
        result
    }

    async fn fetch_characters(&self, park: ParkId) -> FetchResult<Vec<CharacterMeet>> {
        let endpoints = self.registry.endpoints_for(DataDomain::Characters, park);
        let result = self
            .fetcher
            .first_success(&endpoints, &self.config.retry, Normalized::into_character_meets)
            .await;
        self.record(DataDomain::Characters, &result);
        result
    }

    /// A reachable page with an unrecognized layout is not an upstream error.
    fn record<T>(&self, domain: DataDomain, result: &FetchResult<T>) {
        match result {
            Ok(_) => self.data_state.record_success(domain),
            Err(failure) if failure.only_empty() => {
                tracing::debug!(domain = %domain, "sources reachable but empty");
            }
            Err(_) => self.data_state.record_failure(domain),
        }
    }
}

fn into_schedule_items(meets: Vec<CharacterMeet>) -> Vec<ScheduleItem> {
    meets.into_iter().map(ScheduleItem::from).collect()
}
