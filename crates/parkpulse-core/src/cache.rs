//! Time-boxed in-memory caches, one per data domain.

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::Serialize;

use crate::{
    AttractionStatus, CharacterMeet, DataDomain, EntertainmentBundle, Envelope, ParkHoursEntry,
    ParkId,
};

#[derive(Debug, Clone)]
struct CacheEntry<V> {
    value: V,
    expires_at: Instant,
}

#[derive(Debug)]
struct CacheInner<V> {
    map: HashMap<String, CacheEntry<V>>,
    ttl: Duration,
}

impl<V: Clone> CacheInner<V> {
    fn new(ttl: Duration) -> Self {
        Self {
            map: HashMap::new(),
            ttl,
        }
    }

    fn get(&self, key: &str) -> Option<V> {
        self.map.get(key).and_then(|entry| {
            if Instant::now() <= entry.expires_at {
                Some(entry.value.clone())
            } else {
                None
            }
        })
    }

    fn put(&mut self, key: String, value: V) {
        let expires_at = Instant::now() + self.ttl;
        self.map.insert(key, CacheEntry { value, expires_at });
    }

    fn clear_expired(&mut self) -> usize {
        let now = Instant::now();
        let before = self.map.len();
        self.map.retain(|_, entry| entry.expires_at > now);
        before - self.map.len()
    }

    fn live_keys(&self) -> usize {
        let now = Instant::now();
        self.map
            .values()
            .filter(|entry| entry.expires_at >= now)
            .count()
    }
}

/// Hit/miss counters and live key count of one cache.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub keys: usize,
}

/// Thread-safe time-boxed cache. Absence is a miss, never an error.
#[derive(Debug, Clone)]
pub struct CacheStore<V> {
    inner: Arc<tokio::sync::RwLock<CacheInner<V>>>,
    hits: Arc<AtomicU64>,
    misses: Arc<AtomicU64>,
}

impl<V: Clone> CacheStore<V> {
    pub fn new(ttl: Duration) -> Self {
        Self {
            inner: Arc::new(tokio::sync::RwLock::new(CacheInner::new(ttl))),
            hits: Arc::new(AtomicU64::new(0)),
            misses: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Disabled cache: every `set` is dropped.
    pub fn disabled() -> Self {
        Self::new(Duration::ZERO)
    }

    pub async fn ttl(&self) -> Duration {
        self.inner.read().await.ttl
    }

    /// Value for `key` if present and not expired.
    pub async fn get(&self, key: &str) -> Option<V> {
        let value = self.inner.read().await.get(key);
        let counter = if value.is_some() {
            &self.hits
        } else {
            &self.misses
        };
        counter.fetch_add(1, Ordering::Relaxed);
        value
    }

    pub async fn set(&self, key: impl Into<String>, value: V) {
        let mut store = self.inner.write().await;

        if store.ttl == Duration::ZERO {
            return;
        }

        store.put(key.into(), value);
    }

    /// Removes expired entries and returns how many were dropped.
    pub async fn clear_expired(&self) -> usize {
        self.inner.write().await.clear_expired()
    }

    /// Removes every entry and returns how many there were.
    pub async fn flush(&self) -> usize {
        let mut store = self.inner.write().await;
        let removed = store.map.len();
        store.map.clear();
        removed
    }

    /// Number of entries, including expired ones not yet cleared.
    pub async fn len(&self) -> usize {
        self.inner.read().await.map.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    pub async fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            keys: self.inner.read().await.live_keys(),
        }
    }
}

/// Time-to-live per data domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheTtls {
    pub wait_times: Duration,
    pub park_hours: Duration,
    pub entertainment: Duration,
    pub characters: Duration,
}

impl Default for CacheTtls {
    fn default() -> Self {
        Self {
            wait_times: Duration::from_secs(5 * 60),
            park_hours: Duration::from_secs(60 * 60),
            entertainment: Duration::from_secs(30 * 60),
            characters: Duration::from_secs(30 * 60),
        }
    }
}

impl CacheTtls {
    pub fn get(&self, domain: DataDomain) -> Duration {
        match domain {
            DataDomain::WaitTimes => self.wait_times,
            DataDomain::ParkHours => self.park_hours,
            DataDomain::Entertainment => self.entertainment,
            DataDomain::Characters => self.characters,
        }
    }
}

/// Cache key for one domain and park: `{domain}_{park}`.
pub fn cache_key(domain: DataDomain, park: ParkId) -> String {
    format!("{}_{}", domain.as_str(), park.as_str())
}

/// Canonical result type stored in a domain cache.
pub trait DomainPayload: Clone + Send + Sync + 'static {
    const DOMAIN: DataDomain;

    fn store(caches: &DomainCaches) -> &CacheStore<Envelope<Self>>;
}

impl DomainPayload for Vec<AttractionStatus> {
    const DOMAIN: DataDomain = DataDomain::WaitTimes;

    fn store(caches: &DomainCaches) -> &CacheStore<Envelope<Self>> {
        &caches.wait_times
    }
}

impl DomainPayload for Vec<ParkHoursEntry> {
    const DOMAIN: DataDomain = DataDomain::ParkHours;

    fn store(caches: &DomainCaches) -> &CacheStore<Envelope<Self>> {
        &caches.park_hours
    }
}

impl DomainPayload for EntertainmentBundle {
    const DOMAIN: DataDomain = DataDomain::Entertainment;

    fn store(caches: &DomainCaches) -> &CacheStore<Envelope<Self>> {
        &caches.entertainment
    }
}

impl DomainPayload for Vec<CharacterMeet> {
    const DOMAIN: DataDomain = DataDomain::Characters;

    fn store(caches: &DomainCaches) -> &CacheStore<Envelope<Self>> {
        &caches.characters
    }
}

/// The four independent domain caches.
#[derive(Debug, Clone)]
pub struct DomainCaches {
    wait_times: CacheStore<Envelope<Vec<AttractionStatus>>>,
    park_hours: CacheStore<Envelope<Vec<ParkHoursEntry>>>,
    entertainment: CacheStore<Envelope<EntertainmentBundle>>,
    characters: CacheStore<Envelope<Vec<CharacterMeet>>>,
}

impl Default for DomainCaches {
    fn default() -> Self {
        Self::new(CacheTtls::default())
    }
}

impl DomainCaches {
    pub fn new(ttls: CacheTtls) -> Self {
        Self {
            wait_times: CacheStore::new(ttls.wait_times),
            park_hours: CacheStore::new(ttls.park_hours),
            entertainment: CacheStore::new(ttls.entertainment),
            characters: CacheStore::new(ttls.characters),
        }
    }

    pub async fn get<T: DomainPayload>(&self, park: ParkId) -> Option<Envelope<T>> {
        let key = cache_key(T::DOMAIN, park);
        let value = T::store(self).get(&key).await;
        tracing::debug!(key = %key, hit = value.is_some(), "cache lookup");
        value
    }

    pub async fn set<T: DomainPayload>(&self, park: ParkId, envelope: Envelope<T>) {
        T::store(self).set(cache_key(T::DOMAIN, park), envelope).await;
    }

    pub async fn flush(&self, domain: DataDomain) -> usize {
        match domain {
            DataDomain::WaitTimes => self.wait_times.flush().await,
            DataDomain::ParkHours => self.park_hours.flush().await,
            DataDomain::Entertainment => self.entertainment.flush().await,
            DataDomain::Characters => self.characters.flush().await,
        }
    }

    pub async fn flush_all(&self) -> BTreeMap<DataDomain, usize> {
        let mut removed = BTreeMap::new();
        for domain in DataDomain::ALL {
            removed.insert(domain, self.flush(domain).await);
        }
        removed
    }

    pub async fn clear_expired(&self) -> usize {
        self.wait_times.clear_expired().await
            + self.park_hours.clear_expired().await
            + self.entertainment.clear_expired().await
            + self.characters.clear_expired().await
    }

    pub async fn stats(&self, domain: DataDomain) -> CacheStats {
        match domain {
            DataDomain::WaitTimes => self.wait_times.stats().await,
            DataDomain::ParkHours => self.park_hours.stats().await,
            DataDomain::Entertainment => self.entertainment.stats().await,
            DataDomain::Characters => self.characters.stats().await,
        }
    }

    pub async fn stats_all(&self) -> BTreeMap<DataDomain, CacheStats> {
        let mut stats = BTreeMap::new();
        for domain in DataDomain::ALL {
            stats.insert(domain, self.stats(domain).await);
        }
        stats
    }
}
