//! # Parkpulse Core
//!
//! Data acquisition core for the parkpulse theme-park proxy.
//!
//! ## Overview
//!
//! For each of four independent data domains (wait times, park hours,
//! entertainment, character meets) this crate:
//!
//! - **Fetches** from an ordered list of heterogeneous upstream sources
//! - **Normalizes** JSON and HTML bodies into canonical records
//! - **Falls back** to the next source, then to curated static data
//! - **Protects** wait-time calls with a circuit breaker
//! - **Merges** entertainment and character paths concurrently
//! - **Caches** only results that carry live data
//!
//! Every result is wrapped in an [`Envelope`] whose metadata says where the
//! data came from and how fresh it is. Callers never see an upstream error.
//!
//! ## Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`acquisition`] | Ordered source fallback and per-position freshness |
//! | [`aggregator`] | Concurrent fan-out and last-write-wins merge |
//! | [`cache`] | TTL caches per domain |
//! | [`circuit_breaker`] | Rolling-window circuit breaker |
//! | [`config`] | `PARKPULSE_*` environment configuration |
//! | [`context`] | [`ParkDataService`], the acquisition facade |
//! | [`domain`] | Canonical records |
//! | [`envelope`] | Response envelope with provenance metadata |
//! | [`error`] | Validation and configuration errors |
//! | [`fallback`] | Curated static data per park |
//! | [`freshness`] | Per-domain success and error counters |
//! | [`http_client`] | HTTP client abstraction |
//! | [`normalize`] | Upstream format normalizers |
//! | [`park`] | Park identifiers and upstream id mapping |
//! | [`registry`] | Source tables per domain |
//! | [`resilience`] | Breaker-protected wait-time acquisition |
//! | [`retry`] | Retry with backoff and per-attempt timeout |
//! | [`source`] | Per-source failure classification |
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use parkpulse_core::ParkDataService;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let service = ParkDataService::from_env()?;
//!     let envelope = service.acquire_wait_times("magic-kingdom").await?;
//!
//!     println!(
//!         "{} attractions from {} (freshness {:?})",
//!         envelope.data.len(),
//!         envelope.meta.source,
//!         envelope.meta.freshness_score
//!     );
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────┐
//! │ ParkDataService  │── cache hit ──▶ Envelope
//! └────────┬─────────┘
//!          │
//!          ▼
//! ┌──────────────────┐     ┌──────────────────┐
//! │ Aggregator /     │────▶│ Circuit Breaker  │
//! │ Resilience       │     │ (wait times)     │
//! └────────┬─────────┘     └──────────────────┘
//!          │
//!          ▼
//! ┌──────────────────┐     ┌──────────────────┐
//! │ SourceFetcher    │────▶│ HTTP Client      │
//! │ (ordered)        │     │ (reqwest/none)   │
//! └────────┬─────────┘     └──────────────────┘
//!          │
//!          ▼
//! ┌──────────────────┐
//! │ Normalizers      │
//! └──────────────────┘
//! ```
//!
//! ## Error Handling
//!
//! Acquisition returns `Result<Envelope<_>, ValidationError>`; the only
//! error is an unknown park, raised before any request is made.
//!
//! ```rust
//! use parkpulse_core::{ParkId, ValidationError};
//!
//! let error = "epic-universe".parse::<ParkId>().unwrap_err();
//! assert!(matches!(error, ValidationError::UnknownPark { .. }));
//! ```

pub mod acquisition;
pub mod aggregator;
pub mod cache;
pub mod circuit_breaker;
pub mod config;
pub mod context;
pub mod domain;
pub mod envelope;
pub mod error;
pub mod fallback;
pub mod freshness;
pub mod http_client;
pub mod normalize;
pub mod park;
pub mod registry;
pub mod resilience;
pub mod retry;
pub mod source;

// Acquisition
pub use acquisition::{freshness_for_position, FetchFailure, FetchResult, FetchSuccess, SourceFetcher};
pub use aggregator::{aggregate, fan_out, merge, AcquisitionPath, Keyed, PathOutcome};
pub use context::{HealthReport, ParkDataService};
pub use resilience::{WaitTimesController, WaitTimesHealth};

// Caching
pub use cache::{cache_key, CacheStats, CacheStore, CacheTtls, DomainCaches, DomainPayload};

// Circuit breaker
pub use circuit_breaker::{CircuitBreaker, CircuitBreakerConfig, CircuitSnapshot, CircuitState};

// Configuration
pub use config::{CoreConfig, UpstreamUrls};

// Domain models
pub use domain::{
    iso_date, AttractionStatus, CharacterMeet, DataDomain, EntertainmentBundle,
    EntertainmentEvent, EventCategory, ParkHoursEntry, ScheduleItem, UtcDateTime,
};

// Envelope types
pub use envelope::{Envelope, EnvelopeError, EnvelopeMeta, FALLBACK_SOURCE};

// Error types
pub use error::{ConfigError, CoreError, ValidationError};

// Freshness tracking
pub use freshness::{DataState, DomainState};

// HTTP client types
pub use http_client::{
    HttpClient, HttpError, HttpFuture, HttpRequest, HttpResponse, OfflineHttpClient,
    ReqwestHttpClient,
};

// Normalization
pub use normalize::{classify_event, normalize, FormatTag, NormalizeContext, NormalizeError, Normalized};

// Parks and sources
pub use park::{ParkId, Upstream};
pub use registry::{SourceEndpoint, SourceRegistry, SourceSpec};

// Retry logic
pub use retry::{Backoff, BackoffStrategy, RetryConfig};

// Per-source failures
pub use source::{SourceError, SourceErrorKind};
