use serde::{Deserialize, Serialize};

use crate::source::SourceError;
use crate::UtcDateTime;

/// Provenance tag of static curated data.
pub const FALLBACK_SOURCE: &str = "fallback";

/// Result of one acquisition: canonical data plus provenance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub meta: EnvelopeMeta,
    pub data: T,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<EnvelopeError>,
}

impl<T> Envelope<T> {
    pub fn new(meta: EnvelopeMeta, data: T) -> Self {
        Self {
            meta,
            data,
            errors: Vec::new(),
        }
    }

    pub fn with_errors(meta: EnvelopeMeta, data: T, errors: Vec<EnvelopeError>) -> Self {
        Self { meta, data, errors }
    }

    /// Static data served because nothing live was available.
    pub fn is_fallback(&self) -> bool {
        self.meta.source == FALLBACK_SOURCE
    }

    /// Whether this result may be written back to its domain cache.
    ///
    /// Results with no live contribution are never cached so the next
    /// request retries the upstreams.
    pub fn is_cacheable(&self) -> bool {
        !self.is_fallback() && self.meta.freshness_score.unwrap_or(0) > 0
    }

    /// Copy served from cache, with the hit flag set and latency reset.
    pub fn as_cache_hit(&self, latency_ms: u64) -> Self
    where
        T: Clone,
    {
        let mut hit = self.clone();
        hit.meta.cache_hit = true;
        hit.meta.latency_ms = latency_ms;
        hit
    }
}

/// Provenance metadata attached to every envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnvelopeMeta {
    /// Source that produced `data`, or [`FALLBACK_SOURCE`].
    pub source: String,
    /// Every source attempted, in attempt order.
    pub source_chain: Vec<String>,
    pub last_updated: UtcDateTime,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub freshness_score: Option<u8>,
    pub cache_hit: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
    pub latency_ms: u64,
}

impl EnvelopeMeta {
    pub fn new(source: impl Into<String>, source_chain: Vec<String>, freshness_score: u8) -> Self {
        Self {
            source: source.into(),
            source_chain,
            last_updated: UtcDateTime::now(),
            freshness_score: Some(freshness_score.min(100)),
            cache_hit: false,
            warnings: Vec::new(),
            latency_ms: 0,
        }
    }

    /// Metadata for static data: source `"fallback"`, freshness 0.
    pub fn fallback(source_chain: Vec<String>) -> Self {
        Self::new(FALLBACK_SOURCE, source_chain, 0)
    }

    pub fn with_latency_ms(mut self, latency_ms: u64) -> Self {
        self.latency_ms = latency_ms;
        self
    }

    pub fn with_warnings(mut self, warnings: Vec<String>) -> Self {
        self.warnings = warnings;
        self
    }

    pub fn push_warning(&mut self, warning: impl Into<String>) {
        self.warnings.push(warning.into());
    }
}

/// Structured note about a source that did not contribute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvelopeError {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retryable: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

impl EnvelopeError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            retryable: None,
            source: None,
        }
    }

    pub fn from_source(source: &str, error: &SourceError) -> Self {
        Self {
            code: error.code().to_owned(),
            message: error.message().to_owned(),
            retryable: Some(error.retryable()),
            source: Some(source.to_owned()),
        }
    }

    /// Human-readable one-liner for `meta.warnings`.
    pub fn warning(&self) -> String {
        match &self.source {
            Some(source) => format!("{source}: {} ({})", self.message, self.code),
            None => format!("{} ({})", self.message, self.code),
        }
    }
}
