//! Ordered upstream candidates per data domain.

use std::time::Duration;

use serde::Serialize;

use crate::config::UpstreamUrls;
use crate::normalize::FormatTag;
use crate::park::Upstream;
use crate::retry::{Backoff, RetryConfig};
use crate::{DataDomain, ParkId, ValidationError};

/// Static description of one upstream endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceSpec {
    /// Provenance tag reported in envelopes.
    pub name: &'static str,
    pub upstream: Upstream,
    /// Path appended to the upstream base URL; `{id}` is the park's upstream id.
    pub path_template: &'static str,
    /// Lower is tried first.
    pub priority: u8,
    pub timeout_ms: u64,
    pub format: FormatTag,
}

const WAIT_TIME_SOURCES: &[SourceSpec] = &[
    SourceSpec {
        name: "queue_times",
        upstream: Upstream::QueueTimes,
        path_template: "/parks/{id}/queue_times.json",
        priority: 1,
        timeout_ms: 8_000,
        format: FormatTag::QueueTimesLands,
    },
    SourceSpec {
        name: "themeparks_wiki",
        upstream: Upstream::ThemeParksWiki,
        path_template: "/entity/{id}/live",
        priority: 2,
        timeout_ms: 8_000,
        format: FormatTag::ThemeParksLive,
    },
];

const PARK_HOURS_SOURCES: &[SourceSpec] = &[
    SourceSpec {
        name: "themeparks_wiki",
        upstream: Upstream::ThemeParksWiki,
        path_template: "/entity/{id}/schedule",
        priority: 1,
        timeout_ms: 6_000,
        format: FormatTag::ThemeParksSchedule,
    },
    SourceSpec {
        name: "disney_calendar",
        upstream: Upstream::Disney,
        path_template: "/park-hours/{id}",
        priority: 2,
        timeout_ms: 6_000,
        format: FormatTag::DisneyCalendar,
    },
];

const ENTERTAINMENT_SOURCES: &[SourceSpec] = &[
    SourceSpec {
        name: "themeparks_wiki",
        upstream: Upstream::ThemeParksWiki,
        path_template: "/entity/{id}/live",
        priority: 1,
        timeout_ms: 8_000,
        format: FormatTag::ThemeParksShowtimes,
    },
    SourceSpec {
        name: "disney_entertainment",
        upstream: Upstream::Disney,
        path_template: "/entertainment/{id}",
        priority: 2,
        timeout_ms: 8_000,
        format: FormatTag::DisneyEntertainment,
    },
];

const CHARACTER_SOURCES: &[SourceSpec] = &[SourceSpec {
    name: "character_schedule",
    upstream: Upstream::CharacterSchedule,
    path_template: "/{id}",
    priority: 1,
    timeout_ms: 10_000,
    format: FormatTag::CharacterScheduleHtml,
}];

/// Resolved endpoint for one domain and park.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceEndpoint {
    pub name: &'static str,
    pub url: String,
    pub timeout_ms: u64,
    pub format: FormatTag,
    pub priority: u8,
}

impl SourceEndpoint {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

/// Static source table plus upstream base URLs.
#[derive(Debug, Clone, Default)]
pub struct SourceRegistry {
    upstreams: UpstreamUrls,
}

impl SourceRegistry {
    pub fn new(upstreams: UpstreamUrls) -> Self {
        Self { upstreams }
    }

    /// Source specs for `domain`, highest priority first.
    pub fn specs(&self, domain: DataDomain) -> Vec<SourceSpec> {
        let table = match domain {
            DataDomain::WaitTimes => WAIT_TIME_SOURCES,
            DataDomain::ParkHours => PARK_HOURS_SOURCES,
            DataDomain::Entertainment => ENTERTAINMENT_SOURCES,
            DataDomain::Characters => CHARACTER_SOURCES,
        };
        let mut specs = table.to_vec();
        specs.sort_by_key(|spec| spec.priority);
        specs
    }

    /// Endpoints for a raw park identifier; unknown parks fail closed.
    pub fn endpoints(
        &self,
        domain: DataDomain,
        park: &str,
    ) -> Result<Vec<SourceEndpoint>, ValidationError> {
        let park = park.parse::<ParkId>()?;
        Ok(self.endpoints_for(domain, park))
    }

    pub fn endpoints_for(&self, domain: DataDomain, park: ParkId) -> Vec<SourceEndpoint> {
        self.specs(domain)
            .into_iter()
            .map(|spec| SourceEndpoint {
                name: spec.name,
                url: self.url(spec, park),
                timeout_ms: spec.timeout_ms,
                format: spec.format,
                priority: spec.priority,
            })
            .collect()
    }

    fn base_url(&self, upstream: Upstream) -> &str {
        match upstream {
            Upstream::QueueTimes => &self.upstreams.queue_times,
            Upstream::ThemeParksWiki => &self.upstreams.themeparks_wiki,
            Upstream::Disney => &self.upstreams.disney,
            Upstream::CharacterSchedule => &self.upstreams.character_schedule,
        }
    }

    fn url(&self, spec: SourceSpec, park: ParkId) -> String {
        let id = urlencoding::encode(park.upstream_id(spec.upstream));
        format!(
            "{}{}",
            self.base_url(spec.upstream),
            spec.path_template.replace("{id}", &id)
        )
    }

    /// Upper bound on the time an acquisition for `domain` can take when
    /// every source exhausts its retries.
    pub fn worst_case_latency(&self, domain: DataDomain, retries: u32, backoff: Backoff) -> Duration {
        let retry = RetryConfig {
            max_retries: retries,
            backoff,
        };
        self.specs(domain)
            .into_iter()
            .map(|spec| retry.worst_case(Duration::from_millis(spec.timeout_ms)))
            .sum()
    }
}
