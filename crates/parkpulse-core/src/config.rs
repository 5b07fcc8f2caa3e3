//! Runtime configuration.
//!
//! Defaults match production. [`CoreConfig::from_env`] overrides them from
//! `PARKPULSE_*` variables:
//!
//! | Variable | Meaning | Default |
//! |----------|---------|---------|
//! | `PARKPULSE_QUEUE_TIMES_URL` | queue-times base URL | `https://queue-times.com` |
//! | `PARKPULSE_THEMEPARKS_URL` | themeparks.wiki base URL | `https://api.themeparks.wiki/v1` |
//! | `PARKPULSE_DISNEY_URL` | Disney calendar/entertainment base URL | `https://disneyworld.disney.go.com/api/wdpro` |
//! | `PARKPULSE_CHARACTER_SCHEDULE_URL` | character schedule page base URL | `https://www.wdwcharacters.com/schedule` |
//! | `PARKPULSE_RETRIES` | retries per source | `2` |
//! | `PARKPULSE_RETRY_DELAY_MS` | delay before the first retry | `1000` |
//! | `PARKPULSE_BACKOFF` | `fixed` or `exponential` (doubling, jittered, capped at 4x) | `fixed` |
//! | `PARKPULSE_WAIT_TIMES_RETRIES` | retries per wait-time source | `1` |
//! | `PARKPULSE_TTL_<DOMAIN>_SECS` | cache TTL for `WAIT_TIMES`, `PARK_HOURS`, `ENTERTAINMENT`, `CHARACTERS` | 300 / 3600 / 1800 / 1800 |
//! | `PARKPULSE_BREAKER_ERROR_PERCENT` | error rate that opens the breaker | `50` |
//! | `PARKPULSE_BREAKER_VOLUME` | minimum calls in the window | `4` |
//! | `PARKPULSE_BREAKER_WINDOW_SECS` | rolling window length | `10` |
//! | `PARKPULSE_BREAKER_RESET_SECS` | open-state cooldown | `30` |

use std::env;
use std::time::Duration;

use crate::cache::CacheTtls;
use crate::circuit_breaker::CircuitBreakerConfig;
use crate::error::ConfigError;
use crate::retry::{BackoffStrategy, RetryConfig};

/// Base URLs of the upstream services.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpstreamUrls {
    pub queue_times: String,
    pub themeparks_wiki: String,
    pub disney: String,
    pub character_schedule: String,
}

impl Default for UpstreamUrls {
    fn default() -> Self {
        Self {
            queue_times: String::from("https://queue-times.com"),
            themeparks_wiki: String::from("https://api.themeparks.wiki/v1"),
            disney: String::from("https://disneyworld.disney.go.com/api/wdpro"),
            character_schedule: String::from("https://www.wdwcharacters.com/schedule"),
        }
    }
}

/// Everything `ParkDataService` needs besides an HTTP client.
#[derive(Debug, Clone, PartialEq)]
pub struct CoreConfig {
    pub upstreams: UpstreamUrls,
    /// Budget for park hours, entertainment and characters sources.
    pub retry: RetryConfig,
    /// Retries per source inside the wait-time breaker.
    pub wait_times_retries: u32,
    pub cache_ttls: CacheTtls,
    pub circuit_breaker: CircuitBreakerConfig,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            upstreams: UpstreamUrls::default(),
            retry: RetryConfig::default(),
            wait_times_retries: 1,
            cache_ttls: CacheTtls::default(),
            circuit_breaker: CircuitBreakerConfig::default(),
        }
    }
}

impl CoreConfig {
    /// Defaults overridden by `PARKPULSE_*` environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Same as [`CoreConfig::from_env`] over an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let vars = Vars { lookup: &lookup };

        let upstreams = UpstreamUrls {
            queue_times: vars.url("PARKPULSE_QUEUE_TIMES_URL", defaults.upstreams.queue_times)?,
            themeparks_wiki: vars.url(
                "PARKPULSE_THEMEPARKS_URL",
                defaults.upstreams.themeparks_wiki,
            )?,
            disney: vars.url("PARKPULSE_DISNEY_URL", defaults.upstreams.disney)?,
            character_schedule: vars.url(
                "PARKPULSE_CHARACTER_SCHEDULE_URL",
                defaults.upstreams.character_schedule,
            )?,
        };

        let max_retries = vars.number(
            "PARKPULSE_RETRIES",
            u64::from(defaults.retry.max_retries),
            0,
            5,
        )? as u32;
        let delay_ms = vars.number("PARKPULSE_RETRY_DELAY_MS", 1_000, 0, 10_000)?;
        let strategy = vars.backoff("PARKPULSE_BACKOFF", defaults.retry.backoff.strategy())?;
        let wait_times_retries = vars.number(
            "PARKPULSE_WAIT_TIMES_RETRIES",
            u64::from(defaults.wait_times_retries),
            0,
            3,
        )? as u32;

        let cache_ttls = CacheTtls {
            wait_times: vars.seconds("PARKPULSE_TTL_WAIT_TIMES_SECS", defaults.cache_ttls.wait_times)?,
            park_hours: vars.seconds("PARKPULSE_TTL_PARK_HOURS_SECS", defaults.cache_ttls.park_hours)?,
            entertainment: vars.seconds(
                "PARKPULSE_TTL_ENTERTAINMENT_SECS",
                defaults.cache_ttls.entertainment,
            )?,
            characters: vars.seconds("PARKPULSE_TTL_CHARACTERS_SECS", defaults.cache_ttls.characters)?,
        };

        let breaker = defaults.circuit_breaker;
        let circuit_breaker = CircuitBreakerConfig {
            error_threshold_percentage: vars.number(
                "PARKPULSE_BREAKER_ERROR_PERCENT",
                u64::from(breaker.error_threshold_percentage),
                1,
                100,
            )? as u8,
            volume_threshold: vars.number(
                "PARKPULSE_BREAKER_VOLUME",
                u64::from(breaker.volume_threshold),
                1,
                1_000,
            )? as u32,
            rolling_window: Duration::from_secs(vars.number(
                "PARKPULSE_BREAKER_WINDOW_SECS",
                breaker.rolling_window.as_secs(),
                1,
                3_600,
            )?),
            reset_timeout: Duration::from_secs(vars.number(
                "PARKPULSE_BREAKER_RESET_SECS",
                breaker.reset_timeout.as_secs(),
                1,
                3_600,
            )?),
        };

        Ok(Self {
            upstreams,
            retry: RetryConfig::with_strategy(strategy, Duration::from_millis(delay_ms), max_retries),
            wait_times_retries,
            cache_ttls,
            circuit_breaker,
        })
    }
}

struct Vars<'a, F> {
    lookup: &'a F,
}

impl<F> Vars<'_, F>
where
    F: Fn(&str) -> Option<String>,
{
    fn get(&self, var: &str) -> Option<String> {
        (self.lookup)(var)
            .map(|value| value.trim().to_owned())
            .filter(|value| !value.is_empty())
    }

    fn url(&self, var: &'static str, default: String) -> Result<String, ConfigError> {
        let Some(value) = self.get(var) else {
            return Ok(default);
        };
        if !(value.starts_with("http://") || value.starts_with("https://")) {
            return Err(ConfigError::InvalidUrl { var, value });
        }
        Ok(value.trim_end_matches('/').to_owned())
    }

    fn number(&self, var: &'static str, default: u64, min: u64, max: u64) -> Result<u64, ConfigError> {
        let Some(raw) = self.get(var) else {
            return Ok(default);
        };
        let value = raw
            .parse::<u64>()
            .map_err(|_| ConfigError::InvalidNumber { var, value: raw })?;
        if value < min || value > max {
            return Err(ConfigError::OutOfRange {
                var,
                value,
                min,
                max,
            });
        }
        Ok(value)
    }

    fn backoff(&self, var: &'static str, default: BackoffStrategy) -> Result<BackoffStrategy, ConfigError> {
        match self.get(var) {
            None => Ok(default),
            Some(value) => value
                .parse()
                .map_err(|reason| ConfigError::InvalidChoice { var, reason }),
        }
    }

    fn seconds(&self, var: &'static str, default: Duration) -> Result<Duration, ConfigError> {
        self.number(var, default.as_secs(), 0, 86_400)
            .map(Duration::from_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars = pairs
            .iter()
            .map(|(key, value)| ((*key).to_owned(), (*value).to_owned()))
            .collect::<HashMap<_, _>>();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn empty_environment_yields_defaults() {
        let config = CoreConfig::from_lookup(lookup(&[])).expect("defaults are valid");
        assert_eq!(config, CoreConfig::default());
        assert_eq!(config.cache_ttls.wait_times, Duration::from_secs(300));
        assert_eq!(config.wait_times_retries, 1);
    }

    #[test]
    fn overrides_are_applied() {
        let config = CoreConfig::from_lookup(lookup(&[
            ("PARKPULSE_QUEUE_TIMES_URL", "http://localhost:9000/"),
            ("PARKPULSE_RETRIES", "0"),
            ("PARKPULSE_RETRY_DELAY_MS", "250"),
            ("PARKPULSE_TTL_CHARACTERS_SECS", "60"),
            ("PARKPULSE_BREAKER_VOLUME", "10"),
        ]))
        .expect("overrides are valid");

        assert_eq!(config.upstreams.queue_times, "http://localhost:9000");
        assert_eq!(config.retry, RetryConfig::fixed(Duration::from_millis(250), 0));
        assert_eq!(config.cache_ttls.characters, Duration::from_secs(60));
        assert_eq!(config.circuit_breaker.volume_threshold, 10);
    }

    #[test]
    fn exponential_backoff_is_selectable() {
        let config = CoreConfig::from_lookup(lookup(&[
            ("PARKPULSE_BACKOFF", "exponential"),
            ("PARKPULSE_RETRY_DELAY_MS", "200"),
        ]))
        .expect("backoff choice is valid");

        assert_eq!(config.retry, RetryConfig::exponential(Duration::from_millis(200), 2));
        assert_eq!(config.retry.backoff.max_delay(5), Duration::from_millis(1_200));

        let err = CoreConfig::from_lookup(lookup(&[("PARKPULSE_BACKOFF", "linear")]))
            .expect_err("must fail");
        assert!(matches!(err, ConfigError::InvalidChoice { var: "PARKPULSE_BACKOFF", .. }));
    }

    #[test]
    fn invalid_values_are_rejected() {
        let err = CoreConfig::from_lookup(lookup(&[("PARKPULSE_RETRIES", "many")]))
            .expect_err("must fail");
        assert!(matches!(err, ConfigError::InvalidNumber { var: "PARKPULSE_RETRIES", .. }));

        let err = CoreConfig::from_lookup(lookup(&[("PARKPULSE_BREAKER_ERROR_PERCENT", "0")]))
            .expect_err("must fail");
        assert!(matches!(err, ConfigError::OutOfRange { min: 1, .. }));

        let err = CoreConfig::from_lookup(lookup(&[("PARKPULSE_DISNEY_URL", "ftp://disney")]))
            .expect_err("must fail");
        assert!(matches!(err, ConfigError::InvalidUrl { .. }));
    }
}
