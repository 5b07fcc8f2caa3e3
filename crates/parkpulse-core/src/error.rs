use thiserror::Error;

/// Validation errors exposed by `parkpulse-core`.
///
/// These are the only errors an acquisition call lets escape: everything that
/// goes wrong upstream resolves to fallback data instead.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error(
        "unknown park '{value}', expected one of magic-kingdom, epcot, hollywood-studios, animal-kingdom"
    )]
    UnknownPark { value: String },

    #[error("unknown data domain '{value}', expected one of park_hours, wait_times, entertainment, characters")]
    UnknownDomain { value: String },

    #[error("timestamp must be RFC3339 UTC (suffix Z): '{value}'")]
    TimestampNotUtc { value: String },
}

/// Configuration errors raised while reading `PARKPULSE_*` variables.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{var} must be a non-negative integer, got '{value}'")]
    InvalidNumber { var: &'static str, value: String },

    #[error("{var}: {reason}")]
    InvalidChoice { var: &'static str, reason: String },

    #[error("{var} must be an absolute http(s) URL, got '{value}'")]
    InvalidUrl { var: &'static str, value: String },

    #[error("{var} must be between {min} and {max}, got {value}")]
    OutOfRange {
        var: &'static str,
        value: u64,
        min: u64,
        max: u64,
    },
}

/// Top-level error type for core operations.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
