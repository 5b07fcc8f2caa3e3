//! Source-level failure classification.
//!
//! A [`SourceError`] never reaches callers of the acquisition API; it is
//! collected into warnings and decides whether freshness counters move.

use std::fmt::{Display, Formatter};

use crate::http_client::HttpError;

/// Why a single upstream source did not produce usable records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceErrorKind {
    /// Transport error, timeout, non-200 status or empty body.
    Unavailable,
    /// Body could not be parsed or had a fundamentally wrong shape.
    Malformed,
    /// Body parsed but contained no recognizable records.
    Empty,
    /// Registry produced a format the caller cannot use.
    Internal,
}

/// Structured source error used by ordered fallback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceError {
    kind: SourceErrorKind,
    message: String,
    retryable: bool,
}

impl SourceError {
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::Unavailable,
            message: message.into(),
            retryable: true,
        }
    }

    pub fn malformed(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::Malformed,
            message: message.into(),
            retryable: true,
        }
    }

    pub fn empty(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::Empty,
            message: message.into(),
            retryable: false,
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::Internal,
            message: message.into(),
            retryable: false,
        }
    }

    pub const fn kind(&self) -> SourceErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub const fn retryable(&self) -> bool {
        self.retryable
    }

    /// Whether this failure means the upstream was unhealthy.
    ///
    /// An unrecognized-but-reachable page is not an upstream fault.
    pub const fn counts_as_failure(&self) -> bool {
        !matches!(self.kind, SourceErrorKind::Empty)
    }

    pub const fn code(&self) -> &'static str {
        match self.kind {
            SourceErrorKind::Unavailable => "source.unavailable",
            SourceErrorKind::Malformed => "source.malformed",
            SourceErrorKind::Empty => "source.empty",
            SourceErrorKind::Internal => "source.internal",
        }
    }
}

impl From<HttpError> for SourceError {
    fn from(error: HttpError) -> Self {
        if error.timed_out() {
            Self::unavailable(format!("upstream timed out: {}", error.message()))
        } else {
            Self::unavailable(format!("transport error: {}", error.message()))
        }
    }
}

impl Display for SourceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.message, self.code())
    }
}

impl std::error::Error for SourceError {}
