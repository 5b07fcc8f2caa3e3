//! Response normalizers, one per upstream format.
//!
//! Every upstream shape is identified by a [`FormatTag`]; [`normalize`] is an
//! exhaustive mapping from tag to a pure transform. Transforms are total over
//! object-shaped input: missing or mistyped fields fall back to documented
//! defaults and unrecognizable items are skipped. Only a fundamentally wrong
//! top-level shape (or unparseable JSON) is reported as a
//! [`NormalizeError`], which the acquisition layer treats as a source
//! failure.

mod characters;
mod classify;
mod entertainment;
mod fields;
mod park_hours;
mod wait_times;

use std::fmt::{Display, Formatter};

use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use crate::source::SourceError;
use crate::{
    AttractionStatus, CharacterMeet, DataDomain, ParkHoursEntry, ScheduleItem, UtcDateTime,
};

pub use characters::{character_names, normalize_character_html};
pub use classify::{classify_event, slugify};
pub use entertainment::{normalize_disney_entertainment, normalize_themeparks_showtimes};
pub use park_hours::{normalize_disney_calendar, normalize_themeparks_schedule};
pub use wait_times::{normalize_queue_times, normalize_themeparks_live};

/// Upstream response format identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FormatTag {
    /// `lands[].rides[]` with `wait_time` / `is_open`.
    QueueTimesLands,
    /// Flat `liveData[]` with `waitTime` and a `status` enum.
    ThemeParksLive,
    /// `schedule[]` of typed ISO-timestamped windows.
    ThemeParksSchedule,
    /// `parkHours[]` with 12-hour clock strings.
    DisneyCalendar,
    /// `liveData[]` entries of type SHOW with `showtimes[]`.
    ThemeParksShowtimes,
    /// `entertainment[]` with free-form `times`.
    DisneyEntertainment,
    /// Character schedule HTML page.
    CharacterScheduleHtml,
}

impl FormatTag {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::QueueTimesLands => "queue_times_lands",
            Self::ThemeParksLive => "themeparks_live",
            Self::ThemeParksSchedule => "themeparks_schedule",
            Self::DisneyCalendar => "disney_calendar",
            Self::ThemeParksShowtimes => "themeparks_showtimes",
            Self::DisneyEntertainment => "disney_entertainment",
            Self::CharacterScheduleHtml => "character_schedule_html",
        }
    }

    /// Data domain this format produces records for.
    pub const fn domain(self) -> DataDomain {
        match self {
            Self::QueueTimesLands | Self::ThemeParksLive => DataDomain::WaitTimes,
            Self::ThemeParksSchedule | Self::DisneyCalendar => DataDomain::ParkHours,
            Self::ThemeParksShowtimes | Self::DisneyEntertainment => DataDomain::Entertainment,
            Self::CharacterScheduleHtml => DataDomain::Characters,
        }
    }
}

impl Display for FormatTag {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Canonical records produced by one normalizer call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Normalized {
    Attractions(Vec<AttractionStatus>),
    Hours(Vec<ParkHoursEntry>),
    Schedule(Vec<ScheduleItem>),
    CharacterMeets(Vec<CharacterMeet>),
}

impl Normalized {
    pub fn len(&self) -> usize {
        match self {
            Self::Attractions(records) => records.len(),
            Self::Hours(records) => records.len(),
            Self::Schedule(records) => records.len(),
            Self::CharacterMeets(records) => records.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn into_attractions(self) -> Option<Vec<AttractionStatus>> {
        match self {
            Self::Attractions(records) => Some(records),
            _ => None,
        }
    }

    pub fn into_hours(self) -> Option<Vec<ParkHoursEntry>> {
        match self {
            Self::Hours(records) => Some(records),
            _ => None,
        }
    }

    pub fn into_schedule(self) -> Option<Vec<ScheduleItem>> {
        match self {
            Self::Schedule(records) => Some(records),
            _ => None,
        }
    }

    pub fn into_character_meets(self) -> Option<Vec<CharacterMeet>> {
        match self {
            Self::CharacterMeets(records) => Some(records),
            _ => None,
        }
    }
}

/// Per-call inputs shared by all normalizers.
#[derive(Debug, Clone, Copy)]
pub struct NormalizeContext<'a> {
    /// Provenance tag stamped on entertainment records.
    pub source: &'a str,
    /// Used when an upstream omits its own timestamp.
    pub fetched_at: UtcDateTime,
}

impl<'a> NormalizeContext<'a> {
    pub fn new(source: &'a str, fetched_at: UtcDateTime) -> Self {
        Self { source, fetched_at }
    }
}

/// Raised only when a body cannot be interpreted at all.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum NormalizeError {
    #[error("{format} body is not valid JSON: {message}")]
    InvalidJson { format: FormatTag, message: String },

    #[error("{format} expected {expected}, found {found}")]
    WrongShape {
        format: FormatTag,
        expected: &'static str,
        found: &'static str,
    },
}

impl From<NormalizeError> for SourceError {
    fn from(error: NormalizeError) -> Self {
        SourceError::malformed(error.to_string())
    }
}

/// Dispatches `body` to the normalizer for `format`.
pub fn normalize(
    format: FormatTag,
    body: &str,
    ctx: NormalizeContext<'_>,
) -> Result<Normalized, NormalizeError> {
    match format {
        FormatTag::QueueTimesLands => {
            normalize_queue_times(&parse_json(format, body)?, ctx).map(Normalized::Attractions)
        }
        FormatTag::ThemeParksLive => {
            normalize_themeparks_live(&parse_json(format, body)?, ctx).map(Normalized::Attractions)
        }
        FormatTag::ThemeParksSchedule => {
            normalize_themeparks_schedule(&parse_json(format, body)?).map(Normalized::Hours)
        }
        FormatTag::DisneyCalendar => {
            normalize_disney_calendar(&parse_json(format, body)?).map(Normalized::Hours)
        }
        FormatTag::ThemeParksShowtimes => {
            normalize_themeparks_showtimes(&parse_json(format, body)?, ctx)
                .map(Normalized::Schedule)
        }
        FormatTag::DisneyEntertainment => {
            normalize_disney_entertainment(&parse_json(format, body)?, ctx)
                .map(Normalized::Schedule)
        }
        FormatTag::CharacterScheduleHtml => Ok(Normalized::CharacterMeets(
            normalize_character_html(body, ctx),
        )),
    }
}

fn parse_json(format: FormatTag, body: &str) -> Result<Value, NormalizeError> {
    serde_json::from_str(body).map_err(|e| NormalizeError::InvalidJson {
        format,
        message: e.to_string(),
    })
}
