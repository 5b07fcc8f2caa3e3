use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{UtcDateTime, ValidationError};

/// Independent data category with its own cache and sources.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataDomain {
    ParkHours,
    WaitTimes,
    Entertainment,
    Characters,
}

impl DataDomain {
    pub const ALL: [Self; 4] = [
        Self::ParkHours,
        Self::WaitTimes,
        Self::Entertainment,
        Self::Characters,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ParkHours => "park_hours",
            Self::WaitTimes => "wait_times",
            Self::Entertainment => "entertainment",
            Self::Characters => "characters",
        }
    }
}

impl Display for DataDomain {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DataDomain {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "park_hours" | "hours" => Ok(Self::ParkHours),
            "wait_times" => Ok(Self::WaitTimes),
            "entertainment" => Ok(Self::Entertainment),
            "characters" => Ok(Self::Characters),
            _ => Err(ValidationError::UnknownDomain {
                value: value.trim().to_owned(),
            }),
        }
    }
}

/// Live status of a single ride or attraction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttractionStatus {
    pub id: String,
    pub name: String,
    pub land: String,
    pub wait_minutes: u32,
    pub is_open: bool,
    pub express_eligible: bool,
    pub last_updated: UtcDateTime,
}

/// Entertainment category derived from upstream names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventCategory {
    Show,
    Parade,
    Fireworks,
    CharacterMeet,
}

impl EventCategory {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Show => "show",
            Self::Parade => "parade",
            Self::Fireworks => "fireworks",
            Self::CharacterMeet => "character_meet",
        }
    }
}

impl Display for EventCategory {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Show, parade, fireworks or meet-and-greet with its showtimes.
///
/// `times` stays human-readable: upstreams disagree on formats and some
/// report words such as "Continuous".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntertainmentEvent {
    pub id: String,
    pub name: String,
    pub category: EventCategory,
    pub times: Vec<String>,
    pub location: String,
    pub duration_minutes: u32,
    pub source: String,
}

/// Meet-and-greet listing the characters that appear.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharacterMeet {
    #[serde(flatten)]
    pub event: EntertainmentEvent,
    pub characters: Vec<String>,
}

impl CharacterMeet {
    pub fn id(&self) -> &str {
        &self.event.id
    }
}

/// A merged entertainment record: either a plain event or a character meet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ScheduleItem {
    CharacterMeet(CharacterMeet),
    Event(EntertainmentEvent),
}

impl ScheduleItem {
    pub fn event(&self) -> &EntertainmentEvent {
        match self {
            Self::CharacterMeet(meet) => &meet.event,
            Self::Event(event) => event,
        }
    }

    pub fn id(&self) -> &str {
        &self.event().id
    }

    pub fn category(&self) -> EventCategory {
        self.event().category
    }

    /// Character-meet view of this record, if it is one.
    ///
    /// Plain events classified as meets carry no explicit character list.
    pub fn to_character_meet(&self) -> Option<CharacterMeet> {
        match self {
            Self::CharacterMeet(meet) => Some(meet.clone()),
            Self::Event(event) if event.category == EventCategory::CharacterMeet => {
                Some(CharacterMeet {
                    event: event.clone(),
                    characters: Vec::new(),
                })
            }
            Self::Event(_) => None,
        }
    }
}

impl From<EntertainmentEvent> for ScheduleItem {
    fn from(event: EntertainmentEvent) -> Self {
        Self::Event(event)
    }
}

impl From<CharacterMeet> for ScheduleItem {
    fn from(meet: CharacterMeet) -> Self {
        Self::CharacterMeet(meet)
    }
}

/// Merged entertainment schedule plus its character-meet-only view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntertainmentBundle {
    pub items: Vec<ScheduleItem>,
    pub character_meets: Vec<CharacterMeet>,
}

impl EntertainmentBundle {
    pub fn new(items: Vec<ScheduleItem>) -> Self {
        let character_meets = items
            .iter()
            .filter_map(ScheduleItem::to_character_meet)
            .collect();
        Self {
            items,
            character_meets,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Operating hours for one calendar day.
///
/// Opening and closing times are passed through in whatever format the
/// producing upstream uses ("09:00" or "9:00 AM").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParkHoursEntry {
    pub date: String,
    pub opening_time: String,
    pub closing_time: String,
    pub day_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub special_hours: Option<String>,
}
