use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::ValidationError;

/// Upstream services that key parks by their own identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Upstream {
    QueueTimes,
    ThemeParksWiki,
    Disney,
    CharacterSchedule,
}

impl Upstream {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::QueueTimes => "queue_times",
            Self::ThemeParksWiki => "themeparks_wiki",
            Self::Disney => "disney",
            Self::CharacterSchedule => "character_schedule",
        }
    }
}

impl Display for Upstream {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The four supported parks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ParkId {
    MagicKingdom,
    Epcot,
    HollywoodStudios,
    AnimalKingdom,
}

impl ParkId {
    pub const ALL: [Self; 4] = [
        Self::MagicKingdom,
        Self::Epcot,
        Self::HollywoodStudios,
        Self::AnimalKingdom,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::MagicKingdom => "magic-kingdom",
            Self::Epcot => "epcot",
            Self::HollywoodStudios => "hollywood-studios",
            Self::AnimalKingdom => "animal-kingdom",
        }
    }

    pub const fn display_name(self) -> &'static str {
        match self {
            Self::MagicKingdom => "Magic Kingdom",
            Self::Epcot => "EPCOT",
            Self::HollywoodStudios => "Disney's Hollywood Studios",
            Self::AnimalKingdom => "Disney's Animal Kingdom",
        }
    }

    /// Identifier the given upstream uses for this park.
    pub const fn upstream_id(self, upstream: Upstream) -> &'static str {
        match (upstream, self) {
            (Upstream::QueueTimes, Self::MagicKingdom) => "6",
            (Upstream::QueueTimes, Self::Epcot) => "5",
            (Upstream::QueueTimes, Self::HollywoodStudios) => "7",
            (Upstream::QueueTimes, Self::AnimalKingdom) => "8",
            (Upstream::ThemeParksWiki, Self::MagicKingdom) => "75ea578a-adc8-4116-a54d-dccb60765ef9",
            (Upstream::ThemeParksWiki, Self::Epcot) => "47f90d2c-e191-4239-a466-5892ef59a88b",
            (Upstream::ThemeParksWiki, Self::HollywoodStudios) => {
                "288747d1-8b4f-4a64-867e-ea7c9b27bad8"
            }
            (Upstream::ThemeParksWiki, Self::AnimalKingdom) => "1c84a229-8862-4648-9c71-378ddd2c7693",
            (Upstream::Disney, Self::MagicKingdom) => "80007944",
            (Upstream::Disney, Self::Epcot) => "80007838",
            (Upstream::Disney, Self::HollywoodStudios) => "80007998",
            (Upstream::Disney, Self::AnimalKingdom) => "80007823",
            (Upstream::CharacterSchedule, park) => park.as_str(),
        }
    }
}

impl Display for ParkId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ParkId {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "magic-kingdom" => Ok(Self::MagicKingdom),
            "epcot" => Ok(Self::Epcot),
            "hollywood-studios" => Ok(Self::HollywoodStudios),
            "animal-kingdom" => Ok(Self::AnimalKingdom),
            _ => Err(ValidationError::UnknownPark {
                value: value.trim().to_owned(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_slugs_case_insensitively() {
        assert_eq!("Magic-Kingdom".parse::<ParkId>(), Ok(ParkId::MagicKingdom));
        assert_eq!("animal_kingdom".parse::<ParkId>(), Ok(ParkId::AnimalKingdom));
        assert_eq!(" epcot ".parse::<ParkId>(), Ok(ParkId::Epcot));
    }

    #[test]
    fn rejects_unknown_park() {
        let err = "epic-universe".parse::<ParkId>().expect_err("must fail");
        assert_eq!(
            err,
            ValidationError::UnknownPark {
                value: String::from("epic-universe")
            }
        );
    }

    #[test]
    fn every_park_has_an_id_for_every_upstream() {
        let upstreams = [
            Upstream::QueueTimes,
            Upstream::ThemeParksWiki,
            Upstream::Disney,
            Upstream::CharacterSchedule,
        ];
        for park in ParkId::ALL {
            for upstream in upstreams {
                assert!(!park.upstream_id(upstream).is_empty());
            }
        }
    }
}
