//! Curated static data served when no upstream is usable.
//!
//! Every table is non-empty for every park; acquisition relies on that.

use crate::{
    AttractionStatus, CharacterMeet, EntertainmentEvent, EventCategory, ParkHoursEntry, ParkId,
    ScheduleItem, UtcDateTime,
};

/// Provenance tag stamped on curated entertainment records.
pub const CURATED_SOURCE: &str = "curated";

const HOURS_DAYS: i64 = 7;

struct Ride {
    id: &'static str,
    name: &'static str,
    land: &'static str,
    wait_minutes: u32,
    express: bool,
}

struct Listing {
    name: &'static str,
    category: EventCategory,
    times: &'static [&'static str],
    location: &'static str,
    duration_minutes: u32,
}

struct Meet {
    name: &'static str,
    characters: &'static [&'static str],
    times: &'static [&'static str],
    location: &'static str,
}

const fn ride(
    id: &'static str,
    name: &'static str,
    land: &'static str,
    wait_minutes: u32,
    express: bool,
) -> Ride {
    Ride {
        id,
        name,
        land,
        wait_minutes,
        express,
    }
}

fn rides(park: ParkId) -> &'static [Ride] {
    const MAGIC_KINGDOM: &[Ride] = &[
        ride("seven_dwarfs_mine_train", "Seven Dwarfs Mine Train", "Fantasyland", 70, true),
        ride("space_mountain", "Space Mountain", "Tomorrowland", 55, true),
        ride("haunted_mansion", "Haunted Mansion", "Liberty Square", 35, true),
        ride("pirates_of_the_caribbean", "Pirates of the Caribbean", "Adventureland", 30, true),
        ride("jungle_cruise", "Jungle Cruise", "Adventureland", 45, true),
    ];
    const EPCOT: &[Ride] = &[
        ride("guardians_of_the_galaxy_cosmic_rewind", "Guardians of the Galaxy: Cosmic Rewind", "World Discovery", 90, true),
        ride("test_track", "Test Track", "World Discovery", 60, true),
        ride("frozen_ever_after", "Frozen Ever After", "World Showcase", 65, true),
        ride("soarin_around_the_world", "Soarin' Around the World", "World Nature", 40, true),
        ride("spaceship_earth", "Spaceship Earth", "World Celebration", 15, false),
    ];
    const HOLLYWOOD_STUDIOS: &[Ride] = &[
        ride("star_wars_rise_of_the_resistance", "Star Wars: Rise of the Resistance", "Star Wars: Galaxy's Edge", 85, true),
        ride("slinky_dog_dash", "Slinky Dog Dash", "Toy Story Land", 70, true),
        ride("tower_of_terror", "The Twilight Zone Tower of Terror", "Sunset Boulevard", 50, true),
        ride("rock_n_roller_coaster", "Rock 'n' Roller Coaster", "Sunset Boulevard", 45, true),
        ride("millennium_falcon_smugglers_run", "Millennium Falcon: Smugglers Run", "Star Wars: Galaxy's Edge", 40, true),
    ];
    const ANIMAL_KINGDOM: &[Ride] = &[
        ride("avatar_flight_of_passage", "Avatar Flight of Passage", "Pandora", 80, true),
        ride("kilimanjaro_safaris", "Kilimanjaro Safaris", "Africa", 35, true),
        ride("expedition_everest", "Expedition Everest", "Asia", 40, true),
        ride("navi_river_journey", "Na'vi River Journey", "Pandora", 45, true),
        ride("kali_river_rapids", "Kali River Rapids", "Asia", 25, true),
    ];

    match park {
        ParkId::MagicKingdom => MAGIC_KINGDOM,
        ParkId::Epcot => EPCOT,
        ParkId::HollywoodStudios => HOLLYWOOD_STUDIOS,
        ParkId::AnimalKingdom => ANIMAL_KINGDOM,
    }
}

fn listings(park: ParkId) -> &'static [Listing] {
    const MAGIC_KINGDOM: &[Listing] = &[
        Listing {
            name: "Festival of Fantasy Parade",
            category: EventCategory::Parade,
            times: &["12:00 PM", "3:00 PM"],
            location: "Frontierland to Main Street, U.S.A.",
            duration_minutes: 12,
        },
        Listing {
            name: "Happily Ever After",
            category: EventCategory::Fireworks,
            times: &["9:00 PM"],
            location: "Cinderella Castle",
            duration_minutes: 20,
        },
        Listing {
            name: "Mickey's Magical Friendship Faire",
            category: EventCategory::Show,
            times: &["10:30 AM", "1:30 PM", "4:30 PM"],
            location: "Cinderella Castle Forecourt Stage",
            duration_minutes: 20,
        },
    ];
    const EPCOT: &[Listing] = &[
        Listing {
            name: "Luminous The Symphony of Us",
            category: EventCategory::Fireworks,
            times: &["9:00 PM"],
            location: "World Showcase Lagoon",
            duration_minutes: 20,
        },
        Listing {
            name: "Disney and Pixar Short Film Festival",
            category: EventCategory::Show,
            times: &["Continuous"],
            location: "Imagination! Pavilion",
            duration_minutes: 18,
        },
    ];
    const HOLLYWOOD_STUDIOS: &[Listing] = &[
        Listing {
            name: "Fantasmic!",
            category: EventCategory::Fireworks,
            times: &["8:30 PM"],
            location: "Hollywood Hills Amphitheater",
            duration_minutes: 30,
        },
        Listing {
            name: "Indiana Jones Epic Stunt Spectacular!",
            category: EventCategory::Show,
            times: &["11:00 AM", "1:00 PM", "3:00 PM"],
            location: "Echo Lake",
            duration_minutes: 30,
        },
        Listing {
            name: "Beauty and the Beast - Live on Stage",
            category: EventCategory::Show,
            times: &["12:00 PM", "2:00 PM", "4:00 PM"],
            location: "Theater of the Stars",
            duration_minutes: 25,
        },
    ];
    const ANIMAL_KINGDOM: &[Listing] = &[
        Listing {
            name: "Festival of the Lion King",
            category: EventCategory::Show,
            times: &["10:00 AM", "12:00 PM", "2:30 PM", "4:30 PM"],
            location: "Harambe Theater",
            duration_minutes: 30,
        },
        Listing {
            name: "Finding Nemo: The Big Blue... and Beyond!",
            category: EventCategory::Show,
            times: &["11:00 AM", "1:00 PM", "3:30 PM"],
            location: "Theater in the Wild",
            duration_minutes: 25,
        },
    ];

    match park {
        ParkId::MagicKingdom => MAGIC_KINGDOM,
        ParkId::Epcot => EPCOT,
        ParkId::HollywoodStudios => HOLLYWOOD_STUDIOS,
        ParkId::AnimalKingdom => ANIMAL_KINGDOM,
    }
}

fn meets(park: ParkId) -> &'static [Meet] {
    const MAGIC_KINGDOM: &[Meet] = &[
        Meet {
            name: "Meet Mickey Mouse at Town Square Theater",
            characters: &["Mickey Mouse"],
            times: &["9:00 AM", "Continuous"],
            location: "Town Square Theater",
        },
        Meet {
            name: "Meet Princesses at Princess Fairytale Hall",
            characters: &["Cinderella", "Elena", "Rapunzel", "Tiana"],
            times: &["9:00 AM", "Continuous"],
            location: "Princess Fairytale Hall",
        },
    ];
    const EPCOT: &[Meet] = &[
        Meet {
            name: "Meet Anna and Elsa at Royal Sommerhus",
            characters: &["Anna", "Elsa"],
            times: &["11:00 AM", "Continuous"],
            location: "Norway Pavilion",
        },
        Meet {
            name: "Meet Belle in France",
            characters: &["Belle"],
            times: &["12:00 PM", "2:00 PM", "4:00 PM"],
            location: "France Pavilion",
        },
    ];
    const HOLLYWOOD_STUDIOS: &[Meet] = &[
        Meet {
            name: "Meet Olaf at Celebrity Spotlight",
            characters: &["Olaf"],
            times: &["10:00 AM", "Continuous"],
            location: "Echo Lake",
        },
        Meet {
            name: "Meet Woody and Jessie",
            characters: &["Woody", "Jessie"],
            times: &["9:30 AM", "Continuous"],
            location: "Toy Story Land",
        },
    ];
    const ANIMAL_KINGDOM: &[Meet] = &[
        Meet {
            name: "Meet Russell and Dug at Wilderness Explorers",
            characters: &["Russell", "Dug"],
            times: &["10:00 AM", "Continuous"],
            location: "Discovery Island",
        },
        Meet {
            name: "Adventurers Outpost Meet & Greet",
            characters: &["Mickey Mouse", "Minnie Mouse"],
            times: &["9:00 AM", "Continuous"],
            location: "Adventurers Outpost",
        },
    ];

    match park {
        ParkId::MagicKingdom => MAGIC_KINGDOM,
        ParkId::Epcot => EPCOT,
        ParkId::HollywoodStudios => HOLLYWOOD_STUDIOS,
        ParkId::AnimalKingdom => ANIMAL_KINGDOM,
    }
}

fn park_clock(park: ParkId) -> (&'static str, &'static str) {
    match park {
        ParkId::MagicKingdom => ("9:00 AM", "10:00 PM"),
        ParkId::Epcot => ("9:00 AM", "9:30 PM"),
        ParkId::HollywoodStudios => ("9:00 AM", "9:00 PM"),
        ParkId::AnimalKingdom => ("8:00 AM", "7:00 PM"),
    }
}

fn owned(values: &[&str]) -> Vec<String> {
    values.iter().map(|value| (*value).to_owned()).collect()
}

/// Typical wait times, all open, stamped with the current time.
pub fn wait_times(park: ParkId) -> Vec<AttractionStatus> {
    let now = UtcDateTime::now();
    rides(park)
        .iter()
        .map(|ride| AttractionStatus {
            id: ride.id.to_owned(),
            name: ride.name.to_owned(),
            land: ride.land.to_owned(),
            wait_minutes: ride.wait_minutes,
            is_open: true,
            express_eligible: ride.express,
            last_updated: now,
        })
        .collect()
}

/// Usual operating hours for the next seven days, starting today (UTC).
pub fn park_hours(park: ParkId) -> Vec<ParkHoursEntry> {
    let today = UtcDateTime::now();
    let (opening, closing) = park_clock(park);
    (0..HOURS_DAYS)
        .map(|offset| ParkHoursEntry {
            date: today.plus_days(offset).date_string(),
            opening_time: opening.to_owned(),
            closing_time: closing.to_owned(),
            day_type: String::from("Operating"),
            special_hours: None,
        })
        .collect()
}

/// Curated character meets; also the baseline merged into live results.
pub fn character_meets(park: ParkId) -> Vec<CharacterMeet> {
    meets(park)
        .iter()
        .map(|meet| CharacterMeet {
            event: EntertainmentEvent {
                id: crate::normalize::slugify(meet.name),
                name: meet.name.to_owned(),
                category: EventCategory::CharacterMeet,
                times: owned(meet.times),
                location: meet.location.to_owned(),
                duration_minutes: 0,
                source: CURATED_SOURCE.to_owned(),
            },
            characters: owned(meet.characters),
        })
        .collect()
}

/// The curated baseline appended after live entertainment records.
pub fn entertainment_baseline(park: ParkId) -> Vec<ScheduleItem> {
    character_meets(park)
        .into_iter()
        .map(ScheduleItem::from)
        .collect()
}

/// The complete curated schedule: shows, parades, fireworks and meets.
pub fn entertainment(park: ParkId) -> Vec<ScheduleItem> {
    listings(park)
        .iter()
        .map(|listing| {
            ScheduleItem::from(EntertainmentEvent {
                id: crate::normalize::slugify(listing.name),
                name: listing.name.to_owned(),
                category: listing.category,
                times: owned(listing.times),
                location: listing.location.to_owned(),
                duration_minutes: listing.duration_minutes,
                source: CURATED_SOURCE.to_owned(),
            })
        })
        .chain(entertainment_baseline(park))
        .collect()
}
