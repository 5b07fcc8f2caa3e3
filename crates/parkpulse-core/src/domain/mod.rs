//! # Domain Models
//!
//! Canonical record shapes produced by the normalizers.
//!
//! | Type | Description |
//! |------|-------------|
//! | [`AttractionStatus`] | Live wait time and open flag for a ride |
//! | [`EntertainmentEvent`] | Show, parade, fireworks or meet with showtimes |
//! | [`CharacterMeet`] | Meet-and-greet plus the characters appearing |
//! | [`ScheduleItem`] | Either of the two above, as merged by the aggregator |
//! | [`EntertainmentBundle`] | Merged schedule plus its character-meet view |
//! | [`ParkHoursEntry`] | Opening hours for one day |
//! | [`DataDomain`] | The four independent data categories |
//! | [`UtcDateTime`] | UTC timestamp |
//!
//! Identifiers are stable across refreshes: attractions keep the upstream
//! id, entertainment records use a slug of their display name so the same
//! show reported by two upstreams collides on purpose.

mod models;
mod timestamp;

pub use models::{
    AttractionStatus, CharacterMeet, DataDomain, EntertainmentBundle, EntertainmentEvent,
    EventCategory, ParkHoursEntry, ScheduleItem,
};
pub use timestamp::{iso_date, UtcDateTime};
