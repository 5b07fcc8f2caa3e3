use serde_json::{Map, Value};
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

use super::characters::character_names;
use super::classify::{classify_event, slugify};
use super::fields::{expect_object, list_under, minutes, strings, text};
use super::{FormatTag, NormalizeContext, NormalizeError};
use crate::{CharacterMeet, EntertainmentEvent, EventCategory, ScheduleItem};

const UNKNOWN_LOCATION: &str = "Unknown location";

/// `{ liveData: [{ name, entityType: "SHOW", showtimes: [{ startTime, endTime }] }] }`.
///
/// Showtimes are rendered in park-local 12-hour clock ("3:00 PM"); the
/// duration comes from the first showtime with both ends.
pub fn normalize_themeparks_showtimes(
    value: &Value,
    ctx: NormalizeContext<'_>,
) -> Result<Vec<ScheduleItem>, NormalizeError> {
    let format = FormatTag::ThemeParksShowtimes;
    expect_object(format, value)?;

    let items = list_under(format, value, &["liveData", "showtimes"])?
        .into_iter()
        .filter(|entity| {
            text(entity, &["entityType"])
                .map(|kind| kind.eq_ignore_ascii_case("SHOW"))
                .unwrap_or(true)
        })
        .filter_map(|entity| {
            let name = text(entity, &["name"])?;
            let windows = entity
                .get("showtimes")
                .and_then(Value::as_array)
                .map(Vec::as_slice)
                .unwrap_or(&[]);
            let windows = windows
                .iter()
                .filter_map(Value::as_object)
                .collect::<Vec<_>>();

            let times = windows
                .iter()
                .filter_map(|window| text(window, &["startTime"]))
                .filter_map(|start| twelve_hour_clock(&start))
                .collect::<Vec<_>>();
            let duration_minutes = windows
                .iter()
                .find_map(|window| window_minutes(window))
                .unwrap_or(0);

            Some(build_item(
                name,
                times,
                text(entity, &["location", "land", "area"]),
                duration_minutes,
                ctx,
            ))
        })
        .collect();

    Ok(items)
}

/// `{ entertainment: [{ name, times, location, duration }] }`.
///
/// `times` may be a list or a single string such as "Continuous"; both are
/// passed through untouched.
pub fn normalize_disney_entertainment(
    value: &Value,
    ctx: NormalizeContext<'_>,
) -> Result<Vec<ScheduleItem>, NormalizeError> {
    let format = FormatTag::DisneyEntertainment;
    expect_object(format, value)?;

    let items = list_under(format, value, &["entertainment", "events"])?
        .into_iter()
        .filter_map(|entry| {
            let name = text(entry, &["name", "title"])?;
            let times = match entry.get("times") {
                Some(Value::String(single)) if !single.trim().is_empty() => {
                    vec![single.trim().to_owned()]
                }
                other => strings(other),
            };

            Some(build_item(
                name,
                times,
                text(entry, &["location", "venue"]),
                minutes(entry.get("duration").or_else(|| entry.get("durationMinutes"))),
                ctx,
            ))
        })
        .collect();

    Ok(items)
}

fn build_item(
    name: String,
    times: Vec<String>,
    location: Option<String>,
    duration_minutes: u32,
    ctx: NormalizeContext<'_>,
) -> ScheduleItem {
    let category = classify_event(&name);
    let event = EntertainmentEvent {
        id: slugify(&name),
        name,
        category,
        times,
        location: location.unwrap_or_else(|| UNKNOWN_LOCATION.to_owned()),
        duration_minutes,
        source: ctx.source.to_owned(),
    };

    if category == EventCategory::CharacterMeet {
        let characters = character_names(&event.name);
        ScheduleItem::CharacterMeet(CharacterMeet { event, characters })
    } else {
        ScheduleItem::Event(event)
    }
}

fn window_minutes(window: &Map<String, Value>) -> Option<u32> {
    let start = OffsetDateTime::parse(&text(window, &["startTime"])?, &Rfc3339).ok()?;
    let end = OffsetDateTime::parse(&text(window, &["endTime"])?, &Rfc3339).ok()?;
    let minutes = (end - start).whole_minutes();
    u32::try_from(minutes).ok().filter(|minutes| *minutes > 0)
}

/// "3:00 PM" from the local wall-clock part of an ISO timestamp.
fn twelve_hour_clock(timestamp: &str) -> Option<String> {
    let hour = timestamp.get(11..13)?.parse::<u8>().ok()?;
    let minute = timestamp.get(14..16)?.parse::<u8>().ok()?;
    if hour > 23 || minute > 59 {
        return None;
    }
    let suffix = if hour < 12 { "AM" } else { "PM" };
    let hour = match hour % 12 {
        0 => 12,
        other => other,
    };
    Some(format!("{hour}:{minute:02} {suffix}"))
}
