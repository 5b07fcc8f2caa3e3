use std::collections::HashSet;

use serde_json::{Map, Value};

use super::fields::{expect_object, flag, identifier, list_under, minutes, text};
use super::{FormatTag, NormalizeContext, NormalizeError};
use crate::{AttractionStatus, UtcDateTime};

const UNKNOWN_LAND: &str = "Unknown";

/// `{ lands: [{ name, rides: [...] }], rides: [...] }`.
///
/// Rides listed outside any land are kept with an unknown land.
pub fn normalize_queue_times(
    value: &Value,
    ctx: NormalizeContext<'_>,
) -> Result<Vec<AttractionStatus>, NormalizeError> {
    let format = FormatTag::QueueTimesLands;
    let root = expect_object(format, value)?;

    let mut seen = HashSet::new();
    let mut attractions = Vec::new();

    let lands = root
        .get("lands")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or(&[]);
    for land in lands.iter().filter_map(Value::as_object) {
        let land_name = text(land, &["name"]).unwrap_or_else(|| UNKNOWN_LAND.to_owned());
        let rides = land
            .get("rides")
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or(&[]);
        for ride in rides.iter().filter_map(Value::as_object) {
            if let Some(attraction) = queue_times_ride(ride, &land_name, ctx) {
                if seen.insert(attraction.id.clone()) {
                    attractions.push(attraction);
                }
            }
        }
    }

    for ride in list_under(format, value, &["rides"])? {
        if let Some(attraction) = queue_times_ride(ride, UNKNOWN_LAND, ctx) {
            if seen.insert(attraction.id.clone()) {
                attractions.push(attraction);
            }
        }
    }

    Ok(attractions)
}

fn queue_times_ride(
    ride: &Map<String, Value>,
    land: &str,
    ctx: NormalizeContext<'_>,
) -> Option<AttractionStatus> {
    let name = text(ride, &["name"])?;
    let id = identifier(ride, &["id"]).unwrap_or_else(|| super::slugify(&name));

    Some(AttractionStatus {
        id,
        name,
        land: land.to_owned(),
        wait_minutes: minutes(ride.get("wait_time")),
        is_open: flag(ride, "is_open"),
        express_eligible: flag(ride, "express_eligible"),
        last_updated: timestamp(ride, "last_updated", ctx),
    })
}

/// `{ liveData: [...] }` or a bare array of live entities.
///
/// Only `ATTRACTION` entities are kept; entities without a type are assumed
/// to be attractions.
pub fn normalize_themeparks_live(
    value: &Value,
    ctx: NormalizeContext<'_>,
) -> Result<Vec<AttractionStatus>, NormalizeError> {
    let mut seen = HashSet::new();
    let mut attractions = Vec::new();

    for entity in list_under(FormatTag::ThemeParksLive, value, &["liveData", "data"])? {
        let is_attraction = text(entity, &["entityType"])
            .map(|kind| kind.eq_ignore_ascii_case("ATTRACTION"))
            .unwrap_or(true);
        if !is_attraction {
            continue;
        }

        let Some(name) = text(entity, &["name"]) else {
            continue;
        };
        let id = identifier(entity, &["id"]).unwrap_or_else(|| super::slugify(&name));
        if !seen.insert(id.clone()) {
            continue;
        }

        let queue = entity.get("queue").and_then(Value::as_object);
        let wait = entity.get("waitTime").or_else(|| {
            queue
                .and_then(|queue| queue.get("STANDBY"))
                .and_then(|standby| standby.get("waitTime"))
        });
        let express_eligible = flag(entity, "lightningLane")
            || queue
                .map(|queue| queue.contains_key("RETURN_TIME") || queue.contains_key("PAID_RETURN_TIME"))
                .unwrap_or(false);

        attractions.push(AttractionStatus {
            id,
            name,
            land: text(entity, &["land", "area"]).unwrap_or_else(|| UNKNOWN_LAND.to_owned()),
            wait_minutes: minutes(wait),
            is_open: text(entity, &["status"])
                .map(|status| status.eq_ignore_ascii_case("operating"))
                .unwrap_or(false),
            express_eligible,
            last_updated: timestamp(entity, "lastUpdated", ctx),
        });
    }

    Ok(attractions)
}

fn timestamp(map: &Map<String, Value>, key: &str, ctx: NormalizeContext<'_>) -> UtcDateTime {
    text(map, &[key])
        .and_then(|value| UtcDateTime::parse_lenient(&value))
        .unwrap_or(ctx.fetched_at)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn ctx() -> NormalizeContext<'static> {
        NormalizeContext::new(
            "test",
            UtcDateTime::parse("2024-06-01T12:00:00Z").expect("valid"),
        )
    }

    #[test]
    fn queue_times_reads_lands_and_defaults_missing_fields() {
        let body = json!({
            "lands": [
                {
                    "name": "Tomorrowland",
                    "rides": [
                        {"id": 130, "name": "Space Mountain", "wait_time": 65, "is_open": true,
                         "last_updated": "2024-06-01T11:55:00.000Z"},
                        {"id": 131, "name": "Tomorrowland Speedway"}
                    ]
                },
                {"rides": [{"id": 140, "name": "Jungle Cruise", "wait_time": -1, "is_open": false}]}
            ],
            "rides": [{"id": 130, "name": "Space Mountain (duplicate)"}]
        });

        let attractions = normalize_queue_times(&body, ctx()).expect("object input");

        assert_eq!(attractions.len(), 3);
        assert_eq!(attractions[0].id, "130");
        assert_eq!(attractions[0].land, "Tomorrowland");
        assert_eq!(attractions[0].wait_minutes, 65);
        assert!(attractions[0].is_open);
        assert_eq!(
            attractions[0].last_updated.format_rfc3339(),
            "2024-06-01T11:55:00Z"
        );

        assert_eq!(attractions[1].wait_minutes, 0);
        assert!(!attractions[1].is_open);
        assert_eq!(attractions[1].last_updated, ctx().fetched_at);

        assert_eq!(attractions[2].land, "Unknown");
        assert_eq!(attractions[2].wait_minutes, 0);
    }

    #[test]
    fn queue_times_rejects_non_object_root() {
        let err = normalize_queue_times(&json!([1, 2, 3]), ctx()).expect_err("array root");
        assert!(matches!(err, NormalizeError::WrongShape { found: "array", .. }));
    }

    #[test]
    fn themeparks_live_maps_status_and_queues() {
        let body = json!({
            "liveData": [
                {"id": "a1", "name": "Seven Dwarfs Mine Train", "entityType": "ATTRACTION",
                 "status": "OPERATING", "queue": {"STANDBY": {"waitTime": 80}, "PAID_RETURN_TIME": {}}},
                {"id": "a2", "name": "Haunted Mansion", "status": "Operating", "waitTime": 25,
                 "land": "Liberty Square"},
                {"id": "a3", "name": "Splash Mountain", "status": "CLOSED"},
                {"id": "s1", "name": "Festival of Fantasy Parade", "entityType": "SHOW"}
            ]
        });

        let attractions = normalize_themeparks_live(&body, ctx()).expect("object input");

        assert_eq!(attractions.len(), 3);
        assert_eq!(attractions[0].wait_minutes, 80);
        assert!(attractions[0].is_open);
        assert!(attractions[0].express_eligible);
        assert_eq!(attractions[0].land, "Unknown");

        assert_eq!(attractions[1].land, "Liberty Square");
        assert!(attractions[1].is_open);
        assert!(!attractions[1].express_eligible);

        assert!(!attractions[2].is_open);
        assert_eq!(attractions[2].wait_minutes, 0);
    }

    #[test]
    fn themeparks_live_without_list_is_empty() {
        let attractions =
            normalize_themeparks_live(&json!({"status": "ok"}), ctx()).expect("object input");
        assert!(attractions.is_empty());
    }
}
