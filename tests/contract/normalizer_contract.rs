//! Contract tests shared by every upstream normalizer.
//!
//! Object-shaped input never fails, however sparse; non-object input is a
//! shape error the acquisition layer turns into a source failure.

use parkpulse_core::normalize::{character_names, normalize_character_html};
use parkpulse_core::{
    classify_event, normalize, EventCategory, FormatTag, NormalizeContext, NormalizeError,
    Normalized, UtcDateTime,
};

const JSON_FORMATS: [FormatTag; 6] = [
    FormatTag::QueueTimesLands,
    FormatTag::ThemeParksLive,
    FormatTag::ThemeParksSchedule,
    FormatTag::DisneyCalendar,
    FormatTag::ThemeParksShowtimes,
    FormatTag::DisneyEntertainment,
];

fn ctx() -> NormalizeContext<'static> {
    NormalizeContext::new(
        "contract",
        UtcDateTime::parse("2024-06-01T16:00:00Z").expect("valid timestamp"),
    )
}

#[test]
fn every_json_normalizer_accepts_an_empty_object() {
    for format in JSON_FORMATS {
        let normalized = normalize(format, "{}", ctx())
            .unwrap_or_else(|error| panic!("{format} rejected an empty object: {error}"));
        assert!(normalized.is_empty(), "{format} invented records");
        assert_eq!(normalized.len(), 0);
    }
}

#[test]
fn every_json_normalizer_tolerates_entries_with_missing_fields() {
    let bodies = [
        (FormatTag::QueueTimesLands, r#"{"lands":[{"rides":[{}, {"name": 7}]}], "rides": null}"#),
        (FormatTag::ThemeParksLive, r#"{"liveData":[{}, {"id": "x"}, "noise"]}"#),
        (FormatTag::ThemeParksSchedule, r#"{"schedule":[{}, {"date": "2024-06-01"}]}"#),
        (FormatTag::DisneyCalendar, r#"{"parkHours":[{}, {"date": "2024-06-01"}]}"#),
        (FormatTag::ThemeParksShowtimes, r#"{"liveData":[{"entityType": "SHOW"}]}"#),
        (FormatTag::DisneyEntertainment, r#"{"entertainment":[{"times": 5}]}"#),
    ];

    for (format, body) in bodies {
        let result = normalize(format, body, ctx());
        assert!(result.is_ok(), "{format} failed on sparse input: {result:?}");
    }
}

#[test]
fn every_json_normalizer_rejects_non_object_input() {
    for format in JSON_FORMATS {
        let error = normalize(format, r#""maintenance""#, ctx())
            .expect_err("a JSON string is the wrong shape");
        assert!(
            matches!(error, NormalizeError::WrongShape { found: "string", .. }),
            "{format} gave {error:?}"
        );
    }
}

#[test]
fn invalid_json_is_reported_not_panicked() {
    for format in JSON_FORMATS {
        let error = normalize(format, "<html>503</html>", ctx()).expect_err("not JSON");
        assert!(matches!(error, NormalizeError::InvalidJson { .. }));
    }
}

#[test]
fn missing_wait_time_defaults_to_zero_and_missing_open_flag_to_closed() {
    let normalized = normalize(
        FormatTag::QueueTimesLands,
        r#"{"lands":[{"name":"Adventureland","rides":[{"id":1,"name":"Jungle Cruise"}]}]}"#,
        ctx(),
    )
    .expect("object input");

    let rides = normalized.into_attractions().expect("attractions");
    assert_eq!(rides[0].wait_minutes, 0);
    assert!(!rides[0].is_open);
    assert!(!rides[0].express_eligible);
    assert_eq!(rides[0].last_updated, ctx().fetched_at);
}

#[test]
fn operating_status_means_open_regardless_of_case() {
    let normalized = normalize(
        FormatTag::ThemeParksLive,
        r#"[{"id":"a","name":"Dumbo","status":"OPERATING","waitTime":10},
            {"id":"b","name":"Barnstormer","status":"Operating"},
            {"id":"c","name":"Carousel","status":"REFURBISHMENT","waitTime":-5}]"#,
        ctx(),
    )
    .expect("bare arrays are accepted");

    let rides = normalized.into_attractions().expect("attractions");
    assert!(rides[0].is_open);
    assert!(rides[1].is_open);
    assert!(!rides[2].is_open);
    assert_eq!(rides[2].wait_minutes, 0);
}

#[test]
fn entertainment_names_are_classified_in_precedence_order() {
    assert_eq!(classify_event("Festival of Fantasy Parade"), EventCategory::Parade);
    assert_eq!(classify_event("Happily Ever After"), EventCategory::Fireworks);
    assert_eq!(
        classify_event("Mickey Mouse Meet & Greet"),
        EventCategory::CharacterMeet
    );
    assert_eq!(classify_event("Country Bear Jamboree"), EventCategory::Show);
}

#[test]
fn classified_meets_carry_character_names() {
    let normalized = normalize(
        FormatTag::DisneyEntertainment,
        r#"{"entertainment":[{"name":"Mickey Mouse Meet & Greet","times":"Continuous"}]}"#,
        ctx(),
    )
    .expect("object input");

    let Normalized::Schedule(items) = normalized else {
        panic!("entertainment normalizes to a schedule");
    };
    let meet = items[0].to_character_meet().expect("classified as a meet");
    assert_eq!(meet.characters, vec!["Mickey Mouse"]);
    assert_eq!(meet.event.times, vec!["Continuous"]);
    assert_eq!(meet.event.location, "Unknown location");
}

#[test]
fn character_names_are_derived_from_titles() {
    assert_eq!(
        character_names("Meet Anna and Elsa at Royal Sommerhus"),
        vec!["Anna", "Elsa"]
    );
    assert_eq!(character_names("Mickey Mouse Meet & Greet"), vec!["Mickey Mouse"]);
    assert_eq!(
        character_names("Meet Chip, Dale & Pluto"),
        vec!["Chip", "Dale", "Pluto"]
    );
}

#[test]
fn character_page_supports_heading_sibling_layout() {
    let html = r#"<html><body>
        <h2>Meet Belle in France</h2>
        <p>France Pavilion</p>
        <ul><li>12:00 PM</li><li>2:00 PM</li></ul>
        <h2>Park Notices</h2>
        <p>No times here</p>
    </body></html>"#;

    let meets = normalize_character_html(html, ctx());

    assert_eq!(meets.len(), 1);
    assert_eq!(meets[0].id(), "meet_belle_in_france");
    assert_eq!(meets[0].event.location, "France Pavilion");
    assert_eq!(meets[0].event.times, vec!["12:00 PM", "2:00 PM"]);
    assert_eq!(meets[0].event.category, EventCategory::CharacterMeet);
}

#[test]
fn character_page_without_known_layout_yields_nothing() {
    let meets = normalize_character_html("<html><body><table></table></body></html>", ctx());
    assert!(meets.is_empty());
}
