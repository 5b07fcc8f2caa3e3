//! Character schedule page scraping.
//!
//! The page has shipped in more than one layout. Each layout is an
//! extraction strategy; strategies run in order and the first one that
//! yields records wins. A page no strategy recognizes yields no records.

use std::collections::HashSet;

use scraper::{ElementRef, Html, Selector};

use super::classify::slugify;
use super::NormalizeContext;
use crate::{CharacterMeet, EntertainmentEvent, EventCategory};

const UNKNOWN_LOCATION: &str = "Unknown location";

type Strategy = fn(&Html, NormalizeContext<'_>) -> Vec<CharacterMeet>;

const STRATEGIES: &[(&str, Strategy)] = &[
    ("container", container_layout),
    ("heading_siblings", heading_sibling_layout),
];

/// Character meets found in `html`, or an empty list.
pub fn normalize_character_html(html: &str, ctx: NormalizeContext<'_>) -> Vec<CharacterMeet> {
    let document = Html::parse_document(html);

    for (name, strategy) in STRATEGIES {
        let meets = dedupe(strategy(&document, ctx));
        if !meets.is_empty() {
            tracing::debug!(strategy = *name, meets = meets.len(), "character page parsed");
            return meets;
        }
    }

    tracing::debug!("character page layout not recognized");
    Vec::new()
}

fn selector(css: &'static str) -> Option<Selector> {
    match Selector::parse(css) {
        Ok(selector) => Some(selector),
        Err(error) => {
            tracing::error!(css, %error, "invalid built-in selector");
            None
        }
    }
}

fn element_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .collect::<Vec<_>>()
        .join(" ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

fn first_text(scope: ElementRef<'_>, selector: &Selector) -> Option<String> {
    scope
        .select(selector)
        .map(element_text)
        .find(|text| !text.is_empty())
}

fn all_text(scope: ElementRef<'_>, selector: &Selector) -> Vec<String> {
    scope
        .select(selector)
        .map(element_text)
        .filter(|text| !text.is_empty())
        .collect()
}

/// `<div class="character-card">` blocks with named child elements.
fn container_layout(document: &Html, ctx: NormalizeContext<'_>) -> Vec<CharacterMeet> {
    let (Some(cards), Some(names), Some(locations), Some(times), Some(roster)) = (
        selector(".character-card, .character-meet, div[data-character]"),
        selector(".character-name, h3, h4"),
        selector(".character-location, .location"),
        selector(".character-times li, .times li, .time"),
        selector(".character-list li"),
    ) else {
        return Vec::new();
    };

    document
        .select(&cards)
        .filter_map(|card| {
            let name = first_text(card, &names).or_else(|| {
                card.value()
                    .attr("data-character")
                    .map(str::trim)
                    .filter(|value| !value.is_empty())
                    .map(str::to_owned)
            })?;
            let characters = match all_text(card, &roster) {
                listed if !listed.is_empty() => listed,
                _ => character_names(&name),
            };
            Some(meet(
                name,
                first_text(card, &locations),
                all_text(card, &times),
                characters,
                ctx,
            ))
        })
        .collect()
}

/// `<h3>Title</h3><p>Location</p><ul><li>time</li></ul>` runs.
///
/// Only headings followed by at least one time are meets.
fn heading_sibling_layout(document: &Html, ctx: NormalizeContext<'_>) -> Vec<CharacterMeet> {
    let (Some(headings), Some(items)) = (selector("h2, h3"), selector("li")) else {
        return Vec::new();
    };

    document
        .select(&headings)
        .filter_map(|heading| {
            let name = element_text(heading);
            if name.is_empty() {
                return None;
            }

            let mut location = None;
            let mut times = Vec::new();
            for sibling in heading.next_siblings().filter_map(ElementRef::wrap) {
                match sibling.value().name() {
                    "h1" | "h2" | "h3" => break,
                    "p" if location.is_none() => {
                        let text = element_text(sibling);
                        if !text.is_empty() {
                            location = Some(text);
                        }
                    }
                    "ul" | "ol" => times.extend(all_text(sibling, &items)),
                    _ => {}
                }
            }

            if times.is_empty() {
                return None;
            }
            let characters = character_names(&name);
            Some(meet(name, location, times, characters, ctx))
        })
        .collect()
}

fn meet(
    name: String,
    location: Option<String>,
    times: Vec<String>,
    characters: Vec<String>,
    ctx: NormalizeContext<'_>,
) -> CharacterMeet {
    CharacterMeet {
        event: EntertainmentEvent {
            id: slugify(&name),
            name,
            category: EventCategory::CharacterMeet,
            times,
            location: location.unwrap_or_else(|| UNKNOWN_LOCATION.to_owned()),
            duration_minutes: 0,
            source: ctx.source.to_owned(),
        },
        characters,
    }
}

fn dedupe(meets: Vec<CharacterMeet>) -> Vec<CharacterMeet> {
    let mut seen = HashSet::new();
    meets
        .into_iter()
        .filter(|meet| !meet.id().is_empty() && seen.insert(meet.id().to_owned()))
        .collect()
}

const TITLE_PREFIXES: &[&str] = &["meet "];
const TITLE_SUFFIXES: &[&str] = &[
    " meet & greet",
    " meet and greet",
    " meet-and-greet",
    " character meet",
    " meet",
];
const NAME_SEPARATORS: &[&str] = &[", ", " and ", " & "];

/// Character names implied by a meet title.
///
/// "Meet Anna and Elsa at Royal Sommerhus" gives `["Anna", "Elsa"]`;
/// "Mickey Mouse Meet & Greet" gives `["Mickey Mouse"]`.
pub fn character_names(title: &str) -> Vec<String> {
    let mut rest = title.trim();

    for prefix in TITLE_PREFIXES {
        if starts_with_ignore_case(rest, prefix) {
            rest = rest[prefix.len()..].trim_start();
        }
    }
    if let Some(at) = find_ignore_case(rest, " at ") {
        rest = &rest[..at];
    }
    for suffix in TITLE_SUFFIXES {
        if ends_with_ignore_case(rest, suffix) {
            rest = &rest[..rest.len() - suffix.len()];
        }
    }

    let mut parts = vec![rest];
    for separator in NAME_SEPARATORS {
        parts = parts
            .into_iter()
            .flat_map(|part| split_ignore_case(part, separator))
            .collect();
    }

    parts
        .into_iter()
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(str::to_owned)
        .collect()
}

fn starts_with_ignore_case(text: &str, prefix: &str) -> bool {
    text.get(..prefix.len())
        .map(|head| head.eq_ignore_ascii_case(prefix))
        .unwrap_or(false)
}

fn ends_with_ignore_case(text: &str, suffix: &str) -> bool {
    text.len()
        .checked_sub(suffix.len())
        .and_then(|start| text.get(start..))
        .map(|tail| tail.eq_ignore_ascii_case(suffix))
        .unwrap_or(false)
}

fn find_ignore_case(text: &str, needle: &str) -> Option<usize> {
    text.to_ascii_lowercase().find(needle)
}

fn split_ignore_case<'a>(text: &'a str, separator: &str) -> Vec<&'a str> {
    let lowered = text.to_ascii_lowercase();
    let mut parts = Vec::new();
    let mut start = 0;
    for (index, _) in lowered.match_indices(separator) {
        parts.push(&text[start..index]);
        start = index + separator.len();
    }
    parts.push(&text[start..]);
    parts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::UtcDateTime;

    fn ctx() -> NormalizeContext<'static> {
        NormalizeContext::new(
            "character_schedule",
            UtcDateTime::parse("2024-06-01T12:00:00Z").expect("valid"),
        )
    }

    #[test]
    fn container_layout_reads_cards() {
        let html = r#"
            <html><body>
              <div class="character-card">
                <h3 class="character-name">Meet Anna and Elsa at Royal Sommerhus</h3>
                <span class="character-location">Norway Pavilion</span>
                <ul class="character-times"><li>10:00 AM</li><li>2:00 PM</li></ul>
              </div>
              <div class="character-card">
                <h3>Princess Tiana</h3>
                <ul class="character-list"><li>Tiana</li><li>Naveen</li></ul>
                <span class="time">Continuous</span>
              </div>
            </body></html>
        "#;

        let meets = normalize_character_html(html, ctx());

        assert_eq!(meets.len(), 2);
        assert_eq!(meets[0].id(), "meet_anna_and_elsa_at_royal_sommerhus");
        assert_eq!(meets[0].event.location, "Norway Pavilion");
        assert_eq!(meets[0].event.times, vec!["10:00 AM", "2:00 PM"]);
        assert_eq!(meets[0].characters, vec!["Anna", "Elsa"]);
        assert_eq!(meets[0].event.source, "character_schedule");

        assert_eq!(meets[1].event.location, "Unknown location");
        assert_eq!(meets[1].characters, vec!["Tiana", "Naveen"]);
        assert_eq!(meets[1].event.times, vec!["Continuous"]);
    }

    #[test]
    fn heading_layout_reads_sibling_runs() {
        let html = r#"
            <main>
              <h2>Character Schedule</h2>
              <p>Times subject to change.</p>
              <h3>Mickey Mouse Meet &amp; Greet</h3>
              <p>Town Square Theater</p>
              <ul><li>9:00 AM</li><li>1:30 PM</li></ul>
              <h3>Gaston</h3>
              <p>Fantasyland</p>
              <ul><li>11:00 AM</li></ul>
            </main>
        "#;

        let meets = normalize_character_html(html, ctx());

        assert_eq!(meets.len(), 2);
        assert_eq!(meets[0].event.name, "Mickey Mouse Meet & Greet");
        assert_eq!(meets[0].event.location, "Town Square Theater");
        assert_eq!(meets[0].characters, vec!["Mickey Mouse"]);
        assert_eq!(meets[1].id(), "gaston");
        assert_eq!(meets[1].event.times, vec!["11:00 AM"]);
    }

    #[test]
    fn unrecognized_page_yields_nothing() {
        let html = "<html><body><p>Please enable JavaScript.</p></body></html>";
        assert!(normalize_character_html(html, ctx()).is_empty());
        assert!(normalize_character_html("", ctx()).is_empty());
    }

    #[test]
    fn character_names_from_titles() {
        assert_eq!(
            character_names("Meet Anna and Elsa at Royal Sommerhus"),
            vec!["Anna", "Elsa"]
        );
        assert_eq!(
            character_names("Mickey Mouse Meet & Greet"),
            vec!["Mickey Mouse"]
        );
        assert_eq!(
            character_names("Meet Chip, Dale & Pluto"),
            vec!["Chip", "Dale", "Pluto"]
        );
    }
}
