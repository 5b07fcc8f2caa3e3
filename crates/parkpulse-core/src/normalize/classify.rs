use crate::EventCategory;

const PARADE_TERMS: &[&str] = &["parade", "cavalcade"];

/// Nighttime spectaculars rarely say "fireworks" in their title.
const FIREWORKS_TERMS: &[&str] = &[
    "fireworks",
    "happily ever after",
    "harmonious",
    "luminous",
    "epcot forever",
    "fantasmic",
    "wondrous journeys",
    "enchantment",
    "nighttime spectacular",
];

const CHARACTER_TERMS: &[&str] = &["meet", "character"];

/// Category of an entertainment listing, by ordered substring match.
///
/// Parade terms win over fireworks terms, which win over meet terms;
/// anything else is a show.
pub fn classify_event(name: &str) -> EventCategory {
    let name = name.to_lowercase();
    let contains_any = |terms: &[&str]| terms.iter().any(|term| name.contains(term));

    if contains_any(PARADE_TERMS) {
        EventCategory::Parade
    } else if contains_any(FIREWORKS_TERMS) {
        EventCategory::Fireworks
    } else if contains_any(CHARACTER_TERMS) {
        EventCategory::CharacterMeet
    } else {
        EventCategory::Show
    }
}

/// Stable identifier from a display name: lowercase alphanumerics joined by `_`.
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    for ch in name.chars() {
        if ch.is_ascii_alphanumeric() {
            slug.push(ch.to_ascii_lowercase());
        } else if ch != '\'' && !slug.is_empty() && !slug.ends_with('_') {
            slug.push('_');
        }
    }
    while slug.ends_with('_') {
        slug.pop();
    }
    slug
}
