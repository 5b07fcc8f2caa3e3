use serde_json::{Map, Value};

use super::fields::{expect_object, list_under, text};
use super::{FormatTag, NormalizeError};
use crate::{iso_date, ParkHoursEntry};

/// `{ schedule: [{ date, type, openingTime, closingTime, description }] }`.
///
/// Windows are grouped per date in first-seen order. The `OPERATING` window
/// supplies the day's hours as `HH:MM`; any other typed window on the same
/// date becomes its special-hours annotation. Dates with only annotations
/// are dropped.
pub fn normalize_themeparks_schedule(value: &Value) -> Result<Vec<ParkHoursEntry>, NormalizeError> {
    let format = FormatTag::ThemeParksSchedule;
    expect_object(format, value)?;

    let mut days: Vec<DayBuilder> = Vec::new();
    for window in list_under(format, value, &["schedule"])? {
        let Some(date) = text(window, &["date"])
            .and_then(|date| iso_date(&date))
            .or_else(|| text(window, &["openingTime"]).and_then(|time| iso_date(&time)))
        else {
            continue;
        };

        let index = match days.iter().position(|day| day.date == date) {
            Some(index) => index,
            None => {
                days.push(DayBuilder::new(date));
                days.len() - 1
            }
        };
        days[index].absorb(window);
    }

    Ok(days.into_iter().filter_map(DayBuilder::finish).collect())
}

struct DayBuilder {
    date: String,
    hours: Option<(String, String, String)>,
    annotations: Vec<String>,
}

impl DayBuilder {
    fn new(date: String) -> Self {
        Self {
            date,
            hours: None,
            annotations: Vec::new(),
        }
    }

    fn absorb(&mut self, window: &Map<String, Value>) {
        let kind = text(window, &["type"]).unwrap_or_else(|| String::from("OPERATING"));
        let opening = text(window, &["openingTime"]).and_then(|time| clock(&time));
        let closing = text(window, &["closingTime"]).and_then(|time| clock(&time));

        match kind.to_ascii_uppercase().as_str() {
            "OPERATING" => {
                if let (None, Some(opening), Some(closing)) = (&self.hours, opening, closing) {
                    self.hours = Some((opening, closing, String::from("operating")));
                }
            }
            "CLOSED" => {
                if self.hours.is_none() {
                    self.hours = Some((
                        String::from("Closed"),
                        String::from("Closed"),
                        String::from("closed"),
                    ));
                }
            }
            _ => {
                let label = text(window, &["description"]).unwrap_or_else(|| title_case(&kind));
                let annotation = match (opening, closing) {
                    (Some(opening), Some(closing)) => format!("{label} {opening}-{closing}"),
                    _ => label,
                };
                self.annotations.push(annotation);
            }
        }
    }

    fn finish(self) -> Option<ParkHoursEntry> {
        let (opening_time, closing_time, day_type) = self.hours?;
        Some(ParkHoursEntry {
            date: self.date,
            opening_time,
            closing_time,
            day_type,
            special_hours: (!self.annotations.is_empty()).then(|| self.annotations.join("; ")),
        })
    }
}

/// `HH:MM` from an ISO timestamp such as `2024-06-01T09:00:00-04:00`.
fn clock(timestamp: &str) -> Option<String> {
    let slice = timestamp.get(11..16)?;
    let valid = slice.as_bytes()[2] == b':'
        && slice
            .bytes()
            .enumerate()
            .all(|(index, byte)| index == 2 || byte.is_ascii_digit());
    valid.then(|| slice.to_owned())
}

fn title_case(kind: &str) -> String {
    kind.split('_')
        .filter(|word| !word.is_empty())
        .map(|word| {
            let lower = word.to_ascii_lowercase();
            let mut chars = lower.chars();
            match chars.next() {
                Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// `{ parkHours: [{ date, startTime, endTime, type, specialHours }] }`.
///
/// Times are passed through as published ("9:00 AM").
pub fn normalize_disney_calendar(value: &Value) -> Result<Vec<ParkHoursEntry>, NormalizeError> {
    let format = FormatTag::DisneyCalendar;
    expect_object(format, value)?;

    let entries = list_under(format, value, &["parkHours", "hours"])?
        .into_iter()
        .filter_map(|day| {
            Some(ParkHoursEntry {
                date: text(day, &["date"]).and_then(|date| iso_date(&date))?,
                opening_time: text(day, &["startTime", "openingTime"])?,
                closing_time: text(day, &["endTime", "closingTime"])?,
                day_type: text(day, &["type"]).unwrap_or_else(|| String::from("Operating")),
                special_hours: text(day, &["specialHours"]),
            })
        })
        .collect();

    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn schedule_groups_windows_by_date() {
        let body = json!({
            "schedule": [
                {"date": "2024-06-01", "type": "OPERATING",
                 "openingTime": "2024-06-01T09:00:00-04:00", "closingTime": "2024-06-01T23:00:00-04:00"},
                {"date": "2024-06-01", "type": "EXTRA_HOURS", "description": "Early Entry",
                 "openingTime": "2024-06-01T08:30:00-04:00", "closingTime": "2024-06-01T09:00:00-04:00"},
                {"date": "2024-06-02", "type": "TICKETED_EVENT"},
                {"type": "OPERATING",
                 "openingTime": "2024-06-03T08:00:00-04:00", "closingTime": "2024-06-03T22:00:00-04:00"},
                {"date": "not a date", "type": "OPERATING"}
            ]
        });

        let days = normalize_themeparks_schedule(&body).expect("object input");

        assert_eq!(days.len(), 2);
        assert_eq!(days[0].date, "2024-06-01");
        assert_eq!(days[0].opening_time, "09:00");
        assert_eq!(days[0].closing_time, "23:00");
        assert_eq!(days[0].special_hours.as_deref(), Some("Early Entry 08:30-09:00"));
        assert_eq!(days[1].date, "2024-06-03");
        assert_eq!(days[1].special_hours, None);
    }

    #[test]
    fn calendar_passes_times_through() {
        let body = json!({
            "parkHours": [
                {"date": "2024-06-01", "startTime": "9:00 AM", "endTime": "11:00 PM",
                 "specialHours": "Extended Evening Hours"},
                {"date": "2024-06-02", "startTime": "9:00 AM"}
            ]
        });

        let days = normalize_disney_calendar(&body).expect("object input");

        assert_eq!(days.len(), 1);
        assert_eq!(days[0].opening_time, "9:00 AM");
        assert_eq!(days[0].day_type, "Operating");
        assert_eq!(days[0].special_hours.as_deref(), Some("Extended Evening Hours"));
    }

    #[test]
    fn calendar_rejects_array_root() {
        assert!(normalize_disney_calendar(&json!([])).is_err());
    }

    #[test]
    fn title_case_reads_upstream_enums() {
        assert_eq!(title_case("TICKETED_EVENT"), "Ticketed Event");
    }
}
