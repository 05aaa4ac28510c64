use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Local, NaiveDateTime};

/// `Jan 5 2024 3:47 PM`: short month, numeric day and year, 12-hour time.
pub const DISPLAY_FORMAT: &str = "%b %-d %Y %-I:%M %p";

pub const EDITED_PREFIX: &str = "(Edited)";

// The server serializes with `%b %d %Y, %I:%M %p`; the rest cover ISO payloads.
const SERVER_FORMATS: &[&str] = &[
    "%b %d %Y, %I:%M %p",
    "%b %d %Y %I:%M %p",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
];

pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Local).naive_local());
    }
    SERVER_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
}

/// Formats a server timestamp for display, falling back to the raw text
/// when it cannot be parsed.
pub fn format_timestamp(raw: &str) -> String {
    parse_timestamp(raw)
        .map(|dt| dt.format(DISPLAY_FORMAT).to_string())
        .unwrap_or_else(|| raw.to_string())
}

pub fn edited_label(formatted: &str) -> String {
    format!("{} {}", EDITED_PREFIX, formatted)
}

pub fn now_edited_label() -> String {
    edited_label(&Local::now().naive_local().format(DISPLAY_FORMAT).to_string())
}

pub fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_iso_without_comma_after_year() {
        assert_eq!(format_timestamp("2024-01-05T15:47:00"), "Jan 5 2024 3:47 PM");
    }

    #[test]
    fn formats_server_serialized_timestamp() {
        assert_eq!(format_timestamp("Jan 05 2024, 03:47 PM"), "Jan 5 2024 3:47 PM");
        assert_eq!(format_timestamp("Dec 31 2023, 12:05 AM"), "Dec 31 2023 12:05 AM");
    }

    #[test]
    fn unparseable_timestamp_is_shown_verbatim() {
        assert_eq!(format_timestamp("yesterday"), "yesterday");
        assert!(parse_timestamp("yesterday").is_none());
    }

    #[test]
    fn edited_label_starts_with_prefix() {
        assert!(now_edited_label().starts_with("(Edited) "));
        assert_eq!(edited_label("Jan 5 2024 3:47 PM"), "(Edited) Jan 5 2024 3:47 PM");
    }
}
