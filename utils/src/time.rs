//! Time formatting helpers.

use chrono::{DateTime, TimeZone};

/// Format the kiosk header clock as `HH:MM-DD.MM.YY`.
pub fn format_clock<Tz: TimeZone>(at: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    at.format("%H:%M-%d.%m.%y").to_string()
}
