//! ---
//! ems_section: "01-core-functionality"
//! ems_subsection: "module"
//! ems_type: "source"
//! ems_scope: "code"
//! ems_description: "Shared primitives and utilities for the core runtime."
//! ems_version: "v0.0.0-prealpha"
//! ems_owner: "tbd"
//! ---
use chrono::{DateTime, Local, TimeZone};

/// Render a wall-clock time label such as `3:04:05 PM`.
pub fn time_label<Tz: TimeZone>(at: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    at.format("%-I:%M:%S %p").to_string()
}

/// Render a date and time label such as `6/1/2024, 3:04:05 PM`.
pub fn date_time_label<Tz: TimeZone>(at: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    at.format("%-m/%-d/%Y, %-I:%M:%S %p").to_string()
}

/// Milliseconds since the Unix epoch, clamped at zero for pre-epoch clocks.
pub fn epoch_millis<Tz: TimeZone>(at: &DateTime<Tz>) -> u64 {
    u64::try_from(at.timestamp_millis()).unwrap_or(0)
}

/// Current local time.
pub fn local_now() -> DateTime<Local> {
    Local::now()
}
