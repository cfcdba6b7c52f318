//! Convert KML placemark tracks and Private Radar flights into GPX files
use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};

pub mod cli;
pub mod config;
mod error;
pub mod export;
pub mod handlers;
pub mod kml;
pub mod services;
pub mod track;

pub use error::Error;

/// Parse an ISO-8601 timestamp, with or without an UTC offset.
///
/// Naive timestamps (no offset) are interpreted as UTC.
pub fn parse_iso_time(src: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
    match DateTime::parse_from_rfc3339(src) {
        Ok(time) => Ok(time.with_timezone(&Utc)),
        Err(_) => src
            .parse::<NaiveDateTime>()
            .map(|naive| Utc.from_utc_datetime(&naive)),
    }
}
