//! Database models shared across the lead repository.
//!
//! SQLite stores every timestamp in UTC (`CURRENT_TIMESTAMP`, `Utc::now()`).
//! Rows are converted to the server's local time on the way out, so domain
//! timestamps and [`chrono::Local`] dates share one calendar.

use chrono::{Local, NaiveDateTime, TimeZone};

#[cfg(feature = "server")]
pub mod auth;
#[cfg(feature = "server")]
pub mod config;

pub mod activity_log;
pub mod lead;
pub mod note;
pub mod user;
pub mod work;

/// Stored UTC timestamp as wall-clock time in `zone`.
pub fn in_zone<Tz: TimeZone>(at_utc: NaiveDateTime, zone: &Tz) -> NaiveDateTime {
    zone.from_utc_datetime(&at_utc).naive_local()
}

/// Stored UTC timestamp as the server's local time.
pub fn local_time(at_utc: NaiveDateTime) -> NaiveDateTime {
    in_zone(at_utc, &Local)
}
