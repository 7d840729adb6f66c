//! Time formatting helpers for kioskd
//!
//! The countdown itself is a plain counter of seconds; these helpers turn it
//! into the strings the terminal shows.

use chrono::{DateTime, Local};

/// Current local wall-clock time, used to timestamp events.
pub fn now() -> DateTime<Local> {
    Local::now()
}

/// Format a countdown as `HH:MM:SS`.
///
/// Hours are not wrapped, so a 100 hour balance shows as `100:00:00`.
pub fn format_countdown(seconds: u64) -> String {
    let hours = seconds / 3600;
    let minutes = (seconds % 3600) / 60;
    let secs = seconds % 60;
    format!("{:02}:{:02}:{:02}", hours, minutes, secs)
}

/// Whole minutes in `seconds`, rounded down, as used in purchase receipts.
pub fn whole_minutes(seconds: u64) -> u64 {
    seconds / 60
}
