//! Duration and speed formatting for display.
//!
//! All functions take whole seconds (or a ready speed figure) and never
//! fail; there is no negative input to clamp because elapsed values are
//! unsigned by construction.
//!
//! ## Examples
//!
//! ```rust
//! use bookking::libs::formatter::{format_clock, format_reading_time, format_speed};
//!
//! assert_eq!(format_clock(3725), "01:02:05");
//! assert_eq!(format_reading_time(3725), "1h 2m");
//! assert_eq!(format_reading_time(125), "2 min 5 sec");
//! assert_eq!(format_speed(1.25), "1.3 pages/min");
//! ```

use chrono::{DateTime, FixedOffset, Utc};

/// Formats seconds as a running clock, `hh:mm:ss`.
///
/// Hours are not wrapped at 24.
///
/// # Examples
///
/// ```rust
/// use bookking::libs::formatter::format_clock;
///
/// assert_eq!(format_clock(0), "00:00:00");
/// assert_eq!(format_clock(65), "00:01:05");
/// assert_eq!(format_clock(90_000), "25:00:00");
/// ```
pub fn format_clock(seconds: u64) -> String {
    let hours = seconds / 3600;
    let minutes = (seconds % 3600) / 60;
    let secs = seconds % 60;
    format!("{:02}:{:02}:{:02}", hours, minutes, secs)
}

/// Formats a reading duration for summaries.
///
/// From one hour upwards the seconds are dropped: `"Xh Ym"`. Below that
/// the result is `"M min S sec"`.
pub fn format_reading_time(seconds: u64) -> String {
    let hours = seconds / 3600;
    let minutes = (seconds % 3600) / 60;
    if hours > 0 {
        format!("{}h {}m", hours, minutes)
    } else {
        format!("{} min {} sec", minutes, seconds % 60)
    }
}

/// Formats a reading speed with one decimal.
pub fn format_speed(pages_per_minute: f64) -> String {
    format!("{:.1} pages/min", pages_per_minute)
}

/// Formats an instant as `YYYY-MM-DD HH:MM` in `offset`.
pub fn format_instant(instant: DateTime<Utc>, offset: FixedOffset) -> String {
    instant.with_timezone(&offset).format("%Y-%m-%d %H:%M").to_string()
}
