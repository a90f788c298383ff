//! Note-timestamp formatting.
//!
//! Recent notes read as relative time ("2 hours ago"); older ones, and
//! anything in the future or unrepresentable, fall back to an absolute
//! "Dec 15, 2023 at 2:30 PM" form. Pure and stateless; the clock is
//! injected so the thresholds are testable.

use chrono::{DateTime, Duration, Utc};

/// Format an epoch-seconds timestamp relative to the current time.
pub fn format_timestamp(timestamp: i64) -> String {
    format_timestamp_at(timestamp, Utc::now())
}

/// Format an epoch-seconds timestamp relative to `now`.
pub fn format_timestamp_at(timestamp: i64, now: DateTime<Utc>) -> String {
    let Some(date) = DateTime::from_timestamp(timestamp, 0) else {
        return "Invalid date".to_string();
    };

    let elapsed = now.signed_duration_since(date);

    // Future timestamps get the absolute form
    if elapsed < Duration::zero() {
        return absolute(date);
    }

    let minutes = elapsed.num_minutes();
    let hours = elapsed.num_hours();
    let days = elapsed.num_days();

    if minutes < 1 {
        "Just now".to_string()
    } else if minutes < 60 {
        format!("{} minute{} ago", minutes, plural(minutes))
    } else if hours < 24 {
        format!("{} hour{} ago", hours, plural(hours))
    } else if days < 7 {
        format!("{} day{} ago", days, plural(days))
    } else {
        absolute(date)
    }
}

fn plural(n: i64) -> &'static str {
    if n == 1 {
        ""
    } else {
        "s"
    }
}

fn absolute(date: DateTime<Utc>) -> String {
    date.format("%b %-d, %Y at %-I:%M %p").to_string()
}
