// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Shared helpers for date/time formatting.

use chrono::{DateTime, Utc};

/// Today's date in ISO format (YYYY-MM-DD), used as the cache date key.
pub fn today_iso() -> String {
    Utc::now().format("%Y-%m-%d").to_string()
}

/// Format a unix timestamp plus a provider timezone offset as a local
/// time-of-day label, e.g. "7:00 AM".
pub fn time_of_day_label(unix_secs: i64, offset_secs: i64) -> String {
    local(unix_secs, offset_secs)
        .map(|dt| dt.format("%-I:%M %p").to_string())
        .unwrap_or_default()
}

/// Format a unix timestamp plus a provider timezone offset as a friendly
/// day label, e.g. "Tuesday, July 30".
pub fn day_label(unix_secs: i64, offset_secs: i64) -> String {
    local(unix_secs, offset_secs)
        .map(|dt| dt.format("%A, %B %-d").to_string())
        .unwrap_or_default()
}

/// Shift a unix timestamp by the provider offset so formatting the result
/// as UTC yields local wall-clock labels.
fn local(unix_secs: i64, offset_secs: i64) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp(unix_secs + offset_secs, 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    // 2024-07-30 14:30:00 UTC
    const TS: i64 = 1722349800;

    #[test]
    fn test_time_of_day_label_utc() {
        assert_eq!(time_of_day_label(TS, 0), "2:30 PM");
    }

    #[test]
    fn test_time_of_day_label_with_offset() {
        // UTC+2
        assert_eq!(time_of_day_label(TS, 7200), "4:30 PM");
    }

    #[test]
    fn test_day_label() {
        assert_eq!(day_label(TS, 0), "Tuesday, July 30");
    }

    #[test]
    fn test_out_of_range_timestamp_is_empty() {
        assert_eq!(time_of_day_label(i64::MAX, 0), "");
    }
}
