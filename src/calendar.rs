// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Calendar-day helpers for the deployment time zone.
//!
//! All day comparisons go through wall-clock date components (`NaiveDate`),
//! never through elapsed-duration arithmetic, so a 23- or 25-hour day cannot
//! produce an off-by-one.

use chrono::{
    DateTime, Datelike, FixedOffset, NaiveDate, Offset, SecondsFormat, TimeZone, Timelike, Utc,
};

/// Calendar bound to the single deployment time zone.
#[derive(Debug, Clone, Copy)]
pub struct Calendar {
    offset: FixedOffset,
}

impl Default for Calendar {
    fn default() -> Self {
        Self::utc()
    }
}

impl Calendar {
    pub fn utc() -> Self {
        Self {
            offset: Utc.fix(),
        }
    }

    /// Build from a UTC offset in minutes. Out-of-range offsets fall back to UTC.
    pub fn from_offset_minutes(minutes: i32) -> Self {
        match FixedOffset::east_opt(minutes * 60) {
            Some(offset) => Self { offset },
            None => {
                tracing::warn!(minutes, "Invalid UTC offset, using UTC");
                Self::utc()
            }
        }
    }

    /// Local calendar day of an instant.
    pub fn day_of(&self, instant: DateTime<Utc>) -> NaiveDate {
        instant.with_timezone(&self.offset).date_naive()
    }

    /// Local hour of day (0-23).
    pub fn hour_of(&self, instant: DateTime<Utc>) -> u32 {
        instant.with_timezone(&self.offset).hour()
    }

    pub fn is_same_day(&self, a: DateTime<Utc>, b: DateTime<Utc>) -> bool {
        self.day_of(a) == self.day_of(b)
    }

    /// True iff `current` falls on the calendar day right after `last`.
    pub fn is_consecutive_day(&self, last: DateTime<Utc>, current: DateTime<Utc>) -> bool {
        self.day_of(last).succ_opt() == Some(self.day_of(current))
    }

    /// Start of a local calendar day, as a UTC instant.
    pub fn start_of(&self, day: NaiveDate) -> DateTime<Utc> {
        let midnight = day.and_hms_opt(0, 0, 0).unwrap_or_default();
        self.offset
            .from_local_datetime(&midnight)
            .single()
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or_else(|| Utc.from_utc_datetime(&midnight))
    }

    /// `[start_of_today, start_of_tomorrow)` for the day containing `now`.
    pub fn day_bounds(&self, now: DateTime<Utc>) -> (DateTime<Utc>, DateTime<Utc>) {
        let today = self.day_of(now);
        let tomorrow = today.succ_opt().unwrap_or(today);
        (self.start_of(today), self.start_of(tomorrow))
    }

    /// `[first day of month, first day of next month)` in local time.
    /// Returns `None` for an invalid year/month.
    pub fn month_bounds(&self, year: i32, month: u32) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
        let first = NaiveDate::from_ymd_opt(year, month, 1)?;
        let next = if month == 12 {
            NaiveDate::from_ymd_opt(year + 1, 1, 1)?
        } else {
            NaiveDate::from_ymd_opt(year, month + 1, 1)?
        };
        Some((self.start_of(first), self.start_of(next)))
    }

    /// Current local year and month.
    pub fn year_month(&self, now: DateTime<Utc>) -> (i32, u32) {
        let day = self.day_of(now);
        (day.year(), day.month())
    }
}

/// Format a UTC timestamp as RFC3339 using a `Z` suffix.
pub fn format_utc_rfc3339(date: DateTime<Utc>) -> String {
    date.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Relative, human-readable age of a timestamp ("5 minutes ago").
pub fn time_ago(then: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let elapsed = now.signed_duration_since(then);
    let minutes = elapsed.num_minutes();
    let hours = elapsed.num_hours();
    let days = elapsed.num_days();

    let plural = |n: i64| if n == 1 { "" } else { "s" };

    if minutes < 1 {
        "Just now".to_string()
    } else if minutes < 60 {
        format!("{minutes} minute{} ago", plural(minutes))
    } else if hours < 24 {
        format!("{hours} hour{} ago", plural(hours))
    } else if days < 7 {
        format!("{days} day{} ago", plural(days))
    } else if then.year() != now.year() {
        then.format("%b %-d, %Y").to_string()
    } else {
        then.format("%b %-d").to_string()
    }
}
