//! Time types for calendar events.
//!
//! Calendar events carry either a specific instant (with the UTC offset the
//! provider reported it in) or an all-day date. Display labels are always
//! computed in the event's own offset, so an event at 09:00 +10:00 on the 5th
//! renders as the 5th even when that instant is still the 4th in UTC.

use std::cmp::Ordering;

use chrono::{DateTime, FixedOffset, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// `strftime` pattern for a single day label, e.g. `05 Mar`.
pub const DAY_LABEL_FORMAT: &str = "%d %b";

/// `strftime` pattern for a month separator label, e.g. `March 25`.
pub const MONTH_LABEL_FORMAT: &str = "%B %y";

/// The start or end of a calendar event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value")]
pub enum EventTime {
    /// A specific instant, kept in the offset the provider reported.
    DateTime(DateTime<FixedOffset>),
    /// An all-day event date (no specific time).
    AllDay(NaiveDate),
}

impl EventTime {
    /// Parses an RFC 3339 timestamp such as `2025-03-05T19:00:00+10:00`.
    pub fn parse_date_time(value: &str) -> Result<Self, chrono::ParseError> {
        DateTime::parse_from_rfc3339(value).map(Self::DateTime)
    }

    /// Parses an all-day date such as `2025-03-05`.
    pub fn parse_date(value: &str) -> Result<Self, chrono::ParseError> {
        NaiveDate::parse_from_str(value, "%Y-%m-%d").map(Self::AllDay)
    }

    /// Creates a `DateTime` event time from a UTC instant.
    pub fn from_utc(dt: DateTime<Utc>) -> Self {
        Self::DateTime(dt.fixed_offset())
    }

    /// Creates an all-day event time.
    pub fn from_date(date: NaiveDate) -> Self {
        Self::AllDay(date)
    }

    /// Returns `true` if this is an all-day event time.
    pub fn is_all_day(&self) -> bool {
        matches!(self, Self::AllDay(_))
    }

    /// Returns the calendar date in the event's own offset.
    pub fn date(&self) -> NaiveDate {
        match self {
            Self::DateTime(dt) => dt.date_naive(),
            Self::AllDay(date) => *date,
        }
    }

    /// Converts to a UTC instant for ordering.
    ///
    /// All-day dates are taken at midnight UTC.
    pub fn to_utc_datetime(&self) -> DateTime<Utc> {
        match self {
            Self::DateTime(dt) => dt.with_timezone(&Utc),
            Self::AllDay(date) => date.and_time(chrono::NaiveTime::MIN).and_utc(),
        }
    }

    /// Formats the day label, e.g. `05 Mar`.
    pub fn day_label(&self) -> String {
        self.date().format(DAY_LABEL_FORMAT).to_string()
    }

    /// Formats the month-year label used for section headers, e.g. `March 25`.
    pub fn month_label(&self) -> String {
        self.date().format(MONTH_LABEL_FORMAT).to_string()
    }
}

impl PartialOrd for EventTime {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for EventTime {
    fn cmp(&self, other: &Self) -> Ordering {
        self.to_utc_datetime().cmp(&other.to_utc_datetime())
    }
}

/// Formats the date range shown for an event.
///
/// Both ends are reduced to day labels; when they match a single label is
/// shown, otherwise `"A to B"`. A missing end shows the start alone and a
/// missing start yields `None`.
pub fn date_range_label(start: Option<&EventTime>, end: Option<&EventTime>) -> Option<String> {
    let start = start?.day_label();
    match end.map(EventTime::day_label) {
        Some(end) if end != start => Some(format!("{start} to {end}")),
        _ => Some(start),
    }
}
