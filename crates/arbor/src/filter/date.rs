//! Relative date buckets for `date_time` filters.
//!
//! Dates are not compared exactly. Each date falls into one named bucket
//! relative to today ("Yesterday", "Next Week", ...), and filters compare
//! bucket names. Weeks start on Sunday.

use std::fmt;

use chrono::{DateTime, Datelike, Days, Local, NaiveDate};
use serde::{Deserialize, Serialize};

use super::value::FilterValue;
use crate::error::{Error, Result};

/// Span after which a date is "Far Future" or "Long Ago".
const FAR_DAYS: u64 = 120;
/// Span after which a date is in the next or last few months.
const FEW_WEEKS_DAYS: u64 = 28;

/// Where a date falls relative to today.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DateBucket {
    #[serde(rename = "Today")]
    Today,
    #[serde(rename = "Yesterday")]
    Yesterday,
    #[serde(rename = "Tomorrow")]
    Tomorrow,
    #[serde(rename = "Far Future")]
    FarFuture,
    #[serde(rename = "Long Ago")]
    LongAgo,
    #[serde(rename = "Last Few Months")]
    LastFewMonths,
    #[serde(rename = "Next Few Months")]
    NextFewMonths,
    #[serde(rename = "Last Few Weeks")]
    LastFewWeeks,
    #[serde(rename = "Last Week")]
    LastWeek,
    #[serde(rename = "This Week")]
    ThisWeek,
    #[serde(rename = "Next Week")]
    NextWeek,
    #[serde(rename = "Next Few Weeks")]
    NextFewWeeks,
    /// The field holds no date.
    #[serde(rename = "No Date")]
    NoDate,
}

impl DateBucket {
    /// Every bucket.
    pub const ALL: [DateBucket; 13] = [
        Self::Today,
        Self::Yesterday,
        Self::Tomorrow,
        Self::FarFuture,
        Self::LongAgo,
        Self::LastFewMonths,
        Self::NextFewMonths,
        Self::LastFewWeeks,
        Self::LastWeek,
        Self::ThisWeek,
        Self::NextWeek,
        Self::NextFewWeeks,
        Self::NoDate,
    ];

    /// The display name, also used in filter definitions.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Today => "Today",
            Self::Yesterday => "Yesterday",
            Self::Tomorrow => "Tomorrow",
            Self::FarFuture => "Far Future",
            Self::LongAgo => "Long Ago",
            Self::LastFewMonths => "Last Few Months",
            Self::NextFewMonths => "Next Few Months",
            Self::LastFewWeeks => "Last Few Weeks",
            Self::LastWeek => "Last Week",
            Self::ThisWeek => "This Week",
            Self::NextWeek => "Next Week",
            Self::NextFewWeeks => "Next Few Weeks",
            Self::NoDate => "No Date",
        }
    }

    /// Looks a bucket up by display name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|bucket| bucket.as_str() == name)
    }

    /// The bucket `date` falls into when the current date is `today`.
    ///
    /// Rules are checked in order, so nearer buckets win: a date one day
    /// back is "Yesterday" even though it is also in this week.
    pub fn for_date(date: NaiveDate, today: NaiveDate) -> Self {
        let back = |days: u64| today.checked_sub_days(Days::new(days)).unwrap_or(NaiveDate::MIN);
        let ahead = |days: u64| today.checked_add_days(Days::new(days)).unwrap_or(NaiveDate::MAX);

        if date == today {
            return Self::Today;
        }
        if date == back(1) {
            return Self::Yesterday;
        }
        if date == ahead(1) {
            return Self::Tomorrow;
        }
        if date > ahead(FAR_DAYS) {
            return Self::FarFuture;
        }
        if date < back(FAR_DAYS) {
            return Self::LongAgo;
        }
        if date < back(FEW_WEEKS_DAYS) {
            return Self::LastFewMonths;
        }
        if date > ahead(FEW_WEEKS_DAYS) {
            return Self::NextFewMonths;
        }

        // On a Sunday the previous Sunday is a full week back.
        let since_sunday = u64::from(today.weekday().num_days_from_monday()) + 1;
        let last_sunday = back(since_sunday);
        let week_after = |weeks: u64| {
            last_sunday
                .checked_add_days(Days::new(7 * weeks))
                .unwrap_or(NaiveDate::MAX)
        };

        if date < back(since_sunday + 7) {
            Self::LastFewWeeks
        } else if date < last_sunday {
            Self::LastWeek
        } else if date < week_after(1) {
            Self::ThisWeek
        } else if date < week_after(2) {
            Self::NextWeek
        } else {
            Self::NextFewWeeks
        }
    }

    /// The bucket of a field value.
    ///
    /// Accepts null ("No Date"), a bucket name, a `YYYY-MM-DD` date, an
    /// RFC 3339 timestamp or a Unix timestamp in seconds. Timestamps are
    /// bucketed by their local date. Anything else fails with
    /// [`Error::InvalidDate`].
    pub fn of_value(value: &FilterValue, today: NaiveDate) -> Result<Self> {
        let date = match value {
            FilterValue::Null => return Ok(Self::NoDate),
            FilterValue::Str(text) => {
                if let Some(bucket) = Self::from_name(text) {
                    return Ok(bucket);
                }
                parse_date(text)
            }
            FilterValue::Number(seconds) if seconds.is_finite() => {
                DateTime::from_timestamp(seconds.floor() as i64, 0)
                    .map(|utc| utc.with_timezone(&Local).date_naive())
            }
            _ => None,
        };

        date.map(|date| Self::for_date(date, today))
            .ok_or_else(|| Error::invalid_date(value))
    }

    /// The bucket of a field value relative to the local current date.
    pub fn of_value_now(value: &FilterValue) -> Result<Self> {
        Self::of_value(value, Local::now().date_naive())
    }
}

impl fmt::Display for DateBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn parse_date(text: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(text, "%Y-%m-%d").ok().or_else(|| {
        DateTime::parse_from_rfc3339(text)
            .ok()
            .map(|stamp| stamp.with_timezone(&Local).date_naive())
    })
}
