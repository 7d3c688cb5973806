use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::domain::error::{BookingError, Result};

/// The booking site refuses reservations further out than this many days.
pub const MAX_DAYS_AHEAD: i64 = 31;

/// Wire format used by the booking site and the HTTP front door ("Feb 18, 2025").
const WIRE_FORMAT: &str = "%b %-d, %Y";
const PARSE_FORMAT: &str = "%b %d, %Y";

/// Calendar date of a desk reservation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TargetDate(NaiveDate);

impl TargetDate {
    pub fn new(date: NaiveDate) -> Self {
        Self(date)
    }

    pub fn from_ymd(year: i32, month: u32, day: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, day).map(Self)
    }

    /// Parse the canonical "Mon D, YYYY" form. Zero-padded days are accepted; full month
    /// names and surrounding whitespace are not.
    pub fn parse(input: &str) -> Result<Self> {
        let invalid = || BookingError::InvalidDate(input.to_string());

        let month = input.split(' ').next().unwrap_or_default();
        if month.len() != 3 || input.trim() != input {
            return Err(invalid());
        }
        NaiveDate::parse_from_str(input, PARSE_FORMAT)
            .map(Self)
            .map_err(|_| invalid())
    }

    pub fn date(&self) -> NaiveDate {
        self.0
    }

    pub fn year(&self) -> i32 {
        self.0.year()
    }

    pub fn month(&self) -> u32 {
        self.0.month()
    }

    pub fn day(&self) -> u32 {
        self.0.day()
    }

    /// Abbreviated month name as rendered in the date-picker ("Jan").
    pub fn month_label(&self) -> String {
        self.0.format("%b").to_string()
    }

    /// Canonical "Mon D, YYYY" label, also used as the day cell's accessible name.
    pub fn label(&self) -> String {
        self.0.format(WIRE_FORMAT).to_string()
    }

    /// ISO "YYYY-MM-DD" form used by the booking API.
    pub fn iso(&self) -> String {
        self.0.format("%Y-%m-%d").to_string()
    }

    /// Long form used in confirmation mails, e.g. "Monday, January 20th".
    pub fn email_label(&self) -> String {
        format!(
            "{}, {} {}{}",
            self.0.format("%A"),
            self.0.format("%B"),
            self.day(),
            ordinal_suffix(self.day())
        )
    }

    /// Days between `today` and this date (negative for past dates).
    pub fn days_after(&self, today: NaiveDate) -> i64 {
        (self.0 - today).num_days()
    }

    /// Reject dates beyond the booking window relative to `today`.
    pub fn ensure_within_window(&self, today: NaiveDate) -> Result<()> {
        if self.days_after(today) > MAX_DAYS_AHEAD {
            return Err(BookingError::DateOutOfRange {
                target: self.0,
                today,
                max_days: MAX_DAYS_AHEAD,
            });
        }
        Ok(())
    }
}

fn ordinal_suffix(day: u32) -> &'static str {
    match (day % 10, day % 100) {
        (1, n) if n != 11 => "st",
        (2, n) if n != 12 => "nd",
        (3, n) if n != 13 => "rd",
        _ => "th",
    }
}

impl fmt::Display for TargetDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(WIRE_FORMAT))
    }
}

impl FromStr for TargetDate {
    type Err = BookingError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl From<NaiveDate> for TargetDate {
    fn from(date: NaiveDate) -> Self {
        Self(date)
    }
}

impl Serialize for TargetDate {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.label())
    }
}

impl<'de> Deserialize<'de> for TargetDate {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(serde::de::Error::custom)
    }
}
