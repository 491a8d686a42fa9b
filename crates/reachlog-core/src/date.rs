//! Day-granularity dates used as the natural key of the dataset.
//!
//! [`CalendarDate`] renders and parses as `dd/mm/yyyy`, which is also the
//! text stored in the `Date` column of the persisted file.

use std::fmt;
use std::str::FromStr;

use chrono::{Days, NaiveDate};
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

use crate::error::FormatError;

/// `strftime` layout of the stored date column.
pub const DATE_FORMAT: &str = "%d/%m/%Y";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CalendarDate(NaiveDate);

impl CalendarDate {
    #[must_use]
    pub fn new(date: NaiveDate) -> Self {
        Self(date)
    }

    /// Returns `None` for an out-of-range year/month/day combination.
    #[must_use]
    pub fn from_ymd(year: i32, month: u32, day: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, day).map(Self)
    }

    /// Parses a `dd/mm/yyyy` string.
    ///
    /// # Errors
    ///
    /// Returns [`FormatError`] if the string is not a valid date in that layout.
    pub fn parse(input: &str) -> Result<Self, FormatError> {
        NaiveDate::parse_from_str(input.trim(), DATE_FORMAT)
            .map(Self)
            .map_err(|e| FormatError {
                input: input.to_owned(),
                reason: e.to_string(),
            })
    }

    #[must_use]
    pub fn as_naive(self) -> NaiveDate {
        self.0
    }

    /// The date `days` calendar days earlier, or `None` past chrono's range.
    #[must_use]
    pub fn days_before(self, days: u32) -> Option<Self> {
        self.0.checked_sub_days(Days::new(u64::from(days))).map(Self)
    }

    /// English month name, e.g. `"June"`.
    #[must_use]
    pub fn month_name(self) -> String {
        self.0.format("%B").to_string()
    }

    /// English weekday name, e.g. `"Sunday"`.
    #[must_use]
    pub fn weekday_name(self) -> String {
        self.0.format("%A").to_string()
    }
}

impl From<NaiveDate> for CalendarDate {
    fn from(date: NaiveDate) -> Self {
        Self(date)
    }
}

impl fmt::Display for CalendarDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(DATE_FORMAT))
    }
}

impl FromStr for CalendarDate {
    type Err = FormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for CalendarDate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for CalendarDate {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(de::Error::custom)
    }
}
