//! ISO week identity.
//!
//! # Responsibility
//! - Identify one ISO-8601 week as `(iso_year, iso_week)`.
//! - Provide the canonical `"{year}-W{week}"` string used as the join key
//!   across swaps, history and per-week state.
//!
//! # Invariants
//! - A `WeekKey` can only be built for a week that exists in its ISO year
//!   (`1..=52` or `1..=53`), inside `MIN_YEAR..=MAX_YEAR`.
//! - Two keys are equal iff their canonical strings match.
//! - Ordering is chronological.

use crate::schedule::iso_calendar::{iso_week_of, monday_for, validate_week};
use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Earliest ISO year accepted at the boundary.
pub const MIN_YEAR: i32 = 1;
/// Latest ISO year accepted at the boundary.
pub const MAX_YEAR: i32 = 9999;

/// Rejected week/year input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WeekInputError {
    /// `(year, week)` does not name an existing ISO week.
    InvalidWeek { year: i32, week: u32 },
    /// Text is not in `"{year}-W{week}"` form.
    Malformed(String),
}

impl Display for WeekInputError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidWeek { year, week } => {
                write!(f, "invalid ISO week input: week {week} of year {year}")
            }
            Self::Malformed(value) => write!(f, "malformed week key `{value}`"),
        }
    }
}

impl Error for WeekInputError {}

/// Canonical identifier of one ISO week.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct WeekKey {
    year: i32,
    week: u32,
    monday: NaiveDate,
}

impl WeekKey {
    /// Builds a key after checking that the week exists in `year`.
    pub fn new(year: i32, week: u32) -> Result<Self, WeekInputError> {
        validate_week(year, week)?;
        let monday = monday_for(year, week).ok_or(WeekInputError::InvalidWeek { year, week })?;
        Ok(Self { year, week, monday })
    }

    /// Returns the key of the ISO week containing `date`.
    pub fn containing(date: NaiveDate) -> Result<Self, WeekInputError> {
        iso_week_of(date)
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn week(&self) -> u32 {
        self.week
    }

    /// Monday that opens this week.
    pub fn monday(&self) -> NaiveDate {
        self.monday
    }

    /// Signed number of weeks from `self` to `other`.
    ///
    /// Computed from the Monday anchors, so it stays correct across year
    /// boundaries and 53-week years.
    pub fn weeks_until(&self, other: &WeekKey) -> i64 {
        // Mondays are always a whole number of weeks apart.
        (other.monday - self.monday).num_days().div_euclid(7)
    }

    /// Returns the key `weeks` weeks away from this one.
    pub fn checked_add_weeks(&self, weeks: i64) -> Result<Self, WeekInputError> {
        let shifted = Duration::try_weeks(weeks)
            .and_then(|delta| self.monday.checked_add_signed(delta))
            .ok_or(WeekInputError::InvalidWeek {
                year: self.year,
                week: self.week,
            })?;
        iso_week_of(shifted)
    }

    /// Returns the following ISO week.
    pub fn next(&self) -> Result<Self, WeekInputError> {
        self.checked_add_weeks(1)
    }
}

impl Display for WeekKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-W{}", self.year, self.week)
    }
}

impl FromStr for WeekKey {
    type Err = WeekInputError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let malformed = || WeekInputError::Malformed(value.to_string());
        let (year_text, week_text) = value.trim().split_once("-W").ok_or_else(malformed)?;
        let year = year_text.parse::<i32>().map_err(|_| malformed())?;
        let week = week_text.parse::<u32>().map_err(|_| malformed())?;
        Self::new(year, week)
    }
}

impl TryFrom<String> for WeekKey {
    type Error = WeekInputError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<WeekKey> for String {
    fn from(value: WeekKey) -> Self {
        value.to_string()
    }
}
