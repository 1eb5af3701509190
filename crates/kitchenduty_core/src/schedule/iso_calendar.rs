//! ISO-8601 week arithmetic.
//!
//! # Responsibility
//! - Map `(week, year)` to the Monday opening that week and back.
//! - Count signed week steps between two ISO weeks.
//!
//! # Invariants
//! - `iso_week_of(monday_of(week, year)) == (year, week)` for every valid week.
//! - Week differences are derived from Monday anchors, never from raw
//!   week-number subtraction.

use crate::model::week_key::{WeekInputError, WeekKey, MAX_YEAR, MIN_YEAR};
use chrono::{Datelike, Duration, NaiveDate, Weekday};

/// Returns the number of ISO weeks (52 or 53) in `year`.
pub fn iso_weeks_in_year(year: i32) -> u32 {
    if NaiveDate::from_isoywd_opt(year, 53, Weekday::Mon).is_some() {
        53
    } else {
        52
    }
}

/// Rejects `(year, week)` pairs that do not name an existing ISO week.
pub fn validate_week(year: i32, week: u32) -> Result<(), WeekInputError> {
    if !(MIN_YEAR..=MAX_YEAR).contains(&year) || week == 0 || week > iso_weeks_in_year(year) {
        return Err(WeekInputError::InvalidWeek { year, week });
    }
    Ok(())
}

/// Computes the Monday of ISO week `week` in `year`.
///
/// # Errors
/// - `InvalidWeekInput` when the week does not exist in that year.
pub fn monday_of(week: u32, year: i32) -> Result<NaiveDate, WeekInputError> {
    Ok(WeekKey::new(year, week)?.monday())
}

/// Returns the ISO `(year, week)` containing `date`.
///
/// Follows the Thursday rule: the week belongs to the year of its Thursday.
pub fn iso_week_of(date: NaiveDate) -> Result<WeekKey, WeekInputError> {
    let iso = date.iso_week();
    WeekKey::new(iso.year(), iso.week())
}

/// Signed count of weeks from `(year_a, week_a)` to `(year_b, week_b)`.
pub fn week_difference(
    year_a: i32,
    week_a: u32,
    year_b: i32,
    week_b: u32,
) -> Result<i64, WeekInputError> {
    let from = WeekKey::new(year_a, week_a)?;
    let to = WeekKey::new(year_b, week_b)?;
    Ok(from.weeks_until(&to))
}

/// Monday for an already validated week.
///
/// Starts from Jan 1 plus `(week - 1) * 7` days. A provisional date on
/// Mon..Thu falls back to the Monday of its own week; Fri..Sun moves forward
/// to the next Monday.
pub(crate) fn monday_for(year: i32, week: u32) -> Option<NaiveDate> {
    let jan_first = NaiveDate::from_ymd_opt(year, 1, 1)?;
    let provisional = jan_first.checked_add_signed(Duration::try_days(
        i64::from(week.checked_sub(1)?) * 7,
    )?)?;
    let offset = i64::from(provisional.weekday().num_days_from_monday());
    let shift = match provisional.weekday() {
        Weekday::Mon | Weekday::Tue | Weekday::Wed | Weekday::Thu => -offset,
        Weekday::Fri | Weekday::Sat | Weekday::Sun => 7 - offset,
    };
    provisional.checked_add_signed(Duration::try_days(shift)?)
}
