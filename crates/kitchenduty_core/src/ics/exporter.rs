//! Duty calendar feed rendering.
//!
//! # Responsibility
//! - Resolve a horizon of weeks and render one `VEVENT` per week.
//! - Shape events by `EventMode`/`DateForm` and attach reminder alarms.
//!
//! # Invariants
//! - Event UIDs depend only on the `WeekKey`, so clients update in place.
//! - `DTSTAMP` is the only value that depends on the wall clock; it comes
//!   from the caller.
//! - Special participant weeks never carry a `VALARM`.
//! - All-day and timed `DTEND` values are exclusive.

use crate::config::{CalendarConfig, DateForm, EventMode};
use crate::ics::writer::IcsWriter;
use crate::model::swap_table::SwapTable;
use crate::model::week_key::WeekKey;
use crate::schedule::rotation::Rotation;
use chrono::{DateTime, Duration, NaiveDate, Utc};
use log::warn;
use serde::Serialize;

const PRODID: &str = "-//KitchenDuty//Duty Engine//EN";

/// One resolved week of the feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WeekAssignment {
    pub key: WeekKey,
    pub person: String,
    pub is_special: bool,
}

/// Renders duty assignments as an iCalendar feed.
pub struct CalendarExporter<'a> {
    rotation: &'a Rotation,
    config: &'a CalendarConfig,
}

impl<'a> CalendarExporter<'a> {
    pub fn new(rotation: &'a Rotation, config: &'a CalendarConfig) -> Self {
        Self { rotation, config }
    }

    /// Resolves `horizon_weeks` consecutive weeks starting at `start`.
    ///
    /// Stops early if the horizon runs past the last supported year.
    pub fn assignments(
        &self,
        start: WeekKey,
        horizon_weeks: u32,
        swaps: &SwapTable,
    ) -> Vec<WeekAssignment> {
        let mut rows = Vec::with_capacity(horizon_weeks as usize);
        for offset in 0..i64::from(horizon_weeks) {
            let key = match start.checked_add_weeks(offset) {
                Ok(key) => key,
                Err(err) => {
                    warn!(
                        "event=calendar_render module=ics status=truncated start={} offset={} error={}",
                        start, offset, err
                    );
                    break;
                }
            };
            let person = self.rotation.assign(key, swaps);
            rows.push(WeekAssignment {
                key,
                person: person.to_string(),
                is_special: self.rotation.is_special(person),
            });
        }
        rows
    }

    /// Renders the full calendar for `horizon_weeks` weeks from `start`.
    pub fn render(
        &self,
        start: WeekKey,
        horizon_weeks: u32,
        swaps: &SwapTable,
        generated_at: DateTime<Utc>,
    ) -> String {
        let rows = self.assignments(start, horizon_weeks, swaps);
        self.render_rows(&rows, generated_at)
    }

    /// Renders already resolved rows.
    pub fn render_rows(&self, rows: &[WeekAssignment], generated_at: DateTime<Utc>) -> String {
        let mut writer = IcsWriter::new();
        writer
            .begin("VCALENDAR")
            .property("VERSION", "2.0")
            .property("PRODID", PRODID)
            .property("CALSCALE", "GREGORIAN")
            .property("METHOD", "PUBLISH")
            .text("X-WR-CALNAME", &self.config.calendar_name)
            .property("X-WR-TIMEZONE", &self.config.timezone.tzid)
            .text("X-WR-CALDESC", &self.config.description);
        self.write_timezone(&mut writer);

        let stamp = generated_at.format("%Y%m%dT%H%M%SZ").to_string();
        for row in rows {
            self.write_event(&mut writer, row, &stamp);
        }

        writer.end();
        writer.finish()
    }

    fn write_timezone(&self, writer: &mut IcsWriter) {
        let zone = &self.config.timezone;
        writer
            .begin("VTIMEZONE")
            .property("TZID", &zone.tzid)
            .begin("STANDARD")
            .property("DTSTART", "19701025T030000")
            .property("RRULE", "FREQ=YEARLY;BYMONTH=10;BYDAY=-1SU")
            .property("TZOFFSETFROM", &zone.daylight_offset)
            .property("TZOFFSETTO", &zone.standard_offset)
            .end()
            .begin("DAYLIGHT")
            .property("DTSTART", "19700329T020000")
            .property("RRULE", "FREQ=YEARLY;BYMONTH=3;BYDAY=-1SU")
            .property("TZOFFSETFROM", &zone.standard_offset)
            .property("TZOFFSETTO", &zone.daylight_offset)
            .end()
            .end();
    }

    fn write_event(&self, writer: &mut IcsWriter, row: &WeekAssignment, stamp: &str) {
        let (start, end) = active_window(self.config.mode, row.key.monday());

        writer
            .begin("VEVENT")
            .property("UID", &event_uid(&row.key, &self.config.uid_domain))
            .property("DTSTAMP", stamp);
        self.write_date(writer, "DTSTART", start);
        self.write_date(writer, "DTEND", end);
        writer
            .text("SUMMARY", &format!("Kitchen: {}", row.person))
            .text("DESCRIPTION", &self.describe(row));
        if let Some(url) = self.config.webapp_url.as_deref() {
            writer.property("URL", url);
        }
        writer
            .property("STATUS", "CONFIRMED")
            .property("SEQUENCE", "0")
            .property("TRANSP", "TRANSPARENT");

        if !row.is_special {
            writer
                .begin("VALARM")
                .property("ACTION", "DISPLAY")
                .text(
                    "DESCRIPTION",
                    "KitchenDuty reminder: it's your turn this week!",
                )
                .property("TRIGGER", alarm_trigger(self.config.mode))
                .end();
        }

        writer.end();
    }

    fn write_date(&self, writer: &mut IcsWriter, name: &str, date: NaiveDate) {
        match self.config.date_form {
            DateForm::AllDay => {
                writer.property(
                    &format!("{name};VALUE=DATE"),
                    &date.format("%Y%m%d").to_string(),
                );
            }
            DateForm::Timed => {
                writer.property(
                    &format!("{name};TZID={}", self.config.timezone.tzid),
                    &date.format("%Y%m%dT000000").to_string(),
                );
            }
        }
    }

    fn describe(&self, row: &WeekAssignment) -> String {
        let mut text = if row.is_special {
            format!("{}'s week (cleaning service)", row.person)
        } else {
            format!(
                "It's {}'s turn to clean the kitchen this week!",
                row.person
            )
        };
        if let Some(url) = self.config.webapp_url.as_deref() {
            text.push_str("\n\nWebapp: ");
            text.push_str(url);
        }
        text
    }
}

/// Stable event identifier for `key`.
pub fn event_uid(key: &WeekKey, uid_domain: &str) -> String {
    format!("kitchenduty-{key}@{uid_domain}")
}

/// Start (inclusive) and end (exclusive) dates of the active window.
pub fn active_window(mode: EventMode, monday: NaiveDate) -> (NaiveDate, NaiveDate) {
    match mode {
        EventMode::MidWeek => (monday + Duration::days(2), monday + Duration::days(6)),
        EventMode::WholeWeek => (monday, monday + Duration::days(7)),
    }
}

/// Alarm trigger relative to the window start.
///
/// Mid-week windows open Wednesday 00:00, so `-PT4H` fires Tuesday 20:00
/// local time.
fn alarm_trigger(mode: EventMode) -> &'static str {
    match mode {
        // Tuesday 20:00 wins over a 24h lead in mid-week mode.
        EventMode::MidWeek => "-PT4H",
        EventMode::WholeWeek => "-PT24H",
    }
}

#[cfg(test)]
mod tests {
    use super::{active_window, event_uid};
    use crate::config::EventMode;
    use crate::model::week_key::WeekKey;
    use chrono::NaiveDate;

    #[test]
    fn mid_week_window_is_wednesday_through_saturday() {
        let monday = NaiveDate::from_ymd_opt(2025, 12, 1).unwrap();
        let (start, end) = active_window(EventMode::MidWeek, monday);
        assert_eq!(start, NaiveDate::from_ymd_opt(2025, 12, 3).unwrap());
        assert_eq!(end, NaiveDate::from_ymd_opt(2025, 12, 7).unwrap());
    }

    #[test]
    fn uid_is_derived_from_week_key() {
        let key = WeekKey::new(2025, 49).unwrap();
        assert_eq!(
            event_uid(&key, "kitchen-duty.local"),
            "kitchenduty-2025-W49@kitchen-duty.local"
        );
    }
}
