use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use kitchenduty_core::{
    CalendarConfig, DateForm, DutyConfig, DutyEngine, EventMode, MemoryKvStore, WeekKey,
};

fn engine_with(calendar: CalendarConfig) -> DutyEngine<MemoryKvStore> {
    let config = DutyConfig {
        calendar,
        ..DutyConfig::default()
    };
    DutyEngine::load(config, MemoryKvStore::new()).unwrap()
}

fn stamp() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 11, 20, 7, 30, 0).unwrap()
}

fn anchor() -> WeekKey {
    WeekKey::new(2025, 48).unwrap()
}

#[test]
fn feed_has_one_event_per_week_and_alarms_for_regular_weeks() {
    let engine = engine_with(CalendarConfig::default());
    let ics = engine.render_calendar(anchor(), 4, stamp());

    assert!(ics.starts_with("BEGIN:VCALENDAR\r\nVERSION:2.0\r\n"));
    assert!(ics.ends_with("END:VCALENDAR\r\n"));
    assert_eq!(ics.matches("BEGIN:VEVENT").count(), 4);
    assert_eq!(ics.matches("END:VEVENT").count(), 4);
    // 2025-W48 and 2025-W50 belong to the special participant.
    assert_eq!(ics.matches("BEGIN:VALARM").count(), 2);
    assert!(ics.contains("SUMMARY:Kitchen: Maria\r\n"));
    assert!(ics.contains("SUMMARY:Kitchen: Joya\r\n"));
    assert!(ics.contains("DTSTAMP:20251120T073000Z\r\n"));
    assert!(ics.contains("BEGIN:VTIMEZONE\r\nTZID:Europe/Zurich\r\n"));
}

#[test]
fn mid_week_events_span_wednesday_to_sunday() {
    let engine = engine_with(CalendarConfig::default());
    let ics = engine.render_calendar(WeekKey::new(2025, 49).unwrap(), 1, stamp());

    assert!(ics.contains("UID:kitchenduty-2025-W49@kitchen-duty.local\r\n"));
    assert!(ics.contains("DTSTART;VALUE=DATE:20251203\r\n"));
    assert!(ics.contains("DTEND;VALUE=DATE:20251207\r\n"));
    assert!(ics.contains("TRIGGER:-PT4H\r\n"));
    assert!(ics.contains("It's Joya's turn to clean the kitchen this week!"));
}

#[test]
fn whole_week_timed_events_use_time_zone() {
    let engine = engine_with(CalendarConfig {
        mode: EventMode::WholeWeek,
        date_form: DateForm::Timed,
        ..CalendarConfig::default()
    });
    let ics = engine.render_calendar(WeekKey::new(2025, 49).unwrap(), 1, stamp());

    assert!(ics.contains("DTSTART;TZID=Europe/Zurich:20251201T000000\r\n"));
    assert!(ics.contains("DTEND;TZID=Europe/Zurich:20251208T000000\r\n"));
    assert!(ics.contains("TRIGGER:-PT24H\r\n"));
}

#[test]
fn special_weeks_have_no_reminder() {
    let engine = engine_with(CalendarConfig::default());
    let ics = engine.render_calendar(anchor(), 1, stamp());
    assert!(ics.contains("Maria's week (cleaning service)"));
    assert!(!ics.contains("BEGIN:VALARM"));
}

#[test]
fn zero_horizon_renders_empty_but_valid_calendar() {
    let engine = engine_with(CalendarConfig::default());
    let ics = engine.render_calendar(anchor(), 0, stamp());

    assert!(ics.starts_with("BEGIN:VCALENDAR\r\n"));
    assert!(ics.ends_with("END:VCALENDAR\r\n"));
    assert!(!ics.contains("BEGIN:VEVENT"));
}

#[test]
fn output_is_deterministic_apart_from_timestamp() {
    let engine = engine_with(CalendarConfig::default());
    let later = Utc.with_ymd_and_hms(2026, 1, 2, 3, 4, 5).unwrap();
    let strip = |text: String| -> Vec<String> {
        text.split("\r\n")
            .filter(|line| !line.starts_with("DTSTAMP:"))
            .map(str::to_string)
            .collect()
    };

    let first = engine.render_calendar(anchor(), 12, stamp());
    let second = engine.render_calendar(anchor(), 12, later);
    assert_ne!(first, second);
    assert_eq!(strip(first), strip(second));
}

#[test]
fn long_lines_are_folded_and_text_is_escaped() {
    let engine = engine_with(CalendarConfig {
        calendar_name: "Kitchen, Duty; Flat 3".to_string(),
        webapp_url: Some(format!("https://kitchen.example/{}", "ü".repeat(60))),
        ..CalendarConfig::default()
    });
    let ics = engine.render_calendar(anchor(), 2, stamp());

    assert!(ics.contains("X-WR-CALNAME:Kitchen\\, Duty\\; Flat 3\r\n"));
    for line in ics.split("\r\n") {
        assert!(line.len() <= 75, "line exceeds 75 octets: {line:?}");
    }
    let unfolded = ics.replace("\r\n ", "");
    assert!(unfolded.contains("\\n\\nWebapp: https://kitchen.example/"));
    assert!(unfolded.contains(&"ü".repeat(60)));
}

#[test]
fn swaps_are_reflected_in_the_feed() {
    let mut engine = engine_with(CalendarConfig::default());
    engine.propose_swap(49, 2025, "Alessandro").unwrap();
    let ics = engine.render_calendar(WeekKey::new(2025, 49).unwrap(), 1, stamp());
    assert!(ics.contains("SUMMARY:Kitchen: Alessandro\r\n"));
}

#[test]
fn served_feed_covers_current_week_through_horizon() {
    let engine = engine_with(CalendarConfig::default());
    let today = NaiveDate::from_ymd_opt(2025, 12, 3).unwrap();
    let ics = engine.feed(today, stamp()).unwrap();

    assert!(ics.contains("UID:kitchenduty-2025-W49@kitchen-duty.local"));
    assert!(!ics.contains("UID:kitchenduty-2025-W48@"));
    // Mondays 2025-12-01 through 2026-03-02.
    assert_eq!(ics.matches("BEGIN:VEVENT").count(), 14);
}

#[test]
fn upcoming_lists_people_and_completion() {
    let mut engine = engine_with(CalendarConfig::default());
    engine.mark_done_at(49, 2025, stamp()).unwrap();

    let rows = engine.upcoming(anchor(), 3);
    let people: Vec<&str> = rows.iter().map(|row| row.person.as_str()).collect();
    assert_eq!(people, ["Maria", "Joya", "Maria"]);
    assert_eq!(rows[1].monday, NaiveDate::from_ymd_opt(2025, 12, 1).unwrap());
    assert!(rows[1].is_done);
    assert!(!rows[0].is_done);
}
