//! Subcommand implementations.
//!
//! Every command returns `Err(message)` on failure; `main` prints it and
//! exits with status 1.

use std::path::Path;

use chrono::{Local, NaiveDate, Utc};
use kitchenduty_core::{EngineError, MarkOutcome, ScheduledWeek, WeekKey};
use serde::Serialize;
use serde_json::json;

use crate::app::Engine;
use crate::{OutputFormat, WeekArgs};

fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Resolves the selected week, defaulting to the one containing today.
fn selected_week(engine: &Engine, week: WeekArgs) -> Result<WeekKey, String> {
    match (week.week, week.year) {
        (Some(week), Some(year)) => WeekKey::new(year, week).map_err(|err| err.to_string()),
        _ => engine.current_week(today()).map_err(|err| err.to_string()),
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<(), String> {
    let text = serde_json::to_string_pretty(value).map_err(|err| err.to_string())?;
    println!("{text}");
    Ok(())
}

fn describe_row(row: &ScheduledWeek) -> String {
    let mark = if row.is_done { " (done)" } else { "" };
    format!(
        "{} ({}): {}{}",
        row.key,
        row.monday.format("%Y-%m-%d"),
        row.person,
        mark
    )
}

pub(crate) fn cmd_who(engine: &Engine, week: WeekArgs, output: OutputFormat) -> Result<(), String> {
    let key = selected_week(engine, week)?;
    let row = engine
        .upcoming(key, 1)
        .into_iter()
        .next()
        .ok_or_else(|| format!("week {key} cannot be resolved"))?;

    match output {
        OutputFormat::Json => print_json(&row),
        OutputFormat::Text => {
            println!("{}", describe_row(&row));
            Ok(())
        }
    }
}

pub(crate) fn cmd_schedule(engine: &Engine, weeks: u32, output: OutputFormat) -> Result<(), String> {
    let start = engine
        .current_week(today())
        .map_err(|err| err.to_string())?;
    let rows = engine.upcoming(start, weeks);

    match output {
        OutputFormat::Json => print_json(&rows),
        OutputFormat::Text => {
            for row in &rows {
                println!("{}", describe_row(row));
            }
            Ok(())
        }
    }
}

pub(crate) fn cmd_swap(
    engine: &mut Engine,
    week: u32,
    year: i32,
    target: &str,
    output: OutputFormat,
) -> Result<(), String> {
    let outcome = engine
        .propose_swap(week, year, target)
        .map_err(|err| match err {
            EngineError::NoSlotFound { .. } => "no reciprocal week found".to_string(),
            other => other.to_string(),
        })?;

    match output {
        OutputFormat::Json => print_json(&outcome),
        OutputFormat::Text => {
            println!("{}: {} -> {}", outcome.week_a, outcome.person_a, outcome.person_b);
            println!("{}: {} -> {}", outcome.week_b, outcome.person_b, outcome.person_a);
            Ok(())
        }
    }
}

pub(crate) fn cmd_candidates(
    engine: &Engine,
    week: WeekArgs,
    output: OutputFormat,
) -> Result<(), String> {
    let key = selected_week(engine, week)?;
    let candidates = engine
        .swap_candidates(key.week(), key.year())
        .map_err(|err| err.to_string())?;

    match output {
        OutputFormat::Json => print_json(&json!({ "week": key, "candidates": candidates })),
        OutputFormat::Text => {
            for name in &candidates {
                println!("{name}");
            }
            Ok(())
        }
    }
}

pub(crate) fn cmd_done(engine: &mut Engine, week: WeekArgs, output: OutputFormat) -> Result<(), String> {
    let key = selected_week(engine, week)?;
    let outcome = engine
        .mark_done(key.week(), key.year())
        .map_err(|err| err.to_string())?;
    let person = engine.assign_key(key).to_string();

    match output {
        OutputFormat::Json => print_json(&json!({
            "week": key,
            "person": person,
            "outcome": outcome,
        })),
        OutputFormat::Text => {
            match outcome {
                MarkOutcome::Recorded => println!("{key}: marked done ({person})"),
                MarkOutcome::AlreadyDone => println!("{key}: already done"),
                MarkOutcome::NotCompletable => {
                    println!("{key}: {person}'s week cannot be marked done")
                }
            }
            Ok(())
        }
    }
}

pub(crate) fn cmd_undo(engine: &mut Engine, week: WeekArgs, output: OutputFormat) -> Result<(), String> {
    let key = selected_week(engine, week)?;
    let removed = engine
        .undo_done(key.week(), key.year())
        .map_err(|err| err.to_string())?;

    match output {
        OutputFormat::Json => print_json(&json!({ "week": key, "removed": removed })),
        OutputFormat::Text => {
            if removed {
                println!("{key}: done mark removed");
            } else {
                println!("{key}: was not marked done");
            }
            Ok(())
        }
    }
}

pub(crate) fn cmd_history(
    engine: &Engine,
    limit: Option<usize>,
    output: OutputFormat,
) -> Result<(), String> {
    let limit = limit.unwrap_or(engine.config().history.recent_limit);
    let entries = engine.recent(limit);

    match output {
        OutputFormat::Json => print_json(&entries),
        OutputFormat::Text => {
            if entries.is_empty() {
                println!("no completed weeks yet");
            }
            for entry in entries {
                println!(
                    "{}: {} ({})",
                    entry.week,
                    entry.person,
                    entry.completed_at.format("%Y-%m-%d %H:%M UTC")
                );
            }
            Ok(())
        }
    }
}

pub(crate) fn cmd_export(
    engine: &Engine,
    weeks: Option<u32>,
    out: Option<&Path>,
    output: OutputFormat,
) -> Result<(), String> {
    let weeks = weeks.unwrap_or(engine.config().calendar.export_horizon_weeks);
    let start = engine
        .current_week(today())
        .map_err(|err| err.to_string())?;
    let ics = engine.render_calendar(start, weeks, Utc::now());

    let Some(path) = out else {
        print!("{ics}");
        return Ok(());
    };

    std::fs::write(path, &ics)
        .map_err(|err| format!("failed to write `{}`: {err}", path.display()))?;
    match output {
        OutputFormat::Json => print_json(&json!({
            "path": path.display().to_string(),
            "start": start,
            "weeks": weeks,
        })),
        OutputFormat::Text => {
            println!("wrote {weeks} weeks from {start} to {}", path.display());
            Ok(())
        }
    }
}
