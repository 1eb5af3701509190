//! Completion history ledger.
//!
//! # Responsibility
//! - Keep the ordered record of completed weeks.
//! - Convert to and from the persisted JSON array.
//!
//! # Invariants
//! - At most one entry per `WeekKey`; `record` is idempotent.
//! - Order is insertion order; the tail holds the most recent entries.
//! - Loading keeps the first entry of a duplicated week and drops the rest.

use crate::model::history_entry::HistoryEntry;
use crate::model::week_key::WeekKey;
use log::warn;
use serde_json::Value;

/// Append-only (apart from undo) record of completed weeks.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HistoryLedger {
    entries: Vec<HistoryEntry>,
}

impl HistoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    pub fn contains(&self, week: &WeekKey) -> bool {
        self.entries.iter().any(|entry| &entry.week == week)
    }

    pub fn get(&self, week: &WeekKey) -> Option<&HistoryEntry> {
        self.entries.iter().find(|entry| &entry.week == week)
    }

    /// Appends `entry` unless its week is already recorded.
    ///
    /// Returns whether the ledger changed.
    pub fn record(&mut self, entry: HistoryEntry) -> bool {
        if self.contains(&entry.week) {
            return false;
        }
        self.entries.push(entry);
        true
    }

    /// Removes the entry for `week`. Returns whether one existed.
    pub fn remove(&mut self, week: &WeekKey) -> bool {
        let before = self.entries.len();
        self.entries.retain(|entry| &entry.week != week);
        self.entries.len() != before
    }

    /// Last `limit` entries, most recent first.
    pub fn recent(&self, limit: usize) -> Vec<&HistoryEntry> {
        self.entries.iter().rev().take(limit).collect()
    }

    /// Parses the persisted array, skipping malformed and duplicate entries.
    pub fn from_json(value: &Value) -> Self {
        let mut ledger = Self::new();
        let Some(items) = value.as_array() else {
            if !value.is_null() {
                warn!("event=history_load module=history status=degraded reason=not_an_array");
            }
            return ledger;
        };

        for (position, item) in items.iter().enumerate() {
            match serde_json::from_value::<HistoryEntry>(item.clone()) {
                Ok(entry) => {
                    let week = entry.week;
                    if !ledger.record(entry) {
                        warn!(
                            "event=history_load module=history status=skipped position={} week={} reason=duplicate",
                            position, week
                        );
                    }
                }
                Err(err) => warn!(
                    "event=history_load module=history status=skipped position={} error={}",
                    position, err
                ),
            }
        }

        ledger
    }

    /// Serializes into the persisted array form.
    pub fn to_json(&self) -> Result<Value, serde_json::Error> {
        serde_json::to_value(&self.entries)
    }
}
