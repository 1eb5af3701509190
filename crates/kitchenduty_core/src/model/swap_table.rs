//! Swap override table.
//!
//! # Responsibility
//! - Map `WeekKey` to the participant overriding the computed rotation.
//! - Convert to and from the persisted JSON object (`{"2025-W49": "Joya"}`).
//!
//! # Invariants
//! - Writes go through `with_exchange`, which always records both sides of a
//!   trade in one new table.
//! - Reads never assume pairing: legacy single-sided entries are honored.

use crate::model::week_key::WeekKey;
use log::warn;
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// One exchange between two weeks, as recorded by the swap coordinator.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct SwapOutcome {
    /// Week that was asked to change hands.
    pub week_a: WeekKey,
    /// Holder of `week_a` before the swap.
    pub person_a: String,
    /// Reciprocal week found by the forward search.
    pub week_b: WeekKey,
    /// Holder of `week_b` before the swap, and the requested target.
    pub person_b: String,
}

/// Week-keyed override table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SwapTable {
    entries: BTreeMap<WeekKey, String>,
}

impl SwapTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &WeekKey) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&WeekKey, &str)> {
        self.entries.iter().map(|(key, name)| (key, name.as_str()))
    }

    /// Returns a copy of this table with both sides of `outcome` applied.
    pub fn with_exchange(&self, outcome: &SwapOutcome) -> Self {
        let mut next = self.clone();
        next.entries
            .insert(outcome.week_a, outcome.person_b.clone());
        next.entries
            .insert(outcome.week_b, outcome.person_a.clone());
        next
    }

    /// Returns a copy with a single-sided manual override.
    ///
    /// Such entries break pairing; resolvers must still honor them.
    pub fn with_override(&self, key: WeekKey, person: impl Into<String>) -> Self {
        let mut next = self.clone();
        next.entries.insert(key, person.into());
        next
    }

    /// Parses the persisted object, skipping entries that cannot be keyed.
    pub fn from_json(value: &Value) -> Self {
        let mut table = Self::new();
        let Some(object) = value.as_object() else {
            if !value.is_null() {
                warn!("event=swaps_load module=model status=degraded reason=not_an_object");
            }
            return table;
        };

        for (raw_key, raw_person) in object {
            let key = match raw_key.parse::<WeekKey>() {
                Ok(key) => key,
                Err(err) => {
                    warn!(
                        "event=swaps_load module=model status=skipped key={} error={}",
                        raw_key, err
                    );
                    continue;
                }
            };
            match raw_person.as_str().map(str::trim) {
                Some(person) if !person.is_empty() => {
                    table.entries.insert(key, person.to_string());
                }
                _ => warn!(
                    "event=swaps_load module=model status=skipped key={} reason=invalid_person",
                    raw_key
                ),
            }
        }

        table
    }

    /// Serializes into the persisted object form.
    pub fn to_json(&self) -> Value {
        let object: Map<String, Value> = self
            .entries
            .iter()
            .map(|(key, person)| (key.to_string(), Value::String(person.clone())))
            .collect();
        Value::Object(object)
    }
}
