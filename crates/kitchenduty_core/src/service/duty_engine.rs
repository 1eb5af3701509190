//! Duty assignment engine.
//!
//! # Responsibility
//! - Own the working copies of swaps, history and per-week state.
//! - Expose assignment queries, swaps, completion tracking and calendar
//!   export as use-case APIs.
//! - Reconcile with fresher persisted state and notify subscribers.
//!
//! # Invariants
//! - Every mutation is built on a copy, persisted, and only then installed;
//!   a failed save leaves the working copy untouched.
//! - A swap writes both override entries in one save.
//! - Special participant weeks are never recorded as done.
//! - Subscribers hear about every installed change, local or remote.

use crate::config::{ConfigError, DutyConfig};
use crate::history::HistoryLedger;
use crate::ics::exporter::{CalendarExporter, WeekAssignment};
use crate::model::history_entry::HistoryEntry;
use crate::model::swap_table::{SwapOutcome, SwapTable};
use crate::model::week_key::{WeekInputError, WeekKey};
use crate::repo::kv_store::{KvStore, Namespace, StoreError};
use crate::schedule::rotation::Rotation;
use crate::schedule::swap::find_reciprocal;
use chrono::{DateTime, Months, NaiveDate, Utc};
use log::{error, info, warn};
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type EngineResult<T> = Result<T, EngineError>;

/// Engine-level failure.
#[derive(Debug)]
pub enum EngineError {
    /// Week/year outside the valid domain; rejected, never clamped.
    InvalidWeekInput(WeekInputError),
    /// No reciprocal week within the swap horizon; nothing was written.
    NoSlotFound { week: WeekKey, target: String },
    /// The store refused a write; the working copy was not changed.
    PersistenceUnavailable(StoreError),
    InvalidConfig(ConfigError),
}

impl Display for EngineError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidWeekInput(err) => write!(f, "{err}"),
            Self::NoSlotFound { week, target } => write!(
                f,
                "no reciprocal week found: {target} holds no week after {week} within the swap horizon"
            ),
            Self::PersistenceUnavailable(err) => write!(f, "persistence unavailable: {err}"),
            Self::InvalidConfig(err) => write!(f, "{err}"),
        }
    }
}

impl Error for EngineError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidWeekInput(err) => Some(err),
            Self::NoSlotFound { .. } => None,
            Self::PersistenceUnavailable(err) => Some(err),
            Self::InvalidConfig(err) => Some(err),
        }
    }
}

impl From<WeekInputError> for EngineError {
    fn from(value: WeekInputError) -> Self {
        Self::InvalidWeekInput(value)
    }
}

impl From<ConfigError> for EngineError {
    fn from(value: ConfigError) -> Self {
        Self::InvalidConfig(value)
    }
}

/// Kind of state that changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeKind {
    Swaps,
    History,
    WeekStates,
}

impl From<Namespace> for ChangeKind {
    fn from(value: Namespace) -> Self {
        match value {
            Namespace::Swaps => Self::Swaps,
            Namespace::History => Self::History,
            Namespace::WeekStates => Self::WeekStates,
        }
    }
}

/// Result of `mark_done`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MarkOutcome {
    Recorded,
    AlreadyDone,
    /// The week belongs to the special participant.
    NotCompletable,
}

/// One row of the upcoming schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScheduledWeek {
    pub key: WeekKey,
    pub monday: NaiveDate,
    pub person: String,
    pub is_done: bool,
}

/// Change subscriber.
pub type ChangeListener = Box<dyn Fn(ChangeKind) + Send + Sync>;

/// Single owner of duty state for one process.
pub struct DutyEngine<S: KvStore> {
    config: DutyConfig,
    rotation: Rotation,
    store: S,
    swaps: SwapTable,
    history: HistoryLedger,
    week_states: BTreeMap<WeekKey, Value>,
    listeners: Vec<ChangeListener>,
}

impl<S: KvStore> DutyEngine<S> {
    /// Validates `config` and loads every namespace from `store`.
    ///
    /// A namespace that cannot be loaded starts empty; the engine keeps
    /// working local-only.
    pub fn load(config: DutyConfig, store: S) -> EngineResult<Self> {
        config.validate()?;
        let rotation = config.rotation()?;

        let mut engine = Self {
            config,
            rotation,
            store,
            swaps: SwapTable::new(),
            history: HistoryLedger::new(),
            week_states: BTreeMap::new(),
            listeners: Vec::new(),
        };

        for namespace in Namespace::ALL {
            match engine.store.load(namespace) {
                Ok(Some(value)) => {
                    engine.install(namespace, &value);
                }
                Ok(None) => {}
                Err(err) => warn!(
                    "event=engine_load module=service status=degraded namespace={} error={}",
                    namespace, err
                ),
            }
        }

        info!(
            "event=engine_load module=service status=ok roster_size={} swaps={} history={}",
            engine.rotation.roster().len(),
            engine.swaps.len(),
            engine.history.len()
        );
        Ok(engine)
    }

    pub fn config(&self) -> &DutyConfig {
        &self.config
    }

    pub fn rotation(&self) -> &Rotation {
        &self.rotation
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn swaps(&self) -> &SwapTable {
        &self.swaps
    }

    pub fn history(&self) -> &HistoryLedger {
        &self.history
    }

    /// Registers a callback fired after every installed change.
    pub fn on_change(&mut self, listener: impl Fn(ChangeKind) + Send + Sync + 'static) {
        self.listeners.push(Box::new(listener));
    }

    /// Assignee of ISO week `week` of `year`.
    pub fn assign(&self, week: u32, year: i32) -> EngineResult<String> {
        let key = WeekKey::new(year, week)?;
        Ok(self.assign_key(key).to_string())
    }

    /// Assignee of an already validated week.
    pub fn assign_key(&self, key: WeekKey) -> &str {
        self.rotation.assign(key, &self.swaps)
    }

    /// Week containing `today`.
    pub fn current_week(&self, today: NaiveDate) -> EngineResult<WeekKey> {
        Ok(WeekKey::containing(today)?)
    }

    /// Participants a swap of `week` may target: everyone but the holder.
    pub fn swap_candidates(&self, week: u32, year: i32) -> EngineResult<Vec<String>> {
        let key = WeekKey::new(year, week)?;
        let holder = self.assign_key(key);
        Ok(self
            .rotation
            .roster()
            .everyone()
            .filter(|name| *name != holder)
            .map(str::to_string)
            .collect())
    }

    /// Moves `week`'s duty to `target` in exchange for `target`'s next week.
    ///
    /// # Errors
    /// - `NoSlotFound` when `target` holds no week within the horizon.
    /// - `PersistenceUnavailable` when the exchange could not be saved.
    pub fn propose_swap(&mut self, week: u32, year: i32, target: &str) -> EngineResult<SwapOutcome> {
        let key = WeekKey::new(year, week)?;
        let target = target.trim();
        let outcome = find_reciprocal(
            &self.rotation,
            &self.swaps,
            key,
            target,
            self.config.swap_horizon_weeks,
        )
        .ok_or_else(|| {
            info!(
                "event=swap_propose module=service status=noop week={} target={} reason=no_slot",
                key, target
            );
            EngineError::NoSlotFound {
                week: key,
                target: target.to_string(),
            }
        })?;

        let next = self.swaps.with_exchange(&outcome);
        self.persist(Namespace::Swaps, &next.to_json())?;
        self.swaps = next;
        info!(
            "event=swap_propose module=service status=ok week_a={} person_a={} week_b={} person_b={}",
            outcome.week_a, outcome.person_a, outcome.week_b, outcome.person_b
        );
        self.notify(ChangeKind::Swaps);
        Ok(outcome)
    }

    /// Records `week` as done by its current assignee, stamped now.
    pub fn mark_done(&mut self, week: u32, year: i32) -> EngineResult<MarkOutcome> {
        self.mark_done_at(week, year, Utc::now())
    }

    /// Records `week` as done with an explicit completion time.
    pub fn mark_done_at(
        &mut self,
        week: u32,
        year: i32,
        completed_at: DateTime<Utc>,
    ) -> EngineResult<MarkOutcome> {
        let key = WeekKey::new(year, week)?;
        let person = self.assign_key(key).to_string();

        if self.rotation.is_special(&person) {
            info!(
                "event=mark_done module=service status=noop week={} reason=special_week",
                key
            );
            return Ok(MarkOutcome::NotCompletable);
        }
        if self.history.contains(&key) {
            return Ok(MarkOutcome::AlreadyDone);
        }

        let mut next = self.history.clone();
        next.record(HistoryEntry::new(key, person.clone(), completed_at));
        self.persist_history(&next)?;
        self.history = next;
        info!(
            "event=mark_done module=service status=ok week={} person={}",
            key, person
        );
        self.notify(ChangeKind::History);
        Ok(MarkOutcome::Recorded)
    }

    /// Removes the completion record of `week`. Returns whether one existed.
    pub fn undo_done(&mut self, week: u32, year: i32) -> EngineResult<bool> {
        let key = WeekKey::new(year, week)?;
        if !self.history.contains(&key) {
            return Ok(false);
        }

        let mut next = self.history.clone();
        next.remove(&key);
        self.persist_history(&next)?;
        self.history = next;
        info!("event=undo_done module=service status=ok week={}", key);
        self.notify(ChangeKind::History);
        Ok(true)
    }

    pub fn is_done(&self, week: u32, year: i32) -> EngineResult<bool> {
        let key = WeekKey::new(year, week)?;
        Ok(self.history.contains(&key))
    }

    /// Last `limit` completions, most recent first.
    pub fn recent(&self, limit: usize) -> Vec<&HistoryEntry> {
        self.history.recent(limit)
    }

    /// `count` consecutive weeks starting at `from`.
    pub fn upcoming(&self, from: WeekKey, count: u32) -> Vec<ScheduledWeek> {
        self.exporter()
            .assignments(from, count, &self.swaps)
            .into_iter()
            .map(|row| ScheduledWeek {
                key: row.key,
                monday: row.key.monday(),
                is_done: self.history.contains(&row.key),
                person: row.person,
            })
            .collect()
    }

    /// Resolved rows for `horizon_weeks` weeks from `start`.
    pub fn assignments(&self, start: WeekKey, horizon_weeks: u32) -> Vec<WeekAssignment> {
        self.exporter().assignments(start, horizon_weeks, &self.swaps)
    }

    /// Renders `horizon_weeks` weeks from `start` against the current swaps.
    pub fn render_calendar(
        &self,
        start: WeekKey,
        horizon_weeks: u32,
        generated_at: DateTime<Utc>,
    ) -> String {
        self.exporter()
            .render(start, horizon_weeks, &self.swaps, generated_at)
    }

    /// Renders the served feed: every week from the one containing `today`
    /// through `today + feed_horizon_months`.
    pub fn feed(&self, today: NaiveDate, generated_at: DateTime<Utc>) -> EngineResult<String> {
        let start = self.current_week(today)?;
        let horizon = feed_horizon_weeks(start, today, self.config.calendar.feed_horizon_months);
        info!(
            "event=feed_render module=service status=ok start={} weeks={}",
            start, horizon
        );
        Ok(self.render_calendar(start, horizon, generated_at))
    }

    /// Stored per-week state, if any.
    pub fn week_state(&self, week: u32, year: i32) -> EngineResult<Option<&Value>> {
        let key = WeekKey::new(year, week)?;
        Ok(self.week_states.get(&key))
    }

    /// Replaces the per-week state document of `week`.
    pub fn set_week_state(&mut self, week: u32, year: i32, state: Value) -> EngineResult<()> {
        let key = WeekKey::new(year, week)?;
        let mut next = self.week_states.clone();
        next.insert(key, state);
        self.persist(Namespace::WeekStates, &week_states_to_json(&next))?;
        self.week_states = next;
        self.notify(ChangeKind::WeekStates);
        Ok(())
    }

    /// Pulls every namespace through `KvStore::refresh` and installs changes.
    ///
    /// Unreachable backends are logged and skipped; the current working copy
    /// stays in place. Returns the kinds that changed.
    pub fn refresh(&mut self) -> Vec<ChangeKind> {
        let mut changed = Vec::new();
        for namespace in Namespace::ALL {
            match self.store.refresh(namespace) {
                Ok(Some(value)) => {
                    if self.apply_remote(namespace, &value) {
                        changed.push(ChangeKind::from(namespace));
                    }
                }
                Ok(None) => {}
                Err(err) => warn!(
                    "event=engine_refresh module=service status=degraded namespace={} error={}",
                    namespace, err
                ),
            }
        }
        changed
    }

    /// Installs a value that arrived out-of-band; the arriving value wins.
    ///
    /// Returns whether the working copy changed. Subscribers are notified
    /// on change.
    pub fn apply_remote(&mut self, namespace: Namespace, value: &Value) -> bool {
        let changed = self.install(namespace, value);
        if changed {
            info!(
                "event=remote_apply module=service status=ok namespace={}",
                namespace
            );
            self.notify(ChangeKind::from(namespace));
        }
        changed
    }

    fn install(&mut self, namespace: Namespace, value: &Value) -> bool {
        match namespace {
            Namespace::Swaps => {
                let next = SwapTable::from_json(value);
                replace_if_changed(&mut self.swaps, next)
            }
            Namespace::History => {
                let next = HistoryLedger::from_json(value);
                replace_if_changed(&mut self.history, next)
            }
            Namespace::WeekStates => {
                let next = week_states_from_json(value);
                replace_if_changed(&mut self.week_states, next)
            }
        }
    }

    fn persist_history(&self, ledger: &HistoryLedger) -> EngineResult<()> {
        let value = ledger
            .to_json()
            .map_err(|err| EngineError::PersistenceUnavailable(StoreError::Serialization(err)))?;
        self.persist(Namespace::History, &value)
    }

    fn persist(&self, namespace: Namespace, value: &Value) -> EngineResult<()> {
        self.store.save(namespace, value).map_err(|err| {
            error!(
                "event=persist module=service status=error namespace={} error={}",
                namespace, err
            );
            EngineError::PersistenceUnavailable(err)
        })
    }

    fn notify(&self, kind: ChangeKind) {
        for listener in &self.listeners {
            listener(kind);
        }
    }

    fn exporter(&self) -> CalendarExporter<'_> {
        CalendarExporter::new(&self.rotation, &self.config.calendar)
    }
}

/// Number of Mondays from `start` through `today + months`, inclusive.
fn feed_horizon_weeks(start: WeekKey, today: NaiveDate, months: u32) -> u32 {
    let end = today
        .checked_add_months(Months::new(months))
        .unwrap_or(today);
    let days = (end - start.monday()).num_days();
    if days < 0 {
        return 0;
    }
    u32::try_from(days / 7 + 1).unwrap_or(u32::MAX)
}

fn replace_if_changed<T: PartialEq>(slot: &mut T, next: T) -> bool {
    if *slot == next {
        return false;
    }
    *slot = next;
    true
}

fn week_states_from_json(value: &Value) -> BTreeMap<WeekKey, Value> {
    let mut states = BTreeMap::new();
    let Some(object) = value.as_object() else {
        return states;
    };
    for (raw_key, state) in object {
        match raw_key.parse::<WeekKey>() {
            Ok(key) => {
                states.insert(key, state.clone());
            }
            Err(err) => warn!(
                "event=week_states_load module=service status=skipped key={} error={}",
                raw_key, err
            ),
        }
    }
    states
}

fn week_states_to_json(states: &BTreeMap<WeekKey, Value>) -> Value {
    let object: Map<String, Value> = states
        .iter()
        .map(|(key, state)| (key.to_string(), state.clone()))
        .collect();
    Value::Object(object)
}
