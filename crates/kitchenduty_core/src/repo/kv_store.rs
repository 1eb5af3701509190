//! Namespaced key-value persistence contract.
//!
//! # Responsibility
//! - Define the load/save contract the engine persists through.
//! - Provide an in-process implementation for tests and ephemeral runs.
//!
//! # Invariants
//! - Values are whole JSON documents; a save replaces the namespace.
//! - `Ok(None)` means "never written", not an error.
//! - Concurrent writers are last-write-wins; no locking across clients.

use crate::db::DbError;
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

pub type StoreResult<T> = Result<T, StoreError>;

/// Persisted state namespaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Namespace {
    WeekStates,
    History,
    Swaps,
}

impl Namespace {
    pub const ALL: [Namespace; 3] = [Self::WeekStates, Self::History, Self::Swaps];

    /// Storage key of the namespace.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::WeekStates => "weekStates",
            Self::History => "history",
            Self::Swaps => "swaps",
        }
    }
}

impl Display for Namespace {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Persistence failure.
#[derive(Debug)]
pub enum StoreError {
    /// Backend unreachable or refused the request.
    Unavailable(String),
    Db(DbError),
    Serialization(serde_json::Error),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unavailable(reason) => write!(f, "store unavailable: {reason}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::Serialization(err) => write!(f, "invalid stored JSON: {err}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Unavailable(_) => None,
            Self::Db(err) => Some(err),
            Self::Serialization(err) => Some(err),
        }
    }
}

impl From<DbError> for StoreError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(value: serde_json::Error) -> Self {
        Self::Serialization(value)
    }
}

/// Load/save contract for namespaced JSON documents.
pub trait KvStore {
    /// Returns the best value available without waiting on slow backends.
    fn load(&self, namespace: Namespace) -> StoreResult<Option<Value>>;

    /// Persists `value`; success means the write is committed.
    fn save(&self, namespace: Namespace, value: &Value) -> StoreResult<()>;

    /// Fetches the freshest value, possibly from a slower authoritative source.
    fn refresh(&self, namespace: Namespace) -> StoreResult<Option<Value>> {
        self.load(namespace)
    }

    /// Whether the namespace holds a local write not yet pushed upstream.
    fn is_pending(&self, _namespace: Namespace) -> StoreResult<bool> {
        Ok(false)
    }

    /// Records or clears the unpushed-write mark for `namespace`.
    fn set_pending(&self, _namespace: Namespace, _pending: bool) -> StoreResult<()> {
        Ok(())
    }
}

impl<S: KvStore + ?Sized> KvStore for Box<S> {
    fn load(&self, namespace: Namespace) -> StoreResult<Option<Value>> {
        (**self).load(namespace)
    }

    fn save(&self, namespace: Namespace, value: &Value) -> StoreResult<()> {
        (**self).save(namespace, value)
    }

    fn refresh(&self, namespace: Namespace) -> StoreResult<Option<Value>> {
        (**self).refresh(namespace)
    }

    fn is_pending(&self, namespace: Namespace) -> StoreResult<bool> {
        (**self).is_pending(namespace)
    }

    fn set_pending(&self, namespace: Namespace, pending: bool) -> StoreResult<()> {
        (**self).set_pending(namespace, pending)
    }
}

impl<S: KvStore + ?Sized> KvStore for Arc<S> {
    fn load(&self, namespace: Namespace) -> StoreResult<Option<Value>> {
        (**self).load(namespace)
    }

    fn save(&self, namespace: Namespace, value: &Value) -> StoreResult<()> {
        (**self).save(namespace, value)
    }

    fn refresh(&self, namespace: Namespace) -> StoreResult<Option<Value>> {
        (**self).refresh(namespace)
    }

    fn is_pending(&self, namespace: Namespace) -> StoreResult<bool> {
        (**self).is_pending(namespace)
    }

    fn set_pending(&self, namespace: Namespace, pending: bool) -> StoreResult<()> {
        (**self).set_pending(namespace, pending)
    }
}

/// In-process store.
///
/// Can be switched offline to exercise degraded paths.
#[derive(Debug)]
pub struct MemoryKvStore {
    values: Mutex<BTreeMap<Namespace, Value>>,
    pending: Mutex<BTreeSet<Namespace>>,
    online: AtomicBool,
}

impl Default for MemoryKvStore {
    fn default() -> Self {
        Self {
            values: Mutex::new(BTreeMap::new()),
            pending: Mutex::new(BTreeSet::new()),
            online: AtomicBool::new(true),
        }
    }
}

impl MemoryKvStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Toggles availability; offline stores fail every call.
    pub fn set_online(&self, online: bool) {
        self.online.store(online, Ordering::SeqCst);
    }

    pub fn is_online(&self) -> bool {
        self.online.load(Ordering::SeqCst)
    }

    fn ensure_online(&self) -> StoreResult<()> {
        if self.is_online() {
            Ok(())
        } else {
            Err(StoreError::Unavailable("memory store is offline".to_string()))
        }
    }
}

impl KvStore for MemoryKvStore {
    fn load(&self, namespace: Namespace) -> StoreResult<Option<Value>> {
        self.ensure_online()?;
        let values = self
            .values
            .lock()
            .map_err(|_| StoreError::Unavailable("memory store lock poisoned".to_string()))?;
        Ok(values.get(&namespace).cloned())
    }

    fn save(&self, namespace: Namespace, value: &Value) -> StoreResult<()> {
        self.ensure_online()?;
        let mut values = self
            .values
            .lock()
            .map_err(|_| StoreError::Unavailable("memory store lock poisoned".to_string()))?;
        values.insert(namespace, value.clone());
        Ok(())
    }

    fn is_pending(&self, namespace: Namespace) -> StoreResult<bool> {
        self.ensure_online()?;
        let pending = self
            .pending
            .lock()
            .map_err(|_| StoreError::Unavailable("memory store lock poisoned".to_string()))?;
        Ok(pending.contains(&namespace))
    }

    fn set_pending(&self, namespace: Namespace, pending: bool) -> StoreResult<()> {
        self.ensure_online()?;
        let mut marks = self
            .pending
            .lock()
            .map_err(|_| StoreError::Unavailable("memory store lock poisoned".to_string()))?;
        if pending {
            marks.insert(namespace);
        } else {
            marks.remove(&namespace);
        }
        Ok(())
    }
}
