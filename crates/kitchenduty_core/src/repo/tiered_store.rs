//! Two-tier store: synchronous local mirror plus authoritative remote.
//!
//! # Responsibility
//! - Answer loads from the local mirror without touching the network.
//! - Write through to both tiers on save.
//! - Pull fresher remote values on refresh and mirror them locally.
//!
//! # Invariants
//! - A save is committed once the local tier accepts it; a remote failure
//!   marks the store degraded and the namespace pending in the local tier.
//! - A pending namespace is pushed on the next refresh instead of pulled;
//!   the mark clears only after the remote accepts the push.
//! - Otherwise the remote value overwrites the local one on refresh.
//! - A remote that has never been written does not clear local state.

use crate::repo::kv_store::{KvStore, Namespace, StoreResult};
use log::{info, warn};
use serde_json::Value;
use std::sync::atomic::{AtomicBool, Ordering};

/// Local-first cache in front of a remote store.
pub struct TieredStore<L, R> {
    local: L,
    remote: R,
    degraded: AtomicBool,
}

impl<L: KvStore, R: KvStore> TieredStore<L, R> {
    pub fn new(local: L, remote: R) -> Self {
        Self {
            local,
            remote,
            degraded: AtomicBool::new(false),
        }
    }

    pub fn local(&self) -> &L {
        &self.local
    }

    pub fn remote(&self) -> &R {
        &self.remote
    }

    /// Whether the last remote interaction failed.
    pub fn is_degraded(&self) -> bool {
        self.degraded.load(Ordering::SeqCst)
    }

    // A pending local value is newer than the remote copy.
    fn push_pending(&self, namespace: Namespace, value: Value) -> StoreResult<Option<Value>> {
        match self.remote.save(namespace, &value) {
            Ok(()) => {
                self.mark(namespace, "push", true);
                self.local.set_pending(namespace, false)?;
                info!(
                    "event=remote_push module=repo status=ok namespace={}",
                    namespace
                );
                Ok(Some(value))
            }
            Err(err) => {
                self.mark(namespace, "push", false);
                warn!(
                    "event=remote_push module=repo status=degraded namespace={} error={}",
                    namespace, err
                );
                Err(err)
            }
        }
    }

    fn mark(&self, namespace: Namespace, operation: &str, ok: bool) {
        let was_degraded = self.degraded.swap(!ok, Ordering::SeqCst);
        if ok && was_degraded {
            info!(
                "event=remote_recovered module=repo status=ok namespace={} operation={}",
                namespace, operation
            );
        }
    }
}

impl<L: KvStore, R: KvStore> KvStore for TieredStore<L, R> {
    fn load(&self, namespace: Namespace) -> StoreResult<Option<Value>> {
        self.local.load(namespace)
    }

    fn save(&self, namespace: Namespace, value: &Value) -> StoreResult<()> {
        self.local.save(namespace, value)?;
        match self.remote.save(namespace, value) {
            Ok(()) => {
                self.mark(namespace, "save", true);
                self.local.set_pending(namespace, false)?;
            }
            Err(err) => {
                self.mark(namespace, "save", false);
                self.local.set_pending(namespace, true)?;
                warn!(
                    "event=remote_save module=repo status=degraded namespace={} error={}",
                    namespace, err
                );
            }
        }
        Ok(())
    }

    fn refresh(&self, namespace: Namespace) -> StoreResult<Option<Value>> {
        if self.local.is_pending(namespace)? {
            if let Some(value) = self.local.load(namespace)? {
                return self.push_pending(namespace, value);
            }
            self.local.set_pending(namespace, false)?;
        }

        match self.remote.load(namespace) {
            Ok(Some(value)) => {
                self.mark(namespace, "refresh", true);
                self.local.save(namespace, &value)?;
                Ok(Some(value))
            }
            Ok(None) => {
                self.mark(namespace, "refresh", true);
                self.local.load(namespace)
            }
            Err(err) => {
                self.mark(namespace, "refresh", false);
                warn!(
                    "event=remote_refresh module=repo status=degraded namespace={} error={}",
                    namespace, err
                );
                Err(err)
            }
        }
    }
}
