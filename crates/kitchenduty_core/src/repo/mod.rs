//! Persistence contract and backends.
//!
//! # Responsibility
//! - Define the namespaced load/save contract (`KvStore`).
//! - Provide memory, SQLite, HTTP and two-tier implementations.
//!
//! # Invariants
//! - Backends store whole JSON documents per namespace; merge logic lives in
//!   the engine, not here.

pub mod http_store;
pub mod kv_store;
pub mod sqlite_store;
pub mod tiered_store;
