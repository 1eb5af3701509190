//! Domain model for duty assignment.
//!
//! # Responsibility
//! - Define the value types shared by the resolver, coordinator, ledger and
//!   exporter.
//!
//! # Invariants
//! - Every per-week record is keyed by `WeekKey`.
//! - Model types carry no persistence or clock dependencies.

pub mod history_entry;
pub mod roster;
pub mod swap_table;
pub mod week_key;
