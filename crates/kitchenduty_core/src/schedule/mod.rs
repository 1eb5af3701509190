//! Duty schedule computation.
//!
//! # Responsibility
//! - ISO week arithmetic (`iso_calendar`).
//! - Week-to-participant resolution (`rotation`).
//! - Reciprocal-week search for swaps (`swap`).
//!
//! # Invariants
//! - Everything here is pure and synchronous; no clock or storage access.

pub mod iso_calendar;
pub mod rotation;
pub mod swap;
