//! iCalendar export.
//!
//! # Responsibility
//! - Serialize resolved duty weeks into an RFC 5545 feed.
//!
//! # Invariants
//! - Output is CRLF-terminated with balanced components.
//! - Identical inputs render identical text apart from `DTSTAMP`.

pub mod exporter;
pub mod writer;
