//! Core domain logic for the kitchen duty engine.
//! Rotation, swaps, completion history and calendar export live here;
//! the CLI and HTTP feed only call into this crate.

pub mod config;
pub mod db;
pub mod history;
pub mod ics;
pub mod logging;
pub mod model;
pub mod repo;
pub mod schedule;
pub mod service;

pub use config::{
    load_config, CalendarConfig, ConfigError, DateForm, DutyConfig, EventMode, TimezoneConfig,
};
pub use history::HistoryLedger;
pub use ics::exporter::{CalendarExporter, WeekAssignment};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::history_entry::HistoryEntry;
pub use model::roster::{Roster, RosterError};
pub use model::swap_table::{SwapOutcome, SwapTable};
pub use model::week_key::{WeekInputError, WeekKey};
pub use repo::http_store::HttpKvStore;
pub use repo::kv_store::{KvStore, MemoryKvStore, Namespace, StoreError, StoreResult};
pub use repo::sqlite_store::SqliteKvStore;
pub use repo::tiered_store::TieredStore;
pub use schedule::iso_calendar::{iso_week_of, iso_weeks_in_year, monday_of, week_difference};
pub use schedule::rotation::Rotation;
pub use service::duty_engine::{
    ChangeKind, DutyEngine, EngineError, EngineResult, MarkOutcome, ScheduledWeek,
};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
