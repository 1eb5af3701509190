//! Completed-week record.

use crate::model::week_key::WeekKey;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One completed duty week.
///
/// Serialized as `{"week": "2025-W49", "person": "Joya", "date": "<rfc3339>"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub week: WeekKey,
    pub person: String,
    /// Moment the week was marked done.
    #[serde(rename = "date")]
    pub completed_at: DateTime<Utc>,
}

impl HistoryEntry {
    pub fn new(week: WeekKey, person: impl Into<String>, completed_at: DateTime<Utc>) -> Self {
        Self {
            week,
            person: person.into(),
            completed_at,
        }
    }
}
