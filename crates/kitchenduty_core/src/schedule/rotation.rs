//! Week-to-participant resolution.
//!
//! # Responsibility
//! - Resolve the assignee of any week, past or future.
//!
//! # Invariants
//! - A swap entry for the week wins unconditionally.
//! - Otherwise weeks at an even distance from the anchor belong to the
//!   special participant, including the anchor itself and weeks before it.
//! - Odd weeks rotate through the roster with floor division, so pre-anchor
//!   weeks step backward one position at a time.

use crate::model::roster::Roster;
use crate::model::swap_table::SwapTable;
use crate::model::week_key::WeekKey;

/// Weeks per rotation step. The index is `floor(diff / ROTATION_STEP_WEEKS)`;
/// Euclidean division gives floor semantics for negative differences.
pub const ROTATION_STEP_WEEKS: i64 = 2;

/// Roster plus cadence anchor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rotation {
    roster: Roster,
    anchor: WeekKey,
}

impl Rotation {
    pub fn new(roster: Roster, anchor: WeekKey) -> Self {
        Self { roster, anchor }
    }

    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    /// Week at which the special participant is defined to hold duty.
    pub fn anchor(&self) -> WeekKey {
        self.anchor
    }

    /// Resolves the assignee of `key`, honoring overrides in `swaps`.
    pub fn assign<'a>(&'a self, key: WeekKey, swaps: &'a SwapTable) -> &'a str {
        match swaps.get(&key) {
            Some(person) => person,
            None => self.scheduled(key),
        }
    }

    /// Assignee of `key` from the cadence alone, ignoring swaps.
    pub fn scheduled(&self, key: WeekKey) -> &str {
        let diff = self.anchor.weeks_until(&key);
        if diff.rem_euclid(ROTATION_STEP_WEEKS) == 0 {
            return self.roster.special();
        }

        let rotation_index = diff.div_euclid(ROTATION_STEP_WEEKS);
        let members = self.roster.members();
        // Roster guarantees at least one member, so the modulus is non-zero.
        let index = rotation_index.rem_euclid(members.len() as i64) as usize;
        &members[index]
    }

    pub fn is_special(&self, person: &str) -> bool {
        self.roster.is_special(person)
    }
}
