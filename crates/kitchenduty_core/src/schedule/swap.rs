//! Reciprocal-week search for duty swaps.
//!
//! # Responsibility
//! - Find the first later week currently held by the requested participant.
//!
//! # Invariants
//! - The search starts at the week after the requested one and visits at most
//!   `horizon_weeks` weeks.
//! - Every candidate is resolved against the live swap table, so chained
//!   swaps compose.
//! - A week already held by the requester is never a valid reciprocal week;
//!   a swap with oneself exhausts the horizon.
//! - The search is pure; recording the exchange is the caller's job.

use crate::model::swap_table::{SwapOutcome, SwapTable};
use crate::model::week_key::WeekKey;
use crate::schedule::rotation::Rotation;

/// Default number of weeks scanned for a reciprocal slot.
pub const DEFAULT_SWAP_HORIZON_WEEKS: u32 = 8;

/// Looks for a week after `week` that `target` currently holds.
///
/// Returns `None` when the horizon is exhausted without a match.
pub fn find_reciprocal(
    rotation: &Rotation,
    swaps: &SwapTable,
    week: WeekKey,
    target: &str,
    horizon_weeks: u32,
) -> Option<SwapOutcome> {
    let holder = rotation.assign(week, swaps);

    let mut candidate = week;
    for _ in 0..horizon_weeks {
        candidate = candidate.next().ok()?;
        let assignee = rotation.assign(candidate, swaps);
        if assignee == target && assignee != holder {
            return Some(SwapOutcome {
                week_a: week,
                person_a: holder.to_string(),
                week_b: candidate,
                person_b: target.to_string(),
            });
        }
    }

    None
}
