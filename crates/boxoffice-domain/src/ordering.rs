//! Canonical multi-seat claim ordering.
//!
//! Two concurrent requests that both want seats {A, C} must acquire the row
//! locks in the same sequence, so the database's internal locking cannot form
//! a cycle. Applied before any I/O.

use std::collections::HashSet;

use uuid::Uuid;

/// Sort seat ids into the canonical claim order (ascending by id).
pub fn canonical_seat_order(mut seat_ids: Vec<Uuid>) -> Vec<Uuid> {
    seat_ids.sort_unstable();
    seat_ids
}

/// True when the selection repeats a seat id.
pub fn has_duplicates(seat_ids: &[Uuid]) -> bool {
    let mut seen = HashSet::with_capacity(seat_ids.len());
    seat_ids.iter().any(|id| !seen.insert(id))
}
