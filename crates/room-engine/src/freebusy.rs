//! Free intervals of a room inside the query window.
//!
//! Sorts events by start time, merges overlapping busy periods, then reports
//! the gaps between merged periods. Used to tell the user *when* a partially
//! available room is open.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::event::CanonicalEvent;
use crate::time::floor_to_minute;

/// A free time slot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FreeSlot {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub duration_minutes: i64,
}

/// Merge overlapping or adjacent busy periods, clipped to the given window.
///
/// Returns a sorted, non-overlapping list of (start, end) intervals.
fn merge_busy_periods(
    events: &[CanonicalEvent],
    window_start: DateTime<Utc>,
    window_end: DateTime<Utc>,
) -> Vec<(DateTime<Utc>, DateTime<Utc>)> {
    let mut intervals: Vec<(DateTime<Utc>, DateTime<Utc>)> = events
        .iter()
        .filter(|e| e.overlaps(window_start, window_end))
        .map(|e| {
            (
                floor_to_minute(e.start).max(window_start),
                floor_to_minute(e.end).min(window_end),
            )
        })
        .collect();

    intervals.sort_by_key(|&(start, end)| (start, end));

    let mut merged: Vec<(DateTime<Utc>, DateTime<Utc>)> = Vec::new();
    for (start, end) in intervals {
        if let Some(last) = merged.last_mut() {
            if start <= last.1 {
                last.1 = last.1.max(end);
                continue;
            }
        }
        merged.push((start, end));
    }

    merged
}

/// Free slots within `[window_start, window_end)`, sorted by start time.
///
/// Instants are floored to the minute, as in [`crate::availability::room_availability`].
pub fn free_slots(
    events: &[CanonicalEvent],
    window_start: DateTime<Utc>,
    window_end: DateTime<Utc>,
) -> Vec<FreeSlot> {
    let window_start = floor_to_minute(window_start);
    let window_end = floor_to_minute(window_end);
    let mut slots = Vec::new();
    let mut cursor = window_start;

    for (busy_start, busy_end) in merge_busy_periods(events, window_start, window_end) {
        if cursor < busy_start {
            slots.push(slot(cursor, busy_start));
        }
        cursor = cursor.max(busy_end);
    }

    if cursor < window_end {
        slots.push(slot(cursor, window_end));
    }

    slots
}

fn slot(start: DateTime<Utc>, end: DateTime<Utc>) -> FreeSlot {
    FreeSlot {
        start,
        end,
        duration_minutes: (end - start).num_minutes(),
    }
}
