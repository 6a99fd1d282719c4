//! Free/busy classification of one room over a query window.
//!
//! The window is modelled at minute resolution: each overlapping event covers
//! its clamped span of minutes, and the rest of the window is free. A room is listed as
//! partially available when some run of free minutes is strictly longer than
//! the gap threshold, which filters out the short breaks between back-to-back
//! classes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::event::CanonicalEvent;
use crate::time::floor_to_minute;

pub const DEFAULT_GAP_THRESHOLD_MINUTES: u32 = 15;

/// Availability of a room within a window.
///
/// `completely_free` implies `has_acceptable_gap`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Availability {
    /// No event overlaps the window.
    pub completely_free: bool,
    /// Some free run exceeds the gap threshold.
    pub has_acceptable_gap: bool,
}

impl Availability {
    pub const FREE: Availability = Availability {
        completely_free: true,
        has_acceptable_gap: true,
    };
    pub const PARTIAL: Availability = Availability {
        completely_free: false,
        has_acceptable_gap: true,
    };
    pub const BUSY: Availability = Availability {
        completely_free: false,
        has_acceptable_gap: false,
    };

    /// Whether a room with this availability belongs in the results.
    pub fn is_listed(self, full_availability_only: bool) -> bool {
        self.completely_free || (self.has_acceptable_gap && !full_availability_only)
    }
}

/// Whole minutes from `from` to `to`, floored.
pub(crate) fn minutes_between(from: DateTime<Utc>, to: DateTime<Utc>) -> i64 {
    (to - from).num_seconds().div_euclid(60)
}

/// Classify a room's events against `[window_start, window_end)`.
///
/// Every instant is floored to the minute before it is compared, so an event
/// that only reaches into the window by a few seconds touches it without
/// overlapping. Events touching the window (ending exactly at the start, or
/// starting exactly at the end) are ignored. An empty window is trivially free.
///
/// Busy spans are kept as minute offsets rather than one flag per minute, so
/// the cost depends on the number of events, not on the window length.
pub fn room_availability(
    events: &[CanonicalEvent],
    window_start: DateTime<Utc>,
    window_end: DateTime<Utc>,
    gap_threshold_minutes: u32,
) -> Availability {
    let window_start = floor_to_minute(window_start);
    let window_end = floor_to_minute(window_end);
    let length = minutes_between(window_start, window_end);
    if length <= 0 {
        return Availability::FREE;
    }

    let mut busy: Vec<(i64, i64)> = events
        .iter()
        .filter(|event| event.overlaps(window_start, window_end))
        .map(|event| {
            (
                minutes_between(window_start, floor_to_minute(event.start)).max(0),
                minutes_between(window_start, floor_to_minute(event.end)).min(length),
            )
        })
        .collect();

    if busy.is_empty() {
        return Availability::FREE;
    }
    busy.sort_unstable();

    let threshold = i64::from(gap_threshold_minutes);
    let mut free_from = 0i64;
    for (from, to) in busy {
        if from - free_from > threshold {
            return Availability::PARTIAL;
        }
        free_from = free_from.max(to);
    }
    if length - free_from > threshold {
        return Availability::PARTIAL;
    }

    Availability::BUSY
}
