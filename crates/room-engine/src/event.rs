//! The canonical, source-agnostic busy interval.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};
use crate::time::floor_to_minute;

/// Subject given to every class-feed event. Other sources carry richer names.
pub const CLASS_SUBJECT: &str = "Class";

/// Two-level `building → room → items` map shared by every feed and by the
/// merged event timeline.
pub type Hierarchy<T> = BTreeMap<String, BTreeMap<String, Vec<T>>>;

/// Merged per-room timeline produced by the normalizer.
pub type EventHierarchy = Hierarchy<CanonicalEvent>;

/// A normalized booking of a room. Always satisfies `start < end`.
///
/// Deserialization goes through [`CanonicalEvent::try_new`], so an inverted or
/// empty event read from JSON is rejected instead of silently accepted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "EventRepr")]
pub struct CanonicalEvent {
    pub subject: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    /// Source reported a tentative (not yet confirmed) state.
    #[serde(default)]
    pub pending: bool,
}

impl CanonicalEvent {
    pub fn new(subject: impl Into<String>, start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self {
            subject: subject.into(),
            start,
            end,
            pending: false,
        }
    }

    /// Build an event, rejecting one that does not end after it starts.
    pub fn try_new(
        subject: impl Into<String>,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Self> {
        let subject = subject.into();
        if start >= end {
            return Err(EngineError::MalformedRecord(format!(
                "'{}' ends at {} which is not after its start {}",
                subject, end, start
            )));
        }
        Ok(Self::new(subject, start, end))
    }

    pub fn pending(mut self, pending: bool) -> Self {
        self.pending = pending;
        self
    }

    pub fn is_class(&self) -> bool {
        self.subject == CLASS_SUBJECT
    }

    /// Half-open overlap with `[window_start, window_end)`, compared at minute
    /// resolution after flooring. Touching is not overlap.
    pub fn overlaps(&self, window_start: DateTime<Utc>, window_end: DateTime<Utc>) -> bool {
        floor_to_minute(self.start) < floor_to_minute(window_end)
            && floor_to_minute(self.end) > floor_to_minute(window_start)
    }
}

#[derive(Deserialize)]
struct EventRepr {
    subject: String,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    #[serde(default)]
    pending: bool,
}

impl TryFrom<EventRepr> for CanonicalEvent {
    type Error = EngineError;

    fn try_from(repr: EventRepr) -> Result<Self> {
        Ok(Self::try_new(repr.subject, repr.start, repr.end)?.pending(repr.pending))
    }
}
