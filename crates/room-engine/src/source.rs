//! Upstream event feeds and their conversion into [`CanonicalEvent`]s.
//!
//! Each feed has its own record shape and its own notion of time and status.
//! Every record type implements [`EventRecord`], so the normalizer can walk all
//! feeds uniformly as a list of `(SourceKind, records)` batches.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};
use crate::event::{CanonicalEvent, Hierarchy, CLASS_SUBJECT};
use crate::time::DayAnchor;

/// The only ad-hoc booking state that is final.
pub const ASTRA_FINAL_STATE: &str = "Scheduled";
/// The only managed-event status that is final.
pub const MAZEVO_CONFIRMED_STATUS: &str = "Confirmed";
/// Subject used when a booking arrives without a name.
pub const UNTITLED_SUBJECT: &str = "Reserved";

/// Identifies one of the four upstream providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    /// Room inventory.
    Rooms,
    /// Class schedule.
    CourseBook,
    /// Ad-hoc room bookings.
    Astra,
    /// Event-management bookings.
    Mazevo,
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SourceKind::Rooms => "rooms",
            SourceKind::CourseBook => "coursebook",
            SourceKind::Astra => "astra",
            SourceKind::Mazevo => "mazevo",
        };
        f.write_str(name)
    }
}

/// Outcome of fetching one provider, as handed over by the fetch layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state")]
pub enum Fetched<T> {
    #[serde(rename = "done")]
    Ready { data: T },
    #[serde(rename = "error")]
    Failed { message: String },
}

impl<T> Fetched<T> {
    pub fn ready(data: T) -> Self {
        Fetched::Ready { data }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Fetched::Failed {
            message: message.into(),
        }
    }

    /// Borrow the payload, or report the provider as unavailable.
    pub fn require(&self, feed: SourceKind) -> Result<&T> {
        match self {
            Fetched::Ready { data } => Ok(data),
            Fetched::Failed { message } => Err(EngineError::SourceUnavailable {
                feed,
                reason: message.clone(),
            }),
        }
    }
}

/// A source-specific record that can be turned into a canonical event.
pub trait EventRecord {
    fn normalize(&self, anchor: &DayAnchor) -> Result<CanonicalEvent>;
}

/// Class section meeting. Times are time-of-day on the query date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CourseBookEvent {
    #[serde(default)]
    pub section: String,
    pub start_time: String,
    pub end_time: String,
}

/// Ad-hoc booking with absolute timestamps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AstraEvent {
    #[serde(default)]
    pub activity_name: Option<String>,
    pub start_date: String,
    pub end_date: String,
    /// `None` means the booking backs a class.
    #[serde(default)]
    pub current_state: Option<String>,
}

/// Event-management booking with absolute timestamps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MazevoEvent {
    #[serde(default)]
    pub event_name: Option<String>,
    #[serde(default)]
    pub organization_name: Option<String>,
    pub date_time_start: String,
    pub date_time_end: String,
    #[serde(default)]
    pub status_description: Option<String>,
}

impl EventRecord for CourseBookEvent {
    fn normalize(&self, anchor: &DayAnchor) -> Result<CanonicalEvent> {
        let start = anchor.time_of_day(&self.start_time)?;
        let end = anchor.time_of_day(&self.end_time)?;
        CanonicalEvent::try_new(CLASS_SUBJECT, start, end)
    }
}

impl EventRecord for AstraEvent {
    fn normalize(&self, anchor: &DayAnchor) -> Result<CanonicalEvent> {
        let start = anchor.timestamp(&self.start_date)?;
        let end = anchor.timestamp(&self.end_date)?;
        let subject = non_blank(self.activity_name.as_deref()).unwrap_or(UNTITLED_SUBJECT);
        let pending = self
            .current_state
            .as_deref()
            .is_some_and(|state| state != ASTRA_FINAL_STATE);
        Ok(CanonicalEvent::try_new(subject, start, end)?.pending(pending))
    }
}

impl EventRecord for MazevoEvent {
    fn normalize(&self, anchor: &DayAnchor) -> Result<CanonicalEvent> {
        let start = anchor.timestamp(&self.date_time_start)?;
        let end = anchor.timestamp(&self.date_time_end)?;
        let name = non_blank(self.event_name.as_deref()).unwrap_or(UNTITLED_SUBJECT);
        let subject = match non_blank(self.organization_name.as_deref()) {
            Some(org) => format!("{} ({})", name, org),
            None => name.to_string(),
        };
        let pending = self.status_description.as_deref() != Some(MAZEVO_CONFIRMED_STATUS);
        Ok(CanonicalEvent::try_new(subject, start, end)?.pending(pending))
    }
}

fn non_blank(s: Option<&str>) -> Option<&str> {
    s.map(str::trim).filter(|s| !s.is_empty())
}

/// One record of a feed, still attributed to the feed's raw building/room keys.
pub struct RecordRef<'a> {
    pub building: &'a str,
    pub room: &'a str,
    pub record: &'a dyn EventRecord,
}

/// All records of a single feed.
pub struct SourceBatch<'a> {
    pub kind: SourceKind,
    pub records: Vec<RecordRef<'a>>,
}

impl<'a> SourceBatch<'a> {
    pub fn from_feed<R: EventRecord>(kind: SourceKind, feed: &'a Hierarchy<R>) -> Self {
        let records = feed
            .iter()
            .flat_map(|(building, rooms)| {
                rooms.iter().flat_map(move |(room, records)| {
                    records.iter().map(move |record| RecordRef {
                        building: building.as_str(),
                        room: room.as_str(),
                        record: record as &dyn EventRecord,
                    })
                })
            })
            .collect();
        Self { kind, records }
    }
}
