//! End-to-end room search over one snapshot of upstream data.

use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::config::CampusConfig;
use crate::dedup::merge_hierarchy;
use crate::error::Result;
use crate::event::{EventHierarchy, Hierarchy};
use crate::inventory::RoomInventory;
use crate::normalizer::normalize_sources;
use crate::query::RoomQuery;
use crate::ranking::{rank_rooms, RoomSearchResult};
use crate::source::{AstraEvent, CourseBookEvent, Fetched, MazevoEvent, SourceBatch, SourceKind};

/// Everything the fetch layer collected for one query date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CampusSnapshot {
    pub rooms: Fetched<RoomInventory>,
    pub course_book: Fetched<Hierarchy<CourseBookEvent>>,
    pub astra: Fetched<Hierarchy<AstraEvent>>,
    pub mazevo: Fetched<Hierarchy<MazevoEvent>>,
}

impl CampusSnapshot {
    /// The room inventory, or the error that makes the whole search unavailable.
    pub fn inventory(&self) -> Result<&RoomInventory> {
        self.rooms
            .require(SourceKind::Rooms)
            .inspect_err(|e| error!("{}", e))
    }

    /// Every event feed as a uniform batch. Fails if any single feed failed.
    pub fn batches(&self) -> Result<Vec<SourceBatch<'_>>> {
        let course_book = self.course_book.require(SourceKind::CourseBook);
        let astra = self.astra.require(SourceKind::Astra);
        let mazevo = self.mazevo.require(SourceKind::Mazevo);
        let batches = vec![
            SourceBatch::from_feed(SourceKind::CourseBook, course_book?),
            SourceBatch::from_feed(SourceKind::Astra, astra?),
            SourceBatch::from_feed(SourceKind::Mazevo, mazevo?),
        ];
        Ok(batches)
    }
}

/// Normalize and deduplicate every feed into one per-room timeline.
pub fn merged_events(
    snapshot: &CampusSnapshot,
    query: &RoomQuery,
    config: &CampusConfig,
) -> Result<EventHierarchy> {
    let window = query.window(config)?;
    let batches = snapshot.batches().inspect_err(|e| error!("{}", e))?;
    let mut events = normalize_sources(&batches, config, &query.buildings, window.anchor);
    merge_hierarchy(&mut events);
    Ok(events)
}

/// Run a complete search.
///
/// Fails closed: an invalid window or any failed provider yields an error and
/// no partial result. Zero matching rooms is a successful, empty result.
pub fn find_rooms(
    snapshot: &CampusSnapshot,
    query: &RoomQuery,
    config: &CampusConfig,
) -> Result<RoomSearchResult> {
    let window = query.window(config)?;
    let inventory = snapshot.inventory()?;
    let events = merged_events(snapshot, query, config)?;
    debug!(
        date = %query.date,
        start = %window.start,
        end = %window.end,
        "searching rooms"
    );
    Ok(rank_rooms(inventory, &events, query, &window, config))
}
