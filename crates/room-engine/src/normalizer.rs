//! Event normalizer: attributes feed records to a canonical `(building, room)`
//! and converts them into [`CanonicalEvent`]s on one shared timeline.
//!
//! Attribution order is fixed: resolve the building alias, drop excluded
//! buildings, drop buildings outside the requested scope, drop excluded rooms.
//! Only then is the record parsed, so a malformed record in an excluded room
//! never produces a warning.

use tracing::{debug, warn};

use crate::config::CampusConfig;
use crate::event::EventHierarchy;
use crate::query::BuildingFilter;
use crate::source::SourceBatch;
use crate::time::DayAnchor;

/// Accumulates canonical events from any number of source batches.
pub struct Normalizer<'a> {
    config: &'a CampusConfig,
    scope: &'a BuildingFilter,
    anchor: DayAnchor,
    events: EventHierarchy,
    skipped: usize,
}

impl<'a> Normalizer<'a> {
    pub fn new(config: &'a CampusConfig, scope: &'a BuildingFilter, anchor: DayAnchor) -> Self {
        Self {
            config,
            scope,
            anchor,
            events: EventHierarchy::new(),
            skipped: 0,
        }
    }

    /// Append every attributable record of `batch` to the timeline.
    ///
    /// Records that fail to parse are logged and skipped individually.
    pub fn ingest(&mut self, batch: &SourceBatch<'_>) {
        let config = self.config;
        let mut accepted = 0usize;
        for entry in &batch.records {
            let building = config.canonical_building(entry.building);
            if config.is_excluded_building(building)
                || !self.scope.admits(building)
                || config.is_excluded_room(building, entry.room)
            {
                continue;
            }
            match entry.record.normalize(&self.anchor) {
                Ok(event) => {
                    self.events
                        .entry(building.to_string())
                        .or_default()
                        .entry(entry.room.to_string())
                        .or_default()
                        .push(event);
                    accepted += 1;
                }
                Err(err) => {
                    self.skipped += 1;
                    warn!(
                        source = %batch.kind,
                        building,
                        room = entry.room,
                        "skipping event record: {}",
                        err
                    );
                }
            }
        }
        debug!(source = %batch.kind, accepted, "normalized source");
    }

    /// Number of records dropped as malformed so far.
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    pub fn finish(self) -> EventHierarchy {
        self.events
    }
}

/// Normalize all batches, in order, into one per-room timeline.
pub fn normalize_sources(
    batches: &[SourceBatch<'_>],
    config: &CampusConfig,
    scope: &BuildingFilter,
    anchor: DayAnchor,
) -> EventHierarchy {
    let mut normalizer = Normalizer::new(config, scope, anchor);
    for batch in batches {
        normalizer.ingest(batch);
    }
    match normalizer.skipped() {
        0 => debug!(sources = batches.len(), "normalized all sources"),
        skipped => warn!(skipped, "normalized all sources with malformed records dropped"),
    }
    normalizer.finish()
}
