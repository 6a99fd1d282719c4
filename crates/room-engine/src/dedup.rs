//! Collapse events that different feeds report for the same time range.
//!
//! The same booking often appears in more than one feed, e.g. a class section
//! also present as an ad-hoc booking. Events are grouped by their exact
//! `(start, end)` pair:
//!
//! - a described event replaces a bare `"Class"` entry wholesale, pending flag
//!   included;
//! - a `"Class"` entry arriving after a described one adds nothing;
//! - distinct described subjects are joined with `", "` in first-seen order,
//!   and the group keeps the pending flag of the record that opened it.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::event::{CanonicalEvent, EventHierarchy};

struct Group {
    event: CanonicalEvent,
    subjects: Vec<String>,
}

impl Group {
    fn open(event: CanonicalEvent) -> Self {
        Self {
            subjects: vec![event.subject.clone()],
            event,
        }
    }

    fn absorb(&mut self, incoming: CanonicalEvent) {
        if self.event.is_class() && !incoming.is_class() {
            *self = Group::open(incoming);
        } else if !incoming.is_class() && !self.subjects.contains(&incoming.subject) {
            self.event.subject.push_str(", ");
            self.event.subject.push_str(&incoming.subject);
            self.subjects.push(incoming.subject);
        }
    }
}

/// Merge one room's events. The result has no two entries with the same
/// `(start, end)`, and keeps first-seen order of the time ranges.
pub fn merge_duplicates(events: Vec<CanonicalEvent>) -> Vec<CanonicalEvent> {
    let mut groups: Vec<Group> = Vec::with_capacity(events.len());
    let mut by_range: HashMap<(DateTime<Utc>, DateTime<Utc>), usize> = HashMap::new();

    for event in events {
        let key = (event.start, event.end);
        match by_range.get(&key) {
            Some(&idx) => groups[idx].absorb(event),
            None => {
                by_range.insert(key, groups.len());
                groups.push(Group::open(event));
            }
        }
    }

    groups.into_iter().map(|g| g.event).collect()
}

/// Merge duplicates in every room of the hierarchy, in place.
pub fn merge_hierarchy(events: &mut EventHierarchy) {
    let mut collapsed = 0usize;
    for rooms in events.values_mut() {
        for list in rooms.values_mut() {
            let before = list.len();
            *list = merge_duplicates(std::mem::take(list));
            collapsed += before - list.len();
        }
    }
    debug!(collapsed, "merged duplicate events");
}
