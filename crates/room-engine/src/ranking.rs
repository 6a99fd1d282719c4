//! Room ranking and filtering: turns the merged timeline and the inventory
//! into the ordered building/room resources handed to presentation.
//!
//! Buildings are visited in code order and rooms in name order, so surrogate
//! IDs are stable for identical inputs. IDs are only handed out to rooms that
//! survive every filter, and to a building when its first room does.

use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::availability::{room_availability, Availability};
use crate::config::CampusConfig;
use crate::event::{CanonicalEvent, EventHierarchy};
use crate::freebusy::{free_slots, FreeSlot};
use crate::geo::{distance_between, Distance};
use crate::inventory::{qualified_room_name, Capacity, Room, RoomInventory};
use crate::query::{QueryWindow, RoomQuery};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildingResource {
    pub id: u32,
    pub code: String,
    pub text: String,
    /// Unknown when either the user or the building has no coordinates.
    pub distance: Option<Distance>,
    pub room_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoomResource {
    pub id: u32,
    pub building_id: u32,
    pub building: String,
    pub name: String,
    pub qualified_name: String,
    pub capacity: Capacity,
    pub link: String,
    pub availability: Availability,
    pub free_slots: Vec<FreeSlot>,
}

/// One timeline entry, keyed by surrogate IDs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleEntry {
    /// `"{room_id}-{index}"`, unique within one result.
    pub id: String,
    pub room_id: u32,
    pub building_id: u32,
    pub subject: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub pending: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoomSearchResult {
    pub buildings: Vec<BuildingResource>,
    pub rooms: Vec<RoomResource>,
    pub events: Vec<ScheduleEntry>,
    pub summary: String,
}

/// Filter, identify and order rooms for one query.
pub fn rank_rooms(
    inventory: &RoomInventory,
    events: &EventHierarchy,
    query: &RoomQuery,
    window: &QueryWindow,
    config: &CampusConfig,
) -> RoomSearchResult {
    let search = query.search_term();
    let mut buildings: Vec<BuildingResource> = Vec::new();
    let mut rooms: Vec<RoomResource> = Vec::new();
    let mut schedule: Vec<ScheduleEntry> = Vec::new();
    let mut unknown_capacity = 0usize;

    for (code, info) in inventory {
        if config.is_excluded_building(code) || !query.buildings.admits(code) {
            continue;
        }
        let display = config.display_name(code);
        let mut building_slot: Option<usize> = None;

        let mut sorted: Vec<&Room> = info.rooms.iter().collect();
        sorted.sort_by(|a, b| a.name.cmp(&b.name));

        for room in sorted {
            if config.is_excluded_room(code, &room.name)
                || (query.min_capacity > 0 && room.capacity.below(query.min_capacity))
            {
                continue;
            }

            let room_events: &[CanonicalEvent] = events
                .get(code)
                .and_then(|r| r.get(&room.name))
                .map(Vec::as_slice)
                .unwrap_or(&[]);

            let availability = room_availability(
                room_events,
                window.start,
                window.end,
                config.gap_threshold_minutes,
            );
            if !availability.is_listed(query.full_availability_only) {
                continue;
            }
            if !matches_search(&search, code, &room.name, display, room_events) {
                continue;
            }

            let slot = *building_slot.get_or_insert_with(|| {
                buildings.push(BuildingResource {
                    id: buildings.len() as u32 + 1,
                    code: code.clone(),
                    text: display.to_string(),
                    distance: distance_between(
                        query.user_location,
                        config.coordinates_for(code, inventory),
                    ),
                    room_count: 0,
                });
                buildings.len() - 1
            });
            let building = &mut buildings[slot];
            building.room_count += 1;
            let building_id = building.id;

            let room_id = rooms.len() as u32 + 1;
            schedule.extend(room_events.iter().enumerate().map(|(index, event)| {
                ScheduleEntry {
                    id: format!("{}-{}", room_id, index),
                    room_id,
                    building_id,
                    subject: event.subject.clone(),
                    start: event.start,
                    end: event.end,
                    pending: event.pending,
                }
            }));

            if room.capacity == Capacity::Unknown {
                unknown_capacity += 1;
            }
            rooms.push(RoomResource {
                id: room_id,
                building_id,
                building: code.clone(),
                name: room.name.clone(),
                qualified_name: qualified_room_name(code, &room.name),
                capacity: room.capacity,
                link: config.room_link(code, &room.name),
                availability,
                free_slots: free_slots(room_events, window.start, window.end),
            });
        }
    }

    if query.buildings.is_nearby() {
        sort_by_distance(&mut buildings);
    } else {
        sort_by_open_rooms(&mut buildings);
    }

    let unknown_note = if query.min_capacity > 0 {
        unknown_capacity
    } else {
        0
    };
    let summary = summarize(
        rooms.len(),
        query.full_availability_only,
        unknown_note,
        query.buildings.is_nearby(),
    );
    debug!(
        buildings = buildings.len(),
        rooms = rooms.len(),
        events = schedule.len(),
        "ranked rooms"
    );

    RoomSearchResult {
        buildings,
        rooms,
        events: schedule,
        summary,
    }
}

/// Case-insensitive prefix match against the room's names, its building's
/// display text (and the long name inside its parentheses), or any of its
/// event subjects. `search` must already be lowercased.
pub fn matches_search(
    search: &str,
    building: &str,
    room: &str,
    building_display: &str,
    events: &[CanonicalEvent],
) -> bool {
    if search.is_empty() {
        return true;
    }
    let starts = |text: &str| text.to_lowercase().starts_with(search);
    let long_name = building_display.split_once(" (").map(|(_, rest)| rest);

    starts(&qualified_room_name(building, room))
        || starts(room)
        || starts(building_display)
        || long_name.is_some_and(|name| starts(name))
        || events.iter().any(|e| starts(&e.subject))
}

/// Nearest first; unknown distances last. Stable, so ties keep encounter order.
pub fn sort_by_distance(buildings: &mut [BuildingResource]) {
    buildings.sort_by(|a, b| match (a.distance, b.distance) {
        (Some(x), Some(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });
}

/// Most open rooms first. Stable, so ties keep encounter order.
pub fn sort_by_open_rooms(buildings: &mut [BuildingResource]) {
    buildings.sort_by(|a, b| b.room_count.cmp(&a.room_count));
}

/// Human-readable result count.
pub fn summarize(
    count: usize,
    full_availability_only: bool,
    unknown_capacity: usize,
    nearby: bool,
) -> String {
    let mut summary = match (full_availability_only, count == 1) {
        (true, true) => format!("Found {} room that is completely free.", count),
        (true, false) => format!("Found {} rooms that are completely free.", count),
        (false, true) => format!("Found {} room that has free time.", count),
        (false, false) => format!("Found {} rooms that have free time.", count),
    };
    if unknown_capacity == 1 {
        summary.push_str(" Includes 1 room with unknown capacity.");
    } else if unknown_capacity > 1 {
        summary.push_str(&format!(
            " Includes {} rooms with unknown capacity.",
            unknown_capacity
        ));
    }
    if nearby {
        summary.push_str(" Sorted by distance.");
    }
    summary
}
