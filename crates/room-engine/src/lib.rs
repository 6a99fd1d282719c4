//! # room-engine
//!
//! Finds open rooms on a campus by merging the room inventory with several
//! independent booking feeds.
//!
//! The pipeline runs once per query and owns all of its data:
//!
//! 1. [`normalizer`] turns every feed record into a [`CanonicalEvent`] keyed
//!    by canonical building and room;
//! 2. [`dedup`] collapses entries different feeds report for the same slot;
//! 3. [`availability`] classifies each room as free, partially free or busy
//!    over the query window;
//! 4. [`ranking`] filters by scope, capacity and search text, assigns
//!    surrogate IDs and orders buildings by open-room count or distance.
//!
//! ## Modules
//!
//! - [`search`]: end-to-end [`find_rooms`] over a [`CampusSnapshot`]
//! - [`source`]: feed record shapes and the [`EventRecord`] trait
//! - [`event`]: canonical events and the building/room hierarchy
//! - [`inventory`]: buildings, rooms and capacities
//! - [`freebusy`]: free intervals of a room inside the window
//! - [`geo`]: great-circle distance
//! - [`query`]: query/filter state
//! - [`config`]: campus lookup tables
//! - [`time`]: anchoring dates and times to instants
//! - [`error`]: error types

pub mod availability;
pub mod config;
pub mod dedup;
pub mod error;
pub mod event;
pub mod freebusy;
pub mod geo;
pub mod inventory;
pub mod normalizer;
pub mod query;
pub mod ranking;
pub mod search;
pub mod source;
pub mod time;

pub use availability::{room_availability, Availability};
pub use config::CampusConfig;
pub use error::EngineError;
pub use event::{CanonicalEvent, EventHierarchy, Hierarchy};
pub use freebusy::{free_slots, FreeSlot};
pub use geo::{haversine, Coordinates, Distance};
pub use inventory::{BuildingInfo, Capacity, Room, RoomInventory};
pub use query::{BuildingFilter, QueryParams, RoomQuery};
pub use ranking::{BuildingResource, RoomResource, RoomSearchResult, ScheduleEntry};
pub use search::{find_rooms, CampusSnapshot};
pub use source::{AstraEvent, CourseBookEvent, EventRecord, Fetched, MazevoEvent, SourceKind};
