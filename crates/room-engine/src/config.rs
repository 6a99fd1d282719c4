//! Campus lookup tables and tunables, loaded from TOML.
//!
//! Nothing in the engine reads global state: every stage receives a
//! `&CampusConfig`, so tests can swap in small tables of their own.

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use chrono::NaiveTime;
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::geo::Coordinates;
use crate::inventory::{qualified_room_name, RoomInventory};
use crate::time::{hhmm, parse_timezone};

const BUILTIN_UTD: &str = include_str!("../campus/utd.toml");

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CampusConfig {
    /// IANA timezone the campus runs on.
    pub timezone: String,
    /// Window used when the query leaves start/end open.
    #[serde(with = "hhmm")]
    pub default_start: NaiveTime,
    #[serde(with = "hhmm")]
    pub default_end: NaiveTime,
    /// Raw time parameters are snapped into `[earliest, latest]`.
    #[serde(with = "hhmm")]
    pub earliest: NaiveTime,
    #[serde(with = "hhmm")]
    pub latest: NaiveTime,
    /// A free run must be strictly longer than this to count as usable.
    pub gap_threshold_minutes: u32,
    pub map_link_base: String,
    pub excluded_buildings: BTreeSet<String>,
    /// Entries are `"{building} {room}"`.
    pub excluded_rooms: BTreeSet<String>,
    /// Alias code → canonical code.
    pub merged_buildings: BTreeMap<String, String>,
    pub building_names: BTreeMap<String, String>,
    /// Code used for map links and coordinates in place of the building's own.
    pub map_building_overrides: BTreeMap<String, String>,
    /// Hard-coded `[lat, lng]`, wins over everything else.
    pub location_overrides: BTreeMap<String, [f64; 2]>,
    /// Full generated link → replacement link.
    pub map_link_overrides: BTreeMap<String, String>,
}

impl Default for CampusConfig {
    fn default() -> Self {
        Self {
            timezone: "UTC".to_string(),
            default_start: hour(9),
            default_end: hour(22),
            earliest: hour(6),
            latest: hour(23),
            gap_threshold_minutes: 15,
            map_link_base: String::new(),
            excluded_buildings: BTreeSet::new(),
            excluded_rooms: BTreeSet::new(),
            merged_buildings: BTreeMap::new(),
            building_names: BTreeMap::new(),
            map_building_overrides: BTreeMap::new(),
            location_overrides: BTreeMap::new(),
            map_link_overrides: BTreeMap::new(),
        }
    }
}

fn hour(h: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, 0, 0).unwrap_or(NaiveTime::MIN)
}

impl CampusConfig {
    /// Tables for the UT Dallas campus, compiled into the crate.
    pub fn builtin() -> Result<Self> {
        Self::from_toml_str(BUILTIN_UTD)
    }

    pub fn from_toml_str(s: &str) -> Result<Self> {
        let config: CampusConfig = toml::from_str(s)?;
        config.tz()?;
        Ok(config)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&content)
    }

    pub fn tz(&self) -> Result<Tz> {
        parse_timezone(&self.timezone)
    }

    /// Resolve an alias building code to its canonical code.
    pub fn canonical_building<'a>(&'a self, code: &'a str) -> &'a str {
        self.merged_buildings
            .get(code)
            .map(String::as_str)
            .unwrap_or(code)
    }

    /// Explicitly excluded codes, plus every alias (its rooms live under the canonical code).
    pub fn is_excluded_building(&self, code: &str) -> bool {
        self.excluded_buildings.contains(code) || self.merged_buildings.contains_key(code)
    }

    pub fn is_excluded_room(&self, building: &str, room: &str) -> bool {
        self.excluded_rooms
            .contains(&qualified_room_name(building, room))
    }

    /// Display text for a building, falling back to its code.
    pub fn display_name<'a>(&'a self, code: &'a str) -> &'a str {
        self.building_names
            .get(code)
            .map(String::as_str)
            .unwrap_or(code)
    }

    /// Where a building is, consulting hard-coded locations first, then the
    /// building it borrows its map entry from, then the inventory itself.
    pub fn coordinates_for(&self, code: &str, inventory: &RoomInventory) -> Option<Coordinates> {
        if let Some(&pair) = self.location_overrides.get(code) {
            return Some(Coordinates::from(pair));
        }
        let source = self
            .map_building_overrides
            .get(code)
            .map(String::as_str)
            .unwrap_or(code);
        inventory.get(source).and_then(|info| info.coordinates())
    }

    /// Campus map link for a room.
    pub fn room_link(&self, building: &str, room: &str) -> String {
        let map_building = self
            .map_building_overrides
            .get(building)
            .map(String::as_str)
            .unwrap_or(building);
        let link = format!("{}/{}_{}", self.map_link_base, map_building, room);
        match self.map_link_overrides.get(&link) {
            Some(replacement) => replacement.clone(),
            None => link,
        }
    }

    pub fn to_toml_string(&self) -> std::result::Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }
}
