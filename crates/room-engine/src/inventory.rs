//! Room inventory snapshot: buildings, their coordinates and their rooms.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::geo::Coordinates;

/// `building code → building info`, iterated in code order.
pub type RoomInventory = BTreeMap<String, BuildingInfo>;

/// Seating capacity of a room. Upstream reports `null` or `0` when it is unknown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Capacity {
    Known(u32),
    #[default]
    Unknown,
}

impl Capacity {
    pub fn from_reported(reported: Option<u32>) -> Self {
        match reported {
            Some(0) | None => Capacity::Unknown,
            Some(n) => Capacity::Known(n),
        }
    }

    pub fn known(self) -> Option<u32> {
        match self {
            Capacity::Known(n) => Some(n),
            Capacity::Unknown => None,
        }
    }

    /// Whether a capacity floor rules this room out. Unknown never fails a floor.
    pub fn below(self, floor: u32) -> bool {
        matches!(self, Capacity::Known(n) if n < floor)
    }
}

impl fmt::Display for Capacity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Capacity::Known(n) => write!(f, "{}", n),
            Capacity::Unknown => f.write_str("unknown"),
        }
    }
}

impl Serialize for Capacity {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.known().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Capacity {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Option::<u32>::deserialize(deserializer).map(Capacity::from_reported)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Room {
    #[serde(alias = "room")]
    pub name: String,
    #[serde(default)]
    pub capacity: Capacity,
}

impl Room {
    pub fn new(name: impl Into<String>, capacity: Capacity) -> Self {
        Self {
            name: name.into(),
            capacity,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct BuildingInfo {
    #[serde(default)]
    pub lat: Option<f64>,
    #[serde(default)]
    pub lng: Option<f64>,
    #[serde(default)]
    pub rooms: Vec<Room>,
}

impl BuildingInfo {
    /// Reported coordinates. The upstream API uses `0` for "not recorded".
    pub fn coordinates(&self) -> Option<Coordinates> {
        match (self.lat, self.lng) {
            (Some(lat), Some(lng)) if lat != 0.0 && lng != 0.0 => Some(Coordinates::new(lat, lng)),
            _ => None,
        }
    }
}

/// Key under which rooms are excluded and surrogate-identified: `"{building} {room}"`.
pub fn qualified_room_name(building: &str, room: &str) -> String {
    format!("{} {}", building, room)
}
