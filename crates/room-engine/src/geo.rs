//! Great-circle distance between the user and a building.

use serde::{Deserialize, Serialize};

/// Mean Earth radius in meters.
pub const EARTH_RADIUS_METERS: f64 = 6_371e3;
const METERS_PER_KILOMETER: f64 = 1000.0;
const KILOMETERS_PER_MILE: f64 = 1.609;

/// A point in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinates {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

impl From<[f64; 2]> for Coordinates {
    fn from([lat, lng]: [f64; 2]) -> Self {
        Self { lat, lng }
    }
}

/// Distance in meters.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Distance(pub f64);

impl Distance {
    pub fn meters(self) -> f64 {
        self.0
    }

    /// Miles, rounded to two decimals for display.
    pub fn miles(self) -> f64 {
        let miles = self.0 / METERS_PER_KILOMETER / KILOMETERS_PER_MILE;
        (miles * 100.0).round() / 100.0
    }
}

/// Haversine distance between two points.
pub fn haversine(a: Coordinates, b: Coordinates) -> Distance {
    let p1 = a.lat.to_radians();
    let p2 = b.lat.to_radians();
    let delta_p = p2 - p1;
    let delta_lambda = (b.lng - a.lng).to_radians();
    let h = (delta_p / 2.0).sin().powi(2)
        + p1.cos() * p2.cos() * (delta_lambda / 2.0).sin().powi(2);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());
    Distance(c * EARTH_RADIUS_METERS)
}

/// Distance when both points are known, `None` otherwise.
pub fn distance_between(a: Option<Coordinates>, b: Option<Coordinates>) -> Option<Distance> {
    Some(haversine(a?, b?))
}
