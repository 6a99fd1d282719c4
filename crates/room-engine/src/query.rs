//! Query/filter state driving a room search.

use std::collections::BTreeSet;

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::CampusConfig;
use crate::error::{EngineError, Result};
use crate::geo::Coordinates;
use crate::time::{hhmm_opt, parse_date, parse_time_of_day, snap_time, DayAnchor};

/// Sentinel building value that switches to distance-sorted results.
pub const NEARBY: &str = "nearby";

/// Which buildings the search covers.
///
/// Serialized as the list form used in query strings: `[]` for any,
/// `["nearby"]` for nearby mode, otherwise the building codes.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub enum BuildingFilter {
    #[default]
    Any,
    Only(BTreeSet<String>),
    /// Every building, sorted by distance from the user. No distance cutoff.
    Nearby,
}

impl BuildingFilter {
    /// Parse a comma-separated parameter such as `"ECSS,ECSW"` or `"nearby"`.
    pub fn parse(param: &str) -> Self {
        let codes: Vec<String> = param
            .split(',')
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map(str::to_string)
            .collect();
        Self::from(codes)
    }

    pub fn admits(&self, building: &str) -> bool {
        match self {
            BuildingFilter::Any | BuildingFilter::Nearby => true,
            BuildingFilter::Only(codes) => codes.contains(building),
        }
    }

    pub fn is_nearby(&self) -> bool {
        matches!(self, BuildingFilter::Nearby)
    }
}

impl From<Vec<String>> for BuildingFilter {
    fn from(codes: Vec<String>) -> Self {
        match codes.first().map(String::as_str) {
            None => BuildingFilter::Any,
            Some(NEARBY) => BuildingFilter::Nearby,
            Some(_) => BuildingFilter::Only(codes.into_iter().collect()),
        }
    }
}

impl From<BuildingFilter> for Vec<String> {
    fn from(filter: BuildingFilter) -> Self {
        match filter {
            BuildingFilter::Any => Vec::new(),
            BuildingFilter::Nearby => vec![NEARBY.to_string()],
            BuildingFilter::Only(codes) => codes.into_iter().collect(),
        }
    }
}

/// A fully typed search request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoomQuery {
    pub date: NaiveDate,
    /// Window start; the campus default applies when absent.
    #[serde(default, with = "hhmm_opt")]
    pub start_time: Option<NaiveTime>,
    #[serde(default, with = "hhmm_opt")]
    pub end_time: Option<NaiveTime>,
    #[serde(default)]
    pub buildings: BuildingFilter,
    /// `0` disables the capacity floor.
    #[serde(default)]
    pub min_capacity: u32,
    #[serde(default)]
    pub full_availability_only: bool,
    #[serde(default)]
    pub search: String,
    #[serde(default)]
    pub user_location: Option<Coordinates>,
}

impl RoomQuery {
    pub fn new(date: NaiveDate) -> Self {
        Self {
            date,
            start_time: None,
            end_time: None,
            buildings: BuildingFilter::Any,
            min_capacity: 0,
            full_availability_only: false,
            search: String::new(),
            user_location: None,
        }
    }

    pub fn between(mut self, start: NaiveTime, end: NaiveTime) -> Self {
        self.start_time = Some(start);
        self.end_time = Some(end);
        self
    }

    /// Build a query from raw URL-style parameters.
    ///
    /// Times are snapped into the campus operating range, an unparseable
    /// capacity means no floor, and only the literal `"true"` enables
    /// full-availability mode.
    pub fn from_params(params: &QueryParams, config: &CampusConfig) -> Result<Self> {
        let date = params
            .date
            .as_deref()
            .ok_or_else(|| EngineError::InvalidDate("date is required".to_string()))
            .and_then(parse_date)?;
        let snap = |raw: &Option<String>| -> Result<Option<NaiveTime>> {
            raw.as_deref()
                .filter(|s| !s.trim().is_empty())
                .map(|s| parse_time_of_day(s).map(|t| snap_time(t, config.earliest, config.latest)))
                .transpose()
        };
        Ok(Self {
            date,
            start_time: snap(&params.start_time)?,
            end_time: snap(&params.end_time)?,
            buildings: params
                .buildings
                .as_deref()
                .map(BuildingFilter::parse)
                .unwrap_or_default(),
            min_capacity: params
                .min_capacity
                .as_deref()
                .and_then(|s| s.trim().parse().ok())
                .unwrap_or(0),
            full_availability_only: params.full_availability.as_deref() == Some("true"),
            search: params.search.clone().unwrap_or_default(),
            user_location: None,
        })
    }

    /// Resolve the requested window into instants on the query date.
    ///
    /// An end before the start is rejected; an end equal to the start is an
    /// empty, trivially free window.
    pub fn window(&self, config: &CampusConfig) -> Result<QueryWindow> {
        let start = self.start_time.unwrap_or(config.default_start);
        let end = self.end_time.unwrap_or(config.default_end);
        if end < start {
            return Err(EngineError::InvalidWindow { start, end });
        }
        let anchor = DayAnchor::new(self.date, config.tz()?);
        Ok(QueryWindow {
            anchor,
            start: anchor.at(start)?,
            end: anchor.at(end)?,
        })
    }

    /// Search text as matched: trimmed and lowercased.
    pub fn search_term(&self) -> String {
        self.search.trim().to_lowercase()
    }
}

/// Raw string parameters as they arrive from a URL.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryParams {
    pub date: Option<String>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub buildings: Option<String>,
    pub min_capacity: Option<String>,
    pub full_availability: Option<String>,
    pub search: Option<String>,
}

/// The query window resolved to absolute instants.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QueryWindow {
    pub anchor: DayAnchor,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}
