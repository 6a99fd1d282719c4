//! WASM bindings for room-engine.
//!
//! Exposes room search and single-room availability to the browser front end
//! via `wasm-bindgen`. All complex types are passed as JSON strings; the
//! campus configuration is passed as TOML and defaults to the built-in campus.
//!
//! ## Build process
//!
//! ```sh
//! cargo build -p room-engine-wasm --target wasm32-unknown-unknown --release
//! wasm-bindgen --target web --out-dir web/wasm/ \
//!   target/wasm32-unknown-unknown/release/room_engine_wasm.wasm
//! ```

use room_engine::source::UNTITLED_SUBJECT;
use room_engine::time::parse_timestamp;
use room_engine::{
    free_slots, room_availability, CampusConfig, CampusSnapshot, CanonicalEvent, FreeSlot,
    QueryParams, RoomQuery,
};
use serde::{Deserialize, Serialize};
use wasm_bindgen::prelude::*;

// ---------------------------------------------------------------------------
// Serde-friendly DTOs for crossing the WASM boundary as JSON
// ---------------------------------------------------------------------------

/// Input format for events passed from JavaScript.
#[derive(Deserialize)]
struct EventInput {
    #[serde(default)]
    subject: Option<String>,
    start: String,
    end: String,
}

#[derive(Serialize)]
struct RoomAvailabilityDto {
    completely_free: bool,
    has_acceptable_gap: bool,
    free_slots: Vec<FreeSlot>,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Parse events whose timestamps carry an offset or are campus-local.
fn parse_events_json(json: &str, config: &CampusConfig) -> Result<Vec<CanonicalEvent>, String> {
    let inputs: Vec<EventInput> =
        serde_json::from_str(json).map_err(|e| format!("Invalid events JSON: {}", e))?;
    let tz = config.tz().map_err(|e| e.to_string())?;

    inputs
        .into_iter()
        .map(|input| {
            let start = parse_timestamp(&input.start, tz).map_err(|e| e.to_string())?;
            let end = parse_timestamp(&input.end, tz).map_err(|e| e.to_string())?;
            let subject = input.subject.unwrap_or_else(|| UNTITLED_SUBJECT.to_string());
            CanonicalEvent::try_new(subject, start, end).map_err(|e| e.to_string())
        })
        .collect()
}

fn load_config(config_toml: Option<&str>) -> Result<CampusConfig, String> {
    match config_toml {
        Some(toml) => CampusConfig::from_toml_str(toml),
        None => CampusConfig::builtin(),
    }
    .map_err(|e| e.to_string())
}

fn to_json<T: Serialize>(value: &T) -> Result<String, String> {
    serde_json::to_string(value).map_err(|e| format!("Serialization error: {}", e))
}

fn search_json(
    snapshot_json: &str,
    query_json: &str,
    config_toml: Option<&str>,
) -> Result<String, String> {
    let snapshot: CampusSnapshot =
        serde_json::from_str(snapshot_json).map_err(|e| format!("Invalid snapshot JSON: {}", e))?;
    let query: RoomQuery =
        serde_json::from_str(query_json).map_err(|e| format!("Invalid query JSON: {}", e))?;
    let config = load_config(config_toml)?;
    let result = room_engine::find_rooms(&snapshot, &query, &config).map_err(|e| e.to_string())?;
    to_json(&result)
}

fn query_json(params_json: &str, config_toml: Option<&str>) -> Result<String, String> {
    let params: QueryParams =
        serde_json::from_str(params_json).map_err(|e| format!("Invalid params JSON: {}", e))?;
    let config = load_config(config_toml)?;
    let query = RoomQuery::from_params(&params, &config).map_err(|e| e.to_string())?;
    to_json(&query)
}

fn availability_json(
    events_json: &str,
    window_start: &str,
    window_end: &str,
    config_toml: Option<&str>,
) -> Result<String, String> {
    let config = load_config(config_toml)?;
    let events = parse_events_json(events_json, &config)?;
    let tz = config.tz().map_err(|e| e.to_string())?;
    let ws = parse_timestamp(window_start, tz).map_err(|e| e.to_string())?;
    let we = parse_timestamp(window_end, tz).map_err(|e| e.to_string())?;
    if we < ws {
        return Err(format!(
            "Invalid window: end {} is before start {}",
            window_end, window_start
        ));
    }

    let availability = room_availability(&events, ws, we, config.gap_threshold_minutes);
    to_json(&RoomAvailabilityDto {
        completely_free: availability.completely_free,
        has_acceptable_gap: availability.has_acceptable_gap,
        free_slots: free_slots(&events, ws, we),
    })
}

// ---------------------------------------------------------------------------
// WASM exports
// ---------------------------------------------------------------------------

/// Run a full room search.
///
/// # Arguments
/// - `snapshot_json` -- `CampusSnapshot` JSON: the inventory and the three
///   event feeds, each `{"state":"done","data":...}` or
///   `{"state":"error","message":...}`
/// - `query_json` -- `RoomQuery` JSON (see `queryFromParams`)
/// - `config_toml` -- optional campus configuration; the built-in campus when absent
///
/// Returns the `RoomSearchResult` as JSON. Fails if any source failed or the
/// window is invalid.
#[wasm_bindgen(js_name = "findRooms")]
pub fn find_rooms(
    snapshot_json: &str,
    query_json: &str,
    config_toml: Option<String>,
) -> Result<String, JsValue> {
    search_json(snapshot_json, query_json, config_toml.as_deref()).map_err(|e| JsValue::from_str(&e))
}

/// Turn raw URL parameters (`{date, startTime, endTime, buildings,
/// minCapacity, fullAvailability, search}`, all strings) into `RoomQuery` JSON.
#[wasm_bindgen(js_name = "queryFromParams")]
pub fn query_from_params(params_json: &str, config_toml: Option<String>) -> Result<String, JsValue> {
    query_json(params_json, config_toml.as_deref()).map_err(|e| JsValue::from_str(&e))
}

/// Classify one room's events over a window.
///
/// `events_json` is a JSON array of `{subject?, start, end}` objects; the
/// window bounds are ISO 8601 datetimes. Timestamps without an offset are read
/// in the campus timezone, and the gap threshold comes from `config_toml`
/// (the built-in campus when absent). Returns
/// `{completely_free, has_acceptable_gap, free_slots}`.
#[wasm_bindgen(js_name = "roomAvailability")]
pub fn room_availability_js(
    events_json: &str,
    window_start: &str,
    window_end: &str,
    config_toml: Option<String>,
) -> Result<String, JsValue> {
    availability_json(events_json, window_start, window_end, config_toml.as_deref())
        .map_err(|e| JsValue::from_str(&e))
}
