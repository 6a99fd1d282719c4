//! Tests for feed normalization and building/room attribution.

use chrono::{NaiveDate, TimeZone, Utc};
use room_engine::event::Hierarchy;
use room_engine::normalizer::{normalize_sources, Normalizer};
use room_engine::source::{EventRecord, SourceBatch};
use room_engine::time::DayAnchor;
use room_engine::{
    AstraEvent, BuildingFilter, CampusConfig, CourseBookEvent, MazevoEvent, SourceKind,
};
use serde_json::json;

// ── Helpers ─────────────────────────────────────────────────────────────────

fn anchor() -> DayAnchor {
    DayAnchor::new(NaiveDate::from_ymd_opt(2026, 3, 16).unwrap(), chrono_tz::Tz::UTC)
}

fn config() -> CampusConfig {
    let mut config = CampusConfig::default();
    config
        .merged_buildings
        .insert("JSOM".to_string(), "SOM".to_string());
    config.excluded_buildings.insert("ONLINE".to_string());
    config.excluded_rooms.insert("ECSN 3.108".to_string());
    config
}

fn course_book(value: serde_json::Value) -> Hierarchy<CourseBookEvent> {
    serde_json::from_value(value).unwrap()
}

fn astra(value: serde_json::Value) -> Hierarchy<AstraEvent> {
    serde_json::from_value(value).unwrap()
}

fn mazevo(value: serde_json::Value) -> Hierarchy<MazevoEvent> {
    serde_json::from_value(value).unwrap()
}

fn class(start: &str, end: &str) -> serde_json::Value {
    json!({"section": "CS 1337.001", "start_time": start, "end_time": end})
}

// ── Record conversion ───────────────────────────────────────────────────────

#[test]
fn class_records_are_anchored_to_the_query_date() {
    let record = CourseBookEvent {
        section: "CS 1337.001".to_string(),
        start_time: "01:00PM".to_string(),
        end_time: "02:15PM".to_string(),
    };
    let event = record.normalize(&anchor()).unwrap();
    assert_eq!(event.subject, "Class");
    assert_eq!(event.start, Utc.with_ymd_and_hms(2026, 3, 16, 13, 0, 0).unwrap());
    assert_eq!(event.end, Utc.with_ymd_and_hms(2026, 3, 16, 14, 15, 0).unwrap());
    assert!(!event.pending);
}

#[test]
fn class_times_use_the_campus_timezone() {
    let chicago = DayAnchor::new(
        NaiveDate::from_ymd_opt(2026, 3, 16).unwrap(),
        chrono_tz::America::Chicago,
    );
    let record = CourseBookEvent {
        section: String::new(),
        start_time: "09:00AM".to_string(),
        end_time: "10:00AM".to_string(),
    };
    let event = record.normalize(&chicago).unwrap();
    assert_eq!(event.start, Utc.with_ymd_and_hms(2026, 3, 16, 14, 0, 0).unwrap());
}

#[test]
fn astra_pending_follows_current_state() {
    let record = |state: Option<&str>| AstraEvent {
        activity_name: Some("Review Session".to_string()),
        start_date: "2026-03-16T15:00:00Z".to_string(),
        end_date: "2026-03-16T16:00:00Z".to_string(),
        current_state: state.map(str::to_string),
    };
    assert!(!record(None).normalize(&anchor()).unwrap().pending);
    assert!(!record(Some("Scheduled")).normalize(&anchor()).unwrap().pending);
    assert!(record(Some("Tentative")).normalize(&anchor()).unwrap().pending);
    assert_eq!(
        record(None).normalize(&anchor()).unwrap().subject,
        "Review Session"
    );
}

#[test]
fn mazevo_subject_includes_organization_and_pending_follows_status() {
    let confirmed = MazevoEvent {
        event_name: Some("Advising Session".to_string()),
        organization_name: Some("Org X".to_string()),
        date_time_start: "2026-03-16T13:00:00".to_string(),
        date_time_end: "2026-03-16T14:15:00".to_string(),
        status_description: Some("Confirmed".to_string()),
    };
    let event = confirmed.normalize(&anchor()).unwrap();
    assert_eq!(event.subject, "Advising Session (Org X)");
    assert!(!event.pending);

    let requested = MazevoEvent {
        status_description: Some("Requested".to_string()),
        organization_name: None,
        ..confirmed.clone()
    };
    let event = requested.normalize(&anchor()).unwrap();
    assert_eq!(event.subject, "Advising Session");
    assert!(event.pending);

    let no_status = MazevoEvent {
        status_description: None,
        ..confirmed
    };
    assert!(no_status.normalize(&anchor()).unwrap().pending);
}

#[test]
fn record_ending_before_it_starts_is_malformed() {
    let record = CourseBookEvent {
        section: String::new(),
        start_time: "02:00PM".to_string(),
        end_time: "01:00PM".to_string(),
    };
    assert!(record.normalize(&anchor()).is_err());
}

// ── Attribution ─────────────────────────────────────────────────────────────

#[test]
fn aliased_building_is_filed_under_canonical_code() {
    let feed = course_book(json!({"JSOM": {"1.117": [class("09:00AM", "10:00AM")]}}));
    let config = config();
    let batches = [SourceBatch::from_feed(SourceKind::CourseBook, &feed)];
    let events = normalize_sources(&batches, &config, &BuildingFilter::Any, anchor());
    assert!(events.get("JSOM").is_none());
    assert_eq!(events["SOM"]["1.117"].len(), 1);
}

#[test]
fn exclusion_applies_after_alias_resolution() {
    let feed = course_book(json!({"VIRTUAL": {"A": [class("09:00AM", "10:00AM")]}}));
    let mut config = config();
    config
        .merged_buildings
        .insert("VIRTUAL".to_string(), "ONLINE".to_string());
    let batches = [SourceBatch::from_feed(SourceKind::CourseBook, &feed)];
    let events = normalize_sources(&batches, &config, &BuildingFilter::Any, anchor());
    assert!(events.is_empty());
}

#[test]
fn excluded_rooms_and_buildings_are_dropped() {
    let feed = course_book(json!({
        "ECSN": {
            "3.108": [class("09:00AM", "10:00AM")],
            "2.120": [class("09:00AM", "10:00AM")]
        },
        "ONLINE": {"WEB": [class("09:00AM", "10:00AM")]}
    }));
    let config = config();
    let batches = [SourceBatch::from_feed(SourceKind::CourseBook, &feed)];
    let events = normalize_sources(&batches, &config, &BuildingFilter::Any, anchor());
    assert_eq!(events.len(), 1);
    assert!(events["ECSN"].get("3.108").is_none());
    assert_eq!(events["ECSN"]["2.120"].len(), 1);
}

#[test]
fn building_scope_limits_attribution_but_nearby_does_not() {
    let feed = course_book(json!({
        "ECSS": {"2.415": [class("09:00AM", "10:00AM")]},
        "GR": {"2.530": [class("09:00AM", "10:00AM")]}
    }));
    let config = config();
    let batches = [SourceBatch::from_feed(SourceKind::CourseBook, &feed)];

    let only = BuildingFilter::parse("GR");
    let events = normalize_sources(&batches, &config, &only, anchor());
    assert_eq!(events.keys().collect::<Vec<_>>(), vec!["GR"]);

    let events = normalize_sources(&batches, &config, &BuildingFilter::Nearby, anchor());
    assert_eq!(events.len(), 2);
}

#[test]
fn malformed_records_are_skipped_individually() {
    let feed = course_book(json!({
        "ECSS": {"2.415": [
            class("09:00AM", "10:00AM"),
            class("not a time", "10:00AM"),
            class("11:00AM", "12:00PM")
        ]}
    }));
    let config = config();
    let scope = BuildingFilter::Any;
    let mut normalizer = Normalizer::new(&config, &scope, anchor());
    normalizer.ingest(&SourceBatch::from_feed(SourceKind::CourseBook, &feed));
    assert_eq!(normalizer.skipped(), 1);
    let events = normalizer.finish();
    assert_eq!(events["ECSS"]["2.415"].len(), 2);
}

#[test]
fn skipped_count_spans_every_source() {
    let classes = course_book(json!({"ECSS": {"2.415": [class("11:00AM", "10:00AM")]}}));
    let bookings = astra(json!({"ECSS": {"2.415": [
        {"start_date": "2026-03-16T15:00:00Z", "end_date": "2026-03-16T15:00:00Z"},
        {"start_date": "2026-03-16T16:00:00Z", "end_date": "2026-03-16T17:00:00Z"}
    ]}}));
    let config = config();
    let scope = BuildingFilter::Any;
    let mut normalizer = Normalizer::new(&config, &scope, anchor());
    normalizer.ingest(&SourceBatch::from_feed(SourceKind::CourseBook, &classes));
    normalizer.ingest(&SourceBatch::from_feed(SourceKind::Astra, &bookings));
    assert_eq!(normalizer.skipped(), 2);
    let events = normalizer.finish();
    assert_eq!(events["ECSS"]["2.415"].len(), 1);
    assert_eq!(events["ECSS"]["2.415"][0].subject, "Reserved");
}

#[test]
fn all_sources_share_one_room_timeline() {
    let classes = course_book(json!({"ECSS": {"2.415": [class("01:00PM", "02:15PM")]}}));
    let bookings = astra(json!({"ECSS": {"2.415": [{
        "activity_name": "Study Jam",
        "start_date": "2026-03-16T15:00:00Z",
        "end_date": "2026-03-16T16:00:00Z",
        "current_state": "Scheduled"
    }]}}));
    let managed = mazevo(json!({"ECSS": {"2.415": [{
        "eventName": "Advising Session",
        "organizationName": "Org X",
        "dateTimeStart": "2026-03-16T13:00:00",
        "dateTimeEnd": "2026-03-16T14:15:00",
        "statusDescription": "Confirmed"
    }]}}));
    let config = config();
    let batches = [
        SourceBatch::from_feed(SourceKind::CourseBook, &classes),
        SourceBatch::from_feed(SourceKind::Astra, &bookings),
        SourceBatch::from_feed(SourceKind::Mazevo, &managed),
    ];
    let events = normalize_sources(&batches, &config, &BuildingFilter::Any, anchor());
    let subjects: Vec<&str> = events["ECSS"]["2.415"]
        .iter()
        .map(|e| e.subject.as_str())
        .collect();
    assert_eq!(subjects, vec!["Class", "Study Jam", "Advising Session (Org X)"]);
}
