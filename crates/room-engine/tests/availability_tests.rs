//! Tests for the minute-resolution availability calculator.

use chrono::{DateTime, TimeZone, Utc};
use room_engine::availability::{room_availability, Availability, DEFAULT_GAP_THRESHOLD_MINUTES};
use room_engine::CanonicalEvent;

// ── Helpers ─────────────────────────────────────────────────────────────────

fn at(hour: u32, minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 16, hour, minute, 0).unwrap()
}

fn busy(start: (u32, u32), end: (u32, u32)) -> CanonicalEvent {
    CanonicalEvent::new("Class", at(start.0, start.1), at(end.0, end.1))
}

fn check(events: &[CanonicalEvent], start: (u32, u32), end: (u32, u32)) -> Availability {
    room_availability(
        events,
        at(start.0, start.1),
        at(end.0, end.1),
        DEFAULT_GAP_THRESHOLD_MINUTES,
    )
}

// ── End-to-end scenarios ────────────────────────────────────────────────────

#[test]
fn room_without_events_is_completely_free() {
    let result = check(&[], (9, 0), (22, 0));
    assert_eq!(result, Availability::FREE);
    assert!(result.is_listed(true));
    assert!(result.is_listed(false));
}

#[test]
fn ten_minute_gap_is_not_usable() {
    let events = vec![busy((9, 0), (12, 0)), busy((12, 10), (22, 0))];
    let result = check(&events, (9, 0), (22, 0));
    assert_eq!(result, Availability::BUSY);
    assert!(!result.is_listed(false));
}

#[test]
fn twenty_minute_gap_is_usable_unless_full_availability_required() {
    let events = vec![busy((9, 0), (12, 0)), busy((12, 20), (22, 0))];
    let result = check(&events, (9, 0), (22, 0));
    assert_eq!(result, Availability::PARTIAL);
    assert!(result.is_listed(false));
    assert!(!result.is_listed(true));
}

// ── Threshold exactness ─────────────────────────────────────────────────────

#[test]
fn gap_of_exactly_fifteen_minutes_is_not_enough() {
    let events = vec![busy((9, 0), (12, 0)), busy((12, 15), (22, 0))];
    assert_eq!(check(&events, (9, 0), (22, 0)), Availability::BUSY);
}

#[test]
fn gap_of_sixteen_minutes_is_enough() {
    let events = vec![busy((9, 0), (12, 0)), busy((12, 16), (22, 0))];
    assert_eq!(check(&events, (9, 0), (22, 0)), Availability::PARTIAL);
}

#[test]
fn custom_threshold_is_respected() {
    let events = vec![busy((9, 0), (12, 0)), busy((12, 20), (22, 0))];
    let result = room_availability(&events, at(9, 0), at(22, 0), 30);
    assert_eq!(result, Availability::BUSY);
}

// ── Boundaries ──────────────────────────────────────────────────────────────

#[test]
fn events_outside_window_have_no_effect() {
    let events = vec![busy((10, 0), (10, 30))];
    assert_eq!(check(&events, (11, 0), (12, 0)), Availability::FREE);
}

#[test]
fn event_ending_at_window_start_is_not_overlap() {
    let events = vec![busy((8, 0), (11, 0))];
    assert_eq!(check(&events, (11, 0), (12, 0)), Availability::FREE);
}

#[test]
fn event_starting_at_window_end_is_not_overlap() {
    let events = vec![busy((12, 0), (13, 0))];
    assert_eq!(check(&events, (11, 0), (12, 0)), Availability::FREE);
}

#[test]
fn partially_overlapping_events_are_clamped() {
    // Busy until 11:50 and from 12:50: the 60-minute window keeps an hour
    // minus two 10-minute overhangs free.
    let events = vec![busy((10, 0), (11, 10)), busy((11, 50), (13, 0))];
    assert_eq!(check(&events, (11, 0), (12, 0)), Availability::PARTIAL);
}

#[test]
fn event_covering_the_whole_window_is_busy() {
    let events = vec![busy((8, 0), (23, 0))];
    assert_eq!(check(&events, (9, 0), (22, 0)), Availability::BUSY);
}

#[test]
fn short_window_with_any_event_cannot_have_a_gap() {
    // 15-minute window: even if mostly free the run can never exceed 15.
    let events = vec![busy((9, 14), (9, 15))];
    assert_eq!(check(&events, (9, 0), (9, 15)), Availability::BUSY);
}

#[test]
fn empty_window_is_trivially_free() {
    let events = vec![busy((8, 0), (23, 0))];
    assert_eq!(check(&events, (12, 0), (12, 0)), Availability::FREE);
}

#[test]
fn overlapping_events_from_several_sources_combine() {
    let events = vec![
        busy((9, 0), (11, 0)),
        busy((10, 30), (14, 0)),
        busy((14, 10), (22, 0)),
    ];
    assert_eq!(check(&events, (9, 0), (22, 0)), Availability::BUSY);
}

#[test]
fn free_tail_after_last_event_counts() {
    let events = vec![busy((9, 0), (21, 0))];
    assert_eq!(check(&events, (9, 0), (22, 0)), Availability::PARTIAL);
}

// ── Minute resolution ───────────────────────────────────────────────────────

fn at_seconds(hour: u32, minute: u32, second: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 16, hour, minute, second).unwrap()
}

#[test]
fn event_ending_seconds_into_the_window_only_touches_it() {
    let events = vec![CanonicalEvent::new("Class", at(8, 0), at_seconds(9, 0, 30))];
    assert_eq!(check(&events, (9, 0), (10, 0)), Availability::FREE);
}

#[test]
fn event_shorter_than_a_minute_is_ignored() {
    let events = vec![CanonicalEvent::new(
        "Class",
        at_seconds(9, 10, 10),
        at_seconds(9, 10, 50),
    )];
    assert_eq!(check(&events, (9, 0), (10, 0)), Availability::FREE);
}

#[test]
fn window_bounds_are_floored_too() {
    // The window floors to 09:00-09:16, leaving exactly 15 free minutes after
    // the event; stretched to 09:17:10 it floors to 09:17 and leaves 16.
    let events = vec![busy((9, 0), (9, 1))];
    let result = room_availability(
        &events,
        at_seconds(9, 0, 45),
        at_seconds(9, 16, 59),
        DEFAULT_GAP_THRESHOLD_MINUTES,
    );
    assert_eq!(result, Availability::BUSY);

    let result = room_availability(
        &events,
        at_seconds(9, 0, 45),
        at_seconds(9, 17, 10),
        DEFAULT_GAP_THRESHOLD_MINUTES,
    );
    assert_eq!(result, Availability::PARTIAL);
}

// ── Long windows ────────────────────────────────────────────────────────────

#[test]
fn window_spanning_millennia_is_classified_from_its_events() {
    let start = at(9, 0);
    let end = Utc.with_ymd_and_hms(7026, 3, 16, 9, 0, 0).unwrap();
    let events = vec![busy((10, 0), (11, 0))];
    assert_eq!(
        room_availability(&events, start, end, DEFAULT_GAP_THRESHOLD_MINUTES),
        Availability::PARTIAL
    );

    let covering = vec![CanonicalEvent::new("Class", start, end)];
    assert_eq!(
        room_availability(&covering, start, end, DEFAULT_GAP_THRESHOLD_MINUTES),
        Availability::BUSY
    );
}
