//! Tests for the schedule → slots pipeline and slot conflict filtering.

use chrono::{DateTime, NaiveTime, Utc, Weekday};
use chrono_tz::Tz;
use slot_engine::conflict::{filter_conflicting, overlaps, EventBuffers};
use slot_engine::slots::{generate_slots, SlotRequest};
use slot_engine::{
    available_slots, AvailabilityRequest, DateRange, DstPolicy, Schedule, SlotError, TimeSpan,
    WorkingHours,
};

// ── Helpers ─────────────────────────────────────────────────────────────────

fn at(s: &str) -> DateTime<Utc> {
    s.parse().unwrap()
}

fn range(start: &str, end: &str) -> DateRange {
    DateRange::new(at(start), at(end))
}

fn monday_morning() -> Schedule {
    Schedule {
        time_zone: Tz::UTC,
        working_hours: vec![WorkingHours {
            days: vec![Weekday::Mon],
            hours: TimeSpan {
                start: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
                end: NaiveTime::from_hms_opt(12, 0, 0).unwrap(),
            },
        }],
        date_overrides: vec![],
    }
}

fn request(busy: Vec<DateRange>, buffers: EventBuffers) -> AvailabilityRequest {
    AvailabilityRequest {
        schedule: monday_morning(),
        window_start: at("2026-03-02T00:00:00Z"),
        window_end: at("2026-03-03T00:00:00Z"),
        busy,
        buffers,
        dst_policy: DstPolicy::default(),
        slots: SlotRequest::new(vec![], 30, 30, Tz::UTC, 0),
    }
}

fn now() -> DateTime<Utc> {
    at("2026-03-01T00:00:00Z")
}

fn instants(slots: &[slot_engine::SlotCandidate]) -> Vec<DateTime<Utc>> {
    slots.iter().map(|slot| slot.instant()).collect()
}

// ── Conflict filtering ──────────────────────────────────────────────────────

#[test]
fn adjacent_intervals_do_not_overlap() {
    assert!(!overlaps(
        at("2026-03-02T09:00:00Z"),
        at("2026-03-02T10:00:00Z"),
        at("2026-03-02T10:00:00Z"),
        at("2026-03-02T11:00:00Z"),
    ));
    assert!(overlaps(
        at("2026-03-02T09:00:00Z"),
        at("2026-03-02T10:01:00Z"),
        at("2026-03-02T10:00:00Z"),
        at("2026-03-02T11:00:00Z"),
    ));
}

#[test]
fn slots_overlapping_busy_time_are_dropped() {
    let slots = generate_slots(
        &SlotRequest::new(
            vec![range("2026-03-02T09:00:00Z", "2026-03-02T11:00:00Z")],
            30,
            30,
            Tz::UTC,
            0,
        ),
        now(),
    );
    let busy = vec![range("2026-03-02T09:45:00Z", "2026-03-02T10:15:00Z")];

    let kept = filter_conflicting(slots, &busy, 30, EventBuffers::default());

    assert_eq!(
        instants(&kept),
        vec![at("2026-03-02T09:00:00Z"), at("2026-03-02T10:30:00Z")]
    );
}

#[test]
fn buffers_extend_the_conflict_window() {
    let slots = generate_slots(
        &SlotRequest::new(
            vec![range("2026-03-02T09:00:00Z", "2026-03-02T12:00:00Z")],
            60,
            60,
            Tz::UTC,
            0,
        ),
        now(),
    );
    let busy = vec![range("2026-03-02T10:00:00Z", "2026-03-02T11:00:00Z")];
    let buffers = EventBuffers {
        before_event: 0,
        after_event: 10,
    };

    let kept = filter_conflicting(slots, &busy, 60, buffers);

    // 09:00 + 60 + 10 runs into the busy block; 11:00 starts right after it.
    assert_eq!(instants(&kept), vec![at("2026-03-02T11:00:00Z")]);
}

#[test]
fn huge_buffers_reach_any_busy_block() {
    let slots = generate_slots(
        &SlotRequest::new(
            vec![range("2026-03-02T09:00:00Z", "2026-03-02T11:00:00Z")],
            60,
            60,
            Tz::UTC,
            0,
        ),
        now(),
    );
    let busy = vec![range("1990-01-01T00:00:00Z", "1990-01-01T01:00:00Z")];
    let buffers = EventBuffers {
        before_event: i64::MAX,
        after_event: i64::MAX,
    };

    assert!(filter_conflicting(slots.clone(), &busy, i64::MAX, buffers).is_empty());
    assert_eq!(
        filter_conflicting(slots, &busy, i64::MAX, EventBuffers::default()).len(),
        2
    );
}

// ── Pipeline ────────────────────────────────────────────────────────────────

#[test]
fn busy_time_is_carved_out_of_schedule() {
    let request = request(
        vec![range("2026-03-02T10:00:00Z", "2026-03-02T10:30:00Z")],
        EventBuffers::default(),
    );

    let slots = available_slots(&request, now()).expect("should compute slots");

    assert_eq!(
        instants(&slots),
        vec![
            at("2026-03-02T09:00:00Z"),
            at("2026-03-02T09:30:00Z"),
            at("2026-03-02T10:30:00Z"),
            at("2026-03-02T11:00:00Z"),
            at("2026-03-02T11:30:00Z"),
        ]
    );
}

#[test]
fn buffers_remove_slots_next_to_busy_time() {
    let request = request(
        vec![range("2026-03-02T10:00:00Z", "2026-03-02T10:30:00Z")],
        EventBuffers {
            before_event: 15,
            after_event: 15,
        },
    );

    let slots = available_slots(&request, now()).expect("should compute slots");

    assert_eq!(
        instants(&slots),
        vec![
            at("2026-03-02T09:00:00Z"),
            at("2026-03-02T11:00:00Z"),
            at("2026-03-02T11:30:00Z"),
        ]
    );
}

#[test]
fn pipeline_propagates_schedule_errors() {
    let mut request = request(vec![], EventBuffers::default());
    request.window_end = at("2026-03-01T00:00:00Z");

    assert!(matches!(
        available_slots(&request, now()),
        Err(SlotError::InvalidParameter(_))
    ));
}

#[test]
fn availability_request_deserializes_with_flattened_slot_fields() {
    let json = r#"{
        "schedule": {
            "timeZone": "UTC",
            "workingHours": [
                {"days": ["Mon"], "start": "09:00:00", "end": "12:00:00"}
            ]
        },
        "windowStart": "2026-03-02T00:00:00Z",
        "windowEnd": "2026-03-03T00:00:00Z",
        "busy": [
            {"start": "2026-03-02T10:00:00Z", "end": "2026-03-02T11:00:00Z"}
        ],
        "buffers": {"afterEvent": 5},
        "frequency": 60,
        "eventLength": 60,
        "timeZone": "UTC"
    }"#;

    let request: AvailabilityRequest = serde_json::from_str(json).unwrap();

    assert_eq!(request.slots.frequency, 60);
    assert_eq!(request.buffers.after_event, 5);
    assert_eq!(request.dst_policy, DstPolicy::ShiftForward);

    let slots = available_slots(&request, now()).expect("should compute slots");
    assert_eq!(instants(&slots), vec![at("2026-03-02T11:00:00Z")]);
}
