//! WASM bindings for slot-engine.
//!
//! Exposes slot generation and schedule expansion to JavaScript via
//! `wasm-bindgen`. All complex types are passed as JSON strings using the
//! same camelCase documents the `slots` CLI reads.
//!
//! ## Build process
//!
//! ```sh
//! cargo build -p slot-engine-wasm --target wasm32-unknown-unknown --release
//! wasm-bindgen --target nodejs --out-dir packages/slot-engine-js/wasm/ \
//!   target/wasm32-unknown-unknown/release/slot_engine_wasm.wasm
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use slot_engine::{AvailabilityRequest, DateRange, DstPolicy, Schedule, SlotRequest};
use wasm_bindgen::prelude::*;

// ---------------------------------------------------------------------------
// Serde-friendly DTOs for crossing the WASM boundary as JSON
// ---------------------------------------------------------------------------

/// Input for `expandSchedule`.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ScheduleInput {
    schedule: Schedule,
    window_start: String,
    window_end: String,
    #[serde(default)]
    dst_policy: DstPolicy,
}

#[derive(Serialize)]
struct DateRangeDto {
    start: String,
    end: String,
    duration_minutes: i64,
}

impl From<&DateRange> for DateRangeDto {
    fn from(r: &DateRange) -> Self {
        Self {
            start: r.start.to_rfc3339(),
            end: r.end.to_rfc3339(),
            duration_minutes: r.duration_minutes(),
        }
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Parse an RFC 3339 datetime string into `DateTime<Utc>`.
fn parse_datetime(s: &str) -> Result<DateTime<Utc>, JsValue> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| JsValue::from_str(&format!("Invalid datetime '{}': {}", s, e)))
}

/// `now` from JavaScript, or the current time when absent.
fn resolve_now(now: Option<String>) -> Result<DateTime<Utc>, JsValue> {
    match now {
        Some(raw) => parse_datetime(&raw),
        None => Ok(Utc::now()),
    }
}

fn to_json<T: Serialize + ?Sized>(value: &T) -> Result<String, JsValue> {
    serde_json::to_string(value)
        .map_err(|e| JsValue::from_str(&format!("Serialization error: {}", e)))
}

// ---------------------------------------------------------------------------
// WASM exports
// ---------------------------------------------------------------------------

/// Generate bookable slots from a SlotRequest JSON document.
///
/// Returns a JSON array of slot objects (`time`, and `away`/`reason`/... on
/// out-of-office days). `now` is an optional RFC 3339 string; the current time
/// is used when omitted.
#[wasm_bindgen(js_name = "generateSlots")]
pub fn generate_slots(request_json: &str, now: Option<String>) -> Result<String, JsValue> {
    let request: SlotRequest = serde_json::from_str(request_json)
        .map_err(|e| JsValue::from_str(&format!("Invalid slot request JSON: {}", e)))?;
    let now = resolve_now(now)?;

    to_json(&slot_engine::generate_slots(&request, now))
}

/// Compute slots from a schedule, busy time, and slot parameters.
///
/// Accepts the same document as `slots availability`.
#[wasm_bindgen(js_name = "availableSlots")]
pub fn available_slots(request_json: &str, now: Option<String>) -> Result<String, JsValue> {
    let request: AvailabilityRequest = serde_json::from_str(request_json)
        .map_err(|e| JsValue::from_str(&format!("Invalid availability request JSON: {}", e)))?;
    let now = resolve_now(now)?;

    let slots = slot_engine::available_slots(&request, now)
        .map_err(|e| JsValue::from_str(&e.to_string()))?;
    to_json(&slots)
}

/// Expand a weekly schedule into concrete availability ranges.
///
/// Input: `{schedule, windowStart, windowEnd, dstPolicy?}`. Returns a JSON
/// array of `{start, end, duration_minutes}` objects.
#[wasm_bindgen(js_name = "expandSchedule")]
pub fn expand_schedule(input_json: &str) -> Result<String, JsValue> {
    let input: ScheduleInput = serde_json::from_str(input_json)
        .map_err(|e| JsValue::from_str(&format!("Invalid schedule JSON: {}", e)))?;
    let window_start = parse_datetime(&input.window_start)?;
    let window_end = parse_datetime(&input.window_end)?;

    let ranges =
        slot_engine::expand_schedule(&input.schedule, window_start, window_end, input.dst_policy)
            .map_err(|e| JsValue::from_str(&e.to_string()))?;

    let dtos: Vec<DateRangeDto> = ranges.iter().map(DateRangeDto::from).collect();
    to_json(&dtos)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generate_slots_returns_json_array() {
        let request = r#"{
            "dateRanges": [{"start": "2024-06-03T09:00:00Z", "end": "2024-06-03T10:00:00Z"}],
            "frequency": 30,
            "eventLength": 30,
            "timeZone": "Europe/Paris"
        }"#;

        let json = generate_slots(request, Some("2024-06-01T00:00:00Z".to_string()))
            .unwrap_or_else(|_| panic!("generateSlots should succeed"));
        let slots: Vec<serde_json::Value> = serde_json::from_str(&json).unwrap();

        assert_eq!(slots.len(), 2);
        assert_eq!(slots[0]["time"], "2024-06-03T11:00:00+02:00");
    }

    #[test]
    fn expand_schedule_reports_durations() {
        let input = r#"{
            "schedule": {
                "timeZone": "UTC",
                "workingHours": [{"days": ["Mon"], "start": "09:00:00", "end": "10:30:00"}]
            },
            "windowStart": "2026-03-02T00:00:00Z",
            "windowEnd": "2026-03-03T00:00:00Z"
        }"#;

        let json =
            expand_schedule(input).unwrap_or_else(|_| panic!("expandSchedule should succeed"));
        let ranges: Vec<serde_json::Value> = serde_json::from_str(&json).unwrap();

        assert_eq!(ranges.len(), 1);
        assert_eq!(ranges[0]["duration_minutes"], 90);
    }
}
