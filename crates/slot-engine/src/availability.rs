//! End-to-end availability: schedule → ranges − busy → slots − conflicts.
//!
//! This is what a booking page asks for. The schedule is expanded into
//! ranges within the window, existing busy time is carved out, slots are
//! generated, and any slot whose buffered interval still touches busy time
//! is dropped.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::conflict::{self, EventBuffers};
use crate::dst::DstPolicy;
use crate::error::Result;
use crate::freebusy;
use crate::range::DateRange;
use crate::schedule::{self, Schedule};
use crate::slots::{self, SlotCandidate, SlotRequest};

/// Everything needed to compute bookable slots from a schedule.
///
/// The embedded [`SlotRequest`]'s `dateRanges` are ignored; they are derived
/// from `schedule` and `busy`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilityRequest {
    pub schedule: Schedule,
    pub window_start: DateTime<Utc>,
    pub window_end: DateTime<Utc>,
    /// Existing bookings and calendar events.
    #[serde(default)]
    pub busy: Vec<DateRange>,
    #[serde(default)]
    pub buffers: EventBuffers,
    #[serde(default)]
    pub dst_policy: DstPolicy,
    #[serde(flatten)]
    pub slots: SlotRequest,
}

/// Compute the bookable slots for `request`, treating `now` as the current time.
///
/// # Errors
/// Propagates schedule expansion errors (see [`schedule::expand_schedule`]).
pub fn available_slots(
    request: &AvailabilityRequest,
    now: DateTime<Utc>,
) -> Result<Vec<SlotCandidate>> {
    let ranges = schedule::expand_schedule(
        &request.schedule,
        request.window_start,
        request.window_end,
        request.dst_policy,
    )?;
    let free = freebusy::subtract_busy(&ranges, &request.busy);

    let mut slot_request = request.slots.clone();
    slot_request.date_ranges = free;
    let generated = slots::generate_slots(&slot_request, now);
    let generated_count = generated.len();

    let kept = conflict::filter_conflicting(
        generated,
        &request.busy,
        slot_request.event_length,
        request.buffers,
    );
    debug!(
        generated = generated_count,
        kept = kept.len(),
        "filtered slots against busy time"
    );
    Ok(kept)
}
