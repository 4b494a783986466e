//! Drop slots that collide with busy time.
//!
//! A slot occupies `[time - before, time + event_length + after)` once its
//! buffers are applied. Adjacent intervals (one ends exactly when the other
//! starts) are NOT conflicts.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::range::DateRange;
use crate::slots::{SlotCandidate, MAX_DURATION_MINUTES};

/// Padding reserved around every booking, in minutes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventBuffers {
    #[serde(default)]
    pub before_event: i64,
    #[serde(default)]
    pub after_event: i64,
}

/// Two intervals overlap iff `a.start < b.end && b.start < a.end`.
pub fn overlaps(
    a_start: DateTime<Utc>,
    a_end: DateTime<Utc>,
    b_start: DateTime<Utc>,
    b_end: DateTime<Utc>,
) -> bool {
    a_start < b_end && b_start < a_end
}

/// Keep only the slots whose buffered interval does not overlap any busy
/// period. Order is preserved.
///
/// Durations are capped at [`MAX_DURATION_MINUTES`]; a buffered interval that
/// runs off the representable range is clamped to its edge.
pub fn filter_conflicting(
    slots: Vec<SlotCandidate>,
    busy: &[DateRange],
    event_length: i64,
    buffers: EventBuffers,
) -> Vec<SlotCandidate> {
    let length = Duration::minutes(event_length.clamp(1, MAX_DURATION_MINUTES));
    let before = Duration::minutes(buffers.before_event.clamp(0, MAX_DURATION_MINUTES));
    let after = Duration::minutes(buffers.after_event.clamp(0, MAX_DURATION_MINUTES));

    slots
        .into_iter()
        .filter(|slot| {
            let start = slot
                .instant()
                .checked_sub_signed(before)
                .unwrap_or(DateTime::<Utc>::MIN_UTC);
            let end = slot
                .instant()
                .checked_add_signed(length + after)
                .unwrap_or(DateTime::<Utc>::MAX_UTC);
            !busy
                .iter()
                .any(|block| overlaps(start, end, block.start, block.end))
        })
        .collect()
}
