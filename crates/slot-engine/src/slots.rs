//! Bookable slot generation from availability ranges.
//!
//! Given the ranges a calendar owner is available, a booking frequency and an
//! event length, produces the discrete start times a booking page offers:
//!
//! 1. Ranges are sorted by start.
//! 2. Each range's first candidate is clamped to the minimum-notice floor and
//!    rounded up to the selected start-mark interval (see [`crate::interval`]).
//! 3. Candidates falling inside a slot already placed by an earlier range are
//!    snapped onto that slot, or pushed one step past it when the slot lies
//!    before the current range.
//! 4. Slots are emitted every `frequency + offset_start` minutes for as long
//!    as the whole event fits in the range.
//!
//! Output is keyed by instant, so no two slots share a start time. Iteration
//! order is insertion order; it is not re-sorted at the end.

use chrono::{DateTime, Duration, Utc};
use chrono_tz::Tz;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::error::{Result, SlotError};
use crate::interval::{self, HalfHourRule, DEFAULT_INTERVAL_MINUTES};
use crate::range::{DateRange, OutOfOffice, OutOfOfficeEntry, OutOfOfficeUser};

/// Parameters for a single slot generation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlotRequest {
    /// Availability ranges. Order does not matter.
    #[serde(default)]
    pub date_ranges: Vec<DateRange>,
    /// Minutes between consecutive slot start times.
    pub frequency: i64,
    /// Length of the booked event in minutes.
    pub event_length: i64,
    /// Timezone the booking page renders slots in.
    pub time_zone: Tz,
    /// Minimum lead time between "now" and the earliest slot, in minutes.
    #[serde(default)]
    pub minimum_booking_notice: i64,
    /// Extra minutes added to the first start and to every step.
    #[serde(default)]
    pub offset_start: Option<i64>,
    #[serde(default)]
    pub dates_out_of_office: OutOfOffice,
    /// Start-mark interval used when no defined interval divides `frequency`.
    #[serde(default = "default_interval")]
    pub default_interval: i64,
    /// Passed through onto every emitted slot.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_ids: Option<Vec<i64>>,
}

/// Upper bound for every minute-valued request field (about a century).
pub const MAX_DURATION_MINUTES: i64 = 100 * 366 * 24 * 60;

fn default_interval() -> i64 {
    DEFAULT_INTERVAL_MINUTES
}

impl SlotRequest {
    pub fn new(
        date_ranges: Vec<DateRange>,
        frequency: i64,
        event_length: i64,
        time_zone: Tz,
        minimum_booking_notice: i64,
    ) -> Self {
        Self {
            date_ranges,
            frequency,
            event_length,
            time_zone,
            minimum_booking_notice,
            offset_start: None,
            dates_out_of_office: OutOfOffice::new(),
            default_interval: DEFAULT_INTERVAL_MINUTES,
            user_ids: None,
        }
    }

    pub fn with_offset_start(mut self, offset_start: i64) -> Self {
        self.offset_start = Some(offset_start);
        self
    }

    pub fn with_out_of_office(mut self, dates_out_of_office: OutOfOffice) -> Self {
        self.dates_out_of_office = dates_out_of_office;
        self
    }

    pub fn with_default_interval(mut self, default_interval: i64) -> Self {
        self.default_interval = default_interval;
        self
    }

    pub fn with_user_ids(mut self, user_ids: Vec<i64>) -> Self {
        self.user_ids = Some(user_ids);
        self
    }

    /// Reject negative or oversized durations instead of silently clamping
    /// them.
    ///
    /// [`generate_slots`] never calls this; it clamps everything into
    /// `1..=MAX_DURATION_MINUTES`. Callers that prefer a hard error validate
    /// first.
    pub fn validate(&self) -> Result<()> {
        let checks = [
            ("frequency", Some(self.frequency)),
            ("eventLength", Some(self.event_length)),
            ("offsetStart", self.offset_start),
            ("minimumBookingNotice", Some(self.minimum_booking_notice)),
        ];
        for (name, value) in checks {
            if let Some(v) = value {
                if v < 0 {
                    return Err(SlotError::InvalidParameter(format!(
                        "{} must not be negative, got {}",
                        name, v
                    )));
                }
                if v > MAX_DURATION_MINUTES {
                    return Err(SlotError::InvalidParameter(format!(
                        "{} must not exceed {} minutes, got {}",
                        name, MAX_DURATION_MINUTES, v
                    )));
                }
            }
        }
        Ok(())
    }
}

/// A single offerable start time.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SlotCandidate {
    /// Start time, expressed in the request's timezone.
    pub time: DateTime<Tz>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_ids: Option<Vec<i64>>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub away: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from_user: Option<OutOfOfficeUser>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to_user: Option<OutOfOfficeUser>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub emoji: Option<String>,
}

impl SlotCandidate {
    fn new(time: DateTime<Tz>, user_ids: Option<Vec<i64>>) -> Self {
        Self {
            time,
            user_ids,
            away: false,
            from_user: None,
            to_user: None,
            reason: None,
            emoji: None,
        }
    }

    /// Mark the slot as away, copying only the fields the entry defines.
    fn mark_away(&mut self, entry: &OutOfOfficeEntry) {
        self.away = true;
        self.from_user = entry.from_user.clone();
        self.to_user = entry.to_user.clone();
        self.reason = entry.reason.clone();
        self.emoji = entry.emoji.clone();
    }

    /// The slot start as a UTC instant.
    pub fn instant(&self) -> DateTime<Utc> {
        self.time.with_timezone(&Utc)
    }
}

/// Generate slots using the current wall-clock time as "now".
pub fn generate_slots_now(request: &SlotRequest) -> Vec<SlotCandidate> {
    generate_slots(request, Utc::now())
}

/// Generate bookable slots for `request`, treating `now` as the current time.
///
/// Total over its input: ranges that end before they start contribute no
/// slots, non-positive durations are clamped to one minute, and durations are
/// capped at [`MAX_DURATION_MINUTES`]. A range whose slot times would leave
/// the representable date range contributes no further slots.
pub fn generate_slots(request: &SlotRequest, now: DateTime<Utc>) -> Vec<SlotCandidate> {
    let tz = request.time_zone;
    let frequency = request.frequency.clamp(1, MAX_DURATION_MINUTES);
    let event_length = Duration::minutes(request.event_length.clamp(1, MAX_DURATION_MINUTES));
    // A zero offset means "no offset"; anything else is at least one minute.
    let offset_start = match request.offset_start {
        Some(offset) if offset != 0 => offset.clamp(1, MAX_DURATION_MINUTES),
        _ => 0,
    };
    let offset = Duration::minutes(offset_start);
    let step = Duration::minutes(frequency + offset_start);

    let interval = interval::select_interval(frequency, request.default_interval);
    debug!(frequency, interval, "selected slot start interval");

    let mut ranges = request.date_ranges.clone();
    ranges.sort_by_key(|range| range.start);

    let notice = Duration::minutes(
        request
            .minimum_booking_notice
            .clamp(-MAX_DURATION_MINUTES, MAX_DURATION_MINUTES),
    );
    let Some(earliest_allowed) = now.checked_add_signed(notice) else {
        debug!(%now, "minimum notice leaves no representable start time");
        return Vec::new();
    };
    let half_hour = HalfHourRule::evaluate(&tz, interval, &ranges, now);
    if half_hour.is_active() {
        debug!(time_zone = %tz, "half-hour timezone rule active");
    }

    let mut slots: IndexMap<DateTime<Utc>, SlotCandidate> = IndexMap::new();

    for range in &ranges {
        let Some(mut cursor) =
            first_candidate(range, earliest_allowed, interval, offset, half_hour, &tz)
        else {
            continue;
        };

        let overlapping = slots.keys().copied().find(|&existing| {
            existing < cursor
                && existing
                    .checked_add_signed(step)
                    .is_none_or(|end| end > cursor)
        });
        if let Some(existing) = overlapping {
            let moved = if existing >= range.start {
                trace!(%existing, %cursor, "snapping onto existing slot");
                Some(existing)
            } else {
                trace!(%existing, %cursor, "advancing past existing slot");
                existing.checked_add_signed(step)
            };
            match moved.and_then(|instant| half_hour.apply(instant, &tz)) {
                Some(instant) => cursor = instant,
                None => continue,
            }
        }

        let before = slots.len();
        loop {
            let fits = cursor
                .checked_add_signed(event_length - Duration::seconds(1))
                .is_some_and(|last_second| last_second <= range.end);
            if !fits {
                break;
            }
            let time = cursor.with_timezone(&tz);
            let mut slot = SlotCandidate::new(time, request.user_ids.clone());
            if let Some(entry) = request.dates_out_of_office.get(&time.date_naive()) {
                slot.mark_away(entry);
            }
            slots.insert(cursor, slot);
            match cursor.checked_add_signed(step) {
                Some(next) => cursor = next,
                None => break,
            }
        }
        debug!(
            range_start = %range.start,
            range_end = %range.end,
            new_slots = slots.len() - before,
            "generated slots for range"
        );
    }

    slots.into_values().collect()
}

/// The first start time in `range`: notice floor, rounded to the start-mark
/// interval, shifted by the offset, then run through the half-hour rule.
fn first_candidate(
    range: &DateRange,
    earliest_allowed: DateTime<Utc>,
    interval: i64,
    offset: Duration,
    half_hour: HalfHourRule,
    tz: &Tz,
) -> Option<DateTime<Utc>> {
    let floor = range.start.max(earliest_allowed);
    let rounded = interval::round_up_to_interval(floor, interval, tz)?;
    let shifted = rounded.checked_add_signed(offset)?;
    half_hour.apply(shifted, tz)
}
