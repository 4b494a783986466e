//! Start-time alignment: interval selection, rounding, and the half-hour
//! timezone rule.
//!
//! Booking pages offer start times on clean wall-clock marks (`:00`, `:15`,
//! `:30`, ...). The interval is the coarsest mark spacing compatible with the
//! booking frequency; candidate start times are rounded up to it in the
//! target timezone's wall clock.

use chrono::{DateTime, Duration, Offset, TimeZone, Timelike, Utc};
use chrono_tz::Tz;

use crate::range::DateRange;

/// Intervals with well-defined start marks, coarsest first.
pub const INTERVALS_WITH_DEFINED_START_TIMES: [i64; 6] = [60, 30, 20, 15, 10, 5];

/// Fallback interval when no defined interval divides the frequency.
pub const DEFAULT_INTERVAL_MINUTES: i64 = 1;

/// Longest start-mark interval; marks never span more than one hour.
pub const MAX_INTERVAL_MINUTES: i64 = 60;

/// Pick the first interval in [`INTERVALS_WITH_DEFINED_START_TIMES`] that
/// divides `frequency` evenly, or `fallback` clamped to `1..=60`.
pub fn select_interval(frequency: i64, fallback: i64) -> i64 {
    INTERVALS_WITH_DEFINED_START_TIMES
        .iter()
        .copied()
        .find(|interval| frequency % interval == 0)
        .unwrap_or_else(|| fallback.clamp(1, MAX_INTERVAL_MINUTES))
}

/// Round `instant` up to the next multiple of `interval` minutes within its
/// local hour in `tz`. Already-aligned instants (zero seconds included) are
/// returned unchanged; a result of `:60` rolls into the next hour.
///
/// Returns `None` when the rounded instant is past the representable range.
pub fn round_up_to_interval(
    instant: DateTime<Utc>,
    interval: i64,
    tz: &Tz,
) -> Option<DateTime<Utc>> {
    let local = instant.with_timezone(tz);
    let nanos = i64::from(local.nanosecond() % 1_000_000_000);
    let into_hour = i64::from(local.minute()) * 60 + i64::from(local.second());
    let interval_secs = interval.clamp(1, MAX_INTERVAL_MINUTES) * 60;

    if into_hour % interval_secs == 0 && nanos == 0 {
        return Some(instant);
    }

    let start_of_hour = instant
        .checked_sub_signed(Duration::seconds(into_hour) + Duration::nanoseconds(nanos))?;
    // Any sub-second remainder still counts as "past" the previous mark.
    let marks = if nanos > 0 {
        into_hour / interval_secs + 1
    } else {
        (into_hour + interval_secs - 1) / interval_secs
    };
    start_of_hour.checked_add_signed(Duration::seconds(marks * interval_secs))
}

/// Timezones whose hourly slots always start at `:30` local, regardless of
/// the range shape.
const HALF_HOUR_PINNED_TIMEZONES: [Tz; 2] = [Tz::Asia__Kolkata, Tz::Asia__Calcutta];

// TODO: generalize to :15/:45 offsets (Asia/Kathmandu, Australia/Eucla) once
// a matching start-mark table exists for them.
/// Hourly slots in zones offset by a non-whole hour from UTC start at `:30`
/// local time.
///
/// The rule is intentionally narrow: it only fires for a 60-minute interval,
/// and only when either the zone is pinned (India) or its current UTC offset
/// is not a whole hour and some range starts at `:30` UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HalfHourRule {
    active: bool,
}

impl HalfHourRule {
    pub fn evaluate(tz: &Tz, interval: i64, ranges: &[DateRange], now: DateTime<Utc>) -> Self {
        if interval != 60 {
            return Self { active: false };
        }
        if HALF_HOUR_PINNED_TIMEZONES.contains(tz) {
            return Self { active: true };
        }
        let offset_secs = tz
            .offset_from_utc_datetime(&now.naive_utc())
            .fix()
            .local_minus_utc();
        let active =
            offset_secs % 3600 != 0 && ranges.iter().any(|range| range.start.minute() == 30);
        Self { active }
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Force the local minute of `instant` to 30, keeping its local hour.
    /// `None` only at the edge of the representable range.
    pub fn apply(&self, instant: DateTime<Utc>, tz: &Tz) -> Option<DateTime<Utc>> {
        if !self.active {
            return Some(instant);
        }
        let minute = i64::from(instant.with_timezone(tz).minute());
        instant.checked_add_signed(Duration::minutes(30 - minute))
    }
}
