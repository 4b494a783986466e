//! Weekly working hours → concrete availability ranges.
//!
//! Working days are enumerated with the `rrule` crate (`FREQ=WEEKLY;BYDAY=..`)
//! in the schedule's timezone. Each day's wall-clock hours are then resolved
//! to UTC with a [`DstPolicy`], so a 09:00–17:00 schedule stays 09:00–17:00
//! local across DST changes. Date overrides replace the weekly hours for
//! their date; an override without hours blocks the whole day.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Datelike, NaiveDate, NaiveTime, Utc, Weekday};
use chrono_tz::Tz;
use rrule::RRuleSet;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::dst::{self, DstPolicy};
use crate::error::{Result, SlotError};
use crate::freebusy;
use crate::range::DateRange;

/// A wall-clock span within one day. An `end` at or before `start` runs past
/// midnight into the next day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeSpan {
    pub start: NaiveTime,
    pub end: NaiveTime,
}

/// Hours that repeat every week on the given days.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkingHours {
    pub days: Vec<Weekday>,
    #[serde(flatten)]
    pub hours: TimeSpan,
}

/// Replacement hours for one specific date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DateOverride {
    pub date: NaiveDate,
    #[serde(default)]
    pub hours: Vec<TimeSpan>,
}

/// A user's availability schedule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Schedule {
    pub time_zone: Tz,
    pub working_hours: Vec<WorkingHours>,
    #[serde(default)]
    pub date_overrides: Vec<DateOverride>,
}

/// Parse an IANA timezone name.
///
/// # Errors
/// Returns `SlotError::InvalidTimezone` if `name` is not a known identifier.
pub fn parse_timezone(name: &str) -> Result<Tz> {
    name.parse::<Tz>()
        .map_err(|_| SlotError::InvalidTimezone(name.to_string()))
}

/// Expand `schedule` into availability ranges inside `[window_start, window_end)`.
///
/// The result is sorted and merged (overlapping hours from different
/// working-hours entries collapse into one range).
///
/// # Errors
/// - `SlotError::InvalidParameter` if the window is inverted or an entry has
///   no days.
/// - `SlotError::InvalidRule` if the weekday recurrence cannot be built.
pub fn expand_schedule(
    schedule: &Schedule,
    window_start: DateTime<Utc>,
    window_end: DateTime<Utc>,
    policy: DstPolicy,
) -> Result<Vec<DateRange>> {
    if window_end < window_start {
        return Err(SlotError::InvalidParameter(format!(
            "window end {} is before window start {}",
            window_end, window_start
        )));
    }
    if window_end == window_start {
        return Ok(Vec::new());
    }

    let tz = schedule.time_zone;
    // One extra day on each side so overnight spans crossing a window edge
    // are still produced.
    let first_date = window_start.with_timezone(&tz).date_naive();
    let first_date = first_date.pred_opt().unwrap_or(first_date);
    let last_date = window_end.with_timezone(&tz).date_naive();
    let last_date = last_date.succ_opt().unwrap_or(last_date);

    let overrides: BTreeMap<NaiveDate, &DateOverride> = schedule
        .date_overrides
        .iter()
        .map(|o| (o.date, o))
        .collect();

    let mut ranges = Vec::new();

    for entry in &schedule.working_hours {
        let dates = working_dates(&entry.days, &tz, first_date, last_date)?;
        for date in dates.into_iter().filter(|d| !overrides.contains_key(d)) {
            ranges.extend(resolve_span(&tz, date, entry.hours, policy));
        }
    }

    for (date, over) in overrides.range(first_date..=last_date) {
        for span in &over.hours {
            ranges.extend(resolve_span(&tz, *date, *span, policy));
        }
    }

    let clipped: Vec<DateRange> = ranges
        .into_iter()
        .map(|r| DateRange::new(r.start.max(window_start), r.end.min(window_end)))
        .collect();
    let merged = freebusy::merge_ranges(&clipped);

    debug!(
        time_zone = %tz,
        ranges = merged.len(),
        "expanded schedule into availability ranges"
    );
    Ok(merged)
}

/// Resolve one day's wall-clock span to UTC, or `None` if an end point falls
/// in a DST gap under `DstPolicy::Skip` (or past the last representable date).
fn resolve_span(tz: &Tz, date: NaiveDate, span: TimeSpan, policy: DstPolicy) -> Option<DateRange> {
    let end_date = if span.end <= span.start {
        date.succ_opt()?
    } else {
        date
    };
    let start = dst::resolve_local(tz, date.and_time(span.start), policy)?;
    let end = dst::resolve_local(tz, end_date.and_time(span.end), policy)?;
    Some(DateRange::new(start, end))
}

/// Enumerate local dates in `[first, last]` that fall on one of `days`.
fn working_dates(
    days: &[Weekday],
    tz: &Tz,
    first: NaiveDate,
    last: NaiveDate,
) -> Result<BTreeSet<NaiveDate>> {
    if days.is_empty() {
        return Err(SlotError::InvalidParameter(
            "working hours must list at least one day".to_string(),
        ));
    }

    let byday: Vec<&str> = days.iter().map(|d| rrule_weekday(*d)).collect();
    // Noon never falls in a DST gap, so every matching date yields an instance.
    let rrule_text = format!(
        "DTSTART;TZID={}:{}T120000\nRRULE:FREQ=WEEKLY;BYDAY={}",
        tz.name(),
        first.format("%Y%m%d"),
        byday.join(",")
    );

    let rrule_set: RRuleSet = rrule_text
        .parse()
        .map_err(|e| SlotError::InvalidRule(format!("{}", e)))?;

    // At most one instance per day in the span.
    let span_days = (last - first).num_days() + 1;
    let limit = u16::try_from(span_days).unwrap_or(u16::MAX);

    Ok(rrule_set
        .all(limit)
        .dates
        .into_iter()
        .map(|dt| dt.date_naive())
        .filter(|d| *d >= first && *d <= last && days.contains(&d.weekday()))
        .collect())
}

fn rrule_weekday(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "MO",
        Weekday::Tue => "TU",
        Weekday::Wed => "WE",
        Weekday::Thu => "TH",
        Weekday::Fri => "FR",
        Weekday::Sat => "SA",
        Weekday::Sun => "SU",
    }
}
