//! Availability ranges and out-of-office annotations.
//!
//! These are the inputs the slot generator consumes. Ranges are plain UTC
//! intervals; out-of-office entries are keyed by the calendar date on which
//! they apply, in the booking page's timezone.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// A contiguous interval during which the calendar owner can be booked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DateRange {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl DateRange {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }

    /// True when the range has no positive length (including `end < start`).
    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }

    pub fn duration_minutes(&self) -> i64 {
        (self.end - self.start).num_minutes()
    }

    /// Half-open containment: `start <= instant < end`.
    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        self.start <= instant && instant < self.end
    }
}

/// The user a booking is delegated to or from while someone is away.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutOfOfficeUser {
    pub id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
}

/// Annotation for a single out-of-office day.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutOfOfficeEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to_user: Option<OutOfOfficeUser>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from_user: Option<OutOfOfficeUser>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub emoji: Option<String>,
}

/// Out-of-office entries keyed by local calendar date (`YYYY-MM-DD`).
pub type OutOfOffice = BTreeMap<NaiveDate, OutOfOfficeEntry>;
