//! # slot-engine
//!
//! Deterministic booking slot generation for calendar scheduling.
//!
//! Turns a calendar owner's availability into the discrete start times a
//! booking page offers, with wall-clock aligned start marks, minimum notice,
//! start offsets, out-of-office tagging and timezone-aware rounding.
//!
//! ## Modules
//!
//! - [`slots`] — availability ranges → ordered, de-duplicated slot list
//! - [`interval`] — start-mark interval selection and the half-hour timezone rule
//! - [`schedule`] — weekly working hours and date overrides → ranges (via `rrule`)
//! - [`dst`] — DST gap/overlap policies for wall-clock times
//! - [`freebusy`] — merge ranges and subtract busy time
//! - [`conflict`] — drop slots overlapping busy time, with event buffers
//! - [`availability`] — the full schedule → slots pipeline
//! - [`error`] — Error types

pub mod availability;
pub mod conflict;
pub mod dst;
pub mod error;
pub mod freebusy;
pub mod interval;
pub mod range;
pub mod schedule;
pub mod slots;

pub use availability::{available_slots, AvailabilityRequest};
pub use conflict::{filter_conflicting, EventBuffers};
pub use dst::DstPolicy;
pub use error::SlotError;
pub use freebusy::{merge_ranges, subtract_busy};
pub use range::{DateRange, OutOfOffice, OutOfOfficeEntry, OutOfOfficeUser};
pub use schedule::{
    expand_schedule, parse_timezone, DateOverride, Schedule, TimeSpan, WorkingHours,
};
pub use slots::{generate_slots, generate_slots_now, SlotCandidate, SlotRequest};
