//! Tests for range merging and busy-time subtraction.

use chrono::{DateTime, Utc};
use slot_engine::freebusy::{merge_ranges, subtract_busy};
use slot_engine::DateRange;

fn at(s: &str) -> DateTime<Utc> {
    s.parse().unwrap()
}

/// Range on 2026-03-02 between two `HH:MM` times.
fn hours(start: &str, end: &str) -> DateRange {
    DateRange::new(
        at(&format!("2026-03-02T{}:00Z", start)),
        at(&format!("2026-03-02T{}:00Z", end)),
    )
}

#[test]
fn merge_joins_overlapping_and_adjacent_ranges() {
    let merged = merge_ranges(&[
        hours("13:00", "14:00"),
        hours("09:00", "10:30"),
        hours("10:00", "11:00"),
        hours("11:00", "12:00"),
    ]);

    assert_eq!(merged, vec![hours("09:00", "12:00"), hours("13:00", "14:00")]);
}

#[test]
fn merge_drops_empty_and_inverted_ranges() {
    let merged = merge_ranges(&[
        hours("09:00", "09:00"),
        hours("12:00", "10:00"),
        hours("14:00", "15:00"),
    ]);

    assert_eq!(merged, vec![hours("14:00", "15:00")]);
}

#[test]
fn single_busy_block_splits_range() {
    let free = subtract_busy(&[hours("09:00", "17:00")], &[hours("10:00", "11:00")]);

    assert_eq!(free, vec![hours("09:00", "10:00"), hours("11:00", "17:00")]);
}

#[test]
fn overlapping_busy_blocks_merged_before_subtraction() {
    let free = subtract_busy(
        &[hours("09:00", "17:00")],
        &[hours("11:00", "12:00"), hours("10:00", "11:30")],
    );

    assert_eq!(free, vec![hours("09:00", "10:00"), hours("12:00", "17:00")]);
}

#[test]
fn busy_outside_availability_changes_nothing() {
    let free = subtract_busy(&[hours("09:00", "12:00")], &[hours("13:00", "14:00")]);

    assert_eq!(free, vec![hours("09:00", "12:00")]);
}

#[test]
fn busy_covering_availability_leaves_nothing() {
    let free = subtract_busy(
        &[hours("09:00", "10:00"), hours("11:00", "12:00")],
        &[hours("08:00", "13:00")],
    );

    assert!(free.is_empty());
}

#[test]
fn busy_spanning_two_ranges_trims_both() {
    let free = subtract_busy(
        &[hours("09:00", "10:00"), hours("11:00", "12:00")],
        &[hours("09:30", "11:30")],
    );

    assert_eq!(free, vec![hours("09:00", "09:30"), hours("11:30", "12:00")]);
}

#[test]
fn no_busy_returns_merged_availability() {
    let free = subtract_busy(&[hours("10:00", "11:00"), hours("09:00", "10:00")], &[]);

    assert_eq!(free, vec![hours("09:00", "11:00")]);
}
