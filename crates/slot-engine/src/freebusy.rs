//! Subtract busy time from availability.
//!
//! Sorts and merges busy periods, then sweeps each availability range and
//! keeps the gaps between merged busy periods.

use crate::range::DateRange;

/// Merge overlapping or adjacent ranges.
///
/// Empty and inverted ranges are dropped. Returns a sorted, non-overlapping
/// list.
pub fn merge_ranges(ranges: &[DateRange]) -> Vec<DateRange> {
    let mut sorted: Vec<DateRange> = ranges.iter().filter(|r| !r.is_empty()).copied().collect();

    // Sort by start time (then by end time for stability).
    sorted.sort_by_key(|r| (r.start, r.end));

    let mut merged: Vec<DateRange> = Vec::with_capacity(sorted.len());
    for range in sorted {
        if let Some(last) = merged.last_mut() {
            if range.start <= last.end {
                last.end = last.end.max(range.end);
                continue;
            }
        }
        merged.push(range);
    }

    merged
}

/// Remove every busy period from the available ranges.
///
/// Busy periods may overlap each other and may extend past the available
/// ranges. The result is sorted by start and contains no empty ranges.
pub fn subtract_busy(available: &[DateRange], busy: &[DateRange]) -> Vec<DateRange> {
    let busy = merge_ranges(busy);
    let mut free = Vec::new();

    for range in merge_ranges(available) {
        let mut cursor = range.start;

        for block in busy
            .iter()
            .filter(|b| b.start < range.end && b.end > range.start)
        {
            if cursor < block.start {
                free.push(DateRange::new(cursor, block.start));
            }
            cursor = cursor.max(block.end);
        }

        // Trailing free time after the last busy period.
        if cursor < range.end {
            free.push(DateRange::new(cursor, range.end));
        }
    }

    free
}
