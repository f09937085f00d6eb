use chrono::{Datelike, NaiveDate};

use crate::model::OperatingCalendar;
use crate::time::{overlaps, Min};

/// Platform slot granularity: candidate appointments start only on
/// :00/:30 boundaries, regardless of service duration.
pub const GRANULARITY_MIN: Min = 30;

// ── Slot Generation ──────────────────────────────────────────────

/// Produce the raw candidate start times for a service of `duration_min`
/// on `date`, walking the day's open window at `granularity_min` steps.
///
/// A candidate survives only if the whole service fits: it must end at or
/// before closing and must not straddle the break window. A closed day is
/// a normal outcome and yields an empty list, as does a duration longer
/// than the open window.
///
/// Malformed calendar data (inverted windows, non-positive duration or
/// granularity) degrades to an empty list rather than panicking — the
/// booking UI has to stay resilient to bad historical rows.
pub fn generate_candidates(
    calendar: &OperatingCalendar,
    date: NaiveDate,
    duration_min: Min,
    granularity_min: Min,
) -> Vec<Min> {
    if duration_min <= 0 || granularity_min <= 0 {
        return Vec::new();
    }
    let Some(window) = calendar.window_for(date.weekday()) else {
        return Vec::new(); // closed that day
    };
    if !window.is_well_formed() {
        return Vec::new();
    }
    if let Some(b) = calendar.break_window
        && !b.is_well_formed() {
            return Vec::new();
        }

    let mut candidates = Vec::new();
    let mut time = window.start;
    while time < window.end {
        let slot_end = time + duration_min;
        if slot_end > window.end {
            break; // every later start ends later still
        }
        let crosses_break = calendar
            .break_window
            .is_some_and(|b| overlaps(time, duration_min, b.start, b.duration_min()));
        if !crosses_break {
            candidates.push(time);
        }
        time += granularity_min;
    }
    candidates
}
