use chrono::NaiveDate;

use crate::model::{Booking, ResourceSchedule, Slot};
use crate::time::{overlaps, Min};

// ── Availability Resolution ──────────────────────────────────────

/// Plain mode: the shop is one undifferentiated queue of capacity 1.
/// A candidate is unavailable iff any occupying booking overlaps it,
/// no matter which resource that booking is assigned to.
///
/// Bookings are re-filtered through `occupies()` here even though the
/// ledger query is supposed to exclude cancelled rows at the source.
pub fn resolve_plain(candidates: &[Min], duration_min: Min, bookings: &[Booking]) -> Vec<Slot> {
    candidates
        .iter()
        .map(|&time| {
            let blocked = bookings.iter().any(|b| {
                b.occupies() && overlaps(time, duration_min, b.start_min(), b.duration_min)
            });
            Slot {
                time,
                available: !blocked,
                free_resources: Vec::new(),
            }
        })
        .collect()
}

/// Resource-aware mode: the customer picked a named staff member.
///
/// Day-off and temporary-off dates short-circuit before any per-slot
/// reasoning. Surviving candidates must fit entirely inside the
/// resource's work window, then clear conflicts against bookings
/// assigned to *this* resource only — other resources' bookings are
/// parallel capacity and never block.
pub fn resolve_for_resource(
    candidates: &[Min],
    duration_min: Min,
    date: NaiveDate,
    bookings: &[Booking],
    schedule: &ResourceSchedule,
) -> Vec<Slot> {
    // An inverted work window is a write-path precondition violation;
    // degrade to all-unavailable rather than computing nonsense.
    if schedule.is_off_on(date) || !schedule.work_window.is_well_formed() {
        return candidates.iter().map(|&t| Slot::unavailable(t)).collect();
    }

    candidates
        .iter()
        .map(|&time| {
            let slot_end = time + duration_min;
            if !schedule.work_window.contains_span(time, slot_end) {
                return Slot::unavailable(time);
            }
            let blocked = bookings.iter().any(|b| {
                b.occupies()
                    && b.resource_id == Some(schedule.resource_id)
                    && overlaps(time, duration_min, b.start_min(), b.duration_min)
            });
            if blocked {
                Slot::unavailable(time)
            } else {
                Slot {
                    time,
                    available: true,
                    free_resources: vec![schedule.resource_id],
                }
            }
        })
        .collect()
}

/// "Any available staff" mode: resolve every schedule independently and
/// OR-merge per candidate, retaining the set of satisfying resources so
/// the caller can offer a choice. Ordering follows the candidate list.
///
/// A shop with no tracked resources falls back to plain resolution.
pub fn resolve_any_resource(
    candidates: &[Min],
    duration_min: Min,
    date: NaiveDate,
    bookings: &[Booking],
    schedules: &[ResourceSchedule],
) -> Vec<Slot> {
    if schedules.is_empty() {
        return resolve_plain(candidates, duration_min, bookings);
    }

    let mut merged: Vec<Slot> = candidates.iter().map(|&t| Slot::unavailable(t)).collect();
    for schedule in schedules {
        let per_resource = resolve_for_resource(candidates, duration_min, date, bookings, schedule);
        for (slot, resolved) in merged.iter_mut().zip(per_resource) {
            if resolved.available {
                slot.available = true;
                slot.free_resources.extend(resolved.free_resources);
            }
        }
    }
    merged
}
