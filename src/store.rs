use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use dashmap::DashMap;
use tokio::sync::RwLock;
use tracing::{debug, info};
use ulid::Ulid;

use crate::directory::{Directory, DirectoryError};
use crate::model::{Booking, OperatingCalendar, ResourceSchedule, ScheduleError};
use crate::observability;
use crate::time::overlaps;

type SharedLedger = Arc<RwLock<Vec<Booking>>>;

/// A reservation the ledger refused to commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReserveError {
    /// An occupying booking already covers part of the requested interval.
    Conflict(Ulid),
}

impl std::fmt::Display for ReserveError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReserveError::Conflict(id) => write!(f, "conflict with booking: {id}"),
        }
    }
}

impl std::error::Error for ReserveError {}

/// In-process implementation of the [`Directory`] boundary, plus the
/// write path the engine itself deliberately does not own.
///
/// Calendars and schedules are validated on save, so the read path can
/// assume well-formed data. The per-shop booking ledger sits behind one
/// `RwLock`: `try_reserve` re-checks overlap and inserts under a single
/// write guard, which is the atomic "reserve-if-free" contract a real
/// ledger must honor with a transaction or uniqueness constraint.
#[derive(Default)]
pub struct MemoryDirectory {
    calendars: DashMap<Ulid, OperatingCalendar>,
    schedules: DashMap<Ulid, ResourceSchedule>,
    /// shop id → resource ids with a stored schedule
    shop_resources: DashMap<Ulid, Vec<Ulid>>,
    ledgers: DashMap<Ulid, SharedLedger>,
}

impl MemoryDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    // ── Write paths (shop-owner settings + booking ledger) ───

    pub fn put_calendar(
        &self,
        shop_id: Ulid,
        calendar: OperatingCalendar,
    ) -> Result<(), ScheduleError> {
        calendar.validate()?;
        self.calendars.insert(shop_id, calendar);
        Ok(())
    }

    pub fn put_schedule(
        &self,
        shop_id: Ulid,
        schedule: ResourceSchedule,
    ) -> Result<(), ScheduleError> {
        schedule.validate()?;
        let mut resources = self.shop_resources.entry(shop_id).or_default();
        if !resources.contains(&schedule.resource_id) {
            resources.push(schedule.resource_id);
        }
        drop(resources);
        self.schedules.insert(schedule.resource_id, schedule);
        Ok(())
    }

    /// Commit a booking iff no occupying booking overlaps it.
    ///
    /// Unassigned bookings consume shop-wide capacity and conflict with
    /// everything in the interval; assigned bookings conflict only within
    /// the same resource's queue. The availability engine's output is
    /// advisory — this check is the actual double-booking guard, so two
    /// racing callers can never both succeed on the same interval.
    pub async fn try_reserve(&self, booking: Booking) -> Result<(), ReserveError> {
        let ledger = self.ledgers.entry(booking.shop_id).or_default().clone();
        let mut guard = ledger.write().await;
        for existing in guard.iter() {
            if !existing.occupies() || existing.date() != booking.date() {
                continue;
            }
            let same_queue = existing.resource_id.is_none()
                || booking.resource_id.is_none()
                || existing.resource_id == booking.resource_id;
            if same_queue
                && overlaps(
                    booking.start_min(),
                    booking.duration_min,
                    existing.start_min(),
                    existing.duration_min,
                )
            {
                metrics::counter!(observability::RESERVE_CONFLICTS_TOTAL).increment(1);
                debug!(id = %booking.id, against = %existing.id, "reservation rejected");
                return Err(ReserveError::Conflict(existing.id));
            }
        }
        info!(id = %booking.id, shop_id = %booking.shop_id, start = %booking.start, "booking reserved");
        guard.push(booking);
        Ok(())
    }

    /// Mark a booking cancelled. Returns false if the shop or booking is
    /// unknown. Cancelled rows stay in the ledger but never occupy.
    pub async fn cancel_booking(&self, shop_id: Ulid, booking_id: Ulid) -> bool {
        let Some(ledger) = self.ledgers.get(&shop_id).map(|e| e.value().clone()) else {
            return false;
        };
        let mut guard = ledger.write().await;
        match guard.iter_mut().find(|b| b.id == booking_id) {
            Some(b) => {
                b.status = crate::model::BookingStatus::Cancelled;
                info!(id = %booking_id, "booking cancelled");
                true
            }
            None => false,
        }
    }
}

#[async_trait]
impl Directory for MemoryDirectory {
    async fn operating_calendar(&self, shop_id: Ulid) -> Result<OperatingCalendar, DirectoryError> {
        self.calendars
            .get(&shop_id)
            .map(|e| e.value().clone())
            .ok_or(DirectoryError::NotFound(shop_id))
    }

    async fn resource_schedule(
        &self,
        resource_id: Ulid,
    ) -> Result<ResourceSchedule, DirectoryError> {
        self.schedules
            .get(&resource_id)
            .map(|e| e.value().clone())
            .ok_or(DirectoryError::NotFound(resource_id))
    }

    async fn resource_schedules(
        &self,
        shop_id: Ulid,
    ) -> Result<Vec<ResourceSchedule>, DirectoryError> {
        let Some(ids) = self.shop_resources.get(&shop_id) else {
            return Ok(Vec::new());
        };
        Ok(ids
            .iter()
            .filter_map(|rid| self.schedules.get(rid).map(|e| e.value().clone()))
            .collect())
    }

    async fn occupying_bookings(
        &self,
        shop_id: Ulid,
        date: NaiveDate,
        resource_id: Option<Ulid>,
    ) -> Result<Vec<Booking>, DirectoryError> {
        let Some(ledger) = self.ledgers.get(&shop_id).map(|e| e.value().clone()) else {
            return Ok(Vec::new());
        };
        let guard = ledger.read().await;
        Ok(guard
            .iter()
            .filter(|b| {
                b.occupies()
                    && b.date() == date
                    && resource_id.is_none_or(|rid| b.resource_id == Some(rid))
            })
            .cloned()
            .collect())
    }
}
