use std::time::Instant;

use chrono::NaiveDate;
use tracing::debug;
use ulid::Ulid;

use crate::directory::{Directory, DirectoryError};
use crate::engine::{
    generate_candidates, resolve_any_resource, resolve_for_resource, resolve_plain,
    GRANULARITY_MIN,
};
use crate::model::{OperatingCalendar, Slot};
use crate::observability;
use crate::time::Min;

/// The single public entry point over the pure engine: loads the shop's
/// calendar, schedules and the day's bookings through the [`Directory`],
/// then resolves availability over that immutable snapshot.
///
/// The output is advisory as of the snapshot read time — the at-most-one-
/// booking-per-slot guarantee lives in the ledger's write path, not here.
pub struct AvailabilityService<D> {
    directory: D,
    granularity_min: Min,
}

impl<D: Directory> AvailabilityService<D> {
    pub fn new(directory: D) -> Self {
        Self {
            directory,
            granularity_min: GRANULARITY_MIN,
        }
    }

    /// Override the platform default granularity. Intended for tests and
    /// embedders with coarser booking grids.
    pub fn with_granularity(mut self, granularity_min: Min) -> Self {
        self.granularity_min = granularity_min;
        self
    }

    pub fn directory(&self) -> &D {
        &self.directory
    }

    /// Bookable slots for a service of `duration_min` on `date`.
    ///
    /// With `resource_id` set the query is pinned to that staff member;
    /// otherwise the shop is treated as a single queue of capacity 1.
    /// A shop closed that day, or one with no stored calendar (or an
    /// unknown pinned resource), yields `[]` — never an error.
    pub async fn available_slots(
        &self,
        shop_id: Ulid,
        date: NaiveDate,
        duration_min: Min,
        resource_id: Option<Ulid>,
    ) -> Result<Vec<Slot>, DirectoryError> {
        let started = Instant::now();
        let mode = if resource_id.is_some() { "resource" } else { "plain" };
        let result = self
            .resolve_slots(shop_id, date, duration_min, resource_id)
            .await;
        observability::record_query(mode, started.elapsed(), result.as_deref().ok());
        result
    }

    /// "Any available staff" mode: a slot is available if at least one
    /// resource is free for it, with the satisfying resource ids retained
    /// per slot. A shop with no tracked resources falls back to the plain
    /// single-queue model.
    pub async fn available_slots_any_resource(
        &self,
        shop_id: Ulid,
        date: NaiveDate,
        duration_min: Min,
    ) -> Result<Vec<Slot>, DirectoryError> {
        let started = Instant::now();
        let result = self.resolve_any(shop_id, date, duration_min).await;
        observability::record_query("any", started.elapsed(), result.as_deref().ok());
        result
    }

    async fn resolve_slots(
        &self,
        shop_id: Ulid,
        date: NaiveDate,
        duration_min: Min,
        resource_id: Option<Ulid>,
    ) -> Result<Vec<Slot>, DirectoryError> {
        let Some(calendar) = self.load_calendar(shop_id).await? else {
            return Ok(Vec::new());
        };
        let candidates = generate_candidates(&calendar, date, duration_min, self.granularity_min);
        if candidates.is_empty() {
            debug!(%shop_id, %date, "no candidates (closed or duration does not fit)");
            return Ok(Vec::new());
        }

        let bookings = self
            .directory
            .occupying_bookings(shop_id, date, resource_id)
            .await?;

        let slots = match resource_id {
            Some(rid) => {
                let schedule = match self.directory.resource_schedule(rid).await {
                    Ok(s) => s,
                    Err(DirectoryError::NotFound(_)) => {
                        debug!(resource_id = %rid, "no schedule configured for resource");
                        return Ok(Vec::new());
                    }
                    Err(e) => return Err(e),
                };
                resolve_for_resource(&candidates, duration_min, date, &bookings, &schedule)
            }
            None => resolve_plain(&candidates, duration_min, &bookings),
        };
        debug!(
            %shop_id,
            %date,
            duration_min,
            slots = slots.len(),
            free = slots.iter().filter(|s| s.available).count(),
            "resolved availability"
        );
        Ok(slots)
    }

    async fn resolve_any(
        &self,
        shop_id: Ulid,
        date: NaiveDate,
        duration_min: Min,
    ) -> Result<Vec<Slot>, DirectoryError> {
        let Some(calendar) = self.load_calendar(shop_id).await? else {
            return Ok(Vec::new());
        };
        let candidates = generate_candidates(&calendar, date, duration_min, self.granularity_min);
        if candidates.is_empty() {
            return Ok(Vec::new());
        }

        let bookings = self
            .directory
            .occupying_bookings(shop_id, date, None)
            .await?;
        let schedules = match self.directory.resource_schedules(shop_id).await {
            Ok(s) => s,
            Err(DirectoryError::NotFound(_)) => Vec::new(),
            Err(e) => return Err(e),
        };

        Ok(resolve_any_resource(
            &candidates,
            duration_min,
            date,
            &bookings,
            &schedules,
        ))
    }

    /// "Not configured" and "not open" are observably the same to a
    /// customer: a missing calendar becomes `None` here and `[]` upstream.
    async fn load_calendar(
        &self,
        shop_id: Ulid,
    ) -> Result<Option<OperatingCalendar>, DirectoryError> {
        match self.directory.operating_calendar(shop_id).await {
            Ok(calendar) => Ok(Some(calendar)),
            Err(DirectoryError::NotFound(_)) => {
                debug!(%shop_id, "no operating calendar configured");
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }
}
