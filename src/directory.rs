use async_trait::async_trait;
use chrono::NaiveDate;
use ulid::Ulid;

use crate::model::{Booking, OperatingCalendar, ResourceSchedule};

/// Why a collaborator lookup failed.
#[derive(Debug)]
pub enum DirectoryError {
    /// No stored configuration for this shop or resource. Observably the
    /// same as "closed" to a customer; the service maps it to an empty
    /// slot list instead of surfacing it.
    NotFound(Ulid),
    /// Backend read failure. Retryable; propagated to the caller unchanged,
    /// the engine never retries on the collaborator's behalf.
    Unavailable(String),
}

impl std::fmt::Display for DirectoryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DirectoryError::NotFound(id) => write!(f, "not found: {id}"),
            DirectoryError::Unavailable(e) => write!(f, "directory unavailable: {e}"),
        }
    }
}

impl std::error::Error for DirectoryError {}

/// The persistence boundary the engine reads through. Implemented by the
/// surrounding application; [`crate::store::MemoryDirectory`] is the
/// in-process reference implementation.
///
/// All I/O happens here, before the pure engine runs. The engine never
/// calls back into the directory mid-computation.
#[async_trait]
pub trait Directory: Send + Sync {
    async fn operating_calendar(&self, shop_id: Ulid) -> Result<OperatingCalendar, DirectoryError>;

    async fn resource_schedule(&self, resource_id: Ulid)
        -> Result<ResourceSchedule, DirectoryError>;

    /// Schedules for every active resource of the shop. A shop with no
    /// tracked resources returns an empty list, not `NotFound`.
    async fn resource_schedules(
        &self,
        shop_id: Ulid,
    ) -> Result<Vec<ResourceSchedule>, DirectoryError>;

    /// Non-cancelled bookings for the shop on the date, optionally narrowed
    /// to one resource. Implementations should exclude cancelled rows at
    /// the source; the engine re-filters defensively either way.
    async fn occupying_bookings(
        &self,
        shop_id: Ulid,
        date: NaiveDate,
        resource_id: Option<Ulid>,
    ) -> Result<Vec<Booking>, DirectoryError>;
}
