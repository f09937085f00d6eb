//! openslot — appointment availability engine for timed-service shops.
//!
//! Given a shop's operating calendar, optional per-staff schedules and the
//! day's committed bookings, compute the bookable time slots for a service
//! duration. The engine itself is a pure computation over an immutable
//! snapshot; all I/O goes through the [`Directory`] collaborator and the
//! double-booking guard lives in the ledger's write path, not here.

pub mod directory;
pub mod engine;
pub mod model;
pub mod observability;
pub mod service;
pub mod store;
pub mod time;

pub use directory::{Directory, DirectoryError};
pub use model::{
    Booking, BookingStatus, DayWindow, OperatingCalendar, ResourceSchedule, ScheduleError, Slot,
    WeekSchedule,
};
pub use service::AvailabilityService;
pub use store::{MemoryDirectory, ReserveError};
