use std::collections::HashSet;

use chrono::{Datelike, NaiveDate, NaiveDateTime, Timelike, Weekday};
use serde::{Deserialize, Serialize};
use ulid::Ulid;

use crate::time::{hhmm, Min, TimeRange, DAY_MIN};

/// One weekday's open/close window. `open < close`; overnight windows
/// (close past midnight) are not representable and are rejected at save time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayWindow {
    #[serde(with = "hhmm")]
    pub open: Min,
    #[serde(with = "hhmm")]
    pub close: Min,
}

impl DayWindow {
    pub fn as_range(&self) -> TimeRange {
        TimeRange::new(self.open, self.close)
    }

    pub fn is_well_formed(&self) -> bool {
        self.open >= 0 && self.open < self.close && self.close <= DAY_MIN
    }
}

/// Exactly seven entries, one per weekday. `None` means closed that day —
/// a normal state, not an error.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeekSchedule {
    pub monday: Option<DayWindow>,
    pub tuesday: Option<DayWindow>,
    pub wednesday: Option<DayWindow>,
    pub thursday: Option<DayWindow>,
    pub friday: Option<DayWindow>,
    pub saturday: Option<DayWindow>,
    pub sunday: Option<DayWindow>,
}

impl WeekSchedule {
    pub fn window_for(&self, day: Weekday) -> Option<DayWindow> {
        match day {
            Weekday::Mon => self.monday,
            Weekday::Tue => self.tuesday,
            Weekday::Wed => self.wednesday,
            Weekday::Thu => self.thursday,
            Weekday::Fri => self.friday,
            Weekday::Sat => self.saturday,
            Weekday::Sun => self.sunday,
        }
    }

    fn windows(&self) -> [(Weekday, Option<DayWindow>); 7] {
        [
            (Weekday::Mon, self.monday),
            (Weekday::Tue, self.tuesday),
            (Weekday::Wed, self.wednesday),
            (Weekday::Thu, self.thursday),
            (Weekday::Fri, self.friday),
            (Weekday::Sat, self.saturday),
            (Weekday::Sun, self.sunday),
        ]
    }
}

/// A shop's weekly operating hours plus the optional 24-hour flag and the
/// single daily break window shared by every open day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperatingCalendar {
    #[serde(flatten)]
    pub week: WeekSchedule,
    pub is_24h: bool,
    #[serde(rename = "break_time")]
    pub break_window: Option<TimeRange>,
}

impl OperatingCalendar {
    /// The effective open window for a weekday. 24-hour shops are open
    /// `[00:00, 24:00)` every day regardless of per-day entries.
    pub fn window_for(&self, day: Weekday) -> Option<TimeRange> {
        if self.is_24h {
            return Some(TimeRange { start: 0, end: DAY_MIN });
        }
        self.week
            .window_for(day)
            .filter(DayWindow::is_well_formed)
            .map(|w| w.as_range())
    }

    /// Day-level "closed" indicator for the booking UI.
    pub fn is_open_on(&self, day: Weekday) -> bool {
        self.window_for(day).is_some()
    }

    /// Is the shop serving customers at this instant? Inside the day window
    /// and outside the break. 24-hour shops are always open.
    pub fn is_open_at(&self, day: Weekday, t: Min) -> bool {
        if self.is_24h {
            return true;
        }
        let Some(window) = self.window_for(day) else {
            return false;
        };
        if let Some(b) = self.break_window
            && b.contains_instant(t) {
                return false;
            }
        window.contains_instant(t)
    }

    /// Save-time validation. The engine itself never re-validates per query;
    /// it degrades malformed historical data to "no candidates" instead.
    pub fn validate(&self) -> Result<(), ScheduleError> {
        for (day, window) in self.week.windows() {
            if let Some(w) = window
                && !w.is_well_formed() {
                    return Err(ScheduleError::InvertedWindow(day));
                }
        }
        if let Some(b) = self.break_window {
            if !b.is_well_formed() {
                return Err(ScheduleError::InvertedBreak);
            }
            if self.is_24h {
                return Err(ScheduleError::BreakWith24h);
            }
        }
        Ok(())
    }
}

/// A staff member's own weekly availability, layered under the shop's
/// operating hours: the engine intersects the two, it never validates one
/// against the other.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceSchedule {
    pub resource_id: Ulid,
    /// Weekdays this resource never works, independent of shop hours.
    pub days_off: HashSet<Weekday>,
    pub work_window: TimeRange,
    /// Ad-hoc full-day absences (vacation, sick leave).
    pub temp_off_dates: HashSet<NaiveDate>,
}

impl ResourceSchedule {
    /// Fully unavailable on this date, before any per-slot reasoning.
    pub fn is_off_on(&self, date: NaiveDate) -> bool {
        self.days_off.contains(&date.weekday()) || self.temp_off_dates.contains(&date)
    }

    pub fn validate(&self) -> Result<(), ScheduleError> {
        if !self.work_window.is_well_formed() {
            return Err(ScheduleError::InvertedWorkWindow(self.resource_id));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    Pending,
    Confirmed,
    Cancelled,
    Completed,
}

impl BookingStatus {
    /// Only pending and confirmed bookings consume capacity. Cancelled
    /// never blocks a slot; completed cannot overlap a future date.
    pub fn occupies(self) -> bool {
        matches!(self, BookingStatus::Pending | BookingStatus::Confirmed)
    }
}

/// A committed reservation, read from the external booking ledger.
/// The engine never mutates these.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Booking {
    pub id: Ulid,
    pub shop_id: Ulid,
    /// `None` means unassigned: the booking consumes shop-wide capacity.
    pub resource_id: Option<Ulid>,
    /// Local-time start; the date is already the shop's calendar day.
    pub start: NaiveDateTime,
    pub duration_min: Min,
    pub status: BookingStatus,
}

impl Booking {
    pub fn occupies(&self) -> bool {
        self.status.occupies()
    }

    pub fn date(&self) -> NaiveDate {
        self.start.date()
    }

    /// Start time as minute-of-day.
    pub fn start_min(&self) -> Min {
        (self.start.time().hour() * 60 + self.start.time().minute()) as Min
    }
}

/// A candidate appointment start time with its availability verdict.
/// Ephemeral engine output — never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Slot {
    #[serde(with = "hhmm")]
    pub time: Min,
    pub available: bool,
    /// Resources free for this slot. Populated by resource-aware
    /// resolution; non-empty iff `available` in that mode.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub free_resources: Vec<Ulid>,
}

impl Slot {
    pub fn unavailable(time: Min) -> Self {
        Self {
            time,
            available: false,
            free_resources: Vec::new(),
        }
    }
}

/// Save-time validation failures for calendars and schedules. These are
/// write-path errors; the read-path engine never raises them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScheduleError {
    InvertedWindow(Weekday),
    InvertedBreak,
    BreakWith24h,
    InvertedWorkWindow(Ulid),
}

impl std::fmt::Display for ScheduleError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScheduleError::InvertedWindow(day) => {
                write!(f, "day window for {day} is inverted or out of range")
            }
            ScheduleError::InvertedBreak => write!(f, "break window is inverted or out of range"),
            ScheduleError::BreakWith24h => {
                write!(f, "break window is meaningless for a 24-hour calendar")
            }
            ScheduleError::InvertedWorkWindow(id) => {
                write!(f, "work window for resource {id} is inverted or out of range")
            }
        }
    }
}

impl std::error::Error for ScheduleError {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::parse_hhmm;

    fn window(open: &str, close: &str) -> DayWindow {
        DayWindow {
            open: parse_hhmm(open).unwrap(),
            close: parse_hhmm(close).unwrap(),
        }
    }

    fn weekdays_only(open: &str, close: &str) -> OperatingCalendar {
        let w = Some(window(open, close));
        OperatingCalendar {
            week: WeekSchedule {
                monday: w,
                tuesday: w,
                wednesday: w,
                thursday: w,
                friday: w,
                saturday: None,
                sunday: None,
            },
            is_24h: false,
            break_window: None,
        }
    }

    #[test]
    fn window_lookup_and_closed_days() {
        let cal = weekdays_only("10:00", "22:00");
        assert_eq!(cal.window_for(Weekday::Mon), Some(TimeRange::new(600, 1320)));
        assert_eq!(cal.window_for(Weekday::Sat), None);
        assert!(cal.is_open_on(Weekday::Fri));
        assert!(!cal.is_open_on(Weekday::Sun));
    }

    #[test]
    fn twenty_four_hours_overrides_days() {
        let mut cal = weekdays_only("10:00", "22:00");
        cal.is_24h = true;
        assert_eq!(
            cal.window_for(Weekday::Sun),
            Some(TimeRange { start: 0, end: DAY_MIN })
        );
        assert!(cal.is_open_at(Weekday::Sun, 0));
        assert!(cal.is_open_at(Weekday::Sun, 1439));
    }

    #[test]
    fn open_at_respects_break() {
        let mut cal = weekdays_only("10:00", "22:00");
        cal.break_window = Some(TimeRange::new(840, 900)); // 14:00-15:00
        assert!(cal.is_open_at(Weekday::Mon, 600));
        assert!(!cal.is_open_at(Weekday::Mon, 840));
        assert!(!cal.is_open_at(Weekday::Mon, 899));
        assert!(cal.is_open_at(Weekday::Mon, 900)); // break end excluded
        assert!(!cal.is_open_at(Weekday::Mon, 1320)); // close excluded
        assert!(!cal.is_open_at(Weekday::Sat, 720)); // closed day
    }

    #[test]
    fn validate_rejects_bad_calendars() {
        let mut cal = weekdays_only("10:00", "22:00");
        assert_eq!(cal.validate(), Ok(()));

        cal.week.tuesday = Some(DayWindow { open: 1320, close: 120 }); // overnight
        assert_eq!(cal.validate(), Err(ScheduleError::InvertedWindow(Weekday::Tue)));

        let mut cal = weekdays_only("10:00", "22:00");
        cal.break_window = Some(TimeRange { start: 900, end: 840 });
        assert_eq!(cal.validate(), Err(ScheduleError::InvertedBreak));

        let mut cal = weekdays_only("10:00", "22:00");
        cal.is_24h = true;
        cal.break_window = Some(TimeRange::new(840, 900));
        assert_eq!(cal.validate(), Err(ScheduleError::BreakWith24h));
    }

    #[test]
    fn schedule_off_days() {
        let schedule = ResourceSchedule {
            resource_id: Ulid::new(),
            days_off: [Weekday::Mon].into_iter().collect(),
            work_window: TimeRange::new(600, 1080),
            temp_off_dates: [NaiveDate::from_ymd_opt(2024, 1, 16).unwrap()]
                .into_iter()
                .collect(),
        };
        // 2024-01-15 is a Monday
        assert!(schedule.is_off_on(NaiveDate::from_ymd_opt(2024, 1, 15).unwrap()));
        assert!(schedule.is_off_on(NaiveDate::from_ymd_opt(2024, 1, 16).unwrap()));
        assert!(!schedule.is_off_on(NaiveDate::from_ymd_opt(2024, 1, 17).unwrap()));
        assert_eq!(schedule.validate(), Ok(()));

        let inverted = ResourceSchedule {
            work_window: TimeRange { start: 1080, end: 600 },
            ..schedule
        };
        assert!(matches!(
            inverted.validate(),
            Err(ScheduleError::InvertedWorkWindow(_))
        ));
    }

    #[test]
    fn booking_occupancy() {
        let mk = |status| Booking {
            id: Ulid::new(),
            shop_id: Ulid::new(),
            resource_id: None,
            start: NaiveDate::from_ymd_opt(2024, 1, 15)
                .unwrap()
                .and_hms_opt(12, 30, 0)
                .unwrap(),
            duration_min: 60,
            status,
        };
        assert!(mk(BookingStatus::Pending).occupies());
        assert!(mk(BookingStatus::Confirmed).occupies());
        assert!(!mk(BookingStatus::Cancelled).occupies());
        assert!(!mk(BookingStatus::Completed).occupies());
        assert_eq!(mk(BookingStatus::Pending).start_min(), 750);
    }

    #[test]
    fn calendar_json_shape() {
        // The wire shape the platform stores: seven day keys, is_24h, break_time.
        let json = r#"{
            "monday": {"open": "10:00", "close": "22:00"},
            "tuesday": {"open": "10:00", "close": "22:00"},
            "wednesday": null,
            "thursday": {"open": "10:00", "close": "22:00"},
            "friday": {"open": "10:00", "close": "22:00"},
            "saturday": null,
            "sunday": null,
            "is_24h": false,
            "break_time": {"start": "14:00", "end": "15:00"}
        }"#;
        let cal: OperatingCalendar = serde_json::from_str(json).unwrap();
        assert!(cal.is_open_on(Weekday::Mon));
        assert!(!cal.is_open_on(Weekday::Wed));
        assert_eq!(cal.break_window, Some(TimeRange::new(840, 900)));

        let round: OperatingCalendar =
            serde_json::from_str(&serde_json::to_string(&cal).unwrap()).unwrap();
        assert_eq!(round, cal);
    }

    #[test]
    fn slot_serialization_skips_empty_resources() {
        let slot = Slot {
            time: 600,
            available: true,
            free_resources: Vec::new(),
        };
        assert_eq!(
            serde_json::to_string(&slot).unwrap(),
            r#"{"time":"10:00","available":true}"#
        );
    }
}
