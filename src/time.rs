use serde::{Deserialize, Serialize};

/// Minutes since midnight — the only time-of-day type.
pub type Min = i32;

/// Minutes in one calendar day. `DAY_MIN` itself is a valid closing time
/// ("24:00"), never a valid opening time.
pub const DAY_MIN: Min = 24 * 60;

/// Parse a strict `"HH:MM"` string into minute-of-day. Rejects anything
/// that isn't exactly two digits, a colon, two digits, in 00:00..=23:59.
pub fn parse_hhmm(s: &str) -> Option<Min> {
    let (h, m) = s.split_once(':')?;
    if h.len() != 2 || m.len() != 2 {
        return None;
    }
    if !h.bytes().all(|b| b.is_ascii_digit()) || !m.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let h: Min = h.parse().ok()?;
    let m: Min = m.parse().ok()?;
    if h > 23 || m > 59 {
        return None;
    }
    Some(h * 60 + m)
}

/// Format minute-of-day as `"HH:MM"`. Total over `[0, 1440]`; 1440 renders
/// as `"24:00"` (a closing time).
pub fn format_hhmm(t: Min) -> String {
    format!("{:02}:{:02}", t / 60, t % 60)
}

/// True iff `[start_a, start_a + dur_a)` intersects `[start_b, start_b + dur_b)`.
/// Half-open: a service ending exactly when another starts does not overlap.
pub fn overlaps(start_a: Min, dur_a: Min, start_b: Min, dur_b: Min) -> bool {
    start_a < start_b + dur_b && start_a + dur_a > start_b
}

/// Human-readable duration, e.g. `"1h 30m"`.
pub fn format_duration(minutes: Min) -> String {
    let h = minutes / 60;
    let m = minutes % 60;
    if h == 0 {
        format!("{m}m")
    } else if m == 0 {
        format!("{h}h")
    } else {
        format!("{h}h {m}m")
    }
}

/// Display form of a slot's span, e.g. `"14:00 - 15:30"`.
pub fn time_range_display(start: Min, duration_min: Min) -> String {
    format!("{} - {}", format_hhmm(start), format_hhmm(start + duration_min))
}

/// Half-open minute-of-day range `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeRange {
    #[serde(with = "hhmm")]
    pub start: Min,
    #[serde(with = "hhmm")]
    pub end: Min,
}

impl TimeRange {
    pub fn new(start: Min, end: Min) -> Self {
        debug_assert!(start < end, "TimeRange start must be before end");
        Self { start, end }
    }

    pub fn duration_min(&self) -> Min {
        self.end - self.start
    }

    /// A range the engine is willing to compute with: within the day and
    /// not inverted. Malformed ranges degrade to "nothing available"
    /// upstream instead of panicking mid-query.
    pub fn is_well_formed(&self) -> bool {
        self.start >= 0 && self.start < self.end && self.end <= DAY_MIN
    }

    pub fn overlaps(&self, other: &TimeRange) -> bool {
        self.start < other.end && other.start < self.end
    }

    pub fn contains_instant(&self, t: Min) -> bool {
        self.start <= t && t < self.end
    }

    /// True iff `[start, end)` lies entirely within this range.
    pub fn contains_span(&self, start: Min, end: Min) -> bool {
        self.start <= start && end <= self.end
    }
}

/// Serde adapter: minute-of-day as `"HH:MM"` strings, the shape the
/// surrounding platform stores calendars in.
pub mod hhmm {
    use serde::{de, Deserialize, Deserializer, Serializer};

    use super::{format_hhmm, parse_hhmm, Min};

    pub fn serialize<S: Serializer>(t: &Min, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format_hhmm(*t))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Min, D::Error> {
        let s = String::deserialize(deserializer)?;
        parse_hhmm(&s).ok_or_else(|| de::Error::custom(format!("invalid HH:MM time: {s:?}")))
    }
}
