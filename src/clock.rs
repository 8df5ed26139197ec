//! Wall-clock capability
//!
//! Every generator reads time through [`Clock`] so handlers can be driven by a
//! frozen instant in tests instead of the system clock.

use chrono::{DateTime, Datelike, SecondsFormat, Timelike, Utc, Weekday};

/// Source of the current UTC time.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Reads the operating system clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Always returns the same instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl FixedClock {
    pub fn from_millis(ms: i64) -> Option<Self> {
        DateTime::<Utc>::from_timestamp_millis(ms).map(Self)
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// Calendar facts the synthesizer derives from a single clock reading.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Reading {
    pub now_ms: i64,
    pub hour: u32,
    pub weekday: Weekday,
}

impl Reading {
    pub fn new(at: DateTime<Utc>) -> Self {
        Self {
            now_ms: at.timestamp_millis(),
            hour: at.hour(),
            weekday: at.weekday(),
        }
    }

    /// UTC hours 08:00 through 18:59.
    pub fn is_business_hours(&self) -> bool {
        (8..=18).contains(&self.hour)
    }

    pub fn is_weekend(&self) -> bool {
        matches!(self.weekday, Weekday::Sat | Weekday::Sun)
    }

    pub fn elapsed_secs(&self) -> f64 {
        self.now_ms as f64 / 1000.0
    }
}

/// ISO-8601 with millisecond precision and a `Z` suffix.
pub fn iso_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}
