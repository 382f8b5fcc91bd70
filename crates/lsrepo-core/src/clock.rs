//! Source of "now" for year inference and modification-time thresholds.

use chrono::{Local, NaiveDateTime};

/// Supplies the current wall-clock time.
///
/// Repositories take a clock at construction so that listings parsed
/// near a year boundary can be tested deterministically.
pub trait Clock {
    /// Current local time without a zone.
    fn now(&self) -> NaiveDateTime;
}

/// The real local clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

/// A clock frozen at a fixed instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock(pub NaiveDateTime);

impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        self.0
    }
}
