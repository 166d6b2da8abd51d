//! Wall-clock source for the operational-hours gate.

use chrono::{DateTime, FixedOffset, Local, NaiveDate, TimeZone, Utc};
use std::fmt;
use std::sync::{Mutex, PoisonError};

/// Source of the current local time.
pub trait Clock: Send + Sync + fmt::Debug {
    /// Current time in the local zone (the offset carries the zone).
    fn now(&self) -> DateTime<FixedOffset>;

    fn now_utc(&self) -> DateTime<Utc> {
        self.now().with_timezone(&Utc)
    }
}

/// The host's local clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<FixedOffset> {
        Local::now().fixed_offset()
    }
}

/// Settable clock for simulations and tests. Uses a UTC offset of zero.
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<DateTime<FixedOffset>>,
}

impl ManualClock {
    /// Clock fixed at `hour:minute` on an arbitrary day.
    pub fn at(hour: u32, minute: u32) -> Self {
        Self {
            now: Mutex::new(Self::instant(hour, minute, 0)),
        }
    }

    /// Move the clock to `hour:minute:second` on the same arbitrary day.
    pub fn set(&self, hour: u32, minute: u32, second: u32) {
        *self.now.lock().unwrap_or_else(PoisonError::into_inner) =
            Self::instant(hour, minute, second);
    }

    fn instant(hour: u32, minute: u32, second: u32) -> DateTime<FixedOffset> {
        let naive = NaiveDate::from_ymd_opt(2025, 1, 15)
            .and_then(|d| d.and_hms_opt(hour, minute, second))
            .unwrap_or_default();
        Utc.from_utc_datetime(&naive).fixed_offset()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<FixedOffset> {
        *self.now.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
