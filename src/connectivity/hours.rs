//! Operational-hours window.
//!
//! # Design Decisions
//! - Minute resolution, both bounds inclusive: with an end of 21:00,
//!   21:00:59 is inside and 21:01 is outside
//! - A start later than the end wraps midnight (e.g. 22:00-04:00)

use chrono::{NaiveTime, Timelike};
use std::fmt;

use crate::connectivity::ConnectivityError;

/// Daily local-time window in which real mode is permitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OperationalWindow {
    start: NaiveTime,
    end: NaiveTime,
}

impl OperationalWindow {
    pub fn new(start: NaiveTime, end: NaiveTime) -> Self {
        Self {
            start: truncate_to_minute(start),
            end: truncate_to_minute(end),
        }
    }

    /// Parse a window from two "HH:MM" strings.
    pub fn parse(start: &str, end: &str) -> Result<Self, ConnectivityError> {
        Ok(Self::new(parse_time_of_day(start)?, parse_time_of_day(end)?))
    }

    pub fn start(&self) -> NaiveTime {
        self.start
    }

    pub fn end(&self) -> NaiveTime {
        self.end
    }

    /// True iff `time` falls within [start, end].
    pub fn contains(&self, time: NaiveTime) -> bool {
        let t = truncate_to_minute(time);
        if self.start <= self.end {
            self.start <= t && t <= self.end
        } else {
            t >= self.start || t <= self.end
        }
    }
}

impl Default for OperationalWindow {
    fn default() -> Self {
        Self::new(
            NaiveTime::from_hms_opt(5, 0, 0).unwrap_or_default(),
            NaiveTime::from_hms_opt(21, 0, 0).unwrap_or_default(),
        )
    }
}

impl fmt::Display for OperationalWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start.format("%H:%M"), self.end.format("%H:%M"))
    }
}

fn parse_time_of_day(raw: &str) -> Result<NaiveTime, ConnectivityError> {
    NaiveTime::parse_from_str(raw.trim(), "%H:%M")
        .map_err(|_| ConnectivityError::InvalidWindow(raw.to_string()))
}

fn truncate_to_minute(time: NaiveTime) -> NaiveTime {
    time.with_second(0)
        .and_then(|t| t.with_nanosecond(0))
        .unwrap_or(time)
}
