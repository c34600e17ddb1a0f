//! Simulated time
//!
//! Simulated time is an integer count of minutes since the simulation epoch.
//! Minute 0 is a Monday at 00:00; calendar questions (day of week, minute of
//! day, week number) are answered arithmetically from that anchor. The
//! [`TimeManager`] maps simulated minutes onto a calendar date for reporting.

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::info;

/// Minutes since the simulation epoch
pub type SimMinutes = u64;

/// Minutes per hour
pub const MINUTES_PER_HOUR: SimMinutes = 60;
/// Minutes per day
pub const MINUTES_PER_DAY: SimMinutes = 24 * MINUTES_PER_HOUR;
/// Minutes per week
pub const MINUTES_PER_WEEK: SimMinutes = 7 * MINUTES_PER_DAY;

/// Day of the week, Monday first
pub fn day_of_week(t: SimMinutes) -> u64 {
    (t / MINUTES_PER_DAY) % 7
}

/// Minute within the day, 0..1440
pub fn minute_of_day(t: SimMinutes) -> u64 {
    t % MINUTES_PER_DAY
}

/// Week number since the epoch
pub fn week_number(t: SimMinutes) -> u64 {
    t / MINUTES_PER_WEEK
}

/// Start of the day containing `t`
pub fn start_of_day(t: SimMinutes) -> SimMinutes {
    t - minute_of_day(t)
}

/// Half-open interval `[start, end)` of simulated time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TimeWindow {
    /// First minute inside the window
    pub start: SimMinutes,
    /// First minute after the window
    pub end: SimMinutes,
}

impl TimeWindow {
    /// Create a window; an inverted range is treated as empty
    pub fn new(start: SimMinutes, end: SimMinutes) -> Self {
        Self {
            start,
            end: end.max(start),
        }
    }

    /// The `index`-th window of length `length` counted from the epoch
    pub fn nth(index: u64, length: SimMinutes) -> Self {
        Self::new(index * length, (index + 1) * length)
    }

    /// Index of the window of length `length` containing `t`
    pub fn index_of(t: SimMinutes, length: SimMinutes) -> u64 {
        t / length.max(1)
    }

    /// Whether `t` falls inside the window
    pub fn contains(&self, t: SimMinutes) -> bool {
        self.start <= t && t < self.end
    }

    /// Whether two windows share at least one minute
    pub fn overlaps(&self, other: &TimeWindow) -> bool {
        self.start < other.end && other.start < self.end
    }

    /// Length in minutes
    pub fn len(&self) -> SimMinutes {
        self.end - self.start
    }

    /// Whether the window contains no minutes
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

impl fmt::Display for TimeWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {})", self.start, self.end)
    }
}

/// Maps simulated minutes to calendar time
#[derive(Debug, Clone)]
pub struct TimeManager {
    epoch: DateTime<Utc>,
}

impl TimeManager {
    /// Anchor minute 0 at midnight UTC of `start_date`
    pub fn new(start_date: NaiveDate) -> Self {
        let epoch = start_date.and_time(NaiveTime::MIN).and_utc();
        info!("Simulation epoch anchored at {}", epoch);
        Self { epoch }
    }

    /// Calendar instant of minute 0
    pub fn epoch(&self) -> DateTime<Utc> {
        self.epoch
    }

    /// Calendar instant of a simulated minute
    pub fn to_datetime(&self, t: SimMinutes) -> DateTime<Utc> {
        self.epoch + Duration::minutes(t as i64)
    }

    /// Simulated minute of a calendar instant, if not before the epoch
    pub fn to_sim_minutes(&self, at: DateTime<Utc>) -> Option<SimMinutes> {
        let minutes = (at - self.epoch).num_minutes();
        u64::try_from(minutes).ok()
    }

    /// Human-readable rendering used in logs and reports
    pub fn format(&self, t: SimMinutes) -> String {
        self.to_datetime(t).format("%Y-%m-%d %H:%M (%a)").to_string()
    }
}
