//! Wall-clock source
//!
//! Streaks and badges depend on "today" in the user's timezone. The engine
//! asks a [`Clock`] instead of calling `Local::now()` so tests can pin time.

use chrono::{DateTime, FixedOffset, Local, NaiveDate, TimeZone, Timelike, Utc};

pub trait Clock: Send + Sync {
    /// Current time in the user's local offset
    fn now(&self) -> DateTime<FixedOffset>;

    /// Current calendar day in the user's timezone
    fn today(&self) -> NaiveDate {
        self.now().date_naive()
    }

    fn now_utc(&self) -> DateTime<Utc> {
        self.now().with_timezone(&Utc)
    }

    /// Local hour (0-23) of a stored UTC timestamp
    fn local_hour(&self, at: DateTime<Utc>) -> u32 {
        at.with_timezone(&self.now().timezone()).hour()
    }
}

/// Clock backed by the system's local time
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<FixedOffset> {
        Local::now().fixed_offset()
    }
}

/// Clock pinned to one instant
#[derive(Debug, Clone, Copy)]
pub struct FixedClock {
    now: DateTime<FixedOffset>,
}

impl FixedClock {
    pub fn new(now: DateTime<FixedOffset>) -> Self {
        Self { now }
    }

    /// `date` at `hour:minute` UTC. Returns `None` for an invalid time.
    pub fn at(date: NaiveDate, hour: u32, minute: u32) -> Option<Self> {
        let naive = date.and_hms_opt(hour, minute, 0)?;
        Some(Self::new(Utc.from_utc_datetime(&naive).fixed_offset()))
    }

    /// Noon UTC on `date`
    pub fn on(date: NaiveDate) -> Self {
        let naive = date.and_time(chrono::NaiveTime::MIN) + chrono::Duration::hours(12);
        Self::new(Utc.from_utc_datetime(&naive).fixed_offset())
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<FixedOffset> {
        self.now
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_clock_today() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 3).unwrap();
        let clock = FixedClock::on(date);
        assert_eq!(clock.today(), date);
        assert_eq!(clock.now().hour(), 12);
    }

    #[test]
    fn test_local_hour_uses_clock_offset() {
        let offset = FixedOffset::east_opt(2 * 3600).unwrap();
        let now = offset.with_ymd_and_hms(2024, 1, 3, 10, 0, 0).unwrap();
        let clock = FixedClock::new(now);

        let stored = Utc.with_ymd_and_hms(2024, 1, 3, 6, 30, 0).unwrap();
        assert_eq!(clock.local_hour(stored), 8);
    }
}
