//! Time source for the circulation engine

use std::sync::{Arc, Mutex};

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};

/// Source of "now". Loan dates are compared on the UTC calendar date of this instant.
#[cfg_attr(test, mockall::automock)]
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock that only moves when told to. Clones share the same instant.
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: Arc<Mutex<DateTime<Utc>>>,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Arc::new(Mutex::new(start)),
        }
    }

    /// Clock set to midnight UTC of the given date
    pub fn at_date(date: NaiveDate) -> Self {
        Self::new(date.and_time(NaiveTime::MIN).and_utc())
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap_or_else(|e| e.into_inner());
        *now += by;
    }

    pub fn advance_days(&self, days: i64) {
        self.advance(Duration::days(days));
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// Calendar date of an instant, the resolution all loan arithmetic runs at
pub fn day_of(instant: DateTime<Utc>) -> NaiveDate {
    instant.date_naive()
}

/// Whole calendar days from `from` to `to`, negative when `to` is earlier
pub fn days_between(from: NaiveDate, to: NaiveDate) -> i64 {
    (to - from).num_days()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_manual_clock_shared_between_clones() {
        let clock = ManualClock::new(Utc.with_ymd_and_hms(2024, 3, 1, 10, 0, 0).unwrap());
        let other = clock.clone();
        clock.advance_days(2);
        assert_eq!(other.now(), Utc.with_ymd_and_hms(2024, 3, 3, 10, 0, 0).unwrap());
    }

    #[test]
    fn test_days_between_ignores_time_of_day() {
        let late = Utc.with_ymd_and_hms(2024, 3, 1, 23, 59, 0).unwrap();
        let early = Utc.with_ymd_and_hms(2024, 3, 2, 0, 1, 0).unwrap();
        assert_eq!(days_between(day_of(late), day_of(early)), 1);
        assert_eq!(days_between(day_of(early), day_of(late)), -1);
    }
}
