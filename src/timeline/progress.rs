use std::sync::Arc;

use chrono::{Local, NaiveDate, NaiveDateTime, NaiveTime};
use parking_lot::Mutex;

use crate::domain::EndDate;

/// Source of "now". Everything below the CLI takes the instant as a parameter;
/// the clock only lives at the edges.
pub trait Clock: Send + Sync {
    fn now(&self) -> NaiveDateTime;

    fn today(&self) -> NaiveDate {
        self.now().date()
    }
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

/// A clock that reads a shared, settable instant.
#[derive(Clone)]
pub struct FixedClock {
    now: Arc<Mutex<NaiveDateTime>>,
}

impl FixedClock {
    pub fn new(now: NaiveDateTime) -> Self {
        Self {
            now: Arc::new(Mutex::new(now)),
        }
    }

    pub fn set(&self, now: NaiveDateTime) {
        *self.now.lock() = now;
    }
}

impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        *self.now.lock()
    }
}

pub fn midnight(date: NaiveDate) -> NaiveDateTime {
    date.and_time(NaiveTime::MIN)
}

/// Inclusive at both ends; an open end counts as today.
pub fn is_currently_active(start: NaiveDate, end: EndDate, today: NaiveDate) -> bool {
    start <= today && today <= end.resolve(today)
}

pub fn is_ongoing(end: EndDate) -> bool {
    matches!(end, EndDate::Open)
}

/// Fraction of `[start, end]` elapsed at `now`, clamped to `[0, 1]`.
/// A zero-width or inverted interval reports no progress.
pub fn get_progress(start: NaiveDate, end: NaiveDate, now: NaiveDateTime) -> f64 {
    if end <= start {
        return 0.0;
    }

    let total = (midnight(end) - midnight(start)).num_milliseconds() as f64;
    let elapsed = (now - midnight(start)).num_milliseconds() as f64;
    (elapsed / total).clamp(0.0, 1.0)
}

pub fn days_until(date: NaiveDate, today: NaiveDate) -> i64 {
    (date - today).num_days().max(0)
}

pub fn days_since(date: NaiveDate, today: NaiveDate) -> i64 {
    (today - date).num_days().max(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn at(y: i32, m: u32, d: u32, h: u32) -> NaiveDateTime {
        date(y, m, d).and_hms_opt(h, 0, 0).unwrap()
    }

    #[test]
    fn test_active_is_inclusive_at_both_ends() {
        let start = date(2024, 1, 1);
        let end = EndDate::Fixed(date(2024, 1, 31));

        assert!(is_currently_active(start, end, date(2024, 1, 1)));
        assert!(is_currently_active(start, end, date(2024, 1, 31)));
        assert!(is_currently_active(start, end, date(2024, 1, 15)));
        assert!(!is_currently_active(start, end, date(2023, 12, 31)));
        assert!(!is_currently_active(start, end, date(2024, 2, 1)));
    }

    #[test]
    fn test_open_end_is_active_from_start() {
        let start = date(2024, 1, 1);
        assert!(is_currently_active(start, EndDate::Open, date(2030, 5, 5)));
        assert!(!is_currently_active(start, EndDate::Open, date(2023, 5, 5)));
        assert!(is_ongoing(EndDate::Open));
        assert!(!is_ongoing(EndDate::Fixed(start)));
    }

    #[test]
    fn test_progress_clamps_and_grows() {
        let start = date(2024, 1, 1);
        let end = date(2024, 1, 11);

        assert_eq!(get_progress(start, end, at(2023, 12, 1, 0)), 0.0);
        assert_eq!(get_progress(start, end, at(2024, 1, 1, 0)), 0.0);
        assert_eq!(get_progress(start, end, at(2024, 1, 11, 0)), 1.0);
        assert_eq!(get_progress(start, end, at(2025, 1, 1, 0)), 1.0);

        let quarter = get_progress(start, end, at(2024, 1, 3, 12));
        let half = get_progress(start, end, at(2024, 1, 6, 0));
        assert!((quarter - 0.25).abs() < 1e-9);
        assert!((half - 0.5).abs() < 1e-9);
        assert!(quarter < half);
    }

    #[test]
    fn test_progress_zero_width_is_zero_not_nan() {
        let day = date(2024, 1, 1);
        let value = get_progress(day, day, at(2024, 6, 1, 0));
        assert_eq!(value, 0.0);
        assert_eq!(get_progress(date(2024, 2, 1), day, at(2024, 6, 1, 0)), 0.0);
    }

    #[test]
    fn test_days_until_and_since() {
        let today = date(2024, 3, 1);
        assert_eq!(days_until(date(2024, 3, 11), today), 10);
        assert_eq!(days_until(date(2024, 2, 1), today), 0);
        assert_eq!(days_since(date(2024, 2, 1), today), 29);
        assert_eq!(days_since(date(2024, 4, 1), today), 0);
    }

    #[test]
    fn test_fixed_clock_is_settable() {
        let clock = FixedClock::new(at(2024, 1, 1, 8));
        assert_eq!(clock.today(), date(2024, 1, 1));
        clock.set(at(2024, 1, 2, 8));
        assert_eq!(clock.today(), date(2024, 1, 2));
    }
}
