//! Injected collaborators for the schedule resolver.
//!
//! Two capabilities are supplied from outside the pattern language:
//!
//! - [`ScheduleSource`]: explicit date lists for `*_schedule` patterns. The
//!   FOMC meeting calendar is announced by the Fed, not computed by a rule,
//!   so it arrives as data.
//! - [`HolidayCalendar`]: marks non-business days beyond weekends. Optional;
//!   the default treats every Monday-Friday as a business day.

use std::collections::{HashMap, HashSet};

use chrono::NaiveDate;

/// Provider of externally announced release dates, keyed by schedule name
/// (the `fomc` in `fomc_schedule`).
///
/// `None` means the key is unknown to this provider, which the calendar
/// store treats as a load-time configuration error. `Some(vec![])` is a
/// valid, empty schedule.
pub trait ScheduleSource: Send + Sync {
    /// Ordered (ascending) dates for the named schedule.
    fn dates_for(&self, key: &str) -> Option<Vec<NaiveDate>>;
}

/// A provider that knows no schedules. Calendars without `*_schedule`
/// patterns load fine against it.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoExternalSchedules;

impl ScheduleSource for NoExternalSchedules {
    fn dates_for(&self, _key: &str) -> Option<Vec<NaiveDate>> {
        None
    }
}

/// In-memory schedule provider backed by a map of sorted date lists.
#[derive(Debug, Clone, Default)]
pub struct StaticScheduleSource {
    schedules: HashMap<String, Vec<NaiveDate>>,
}

impl StaticScheduleSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a schedule. Dates are sorted on insert.
    pub fn insert<I>(&mut self, key: &str, dates: I)
    where
        I: IntoIterator<Item = NaiveDate>,
    {
        let mut dates: Vec<NaiveDate> = dates.into_iter().collect();
        dates.sort_unstable();
        self.schedules.insert(key.to_string(), dates);
    }

    /// Provider pre-loaded with the announced FOMC statement days for
    /// 2025-2026 under the key `fomc`.
    pub fn with_fomc_meetings() -> Self {
        let mut source = Self::new();
        source.insert("fomc", fomc_statement_days());
        source
    }
}

impl ScheduleSource for StaticScheduleSource {
    fn dates_for(&self, key: &str) -> Option<Vec<NaiveDate>> {
        self.schedules.get(key).cloned()
    }
}

/// Announced FOMC meeting statement days (second day of each two-day
/// meeting), 2025-2026.
fn fomc_statement_days() -> Vec<NaiveDate> {
    const DAYS: &[(i32, u32, u32)] = &[
        (2025, 1, 29),
        (2025, 3, 19),
        (2025, 5, 7),
        (2025, 6, 18),
        (2025, 7, 30),
        (2025, 9, 17),
        (2025, 10, 29),
        (2025, 12, 10),
        (2026, 1, 28),
        (2026, 3, 18),
        (2026, 4, 29),
        (2026, 6, 17),
        (2026, 7, 29),
        (2026, 9, 16),
        (2026, 10, 28),
        (2026, 12, 9),
    ];
    DAYS.iter()
        .filter_map(|&(y, m, d)| NaiveDate::from_ymd_opt(y, m, d))
        .collect()
}

/// Marks public holidays for business-day counting. Weekends are always
/// excluded by the evaluator itself; this trait only adds holidays on top.
pub trait HolidayCalendar: Send + Sync {
    fn is_holiday(&self, date: NaiveDate) -> bool;
}

/// Weekday-only business-day counting: no holidays at all. This is the
/// documented fallback when no holiday provider is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoHolidays;

impl HolidayCalendar for NoHolidays {
    fn is_holiday(&self, _date: NaiveDate) -> bool {
        false
    }
}

/// Holiday provider backed by an explicit date set.
#[derive(Debug, Clone, Default)]
pub struct FixedHolidays {
    dates: HashSet<NaiveDate>,
}

impl FixedHolidays {
    pub fn from_dates<I>(dates: I) -> Self
    where
        I: IntoIterator<Item = NaiveDate>,
    {
        Self {
            dates: dates.into_iter().collect(),
        }
    }
}

impl HolidayCalendar for FixedHolidays {
    fn is_holiday(&self, date: NaiveDate) -> bool {
        self.dates.contains(&date)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn static_source_sorts_dates() {
        let mut source = StaticScheduleSource::new();
        let a = NaiveDate::from_ymd_opt(2026, 3, 18).unwrap();
        let b = NaiveDate::from_ymd_opt(2026, 1, 28).unwrap();
        source.insert("fomc", [a, b]);
        assert_eq!(source.dates_for("fomc"), Some(vec![b, a]));
    }

    #[test]
    fn unknown_key_is_none_not_empty() {
        let source = StaticScheduleSource::new();
        assert_eq!(source.dates_for("fomc"), None);
    }

    #[test]
    fn bundled_fomc_days_are_valid_dates() {
        let source = StaticScheduleSource::with_fomc_meetings();
        let dates = source.dates_for("fomc").unwrap();
        assert_eq!(dates.len(), 16);
        assert!(dates.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn fixed_holidays_membership() {
        let july4 = NaiveDate::from_ymd_opt(2026, 7, 3).unwrap();
        let holidays = FixedHolidays::from_dates([july4]);
        assert!(holidays.is_holiday(july4));
        assert!(!holidays.is_holiday(july4.succ_opt().unwrap()));
    }
}
