//! Pattern evaluation: does a release pattern fire on a given date?
//!
//! Evaluation is a total function over valid `(pattern, date)` pairs. Every
//! call returns a definite fire / no-fire answer; malformed patterns cannot
//! reach this module because the store rejects them at load time.
//!
//! Relative patterns (`wed_before_nfp`) resolve their anchor within the query
//! date's month. The anchor graph is validated acyclic at load time, so the
//! recursion here terminates.

use std::collections::HashMap;

use chrono::{Datelike, Days, NaiveDate, Weekday};

use super::pattern::ReleasePattern;
use super::schedule_source::{HolidayCalendar, ScheduleSource};

/// Hard cap on anchor-chain recursion. The store guarantees acyclicity, so
/// real chains are short; this only guards hand-built pattern maps in tests.
const MAX_ANCHOR_DEPTH: u8 = 8;

/// Evaluates parsed patterns against calendar dates.
///
/// Borrows the store's pattern map so relative patterns can resolve their
/// anchors, plus the two injected collaborators (explicit schedules and the
/// optional holiday calendar).
pub struct PatternEvaluator<'a> {
    patterns: &'a HashMap<String, ReleasePattern>,
    schedules: &'a dyn ScheduleSource,
    holidays: &'a dyn HolidayCalendar,
}

impl<'a> PatternEvaluator<'a> {
    pub fn new(
        patterns: &'a HashMap<String, ReleasePattern>,
        schedules: &'a dyn ScheduleSource,
        holidays: &'a dyn HolidayCalendar,
    ) -> Self {
        Self {
            patterns,
            schedules,
            holidays,
        }
    }

    /// Whether `pattern` fires on `date`. Returns the exact scheduled date on
    /// a hit (always equal to `date`; relative patterns derive it from their
    /// anchor and then compare).
    pub fn fires_on(&self, pattern: &ReleasePattern, date: NaiveDate) -> Option<NaiveDate> {
        match pattern {
            ReleasePattern::NthWeekday { nth, weekday } => {
                let target = nth_weekday_of_month(date.year(), date.month(), *weekday, *nth)?;
                (target == date).then_some(date)
            }
            ReleasePattern::EveryWeek { weekday } => (date.weekday() == *weekday).then_some(date),
            ReleasePattern::WeekdayBefore { weekday, anchor } => {
                let anchor_date = self.anchor_date(anchor, date.year(), date.month(), 0)?;
                let derived = previous_weekday(anchor_date, *weekday);
                (derived == date).then_some(derived)
            }
            ReleasePattern::WeekOfMonth { week } => {
                (week_of_month(date) == *week).then_some(date)
            }
            ReleasePattern::MidMonth { day } => {
                let target = self.rolled_fixed_day(date.year(), date.month(), *day)?;
                (target == date).then_some(date)
            }
            ReleasePattern::EndOfMonth => {
                let target = self.last_business_day(date.year(), date.month())?;
                (target == date).then_some(date)
            }
            ReleasePattern::Quarterly { day } => {
                if !matches!(date.month(), 1 | 4 | 7 | 10) {
                    return None;
                }
                let target = self.rolled_fixed_day(date.year(), date.month(), *day)?;
                (target == date).then_some(date)
            }
            ReleasePattern::NthBusinessDay { nth } => {
                let target = self.nth_business_day(date.year(), date.month(), *nth)?;
                (target == date).then_some(date)
            }
            ReleasePattern::External { key } => {
                let dates = self.schedules.dates_for(key)?;
                dates.binary_search(&date).is_ok().then_some(date)
            }
        }
    }

    /// The date an indicator resolves to within a month, for anchor lookups.
    ///
    /// Single-firing kinds resolve to their one date; kinds that can fire
    /// several times in a month (weekly, week-window) resolve to their first
    /// firing, which is what "the release" means for anchoring purposes.
    fn anchor_date(&self, id: &str, year: i32, month: u32, depth: u8) -> Option<NaiveDate> {
        if depth >= MAX_ANCHOR_DEPTH {
            return None;
        }
        let pattern = self.patterns.get(id)?;
        match pattern {
            ReleasePattern::NthWeekday { nth, weekday } => {
                nth_weekday_of_month(year, month, *weekday, *nth)
            }
            ReleasePattern::EveryWeek { weekday } => {
                first_weekday_of_month(year, month, *weekday)
            }
            ReleasePattern::WeekdayBefore { weekday, anchor } => {
                let anchor_date = self.anchor_date(anchor, year, month, depth + 1)?;
                Some(previous_weekday(anchor_date, *weekday))
            }
            ReleasePattern::WeekOfMonth { week } => {
                NaiveDate::from_ymd_opt(year, month, u32::from((week - 1) * 7 + 1))
            }
            ReleasePattern::MidMonth { day } => self.rolled_fixed_day(year, month, *day),
            ReleasePattern::EndOfMonth => self.last_business_day(year, month),
            ReleasePattern::Quarterly { day } => {
                matches!(month, 1 | 4 | 7 | 10)
                    .then(|| self.rolled_fixed_day(year, month, *day))
                    .flatten()
            }
            ReleasePattern::NthBusinessDay { nth } => self.nth_business_day(year, month, *nth),
            ReleasePattern::External { key } => {
                let dates = self.schedules.dates_for(key)?;
                dates
                    .into_iter()
                    .find(|d| d.year() == year && d.month() == month)
            }
        }
    }

    fn is_business_day(&self, date: NaiveDate) -> bool {
        !matches!(date.weekday(), Weekday::Sat | Weekday::Sun) && !self.holidays.is_holiday(date)
    }

    /// Fixed day-of-month rolled forward to the next business day. Stays
    /// within a bounded roll (a week is plenty for weekend + holiday runs).
    fn rolled_fixed_day(&self, year: i32, month: u32, day: u8) -> Option<NaiveDate> {
        let mut date = NaiveDate::from_ymd_opt(year, month, u32::from(day))?;
        for _ in 0..7 {
            if self.is_business_day(date) {
                return Some(date);
            }
            date = date.checked_add_days(Days::new(1))?;
        }
        None
    }

    fn last_business_day(&self, year: i32, month: u32) -> Option<NaiveDate> {
        let mut date = last_day_of_month(year, month)?;
        for _ in 0..7 {
            if self.is_business_day(date) {
                return Some(date);
            }
            date = date.checked_sub_days(Days::new(1))?;
        }
        None
    }

    /// 1-indexed business-day counting from the start of the month.
    fn nth_business_day(&self, year: i32, month: u32, nth: u8) -> Option<NaiveDate> {
        let mut date = NaiveDate::from_ymd_opt(year, month, 1)?;
        let mut seen = 0u8;
        while date.month() == month {
            if self.is_business_day(date) {
                seen += 1;
                if seen == nth {
                    return Some(date);
                }
            }
            date = date.checked_add_days(Days::new(1))?;
        }
        None
    }
}

// ============================================================================
// Date helpers
// ============================================================================

/// Nth occurrence of `weekday` in the month; `None` when the month has fewer
/// than `nth` occurrences (no clamping).
pub fn nth_weekday_of_month(
    year: i32,
    month: u32,
    weekday: Weekday,
    nth: u8,
) -> Option<NaiveDate> {
    let first = first_weekday_of_month(year, month, weekday)?;
    let date = first.checked_add_days(Days::new(7 * (u64::from(nth) - 1)))?;
    (date.month() == month).then_some(date)
}

fn first_weekday_of_month(year: i32, month: u32, weekday: Weekday) -> Option<NaiveDate> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let offset =
        (7 + weekday.num_days_from_monday() - first.weekday().num_days_from_monday()) % 7;
    first.checked_add_days(Days::new(u64::from(offset)))
}

/// The last `weekday` strictly before `date`. May land in the prior month.
fn previous_weekday(date: NaiveDate, weekday: Weekday) -> NaiveDate {
    let mut back =
        (7 + date.weekday().num_days_from_monday() - weekday.num_days_from_monday()) % 7;
    if back == 0 {
        back = 7;
    }
    date - chrono::Duration::days(i64::from(back))
}

fn last_day_of_month(year: i32, month: u32) -> Option<NaiveDate> {
    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    NaiveDate::from_ymd_opt(next_year, next_month, 1)?.checked_sub_days(Days::new(1))
}

/// 1-indexed 7-day block. Days 1-7 are week 1; week 4 absorbs days 22 through
/// the end of the month.
fn week_of_month(date: NaiveDate) -> u8 {
    let block = ((date.day() - 1) / 7 + 1) as u8;
    block.min(4)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::schedule_source::{
        FixedHolidays, NoExternalSchedules, NoHolidays, StaticScheduleSource,
    };

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn eval<'a>(patterns: &'a HashMap<String, ReleasePattern>) -> PatternEvaluator<'a> {
        static NO_SCHEDULES: NoExternalSchedules = NoExternalSchedules;
        static NO_HOLIDAYS: NoHolidays = NoHolidays;
        PatternEvaluator::new(patterns, &NO_SCHEDULES, &NO_HOLIDAYS)
    }

    #[test]
    fn first_friday_fires_only_on_first_friday() {
        // May 2026: Fridays on the 1st, 8th, 15th, 22nd, 29th.
        let patterns = HashMap::new();
        let ev = eval(&patterns);
        let p = ReleasePattern::NthWeekday {
            nth: 1,
            weekday: Weekday::Fri,
        };
        assert_eq!(ev.fires_on(&p, date(2026, 5, 1)), Some(date(2026, 5, 1)));
        assert_eq!(ev.fires_on(&p, date(2026, 5, 8)), None);
        assert_eq!(ev.fires_on(&p, date(2026, 5, 4)), None);
    }

    #[test]
    fn fifth_occurrence_never_clamps() {
        // February 2026 has four Sundays; a 5th sunday must not fire.
        let patterns = HashMap::new();
        let ev = eval(&patterns);
        let p = ReleasePattern::NthWeekday {
            nth: 5,
            weekday: Weekday::Sun,
        };
        for day in 1..=28 {
            assert_eq!(ev.fires_on(&p, date(2026, 2, day)), None);
        }
    }

    #[test]
    fn weekly_thursday() {
        let patterns = HashMap::new();
        let ev = eval(&patterns);
        let p = ReleasePattern::EveryWeek {
            weekday: Weekday::Thu,
        };
        assert!(ev.fires_on(&p, date(2026, 8, 6)).is_some());
        assert!(ev.fires_on(&p, date(2026, 8, 13)).is_some());
        assert!(ev.fires_on(&p, date(2026, 8, 7)).is_none());
    }

    #[test]
    fn wednesday_before_first_friday() {
        // August 2026: first Friday is the 7th; the Wednesday before is the 5th.
        let mut patterns = HashMap::new();
        patterns.insert(
            "NFP".to_string(),
            ReleasePattern::NthWeekday {
                nth: 1,
                weekday: Weekday::Fri,
            },
        );
        let ev = eval(&patterns);
        let p = ReleasePattern::WeekdayBefore {
            weekday: Weekday::Wed,
            anchor: "NFP".to_string(),
        };
        assert_eq!(ev.fires_on(&p, date(2026, 8, 5)), Some(date(2026, 8, 5)));
        assert_eq!(ev.fires_on(&p, date(2026, 8, 12)), None);
    }

    #[test]
    fn week_of_month_windows() {
        let patterns = HashMap::new();
        let ev = eval(&patterns);
        let first = ReleasePattern::WeekOfMonth { week: 1 };
        let fourth = ReleasePattern::WeekOfMonth { week: 4 };
        assert!(ev.fires_on(&first, date(2026, 8, 1)).is_some());
        assert!(ev.fires_on(&first, date(2026, 8, 7)).is_some());
        assert!(ev.fires_on(&first, date(2026, 8, 8)).is_none());
        // Week 4 runs to the end of the month.
        assert!(ev.fires_on(&fourth, date(2026, 8, 22)).is_some());
        assert!(ev.fires_on(&fourth, date(2026, 8, 31)).is_some());
        assert!(ev.fires_on(&fourth, date(2026, 8, 21)).is_none());
    }

    #[test]
    fn mid_month_rolls_over_weekend() {
        // 2026-08-15 is a Saturday; the release rolls to Monday the 17th.
        let patterns = HashMap::new();
        let ev = eval(&patterns);
        let p = ReleasePattern::MidMonth { day: 15 };
        assert_eq!(ev.fires_on(&p, date(2026, 8, 15)), None);
        assert_eq!(ev.fires_on(&p, date(2026, 8, 17)), Some(date(2026, 8, 17)));
    }

    #[test]
    fn mid_month_rolls_past_holidays() {
        let patterns = HashMap::new();
        let holidays = FixedHolidays::from_dates([date(2026, 8, 17)]);
        static NO_SCHEDULES: NoExternalSchedules = NoExternalSchedules;
        let ev = PatternEvaluator::new(&patterns, &NO_SCHEDULES, &holidays);
        let p = ReleasePattern::MidMonth { day: 15 };
        // Saturday 15th -> Monday 17th is a holiday -> Tuesday 18th.
        assert_eq!(ev.fires_on(&p, date(2026, 8, 18)), Some(date(2026, 8, 18)));
        assert_eq!(ev.fires_on(&p, date(2026, 8, 17)), None);
    }

    #[test]
    fn end_of_month_is_last_business_day() {
        // 2026-05-31 is a Sunday; last business day is Friday the 29th.
        let patterns = HashMap::new();
        let ev = eval(&patterns);
        let p = ReleasePattern::EndOfMonth;
        assert_eq!(ev.fires_on(&p, date(2026, 5, 29)), Some(date(2026, 5, 29)));
        assert_eq!(ev.fires_on(&p, date(2026, 5, 31)), None);
    }

    #[test]
    fn quarterly_fires_only_in_quarter_months() {
        let patterns = HashMap::new();
        let ev = eval(&patterns);
        let p = ReleasePattern::Quarterly { day: 25 };
        // 2026-08-25 is not in a quarter's first month.
        assert_eq!(ev.fires_on(&p, date(2026, 8, 25)), None);
        // 2026-07-25 is a Saturday -> rolls to Monday the 27th.
        assert_eq!(ev.fires_on(&p, date(2026, 7, 27)), Some(date(2026, 7, 27)));
    }

    #[test]
    fn nth_business_day_counting() {
        // August 2026 starts on a Saturday: business days are Mon 3rd (1st),
        // Tue 4th (2nd), Wed 5th (3rd).
        let patterns = HashMap::new();
        let ev = eval(&patterns);
        let p = ReleasePattern::NthBusinessDay { nth: 3 };
        assert_eq!(ev.fires_on(&p, date(2026, 8, 5)), Some(date(2026, 8, 5)));
        assert_eq!(ev.fires_on(&p, date(2026, 8, 3)), None);
    }

    #[test]
    fn nth_business_day_skips_holidays() {
        let patterns = HashMap::new();
        let holidays = FixedHolidays::from_dates([date(2026, 8, 3)]);
        static NO_SCHEDULES: NoExternalSchedules = NoExternalSchedules;
        let ev = PatternEvaluator::new(&patterns, &NO_SCHEDULES, &holidays);
        let p = ReleasePattern::NthBusinessDay { nth: 1 };
        assert_eq!(ev.fires_on(&p, date(2026, 8, 4)), Some(date(2026, 8, 4)));
    }

    #[test]
    fn external_schedule_lookup() {
        let patterns = HashMap::new();
        let mut schedules = StaticScheduleSource::new();
        schedules.insert("fomc", [date(2026, 9, 16)]);
        static NO_HOLIDAYS: NoHolidays = NoHolidays;
        let ev = PatternEvaluator::new(&patterns, &schedules, &NO_HOLIDAYS);
        let p = ReleasePattern::External {
            key: "fomc".to_string(),
        };
        assert_eq!(ev.fires_on(&p, date(2026, 9, 16)), Some(date(2026, 9, 16)));
        assert_eq!(ev.fires_on(&p, date(2026, 9, 17)), None);
    }

    #[test]
    fn anchor_chain_terminates_on_hand_built_cycle() {
        // The store rejects cycles at load; a hand-built cyclic map must
        // still terminate (as a no-fire), not hang.
        let mut patterns = HashMap::new();
        patterns.insert(
            "A".to_string(),
            ReleasePattern::WeekdayBefore {
                weekday: Weekday::Wed,
                anchor: "B".to_string(),
            },
        );
        patterns.insert(
            "B".to_string(),
            ReleasePattern::WeekdayBefore {
                weekday: Weekday::Tue,
                anchor: "A".to_string(),
            },
        );
        let ev = eval(&patterns);
        let p = patterns.get("A").unwrap();
        assert_eq!(ev.fires_on(p, date(2026, 8, 5)), None);
    }
}
