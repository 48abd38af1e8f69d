//! Release-pattern expressions.
//!
//! A `release_pattern` string in the calendar file is parsed exactly once, at
//! load time, into a [`ReleasePattern`] variant. Evaluation ([`super::evaluator`])
//! then works over this closed type and never dispatches on strings.
//!
//! Recognized forms (case-insensitive):
//!
//! | Form                  | Example              | Variant             |
//! |-----------------------|----------------------|---------------------|
//! | Nth weekday of month  | `1st friday`         | `NthWeekday`        |
//! | Weekly weekday        | `thursday`           | `EveryWeek`         |
//! | Weekday before anchor | `wed_before_nfp`     | `WeekdayBefore`     |
//! | Week-of-month window  | `1st week`           | `WeekOfMonth`       |
//! | Mid-month             | `mid_month[:17]`     | `MidMonth`          |
//! | End of month          | `end_of_month`       | `EndOfMonth`        |
//! | Quarterly             | `quarterly[:25]`     | `Quarterly`         |
//! | Nth business day      | `3rd_business_day`   | `NthBusinessDay`    |
//! | External schedule     | `fomc_schedule`      | `External`          |
//!
//! Anything else is a load-time configuration error.

use chrono::Weekday;
use thiserror::Error;

/// Parsed release pattern. One variant per recognized pattern kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReleasePattern {
    /// Fires on the Nth occurrence of `weekday` within the month. If the
    /// month has fewer than N occurrences, the pattern does not fire that
    /// month (no clamping).
    NthWeekday { nth: u8, weekday: Weekday },
    /// Fires on every occurrence of `weekday`.
    EveryWeek { weekday: Weekday },
    /// Fires on the `weekday` immediately preceding the resolved date of the
    /// `anchor` indicator in the query month.
    WeekdayBefore { weekday: Weekday, anchor: String },
    /// Fires on any day within the Nth 7-day block of the month. Weeks are
    /// 1-indexed: days 1-7, 8-14, 15-21; week 4 runs from day 22 to month end.
    WeekOfMonth { week: u8 },
    /// Fires once, on `day` (rolled forward to the next business day when it
    /// lands on a weekend or holiday).
    MidMonth { day: u8 },
    /// Fires on the last business day of the month.
    EndOfMonth,
    /// Fires once per calendar quarter, on `day` of the quarter's first month
    /// (rolled forward to the next business day when needed).
    Quarterly { day: u8 },
    /// Fires on the Nth business day of the month. Counting is 1-indexed and
    /// skips Saturdays, Sundays, and any dates the holiday provider flags.
    NthBusinessDay { nth: u8 },
    /// Resolution is delegated to an externally supplied explicit-date list,
    /// looked up under `key` (e.g. "fomc" for `fomc_schedule`).
    External { key: String },
}

/// Default offset days for the underspecified pattern kinds. Sourced from
/// `[calendar]` in the monitor configuration so deployments can tune them
/// without touching code.
#[derive(Debug, Clone, Copy)]
pub struct PatternDefaults {
    /// Day of month for bare `mid_month` (default 15).
    pub mid_month_day: u8,
    /// Day of the quarter's first month for bare `quarterly` (default 25).
    pub quarterly_day: u8,
}

impl Default for PatternDefaults {
    fn default() -> Self {
        Self {
            mid_month_day: 15,
            quarterly_day: 25,
        }
    }
}

/// Why a pattern string failed to parse. Wrapped into the calendar store's
/// `ConfigError` with the offending indicator id attached.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PatternError {
    #[error("not a recognized pattern form")]
    Unrecognized,
    #[error("ordinal {0} out of range (expected 1-5)")]
    OrdinalOutOfRange(u8),
    #[error("week {0} out of range (expected 1-4)")]
    WeekOutOfRange(u8),
    #[error("day {0} out of range (expected 1-28)")]
    DayOutOfRange(u8),
    #[error("business-day ordinal {0} out of range (expected 1-21)")]
    BusinessDayOutOfRange(u8),
    #[error("'{0}' is not a weekday name")]
    BadWeekday(String),
}

impl ReleasePattern {
    /// Parse a calendar-file pattern string. Total over the closed grammar:
    /// every accepted string maps to exactly one variant, everything else is
    /// an error for the loader to surface.
    pub fn parse(input: &str, defaults: &PatternDefaults) -> Result<Self, PatternError> {
        let text = input.trim().to_ascii_lowercase();

        if let Some(weekday) = parse_weekday(&text) {
            return Ok(Self::EveryWeek { weekday });
        }

        if text == "end_of_month" {
            return Ok(Self::EndOfMonth);
        }

        if let Some(rest) = text.strip_prefix("mid_month") {
            let day = parse_optional_day(rest, defaults.mid_month_day)?;
            if !(1..=28).contains(&day) {
                return Err(PatternError::DayOutOfRange(day));
            }
            return Ok(Self::MidMonth { day });
        }

        if let Some(rest) = text.strip_prefix("quarterly") {
            let day = parse_optional_day(rest, defaults.quarterly_day)?;
            if !(1..=28).contains(&day) {
                return Err(PatternError::DayOutOfRange(day));
            }
            return Ok(Self::Quarterly { day });
        }

        // "<ord>_business_day": 1st_business_day, 3rd_business_day, ...
        if let Some(ordinal) = text.strip_suffix("_business_day") {
            let nth = parse_ordinal(ordinal).ok_or(PatternError::Unrecognized)?;
            if !(1..=21).contains(&nth) {
                return Err(PatternError::BusinessDayOutOfRange(nth));
            }
            return Ok(Self::NthBusinessDay { nth });
        }

        // "<weekday>_before_<anchor>": wed_before_nfp
        if let Some(idx) = text.find("_before_") {
            let (day_part, anchor_part) = (&text[..idx], &text[idx + "_before_".len()..]);
            let weekday =
                parse_weekday(day_part).ok_or_else(|| PatternError::BadWeekday(day_part.into()))?;
            if anchor_part.is_empty() {
                return Err(PatternError::Unrecognized);
            }
            return Ok(Self::WeekdayBefore {
                weekday,
                anchor: anchor_part.to_ascii_uppercase(),
            });
        }

        // "<name>_schedule": fomc_schedule
        if let Some(key) = text.strip_suffix("_schedule") {
            if key.is_empty() || !key.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
                return Err(PatternError::Unrecognized);
            }
            return Ok(Self::External { key: key.to_string() });
        }

        // "<ord> week" / "<ord> <weekday>": 1st week, 1st friday
        if let Some((ordinal_part, rest)) = text.split_once(' ') {
            let n = parse_ordinal(ordinal_part).ok_or(PatternError::Unrecognized)?;
            if rest == "week" {
                if !(1..=4).contains(&n) {
                    return Err(PatternError::WeekOutOfRange(n));
                }
                return Ok(Self::WeekOfMonth { week: n });
            }
            if let Some(weekday) = parse_weekday(rest) {
                if !(1..=5).contains(&n) {
                    return Err(PatternError::OrdinalOutOfRange(n));
                }
                return Ok(Self::NthWeekday { nth: n, weekday });
            }
        }

        Err(PatternError::Unrecognized)
    }

    /// The anchor indicator id, for relative patterns.
    pub fn anchor(&self) -> Option<&str> {
        match self {
            Self::WeekdayBefore { anchor, .. } => Some(anchor),
            _ => None,
        }
    }

    /// The external-schedule key, for delegated patterns.
    pub fn external_key(&self) -> Option<&str> {
        match self {
            Self::External { key } => Some(key),
            _ => None,
        }
    }
}

/// Accepts full names and common three-letter abbreviations.
fn parse_weekday(text: &str) -> Option<Weekday> {
    match text {
        "monday" | "mon" => Some(Weekday::Mon),
        "tuesday" | "tue" => Some(Weekday::Tue),
        "wednesday" | "wed" => Some(Weekday::Wed),
        "thursday" | "thu" => Some(Weekday::Thu),
        "friday" | "fri" => Some(Weekday::Fri),
        "saturday" | "sat" => Some(Weekday::Sat),
        "sunday" | "sun" => Some(Weekday::Sun),
        _ => None,
    }
}

/// "1st" -> 1, "2nd" -> 2, "3rd" -> 3, "4th" -> 4, ... Bare digits are not
/// accepted; the calendar format always writes the ordinal suffix.
fn parse_ordinal(text: &str) -> Option<u8> {
    let digits = text
        .strip_suffix("st")
        .or_else(|| text.strip_suffix("nd"))
        .or_else(|| text.strip_suffix("rd"))
        .or_else(|| text.strip_suffix("th"))?;
    digits.parse().ok()
}

/// Parses the optional ":<day>" suffix of mid_month / quarterly.
fn parse_optional_day(rest: &str, default: u8) -> Result<u8, PatternError> {
    if rest.is_empty() {
        return Ok(default);
    }
    let digits = rest.strip_prefix(':').ok_or(PatternError::Unrecognized)?;
    digits
        .parse::<u8>()
        .map_err(|_| PatternError::Unrecognized)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(s: &str) -> Result<ReleasePattern, PatternError> {
        ReleasePattern::parse(s, &PatternDefaults::default())
    }

    #[test]
    fn nth_weekday() {
        assert_eq!(
            parse("1st friday").unwrap(),
            ReleasePattern::NthWeekday {
                nth: 1,
                weekday: Weekday::Fri
            }
        );
        assert_eq!(
            parse("3rd Tuesday").unwrap(),
            ReleasePattern::NthWeekday {
                nth: 3,
                weekday: Weekday::Tue
            }
        );
    }

    #[test]
    fn nth_weekday_ordinal_bounds() {
        assert!(matches!(
            parse("6th friday"),
            Err(PatternError::OrdinalOutOfRange(6))
        ));
    }

    #[test]
    fn weekly_weekday() {
        assert_eq!(
            parse("thursday").unwrap(),
            ReleasePattern::EveryWeek {
                weekday: Weekday::Thu
            }
        );
    }

    #[test]
    fn weekday_before_anchor() {
        assert_eq!(
            parse("wed_before_nfp").unwrap(),
            ReleasePattern::WeekdayBefore {
                weekday: Weekday::Wed,
                anchor: "NFP".to_string()
            }
        );
    }

    #[test]
    fn week_of_month() {
        assert_eq!(parse("1st week").unwrap(), ReleasePattern::WeekOfMonth { week: 1 });
        assert_eq!(parse("3rd week").unwrap(), ReleasePattern::WeekOfMonth { week: 3 });
        assert!(matches!(parse("5th week"), Err(PatternError::WeekOutOfRange(5))));
    }

    #[test]
    fn mid_month_default_and_explicit() {
        assert_eq!(parse("mid_month").unwrap(), ReleasePattern::MidMonth { day: 15 });
        assert_eq!(parse("mid_month:17").unwrap(), ReleasePattern::MidMonth { day: 17 });
        assert!(matches!(parse("mid_month:30"), Err(PatternError::DayOutOfRange(30))));
    }

    #[test]
    fn quarterly_default_and_explicit() {
        assert_eq!(parse("quarterly").unwrap(), ReleasePattern::Quarterly { day: 25 });
        assert_eq!(parse("quarterly:5").unwrap(), ReleasePattern::Quarterly { day: 5 });
    }

    #[test]
    fn business_day() {
        assert_eq!(
            parse("1st_business_day").unwrap(),
            ReleasePattern::NthBusinessDay { nth: 1 }
        );
        assert_eq!(
            parse("3rd_business_day").unwrap(),
            ReleasePattern::NthBusinessDay { nth: 3 }
        );
    }

    #[test]
    fn external_schedule() {
        assert_eq!(
            parse("fomc_schedule").unwrap(),
            ReleasePattern::External {
                key: "fomc".to_string()
            }
        );
    }

    #[test]
    fn end_of_month() {
        assert_eq!(parse("end_of_month").unwrap(), ReleasePattern::EndOfMonth);
    }

    #[test]
    fn unrecognized_patterns_rejected() {
        for bad in ["", "whenever", "1st", "friday-ish", "13 friday", "xyz_before_"] {
            assert!(parse(bad).is_err(), "should reject {bad:?}");
        }
    }
}
