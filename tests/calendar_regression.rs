//! Calendar Resolver Regression Tests
//!
//! Exercises the release-schedule resolver against the repository's real
//! `calendar.toml`, end to end: load-time validation, due-date resolution,
//! ordering, significance filtering, and next-occurrence scanning.
//!
//! Date facts used below (2026): Aug 1 is a Saturday, so the first Friday is
//! Aug 7, the Wednesday before it Aug 5, and the first business day Aug 3.

use std::path::Path;
use std::sync::Arc;

use chrono::{Datelike, NaiveDate, NaiveTime, Weekday};

use macro_monitor::calendar::{
    CalendarStore, PatternDefaults, ScheduleResolver, StaticScheduleSource,
};
use macro_monitor::types::Importance;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn resolver() -> ScheduleResolver {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("calendar.toml");
    let schedules = Arc::new(StaticScheduleSource::with_fomc_meetings());
    let store =
        CalendarStore::load_from_path(&path, &PatternDefaults::default(), schedules.as_ref())
            .expect("repository calendar.toml must load");
    ScheduleResolver::new(Arc::new(store), schedules)
}

// ============================================================================
// Load and round-trip
// ============================================================================

#[test]
fn repository_calendar_loads_and_round_trips() {
    let r = resolver();
    let store = r.store();
    assert!(store.len() >= 10, "calendar should track a real indicator set");

    let nfp = store.get("NFP").unwrap();
    assert_eq!(nfp.name, "Nonfarm Payrolls");
    assert_eq!(nfp.source, "BLS");
    assert_eq!(nfp.series_id, "CES0000000001");
    assert_eq!(nfp.release_pattern, "1st friday");
    assert_eq!(nfp.release_time, NaiveTime::from_hms_opt(8, 30, 0).unwrap());
    assert_eq!(nfp.importance, Importance::High);

    // Every declared id resolves back to a descriptor with a matching id.
    for descriptor in store.all() {
        let fetched = store.get(&descriptor.id).unwrap();
        assert_eq!(fetched.id, descriptor.id);
    }
}

#[test]
fn unknown_indicator_is_a_recoverable_lookup_error() {
    let r = resolver();
    assert!(r.store().get("NOT_A_THING").is_err());
    assert!(r.next_occurrence("NOT_A_THING", date(2026, 8, 1)).is_err());
}

// ============================================================================
// Due-date resolution
// ============================================================================

#[test]
fn first_friday_brings_jobs_day() {
    let r = resolver();
    let events = r.due_on(date(2026, 8, 7));
    let ids: Vec<&str> = events.iter().map(|e| e.indicator_id.as_str()).collect();
    // 8:30 high releases first (NFP before UNRATE by id), then 10:00 JOLTS
    // (first week of the month).
    assert_eq!(ids, ["NFP", "UNRATE", "JOLTS"]);
}

#[test]
fn adp_fires_on_wednesday_before_nfp() {
    let r = resolver();
    let events = r.due_on(date(2026, 8, 5));
    let ids: Vec<&str> = events.iter().map(|e| e.indicator_id.as_str()).collect();
    assert!(ids.contains(&"ADP"), "ADP should fire two days before NFP on the 7th");
    // ADP must not fire on any other Wednesday of the month.
    for day in [12, 19, 26] {
        let later = r.due_on(date(2026, 8, day));
        assert!(later.iter().all(|e| e.indicator_id != "ADP"));
    }
}

#[test]
fn cpi_outranks_jobless_claims_at_equal_time() {
    // 2026-08-13 is both a Thursday (JOBLESS) and CPI day (mid_month:13).
    let r = resolver();
    let events = r.due_on(date(2026, 8, 13));
    let ids: Vec<&str> = events.iter().map(|e| e.indicator_id.as_str()).collect();
    let cpi = ids.iter().position(|&id| id == "CPI").unwrap();
    let jobless = ids.iter().position(|&id| id == "JOBLESS").unwrap();
    assert!(cpi < jobless, "equal release time: high importance sorts first");
}

#[test]
fn pce_fires_on_last_business_day() {
    // 2026-08-31 is a Monday.
    let r = resolver();
    let events = r.due_on(date(2026, 8, 31));
    assert!(events.iter().any(|e| e.indicator_id == "PCE"));
    let events = r.due_on(date(2026, 8, 28));
    assert!(events.iter().all(|e| e.indicator_id != "PCE"));
}

#[test]
fn construction_fires_on_first_business_day() {
    // September 2026 opens on Tuesday the 1st.
    let r = resolver();
    let events = r.due_on(date(2026, 9, 1));
    assert!(events.iter().any(|e| e.indicator_id == "CONSTRUCTION"));
    // August 2026 opens on a Saturday; first business day is Monday the 3rd.
    let events = r.due_on(date(2026, 8, 3));
    assert!(events.iter().any(|e| e.indicator_id == "CONSTRUCTION"));
    let weekend = r.due_on(date(2026, 8, 1));
    assert!(weekend.iter().all(|e| e.indicator_id != "CONSTRUCTION"));
}

#[test]
fn fomc_resolves_from_injected_schedule() {
    let r = resolver();
    let events = r.due_on(date(2026, 9, 16));
    assert!(events.iter().any(|e| e.indicator_id == "FOMC"));
    let day_after = r.due_on(date(2026, 9, 17));
    assert!(day_after.iter().all(|e| e.indicator_id != "FOMC"));
}

#[test]
fn significant_on_filters_but_keeps_order() {
    let r = resolver();
    let all = r.due_on(date(2026, 8, 7));
    let high = r.significant_on(date(2026, 8, 7), Importance::High);
    assert!(high.len() < all.len());
    let ids: Vec<&str> = high.iter().map(|e| e.indicator_id.as_str()).collect();
    assert_eq!(ids, ["NFP", "UNRATE"]);
}

// ============================================================================
// Completeness and uniqueness over a whole month
// ============================================================================

#[test]
fn due_on_is_exact_over_august() {
    let r = resolver();
    for day in 1..=31u32 {
        let d = date(2026, 8, day);
        let events = r.due_on(d);
        // No duplicates.
        let mut ids: Vec<&str> = events.iter().map(|e| e.indicator_id.as_str()).collect();
        let total = ids.len();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), total, "duplicate events on {d}");
        // Every event's scheduled date is the query date.
        for event in &events {
            assert_eq!(event.scheduled_date, d);
        }
        // Ordering invariant.
        for pair in events.windows(2) {
            let (a, b) = (&pair[0], &pair[1]);
            assert!(
                a.scheduled_time < b.scheduled_time
                    || (a.scheduled_time == b.scheduled_time && a.importance > b.importance)
                    || (a.scheduled_time == b.scheduled_time
                        && a.importance == b.importance
                        && a.indicator_id < b.indicator_id),
                "ordering violated on {d}: {} before {}",
                a.indicator_id,
                b.indicator_id,
            );
        }
    }
}

// ============================================================================
// Next occurrence
// ============================================================================

#[test]
fn next_jobless_claims_is_the_following_thursday() {
    let r = resolver();
    let event = r
        .next_occurrence("JOBLESS", date(2026, 8, 6))
        .unwrap()
        .expect("weekly release must occur within the horizon");
    assert_eq!(event.scheduled_date, date(2026, 8, 13));
    assert_eq!(event.scheduled_date.weekday(), Weekday::Thu);
}

#[test]
fn next_gdp_rolls_quarterly_weekend_forward() {
    // Quarterly day 25: 2026-10-25 is a Sunday, so the advance print lands
    // on Monday the 26th.
    let r = resolver();
    let event = r
        .next_occurrence("GDP", date(2026, 8, 1))
        .unwrap()
        .expect("quarterly release must occur within the horizon");
    assert_eq!(event.scheduled_date, date(2026, 10, 26));
}

#[test]
fn next_nfp_from_month_end_is_next_months_first_friday() {
    let r = resolver();
    let event = r
        .next_occurrence("NFP", date(2026, 8, 7))
        .unwrap()
        .expect("NFP recurs monthly");
    // September 2026: first Friday is the 4th.
    assert_eq!(event.scheduled_date, date(2026, 9, 4));
}

#[test]
fn next_fomc_comes_from_the_announced_list() {
    let r = resolver();
    let event = r
        .next_occurrence("FOMC", date(2026, 8, 1))
        .unwrap()
        .expect("FOMC meets within the horizon");
    assert_eq!(event.scheduled_date, date(2026, 9, 16));
}
