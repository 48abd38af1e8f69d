//! Economic release calendar: store, pattern language, and schedule resolver.
//!
//! This subsystem answers two questions for the collection pipeline:
//!
//! 1. *What is due on date D?* [`ScheduleResolver::due_on`] /
//!    [`ScheduleResolver::significant_on`]
//! 2. *When does indicator X next fire after D?*
//!    [`ScheduleResolver::next_occurrence`]
//!
//! ## Load-time vs query-time failures
//!
//! Everything that can be wrong with a calendar file is caught when
//! [`CalendarStore::load_from_path`] runs: unknown pattern forms, bad
//! times, anchor cycles, unknown external schedules. A process never starts
//! with a partially valid calendar. After load, queries are total: "nothing
//! due today" and "no occurrence within the horizon" are ordinary results.
//!
//! ## Collaborators
//!
//! Externally announced schedules (FOMC meeting dates) and public-holiday
//! calendars are injected via [`ScheduleSource`] and [`HolidayCalendar`];
//! the pattern language itself computes neither.

pub mod evaluator;
pub mod pattern;
pub mod resolver;
pub mod schedule_source;
pub mod store;

pub use pattern::{PatternDefaults, ReleasePattern};
pub use resolver::{ReleaseEvent, ScheduleResolver, DEFAULT_HORIZON_DAYS};
pub use schedule_source::{
    FixedHolidays, HolidayCalendar, NoExternalSchedules, NoHolidays, ScheduleSource,
    StaticScheduleSource,
};
pub use store::{CalendarStore, ConfigError, IndicatorDescriptor, NotFoundError};
