//! Schedule resolver: which releases are due, and when is the next one.
//!
//! Pure reads over the immutable [`CalendarStore`]. Every query allocates its
//! own [`ReleaseEvent`]s, so the resolver is safe to share across tasks with
//! no synchronization.

use std::sync::Arc;

use chrono::{Days, NaiveDate, NaiveTime};

use crate::types::Importance;

use super::evaluator::PatternEvaluator;
use super::schedule_source::{HolidayCalendar, NoHolidays, ScheduleSource};
use super::store::{CalendarStore, IndicatorDescriptor, NotFoundError};

/// Default forward-scan horizon for [`ScheduleResolver::next_occurrence`].
pub const DEFAULT_HORIZON_DAYS: u32 = 400;

/// One scheduled release occurrence, produced per query and owned by the
/// caller.
#[derive(Debug, Clone)]
pub struct ReleaseEvent {
    pub indicator_id: String,
    pub scheduled_date: NaiveDate,
    pub scheduled_time: NaiveTime,
    pub importance: Importance,
    /// The descriptor this event was produced from.
    pub descriptor: Arc<IndicatorDescriptor>,
}

impl ReleaseEvent {
    fn new(descriptor: &Arc<IndicatorDescriptor>, date: NaiveDate) -> Self {
        Self {
            indicator_id: descriptor.id.clone(),
            scheduled_date: date,
            scheduled_time: descriptor.release_time,
            importance: descriptor.importance,
            descriptor: Arc::clone(descriptor),
        }
    }
}

/// Answers "what is due on date D" and "when does indicator X next fire".
pub struct ScheduleResolver {
    store: Arc<CalendarStore>,
    schedules: Arc<dyn ScheduleSource>,
    holidays: Arc<dyn HolidayCalendar>,
    horizon_days: u32,
}

impl ScheduleResolver {
    pub fn new(store: Arc<CalendarStore>, schedules: Arc<dyn ScheduleSource>) -> Self {
        Self {
            store,
            schedules,
            holidays: Arc::new(NoHolidays),
            horizon_days: DEFAULT_HORIZON_DAYS,
        }
    }

    /// Attach a holiday calendar for business-day counting.
    #[must_use]
    pub fn with_holidays(mut self, holidays: Arc<dyn HolidayCalendar>) -> Self {
        self.holidays = holidays;
        self
    }

    /// Override the `next_occurrence` scan horizon.
    #[must_use]
    pub fn with_horizon_days(mut self, days: u32) -> Self {
        self.horizon_days = days;
        self
    }

    pub fn store(&self) -> &CalendarStore {
        &self.store
    }

    fn evaluator(&self) -> PatternEvaluator<'_> {
        PatternEvaluator::new(self.store.patterns(), &*self.schedules, &*self.holidays)
    }

    /// Every indicator due on `date`, ordered by release time ascending, then
    /// importance descending, then id ascending.
    pub fn due_on(&self, date: NaiveDate) -> Vec<ReleaseEvent> {
        let evaluator = self.evaluator();
        let mut events: Vec<ReleaseEvent> = self
            .store
            .all()
            .filter_map(|descriptor| {
                evaluator
                    .fires_on(&descriptor.pattern, date)
                    .map(|scheduled| ReleaseEvent::new(descriptor, scheduled))
            })
            .collect();
        sort_events(&mut events);
        events
    }

    /// Like [`due_on`](Self::due_on), filtered to `importance >= min_importance`.
    pub fn significant_on(&self, date: NaiveDate, min_importance: Importance) -> Vec<ReleaseEvent> {
        let mut events = self.due_on(date);
        events.retain(|e| e.importance >= min_importance);
        events
    }

    /// First date strictly after `after_date` on which the indicator fires,
    /// scanning day by day up to the configured horizon.
    ///
    /// `Ok(None)` means no occurrence within the horizon — an expected
    /// outcome for never-firing patterns, not an error. Unknown ids are the
    /// only error case.
    pub fn next_occurrence(
        &self,
        indicator_id: &str,
        after_date: NaiveDate,
    ) -> Result<Option<ReleaseEvent>, NotFoundError> {
        let descriptor = self.store.get(indicator_id)?;
        let evaluator = self.evaluator();

        let mut date = after_date;
        for _ in 0..self.horizon_days {
            date = match date.checked_add_days(Days::new(1)) {
                Some(next) => next,
                None => return Ok(None),
            };
            if let Some(scheduled) = evaluator.fires_on(&descriptor.pattern, date) {
                return Ok(Some(ReleaseEvent::new(descriptor, scheduled)));
            }
        }
        Ok(None)
    }
}

fn sort_events(events: &mut [ReleaseEvent]) {
    events.sort_by(|a, b| {
        a.scheduled_time
            .cmp(&b.scheduled_time)
            .then_with(|| b.importance.cmp(&a.importance))
            .then_with(|| a.indicator_id.cmp(&b.indicator_id))
    });
}
