//! Cycle orchestration and the daemon scheduling loop.

pub mod daily_cycle;

pub use daily_cycle::{today, CycleSummary, DailyCycle};

use chrono::{Local, NaiveDateTime, NaiveTime, TimeZone};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use crate::config::defaults::CYCLE_RETRY_BACKOFF_SECS;

/// Parse the configured "HH:MM" report time; `None` on malformed input.
pub fn parse_report_time(text: &str) -> Option<NaiveTime> {
    let (h, m) = text.split_once(':')?;
    NaiveTime::from_hms_opt(h.parse().ok()?, m.parse().ok()?, 0)
}

/// Run the daily cycle at `report_time` local time until cancelled.
///
/// Mirrors the classic sleep-until-target loop: compute the next firing,
/// sleep, run, repeat. A failed cycle backs off briefly and rescheduling
/// continues; only cancellation exits.
pub async fn run_daemon(cycle: DailyCycle, report_time: NaiveTime, cancel: CancellationToken) {
    info!(%report_time, "Daemon started");
    loop {
        let now = Local::now();
        let next_run = next_firing(now.naive_local(), report_time);
        let sleep_duration = match Local.from_local_datetime(&next_run).single() {
            Some(target) => (target - now)
                .to_std()
                .unwrap_or(std::time::Duration::ZERO),
            // DST gap or ambiguity: retry shortly rather than guessing.
            None => {
                warn!(%next_run, "Ambiguous local time, retrying in an hour");
                std::time::Duration::from_secs(3600)
            }
        };

        info!(%next_run, sleep_secs = sleep_duration.as_secs(), "Sleeping until next cycle");
        tokio::select! {
            () = cancel.cancelled() => {
                info!("Daemon cancelled during sleep");
                return;
            }
            () = tokio::time::sleep(sleep_duration) => {}
        }

        match cycle.run_once(today()).await {
            Ok(summary) => {
                info!(date = %summary.date, emailed = summary.emailed, "Cycle finished");
            }
            Err(e) => {
                error!(error = %e, "Cycle failed, backing off");
                tokio::select! {
                    () = cancel.cancelled() => {
                        info!("Daemon cancelled during backoff");
                        return;
                    }
                    () = tokio::time::sleep(std::time::Duration::from_secs(
                        CYCLE_RETRY_BACKOFF_SECS,
                    )) => {}
                }
            }
        }
    }
}

/// Next datetime at `report_time`, strictly after `now`.
fn next_firing(now: NaiveDateTime, report_time: NaiveTime) -> NaiveDateTime {
    let today_run = now.date().and_time(report_time);
    if now < today_run {
        today_run
    } else {
        (now.date() + chrono::Duration::days(1)).and_time(report_time)
    }
}
