//! Macro Monitor - scheduled economic-data collection and newsletter delivery.
//!
//! # Usage
//!
//! ```bash
//! # Run the daemon (daily cycle at the configured report time)
//! macro-monitor run
//!
//! # Run a single cycle immediately
//! macro-monitor once
//!
//! # Show what the calendar resolves for a date
//! macro-monitor calendar --date 2026-08-07 --days 14
//!
//! # Verify SMTP settings
//! macro-monitor send-test-email
//! ```
//!
//! # Environment Variables
//!
//! - `FRED_API_KEY` / `BLS_API_KEY`: data-source credentials
//! - `ANTHROPIC_API_KEY`: enables the LLM narrative section
//! - `SENDER_PASSWORD`: SMTP password (username comes from config)
//! - `MACRO_MONITOR_CONFIG`: path to the config TOML
//! - `RUST_LOG`: logging level (default: info)

use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use chrono::NaiveDate;
use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use macro_monitor::analyzers::{FedAnalyzer, MarketAnalyzer, ReleaseAnalyzer};
use macro_monitor::calendar::{
    CalendarStore, PatternDefaults, ScheduleResolver, StaticScheduleSource,
};
use macro_monitor::collectors::{
    self, BondCollector, EconomicDataCollector, FedSpeechCollector, MarketDataCollector,
};
use macro_monitor::config::{self, MonitorConfig};
use macro_monitor::llm::ClaudeClient;
use macro_monitor::pipeline::{self, DailyCycle};
use macro_monitor::report::EmailNotifier;
use macro_monitor::storage::MonitorStore;
use macro_monitor::types::Importance;

// ============================================================================
// CLI Arguments
// ============================================================================

#[derive(Parser, Debug)]
#[command(name = "macro-monitor")]
#[command(about = "Scheduled economic-data collection and newsletter delivery")]
#[command(version)]
struct CliArgs {
    #[command(subcommand)]
    command: Option<SubCommand>,
}

#[derive(clap::Subcommand, Debug)]
enum SubCommand {
    /// Run the daemon: one cycle per day at the configured report time
    Run,
    /// Run a single collection cycle immediately and exit
    Once {
        /// Cycle date (YYYY-MM-DD); defaults to today
        #[arg(long)]
        date: Option<String>,
    },
    /// Print scheduled releases for a date and the next occurrence of each
    /// indicator
    Calendar {
        /// Query date (YYYY-MM-DD); defaults to today
        #[arg(long)]
        date: Option<String>,
        /// Only show indicators at or above this importance
        #[arg(long, default_value = "low")]
        min_importance: String,
    },
    /// Send a short test email using the configured SMTP settings
    SendTestEmail,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let args = CliArgs::parse();
    config::init(MonitorConfig::load());

    match args.command.unwrap_or(SubCommand::Run) {
        SubCommand::Run => run_daemon().await,
        SubCommand::Once { date } => run_once(date).await,
        SubCommand::Calendar {
            date,
            min_importance,
        } => show_calendar(date, &min_importance),
        SubCommand::SendTestEmail => send_test_email().await,
    }
}

// ============================================================================
// Component wiring
// ============================================================================

fn build_resolver() -> Result<Arc<ScheduleResolver>> {
    let cfg = config::get();
    let defaults = PatternDefaults {
        mid_month_day: cfg.calendar.mid_month_day,
        quarterly_day: cfg.calendar.quarterly_day,
    };
    let schedules = Arc::new(StaticScheduleSource::with_fomc_meetings());
    let store = CalendarStore::load_from_path(&cfg.calendar.path, &defaults, schedules.as_ref())
        .with_context(|| format!("loading calendar from {}", cfg.calendar.path.display()))?;
    info!(
        indicators = store.len(),
        path = %cfg.calendar.path.display(),
        "Calendar loaded"
    );
    Ok(Arc::new(
        ScheduleResolver::new(Arc::new(store), schedules)
            .with_horizon_days(cfg.calendar.horizon_days),
    ))
}

fn build_cycle() -> Result<DailyCycle> {
    let cfg = config::get();
    let resolver = build_resolver()?;
    let http = collectors::http_client(cfg.collection.request_timeout_secs)
        .context("building HTTP client")?;

    let notifier = if cfg.email.enabled {
        match EmailNotifier::from_config(&cfg.email) {
            Ok(notifier) => Some(notifier),
            Err(e) => {
                warn!(error = %e, "Email disabled");
                None
            }
        }
    } else {
        None
    };

    let claude = if cfg.report.use_llm_narrative {
        match ClaudeClient::from_env(http.clone(), &cfg.report.claude_model) {
            Ok(client) => Some(client),
            Err(e) => {
                warn!(error = %e, "LLM narrative disabled");
                None
            }
        }
    } else {
        None
    };

    Ok(DailyCycle {
        resolver: Arc::clone(&resolver),
        economic: EconomicDataCollector::new(
            http.clone(),
            resolver,
            cfg.collection.fred_base_url.clone(),
            cfg.collection.bls_base_url.clone(),
        ),
        market: MarketDataCollector::new(http.clone(), cfg.collection.chart_base_url.clone()),
        bond: BondCollector::new(http.clone(), cfg.collection.chart_base_url.clone()),
        fed: FedSpeechCollector::new(
            http,
            cfg.collection.fed_feeds.clone(),
            cfg.collection.speech_window_days,
        ),
        release_analyzer: ReleaseAnalyzer::new(
            cfg.analysis.surprise_neutral_band,
            cfg.analysis.min_surprise_history,
        ),
        fed_analyzer: FedAnalyzer::new(cfg.analysis.policy_bias_threshold),
        market_analyzer: MarketAnalyzer::new(&cfg.analysis),
        store: MonitorStore::open(&cfg.storage.db_path)
            .with_context(|| format!("opening database at {}", cfg.storage.db_path.display()))?,
        notifier,
        claude,
        subject_prefix: cfg.report.subject_prefix.clone(),
    })
}

// ============================================================================
// Subcommands
// ============================================================================

async fn run_daemon() -> Result<()> {
    let cfg = config::get();
    let report_time = pipeline::parse_report_time(&cfg.report.report_time)
        .ok_or_else(|| anyhow!("invalid report_time '{}'", cfg.report.report_time))?;
    let cycle = build_cycle()?;

    let cancel = CancellationToken::new();
    let signal_token = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Ctrl-C received, shutting down");
            signal_token.cancel();
        }
    });

    pipeline::run_daemon(cycle, report_time, cancel).await;
    Ok(())
}

async fn run_once(date: Option<String>) -> Result<()> {
    let date = parse_date_arg(date)?;
    let cycle = build_cycle()?;
    let summary = cycle.run_once(date).await?;
    println!(
        "{}: {} due, {} releases collected, {} quotes, {} communications, emailed: {}",
        summary.date,
        summary.releases_due,
        summary.releases_collected,
        summary.quotes_collected,
        summary.communications,
        summary.emailed,
    );
    Ok(())
}

fn show_calendar(date: Option<String>, min_importance: &str) -> Result<()> {
    let date = parse_date_arg(date)?;
    let min = Importance::parse(min_importance)
        .ok_or_else(|| anyhow!("invalid importance '{min_importance}'"))?;
    let resolver = build_resolver()?;

    let due = resolver.significant_on(date, min);
    if due.is_empty() {
        println!("No releases due on {date}");
    } else {
        println!("Due on {date}:");
        for event in &due {
            println!(
                "  {} {:<10} {:<28} [{}]",
                event.scheduled_time.format("%H:%M"),
                event.indicator_id,
                event.descriptor.name,
                event.importance,
            );
        }
    }

    println!("\nNext occurrences:");
    for descriptor in resolver.store().all() {
        if descriptor.importance < min {
            continue;
        }
        // Unknown ids are impossible here; the iteration came from the store.
        match resolver.next_occurrence(&descriptor.id, date) {
            Ok(Some(event)) => println!(
                "  {:<10} {} {}",
                descriptor.id,
                event.scheduled_date,
                event.scheduled_time.format("%H:%M"),
            ),
            Ok(None) => println!("  {:<10} none within horizon", descriptor.id),
            Err(e) => warn!(error = %e, "Lookup failed"),
        }
    }
    Ok(())
}

async fn send_test_email() -> Result<()> {
    let cfg = config::get();
    let notifier = EmailNotifier::from_config(&cfg.email).context("building email notifier")?;
    notifier
        .send(
            "Macro Monitor test email",
            "<h1>Macro Monitor</h1><p>SMTP settings are working.</p>".to_string(),
        )
        .await
        .context("sending test email")?;
    println!("Test email sent to {}", cfg.email.recipient);
    Ok(())
}

fn parse_date_arg(date: Option<String>) -> Result<NaiveDate> {
    match date {
        Some(text) => NaiveDate::parse_from_str(&text, "%Y-%m-%d")
            .with_context(|| format!("invalid date '{text}' (expected YYYY-MM-DD)")),
        None => Ok(pipeline::today()),
    }
}
