//! Macro Monitor: scheduled economic-data collection and reporting.
//!
//! ## Architecture
//!
//! - **Calendar**: release-schedule resolver — which indicators are due on a
//!   date, and when an indicator next fires
//! - **Collectors**: FRED/BLS observations, market quotes, treasury yields,
//!   Federal Reserve communications
//! - **Analyzers**: deterministic release, Fed-communication, and market
//!   regime scoring
//! - **Report**: HTML newsletter rendering and SMTP delivery
//! - **Pipeline**: the daily collect -> analyze -> render -> email cycle

pub mod analyzers;
pub mod calendar;
pub mod collectors;
pub mod config;
pub mod llm;
pub mod pipeline;
pub mod report;
pub mod storage;
pub mod types;

// Re-export monitor configuration
pub use config::MonitorConfig;

// Re-export the resolver subsystem
pub use calendar::{
    CalendarStore, ConfigError, HolidayCalendar, IndicatorDescriptor, NotFoundError,
    PatternDefaults, ReleaseEvent, ReleasePattern, ScheduleResolver, ScheduleSource,
    StaticScheduleSource,
};

// Re-export commonly used types
pub use types::{
    BondSnapshot, CommunicationType, FedCommunication, Importance, MarketQuote,
    ReleaseObservation,
};

// Re-export pipeline entry points
pub use pipeline::{CycleSummary, DailyCycle};

// Re-export storage
pub use storage::{MonitorStore, StorageError};
