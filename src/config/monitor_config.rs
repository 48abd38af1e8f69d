//! Monitor configuration - collection, analysis, and delivery settings as
//! operator-tunable TOML values.
//!
//! Every section implements `Default`, so a missing file or missing section
//! falls back to built-in values and the daemon still starts (email delivery
//! stays disabled until SMTP settings are provided).

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Root configuration for a monitor deployment.
///
/// Load with `MonitorConfig::load()` which searches:
/// 1. `$MACRO_MONITOR_CONFIG` env var
/// 2. `./monitor_config.toml`
/// 3. Built-in defaults
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct MonitorConfig {
    /// Calendar file location and pattern tuning
    #[serde(default)]
    pub calendar: CalendarConfig,

    /// Collector endpoints and timeouts
    #[serde(default)]
    pub collection: CollectionConfig,

    /// Analysis thresholds
    #[serde(default)]
    pub analysis: AnalysisConfig,

    /// Newsletter composition and schedule
    #[serde(default)]
    pub report: ReportConfig,

    /// Email delivery
    #[serde(default)]
    pub email: EmailConfig,

    /// Local persistence
    #[serde(default)]
    pub storage: StorageConfig,
}

impl MonitorConfig {
    /// Load configuration using the standard search order.
    pub fn load() -> Self {
        if let Ok(path) = std::env::var("MACRO_MONITOR_CONFIG") {
            let p = PathBuf::from(&path);
            if p.exists() {
                match Self::load_from_file(&p) {
                    Ok(config) => {
                        info!(path = %p.display(), "Loaded config from MACRO_MONITOR_CONFIG");
                        return config;
                    }
                    Err(e) => {
                        warn!(path = %p.display(), error = %e, "Failed to load config from MACRO_MONITOR_CONFIG, falling back");
                    }
                }
            } else {
                warn!(path = %path, "MACRO_MONITOR_CONFIG points to non-existent file, falling back");
            }
        }

        let local = Path::new("monitor_config.toml");
        if local.exists() {
            match Self::load_from_file(local) {
                Ok(config) => {
                    info!(path = %local.display(), "Loaded config from working directory");
                    return config;
                }
                Err(e) => {
                    warn!(error = %e, "Failed to load ./monitor_config.toml, using defaults");
                }
            }
        }

        info!("No config file found, using built-in defaults");
        Self::default()
    }

    pub fn load_from_file(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&text)?;
        Ok(config)
    }
}

// ============================================================================
// Calendar
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalendarConfig {
    /// Path to the release-calendar TOML file.
    pub path: PathBuf,
    /// Day of month for bare `mid_month` patterns.
    pub mid_month_day: u8,
    /// Day of the quarter's first month for bare `quarterly` patterns.
    pub quarterly_day: u8,
    /// Forward-scan horizon (days) for next-occurrence queries.
    pub horizon_days: u32,
}

impl Default for CalendarConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("calendar.toml"),
            mid_month_day: 15,
            quarterly_day: 25,
            horizon_days: 400,
        }
    }
}

// ============================================================================
// Collection
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectionConfig {
    /// Per-request HTTP timeout in seconds.
    pub request_timeout_secs: u64,
    /// Fed communications older than this many days are ignored.
    pub speech_window_days: i64,
    /// FRED observations endpoint. Overridable for testing.
    pub fred_base_url: String,
    /// BLS timeseries endpoint.
    pub bls_base_url: String,
    /// Chart-quote endpoint; the vendor ticker is appended.
    pub chart_base_url: String,
    /// Federal Reserve RSS feeds polled by the speech collector, as
    /// `(source tag, url)` pairs.
    pub fed_feeds: Vec<FeedEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedEntry {
    pub source: String,
    pub url: String,
}

impl Default for CollectionConfig {
    fn default() -> Self {
        Self {
            request_timeout_secs: 30,
            speech_window_days: 7,
            fred_base_url: "https://api.stlouisfed.org/fred/series/observations".to_string(),
            bls_base_url: "https://api.bls.gov/publicAPI/v2/timeseries/data/".to_string(),
            chart_base_url: "https://query1.finance.yahoo.com/v8/finance/chart".to_string(),
            fed_feeds: vec![
                FeedEntry {
                    source: "speeches".to_string(),
                    url: "https://www.federalreserve.gov/feeds/speeches.xml".to_string(),
                },
                FeedEntry {
                    source: "testimony".to_string(),
                    url: "https://www.federalreserve.gov/feeds/testimony.xml".to_string(),
                },
                FeedEntry {
                    source: "press_monetary".to_string(),
                    url: "https://www.federalreserve.gov/feeds/press_monetary.xml".to_string(),
                },
            ],
        }
    }
}

// ============================================================================
// Analysis
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// VIX level below which volatility is "low".
    pub vix_low: f64,
    /// VIX level above which volatility is "elevated".
    pub vix_elevated: f64,
    /// VIX level above which volatility is "high".
    pub vix_high: f64,
    /// Mean index move (percent) beyond which the day reads risk-on/off.
    pub risk_breadth_percent: f64,
    /// 2s10s spread (percentage points) below which the curve reads flat.
    pub curve_flat_threshold: f64,
    /// Absolute standardized surprise below which a release is "neutral".
    pub surprise_neutral_band: f64,
    /// Minimum stored surprises before dispersion-scaled scoring kicks in.
    pub min_surprise_history: usize,
    /// Hawkish score magnitude above which bias is hawkish/dovish rather
    /// than neutral.
    pub policy_bias_threshold: f64,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            vix_low: 15.0,
            vix_elevated: 25.0,
            vix_high: 35.0,
            risk_breadth_percent: 0.3,
            curve_flat_threshold: 0.5,
            surprise_neutral_band: 0.5,
            min_surprise_history: 4,
            policy_bias_threshold: 0.2,
        }
    }
}

// ============================================================================
// Report
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Local time ("HH:MM") the daily cycle runs at.
    pub report_time: String,
    /// Email subject prefix; the cycle date is appended.
    pub subject_prefix: String,
    /// Compose the narrative section with the Anthropic API when a key is
    /// present. The deterministic template is always the fallback.
    pub use_llm_narrative: bool,
    /// Model id for narrative composition.
    pub claude_model: String,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            report_time: "09:00".to_string(),
            subject_prefix: "Macro Monitor Daily Update".to_string(),
            use_llm_narrative: false,
            claude_model: "claude-sonnet-4-20250514".to_string(),
        }
    }
}

// ============================================================================
// Email
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmailConfig {
    /// Delivery is skipped entirely when false.
    pub enabled: bool,
    pub smtp_server: String,
    pub smtp_port: u16,
    pub sender: String,
    pub recipient: String,
}

impl Default for EmailConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            smtp_server: "smtp.gmail.com".to_string(),
            smtp_port: 587,
            sender: String::new(),
            recipient: String::new(),
        }
    }
}

// ============================================================================
// Storage
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Sled database directory.
    pub db_path: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from("./data/monitor.db"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sane() {
        let config = MonitorConfig::default();
        assert_eq!(config.calendar.horizon_days, 400);
        assert_eq!(config.calendar.mid_month_day, 15);
        assert_eq!(config.analysis.vix_low, 15.0);
        assert!(!config.email.enabled);
        assert_eq!(config.collection.fed_feeds.len(), 3);
    }

    #[test]
    fn partial_toml_fills_missing_sections() {
        let text = r#"
[calendar]
path = "my_calendar.toml"
mid_month_day = 13
quarterly_day = 25
horizon_days = 200

[email]
enabled = true
smtp_server = "mail.example.com"
smtp_port = 465
sender = "bot@example.com"
recipient = "desk@example.com"
"#;
        let config: MonitorConfig = toml::from_str(text).unwrap();
        assert_eq!(config.calendar.mid_month_day, 13);
        assert!(config.email.enabled);
        // Untouched sections come from defaults.
        assert_eq!(config.analysis.surprise_neutral_band, 0.5);
        assert_eq!(config.report.report_time, "09:00");
    }
}
