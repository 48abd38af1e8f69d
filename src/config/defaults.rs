//! Process-wide constants that are not operator-tunable.

/// Anthropic Messages API endpoint used for narrative composition.
pub const ANTHROPIC_API_URL: &str = "https://api.anthropic.com/v1/messages";

/// Max tokens requested for a composed narrative.
pub const NARRATIVE_MAX_TOKENS: u32 = 4000;

/// Seconds to back off after a failed daily cycle before rescheduling.
pub const CYCLE_RETRY_BACKOFF_SECS: u64 = 60;

/// Environment variable names for secrets. Secrets never live in TOML.
pub const ENV_FRED_API_KEY: &str = "FRED_API_KEY";
pub const ENV_BLS_API_KEY: &str = "BLS_API_KEY";
pub const ENV_ANTHROPIC_API_KEY: &str = "ANTHROPIC_API_KEY";
pub const ENV_SENDER_PASSWORD: &str = "SENDER_PASSWORD";
