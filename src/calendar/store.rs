//! Calendar store: the immutable indicator catalog.
//!
//! Loaded once at startup from a TOML file of `[indicators.<ID>]` tables and
//! never mutated afterwards. All validation happens here (field presence,
//! id/key agreement, time and importance syntax, pattern grammar, anchor
//! existence, anchor-cycle detection, and external-schedule keys) so that
//! query-time evaluation is total and error-free.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::NaiveTime;
use thiserror::Error;

use crate::types::Importance;

use super::pattern::{PatternDefaults, PatternError, ReleasePattern};
use super::schedule_source::ScheduleSource;

/// Static descriptor for one economic indicator, as declared in the calendar
/// file. Immutable after load.
#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorDescriptor {
    /// Unique key, e.g. "NFP".
    pub id: String,
    /// Human-readable label, e.g. "Nonfarm Payrolls".
    pub name: String,
    /// Issuing agency code, e.g. "BLS".
    pub source: String,
    /// Series identifier used against the agency's API. Opaque here.
    pub series_id: String,
    /// The raw pattern string as written in the calendar file.
    pub release_pattern: String,
    /// The parsed pattern the evaluator works over.
    pub pattern: ReleasePattern,
    /// Local clock time the release is expected.
    pub release_time: NaiveTime,
    pub importance: Importance,
}

/// Malformed calendar configuration. Always fatal to startup: the process
/// must not run with a partially valid calendar.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read calendar file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("calendar file is not valid TOML: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("calendar file has no [indicators] table")]
    MissingIndicatorsTable,
    #[error("indicator '{id}' entry is not a table")]
    NotATable { id: String },
    #[error("indicator '{id}' is missing required field '{field}'")]
    MissingField { id: String, field: &'static str },
    #[error("indicator '{id}' field '{field}' must be a string")]
    FieldNotAString { id: String, field: &'static str },
    #[error("indicator key '{key}' does not match its id field '{id}'")]
    IdMismatch { key: String, id: String },
    #[error("duplicate indicator id '{0}'")]
    DuplicateId(String),
    #[error("indicator '{id}' has invalid release_time '{value}' (expected H:MM or HH:MM, 24-hour)")]
    InvalidTime { id: String, value: String },
    #[error("indicator '{id}' has invalid importance '{value}' (expected low, medium, or high)")]
    InvalidImportance { id: String, value: String },
    #[error("indicator '{id}' has unparseable release_pattern '{value}': {reason}")]
    InvalidPattern {
        id: String,
        value: String,
        #[source]
        reason: PatternError,
    },
    #[error("indicator '{id}' references unknown anchor indicator '{anchor}'")]
    UnknownAnchor { id: String, anchor: String },
    #[error("indicator '{id}' references unknown external schedule '{key}'")]
    UnknownSchedule { id: String, key: String },
    #[error("circular release-pattern reference: {0}")]
    CircularReference(String),
}

/// Lookup of an indicator id that is not in the store. Recoverable by the
/// caller (skip and log), unlike [`ConfigError`].
#[derive(Debug, Clone, Error)]
#[error("unknown indicator id '{0}'")]
pub struct NotFoundError(pub String);

/// Immutable, insertion-ordered catalog of indicator descriptors.
#[derive(Debug)]
pub struct CalendarStore {
    indicators: Vec<Arc<IndicatorDescriptor>>,
    by_id: HashMap<String, usize>,
    /// id -> pattern map handed to the evaluator for anchor resolution.
    patterns: HashMap<String, ReleasePattern>,
}

const REQUIRED_FIELDS: [&str; 7] = [
    "id",
    "name",
    "source",
    "series_id",
    "release_pattern",
    "release_time",
    "importance",
];

impl CalendarStore {
    /// Load and validate a calendar file.
    pub fn load_from_path(
        path: &Path,
        defaults: &PatternDefaults,
        schedules: &dyn ScheduleSource,
    ) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::load_from_str(&text, defaults, schedules)
    }

    /// Load and validate calendar TOML from a string. Iteration order of the
    /// resulting store matches the order entries appear in the document.
    pub fn load_from_str(
        text: &str,
        defaults: &PatternDefaults,
        schedules: &dyn ScheduleSource,
    ) -> Result<Self, ConfigError> {
        let root: toml::Table = toml::from_str(text)?;
        let table = root
            .get("indicators")
            .and_then(toml::Value::as_table)
            .ok_or(ConfigError::MissingIndicatorsTable)?;

        let mut indicators = Vec::with_capacity(table.len());
        let mut by_id = HashMap::with_capacity(table.len());
        let mut patterns = HashMap::with_capacity(table.len());

        for (key, value) in table {
            let entry = value.as_table().ok_or_else(|| ConfigError::NotATable {
                id: key.clone(),
            })?;
            let descriptor = parse_descriptor(key, entry, defaults)?;

            if by_id.contains_key(&descriptor.id) {
                return Err(ConfigError::DuplicateId(descriptor.id));
            }
            patterns.insert(descriptor.id.clone(), descriptor.pattern.clone());
            by_id.insert(descriptor.id.clone(), indicators.len());
            indicators.push(Arc::new(descriptor));
        }

        let store = Self {
            indicators,
            by_id,
            patterns,
        };
        store.validate_references(schedules)?;
        store.validate_acyclic()?;
        Ok(store)
    }

    /// Every anchor must name a known indicator; every external key must be
    /// known to the injected schedule provider. Checked up front so the full
    /// dependency graph is sound before any query runs.
    fn validate_references(&self, schedules: &dyn ScheduleSource) -> Result<(), ConfigError> {
        for descriptor in &self.indicators {
            if let Some(anchor) = descriptor.pattern.anchor() {
                if !self.by_id.contains_key(anchor) {
                    return Err(ConfigError::UnknownAnchor {
                        id: descriptor.id.clone(),
                        anchor: anchor.to_string(),
                    });
                }
            }
            if let Some(key) = descriptor.pattern.external_key() {
                if schedules.dates_for(key).is_none() {
                    return Err(ConfigError::UnknownSchedule {
                        id: descriptor.id.clone(),
                        key: key.to_string(),
                    });
                }
            }
        }
        Ok(())
    }

    /// Depth-first walk over the anchor graph. Any back-edge is a cycle and
    /// rejects the whole calendar.
    fn validate_acyclic(&self) -> Result<(), ConfigError> {
        for start in self.patterns.keys() {
            let mut trail: Vec<&str> = Vec::new();
            let mut current = start.as_str();
            loop {
                if trail.contains(&current) {
                    trail.push(current);
                    return Err(ConfigError::CircularReference(trail.join(" -> ")));
                }
                trail.push(current);
                match self.patterns.get(current).and_then(ReleasePattern::anchor) {
                    Some(next) => current = next,
                    None => break,
                }
            }
        }
        Ok(())
    }

    /// Fetch a descriptor by id.
    pub fn get(&self, id: &str) -> Result<&Arc<IndicatorDescriptor>, NotFoundError> {
        self.by_id
            .get(id)
            .map(|&idx| &self.indicators[idx])
            .ok_or_else(|| NotFoundError(id.to_string()))
    }

    /// All descriptors, in calendar-file insertion order.
    pub fn all(&self) -> impl Iterator<Item = &Arc<IndicatorDescriptor>> {
        self.indicators.iter()
    }

    pub fn len(&self) -> usize {
        self.indicators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indicators.is_empty()
    }

    /// The id -> pattern map, for the evaluator's anchor lookups.
    pub fn patterns(&self) -> &HashMap<String, ReleasePattern> {
        &self.patterns
    }
}

fn string_field<'a>(
    entry: &'a toml::Table,
    key: &str,
    name: &'static str,
) -> Result<&'a str, ConfigError> {
    let value = entry.get(name).ok_or(ConfigError::MissingField {
        id: key.to_string(),
        field: name,
    })?;
    value.as_str().ok_or(ConfigError::FieldNotAString {
        id: key.to_string(),
        field: name,
    })
}

fn parse_descriptor(
    key: &str,
    entry: &toml::Table,
    defaults: &PatternDefaults,
) -> Result<IndicatorDescriptor, ConfigError> {
    // Surface the first missing field deterministically, in declared order.
    for name in REQUIRED_FIELDS {
        string_field(entry, key, name)?;
    }

    let id = string_field(entry, key, "id")?;
    if id != key {
        return Err(ConfigError::IdMismatch {
            key: key.to_string(),
            id: id.to_string(),
        });
    }

    let time_text = string_field(entry, key, "release_time")?;
    let release_time = parse_release_time(time_text).ok_or_else(|| ConfigError::InvalidTime {
        id: id.to_string(),
        value: time_text.to_string(),
    })?;

    let importance_text = string_field(entry, key, "importance")?;
    let importance =
        Importance::parse(importance_text).ok_or_else(|| ConfigError::InvalidImportance {
            id: id.to_string(),
            value: importance_text.to_string(),
        })?;

    let pattern_text = string_field(entry, key, "release_pattern")?;
    let pattern =
        ReleasePattern::parse(pattern_text, defaults).map_err(|reason| {
            ConfigError::InvalidPattern {
                id: id.to_string(),
                value: pattern_text.to_string(),
                reason,
            }
        })?;

    Ok(IndicatorDescriptor {
        id: id.to_string(),
        name: string_field(entry, key, "name")?.to_string(),
        source: string_field(entry, key, "source")?.to_string(),
        series_id: string_field(entry, key, "series_id")?.to_string(),
        release_pattern: pattern_text.to_string(),
        pattern,
        release_time,
        importance,
    })
}

/// "8:30" or "08:30", 24-hour. Hand-parsed so single-digit hours are accepted
/// without format-string ambiguity.
fn parse_release_time(text: &str) -> Option<NaiveTime> {
    let (hours, minutes) = text.split_once(':')?;
    if minutes.len() != 2 || hours.is_empty() || hours.len() > 2 {
        return None;
    }
    let h: u32 = hours.parse().ok()?;
    let m: u32 = minutes.parse().ok()?;
    NaiveTime::from_hms_opt(h, m, 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::schedule_source::{NoExternalSchedules, StaticScheduleSource};

    const GOOD: &str = r#"
[indicators.NFP]
id = "NFP"
name = "Nonfarm Payrolls"
source = "BLS"
series_id = "CES0000000001"
release_pattern = "1st friday"
release_time = "8:30"
importance = "high"

[indicators.ADP]
id = "ADP"
name = "ADP Employment"
source = "ADP"
series_id = "ADPMNUSNERSA"
release_pattern = "wed_before_nfp"
release_time = "8:15"
importance = "medium"
"#;

    fn load(text: &str) -> Result<CalendarStore, ConfigError> {
        CalendarStore::load_from_str(text, &PatternDefaults::default(), &NoExternalSchedules)
    }

    #[test]
    fn loads_valid_calendar_in_order() {
        let store = load(GOOD).unwrap();
        assert_eq!(store.len(), 2);
        let ids: Vec<&str> = store.all().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, ["NFP", "ADP"]);
    }

    #[test]
    fn round_trips_descriptor_fields() {
        let store = load(GOOD).unwrap();
        let nfp = store.get("NFP").unwrap();
        assert_eq!(nfp.name, "Nonfarm Payrolls");
        assert_eq!(nfp.source, "BLS");
        assert_eq!(nfp.series_id, "CES0000000001");
        assert_eq!(nfp.release_pattern, "1st friday");
        assert_eq!(nfp.release_time, NaiveTime::from_hms_opt(8, 30, 0).unwrap());
        assert_eq!(nfp.importance, Importance::High);
    }

    #[test]
    fn unknown_id_is_not_found() {
        let store = load(GOOD).unwrap();
        assert!(store.get("CPI").is_err());
    }

    #[test]
    fn missing_field_rejected() {
        let text = r#"
[indicators.NFP]
id = "NFP"
name = "Nonfarm Payrolls"
source = "BLS"
release_pattern = "1st friday"
release_time = "8:30"
importance = "high"
"#;
        assert!(matches!(
            load(text),
            Err(ConfigError::MissingField { field: "series_id", .. })
        ));
    }

    #[test]
    fn id_key_mismatch_rejected() {
        let text = GOOD.replace("id = \"ADP\"", "id = \"ADQ\"");
        assert!(matches!(load(&text), Err(ConfigError::IdMismatch { .. })));
    }

    #[test]
    fn bad_time_rejected() {
        for bad in ["25:00", "8:3", "830", "8:300", ""] {
            let text = GOOD.replace("release_time = \"8:30\"", &format!("release_time = \"{bad}\""));
            assert!(
                matches!(load(&text), Err(ConfigError::InvalidTime { .. })),
                "should reject time {bad:?}"
            );
        }
    }

    #[test]
    fn bad_importance_rejected() {
        let text = GOOD.replace("importance = \"high\"", "importance = \"critical\"");
        assert!(matches!(load(&text), Err(ConfigError::InvalidImportance { .. })));
    }

    #[test]
    fn unknown_pattern_rejected_at_load() {
        let text = GOOD.replace("release_pattern = \"1st friday\"", "release_pattern = \"whenever\"");
        assert!(matches!(load(&text), Err(ConfigError::InvalidPattern { .. })));
    }

    #[test]
    fn unknown_anchor_rejected() {
        let text = GOOD.replace("wed_before_nfp", "wed_before_cpi");
        assert!(matches!(load(&text), Err(ConfigError::UnknownAnchor { .. })));
    }

    #[test]
    fn anchor_cycle_rejected() {
        let text = r#"
[indicators.A]
id = "A"
name = "A"
source = "X"
series_id = "S1"
release_pattern = "wed_before_b"
release_time = "8:30"
importance = "medium"

[indicators.B]
id = "B"
name = "B"
source = "X"
series_id = "S2"
release_pattern = "thu_before_a"
release_time = "8:30"
importance = "medium"
"#;
        assert!(matches!(load(text), Err(ConfigError::CircularReference(_))));
    }

    #[test]
    fn unknown_external_schedule_rejected() {
        let text = r#"
[indicators.FOMC]
id = "FOMC"
name = "FOMC Rate Decision"
source = "FED"
series_id = "FEDFUNDS"
release_pattern = "fomc_schedule"
release_time = "14:00"
importance = "high"
"#;
        assert!(matches!(load(text), Err(ConfigError::UnknownSchedule { .. })));
        // Same calendar loads once the provider knows the key.
        let schedules = StaticScheduleSource::with_fomc_meetings();
        let store =
            CalendarStore::load_from_str(text, &PatternDefaults::default(), &schedules).unwrap();
        assert_eq!(store.len(), 1);
    }
}
