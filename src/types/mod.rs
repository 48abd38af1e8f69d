//! Shared domain types for collection and analysis.
//!
//! Calendar-specific types (descriptors, patterns, release events) live in
//! [`crate::calendar`]; this module holds the value objects that flow between
//! collectors, analyzers, storage, and the newsletter renderer.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

// ============================================================================
// Importance
// ============================================================================

/// Coarse priority tier for an economic indicator.
///
/// Ordered so that `Low < Medium < High`, which lets callers filter with a
/// plain comparison (`importance >= min`). Source calendars currently only
/// use `medium` and `high`; `low` exists for completeness.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Importance {
    Low,
    Medium,
    High,
}

impl Importance {
    /// Parse the calendar-file spelling (`"low"`, `"medium"`, `"high"`).
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "low" => Some(Self::Low),
            "medium" => Some(Self::Medium),
            "high" => Some(Self::High),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

impl std::fmt::Display for Importance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Economic releases
// ============================================================================

/// A single observed value for an economic indicator, as fetched from the
/// issuing agency's API on (or after) its release date.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReleaseObservation {
    /// Calendar indicator id this observation belongs to (e.g. "NFP").
    pub indicator_id: String,
    /// Latest published value.
    pub value: f64,
    /// Prior period's value, when the API returns one.
    pub previous: Option<f64>,
    /// Consensus expectation. Not available from FRED/BLS; populated by an
    /// external expectations source when one is wired in.
    pub expected: Option<f64>,
    /// Reference period label as reported by the source ("2026-07", "M07").
    pub period: String,
    /// Issuing agency code ("FRED", "BLS").
    pub source: String,
    /// When this observation was collected.
    pub collected_at: DateTime<Utc>,
}

// ============================================================================
// Market data
// ============================================================================

/// Broad asset-class bucket for a quoted symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetClass {
    Index,
    Fx,
    Commodity,
    Treasury,
    Credit,
}

impl AssetClass {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Index => "indices",
            Self::Fx => "fx",
            Self::Commodity => "commodities",
            Self::Treasury => "treasuries",
            Self::Credit => "credit",
        }
    }
}

/// Latest price snapshot for a tracked market symbol.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketQuote {
    /// Internal name ("SPX", "US10Y"), not the vendor ticker.
    pub name: String,
    /// Vendor ticker the quote was fetched under ("^GSPC").
    pub symbol: String,
    pub asset_class: AssetClass,
    pub price: f64,
    /// Percent change vs the prior close.
    pub change_percent: f64,
    pub previous_close: f64,
    pub collected_at: DateTime<Utc>,
}

/// Fixed-income snapshot: treasury yields, curve spreads, credit proxies.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BondSnapshot {
    /// Treasury yield quotes (US2Y, US5Y, US10Y, US30Y).
    pub rates: Vec<MarketQuote>,
    /// Named curve spreads in percentage points ("2s10s" = 10Y - 2Y).
    pub spreads: Vec<CurveSpread>,
    /// Credit-market ETF proxies (LQD, HYG, EMB, TIP).
    pub credit: Vec<MarketQuote>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurveSpread {
    pub name: String,
    pub value: f64,
}

impl BondSnapshot {
    /// Look up a named spread ("2s10s").
    pub fn spread(&self, name: &str) -> Option<f64> {
        self.spreads.iter().find(|s| s.name == name).map(|s| s.value)
    }
}

// ============================================================================
// Federal Reserve communications
// ============================================================================

/// Kind of Federal Reserve communication, classified from feed metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommunicationType {
    FomcStatement,
    FomcMinutes,
    Testimony,
    Speech,
    Other,
}

impl CommunicationType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::FomcStatement => "FOMC statement",
            Self::FomcMinutes => "FOMC minutes",
            Self::Testimony => "testimony",
            Self::Speech => "speech",
            Self::Other => "other",
        }
    }
}

/// A Federal Reserve communication pulled from the federalreserve.gov feeds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FedCommunication {
    pub title: String,
    /// Speaker name as extracted from the feed item; "Federal Reserve" when
    /// no individual speaker could be identified (statements, minutes).
    pub speaker: String,
    pub url: String,
    pub date: NaiveDate,
    pub kind: CommunicationType,
    /// Feed summary/description with markup stripped. Used for keyword
    /// scoring when the full text is not fetched.
    pub summary: String,
}
