//! Deterministic, rule-based analysis over collected data.
//!
//! Scores are computed from thresholds and keyword weights, never from model
//! output, so identical inputs always produce identical report content. The
//! optional LLM narrative (see [`crate::llm`]) layers prose on top of these
//! numbers; it never produces the numbers themselves.

pub mod fed;
pub mod market;
pub mod release;

pub use fed::{FedAnalyzer, FedReading, PolicyBias};
pub use market::{CurveState, MarketAnalyzer, RegimeRead, RiskEnvironment, VolatilityRegime};
pub use release::{Impact, ReleaseAnalyzer, ReleaseAssessment, Trend};
