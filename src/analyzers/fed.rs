//! Hawkish-dovish scoring of Federal Reserve communications.
//!
//! Weighted keyword dictionaries produce a score in [-1, 1] (dovish to
//! hawkish) with a confidence derived from term density. Deliberately simple
//! and fully deterministic; the dictionaries carry the domain knowledge.

use serde::{Deserialize, Serialize};

use crate::config::{find_speaker, SpeakerBias, SpeakerWeight};
use crate::types::FedCommunication;

/// Hawkish phrases and their weights.
const HAWKISH_TERMS: &[(&str, f64)] = &[
    ("inflation risk", 2.0),
    ("price stability", 1.5),
    ("vigilant", 1.5),
    ("restrictive", 2.0),
    ("higher rates", 1.5),
    ("upside risk", 1.0),
    ("tightening", 1.0),
];

/// Dovish phrases and their (negative) weights.
const DOVISH_TERMS: &[(&str, f64)] = &[
    ("patient", -1.0),
    ("accommodative", -2.0),
    ("gradual", -1.0),
    ("downside risk", -1.0),
    ("carefully", -0.5),
    ("mindful", -0.5),
    ("rate cut", -1.0),
];

/// Theme buckets for the newsletter's "key themes" line. A theme registers
/// when its keywords appear at least twice in total.
const THEME_GROUPS: &[(&str, &[&str])] = &[
    ("inflation", &["inflation", "price stability", "prices"]),
    ("labor market", &["employment", "labor", "jobs", "wage"]),
    ("growth", &["growth", "gdp", "economic activity"]),
    (
        "financial stability",
        &["financial stability", "banking", "credit conditions"],
    ),
    (
        "policy path",
        &["rate cut", "rate hike", "restrictive", "accommodative", "federal funds"],
    ),
];

/// Overall lean of a communication.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PolicyBias {
    Hawkish,
    Dovish,
    Neutral,
}

impl PolicyBias {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Hawkish => "hawkish",
            Self::Dovish => "dovish",
            Self::Neutral => "neutral",
        }
    }
}

/// Scored view of one Fed communication.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FedReading {
    /// -1 (very dovish) to 1 (very hawkish).
    pub hawkish_score: f64,
    /// 0 to 1, scaled by how many scored terms the text contained.
    pub confidence: f64,
    pub policy_bias: PolicyBias,
    pub key_themes: Vec<String>,
    /// Institutional weight of the speaker, when the roster knows them.
    pub speaker_weight: Option<SpeakerWeight>,
    /// The speaker's historical lean, as prior context for the reader.
    pub speaker_prior: Option<SpeakerBias>,
}

pub struct FedAnalyzer {
    /// |score| above this reads hawkish/dovish rather than neutral.
    bias_threshold: f64,
}

impl FedAnalyzer {
    pub fn new(bias_threshold: f64) -> Self {
        Self { bias_threshold }
    }

    pub fn analyze(&self, communication: &FedCommunication) -> FedReading {
        // Title plus summary is what the feeds give us without fetching the
        // full text; the dictionaries are short enough that this works.
        let text = format!("{} {}", communication.title, communication.summary)
            .to_ascii_lowercase();

        let (score, confidence) = score_text(&text);
        let roster_entry = find_speaker(&communication.speaker);

        FedReading {
            hawkish_score: score,
            confidence,
            policy_bias: self.bias_of(score, confidence),
            key_themes: themes_of(&text),
            speaker_weight: roster_entry.map(|s| s.weight),
            speaker_prior: roster_entry.map(|s| s.bias),
        }
    }

    fn bias_of(&self, score: f64, confidence: f64) -> PolicyBias {
        if confidence <= f64::EPSILON || score.abs() < self.bias_threshold {
            PolicyBias::Neutral
        } else if score > 0.0 {
            PolicyBias::Hawkish
        } else {
            PolicyBias::Dovish
        }
    }
}

/// Weighted average of matched terms, clipped to [-1, 1]; confidence scales
/// linearly up to ten matched terms.
fn score_text(lower_text: &str) -> (f64, f64) {
    let mut total_score = 0.0;
    let mut total_matches = 0usize;

    for &(term, weight) in HAWKISH_TERMS.iter().chain(DOVISH_TERMS) {
        let count = lower_text.matches(term).count();
        total_score += count as f64 * weight;
        total_matches += count;
    }

    let score = (total_score / total_matches.max(1) as f64).clamp(-1.0, 1.0);
    let confidence = (total_matches as f64 / 10.0).min(1.0);
    (score, confidence)
}

fn themes_of(lower_text: &str) -> Vec<String> {
    THEME_GROUPS
        .iter()
        .filter(|(_, keywords)| {
            keywords
                .iter()
                .map(|k| lower_text.matches(k).count())
                .sum::<usize>()
                >= 2
        })
        .map(|(theme, _)| (*theme).to_string())
        .collect()
}
