//! Economic release scoring: surprise, trend, and impact.

use serde::{Deserialize, Serialize};

use crate::types::ReleaseObservation;

/// Direction of the last few readings for an indicator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Trend {
    Improving,
    Deteriorating,
    Stable,
    InsufficientData,
}

impl Trend {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Improving => "improving",
            Self::Deteriorating => "deteriorating",
            Self::Stable => "stable",
            Self::InsufficientData => "insufficient data",
        }
    }
}

/// Headline read of a release relative to expectations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Impact {
    Positive,
    Negative,
    Neutral,
}

impl Impact {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Positive => "positive",
            Self::Negative => "negative",
            Self::Neutral => "neutral",
        }
    }
}

/// Scored view of one release.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReleaseAssessment {
    /// Standardized surprise vs expectations; 0.0 when no expectation exists.
    pub surprise: f64,
    pub trend: Trend,
    pub impact: Impact,
}

/// Scores releases against expectations and their own recent history.
pub struct ReleaseAnalyzer {
    /// |surprise| below this reads neutral.
    neutral_band: f64,
    /// Dispersion scaling needs at least this many stored surprises.
    min_history: usize,
}

impl ReleaseAnalyzer {
    pub fn new(neutral_band: f64, min_history: usize) -> Self {
        Self {
            neutral_band,
            min_history,
        }
    }

    /// `surprise_history`: past standardized-surprise inputs (actual minus
    /// expected) for this indicator. `recent_values`: the last few published
    /// values, oldest first, for trend detection.
    pub fn analyze(
        &self,
        observation: &ReleaseObservation,
        surprise_history: &[f64],
        recent_values: &[f64],
    ) -> ReleaseAssessment {
        let surprise = self.surprise(observation, surprise_history);
        ReleaseAssessment {
            surprise,
            trend: trend_of(recent_values),
            impact: self.impact(surprise),
        }
    }

    /// Standardized surprise. Scaled by the historical surprise dispersion
    /// when enough history exists; otherwise relative to the expectation
    /// itself. No expectation means no surprise to measure.
    fn surprise(&self, observation: &ReleaseObservation, history: &[f64]) -> f64 {
        let Some(expected) = observation.expected else {
            return 0.0;
        };
        let raw = observation.value - expected;

        if history.len() >= self.min_history {
            let std = std_dev(history);
            if std > f64::EPSILON {
                return raw / std;
            }
        }
        if expected.abs() > f64::EPSILON {
            raw / expected.abs()
        } else {
            0.0
        }
    }

    fn impact(&self, surprise: f64) -> Impact {
        if surprise.abs() < self.neutral_band {
            Impact::Neutral
        } else if surprise > 0.0 {
            Impact::Positive
        } else {
            Impact::Negative
        }
    }
}

/// Least-squares slope over the last three values. The 0.001 flatness band
/// matches the original monitor's tolerance for "stable".
fn trend_of(values: &[f64]) -> Trend {
    if values.len() < 3 {
        return Trend::InsufficientData;
    }
    let window = &values[values.len() - 3..];
    let slope = slope_of(window);
    if slope.abs() < 0.001 {
        Trend::Stable
    } else if slope > 0.0 {
        Trend::Improving
    } else {
        Trend::Deteriorating
    }
}

fn slope_of(values: &[f64]) -> f64 {
    let n = values.len() as f64;
    let mean_x = (n - 1.0) / 2.0;
    let mean_y = values.iter().sum::<f64>() / n;
    let mut num = 0.0;
    let mut den = 0.0;
    for (i, &y) in values.iter().enumerate() {
        let dx = i as f64 - mean_x;
        num += dx * (y - mean_y);
        den += dx * dx;
    }
    if den.abs() < f64::EPSILON {
        0.0
    } else {
        num / den
    }
}

fn std_dev(values: &[f64]) -> f64 {
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    variance.sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn observation(value: f64, expected: Option<f64>) -> ReleaseObservation {
        ReleaseObservation {
            indicator_id: "NFP".to_string(),
            value,
            previous: None,
            expected,
            period: "2026-07".to_string(),
            source: "BLS".to_string(),
            collected_at: Utc::now(),
        }
    }

    fn analyzer() -> ReleaseAnalyzer {
        ReleaseAnalyzer::new(0.5, 4)
    }

    #[test]
    fn no_expectation_means_zero_surprise() {
        let a = analyzer();
        let result = a.analyze(&observation(143.0, None), &[], &[]);
        assert_eq!(result.surprise, 0.0);
        assert_eq!(result.impact, Impact::Neutral);
    }

    #[test]
    fn short_history_falls_back_to_relative_surprise() {
        let a = analyzer();
        // (143 - 169) / 169 ≈ -0.154
        let result = a.analyze(&observation(143.0, Some(169.0)), &[1.0, -2.0], &[]);
        assert!((result.surprise - (143.0 - 169.0) / 169.0).abs() < 1e-9);
    }

    #[test]
    fn long_history_scales_by_dispersion() {
        let a = analyzer();
        let history = [10.0, -10.0, 10.0, -10.0]; // std = 10
        let result = a.analyze(&observation(180.0, Some(160.0)), &history, &[]);
        assert!((result.surprise - 2.0).abs() < 1e-9);
        assert_eq!(result.impact, Impact::Positive);
    }

    #[test]
    fn big_miss_reads_negative() {
        let a = analyzer();
        let history = [10.0, -10.0, 10.0, -10.0];
        let result = a.analyze(&observation(140.0, Some(160.0)), &history, &[]);
        assert_eq!(result.impact, Impact::Negative);
    }

    #[test]
    fn trend_needs_three_points() {
        assert_eq!(trend_of(&[1.0, 2.0]), Trend::InsufficientData);
        assert_eq!(trend_of(&[1.0, 2.0, 3.0]), Trend::Improving);
        assert_eq!(trend_of(&[3.0, 2.0, 1.0]), Trend::Deteriorating);
        assert_eq!(trend_of(&[2.0, 2.0, 2.0]), Trend::Stable);
    }

    #[test]
    fn trend_uses_only_last_three() {
        // Earlier collapse is ignored; the last three rise.
        assert_eq!(trend_of(&[100.0, 1.0, 2.0, 3.0]), Trend::Improving);
    }
}
