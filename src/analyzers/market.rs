//! Market regime classification from configured thresholds.

use serde::{Deserialize, Serialize};

use crate::config::AnalysisConfig;
use crate::types::{AssetClass, BondSnapshot, MarketQuote};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VolatilityRegime {
    Low,
    Normal,
    Elevated,
    High,
    Unknown,
}

impl VolatilityRegime {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Normal => "normal",
            Self::Elevated => "elevated",
            Self::High => "high",
            Self::Unknown => "unknown",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskEnvironment {
    RiskOn,
    RiskOff,
    Neutral,
}

impl RiskEnvironment {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::RiskOn => "risk-on",
            Self::RiskOff => "risk-off",
            Self::Neutral => "neutral",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CurveState {
    Inverted,
    Flat,
    Normal,
    Unknown,
}

impl CurveState {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Inverted => "inverted",
            Self::Flat => "flat",
            Self::Normal => "normal",
            Self::Unknown => "unknown",
        }
    }
}

/// One-line regime summary for the newsletter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegimeRead {
    pub volatility: VolatilityRegime,
    pub risk: RiskEnvironment,
    pub curve: CurveState,
    /// VIX level the volatility call was made from, when available.
    pub vix_level: Option<f64>,
    /// 2s10s spread the curve call was made from, when available.
    pub curve_spread: Option<f64>,
}

pub struct MarketAnalyzer {
    vix_low: f64,
    vix_elevated: f64,
    vix_high: f64,
    risk_breadth_percent: f64,
    curve_flat_threshold: f64,
}

impl MarketAnalyzer {
    pub fn new(config: &AnalysisConfig) -> Self {
        Self {
            vix_low: config.vix_low,
            vix_elevated: config.vix_elevated,
            vix_high: config.vix_high,
            risk_breadth_percent: config.risk_breadth_percent,
            curve_flat_threshold: config.curve_flat_threshold,
        }
    }

    pub fn classify(&self, quotes: &[MarketQuote], bonds: &BondSnapshot) -> RegimeRead {
        let vix_level = quotes.iter().find(|q| q.name == "VIX").map(|q| q.price);
        let curve_spread = bonds.spread("2s10s");

        RegimeRead {
            volatility: self.volatility_of(vix_level),
            risk: self.risk_of(quotes),
            curve: self.curve_of(curve_spread),
            vix_level,
            curve_spread,
        }
    }

    fn volatility_of(&self, vix: Option<f64>) -> VolatilityRegime {
        let Some(vix) = vix else {
            return VolatilityRegime::Unknown;
        };
        if vix < self.vix_low {
            VolatilityRegime::Low
        } else if vix < self.vix_elevated {
            VolatilityRegime::Normal
        } else if vix < self.vix_high {
            VolatilityRegime::Elevated
        } else {
            VolatilityRegime::High
        }
    }

    /// Breadth read over the equity indices (VIX excluded: it is a fear
    /// gauge, not a risk asset).
    fn risk_of(&self, quotes: &[MarketQuote]) -> RiskEnvironment {
        let changes: Vec<f64> = quotes
            .iter()
            .filter(|q| q.asset_class == AssetClass::Index && q.name != "VIX")
            .map(|q| q.change_percent)
            .collect();
        if changes.is_empty() {
            return RiskEnvironment::Neutral;
        }
        let mean = changes.iter().sum::<f64>() / changes.len() as f64;
        if mean > self.risk_breadth_percent {
            RiskEnvironment::RiskOn
        } else if mean < -self.risk_breadth_percent {
            RiskEnvironment::RiskOff
        } else {
            RiskEnvironment::Neutral
        }
    }

    fn curve_of(&self, spread: Option<f64>) -> CurveState {
        let Some(spread) = spread else {
            return CurveState::Unknown;
        };
        if spread < 0.0 {
            CurveState::Inverted
        } else if spread < self.curve_flat_threshold {
            CurveState::Flat
        } else {
            CurveState::Normal
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::CurveSpread;
    use chrono::Utc;

    fn quote(name: &str, asset_class: AssetClass, price: f64, change: f64) -> MarketQuote {
        MarketQuote {
            name: name.to_string(),
            symbol: name.to_string(),
            asset_class,
            price,
            change_percent: change,
            previous_close: price,
            collected_at: Utc::now(),
        }
    }

    fn analyzer() -> MarketAnalyzer {
        MarketAnalyzer::new(&AnalysisConfig::default())
    }

    #[test]
    fn vix_buckets() {
        let a = analyzer();
        assert_eq!(a.volatility_of(Some(12.0)), VolatilityRegime::Low);
        assert_eq!(a.volatility_of(Some(18.0)), VolatilityRegime::Normal);
        assert_eq!(a.volatility_of(Some(28.0)), VolatilityRegime::Elevated);
        assert_eq!(a.volatility_of(Some(40.0)), VolatilityRegime::High);
        assert_eq!(a.volatility_of(None), VolatilityRegime::Unknown);
    }

    #[test]
    fn broad_selloff_reads_risk_off() {
        let a = analyzer();
        let quotes = vec![
            quote("SPX", AssetClass::Index, 6400.0, -1.2),
            quote("NDX", AssetClass::Index, 20300.0, -1.8),
            quote("VIX", AssetClass::Index, 31.0, 15.0), // excluded from breadth
        ];
        let read = a.classify(&quotes, &BondSnapshot::default());
        assert_eq!(read.risk, RiskEnvironment::RiskOff);
        assert_eq!(read.volatility, VolatilityRegime::Elevated);
    }

    #[test]
    fn inverted_curve_detected() {
        let a = analyzer();
        let bonds = BondSnapshot {
            rates: Vec::new(),
            spreads: vec![CurveSpread {
                name: "2s10s".to_string(),
                value: -0.35,
            }],
            credit: Vec::new(),
        };
        let read = a.classify(&[], &bonds);
        assert_eq!(read.curve, CurveState::Inverted);
        assert_eq!(read.risk, RiskEnvironment::Neutral);
    }
}
