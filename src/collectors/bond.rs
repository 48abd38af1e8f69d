//! Fixed-income collector: treasury yields, curve spreads, credit proxies.
//!
//! Yield tickers quote in percent (^TNX = 10Y yield x1 for the CBOE index
//! family); spreads are computed locally from whichever legs were fetched
//! successfully.

use async_trait::async_trait;
use tracing::warn;

use crate::types::{AssetClass, BondSnapshot, CurveSpread, MarketQuote};

use super::market::MarketDataCollector;
use super::{CollectError, Collector};

const TREASURY_SYMBOLS: &[(&str, &str)] = &[
    ("US2Y", "^IRX"),
    ("US5Y", "^FVX"),
    ("US10Y", "^TNX"),
    ("US30Y", "^TYX"),
];

const CREDIT_SYMBOLS: &[(&str, &str)] = &[
    ("IG_CORPS", "LQD"),
    ("HY_CORPS", "HYG"),
    ("EM_BONDS", "EMB"),
    ("TIPS", "TIP"),
];

/// Curve spreads as `(name, long leg, short leg)`; value = long - short.
const SPREAD_LEGS: &[(&str, &str, &str)] = &[
    ("2s10s", "US10Y", "US2Y"),
    ("5s30s", "US30Y", "US5Y"),
];

pub struct BondCollector {
    http: reqwest::Client,
    chart_base_url: String,
}

impl BondCollector {
    pub fn new(http: reqwest::Client, chart_base_url: String) -> Self {
        Self {
            http,
            chart_base_url,
        }
    }

    async fn fetch_group(
        &self,
        symbols: &[(&str, &str)],
        asset_class: AssetClass,
    ) -> Vec<MarketQuote> {
        let mut quotes = Vec::with_capacity(symbols.len());
        for &(name, ticker) in symbols {
            match MarketDataCollector::fetch_quote(
                &self.http,
                &self.chart_base_url,
                name,
                ticker,
                asset_class,
            )
            .await
            {
                Ok(quote) => quotes.push(quote),
                Err(e) => warn!(symbol = name, error = %e, "Failed to fetch quote, skipping"),
            }
        }
        quotes
    }
}

#[async_trait]
impl Collector for BondCollector {
    type Output = BondSnapshot;

    fn name(&self) -> &'static str {
        "bond"
    }

    async fn collect(&self) -> Result<Self::Output, CollectError> {
        let rates = self.fetch_group(TREASURY_SYMBOLS, AssetClass::Treasury).await;
        let credit = self.fetch_group(CREDIT_SYMBOLS, AssetClass::Credit).await;

        if rates.is_empty() && credit.is_empty() {
            return Err(CollectError::NoData("all bond symbols".to_string()));
        }

        let spreads = compute_spreads(&rates);
        Ok(BondSnapshot {
            rates,
            spreads,
            credit,
        })
    }
}

fn compute_spreads(rates: &[MarketQuote]) -> Vec<CurveSpread> {
    let level = |name: &str| rates.iter().find(|q| q.name == name).map(|q| q.price);
    SPREAD_LEGS
        .iter()
        .filter_map(|&(name, long, short)| {
            let (long, short) = (level(long)?, level(short)?);
            Some(CurveSpread {
                name: name.to_string(),
                value: long - short,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn quote(name: &str, price: f64) -> MarketQuote {
        MarketQuote {
            name: name.to_string(),
            symbol: name.to_string(),
            asset_class: AssetClass::Treasury,
            price,
            change_percent: 0.0,
            previous_close: price,
            collected_at: Utc::now(),
        }
    }

    #[test]
    fn spreads_computed_from_available_legs() {
        let rates = vec![quote("US2Y", 3.85), quote("US10Y", 4.25)];
        let spreads = compute_spreads(&rates);
        assert_eq!(spreads.len(), 1);
        assert_eq!(spreads[0].name, "2s10s");
        assert!((spreads[0].value - 0.40).abs() < 1e-9);
    }

    #[test]
    fn missing_leg_drops_spread() {
        let rates = vec![quote("US10Y", 4.25)];
        assert!(compute_spreads(&rates).is_empty());
    }
}
