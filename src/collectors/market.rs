//! Market data collector: equity indices, FX, and commodity futures.
//!
//! Quotes come from a v8 chart endpoint (`/chart/{ticker}`); only the meta
//! block is read (last trade and prior close) since the newsletter needs
//! levels and day-over-day change, not candles.

use async_trait::async_trait;
use chrono::Utc;
use serde::Deserialize;
use tracing::warn;

use crate::types::{AssetClass, MarketQuote};

use super::{CollectError, Collector};

/// Tracked symbols: `(internal name, vendor ticker, asset class)`.
const MARKET_SYMBOLS: &[(&str, &str, AssetClass)] = &[
    // Indices
    ("SPX", "^GSPC", AssetClass::Index),
    ("NDX", "^IXIC", AssetClass::Index),
    ("DJI", "^DJI", AssetClass::Index),
    ("RUT", "^RUT", AssetClass::Index),
    ("VIX", "^VIX", AssetClass::Index),
    // FX
    ("DXY", "DX-Y.NYB", AssetClass::Fx),
    ("EURUSD", "EUR=X", AssetClass::Fx),
    ("USDJPY", "JPY=X", AssetClass::Fx),
    ("GBPUSD", "GBP=X", AssetClass::Fx),
    // Commodities
    ("GOLD", "GC=F", AssetClass::Commodity),
    ("OIL", "CL=F", AssetClass::Commodity),
    ("COPPER", "HG=F", AssetClass::Commodity),
    ("NATGAS", "NG=F", AssetClass::Commodity),
];

pub struct MarketDataCollector {
    http: reqwest::Client,
    chart_base_url: String,
}

impl MarketDataCollector {
    pub fn new(http: reqwest::Client, chart_base_url: String) -> Self {
        Self {
            http,
            chart_base_url,
        }
    }

    /// Fetch one quote. Shared with the bond collector, which tracks
    /// different tickers through the same endpoint.
    pub(crate) async fn fetch_quote(
        http: &reqwest::Client,
        base_url: &str,
        name: &str,
        ticker: &str,
        asset_class: AssetClass,
    ) -> Result<MarketQuote, CollectError> {
        let url = format!("{base_url}/{ticker}");
        let response = http
            .get(&url)
            .query(&[("range", "5d"), ("interval", "1d")])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(CollectError::Status {
                source_name: "chart",
                status: response.status(),
            });
        }

        let payload: ChartResponse = response.json().await?;
        let result = payload
            .chart
            .result
            .and_then(|mut results| {
                if results.is_empty() {
                    None
                } else {
                    Some(results.swap_remove(0))
                }
            })
            .ok_or_else(|| CollectError::NoData(name.to_string()))?;

        let meta = result.meta;
        let price = meta
            .regular_market_price
            .ok_or_else(|| CollectError::NoData(name.to_string()))?;
        let previous_close = meta
            .chart_previous_close
            .or(meta.previous_close)
            .ok_or_else(|| CollectError::NoData(name.to_string()))?;

        let change_percent = if previous_close.abs() > f64::EPSILON {
            (price / previous_close - 1.0) * 100.0
        } else {
            0.0
        };

        Ok(MarketQuote {
            name: name.to_string(),
            symbol: ticker.to_string(),
            asset_class,
            price,
            change_percent,
            previous_close,
            collected_at: Utc::now(),
        })
    }
}

#[async_trait]
impl Collector for MarketDataCollector {
    type Output = Vec<MarketQuote>;

    fn name(&self) -> &'static str {
        "market"
    }

    /// Collect quotes across all tracked asset classes. Per-symbol failures
    /// are logged and skipped.
    async fn collect(&self) -> Result<Self::Output, CollectError> {
        let mut quotes = Vec::with_capacity(MARKET_SYMBOLS.len());
        for &(name, ticker, asset_class) in MARKET_SYMBOLS {
            match Self::fetch_quote(&self.http, &self.chart_base_url, name, ticker, asset_class)
                .await
            {
                Ok(quote) => quotes.push(quote),
                Err(e) => warn!(symbol = name, error = %e, "Failed to fetch quote, skipping"),
            }
        }
        if quotes.is_empty() {
            return Err(CollectError::NoData("all market symbols".to_string()));
        }
        Ok(quotes)
    }
}

// ============================================================================
// Wire format (subset of the chart payload)
// ============================================================================

#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: Chart,
}

#[derive(Debug, Deserialize)]
struct Chart {
    result: Option<Vec<ChartResult>>,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    meta: ChartMeta,
}

#[derive(Debug, Deserialize)]
struct ChartMeta {
    #[serde(rename = "regularMarketPrice")]
    regular_market_price: Option<f64>,
    #[serde(rename = "chartPreviousClose")]
    chart_previous_close: Option<f64>,
    #[serde(rename = "previousClose")]
    previous_close: Option<f64>,
}
