//! Data collectors: FRED/BLS observations, market quotes, treasury yields,
//! and Federal Reserve communications.
//!
//! Each collector owns its HTTP client and knows nothing about the pipeline;
//! the daily cycle calls `collect()` and treats any failure as a degraded
//! (empty) section of the report rather than an aborted run.

pub mod bond;
pub mod economic;
pub mod fed_speech;
pub mod market;

pub use bond::BondCollector;
pub use economic::EconomicDataCollector;
pub use fed_speech::FedSpeechCollector;
pub use market::MarketDataCollector;

use async_trait::async_trait;
use thiserror::Error;

/// Why a collection attempt failed.
#[derive(Debug, Error)]
pub enum CollectError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("{source_name} returned status {status}")]
    Status {
        source_name: &'static str,
        status: reqwest::StatusCode,
    },
    #[error("unparseable {source_name} payload: {detail}")]
    Payload {
        source_name: &'static str,
        detail: String,
    },
    #[error("no usable data for {0}")]
    NoData(String),
    #[error("unknown source code '{0}'")]
    UnknownSource(String),
    #[error("missing API key: set {0}")]
    MissingApiKey(&'static str),
}

/// Common collector seam. `Output` is collector-specific; callers that only
/// need uniform orchestration hold `dyn Collector<Output = T>` per section.
#[async_trait]
pub trait Collector: Send + Sync {
    type Output;

    /// Short tag used in logs ("economic", "market", ...).
    fn name(&self) -> &'static str;

    async fn collect(&self) -> Result<Self::Output, CollectError>;
}

/// Shared HTTP client construction: explicit timeout, rustls, no cookies.
pub fn http_client(timeout_secs: u64) -> Result<reqwest::Client, reqwest::Error> {
    reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(timeout_secs))
        .user_agent(concat!("macro-monitor/", env!("CARGO_PKG_VERSION")))
        .build()
}
