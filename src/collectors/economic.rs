//! Economic release collector.
//!
//! Consults the schedule resolver for the indicators due on the cycle date,
//! then fetches each one's latest observation from its issuing agency:
//! FRED (`series/observations`, GET) or BLS (`timeseries/data`, POST).
//! Per-release failures are logged and skipped so one flaky API never empties
//! the whole section.

use std::sync::Arc;

use chrono::{Datelike, NaiveDate, Utc};
use serde::Deserialize;
use tracing::{info, warn};

use crate::calendar::{ReleaseEvent, ScheduleResolver};
use crate::config::defaults::{ENV_BLS_API_KEY, ENV_FRED_API_KEY};
use crate::types::ReleaseObservation;

use super::CollectError;

pub struct EconomicDataCollector {
    http: reqwest::Client,
    resolver: Arc<ScheduleResolver>,
    fred_base_url: String,
    bls_base_url: String,
    fred_api_key: Option<String>,
    bls_api_key: Option<String>,
}

impl EconomicDataCollector {
    pub fn new(
        http: reqwest::Client,
        resolver: Arc<ScheduleResolver>,
        fred_base_url: String,
        bls_base_url: String,
    ) -> Self {
        Self {
            http,
            resolver,
            fred_base_url,
            bls_base_url,
            fred_api_key: std::env::var(ENV_FRED_API_KEY).ok(),
            bls_api_key: std::env::var(ENV_BLS_API_KEY).ok(),
        }
    }

    /// Fetch observations for every indicator due on `date`.
    ///
    /// Returns the observations that could be fetched; an empty vec with no
    /// releases due is a perfectly normal day.
    pub async fn collect_due(&self, date: NaiveDate) -> Vec<ReleaseObservation> {
        let due = self.resolver.due_on(date);
        if due.is_empty() {
            info!(%date, "No releases scheduled");
            return Vec::new();
        }

        let mut observations = Vec::with_capacity(due.len());
        for event in &due {
            match self.collect_release(event).await {
                Ok(obs) => observations.push(obs),
                Err(e) => {
                    warn!(
                        indicator = %event.indicator_id,
                        error = %e,
                        "Failed to collect release, skipping"
                    );
                }
            }
        }
        info!(
            %date,
            due = due.len(),
            collected = observations.len(),
            "Economic release collection complete"
        );
        observations
    }

    async fn collect_release(&self, event: &ReleaseEvent) -> Result<ReleaseObservation, CollectError> {
        let descriptor = &event.descriptor;
        match descriptor.source.as_str() {
            "FRED" => self.collect_from_fred(event).await,
            "BLS" => self.collect_from_bls(event).await,
            other => Err(CollectError::UnknownSource(other.to_string())),
        }
    }

    async fn collect_from_fred(&self, event: &ReleaseEvent) -> Result<ReleaseObservation, CollectError> {
        let api_key = self
            .fred_api_key
            .as_deref()
            .ok_or(CollectError::MissingApiKey(ENV_FRED_API_KEY))?;

        let response = self
            .http
            .get(&self.fred_base_url)
            .query(&[
                ("series_id", event.descriptor.series_id.as_str()),
                ("api_key", api_key),
                ("file_type", "json"),
                ("sort_order", "desc"),
                ("limit", "2"),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(CollectError::Status {
                source_name: "FRED",
                status: response.status(),
            });
        }

        let payload: FredResponse = response.json().await?;
        let mut values = payload.observations.iter().filter_map(|obs| {
            // FRED reports missing values as ".".
            obs.value.parse::<f64>().ok().map(|v| (obs.date.clone(), v))
        });
        let (period, value) = values
            .next()
            .ok_or_else(|| CollectError::NoData(event.indicator_id.clone()))?;
        let previous = values.next().map(|(_, v)| v);

        Ok(ReleaseObservation {
            indicator_id: event.indicator_id.clone(),
            value,
            previous,
            expected: None,
            period,
            source: "FRED".to_string(),
            collected_at: Utc::now(),
        })
    }

    async fn collect_from_bls(&self, event: &ReleaseEvent) -> Result<ReleaseObservation, CollectError> {
        let year = event.scheduled_date.year();
        let mut body = serde_json::json!({
            "seriesid": [event.descriptor.series_id],
            "startyear": (year - 1).to_string(),
            "endyear": year.to_string(),
        });
        if let Some(key) = self.bls_api_key.as_deref() {
            body["registrationkey"] = serde_json::Value::from(key);
        }

        let response = self.http.post(&self.bls_base_url).json(&body).send().await?;
        if !response.status().is_success() {
            return Err(CollectError::Status {
                source_name: "BLS",
                status: response.status(),
            });
        }

        let payload: BlsResponse = response.json().await?;
        let series = payload
            .results
            .series
            .into_iter()
            .next()
            .ok_or_else(|| CollectError::NoData(event.indicator_id.clone()))?;

        let mut points = series.data.iter().filter_map(|point| {
            point
                .value
                .parse::<f64>()
                .ok()
                .map(|v| (format!("{}-{}", point.year, point.period), v))
        });
        let (period, value) = points
            .next()
            .ok_or_else(|| CollectError::NoData(event.indicator_id.clone()))?;
        let previous = points.next().map(|(_, v)| v);

        Ok(ReleaseObservation {
            indicator_id: event.indicator_id.clone(),
            value,
            previous,
            expected: None,
            period,
            source: "BLS".to_string(),
            collected_at: Utc::now(),
        })
    }
}

// ============================================================================
// Wire formats
// ============================================================================

#[derive(Debug, Deserialize)]
struct FredResponse {
    observations: Vec<FredObservation>,
}

#[derive(Debug, Deserialize)]
struct FredObservation {
    date: String,
    value: String,
}

#[derive(Debug, Deserialize)]
struct BlsResponse {
    #[serde(rename = "Results")]
    results: BlsResults,
}

#[derive(Debug, Deserialize)]
struct BlsResults {
    series: Vec<BlsSeries>,
}

#[derive(Debug, Deserialize)]
struct BlsSeries {
    data: Vec<BlsDataPoint>,
}

#[derive(Debug, Deserialize)]
struct BlsDataPoint {
    year: String,
    period: String,
    value: String,
}
