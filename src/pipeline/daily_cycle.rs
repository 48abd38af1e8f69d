//! The daily collection cycle: collect -> analyze -> render -> store -> email.
//!
//! Collector failures degrade to empty report sections; only storage faults
//! abort a cycle (a monitor that cannot persist its own history is broken
//! enough to retry from scratch).

use anyhow::Context;
use chrono::{Local, NaiveDate};
use tracing::{info, warn};

use crate::analyzers::{FedAnalyzer, FedReading, MarketAnalyzer, ReleaseAnalyzer, ReleaseAssessment};
use crate::calendar::ReleaseEvent;
use crate::collectors::{
    BondCollector, Collector, EconomicDataCollector, FedSpeechCollector, MarketDataCollector,
};
use crate::llm::ClaudeClient;
use crate::report::{self, EmailNotifier, NewsletterData};
use crate::storage::{MonitorStore, StoredReport};
use crate::types::{BondSnapshot, FedCommunication, MarketQuote, ReleaseObservation};

/// What one cycle did, for logging and the `once` CLI output.
#[derive(Debug)]
pub struct CycleSummary {
    pub date: NaiveDate,
    pub releases_due: usize,
    pub releases_collected: usize,
    pub quotes_collected: usize,
    pub communications: usize,
    pub emailed: bool,
}

pub struct DailyCycle {
    pub resolver: std::sync::Arc<crate::calendar::ScheduleResolver>,
    pub economic: EconomicDataCollector,
    pub market: MarketDataCollector,
    pub bond: BondCollector,
    pub fed: FedSpeechCollector,
    pub release_analyzer: ReleaseAnalyzer,
    pub fed_analyzer: FedAnalyzer,
    pub market_analyzer: MarketAnalyzer,
    pub store: MonitorStore,
    pub notifier: Option<EmailNotifier>,
    pub claude: Option<ClaudeClient>,
    pub subject_prefix: String,
}

impl DailyCycle {
    /// Run one full cycle for `date`.
    pub async fn run_once(&self, date: NaiveDate) -> anyhow::Result<CycleSummary> {
        info!(%date, "Starting daily cycle");
        let due: Vec<ReleaseEvent> = self.resolver.due_on(date);

        // ---- Collect (each section degrades independently) ----
        let observations = self.economic.collect_due(date).await;

        let quotes: Vec<MarketQuote> = match self.market.collect().await {
            Ok(quotes) => quotes,
            Err(e) => {
                warn!(collector = self.market.name(), error = %e, "Collection failed");
                Vec::new()
            }
        };

        let bonds: BondSnapshot = match self.bond.collect().await {
            Ok(snapshot) => snapshot,
            Err(e) => {
                warn!(collector = self.bond.name(), error = %e, "Collection failed");
                BondSnapshot::default()
            }
        };

        let communications: Vec<FedCommunication> = match self.fed.collect().await {
            Ok(comms) => comms,
            Err(e) => {
                warn!(collector = self.fed.name(), error = %e, "Collection failed");
                Vec::new()
            }
        };

        // ---- Persist raw data before analysis ----
        for observation in &observations {
            self.store
                .store_release(observation)
                .context("storing release observation")?;
        }
        let mut new_comms = 0usize;
        for comm in &communications {
            if self
                .store
                .store_communication(comm)
                .context("storing communication")?
            {
                new_comms += 1;
            }
        }

        // ---- Analyze ----
        let releases = self.assess_releases(&observations);
        let readings: Vec<(FedCommunication, FedReading)> = communications
            .iter()
            .map(|comm| (comm.clone(), self.fed_analyzer.analyze(comm)))
            .collect();
        let regime = self.market_analyzer.classify(&quotes, &bonds);

        // ---- Render ----
        let data = NewsletterData {
            date,
            quotes: &quotes,
            bonds: &bonds,
            releases: &releases,
            communications: &readings,
            regime: &regime,
        };
        let narrative = self.compose_narrative(&data).await;
        let html = report::render(&data, narrative.as_deref());

        self.store
            .store_report(&StoredReport {
                date,
                html: html.clone(),
            })
            .context("storing report")?;

        // ---- Deliver ----
        let emailed = self.deliver(date, html).await;

        let summary = CycleSummary {
            date,
            releases_due: due.len(),
            releases_collected: observations.len(),
            quotes_collected: quotes.len(),
            communications: communications.len(),
            emailed,
        };
        info!(
            %date,
            due = summary.releases_due,
            releases = summary.releases_collected,
            quotes = summary.quotes_collected,
            communications = summary.communications,
            new_communications = new_comms,
            emailed = summary.emailed,
            "Daily cycle complete"
        );
        Ok(summary)
    }

    /// Pair each observation with its assessment, feeding the analyzer the
    /// indicator's stored history.
    fn assess_releases(
        &self,
        observations: &[ReleaseObservation],
    ) -> Vec<(ReleaseObservation, ReleaseAssessment)> {
        observations
            .iter()
            .map(|observation| {
                let history = self
                    .store
                    .recent_releases(&observation.indicator_id, 12)
                    .unwrap_or_else(|e| {
                        warn!(error = %e, "Failed to read release history");
                        Vec::new()
                    });
                // History comes back newest-first; trend wants oldest-first.
                let mut values: Vec<f64> = history.iter().map(|h| h.value).collect();
                values.reverse();
                let surprises: Vec<f64> = history
                    .iter()
                    .filter_map(|h| h.expected.map(|e| h.value - e))
                    .collect();
                let assessment = self.release_analyzer.analyze(observation, &surprises, &values);
                (observation.clone(), assessment)
            })
            .collect()
    }

    /// LLM narrative with template fallback: any failure just means the
    /// deterministic summary ships instead.
    async fn compose_narrative(&self, data: &NewsletterData<'_>) -> Option<String> {
        let client = self.claude.as_ref()?;
        let context = narrative_context(data);
        match client.narrative(&context).await {
            Ok(text) => Some(text),
            Err(e) => {
                warn!(error = %e, "Narrative composition failed, using template");
                None
            }
        }
    }

    async fn deliver(&self, date: NaiveDate, html: String) -> bool {
        let Some(notifier) = self.notifier.as_ref() else {
            info!("Email delivery disabled, report stored only");
            return false;
        };
        let subject = report::subject(&self.subject_prefix, date);
        match notifier.send(&subject, html).await {
            Ok(()) => true,
            Err(e) => {
                warn!(error = %e, "Email delivery failed");
                false
            }
        }
    }
}

/// Plain-text data context handed to the LLM for narrative composition.
fn narrative_context(data: &NewsletterData<'_>) -> String {
    let mut lines = vec![format!("Date: {}", data.date)];

    if !data.quotes.is_empty() {
        lines.push("\nMarket data:".to_string());
        for quote in data.quotes {
            lines.push(format!(
                "- {}: {:.2} ({:+.2}%)",
                quote.name, quote.price, quote.change_percent
            ));
        }
    }
    if !data.bonds.rates.is_empty() {
        lines.push("\nTreasury yields:".to_string());
        for rate in &data.bonds.rates {
            lines.push(format!("- {}: {:.2}%", rate.name, rate.price));
        }
        for spread in &data.bonds.spreads {
            lines.push(format!("- {} spread: {:+.2}pp", spread.name, spread.value));
        }
    }
    if !data.releases.is_empty() {
        lines.push("\nEconomic releases:".to_string());
        for (observation, assessment) in data.releases {
            lines.push(format!(
                "- {}: actual {} vs expected {} (surprise {:+.2}, trend {})",
                observation.indicator_id,
                observation.value,
                observation
                    .expected
                    .map(|e| e.to_string())
                    .unwrap_or_else(|| "N/A".to_string()),
                assessment.surprise,
                assessment.trend.as_str(),
            ));
        }
    }
    if !data.communications.is_empty() {
        lines.push("\nFed communications:".to_string());
        for (comm, reading) in data.communications {
            lines.push(format!(
                "- {} ({}): {} reads {} (score {:+.2})",
                comm.speaker,
                comm.kind.as_str(),
                comm.title,
                reading.policy_bias.as_str(),
                reading.hawkish_score,
            ));
        }
    }
    lines.push(format!(
        "\nRegime: volatility {}, risk {}, curve {}",
        data.regime.volatility.as_str(),
        data.regime.risk.as_str(),
        data.regime.curve.as_str(),
    ));
    lines.join("\n")
}

/// Today in the process-local timezone. Thin wrapper so cycle call sites
/// read clearly.
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}
