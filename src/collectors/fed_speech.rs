//! Federal Reserve communications collector.
//!
//! Polls the federalreserve.gov RSS feeds (speeches, testimony, monetary
//! press releases), keeps items inside the recency window, deduplicates by
//! URL, and classifies each item's communication type from its title.

use std::collections::HashSet;

use async_trait::async_trait;
use chrono::{DateTime, Local, NaiveDate};
use quick_xml::events::Event;
use quick_xml::Reader;
use regex::Regex;
use tracing::warn;

use crate::config::{find_speaker, FeedEntry};
use crate::types::{CommunicationType, FedCommunication};

use super::{CollectError, Collector};

pub struct FedSpeechCollector {
    http: reqwest::Client,
    feeds: Vec<FeedEntry>,
    window_days: i64,
    tag_stripper: Regex,
    byline: Regex,
}

impl FedSpeechCollector {
    pub fn new(http: reqwest::Client, feeds: Vec<FeedEntry>, window_days: i64) -> Self {
        // Literal patterns; a failure here is a programming error.
        #[allow(clippy::unwrap_used)]
        let tag_stripper = Regex::new(r"<[^>]+>").unwrap();
        #[allow(clippy::unwrap_used)]
        let byline = Regex::new(
            r"(?:Chair|Vice Chair|Governor|President)\s+([A-Z][A-Za-z.'-]+(?:\s+[A-Z][A-Za-z.'-]+)*)",
        )
        .unwrap();
        Self {
            http,
            feeds,
            window_days,
            tag_stripper,
            byline,
        }
    }

    async fn collect_feed(&self, feed: &FeedEntry) -> Result<Vec<FedCommunication>, CollectError> {
        let response = self.http.get(&feed.url).send().await?;
        if !response.status().is_success() {
            return Err(CollectError::Status {
                source_name: "fed-feed",
                status: response.status(),
            });
        }
        let xml = response.text().await?;
        let items = parse_feed(&xml).map_err(|detail| CollectError::Payload {
            source_name: "fed-feed",
            detail,
        })?;

        let cutoff = Local::now().date_naive() - chrono::Duration::days(self.window_days);
        Ok(items
            .into_iter()
            .filter(|item| item.date >= cutoff)
            .map(|item| self.to_communication(item, &feed.source))
            .collect())
    }

    fn to_communication(&self, item: FeedItem, source: &str) -> FedCommunication {
        let kind = classify(&item.title, source);
        let speaker = self.extract_speaker(&item.title, kind);
        let summary = self
            .tag_stripper
            .replace_all(&item.description, " ")
            .trim()
            .to_string();
        FedCommunication {
            title: item.title,
            speaker,
            url: item.link,
            date: item.date,
            kind,
            summary,
        }
    }

    /// Prefer a roster surname match (gives the canonical full name); fall
    /// back to the title's byline; institutional releases get a generic tag.
    fn extract_speaker(&self, title: &str, kind: CommunicationType) -> String {
        if let Some(speaker) = find_speaker(title) {
            return speaker.name.to_string();
        }
        if let Some(captures) = self.byline.captures(title) {
            if let Some(name) = captures.get(1) {
                return name.as_str().to_string();
            }
        }
        match kind {
            CommunicationType::FomcStatement | CommunicationType::FomcMinutes => {
                "FOMC".to_string()
            }
            _ => "Federal Reserve".to_string(),
        }
    }
}

#[async_trait]
impl Collector for FedSpeechCollector {
    type Output = Vec<FedCommunication>;

    fn name(&self) -> &'static str {
        "fed-speech"
    }

    async fn collect(&self) -> Result<Self::Output, CollectError> {
        let mut all = Vec::new();
        for feed in &self.feeds {
            match self.collect_feed(feed).await {
                Ok(mut items) => all.append(&mut items),
                Err(e) => warn!(feed = %feed.source, error = %e, "Feed collection failed, skipping"),
            }
        }

        // Items can appear in more than one feed; URL is the identity.
        let mut seen = HashSet::new();
        all.retain(|comm| seen.insert(comm.url.clone()));
        all.sort_by(|a, b| b.date.cmp(&a.date));
        Ok(all)
    }
}

// ============================================================================
// RSS parsing
// ============================================================================

#[derive(Debug, Default)]
struct FeedItemBuilder {
    title: String,
    link: String,
    pub_date: String,
    description: String,
}

struct FeedItem {
    title: String,
    link: String,
    date: NaiveDate,
    description: String,
}

/// Minimal RSS 2.0 item extraction: `<item>` children `title`, `link`,
/// `pubDate`, `description`. Items with unparseable dates are dropped.
fn parse_feed(xml: &str) -> Result<Vec<FeedItem>, String> {
    let mut reader = Reader::from_str(xml);
    let mut items = Vec::new();
    let mut current: Option<FeedItemBuilder> = None;
    let mut field: Option<&'static str> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => match e.name().as_ref() {
                b"item" => current = Some(FeedItemBuilder::default()),
                b"title" => field = Some("title"),
                b"link" => field = Some("link"),
                b"pubDate" => field = Some("pubDate"),
                b"description" => field = Some("description"),
                _ => field = None,
            },
            Ok(Event::End(e)) => {
                if e.name().as_ref() == b"item" {
                    if let Some(builder) = current.take() {
                        if let Some(item) = finish_item(builder) {
                            items.push(item);
                        }
                    }
                }
                field = None;
            }
            Ok(Event::Text(e)) => {
                let text = e.unescape().map_err(|err| err.to_string())?.into_owned();
                append_field(&mut current, field, &text);
            }
            Ok(Event::CData(e)) => {
                let text = String::from_utf8_lossy(&e.into_inner()).into_owned();
                append_field(&mut current, field, &text);
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(err) => return Err(err.to_string()),
        }
    }
    Ok(items)
}

fn append_field(current: &mut Option<FeedItemBuilder>, field: Option<&'static str>, text: &str) {
    let Some(builder) = current.as_mut() else {
        return;
    };
    match field {
        Some("title") => builder.title.push_str(text),
        Some("link") => builder.link.push_str(text),
        Some("pubDate") => builder.pub_date.push_str(text),
        Some("description") => builder.description.push_str(text),
        _ => {}
    }
}

fn finish_item(builder: FeedItemBuilder) -> Option<FeedItem> {
    let date = DateTime::parse_from_rfc2822(builder.pub_date.trim())
        .ok()?
        .date_naive();
    let title = builder.title.trim().to_string();
    let link = builder.link.trim().to_string();
    if title.is_empty() || link.is_empty() {
        return None;
    }
    Some(FeedItem {
        title,
        link,
        date,
        description: builder.description,
    })
}

fn classify(title: &str, source: &str) -> CommunicationType {
    let lower = title.to_ascii_lowercase();
    if lower.contains("fomc statement") || lower.contains("federal open market committee statement")
    {
        CommunicationType::FomcStatement
    } else if lower.contains("minutes") {
        CommunicationType::FomcMinutes
    } else if source == "testimony" {
        CommunicationType::Testimony
    } else if source == "speeches" || lower.contains("speech") {
        CommunicationType::Speech
    } else {
        CommunicationType::Other
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FIXTURE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0">
  <channel>
    <title>Speeches</title>
    <item>
      <title>Speech by Governor Waller on the Economic Outlook</title>
      <link>https://www.federalreserve.gov/newsevents/speech/waller20260803a.htm</link>
      <pubDate>Mon, 03 Aug 2026 14:30:00 GMT</pubDate>
      <description><![CDATA[<p>Remarks at the <b>Economic Club</b> of New York.</p>]]></description>
    </item>
    <item>
      <title>Federal Open Market Committee statement</title>
      <link>https://www.federalreserve.gov/newsevents/pressreleases/monetary20260729a.htm</link>
      <pubDate>Wed, 29 Jul 2026 18:00:00 GMT</pubDate>
      <description>The Committee decided to maintain the target range.</description>
    </item>
  </channel>
</rss>"#;

    #[test]
    fn parses_items_from_fixture() {
        let items = parse_feed(FIXTURE).unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(
            items[0].title,
            "Speech by Governor Waller on the Economic Outlook"
        );
        assert_eq!(items[0].date, NaiveDate::from_ymd_opt(2026, 8, 3).unwrap());
        assert!(items[0].description.contains("Economic Club"));
    }

    #[test]
    fn classifies_by_title_and_source() {
        assert_eq!(
            classify("Speech by Governor Waller on Payments", "speeches"),
            CommunicationType::Speech
        );
        assert_eq!(
            classify("Federal Open Market Committee statement", "press_monetary"),
            CommunicationType::FomcStatement
        );
        assert_eq!(
            classify("Minutes of the FOMC, June 2026", "press_monetary"),
            CommunicationType::FomcMinutes
        );
        assert_eq!(
            classify("Semiannual Monetary Policy Report to the Congress", "testimony"),
            CommunicationType::Testimony
        );
    }

    #[test]
    fn speaker_extraction_uses_roster() {
        let collector = FedSpeechCollector::new(
            reqwest::Client::new(),
            Vec::new(),
            7,
        );
        let speaker = collector.extract_speaker(
            "Speech by Governor Waller on the Economic Outlook",
            CommunicationType::Speech,
        );
        assert_eq!(speaker, "Christopher Waller");

        let fomc = collector.extract_speaker(
            "Federal Open Market Committee statement",
            CommunicationType::FomcStatement,
        );
        assert_eq!(fomc, "FOMC");
    }

    #[test]
    fn items_with_bad_dates_are_dropped() {
        let xml = FIXTURE.replace("Mon, 03 Aug 2026 14:30:00 GMT", "not a date");
        let items = parse_feed(&xml).unwrap();
        assert_eq!(items.len(), 1);
    }
}
