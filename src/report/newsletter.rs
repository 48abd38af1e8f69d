//! Deterministic HTML newsletter assembly.
//!
//! Sections are built from scored data and skipped entirely when their
//! inputs are empty, so a quiet day produces a short report rather than a
//! scaffold of empty tables. The narrative section is either the injected
//! LLM-composed prose or the built-in template summary.

use chrono::NaiveDate;

use crate::analyzers::{FedReading, RegimeRead, ReleaseAssessment};
use crate::types::{AssetClass, BondSnapshot, FedCommunication, MarketQuote, ReleaseObservation};

/// Everything a rendered newsletter is built from.
pub struct NewsletterData<'a> {
    pub date: NaiveDate,
    pub quotes: &'a [MarketQuote],
    pub bonds: &'a BondSnapshot,
    pub releases: &'a [(ReleaseObservation, ReleaseAssessment)],
    pub communications: &'a [(FedCommunication, FedReading)],
    pub regime: &'a RegimeRead,
}

/// Subject line for the delivery email.
pub fn subject(prefix: &str, date: NaiveDate) -> String {
    format!("{} - {}", prefix, date.format("%Y-%m-%d"))
}

/// Render the full HTML document. `narrative` overrides the template
/// executive summary when LLM composition succeeded.
pub fn render(data: &NewsletterData<'_>, narrative: Option<&str>) -> String {
    let mut sections = Vec::new();

    let summary = match narrative {
        Some(text) => text.to_string(),
        None => template_narrative(data),
    };
    sections.push(format!(
        "<div class=\"highlight\">\n{summary}\n</div>"
    ));

    if !data.quotes.is_empty() {
        sections.push(market_section(data.quotes));
    }
    if !data.bonds.rates.is_empty() || !data.bonds.credit.is_empty() {
        sections.push(bond_section(data.bonds));
    }
    if !data.releases.is_empty() {
        sections.push(release_section(data.releases));
    }
    if !data.communications.is_empty() {
        sections.push(fed_section(data.communications));
    }
    sections.push(regime_section(data.regime));

    wrap_document(
        &format!("Daily Macro Update - {}", data.date.format("%B %d, %Y")),
        &sections.join("\n"),
    )
}

/// Template executive summary: the fallback when no LLM narrative exists.
/// States the regime read and counts, nothing speculative.
fn template_narrative(data: &NewsletterData<'_>) -> String {
    let mut lines = vec![format!(
        "<p>Volatility is <strong>{}</strong>{}, the tape reads <strong>{}</strong>, and the \
         2s10s curve is <strong>{}</strong>{}.</p>",
        data.regime.volatility.as_str(),
        data.regime
            .vix_level
            .map(|v| format!(" (VIX {v:.1})"))
            .unwrap_or_default(),
        data.regime.risk.as_str(),
        data.regime.curve.as_str(),
        data.regime
            .curve_spread
            .map(|s| format!(" ({s:+.2}pp)"))
            .unwrap_or_default(),
    )];

    if data.releases.is_empty() {
        lines.push("<p>No economic releases were scheduled today.</p>".to_string());
    } else {
        lines.push(format!(
            "<p>{} economic release(s) collected today.</p>",
            data.releases.len()
        ));
    }
    if !data.communications.is_empty() {
        lines.push(format!(
            "<p>{} Federal Reserve communication(s) in the window.</p>",
            data.communications.len()
        ));
    }
    lines.join("\n")
}

fn market_section(quotes: &[MarketQuote]) -> String {
    let mut html = String::from("<h2>Key Market Movements</h2>\n");
    for class in [AssetClass::Index, AssetClass::Fx, AssetClass::Commodity] {
        let rows: Vec<&MarketQuote> =
            quotes.iter().filter(|q| q.asset_class == class).collect();
        if rows.is_empty() {
            continue;
        }
        html.push_str(&format!("<h3>{}</h3>\n", class.as_str().to_uppercase()));
        html.push_str("<table>\n<tr><th>Symbol</th><th>Last</th><th>Change</th></tr>\n");
        for quote in rows {
            html.push_str(&format!(
                "<tr><td>{}</td><td>{:.2}</td><td>{:+.2}%</td></tr>\n",
                escape(&quote.name),
                quote.price,
                quote.change_percent,
            ));
        }
        html.push_str("</table>\n");
    }
    html
}

fn bond_section(bonds: &BondSnapshot) -> String {
    let mut html = String::from("<h2>Rates &amp; Credit</h2>\n");
    if !bonds.rates.is_empty() {
        html.push_str("<table>\n<tr><th>Tenor</th><th>Yield</th><th>Change</th></tr>\n");
        for rate in &bonds.rates {
            html.push_str(&format!(
                "<tr><td>{}</td><td>{:.2}%</td><td>{:+.2}%</td></tr>\n",
                escape(&rate.name),
                rate.price,
                rate.change_percent,
            ));
        }
        html.push_str("</table>\n");
    }
    if !bonds.spreads.is_empty() {
        let spreads: Vec<String> = bonds
            .spreads
            .iter()
            .map(|s| format!("{} {:+.2}pp", escape(&s.name), s.value))
            .collect();
        html.push_str(&format!("<p>Curve: {}</p>\n", spreads.join(", ")));
    }
    if !bonds.credit.is_empty() {
        let credit: Vec<String> = bonds
            .credit
            .iter()
            .map(|q| format!("{} {:+.2}%", escape(&q.name), q.change_percent))
            .collect();
        html.push_str(&format!("<p>Credit proxies: {}</p>\n", credit.join(", ")));
    }
    html
}

fn release_section(releases: &[(ReleaseObservation, ReleaseAssessment)]) -> String {
    let mut html = String::from("<h2>Economic Releases</h2>\n<ul>\n");
    for (observation, assessment) in releases {
        let expected = observation
            .expected
            .map(|e| format!("{e}"))
            .unwrap_or_else(|| "N/A".to_string());
        let previous = observation
            .previous
            .map(|p| format!("{p}"))
            .unwrap_or_else(|| "N/A".to_string());
        html.push_str(&format!(
            "<li><strong>{}</strong> ({}): actual {} vs expected {} (previous {}). \
             Impact: {}, trend: {}.</li>\n",
            escape(&observation.indicator_id),
            escape(&observation.period),
            observation.value,
            expected,
            previous,
            assessment.impact.as_str(),
            assessment.trend.as_str(),
        ));
    }
    html.push_str("</ul>\n");
    html
}

fn fed_section(communications: &[(FedCommunication, FedReading)]) -> String {
    let mut html = String::from("<h2>Fed Communications</h2>\n<ul>\n");
    for (comm, reading) in communications {
        let themes = if reading.key_themes.is_empty() {
            String::new()
        } else {
            format!(" Key themes: {}.", escape(&reading.key_themes.join(", ")))
        };
        html.push_str(&format!(
            "<li><strong>{}</strong>: <a href=\"{}\">{}</a> ({}). \
             Read: {} (score {:+.2}, confidence {:.0}%).{}</li>\n",
            escape(&comm.speaker),
            escape(&comm.url),
            escape(&comm.title),
            comm.kind.as_str(),
            reading.policy_bias.as_str(),
            reading.hawkish_score,
            reading.confidence * 100.0,
            themes,
        ));
    }
    html.push_str("</ul>\n");
    html
}

fn regime_section(regime: &RegimeRead) -> String {
    format!(
        "<h2>Market Regime</h2>\n<p>Volatility: <strong>{}</strong> | Risk: \
         <strong>{}</strong> | Curve: <strong>{}</strong></p>",
        regime.volatility.as_str(),
        regime.risk.as_str(),
        regime.curve.as_str(),
    )
}

fn wrap_document(headline: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
<head>
<style>
    body {{
        font-family: Arial, sans-serif;
        line-height: 1.6;
        color: #333;
        max-width: 1000px;
        margin: 0 auto;
        padding: 20px;
    }}
    .section {{
        margin: 30px 0;
        padding: 20px;
        background-color: #fff;
        border-radius: 5px;
        box-shadow: 0 2px 4px rgba(0,0,0,0.1);
    }}
    .highlight {{
        background-color: #f8f9fa;
        padding: 15px;
        border-left: 4px solid #007bff;
        margin: 10px 0;
    }}
    h1, h2, h3 {{ color: #2c3e50; }}
    table {{ border-collapse: collapse; }}
    td, th {{ padding: 4px 12px; text-align: left; }}
    .footer {{
        margin-top: 30px;
        color: #666;
        font-size: 0.8em;
        text-align: center;
    }}
</style>
</head>
<body>
<div class="section">
<h1>{headline}</h1>
{body}
</div>
<div class="footer">
    <p>Generated by Macro Monitor</p>
</div>
</body>
</html>
"#
    )
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}
