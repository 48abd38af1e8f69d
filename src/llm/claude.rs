//! Anthropic Messages API client for newsletter narrative composition.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::defaults::{ANTHROPIC_API_URL, ENV_ANTHROPIC_API_KEY, NARRATIVE_MAX_TOKENS};

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("missing API key: set {ENV_ANTHROPIC_API_KEY}")]
    MissingApiKey,
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("API error {status}: {body}")]
    Api {
        status: reqwest::StatusCode,
        body: String,
    },
    #[error("response contained no text content")]
    EmptyResponse,
}

#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    system: &'a str,
    messages: Vec<Message<'a>>,
}

#[derive(Debug, Serialize)]
struct Message<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    content_type: String,
    text: Option<String>,
}

const SYSTEM_PROMPT: &str = "You are a market analyst writing the narrative section of a daily \
macro newsletter. You are given today's collected market data, economic releases, and Federal \
Reserve communications with deterministic scores already attached. Write clear, professional \
HTML (h2, p, ul/li only) explaining why things moved and what it means for policy and asset \
classes. Use only the data provided; do not invent numbers.";

/// Thin async client over the Messages API.
pub struct ClaudeClient {
    http: reqwest::Client,
    api_key: String,
    model: String,
}

impl ClaudeClient {
    /// Reads the API key from the environment; `Err(MissingApiKey)` when the
    /// variable is unset, which callers treat as "narrative disabled".
    pub fn from_env(http: reqwest::Client, model: &str) -> Result<Self, LlmError> {
        let api_key = std::env::var(ENV_ANTHROPIC_API_KEY).map_err(|_| LlmError::MissingApiKey)?;
        Ok(Self {
            http,
            api_key,
            model: model.to_string(),
        })
    }

    /// Compose a narrative from the formatted data context.
    pub async fn narrative(&self, context: &str) -> Result<String, LlmError> {
        let request = MessagesRequest {
            model: &self.model,
            max_tokens: NARRATIVE_MAX_TOKENS,
            system: SYSTEM_PROMPT,
            messages: vec![Message {
                role: "user",
                content: context,
            }],
        };

        let response = self
            .http
            .post(ANTHROPIC_API_URL)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", "2023-06-01")
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(LlmError::Api { status, body });
        }

        let payload: MessagesResponse = response.json().await?;
        let text: Vec<&str> = payload
            .content
            .iter()
            .filter(|block| block.content_type == "text")
            .filter_map(|block| block.text.as_deref())
            .collect();
        if text.is_empty() {
            return Err(LlmError::EmptyResponse);
        }
        Ok(text.join("\n"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn response_text_extraction() {
        let json = r#"{
            "id": "msg_1",
            "content": [
                {"type": "text", "text": "<h2>Overview</h2>"},
                {"type": "text", "text": "<p>Markets rallied.</p>"}
            ],
            "model": "claude-sonnet-4-20250514"
        }"#;
        let payload: MessagesResponse = serde_json::from_str(json).unwrap();
        let text: Vec<&str> = payload
            .content
            .iter()
            .filter_map(|b| b.text.as_deref())
            .collect();
        assert_eq!(text.join("\n"), "<h2>Overview</h2>\n<p>Markets rallied.</p>");
    }
}
