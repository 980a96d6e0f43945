//! Chat-completions client for the contextual (language-model) seam.

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;

use crate::detectors::{ContextualChecker, RawContextIssue};

const REVIEW_PROMPT: &str = "Analyze the following text for subtle contextual grammar errors, \
malapropisms, or logical inconsistencies in phrasing. Do NOT report style issues, spelling, \
or basic grammar; other checkers cover those. Focus on misused word pairs (their/there, \
affect/effect) and garbled idioms. Return JSON of the form \
{\"errors\": [{\"message\": \"...\", \"start_index\": 0, \"end_index\": 5, \"suggestion\": \"...\"}]} \
with byte offsets computed against the provided text. If there are no errors, return \
{\"errors\": []}.";

const EXPLAIN_UNAVAILABLE: &str = "Explanation unavailable (language model not configured).";

/// OpenAI-style chat-completions client. Constructed without an API key it
/// is inert: reviews return nothing and explanations return a fixed
/// unavailable message.
pub struct OpenAiClient {
    http: reqwest::Client,
    api_key: Option<String>,
    base_url: String,
    model: String,
}

impl OpenAiClient {
    pub fn new(
        api_key: Option<String>,
        base_url: &str,
        model: &str,
        timeout: Duration,
    ) -> Result<Self> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
        })
    }

    pub fn is_available(&self) -> bool {
        self.api_key.is_some()
    }

    async fn chat(&self, body: serde_json::Value) -> Result<String> {
        let key = self.api_key.as_deref().context("no API key configured")?;
        let url = format!("{}/chat/completions", self.base_url);
        let response = self
            .http
            .post(&url)
            .bearer_auth(key)
            .json(&body)
            .send()
            .await?
            .error_for_status()?;

        let completion: ChatResponse = response.json().await?;
        let choice = completion
            .choices
            .into_iter()
            .next()
            .context("completion had no choices")?;
        Ok(choice.message.content)
    }
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    content: String,
}

/// Parse the model's review JSON. Entries that fail to deserialize are
/// dropped individually; only an unparseable envelope is an error.
fn parse_review(content: &str) -> Result<Vec<RawContextIssue>> {
    let value: serde_json::Value =
        serde_json::from_str(content).context("model returned invalid JSON")?;
    let Some(errors) = value.get("errors").and_then(|e| e.as_array()) else {
        return Ok(Vec::new());
    };

    let issues = errors
        .iter()
        .filter_map(|entry| match serde_json::from_value(entry.clone()) {
            Ok(issue) => Some(issue),
            Err(error) => {
                tracing::warn!(%error, "discarding undecodable model entry");
                None
            }
        })
        .collect();
    Ok(issues)
}

#[async_trait]
impl ContextualChecker for OpenAiClient {
    async fn review(&self, text: &str) -> Result<Vec<RawContextIssue>> {
        if !self.is_available() {
            tracing::debug!("contextual checker not configured; skipping review");
            return Ok(Vec::new());
        }

        let body = json!({
            "model": self.model,
            "messages": [
                {"role": "system", "content": "You are a strict proofreader. Output valid JSON only."},
                {"role": "user", "content": format!("{REVIEW_PROMPT}\n\nText: {text}")}
            ],
            "response_format": {"type": "json_object"},
            "temperature": 0.0
        });
        let content = self.chat(body).await?;
        parse_review(&content)
    }

    async fn explain(&self, excerpt: &str, message: &str) -> Result<String> {
        if !self.is_available() {
            return Ok(EXPLAIN_UNAVAILABLE.to_string());
        }

        let prompt = format!(
            "Explain the following writing issue to a user in simple terms.\n\
             Issue: \"{message}\"\nOffending text: \"{excerpt}\"\n\
             Keep it brief (1 sentence)."
        );
        let body = json!({
            "model": self.model,
            "messages": [
                {"role": "system", "content": "You are a helpful proofreading assistant."},
                {"role": "user", "content": prompt}
            ],
            "max_tokens": 60
        });
        let content = self.chat(body).await?;
        Ok(content.trim().to_string())
    }
}
