//! LanguageTool-protocol client for the grammar service seam.

use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use serde::Deserialize;

use crate::detectors::{GrammarMatch, GrammarService};

/// HTTP client speaking the LanguageTool `/v2/check` protocol.
pub struct LanguageToolClient {
    http: reqwest::Client,
    base_url: String,
    language: String,
}

impl LanguageToolClient {
    pub fn new(base_url: &str, language: &str, timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            language: language.to_string(),
        })
    }
}

#[derive(Debug, Deserialize)]
struct CheckResponse {
    #[serde(default)]
    matches: Vec<ApiMatch>,
}

#[derive(Debug, Deserialize)]
struct ApiMatch {
    offset: usize,
    length: usize,
    message: String,
    #[serde(default)]
    replacements: Vec<ApiReplacement>,
    rule: Option<ApiRule>,
}

#[derive(Debug, Deserialize)]
struct ApiReplacement {
    value: String,
}

#[derive(Debug, Deserialize)]
struct ApiRule {
    id: String,
}

fn to_matches(response: CheckResponse) -> Vec<GrammarMatch> {
    response
        .matches
        .into_iter()
        .map(|m| GrammarMatch {
            offset: m.offset,
            length: m.length,
            message: m.message,
            rule_id: m.rule.map(|r| r.id).unwrap_or_default(),
            replacements: m.replacements.into_iter().map(|r| r.value).collect(),
        })
        .collect()
}

#[async_trait]
impl GrammarService for LanguageToolClient {
    async fn check(&self, text: &str) -> Result<Vec<GrammarMatch>> {
        let url = format!("{}/v2/check", self.base_url);
        let response = self
            .http
            .post(&url)
            .form(&[("text", text), ("language", self.language.as_str())])
            .send()
            .await?
            .error_for_status()?;

        let body: CheckResponse = response.json().await?;
        Ok(to_matches(body))
    }
}
