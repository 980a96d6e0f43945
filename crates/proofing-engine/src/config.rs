//! Engine configuration.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};

/// Configuration for the analysis pipeline and its collaborator adapters.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Base URL of the LanguageTool-protocol grammar service.
    pub grammar_endpoint: String,
    /// Language code sent to the grammar service.
    pub grammar_language: String,
    /// Base URL of the chat-completions endpoint.
    pub llm_endpoint: String,
    /// Model name for contextual review.
    pub llm_model: String,
    /// API key; absent means the contextual checker is inert.
    pub llm_api_key: Option<String>,
    /// Optional `term count` dictionary file for the spelling lexicon.
    pub dictionary_path: Option<PathBuf>,
    /// Budget for a single detector invocation.
    pub detector_timeout: Duration,
    /// Request timeout for the HTTP adapters.
    pub http_timeout: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            grammar_endpoint: "https://api.languagetool.org".to_string(),
            grammar_language: "en-US".to_string(),
            llm_endpoint: "https://api.openai.com/v1".to_string(),
            llm_model: "gpt-4o-mini".to_string(),
            llm_api_key: None,
            dictionary_path: None,
            detector_timeout: Duration::from_millis(10_000),
            http_timeout: Duration::from_secs(10),
        }
    }
}

impl EngineConfig {
    /// Load configuration from environment variables, falling back to the
    /// defaults above.
    ///
    /// Recognized variables:
    /// - PROOF_GRAMMAR_ENDPOINT, PROOF_GRAMMAR_LANGUAGE
    /// - PROOF_LLM_ENDPOINT, PROOF_LLM_MODEL, OPENAI_API_KEY
    /// - PROOF_DICTIONARY: path to a `term count` frequency dictionary
    /// - PROOF_DETECTOR_TIMEOUT_MS, PROOF_HTTP_TIMEOUT_MS
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Ok(endpoint) = std::env::var("PROOF_GRAMMAR_ENDPOINT") {
            config.grammar_endpoint = endpoint;
        }
        if let Ok(language) = std::env::var("PROOF_GRAMMAR_LANGUAGE") {
            config.grammar_language = language;
        }
        if let Ok(endpoint) = std::env::var("PROOF_LLM_ENDPOINT") {
            config.llm_endpoint = endpoint;
        }
        if let Ok(model) = std::env::var("PROOF_LLM_MODEL") {
            config.llm_model = model;
        }
        config.llm_api_key = std::env::var("OPENAI_API_KEY").ok();
        config.dictionary_path = std::env::var("PROOF_DICTIONARY").ok().map(PathBuf::from);

        if let Ok(ms) = std::env::var("PROOF_DETECTOR_TIMEOUT_MS") {
            let ms: u64 = ms
                .parse()
                .context("PROOF_DETECTOR_TIMEOUT_MS must be an integer")?;
            config.detector_timeout = Duration::from_millis(ms);
        }
        if let Ok(ms) = std::env::var("PROOF_HTTP_TIMEOUT_MS") {
            let ms: u64 = ms
                .parse()
                .context("PROOF_HTTP_TIMEOUT_MS must be an integer")?;
            config.http_timeout = Duration::from_millis(ms);
        }

        Ok(config)
    }

    pub fn with_llm_api_key(mut self, key: &str) -> Self {
        self.llm_api_key = Some(key.to_string());
        self
    }

    pub fn with_dictionary(mut self, path: PathBuf) -> Self {
        self.dictionary_path = Some(path);
        self
    }

    pub fn with_detector_timeout(mut self, timeout: Duration) -> Self {
        self.detector_timeout = timeout;
        self
    }
}
