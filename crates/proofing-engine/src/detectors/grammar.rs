//! Rule-based grammar checking through an external service.

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use shared_types::{Category, Finding, Span, MAX_SUGGESTIONS};

use crate::detectors::Detector;
use crate::parse::ParsedForm;

/// One match reported by the grammar service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GrammarMatch {
    pub offset: usize,
    pub length: usize,
    pub message: String,
    pub rule_id: String,
    pub replacements: Vec<String>,
}

/// Grammar service seam: full text in, matches out. Network and service
/// failures surface as `Err` here and are absorbed at the detector
/// boundary.
#[async_trait]
pub trait GrammarService: Send + Sync {
    async fn check(&self, text: &str) -> Result<Vec<GrammarMatch>>;
}

/// Map a service rule id to our category. Sentence-case rules read as
/// style, spelling-flavored rules as spelling, the rest as grammar.
fn categorize(rule_id: &str) -> Category {
    if rule_id.starts_with("UPPERCASE_SENTENCE_START") {
        Category::Style
    } else if rule_id.contains("SPELL") {
        Category::Spelling
    } else {
        Category::Grammar
    }
}

/// Detector backed by the external grammar service.
pub struct GrammarDetector {
    service: Arc<dyn GrammarService>,
}

impl GrammarDetector {
    pub fn new(service: Arc<dyn GrammarService>) -> Self {
        Self { service }
    }
}

#[async_trait]
impl Detector for GrammarDetector {
    async fn detect(&self, text: &str, _parsed: Option<&ParsedForm>) -> Vec<Finding> {
        if text.trim().is_empty() {
            return Vec::new();
        }

        let matches = match self.service.check(text).await {
            Ok(matches) => matches,
            Err(error) => {
                tracing::warn!(%error, "grammar service check failed");
                return Vec::new();
            }
        };

        matches
            .into_iter()
            .filter_map(|m| {
                let span = Span::new(m.offset, m.offset.saturating_add(m.length));
                if span.end > text.len() {
                    // Malformed service data: drop the item, keep the batch.
                    tracing::warn!(
                        offset = m.offset,
                        length = m.length,
                        "discarding grammar match with out-of-range span"
                    );
                    return None;
                }
                Some(Finding {
                    category: categorize(&m.rule_id),
                    span,
                    message: m.message,
                    suggestions: m.replacements.into_iter().take(MAX_SUGGESTIONS).collect(),
                    confidence: 0.8,
                    source: self.name().to_string(),
                })
            })
            .collect()
    }

    fn name(&self) -> &'static str {
        "grammar_api"
    }
}
