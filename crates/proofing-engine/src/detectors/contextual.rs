//! Contextual checking through a language-model collaborator.
//!
//! The model returns issue spans it computed itself, so nothing it says is
//! trusted until validated against the actual text. Invalid entries are
//! dropped one by one; the batch survives.

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use serde::Deserialize;
use shared_types::{Category, Finding, Span};

use crate::detectors::Detector;
use crate::parse::ParsedForm;

/// One unvalidated issue as returned by the model. All fields optional:
/// missing data disqualifies the entry, not the batch.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawContextIssue {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub start_index: Option<i64>,
    #[serde(default)]
    pub end_index: Option<i64>,
    #[serde(default)]
    pub suggestion: Option<String>,
}

/// Language-model collaborator seam.
#[async_trait]
pub trait ContextualChecker: Send + Sync {
    /// Ask the model for subtle contextual issues in `text`.
    async fn review(&self, text: &str) -> Result<Vec<RawContextIssue>>;

    /// One-sentence plain-language explanation of a detected issue.
    async fn explain(&self, excerpt: &str, message: &str) -> Result<String>;
}

/// Detector wrapping the language-model collaborator.
pub struct ContextualDetector {
    checker: Arc<dyn ContextualChecker>,
}

impl ContextualDetector {
    pub fn new(checker: Arc<dyn ContextualChecker>) -> Self {
        Self { checker }
    }
}

/// Validate a raw model entry against the analyzed text. Returns `None`
/// (and logs) for anything out of range, inverted, off a char boundary, or
/// missing its message.
fn validate_issue(issue: RawContextIssue, text: &str) -> Option<Finding> {
    let message = issue.message.filter(|m| !m.trim().is_empty())?;
    let start = usize::try_from(issue.start_index?).ok()?;
    let end = usize::try_from(issue.end_index?).ok()?;

    if start > end || end > text.len() {
        tracing::warn!(start, end, "discarding model issue with invalid span");
        return None;
    }
    if !text.is_char_boundary(start) || !text.is_char_boundary(end) {
        tracing::warn!(start, end, "discarding model issue off char boundary");
        return None;
    }

    Some(Finding {
        category: Category::Grammar,
        span: Span::new(start, end),
        message,
        suggestions: issue.suggestion.into_iter().collect(),
        confidence: 0.7,
        source: "llm_context".to_string(),
    })
}

#[async_trait]
impl Detector for ContextualDetector {
    async fn detect(&self, text: &str, _parsed: Option<&ParsedForm>) -> Vec<Finding> {
        let issues = match self.checker.review(text).await {
            Ok(issues) => issues,
            Err(error) => {
                tracing::warn!(%error, "contextual review failed");
                return Vec::new();
            }
        };

        issues
            .into_iter()
            .filter_map(|issue| validate_issue(issue, text))
            .collect()
    }

    fn name(&self) -> &'static str {
        "llm_context"
    }
}
