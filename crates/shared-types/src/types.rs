use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Closed set of issue categories a checking source may report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Spelling,
    Grammar,
    Agreement,
    Punctuation,
    Style,
}

impl Category {
    /// Fixed tie-break order used during conflict resolution. Spelling
    /// outranks the grammar tier, which outranks style. This is static
    /// configuration, not a severity ranking.
    pub const fn priority(self) -> u8 {
        match self {
            Category::Spelling => 3,
            Category::Grammar | Category::Agreement | Category::Punctuation => 2,
            Category::Style => 1,
        }
    }
}

/// Replacement candidates carried per finding are capped at this size.
pub const MAX_SUGGESTIONS: usize = 3;

/// Half-open byte interval `[start, end)` into the analyzed text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }

    /// Two spans conflict only when their intersection has positive length.
    /// Touching or zero-length spans never overlap.
    pub fn overlaps(&self, other: &Span) -> bool {
        self.start.max(other.start) < self.end.min(other.end)
    }
}

/// A single detected issue. Immutable value object: produced by a detector,
/// selected (never edited) by conflict resolution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Finding {
    pub category: Category,
    pub span: Span,
    pub message: String,
    #[serde(default)]
    pub suggestions: Vec<String>,
    pub confidence: f64,
    /// Identifier of the producing source. Audit only; ranking never looks
    /// at it beyond the category.
    pub source: String,
}

impl Finding {
    /// Check the span/confidence/message invariants against the analyzed
    /// text length. Called once, at response construction.
    pub fn validate(&self, text_len: usize) -> Result<(), ValidationError> {
        if self.span.start > self.span.end || self.span.end > text_len {
            return Err(ValidationError::SpanOutOfBounds {
                start: self.span.start,
                end: self.span.end,
                len: text_len,
            });
        }
        if !(0.0..=1.0).contains(&self.confidence) {
            return Err(ValidationError::ConfidenceOutOfRange(self.confidence));
        }
        if self.message.trim().is_empty() {
            return Err(ValidationError::EmptyMessage);
        }
        Ok(())
    }
}

/// Errors raised when a finding violates the data-model invariants. These
/// indicate a defect in a detector, not an environmental condition, so they
/// are hard errors rather than degraded results.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ValidationError {
    #[error("span {start}..{end} out of bounds for text of length {len}")]
    SpanOutOfBounds {
        start: usize,
        end: usize,
        len: usize,
    },

    #[error("confidence {0} outside [0.0, 1.0]")]
    ConfidenceOutOfRange(f64),

    #[error("finding message is empty")]
    EmptyMessage,
}

/// Scalar text-complexity snapshot attached to every response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReadabilityMetrics {
    pub flesch_reading_ease: f64,
    pub smog_index: f64,
    pub flesch_kincaid_grade: f64,
    pub coleman_liau_index: f64,
    pub automated_readability_index: f64,
    pub dale_chall_readability_score: f64,
    pub difficult_words: u32,
    pub linsear_write_formula: f64,
    pub gunning_fog: f64,
    pub text_standard: String,
}

impl Default for ReadabilityMetrics {
    /// The all-zero snapshot reported for empty or whitespace-only input.
    fn default() -> Self {
        Self {
            flesch_reading_ease: 0.0,
            smog_index: 0.0,
            flesch_kincaid_grade: 0.0,
            coleman_liau_index: 0.0,
            automated_readability_index: 0.0,
            dale_chall_readability_score: 0.0,
            difficult_words: 0,
            linsear_write_formula: 0.0,
            gunning_fog: 0.0,
            text_standard: "N/A".to_string(),
        }
    }
}

/// Immutable result of one analysis call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResponse {
    /// Resolved findings: overlap-free, sorted ascending by span start.
    pub findings: Vec<Finding>,
    pub readability: ReadabilityMetrics,
    /// Whether the optional contextual detector ran for this call.
    pub llm_used: bool,
}

impl AnalysisResponse {
    /// Construct a response, validating every finding against the analyzed
    /// text length. This is the only place invariant violations surface.
    pub fn new(
        findings: Vec<Finding>,
        readability: ReadabilityMetrics,
        llm_used: bool,
        text_len: usize,
    ) -> Result<Self, ValidationError> {
        for finding in &findings {
            finding.validate(text_len)?;
        }
        Ok(Self {
            findings,
            readability,
            llm_used,
        })
    }
}
